//! Ordered, composable equip rules.
//!
//! Each rule inspects or mutates the plan through the builder and either
//! passes or returns the reason the plan must fail. The planner stops at the
//! first failure, so later rules may assume earlier ones succeeded.

use std::collections::BTreeMap;

use super::builder::EquipPlanBuilder;
use super::plan::EquipPlanError;

/// One step of equip planning.
pub trait EquipRule: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, builder: &mut EquipPlanBuilder<'_>) -> Result<(), EquipPlanError>;
}

/// Claims an explicitly targeted body part if the caller named one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetPartRule;

impl EquipRule for TargetPartRule {
    fn name(&self) -> &'static str {
        "target_part"
    }

    fn apply(&self, builder: &mut EquipPlanBuilder<'_>) -> Result<(), EquipPlanError> {
        match builder.plan().target_part() {
            Some(part) => builder.claim_target(part),
            None => Ok(()),
        }
    }
}

/// Cheap pre-check: the body has enough unclaimed parts of each type.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotCountRule;

impl EquipRule for SlotCountRule {
    fn name(&self) -> &'static str {
        "slot_count"
    }

    fn apply(&self, builder: &mut EquipPlanBuilder<'_>) -> Result<(), EquipPlanError> {
        let mut needed: BTreeMap<&str, usize> = BTreeMap::new();
        for slot_type in builder.remaining() {
            *needed.entry(slot_type.as_str()).or_default() += 1;
        }
        for (slot_type, needed) in needed {
            let available = builder.unclaimed_candidate_count(slot_type);
            if available < needed {
                return Err(EquipPlanError::InsufficientSlots {
                    slot_type: slot_type.to_string(),
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }
}

/// Resolves every remaining requirement to one concrete unclaimed part.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotClaimRule;

impl EquipRule for SlotClaimRule {
    fn name(&self) -> &'static str {
        "slot_claim"
    }

    fn apply(&self, builder: &mut EquipPlanBuilder<'_>) -> Result<(), EquipPlanError> {
        builder.claim_remaining()
    }
}

/// Records which equipped items the claimed parts would displace.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplacementRule;

impl EquipRule for DisplacementRule {
    fn name(&self) -> &'static str {
        "displacement"
    }

    fn apply(&self, builder: &mut EquipPlanBuilder<'_>) -> Result<(), EquipPlanError> {
        builder.add_displacements_from_claimed_parts();
        Ok(())
    }
}
