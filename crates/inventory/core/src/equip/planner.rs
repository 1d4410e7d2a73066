//! Equip planner: fixed rule order and plan construction.

use std::sync::LazyLock;

use super::builder::EquipPlanBuilder;
use super::plan::{EquipPlan, EquipPlanError};
use super::rules::{DisplacementRule, EquipRule, SlotClaimRule, SlotCountRule, TargetPartRule};
use crate::config::RulesConfig;
use crate::world::{Body, BodyPartId, EntityId, Equippable, World};

static STANDARD: LazyLock<EquipPlanner> = LazyLock::new(EquipPlanner::new);

/// Builds equip plans by running the rule chain.
///
/// Stateless apart from the rule list, so one planner can be shared by
/// reference across commands.
pub struct EquipPlanner {
    rules: Vec<Box<dyn EquipRule>>,
}

impl EquipPlanner {
    /// Planner with the standard rule order:
    /// target part → slot count → slot claim → displacement.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TargetPartRule),
                Box::new(SlotCountRule),
                Box::new(SlotClaimRule),
                Box::new(DisplacementRule),
            ],
        }
    }

    /// Process-wide planner with the standard rule order.
    pub fn standard() -> &'static EquipPlanner {
        &STANDARD
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Builds a plan for `actor` equipping `item`, optionally on `target_part`.
    ///
    /// Fails fast, without running any rule, when the actor or item is
    /// missing, the actor has no anatomy, the item is not equippable or it
    /// declares no slot or more slots than a plan can hold.
    pub fn build(
        &self,
        world: &World,
        actor: EntityId,
        item: EntityId,
        target_part: Option<BodyPartId>,
    ) -> EquipPlan {
        let mut plan = EquipPlan::new(actor, item, target_part);

        let Some(actor_entity) = world.entity(actor) else {
            plan.invalidate(EquipPlanError::MissingActor);
            return plan;
        };
        let Some(item_entity) = world.entity(item) else {
            plan.invalidate(EquipPlanError::MissingItem);
            return plan;
        };
        let Some(body) = actor_entity.get::<Body>() else {
            plan.invalidate(EquipPlanError::NoAnatomy {
                actor: actor_entity.name.clone(),
            });
            return plan;
        };
        let Some(equippable) = item_entity.get::<Equippable>() else {
            plan.invalidate(EquipPlanError::NotEquippable {
                item: item_entity.name.clone(),
            });
            return plan;
        };
        let slot_types = equippable.slot_types();
        if slot_types.is_empty() {
            plan.invalidate(EquipPlanError::NoSlotRequirement {
                item: item_entity.name.clone(),
            });
            return plan;
        }
        let count = equippable.slot_token_count();
        if count > slot_types.len() {
            plan.invalidate(EquipPlanError::TooManySlotRequirements {
                item: item_entity.name.clone(),
                count,
                max: RulesConfig::MAX_SLOT_REQUIREMENTS,
            });
            return plan;
        }
        plan.resolve(equippable.clone(), slot_types);

        let mut builder = EquipPlanBuilder::new(&mut plan, body, &item_entity.name);
        let mut failure = None;
        for rule in &self.rules {
            if let Err(error) = rule.apply(&mut builder) {
                tracing::debug!("equip rule {} rejected {}: {}", rule.name(), item, error);
                failure = Some(error);
                break;
            }
        }
        if let Some(error) = failure {
            plan.invalidate(error);
        }
        plan
    }
}

impl Default for EquipPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EquipPlanner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EquipPlanner")
            .field("rules", &self.rule_names())
            .finish()
    }
}
