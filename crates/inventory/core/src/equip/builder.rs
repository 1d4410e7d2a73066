//! Query/claim API that rules use to operate on a plan.

use super::plan::{Displacement, EquipPlan, EquipPlanError};
use crate::world::{Body, BodyPart, BodyPartId};

/// Mutable view over a plan plus the actor's anatomy.
///
/// `remaining` starts as a copy of the plan's slot types; claiming a part for
/// a requirement consumes that requirement.
pub struct EquipPlanBuilder<'a> {
    plan: &'a mut EquipPlan,
    body: &'a Body,
    item_name: &'a str,
    remaining: Vec<String>,
}

impl<'a> EquipPlanBuilder<'a> {
    pub fn new(plan: &'a mut EquipPlan, body: &'a Body, item_name: &'a str) -> Self {
        let remaining = plan.slot_types().to_vec();
        Self {
            plan,
            body,
            item_name,
            remaining,
        }
    }

    pub fn plan(&self) -> &EquipPlan {
        self.plan
    }

    pub fn body(&self) -> &Body {
        self.body
    }

    pub fn item_name(&self) -> &str {
        self.item_name
    }

    /// Requirements not yet satisfied by a claim.
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// All parts of `slot_type`, in body order.
    pub fn candidate_slots(&self, slot_type: &str) -> Vec<&'a BodyPart> {
        self.body.equippable_slots(slot_type).collect()
    }

    pub fn is_claimed(&self, part: BodyPartId) -> bool {
        self.plan.claimed_parts().contains(&part)
    }

    pub fn unclaimed_candidate_count(&self, slot_type: &str) -> usize {
        self.body
            .equippable_slots(slot_type)
            .filter(|part| !self.is_claimed(part.id))
            .count()
    }

    /// Picks a part for one `slot_type` requirement.
    ///
    /// Prefers the first unoccupied, unclaimed candidate; otherwise the first
    /// unclaimed one, accepting that its occupant will be displaced.
    pub fn find_best_slot(&self, slot_type: &str) -> Option<BodyPartId> {
        let mut fallback = None;
        for part in self.body.equippable_slots(slot_type) {
            if self.is_claimed(part.id) {
                continue;
            }
            if !part.is_occupied() {
                return Some(part.id);
            }
            fallback.get_or_insert(part.id);
        }
        fallback
    }

    /// Adds `part` to the claim set. Returns `false` if it was already claimed.
    pub fn claim_part(&mut self, part: BodyPartId) -> bool {
        let claimed = self.plan.push_claim(part);
        if claimed {
            tracing::debug!("plan for {} claimed {}", self.plan.item(), part);
        }
        claimed
    }

    /// Claims an explicitly requested part, consuming one matching requirement.
    pub fn claim_target(&mut self, part: BodyPartId) -> Result<(), EquipPlanError> {
        let target = self
            .body
            .part(part)
            .ok_or(EquipPlanError::UnknownTargetPart(part))?;
        let index = self
            .remaining
            .iter()
            .position(|slot_type| *slot_type == target.slot_type)
            .ok_or_else(|| EquipPlanError::TargetPartIncompatible {
                item: self.item_name.to_string(),
                part: target.name.clone(),
            })?;
        if !self.claim_part(part) {
            return Err(EquipPlanError::PartAlreadyClaimed(part));
        }
        self.remaining.remove(index);
        Ok(())
    }

    /// Resolves every remaining requirement to a concrete part.
    pub fn claim_remaining(&mut self) -> Result<(), EquipPlanError> {
        let pending = std::mem::take(&mut self.remaining);
        for (index, slot_type) in pending.iter().enumerate() {
            let Some(part) = self.find_best_slot(slot_type) else {
                self.remaining = pending[index..].to_vec();
                return Err(EquipPlanError::NoAvailableSlot {
                    slot_type: slot_type.clone(),
                });
            };
            if !self.claim_part(part) {
                self.remaining = pending[index..].to_vec();
                return Err(EquipPlanError::PartAlreadyClaimed(part));
            }
        }
        Ok(())
    }

    /// Records one displacement per claimed part held by a different item.
    pub fn add_displacements_from_claimed_parts(&mut self) {
        let item = self.plan.item();
        let displacements: Vec<Displacement> = self
            .plan
            .claimed_parts()
            .iter()
            .filter_map(|id| self.body.part(*id))
            .filter_map(|part| match part.equipped {
                Some(occupant) if occupant != item => Some(Displacement {
                    item: occupant,
                    part: part.id,
                }),
                _ => None,
            })
            .collect();
        for displacement in displacements {
            self.plan.push_displacement(displacement);
        }
    }
}
