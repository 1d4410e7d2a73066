//! Equip planning: matching an item's abstract slot requirements to concrete
//! body parts.
//!
//! # Module Structure
//!
//! - `plan`: `EquipPlan` request/scratchpad, `Displacement`, `EquipPlanError`
//! - `builder`: `EquipPlanBuilder` query/claim API used by rules
//! - `rules`: the `EquipRule` trait and the four standard rules
//! - `planner`: `EquipPlanner`, which owns the fixed rule order
//!
//! A valid plan may still carry displacements; whether displacing equipped
//! items is acceptable is decided by the command executing the plan.

mod builder;
mod plan;
mod planner;
mod rules;

pub use builder::EquipPlanBuilder;
pub use plan::{Displacement, EquipPlan, EquipPlanError};
pub use planner::EquipPlanner;
pub use rules::{DisplacementRule, EquipRule, SlotClaimRule, SlotCountRule, TargetPartRule};
