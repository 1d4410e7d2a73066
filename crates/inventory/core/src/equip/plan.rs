//! Equip plan: one equip attempt's request and planning scratchpad.

use crate::error::{ErrorSeverity, RulesError};
use crate::world::{BodyPartId, EntityId, Equippable, SlotRequirements};

/// An already-equipped item that a plan would force off a body part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Displacement {
    pub item: EntityId,
    pub part: BodyPartId,
}

/// Reasons a plan can be invalidated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipPlanError {
    #[error("there is no one to equip that")]
    MissingActor,

    #[error("there is nothing to equip")]
    MissingItem,

    #[error("{actor} has no body to equip things on")]
    NoAnatomy { actor: String },

    #[error("{item} can't be equipped")]
    NotEquippable { item: String },

    #[error("{item} doesn't fit any equipment slot")]
    NoSlotRequirement { item: String },

    #[error("{item} needs {count} slots, more than anything can wear (max {max})")]
    TooManySlotRequirements {
        item: String,
        count: usize,
        max: usize,
    },

    #[error("that body part does not exist")]
    UnknownTargetPart(BodyPartId),

    #[error("{item} can't be equipped to your {part}")]
    TargetPartIncompatible { item: String, part: String },

    #[error("{0} is already claimed by this plan")]
    PartAlreadyClaimed(BodyPartId),

    #[error("you need {needed} free {slot_type} slots but only have {available}")]
    InsufficientSlots {
        slot_type: String,
        needed: usize,
        available: usize,
    },

    #[error("you have no {slot_type} slot available")]
    NoAvailableSlot { slot_type: String },
}

impl RulesError for EquipPlanError {
    fn severity(&self) -> ErrorSeverity {
        use EquipPlanError::*;
        match self {
            MissingActor | MissingItem => ErrorSeverity::Validation,
            NoAnatomy { .. } | NotEquippable { .. } | NoSlotRequirement { .. } => {
                ErrorSeverity::Validation
            }
            TooManySlotRequirements { .. } => ErrorSeverity::Validation,
            UnknownTargetPart(_) | TargetPartIncompatible { .. } => ErrorSeverity::Validation,
            PartAlreadyClaimed(_) => ErrorSeverity::Internal,
            InsufficientSlots { .. } | NoAvailableSlot { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use EquipPlanError::*;
        match self {
            MissingActor => "PLAN_MISSING_ACTOR",
            MissingItem => "PLAN_MISSING_ITEM",
            NoAnatomy { .. } => "PLAN_NO_ANATOMY",
            NotEquippable { .. } => "PLAN_NOT_EQUIPPABLE",
            NoSlotRequirement { .. } => "PLAN_NO_SLOT_REQUIREMENT",
            TooManySlotRequirements { .. } => "PLAN_TOO_MANY_SLOT_REQUIREMENTS",
            UnknownTargetPart(_) => "PLAN_UNKNOWN_TARGET_PART",
            TargetPartIncompatible { .. } => "PLAN_TARGET_PART_INCOMPATIBLE",
            PartAlreadyClaimed(_) => "PLAN_PART_ALREADY_CLAIMED",
            InsufficientSlots { .. } => "PLAN_INSUFFICIENT_SLOTS",
            NoAvailableSlot { .. } => "PLAN_NO_AVAILABLE_SLOT",
        }
    }
}

/// Request and result of one equip attempt.
///
/// # Invariants
///
/// - Once invalidated a plan stays invalid and keeps its first failure.
/// - `claimed` holds distinct parts of the actor's body.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipPlan {
    actor: EntityId,
    item: EntityId,
    has_body: bool,
    equippable: Option<Equippable>,
    target_part: Option<BodyPartId>,
    slot_types: SlotRequirements,
    claimed: Vec<BodyPartId>,
    displacements: Vec<Displacement>,
    failure: Option<EquipPlanError>,
}

impl EquipPlan {
    pub(crate) fn new(actor: EntityId, item: EntityId, target_part: Option<BodyPartId>) -> Self {
        Self {
            actor,
            item,
            has_body: false,
            equippable: None,
            target_part,
            slot_types: SlotRequirements::new(),
            claimed: Vec::new(),
            displacements: Vec::new(),
            failure: None,
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn item(&self) -> EntityId {
        self.item
    }

    /// Whether the actor's anatomy was resolved.
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    pub fn equippable(&self) -> Option<&Equippable> {
        self.equippable.as_ref()
    }

    pub fn target_part(&self) -> Option<BodyPartId> {
        self.target_part
    }

    /// Required slot types, one entry per needed part.
    pub fn slot_types(&self) -> &[String] {
        &self.slot_types
    }

    pub fn claimed_parts(&self) -> &[BodyPartId] {
        &self.claimed
    }

    pub fn displacements(&self) -> &[Displacement] {
        &self.displacements
    }

    pub fn has_displacements(&self) -> bool {
        !self.displacements.is_empty()
    }

    /// Distinct displaced items in order of first appearance.
    pub fn displaced_items(&self) -> Vec<EntityId> {
        let mut items = Vec::new();
        for displacement in &self.displacements {
            if !items.contains(&displacement.item) {
                items.push(displacement.item);
            }
        }
        items
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&EquipPlanError> {
        self.failure.as_ref()
    }

    /// Human-readable failure reason; empty for valid plans.
    pub fn failure_reason(&self) -> String {
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Marks the plan invalid. The first failure wins.
    pub fn invalidate(&mut self, error: EquipPlanError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    pub(crate) fn resolve(&mut self, equippable: Equippable, slot_types: SlotRequirements) {
        self.has_body = true;
        self.equippable = Some(equippable);
        self.slot_types = slot_types;
    }

    pub(crate) fn push_claim(&mut self, part: BodyPartId) -> bool {
        if self.claimed.contains(&part) {
            return false;
        }
        self.claimed.push(part);
        true
    }

    pub(crate) fn push_displacement(&mut self, displacement: Displacement) {
        self.displacements.push(displacement);
    }
}
