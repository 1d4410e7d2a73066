//! Anatomy: an ordered set of body parts that hold equipment.

use std::fmt;

use super::EntityId;

/// Identifier of a body part, unique within one body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyPartId(pub u16);

impl fmt::Display for BodyPartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}", self.0)
    }
}

/// A concrete anatomical node.
///
/// Holds at most one item. When an item spans several parts, exactly one of
/// them carries `first_slot_for_equipped`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyPart {
    pub id: BodyPartId,
    pub name: String,
    pub slot_type: String,
    pub equipped: Option<EntityId>,
    pub first_slot_for_equipped: bool,
}

impl BodyPart {
    pub fn new(id: BodyPartId, name: impl Into<String>, slot_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slot_type: slot_type.into(),
            equipped: None,
            first_slot_for_equipped: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.equipped.is_some()
    }

    fn clear(&mut self) {
        self.equipped = None;
        self.first_slot_for_equipped = false;
    }
}

/// Body anatomy capability.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    parts: Vec<BodyPart>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part; ids are assigned in insertion order.
    pub fn with_part(
        mut self,
        name: impl Into<String>,
        slot_type: impl Into<String>,
    ) -> Result<Self, BodyError> {
        self.add_part(name, slot_type)?;
        Ok(self)
    }

    /// Fails once every [`BodyPartId`] is taken.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        slot_type: impl Into<String>,
    ) -> Result<BodyPartId, BodyError> {
        let id = u16::try_from(self.parts.len())
            .map(BodyPartId)
            .map_err(|_| BodyError::TooManyParts)?;
        self.parts.push(BodyPart::new(id, name, slot_type));
        Ok(id)
    }

    /// A humanoid with head, body, back, two arms, two hands and feet.
    pub fn humanoid() -> Self {
        const PARTS: [(&str, &str); 8] = [
            ("Head", "Head"),
            ("Body", "Body"),
            ("Back", "Back"),
            ("Left Arm", "Arm"),
            ("Right Arm", "Arm"),
            ("Left Hand", "Hand"),
            ("Right Hand", "Hand"),
            ("Feet", "Feet"),
        ];
        let parts = PARTS
            .iter()
            .zip(0u16..)
            .map(|((name, slot_type), id)| BodyPart::new(BodyPartId(id), *name, *slot_type))
            .collect();
        Self { parts }
    }

    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    pub fn part(&self, id: BodyPartId) -> Option<&BodyPart> {
        self.parts.iter().find(|part| part.id == id)
    }

    pub fn contains_part(&self, id: BodyPartId) -> bool {
        self.part(id).is_some()
    }

    /// All parts of `slot_type`, in body order.
    pub fn equippable_slots<'a>(&'a self, slot_type: &str) -> impl Iterator<Item = &'a BodyPart> {
        self.parts
            .iter()
            .filter(move |part| part.slot_type == slot_type)
    }

    /// Parts currently held by `item`, in body order.
    pub fn parts_occupied_by(&self, item: EntityId) -> impl Iterator<Item = &BodyPart> {
        self.parts
            .iter()
            .filter(move |part| part.equipped == Some(item))
    }

    pub fn is_equipped(&self, item: EntityId) -> bool {
        self.parts_occupied_by(item).next().is_some()
    }

    /// Every distinct item worn on this body, in body order.
    pub fn equipped_items(&self) -> Vec<EntityId> {
        let mut items = Vec::new();
        for part in &self.parts {
            if let Some(item) = part.equipped
                && !items.contains(&item)
            {
                items.push(item);
            }
        }
        items
    }

    /// Places `item` on a single part, marking it primary.
    pub fn equip_to_part(&mut self, item: EntityId, part: BodyPartId) -> Result<(), BodyError> {
        self.equip_to_parts(item, &[part])
    }

    /// Places `item` on every listed part; the first one is flagged primary.
    ///
    /// All parts must exist and be free (or already hold `item`) before any
    /// occupancy changes.
    pub fn equip_to_parts(
        &mut self,
        item: EntityId,
        parts: &[BodyPartId],
    ) -> Result<(), BodyError> {
        if parts.is_empty() {
            return Err(BodyError::NoParts);
        }
        for id in parts {
            let part = self.part(*id).ok_or(BodyError::UnknownPart(*id))?;
            if let Some(occupant) = part.equipped
                && occupant != item
            {
                return Err(BodyError::Occupied {
                    part: *id,
                    occupant,
                });
            }
        }
        for (index, id) in parts.iter().enumerate() {
            if let Some(part) = self.parts.iter_mut().find(|part| part.id == *id) {
                part.equipped = Some(item);
                part.first_slot_for_equipped = index == 0;
            }
        }
        Ok(())
    }

    /// Removes whatever occupies `part`, clearing every part that item spans.
    ///
    /// Returns the removed item, or `None` when the part was empty.
    pub fn unequip_from_part(&mut self, part: BodyPartId) -> Result<Option<EntityId>, BodyError> {
        let occupant = self
            .part(part)
            .ok_or(BodyError::UnknownPart(part))?
            .equipped;
        if let Some(item) = occupant {
            for slot in self.parts.iter_mut().filter(|p| p.equipped == Some(item)) {
                slot.clear();
            }
        }
        Ok(occupant)
    }
}

/// Errors raised by anatomy primitives.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyError {
    #[error("body has no {0}")]
    UnknownPart(BodyPartId),

    #[error("{part} is occupied by {occupant}")]
    Occupied { part: BodyPartId, occupant: EntityId },

    #[error("no body parts given")]
    NoParts,

    #[error("body has no room for another part")]
    TooManyParts,
}
