//! Typed capability table attached to every entity.
//!
//! An entity may or may not expose each capability. Lookup is by type through
//! the [`Capability`] trait, so callers write `entity.get::<Equippable>()`
//! instead of inspecting concrete entity kinds.

use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::EntityId;
use super::body::Body;
use super::stats::{BonusParseError, StatDelta, parse_bonus_spec};
use crate::config::RulesConfig;

bitflags! {
    /// Presence set of capabilities on one entity.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CapabilityFlags: u8 {
        const BODY       = 1 << 0;
        const INVENTORY  = 1 << 1;
        const EQUIPPABLE = 1 << 2;
        const STACKER    = 1 << 3;
        const PHYSICS    = 1 << 4;
        const TINKERER   = 1 << 5;
    }
}

/// Carried-item container.
///
/// `items` is ordered; index positions are meaningful and restored by
/// snapshots. `legacy_slots` serves actors without anatomy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    pub items: Vec<EntityId>,
    pub max_weight: Option<u32>,
    pub legacy_slots: BTreeMap<String, EntityId>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_weight(mut self, max_weight: u32) -> Self {
        self.max_weight = Some(max_weight);
        self
    }

    pub fn contains(&self, item: EntityId) -> bool {
        self.items.contains(&item)
    }

    pub fn index_of(&self, item: EntityId) -> Option<usize> {
        self.items.iter().position(|id| *id == item)
    }

    pub fn remove(&mut self, item: EntityId) -> Option<usize> {
        let index = self.index_of(item)?;
        self.items.remove(index);
        Some(index)
    }

    /// Inserts at `index`, clamped to the current length.
    pub fn insert_at(&mut self, item: EntityId, index: usize) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Moves an already carried item to `index` (clamped).
    pub fn move_to(&mut self, item: EntityId, index: usize) {
        if self.remove(item).is_some() {
            self.insert_at(item, index);
        }
    }

    pub fn equipped(&self, slot: &str) -> Option<EntityId> {
        self.legacy_slots.get(slot).copied()
    }

    pub fn find_equipped_slot(&self, item: EntityId) -> Option<&str> {
        self.legacy_slots
            .iter()
            .find(|(_, id)| **id == item)
            .map(|(slot, _)| slot.as_str())
    }

    /// Legacy single-slot equip. Returns the previous occupant.
    pub fn equip(&mut self, slot: impl Into<String>, item: EntityId) -> Option<EntityId> {
        self.legacy_slots.insert(slot.into(), item)
    }

    pub fn unequip(&mut self, slot: &str) -> Option<EntityId> {
        self.legacy_slots.remove(slot)
    }
}

/// Slot requirements parsed from an equippable's slot spec.
pub type SlotRequirements = ArrayVec<String, { RulesConfig::MAX_SLOT_REQUIREMENTS }>;

/// Equippable capability.
///
/// `slot` is a separator-delimited list of slot types; a type appears once
/// per body part needed (`"Hand,Hand"` for a two-handed weapon).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equippable {
    pub slot: String,
    pub equip_bonus: Option<String>,
}

impl Equippable {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            equip_bonus: None,
        }
    }

    pub fn with_bonus(mut self, spec: impl Into<String>) -> Self {
        self.equip_bonus = Some(spec.into());
        self
    }

    /// Trimmed, non-empty slot-type tokens in declaration order.
    ///
    /// Tokens beyond [`RulesConfig::MAX_SLOT_REQUIREMENTS`] are dropped;
    /// spawning and planning both reject such items, so compare against
    /// [`Self::slot_token_count`] before trusting the list.
    pub fn slot_types(&self) -> SlotRequirements {
        self.slot
            .split(RulesConfig::SLOT_SEPARATOR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .take(RulesConfig::MAX_SLOT_REQUIREMENTS)
            .map(str::to_string)
            .collect()
    }

    pub fn slot_token_count(&self) -> usize {
        self.slot
            .split(RulesConfig::SLOT_SEPARATOR)
            .filter(|token| !token.trim().is_empty())
            .count()
    }

    /// The single slot used on actors without anatomy.
    pub fn legacy_slot(&self) -> Option<String> {
        self.slot_types().into_iter().next()
    }

    pub fn bonus_deltas(&self) -> Result<Vec<StatDelta>, BonusParseError> {
        match &self.equip_bonus {
            Some(spec) => parse_bonus_spec(spec),
            None => Ok(Vec::new()),
        }
    }

    pub fn has_bonus(&self) -> bool {
        self.equip_bonus
            .as_deref()
            .is_some_and(|spec| !spec.trim().is_empty())
    }
}

/// Stackable capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stacker {
    pub stack_count: u32,
}

impl Stacker {
    pub fn new(stack_count: u32) -> Self {
        Self { stack_count }
    }

    pub fn is_stacked(&self) -> bool {
        self.stack_count > 1
    }
}

/// Discrete cell coordinates inside a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Physical placement capability with back-references to holders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Physics {
    pub weight: u32,
    pub in_inventory: Option<EntityId>,
    pub equipped: Option<EntityId>,
    pub cell: Option<Position>,
}

impl Physics {
    pub fn new(weight: u32) -> Self {
        Self {
            weight,
            ..Self::default()
        }
    }
}

/// Crafting capability: the recipes an actor knows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tinkerer {
    pub known_recipes: BTreeSet<String>,
}

impl Tinkerer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.known_recipes.insert(recipe.into());
        self
    }

    pub fn knows(&self, recipe: &str) -> bool {
        self.known_recipes.contains(recipe)
    }
}

/// One optional slot per capability kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    pub body: Option<Body>,
    pub inventory: Option<Inventory>,
    pub equippable: Option<Equippable>,
    pub stacker: Option<Stacker>,
    pub physics: Option<Physics>,
    pub tinkerer: Option<Tinkerer>,
}

impl Capabilities {
    pub fn flags(&self) -> CapabilityFlags {
        let mut flags = CapabilityFlags::empty();
        flags.set(CapabilityFlags::BODY, self.body.is_some());
        flags.set(CapabilityFlags::INVENTORY, self.inventory.is_some());
        flags.set(CapabilityFlags::EQUIPPABLE, self.equippable.is_some());
        flags.set(CapabilityFlags::STACKER, self.stacker.is_some());
        flags.set(CapabilityFlags::PHYSICS, self.physics.is_some());
        flags.set(CapabilityFlags::TINKERER, self.tinkerer.is_some());
        flags
    }

    pub fn get<T: Capability>(&self) -> Option<&T> {
        T::slot(self).as_ref()
    }

    pub fn get_mut<T: Capability>(&mut self) -> Option<&mut T> {
        T::slot_mut(self).as_mut()
    }

    pub fn insert<T: Capability>(&mut self, capability: T) -> Option<T> {
        T::slot_mut(self).replace(capability)
    }

    pub fn remove<T: Capability>(&mut self) -> Option<T> {
        T::slot_mut(self).take()
    }
}

/// A capability type stored in a fixed slot of [`Capabilities`].
pub trait Capability: Sized {
    const FLAG: CapabilityFlags;

    fn slot(caps: &Capabilities) -> &Option<Self>;
    fn slot_mut(caps: &mut Capabilities) -> &mut Option<Self>;
}

macro_rules! impl_capability {
    ($ty:ty, $field:ident, $flag:ident) => {
        impl Capability for $ty {
            const FLAG: CapabilityFlags = CapabilityFlags::$flag;

            fn slot(caps: &Capabilities) -> &Option<Self> {
                &caps.$field
            }

            fn slot_mut(caps: &mut Capabilities) -> &mut Option<Self> {
                &mut caps.$field
            }
        }
    };
}

impl_capability!(Body, body, BODY);
impl_capability!(Inventory, inventory, INVENTORY);
impl_capability!(Equippable, equippable, EQUIPPABLE);
impl_capability!(Stacker, stacker, STACKER);
impl_capability!(Physics, physics, PHYSICS);
impl_capability!(Tinkerer, tinkerer, TINKERER);

/// Validates an equippable against the registries in `config`.
pub(crate) fn check_equippable(
    equippable: &Equippable,
    config: &RulesConfig,
) -> Result<(), crate::config::ConfigError> {
    let count = equippable.slot_token_count();
    if count > RulesConfig::MAX_SLOT_REQUIREMENTS {
        return Err(crate::config::ConfigError::TooManySlotRequirements {
            count,
            max: RulesConfig::MAX_SLOT_REQUIREMENTS,
        });
    }
    for slot_type in equippable.slot_types() {
        config.check_slot_type(&slot_type)?;
    }
    if let Ok(deltas) = equippable.bonus_deltas() {
        for delta in deltas {
            config.check_stat(&delta.stat)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_types_are_trimmed_and_non_empty() {
        let equippable = Equippable::new(" Hand , ,Hand ");
        assert_eq!(equippable.slot_types().as_slice(), ["Hand", "Hand"]);
        assert_eq!(equippable.legacy_slot().as_deref(), Some("Hand"));
        assert!(Equippable::new(" , ").slot_types().is_empty());
    }

    #[test]
    fn typed_lookup_matches_flags() {
        let mut caps = Capabilities::default();
        assert!(caps.get::<Body>().is_none());
        caps.insert(Body::humanoid());
        caps.insert(Stacker::new(3));

        assert!(caps.get::<Body>().is_some());
        assert_eq!(caps.flags(), CapabilityFlags::BODY | CapabilityFlags::STACKER);
        assert!(caps.flags().contains(<Stacker as Capability>::FLAG));

        caps.get_mut::<Stacker>().unwrap().stack_count = 1;
        assert!(!caps.get::<Stacker>().unwrap().is_stacked());
    }

    #[test]
    fn inventory_reinsert_is_clamped() {
        let mut inventory = Inventory::new();
        inventory.items = vec![EntityId(1), EntityId(2)];
        inventory.insert_at(EntityId(3), 10);
        assert_eq!(inventory.index_of(EntityId(3)), Some(2));
        inventory.move_to(EntityId(3), 0);
        assert_eq!(inventory.items, vec![EntityId(3), EntityId(1), EntityId(2)]);
    }

    #[test]
    fn registry_check_covers_slots_and_bonus_stats() {
        let config = RulesConfig::new();
        let ok = Equippable::new("Hand,Hand").with_bonus("Strength:2");
        assert!(check_equippable(&ok, &config).is_ok());

        let bad_stat = Equippable::new("Hand").with_bonus("Strenght:2");
        assert!(check_equippable(&bad_stat, &config).is_err());
    }
}
