//! Entity/capability substrate consumed by the inventory rules.
//!
//! The [`World`] owns every entity and coordinates primitives that touch more
//! than one of them (an actor's body and the item placed on it, an inventory
//! and the item's physical back-references). Commands only mutate entities
//! through these primitives so occupancy and back-references stay in sync.

mod body;
mod capability;
mod event;
mod stats;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use body::{Body, BodyError, BodyPart, BodyPartId};
pub use capability::{
    Capabilities, Capability, CapabilityFlags, Equippable, Inventory, Physics, Position,
    SlotRequirements, Stacker, Tinkerer,
};
pub use event::{EventHandler, EventKind, EventParam, GameEvent, SharedHandler};
pub use stats::{
    BonusParseError, Stat, StatDelta, StatMap, apply_bonus_deltas, parse_bonus_spec,
};

use crate::config::{ConfigError, RulesConfig};
use crate::error::{ErrorSeverity, RulesError};

/// Unique identifier for any entity tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the zone an actor currently stands in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneId(pub String);

/// An entity: identity, data maps and a capability table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub tags: BTreeSet<String>,
    pub properties: BTreeMap<String, String>,
    pub stats: StatMap,
    pub capabilities: Capabilities,
}

impl Entity {
    pub fn get<T: Capability>(&self) -> Option<&T> {
        self.capabilities.get::<T>()
    }

    pub fn get_mut<T: Capability>(&mut self) -> Option<&mut T> {
        self.capabilities.get_mut::<T>()
    }

    pub fn has<T: Capability>(&self) -> bool {
        self.capabilities.flags().contains(T::FLAG)
    }

    pub fn stat(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }
}

/// Fluent description of an entity to spawn.
#[derive(Clone, Debug, Default)]
pub struct EntityBuilder {
    name: String,
    tags: BTreeSet<String>,
    properties: BTreeMap<String, String>,
    stats: StatMap,
    capabilities: Capabilities,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn stat(mut self, name: impl Into<String>, stat: Stat) -> Self {
        self.stats.insert(name.into(), stat);
        self
    }

    pub fn with<T: Capability>(mut self, capability: T) -> Self {
        self.capabilities.insert(capability);
        self
    }
}

/// Errors raised by world primitives.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {entity} has no {capability} capability")]
    MissingCapability {
        entity: EntityId,
        capability: &'static str,
    },

    #[error("{item} is too heavy for {owner} to carry")]
    TooHeavy { item: EntityId, owner: EntityId },

    #[error("{item} is not carried by {owner}")]
    NotCarried { item: EntityId, owner: EntityId },

    #[error("slot '{slot}' is occupied by {occupant}")]
    LegacySlotOccupied { slot: String, occupant: EntityId },

    #[error(transparent)]
    Body(#[from] BodyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidBonus(#[from] BonusParseError),
}

impl RulesError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEntity(_) | Self::MissingCapability { .. } => ErrorSeverity::Internal,
            Self::TooHeavy { .. } | Self::LegacySlotOccupied { .. } => ErrorSeverity::Recoverable,
            Self::NotCarried { .. } | Self::Body(_) => ErrorSeverity::Internal,
            Self::Config(_) | Self::InvalidBonus(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "WORLD_UNKNOWN_ENTITY",
            Self::MissingCapability { .. } => "WORLD_MISSING_CAPABILITY",
            Self::TooHeavy { .. } => "WORLD_TOO_HEAVY",
            Self::NotCarried { .. } => "WORLD_NOT_CARRIED",
            Self::LegacySlotOccupied { .. } => "WORLD_LEGACY_SLOT_OCCUPIED",
            Self::Body(_) => "WORLD_BODY",
            Self::Config(_) => "WORLD_CONFIG",
            Self::InvalidBonus(_) => "WORLD_INVALID_BONUS",
        }
    }
}

/// Owner of all entities and their event handlers.
#[derive(Clone, Default)]
pub struct World {
    config: RulesConfig,
    entities: BTreeMap<EntityId, Entity>,
    handlers: BTreeMap<EntityId, Vec<SharedHandler>>,
    next_id: u32,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl World {
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            entities: BTreeMap::new(),
            handlers: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Spawns an entity, validating equippable data against the registries.
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId, WorldError> {
        if let Some(equippable) = builder.capabilities.get::<Equippable>() {
            equippable.bonus_deltas()?;
            capability::check_equippable(equippable, &self.config)?;
        }

        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.entities.insert(
            id,
            Entity {
                id,
                name: builder.name,
                tags: builder.tags,
                properties: builder.properties,
                stats: builder.stats,
                capabilities: builder.capabilities,
            },
        );
        Ok(id)
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.handlers.remove(&id);
        self.entities.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn get<T: Capability>(&self, id: EntityId) -> Option<&T> {
        self.entity(id)?.get::<T>()
    }

    pub fn get_mut<T: Capability>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entity_mut(id)?.get_mut::<T>()
    }

    /// Display name, falling back to the entity id.
    pub fn name(&self, id: EntityId) -> String {
        self.entity(id)
            .map(|entity| entity.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn stack_count(&self, id: EntityId) -> u32 {
        self.get::<Stacker>(id).map_or(1, |stacker| stacker.stack_count)
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn register_handler(&mut self, id: EntityId, handler: impl EventHandler + 'static) {
        self.handlers
            .entry(id)
            .or_default()
            .push(std::sync::Arc::new(handler));
    }

    /// Fires `event` at `target`. Returns `false` iff a handler stopped it.
    pub fn fire_event(&mut self, target: EntityId, event: &mut GameEvent) -> bool {
        let handlers = match self.handlers.get(&target) {
            Some(handlers) => handlers.clone(),
            None => return true,
        };
        for handler in handlers {
            if !handler.handle(self, target, event) {
                tracing::debug!("handler on {} stopped {}", target, event.kind);
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Inventory primitives
    // ========================================================================

    fn inventory_mut(&mut self, owner: EntityId) -> Result<&mut Inventory, WorldError> {
        self.entity_mut(owner)
            .ok_or(WorldError::UnknownEntity(owner))?
            .get_mut::<Inventory>()
            .ok_or(WorldError::MissingCapability {
                entity: owner,
                capability: "inventory",
            })
    }

    fn body_mut(&mut self, owner: EntityId) -> Result<&mut Body, WorldError> {
        self.entity_mut(owner)
            .ok_or(WorldError::UnknownEntity(owner))?
            .get_mut::<Body>()
            .ok_or(WorldError::MissingCapability {
                entity: owner,
                capability: "body",
            })
    }

    fn set_holder(
        &mut self,
        item: EntityId,
        in_inventory: Option<EntityId>,
        equipped: Option<EntityId>,
    ) {
        if let Some(physics) = self.get_mut::<Physics>(item) {
            physics.in_inventory = in_inventory;
            physics.equipped = equipped;
            if in_inventory.is_some() || equipped.is_some() {
                physics.cell = None;
            }
        }
    }

    pub fn carried_weight(&self, owner: EntityId) -> u32 {
        self.get::<Inventory>(owner).map_or(0, |inventory| {
            inventory
                .items
                .iter()
                .filter_map(|item| self.get::<Physics>(*item))
                .fold(0u32, |total, physics| total.saturating_add(physics.weight))
        })
    }

    /// Adds `item` to the end of `owner`'s carried list, respecting weight limits.
    pub fn add_object(&mut self, owner: EntityId, item: EntityId) -> Result<(), WorldError> {
        if !self.contains(item) {
            return Err(WorldError::UnknownEntity(item));
        }
        let weight = self.get::<Physics>(item).map_or(0, |physics| physics.weight);
        let carried = self.carried_weight(owner);
        let inventory = self.inventory_mut(owner)?;
        if inventory.contains(item) {
            return Ok(());
        }
        if let Some(max) = inventory.max_weight
            && carried.checked_add(weight).is_none_or(|total| total > max)
        {
            return Err(WorldError::TooHeavy { item, owner });
        }
        inventory.items.push(item);
        self.set_holder(item, Some(owner), None);
        Ok(())
    }

    /// Places `item` at `index` (clamped) of `owner`'s carried list without a
    /// weight check. Used when returning items that were already accounted for.
    pub fn insert_object_at(
        &mut self,
        owner: EntityId,
        item: EntityId,
        index: usize,
    ) -> Result<(), WorldError> {
        let inventory = self.inventory_mut(owner)?;
        if inventory.contains(item) {
            inventory.move_to(item, index);
        } else {
            inventory.insert_at(item, index);
        }
        self.set_holder(item, Some(owner), None);
        Ok(())
    }

    /// Removes `item` from `owner`'s carried list, returning its former index.
    pub fn remove_object(&mut self, owner: EntityId, item: EntityId) -> Result<usize, WorldError> {
        let index = self
            .inventory_mut(owner)?
            .remove(item)
            .ok_or(WorldError::NotCarried { item, owner })?;
        self.set_holder(item, None, None);
        Ok(index)
    }

    fn return_to_inventory(&mut self, owner: EntityId, item: EntityId) {
        match self.inventory_mut(owner) {
            Ok(inventory) => {
                if !inventory.contains(item) {
                    inventory.items.push(item);
                }
                self.set_holder(item, Some(owner), None);
            }
            Err(_) => self.set_holder(item, None, None),
        }
    }

    // ========================================================================
    // Anatomy primitives
    // ========================================================================

    pub fn equip_to_body_part(
        &mut self,
        actor: EntityId,
        item: EntityId,
        part: BodyPartId,
    ) -> Result<(), WorldError> {
        self.equip_to_body_parts(actor, item, &[part])
    }

    /// Puts `item` on every listed part (first is primary) and takes it out of
    /// the actor's carried list.
    pub fn equip_to_body_parts(
        &mut self,
        actor: EntityId,
        item: EntityId,
        parts: &[BodyPartId],
    ) -> Result<(), WorldError> {
        if !self.contains(item) {
            return Err(WorldError::UnknownEntity(item));
        }
        self.body_mut(actor)?.equip_to_parts(item, parts)?;
        if let Ok(inventory) = self.inventory_mut(actor) {
            inventory.remove(item);
        }
        self.set_holder(item, None, Some(actor));
        Ok(())
    }

    /// Clears `part` and every other part its occupant spans; the item goes
    /// back to the end of the actor's carried list.
    pub fn unequip_from_body_part(
        &mut self,
        actor: EntityId,
        part: BodyPartId,
    ) -> Result<Option<EntityId>, WorldError> {
        let removed = self.body_mut(actor)?.unequip_from_part(part)?;
        if let Some(item) = removed {
            self.return_to_inventory(actor, item);
        }
        Ok(removed)
    }

    // ========================================================================
    // Legacy single-slot primitives (actors without anatomy)
    // ========================================================================

    pub fn equip_legacy(
        &mut self,
        actor: EntityId,
        item: EntityId,
        slot: &str,
    ) -> Result<(), WorldError> {
        if !self.contains(item) {
            return Err(WorldError::UnknownEntity(item));
        }
        let inventory = self.inventory_mut(actor)?;
        if let Some(occupant) = inventory.equipped(slot)
            && occupant != item
        {
            return Err(WorldError::LegacySlotOccupied {
                slot: slot.to_string(),
                occupant,
            });
        }
        inventory.remove(item);
        inventory.equip(slot, item);
        self.set_holder(item, None, Some(actor));
        Ok(())
    }

    pub fn unequip_legacy(
        &mut self,
        actor: EntityId,
        slot: &str,
    ) -> Result<Option<EntityId>, WorldError> {
        let removed = self.inventory_mut(actor)?.unequip(slot);
        if let Some(item) = removed {
            self.return_to_inventory(actor, item);
        }
        Ok(removed)
    }

    /// Adds deltas to `actor`'s bonus layers, returning what was applied.
    pub fn adjust_stat_bonuses(
        &mut self,
        actor: EntityId,
        deltas: &[StatDelta],
    ) -> Result<Vec<StatDelta>, WorldError> {
        let entity = self
            .entity_mut(actor)
            .ok_or(WorldError::UnknownEntity(actor))?;
        Ok(apply_bonus_deltas(&mut entity.stats, deltas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn world() -> World {
        World::new(RulesConfig::new())
    }

    #[test]
    fn spawn_rejects_unregistered_slot_types() {
        let mut world = world();
        let err = world
            .spawn(EntityBuilder::new("glove").with(Equippable::new("Hnad")))
            .unwrap_err();
        assert_eq!(
            err,
            WorldError::Config(ConfigError::UnknownSlotType("Hnad".into()))
        );
    }

    #[test]
    fn spawn_rejects_malformed_bonus_even_when_permissive() {
        let mut world = World::new(RulesConfig::permissive());
        let result = world.spawn(
            EntityBuilder::new("ring").with(Equippable::new("Hand").with_bonus("Strength")),
        );
        assert!(matches!(result, Err(WorldError::InvalidBonus(_))));
    }

    #[test]
    fn add_object_respects_weight_limit() {
        let mut world = world();
        let actor = world
            .spawn(EntityBuilder::new("porter").with(Inventory::new().with_max_weight(10)))
            .unwrap();
        let light = world
            .spawn(EntityBuilder::new("feather").with(Physics::new(4)))
            .unwrap();
        let heavy = world
            .spawn(EntityBuilder::new("anvil").with(Physics::new(7)))
            .unwrap();

        world.add_object(actor, light).unwrap();
        assert_eq!(
            world.add_object(actor, heavy),
            Err(WorldError::TooHeavy {
                item: heavy,
                owner: actor
            })
        );
        assert_eq!(world.get::<Physics>(light).unwrap().in_inventory, Some(actor));
    }

    #[test]
    fn weight_overflow_counts_as_too_heavy() {
        let mut world = world();
        let actor = world
            .spawn(EntityBuilder::new("titan").with(Inventory::new().with_max_weight(u32::MAX)))
            .unwrap();
        let mountain = world
            .spawn(EntityBuilder::new("mountain").with(Physics::new(u32::MAX)))
            .unwrap();
        let pebble = world
            .spawn(EntityBuilder::new("pebble").with(Physics::new(1)))
            .unwrap();

        world.add_object(actor, mountain).unwrap();
        assert_eq!(
            world.add_object(actor, pebble),
            Err(WorldError::TooHeavy {
                item: pebble,
                owner: actor
            })
        );
        assert_eq!(world.carried_weight(actor), u32::MAX);
    }

    #[test]
    fn carried_weight_saturates() {
        let mut world = world();
        let actor = world
            .spawn(EntityBuilder::new("hoarder").with(Inventory::new()))
            .unwrap();
        for name in ["moon", "star"] {
            let item = world
                .spawn(EntityBuilder::new(name).with(Physics::new(u32::MAX)))
                .unwrap();
            world.add_object(actor, item).unwrap();
        }
        assert_eq!(world.carried_weight(actor), u32::MAX);
    }

    #[test]
    fn equip_and_unequip_move_item_between_body_and_inventory() {
        let mut world = world();
        let actor = world
            .spawn(
                EntityBuilder::new("hero")
                    .with(Body::humanoid())
                    .with(Inventory::new()),
            )
            .unwrap();
        let sword = world
            .spawn(
                EntityBuilder::new("sword")
                    .with(Equippable::new("Hand"))
                    .with(Physics::new(5)),
            )
            .unwrap();
        world.add_object(actor, sword).unwrap();
        let hand = world
            .get::<Body>(actor)
            .unwrap()
            .equippable_slots("Hand")
            .next()
            .unwrap()
            .id;

        world.equip_to_body_part(actor, sword, hand).unwrap();
        assert!(!world.get::<Inventory>(actor).unwrap().contains(sword));
        assert_eq!(world.get::<Physics>(sword).unwrap().equipped, Some(actor));

        assert_eq!(world.unequip_from_body_part(actor, hand), Ok(Some(sword)));
        assert!(world.get::<Inventory>(actor).unwrap().contains(sword));
        assert_eq!(world.get::<Physics>(sword).unwrap().equipped, None);
    }

    #[test]
    fn fire_event_stops_at_first_veto() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let mut world = world();
        let actor = world.spawn(EntityBuilder::new("hero")).unwrap();
        world.register_handler(actor, |_: &mut World, _: EntityId, _: &mut GameEvent| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            false
        });
        world.register_handler(actor, |_: &mut World, _: EntityId, _: &mut GameEvent| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            true
        });

        let mut event = GameEvent::new(EventKind::BeginEquip);
        assert!(!world.fire_event(actor, &mut event));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
