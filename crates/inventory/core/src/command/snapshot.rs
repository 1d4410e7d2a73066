//! Captured placement and stat state used as undo anchors.

use super::transaction::TransactionState;
use crate::world::{
    Body, BodyError, BodyPartId, EntityId, Inventory, Physics, Position, Stacker, StatMap, World,
    WorldError,
};

/// Errors raised when replaying a snapshot or undo record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    #[error("{slot} is now held by {occupant}")]
    SlotTaken { slot: String, occupant: EntityId },

    #[error("transaction is no longer open ({0:?})")]
    TransactionClosed(TransactionState),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// Where an item was equipped on an actor.
///
/// `parts` lists the primary part first; `legacy_slot` is used only when the
/// actor has no anatomy. Both empty means the item was not equipped.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquippedStateSnapshot {
    pub item: EntityId,
    pub parts: Vec<BodyPartId>,
    pub legacy_slot: Option<String>,
}

impl EquippedStateSnapshot {
    pub fn capture(world: &World, actor: EntityId, item: EntityId) -> Self {
        let mut parts = Vec::new();
        if let Some(body) = world.get::<Body>(actor) {
            for part in body.parts_occupied_by(item) {
                if part.first_slot_for_equipped {
                    parts.insert(0, part.id);
                } else {
                    parts.push(part.id);
                }
            }
        }
        let legacy_slot = if parts.is_empty() {
            world
                .get::<Inventory>(actor)
                .and_then(|inventory| inventory.find_equipped_slot(item))
                .map(str::to_string)
        } else {
            None
        };
        Self {
            item,
            parts,
            legacy_slot,
        }
    }

    pub fn has_location(&self) -> bool {
        !self.parts.is_empty() || self.legacy_slot.is_some()
    }

    /// Re-equips the item exactly where it was.
    ///
    /// Refuses when any recorded slot now holds a different item. An item
    /// already equipped elsewhere on the actor is taken off first.
    pub fn restore(&self, world: &mut World, actor: EntityId) -> Result<(), RestoreError> {
        if !self.parts.is_empty() {
            let body = world.get::<Body>(actor).ok_or(WorldError::MissingCapability {
                entity: actor,
                capability: "body",
            })?;
            for id in &self.parts {
                let part = body
                    .part(*id)
                    .ok_or(WorldError::Body(BodyError::UnknownPart(*id)))?;
                if let Some(occupant) = part.equipped
                    && occupant != self.item
                {
                    return Err(RestoreError::SlotTaken {
                        slot: part.name.clone(),
                        occupant,
                    });
                }
            }
            detach(world, actor, self.item)?;
            world.equip_to_body_parts(actor, self.item, &self.parts)?;
            return Ok(());
        }

        if let Some(slot) = &self.legacy_slot {
            if let Some(occupant) = world
                .get::<Inventory>(actor)
                .and_then(|inventory| inventory.equipped(slot))
                && occupant != self.item
            {
                return Err(RestoreError::SlotTaken {
                    slot: slot.clone(),
                    occupant,
                });
            }
            detach(world, actor, self.item)?;
            world.equip_legacy(actor, self.item, slot)?;
        }
        Ok(())
    }
}

/// Takes `item` off wherever the actor currently wears it. The item lands at
/// the end of the carried list.
pub(crate) fn detach(world: &mut World, actor: EntityId, item: EntityId) -> Result<(), WorldError> {
    let current = EquippedStateSnapshot::capture(world, actor, item);
    if let Some(part) = current.parts.first() {
        world.unequip_from_body_part(actor, *part)?;
    } else if let Some(slot) = &current.legacy_slot {
        world.unequip_legacy(actor, slot)?;
    }
    Ok(())
}

/// Placement of one item at capture time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct ItemPlacement {
    item: EntityId,
    stack_count: Option<u32>,
    carried_index: Option<usize>,
    equipped: Option<EquippedStateSnapshot>,
    in_inventory: Option<EntityId>,
    equipped_by: Option<EntityId>,
    cell: Option<Position>,
}

/// Actor stats plus the placement of one item, captured before an arbitrary
/// item action runs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryActionSnapshot {
    actor: EntityId,
    stats: StatMap,
    placement: ItemPlacement,
}

impl InventoryActionSnapshot {
    /// Returns `None` when the actor or item does not exist.
    pub fn capture(world: &World, actor: EntityId, item: EntityId) -> Option<Self> {
        let stats = world.entity(actor)?.stats.clone();
        let item_entity = world.entity(item)?;
        let physics = item_entity.get::<Physics>();

        let equipped = EquippedStateSnapshot::capture(world, actor, item);
        let placement = ItemPlacement {
            item,
            stack_count: item_entity.get::<Stacker>().map(|stacker| stacker.stack_count),
            carried_index: world
                .get::<Inventory>(actor)
                .and_then(|inventory| inventory.index_of(item)),
            equipped: equipped.has_location().then_some(equipped),
            in_inventory: physics.and_then(|physics| physics.in_inventory),
            equipped_by: physics.and_then(|physics| physics.equipped),
            cell: physics.and_then(|physics| physics.cell),
        };
        Some(Self {
            actor,
            stats,
            placement,
        })
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn item(&self) -> EntityId {
        self.placement.item
    }

    /// Writes the captured stats and item placement back into the world.
    pub fn restore(&self, world: &mut World) -> Result<(), RestoreError> {
        self.restore_stats(world)?;
        self.restore_placement(world)
    }

    fn restore_stats(&self, world: &mut World) -> Result<(), RestoreError> {
        let entity = world
            .entity_mut(self.actor)
            .ok_or(WorldError::UnknownEntity(self.actor))?;
        entity.stats.retain(|name, _| self.stats.contains_key(name));
        for (name, captured) in &self.stats {
            match entity.stats.get_mut(name) {
                Some(stat) => stat.restore_from(captured),
                None => {
                    entity.stats.insert(name.clone(), captured.clone());
                }
            }
        }
        Ok(())
    }

    fn restore_placement(&self, world: &mut World) -> Result<(), RestoreError> {
        let placement = &self.placement;
        let item = placement.item;
        if !world.contains(item) {
            return Err(WorldError::UnknownEntity(item).into());
        }
        if let Some(count) = placement.stack_count
            && let Some(stacker) = world.get_mut::<Stacker>(item)
        {
            stacker.stack_count = count;
        }

        if let Some(index) = placement.carried_index {
            detach(world, self.actor, item)?;
            world.insert_object_at(self.actor, item, index)?;
            return Ok(());
        }
        if let Some(equipped) = &placement.equipped {
            return equipped.restore(world, self.actor);
        }

        detach(world, self.actor, item)?;
        if world
            .get::<Inventory>(self.actor)
            .is_some_and(|inventory| inventory.contains(item))
        {
            world.remove_object(self.actor, item)?;
        }
        if let Some(physics) = world.get_mut::<Physics>(item) {
            physics.in_inventory = placement.in_inventory;
            physics.equipped = placement.equipped_by;
            physics.cell = placement.cell;
        }
        Ok(())
    }
}
