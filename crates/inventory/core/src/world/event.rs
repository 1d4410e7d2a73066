//! Typed event messages with veto semantics.
//!
//! An event is fired at one entity; its registered handlers run in
//! registration order. A handler returning `false` stops propagation, which
//! the firing site reads as a veto. Handlers may also set `handled` to report
//! that they consumed the event without stopping it.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{EntityId, World};

/// Event identifiers fired by the inventory pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// Vetoable, fired on the actor before an item is equipped.
    BeginEquip,
    /// Fired on the actor after an item has been equipped.
    Equipped,
    /// Vetoable, fired on the actor before an item is unequipped.
    BeginUnequip,
    /// Fired on the actor after an item has been unequipped.
    Unequipped,
    /// Vetoable, fired on the actor before an item action runs.
    BeforeInventoryAction,
    /// Fired on the item; a handler must consume it.
    InventoryAction,
    /// Fired on the actor after an item action ran.
    AfterInventoryAction,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Parameter value attached to an event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventParam {
    Entity(EntityId),
    Text(String),
    Int(i64),
    Bool(bool),
}

/// A named message with a mutable parameter mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEvent {
    pub kind: EventKind,
    pub params: BTreeMap<String, EventParam>,
    pub handled: bool,
}

impl GameEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
            handled: false,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: EventParam) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn with_entity(self, key: impl Into<String>, id: EntityId) -> Self {
        self.with_param(key, EventParam::Entity(id))
    }

    pub fn with_text(self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_param(key, EventParam::Text(text.into()))
    }

    pub fn entity(&self, key: &str) -> Option<EntityId> {
        match self.params.get(key) {
            Some(EventParam::Entity(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(EventParam::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Receives events fired at the entity it is registered on.
pub trait EventHandler: Send + Sync {
    /// Returns `false` to stop propagation.
    fn handle(&self, world: &mut World, owner: EntityId, event: &mut GameEvent) -> bool;
}

impl<F> EventHandler for F
where
    F: Fn(&mut World, EntityId, &mut GameEvent) -> bool + Send + Sync,
{
    fn handle(&self, world: &mut World, owner: EntityId, event: &mut GameEvent) -> bool {
        self(world, owner, event)
    }
}

pub type SharedHandler = Arc<dyn EventHandler>;
