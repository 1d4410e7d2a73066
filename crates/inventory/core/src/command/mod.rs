//! Inventory command pipeline.
//!
//! Every player-facing inventory operation is a command with two phases:
//! `validate` inspects the world without mutating it, and `execute` performs
//! the change while registering compensating steps on an
//! [`InventoryTransaction`]. The [`InventoryPipeline`] runs both phases and
//! turns panics during `execute` into [`CommandError::Exception`].
//!
//! # Module Structure
//!
//! - `result`: validation/command error taxonomies and `CommandOutcome`
//! - `snapshot`: equipped-state and item-action snapshots used by undo
//! - `transaction`: `InventoryOp` undo records and `InventoryTransaction`
//! - `validation`: shared precondition checks
//! - `pipeline`: `InventoryPipeline`
//! - `kinds`: the concrete commands

mod kinds;
mod pipeline;
mod result;
mod snapshot;
mod transaction;
mod validation;

pub use kinds::{
    ApplyModificationCommand, AutoEquipCommand, CraftCommand, DisassembleCommand, EquipCommand,
    PerformInventoryActionCommand, UnequipCommand,
};
pub use pipeline::InventoryPipeline;
pub use result::{
    CommandError, CommandErrorCode, CommandOutcome, CommandResult, ValidationError,
    ValidationErrorCode,
};
pub use snapshot::{EquippedStateSnapshot, InventoryActionSnapshot, RestoreError};
pub use transaction::{
    InventoryOp, InventoryTransaction, RollbackError, TransactionEntry, TransactionState,
    UndoFailure,
};

use crate::env::InventoryEnv;
use crate::equip::EquipPlanner;
use crate::world::{Body, Entity, EntityId, Inventory, World, ZoneId};

/// Everything a command needs while it runs.
pub struct InventoryContext<'a> {
    pub world: &'a mut World,
    pub env: InventoryEnv<'a>,
    pub actor: EntityId,
    pub zone: Option<ZoneId>,
    planner: &'a EquipPlanner,
}

impl<'a> InventoryContext<'a> {
    pub fn new(world: &'a mut World, actor: EntityId) -> Self {
        Self {
            world,
            env: InventoryEnv::empty(),
            actor,
            zone: None,
            planner: EquipPlanner::standard(),
        }
    }

    pub fn with_env(mut self, env: InventoryEnv<'a>) -> Self {
        self.env = env;
        self
    }

    pub fn with_zone(mut self, zone: ZoneId) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_planner(mut self, planner: &'a EquipPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn planner(&self) -> &'a EquipPlanner {
        self.planner
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn actor_entity(&self) -> Option<&Entity> {
        self.world.entity(self.actor)
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.world.get::<Inventory>(self.actor)
    }

    pub fn body(&self) -> Option<&Body> {
        self.world.get::<Body>(self.actor)
    }

    /// Whether `item` sits in the actor's carried list.
    pub fn carries(&self, item: EntityId) -> bool {
        self.inventory()
            .is_some_and(|inventory| inventory.contains(item))
    }

    /// Whether the actor wears `item`, on its body or in a legacy slot.
    pub fn wears(&self, item: EntityId) -> bool {
        self.body().is_some_and(|body| body.is_equipped(item))
            || self
                .inventory()
                .is_some_and(|inventory| inventory.find_equipped_slot(item).is_some())
    }

    pub fn name(&self, id: EntityId) -> String {
        self.world.name(id)
    }
}

impl core::fmt::Debug for InventoryContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryContext")
            .field("actor", &self.actor)
            .field("zone", &self.zone)
            .field("env", &self.env)
            .finish()
    }
}

/// A two-phase inventory operation.
pub trait InventoryCommand {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Checks preconditions. Must not mutate the world and may be called
    /// any number of times.
    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError>;

    /// Performs the operation. Assumes `validate` succeeded; every side
    /// effect is either run through `tx` or followed by a recorded undo.
    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        tx: &mut InventoryTransaction,
    ) -> CommandResult;
}
