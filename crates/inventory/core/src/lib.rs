//! Inventory command pipeline and equip planning for a turn-based roguelike.
//!
//! `inventory-core` decides which body parts an item occupies, what it
//! displaces, and how a partially applied inventory change is undone. Every
//! player-facing operation is an [`command::InventoryCommand`] run through
//! [`command::InventoryPipeline`]; world mutations go through the primitives
//! on [`world::World`] so occupancy and back-references stay consistent.
pub mod command;
pub mod config;
pub mod env;
pub mod equip;
pub mod error;
pub mod world;

pub use command::{
    ApplyModificationCommand, AutoEquipCommand, CommandError, CommandErrorCode, CommandOutcome,
    CommandResult, CraftCommand, DisassembleCommand, EquipCommand, EquippedStateSnapshot,
    InventoryActionSnapshot, InventoryCommand, InventoryContext, InventoryOp, InventoryPipeline,
    InventoryTransaction, PerformInventoryActionCommand, RestoreError, RollbackError,
    TransactionState, UnequipCommand, ValidationError, ValidationErrorCode,
};
pub use config::{ConfigError, RulesConfig};
pub use env::{EnvError, InventoryEnv, TinkerRefusal, TinkeringService};
pub use equip::{Displacement, EquipPlan, EquipPlanError, EquipPlanner};
pub use error::{ErrorSeverity, RulesError};
pub use world::{
    Body, BodyPart, BodyPartId, Capability, EntityBuilder, EntityId, Equippable, EventKind,
    GameEvent, Inventory, Physics, Stacker, Stat, StatDelta, Tinkerer, World, WorldError, ZoneId,
};
