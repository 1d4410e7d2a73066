//! Concrete inventory commands.

mod auto_equip;
mod craft;
mod disassemble;
mod equip;
mod modify;
mod perform_action;
mod unequip;

pub use auto_equip::AutoEquipCommand;
pub use craft::CraftCommand;
pub use disassemble::DisassembleCommand;
pub use equip::EquipCommand;
pub use modify::ApplyModificationCommand;
pub use perform_action::PerformInventoryActionCommand;
pub use unequip::UnequipCommand;

use super::result::{CommandError, CommandResult};
use crate::world::{EntityId, Equippable, EventKind, GameEvent, StatDelta, World};

/// Equip-bonus deltas of `item` that apply to stats `actor` actually has.
fn applicable_bonus(
    world: &World,
    actor: EntityId,
    item: EntityId,
) -> Result<Vec<StatDelta>, CommandError> {
    let Some(equippable) = world.get::<Equippable>(item) else {
        return Ok(Vec::new());
    };
    let deltas = equippable
        .bonus_deltas()
        .map_err(|error| CommandError::Exception(error.to_string()))?;
    let Some(entity) = world.entity(actor) else {
        return Ok(Vec::new());
    };
    Ok(deltas
        .into_iter()
        .filter(|delta| entity.stats.contains_key(&delta.stat))
        .collect())
}

/// Fires an actor/item event; returns the event back on success and a
/// failure carrying the handler's `reason` (or `fallback`) on veto.
fn fire_vetoable(
    world: &mut World,
    kind: EventKind,
    actor: EntityId,
    item: EntityId,
    fallback: impl FnOnce() -> String,
) -> Result<GameEvent, CommandError> {
    let mut event = GameEvent::new(kind)
        .with_entity("actor", actor)
        .with_entity("item", item);
    if world.fire_event(actor, &mut event) {
        Ok(event)
    } else {
        let reason = event.text("reason").map(str::to_string);
        Err(CommandError::ExecutionFailed(reason.unwrap_or_else(fallback)))
    }
}

fn fire_notice(world: &mut World, kind: EventKind, actor: EntityId, item: EntityId) {
    let mut event = GameEvent::new(kind)
        .with_entity("actor", actor)
        .with_entity("item", item);
    world.fire_event(actor, &mut event);
}

/// Emits the player-facing log line unless `quiet`.
fn report(command: &'static str, quiet: bool, result: &CommandResult) {
    if quiet {
        return;
    }
    match result {
        Ok(outcome) => tracing::info!("{}", outcome.message),
        Err(error) => tracing::info!("{} failed: {}", command, error),
    }
}
