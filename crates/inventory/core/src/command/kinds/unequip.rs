use super::{applicable_bonus, fire_notice, fire_vetoable, report};
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::snapshot::EquippedStateSnapshot;
use crate::command::transaction::{InventoryOp, InventoryTransaction};
use crate::command::validation::{require_actor, require_item};
use crate::command::{InventoryCommand, InventoryContext};
use crate::world::{EntityId, EventKind, StatDelta};

/// Takes an equipped item off the actor and back into its carried list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnequipCommand {
    pub item: EntityId,
    pub quiet: bool,
}

impl UnequipCommand {
    pub fn new(item: EntityId) -> Self {
        Self { item, quiet: false }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn run(&self, ctx: &mut InventoryContext<'_>, tx: &mut InventoryTransaction) -> CommandResult {
        let actor = ctx.actor;
        let name = ctx.name(self.item);
        let snapshot = EquippedStateSnapshot::capture(ctx.world, actor, self.item);
        if !snapshot.has_location() {
            return Err(CommandError::execution(format!("{name} is not currently equipped.")));
        }

        fire_vetoable(ctx.world, EventKind::BeginUnequip, actor, self.item, || {
            format!("You can't take off {name} right now.")
        })?;
        detach_equipped(ctx, tx, &snapshot)?;
        fire_notice(ctx.world, EventKind::Unequipped, actor, self.item);

        Ok(CommandOutcome::message(format!("You unequip {name}.")))
    }
}

impl InventoryCommand for UnequipCommand {
    fn name(&self) -> &'static str {
        "unequip"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        let item = require_item(ctx, self.item)?;
        if !ctx.wears(self.item) {
            return Err(ValidationError::blocked(format!(
                "{} is not currently equipped.",
                item.name
            )));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let result = self.run(ctx, tx);
        report(self.name(), self.quiet, &result);
        result
    }
}

/// Strips the item's bonuses and takes it off the location in `snapshot`.
///
/// Registers two undo steps: re-applying the bonuses, then re-placing the
/// item. Rollback replays them in reverse, so placement is restored first.
pub(super) fn detach_equipped(
    ctx: &mut InventoryContext<'_>,
    tx: &mut InventoryTransaction,
    snapshot: &EquippedStateSnapshot,
) -> Result<(), CommandError> {
    let actor = ctx.actor;
    let item = snapshot.item;
    let name = ctx.name(item);

    let bonus = applicable_bonus(ctx.world, actor, item)?;
    if !bonus.is_empty() {
        let removal = bonus.iter().map(StatDelta::negated).collect();
        tx.apply(
            ctx.world,
            InventoryOp::AdjustStatBonuses {
                actor,
                deltas: removal,
            },
            InventoryOp::AdjustStatBonuses {
                actor,
                deltas: bonus,
            },
        )?;
    }

    let removed = if let Some(part) = snapshot.parts.first() {
        ctx.world.unequip_from_body_part(actor, *part)
    } else if let Some(slot) = &snapshot.legacy_slot {
        ctx.world.unequip_legacy(actor, slot)
    } else {
        Ok(None)
    };
    match removed {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(CommandError::execution(format!("{name} is not equipped.")));
        }
        Err(error) => {
            return Err(CommandError::execution(format!(
                "You can't take off {name}: {error}"
            )));
        }
    }

    tx.record_undo(InventoryOp::RestoreEquippedState {
        actor,
        snapshot: snapshot.clone(),
    });
    Ok(())
}
