use super::equip::EquipCommand;
use super::report;
use crate::command::result::{CommandError, CommandResult, ValidationError};
use crate::command::transaction::InventoryTransaction;
use crate::command::validation::{
    require_actor, require_carried, require_equippable, require_inventory,
};
use crate::command::{InventoryCommand, InventoryContext};
use crate::world::{EntityId, Equippable, Inventory};

/// Equips an item wherever it fits without taking anything else off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoEquipCommand {
    pub item: EntityId,
    pub quiet: bool,
}

impl AutoEquipCommand {
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
        if ctx.world().stack_count(self.item) > 1 {
            return Err(CommandError::execution(format!(
                "You can only auto-equip a single {name}."
            )));
        }

        let equip = if ctx.body().is_some() {
            let plan = ctx.planner().build(ctx.world, actor, self.item, None);
            if !plan.is_valid() {
                return Err(CommandError::ExecutionFailed(plan.failure_reason()));
            }
            if plan.has_displacements() {
                return Err(CommandError::execution(format!(
                    "There's no free place to put {name}."
                )));
            }
            EquipCommand::new(self.item).with_plan(plan)
        } else {
            let slot = ctx
                .world()
                .get::<Equippable>(self.item)
                .and_then(Equippable::legacy_slot)
                .ok_or_else(|| CommandError::execution(format!("{name} has nowhere to go.")))?;
            if let Some(occupant) = ctx
                .world()
                .get::<Inventory>(actor)
                .and_then(|inventory| inventory.equipped(&slot))
            {
                return Err(CommandError::execution(format!(
                    "Your {slot} slot already holds {}.",
                    ctx.name(occupant)
                )));
            }
            EquipCommand::new(self.item)
        };

        let equip = equip.allow_displacement(false).quiet();
        equip.validate(ctx)?;
        equip.execute(ctx, tx)
    }
}

impl InventoryCommand for AutoEquipCommand {
    fn name(&self) -> &'static str {
        "auto_equip"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_inventory(ctx)?;
        require_equippable(ctx, self.item)?;
        require_carried(ctx, self.item)
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
