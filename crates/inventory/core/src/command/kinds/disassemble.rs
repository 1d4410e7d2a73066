use super::report;
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::transaction::InventoryTransaction;
use crate::command::validation::{
    require_actor, require_inventory, require_item, require_owned, require_tinkerer,
};
use crate::command::{InventoryCommand, InventoryContext};
use crate::world::EntityId;

/// Breaks an owned item down through the tinkering service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisassembleCommand {
    pub item: EntityId,
    pub quiet: bool,
}

impl DisassembleCommand {
    pub fn new(item: EntityId) -> Self {
        Self { item, quiet: false }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl InventoryCommand for DisassembleCommand {
    fn name(&self) -> &'static str {
        "disassemble"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_inventory(ctx)?;
        require_tinkerer(ctx)?;
        require_item(ctx, self.item)?;
        require_owned(ctx, self.item)?;
        let service = ctx
            .env
            .tinkering()
            .map_err(|error| ValidationError::Unknown(error.to_string()))?;
        service
            .can_disassemble(ctx.world(), ctx.actor, self.item)
            .map_err(|refusal| ValidationError::BlockedByRule(refusal.0))
    }

    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        _tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let name = ctx.name(self.item);
        let result = ctx.env.tinkering().map_err(CommandError::from).and_then(|service| {
            service
                .try_disassemble(ctx.world, ctx.actor, self.item)
                .map(|()| CommandOutcome::message(format!("You disassemble {name}.")))
                .map_err(|refusal| CommandError::ExecutionFailed(refusal.0))
        });
        report(self.name(), self.quiet, &result);
        result
    }
}
