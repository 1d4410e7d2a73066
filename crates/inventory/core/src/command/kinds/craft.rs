use super::report;
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::transaction::InventoryTransaction;
use crate::command::validation::{
    require_actor, require_inventory, require_recipe, require_tinkerer,
};
use crate::command::{InventoryCommand, InventoryContext};

/// Builds a known recipe through the tinkering service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CraftCommand {
    pub recipe: String,
    pub quiet: bool,
}

impl CraftCommand {
    pub fn new(recipe: impl Into<String>) -> Self {
        Self {
            recipe: recipe.into(),
            quiet: false,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn run(&self, ctx: &mut InventoryContext<'_>) -> CommandResult {
        let recipe = self.recipe.trim();
        let service = ctx.env.tinkering()?;
        let produced = service
            .try_craft(ctx.world, ctx.actor, recipe)
            .map_err(|refusal| CommandError::ExecutionFailed(refusal.0))?;
        if produced.is_empty() {
            return Err(CommandError::execution(format!(
                "Building {recipe} produced nothing."
            )));
        }

        let names: Vec<String> = produced.iter().map(|id| ctx.name(*id)).collect();
        Ok(CommandOutcome::message(format!("You build {}.", names.join(", ")))
            .with_produced(produced))
    }
}

impl InventoryCommand for CraftCommand {
    fn name(&self) -> &'static str {
        "craft"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_inventory(ctx)?;
        let tinkerer = require_tinkerer(ctx)?;
        let recipe = require_recipe(&self.recipe)?;
        if !tinkerer.knows(recipe) {
            return Err(ValidationError::blocked(format!(
                "You don't know how to build {recipe}."
            )));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        _tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let result = self.run(ctx);
        report(self.name(), self.quiet, &result);
        result
    }
}
