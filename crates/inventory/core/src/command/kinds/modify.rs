use super::report;
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::transaction::InventoryTransaction;
use crate::command::validation::{
    require_actor, require_inventory, require_item, require_owned, require_recipe,
    require_tinkerer,
};
use crate::command::{InventoryCommand, InventoryContext};
use crate::world::EntityId;

/// Applies a known modification recipe to an owned item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyModificationCommand {
    pub recipe: String,
    pub item: EntityId,
    pub quiet: bool,
}

impl ApplyModificationCommand {
    pub fn new(recipe: impl Into<String>, item: EntityId) -> Self {
        Self {
            recipe: recipe.into(),
            item,
            quiet: false,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl InventoryCommand for ApplyModificationCommand {
    fn name(&self) -> &'static str {
        "apply_modification"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_inventory(ctx)?;
        let tinkerer = require_tinkerer(ctx)?;
        let recipe = require_recipe(&self.recipe)?;
        if !tinkerer.knows(recipe) {
            return Err(ValidationError::blocked(format!(
                "You don't know how to apply {recipe}."
            )));
        }
        require_item(ctx, self.item)?;
        require_owned(ctx, self.item)?;
        let service = ctx
            .env
            .tinkering()
            .map_err(|error| ValidationError::Unknown(error.to_string()))?;
        service
            .can_apply_modification_target(ctx.world(), recipe, self.item)
            .map_err(|refusal| ValidationError::BlockedByRule(refusal.0))
    }

    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        _tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let recipe = self.recipe.trim();
        let name = ctx.name(self.item);
        let result = ctx.env.tinkering().map_err(CommandError::from).and_then(|service| {
            service
                .try_apply_modification(ctx.world, ctx.actor, recipe, self.item)
                .map(|()| CommandOutcome::message(format!("You apply {recipe} to {name}.")))
                .map_err(|refusal| CommandError::ExecutionFailed(refusal.0))
        });
        report(self.name(), self.quiet, &result);
        result
    }
}
