use super::report;
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::snapshot::InventoryActionSnapshot;
use crate::command::transaction::{InventoryOp, InventoryTransaction};
use crate::command::validation::{require_actor, require_item};
use crate::command::{InventoryCommand, InventoryContext};
use crate::world::{EntityId, EventKind, GameEvent};

/// Uses an item with an arbitrary verb ("drink", "apply", "read").
///
/// The item's own handlers implement the verb; the command only guarantees
/// the action was consumed and that the actor's stats and the item's
/// placement can be restored afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerformInventoryActionCommand {
    pub item: EntityId,
    pub action: String,
    pub quiet: bool,
}

impl PerformInventoryActionCommand {
    pub fn new(item: EntityId, action: impl Into<String>) -> Self {
        Self {
            item,
            action: action.into(),
            quiet: false,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn event(&self, kind: EventKind, actor: EntityId) -> GameEvent {
        GameEvent::new(kind)
            .with_entity("actor", actor)
            .with_entity("item", self.item)
            .with_text("command", self.action.trim())
    }

    fn run(&self, ctx: &mut InventoryContext<'_>, tx: &mut InventoryTransaction) -> CommandResult {
        let actor = ctx.actor;
        let name = ctx.name(self.item);
        let action = self.action.trim();

        if let Some(snapshot) = InventoryActionSnapshot::capture(ctx.world, actor, self.item) {
            tx.record_undo(InventoryOp::RestoreActionSnapshot(Box::new(snapshot)));
        }

        let mut before = self.event(EventKind::BeforeInventoryAction, actor);
        if !ctx.world.fire_event(actor, &mut before) {
            let reason = before
                .text("reason")
                .map(str::to_string)
                .unwrap_or_else(|| format!("You can't {action} {name} right now."));
            return Err(CommandError::ExecutionFailed(reason));
        }

        let mut event = self.event(EventKind::InventoryAction, actor);
        let propagated = ctx.world.fire_event(self.item, &mut event);
        if propagated && !event.handled {
            return Err(CommandError::execution(format!(
                "Nothing happens when you {action} {name}."
            )));
        }

        let mut after = self.event(EventKind::AfterInventoryAction, actor);
        ctx.world.fire_event(actor, &mut after);

        let message = event
            .text("message")
            .map(str::to_string)
            .unwrap_or_else(|| format!("You {action} {name}."));
        Ok(CommandOutcome::message(message))
    }
}

impl InventoryCommand for PerformInventoryActionCommand {
    fn name(&self) -> &'static str {
        "perform_inventory_action"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_item(ctx, self.item)?;
        if self.action.trim().is_empty() {
            return Err(ValidationError::blocked("No action was chosen."));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::kinds::testing::Scene;
    use crate::world::{Equippable, EventParam, World};

    fn drink_handler(world: &mut World, _owner: EntityId, event: &mut GameEvent) -> bool {
        if event.kind != EventKind::InventoryAction || event.text("command") != Some("drink") {
            return true;
        }
        if let Some(actor) = event.entity("actor")
            && let Some(hero) = world.entity_mut(actor)
            && let Some(strength) = hero.stats.get_mut("Strength")
        {
            strength.base += 5;
        }
        event.handled = true;
        event
            .params
            .insert("message".into(), EventParam::Text("You feel strong.".into()));
        true
    }

    #[test]
    fn handled_action_succeeds_and_can_be_undone() {
        let mut scene = Scene::new();
        let tonic = scene.carried("tonic", Equippable::new("Hand"));
        scene.world.register_handler(tonic, drink_handler);

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let outcome = PerformInventoryActionCommand::new(tonic, "drink")
            .execute(&mut ctx, &mut tx)
            .unwrap();
        assert_eq!(outcome.message, "You feel strong.");
        assert_eq!(scene.strength(), 15);

        tx.rollback(&mut scene.world).unwrap();
        assert_eq!(scene.strength(), 10);
    }

    #[test]
    fn unhandled_action_fails() {
        let mut scene = Scene::new();
        let rock = scene.carried("rock", Equippable::new("Hand"));

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let result = PerformInventoryActionCommand::new(rock, "eat").execute(&mut ctx, &mut tx);

        assert_eq!(
            result,
            Err(CommandError::execution("Nothing happens when you eat rock."))
        );
        assert_eq!(tx.len(), 1);
    }

    #[test]
    fn stopping_propagation_counts_as_handled() {
        let mut scene = Scene::new();
        let scroll = scene.carried("scroll", Equippable::new("Hand"));
        scene.world.register_handler(
            scroll,
            |_: &mut World, _: EntityId, _: &mut GameEvent| false,
        );

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let outcome = PerformInventoryActionCommand::new(scroll, "read")
            .execute(&mut ctx, &mut tx)
            .unwrap();
        assert_eq!(outcome.message, "You read scroll.");
    }

    #[test]
    fn blank_action_is_rejected() {
        let mut scene = Scene::new();
        let rock = scene.carried("rock", Equippable::new("Hand"));
        let ctx = scene.ctx();
        assert_eq!(
            PerformInventoryActionCommand::new(rock, "  ").validate(&ctx),
            Err(ValidationError::blocked("No action was chosen."))
        );
    }
}
