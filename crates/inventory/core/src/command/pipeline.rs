//! Validate-then-execute driver for inventory commands.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::result::{CommandError, CommandResult};
use super::snapshot::RestoreError;
use super::transaction::InventoryTransaction;
use super::{InventoryCommand, InventoryContext};

/// Runs commands against one context.
///
/// `execute` never rolls anything back on its own; callers decide what to do
/// with the transaction. `execute_atomic` owns a transaction and commits or
/// rolls it back depending on the outcome.
pub struct InventoryPipeline<'c, 'a> {
    ctx: &'c mut InventoryContext<'a>,
}

impl<'c, 'a> InventoryPipeline<'c, 'a> {
    pub fn new(ctx: &'c mut InventoryContext<'a>) -> Self {
        Self { ctx }
    }

    /// Validates, then executes `command`, registering undo steps on `tx`.
    ///
    /// A transaction that is no longer open is refused with `Exception`
    /// before anything runs. Validation failures short-circuit with
    /// `ValidationFailed` and leave `tx` untouched. A panic inside `execute`
    /// is reported as `Exception`; whatever `tx` recorded before the panic is
    /// still there.
    pub fn execute(
        &mut self,
        command: &dyn InventoryCommand,
        tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let name = command.name();
        if !tx.is_open() {
            tracing::warn!("{} refused: transaction is {:?}", name, tx.state());
            return Err(RestoreError::TransactionClosed(tx.state()).into());
        }
        if let Err(error) = command.validate(self.ctx) {
            tracing::debug!("{} rejected for {}: {}", name, self.ctx.actor, error);
            return Err(CommandError::ValidationFailed(error));
        }

        let ctx = &mut *self.ctx;
        let result = match catch_unwind(AssertUnwindSafe(|| command.execute(ctx, tx))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!("{} panicked for {}: {}", name, self.ctx.actor, message);
                Err(CommandError::Exception(message))
            }
        };

        match &result {
            Ok(outcome) => tracing::debug!("{} succeeded: {}", name, outcome.message),
            Err(error) => tracing::debug!("{} failed: {}", name, error),
        }
        result
    }

    /// Executes `command` in its own transaction: commit on success,
    /// rollback on any failure.
    pub fn execute_atomic(&mut self, command: &dyn InventoryCommand) -> CommandResult {
        let mut tx = InventoryTransaction::new();
        let result = self.execute(command, &mut tx);
        if result.is_ok() {
            tx.commit();
        } else if let Err(error) = tx.rollback(self.ctx.world) {
            for failure in &error.failures {
                tracing::warn!(
                    "{} rollback step {} failed: {}",
                    command.name(),
                    failure.op,
                    failure.error
                );
            }
        }
        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::result::{CommandErrorCode, CommandOutcome, ValidationError};
    use crate::command::transaction::InventoryOp;
    use crate::config::RulesConfig;
    use crate::world::{EntityBuilder, EntityId, Stat, StatDelta, World};

    struct Boost {
        fail_validation: bool,
        fail_after_boost: bool,
        panic: bool,
    }

    impl Boost {
        fn ok() -> Self {
            Self {
                fail_validation: false,
                fail_after_boost: false,
                panic: false,
            }
        }
    }

    impl InventoryCommand for Boost {
        fn name(&self) -> &'static str {
            "boost"
        }

        fn validate(&self, _ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
            if self.fail_validation {
                Err(ValidationError::blocked("not now"))
            } else {
                Ok(())
            }
        }

        fn execute(
            &self,
            ctx: &mut InventoryContext<'_>,
            tx: &mut InventoryTransaction,
        ) -> CommandResult {
            let actor = ctx.actor;
            let delta = vec![StatDelta::new("Strength", 3)];
            tx.apply(
                ctx.world,
                InventoryOp::AdjustStatBonuses {
                    actor,
                    deltas: delta.clone(),
                },
                InventoryOp::AdjustStatBonuses {
                    actor,
                    deltas: vec![delta[0].negated()],
                },
            )
            .map_err(|e| CommandError::Exception(e.to_string()))?;
            if self.panic {
                panic!("boost exploded");
            }
            if self.fail_after_boost {
                return Err(CommandError::execution("fizzled"));
            }
            Ok(CommandOutcome::message("boosted"))
        }
    }

    fn world() -> (World, EntityId) {
        let mut world = World::new(RulesConfig::new());
        let actor = world
            .spawn(EntityBuilder::new("hero").stat("Strength", Stat::attribute(10)))
            .unwrap();
        (world, actor)
    }

    fn strength(world: &World, actor: EntityId) -> i32 {
        world.entity(actor).unwrap().stat("Strength").unwrap().value()
    }

    #[test]
    fn validation_failure_never_executes() {
        let (mut world, actor) = world();
        let mut ctx = InventoryContext::new(&mut world, actor);
        let mut tx = InventoryTransaction::new();
        let command = Boost {
            fail_validation: true,
            ..Boost::ok()
        };

        let result = InventoryPipeline::new(&mut ctx).execute(&command, &mut tx);
        assert_eq!(CommandErrorCode::of(&result), CommandErrorCode::ValidationFailed);
        assert!(tx.is_empty());
        assert_eq!(strength(&world, actor), 10);
    }

    #[test]
    fn plain_execute_leaves_failed_effects_for_the_caller() {
        let (mut world, actor) = world();
        let mut ctx = InventoryContext::new(&mut world, actor);
        let mut tx = InventoryTransaction::new();
        let command = Boost {
            fail_after_boost: true,
            ..Boost::ok()
        };

        let result = InventoryPipeline::new(&mut ctx).execute(&command, &mut tx);
        assert_eq!(result, Err(CommandError::execution("fizzled")));
        assert_eq!(tx.len(), 1);
        assert_eq!(strength(ctx.world(), actor), 13);

        tx.rollback(ctx.world).unwrap();
        assert_eq!(strength(&world, actor), 10);
    }

    #[test]
    fn closed_transaction_is_refused_before_anything_runs() {
        let (mut world, actor) = world();
        let mut ctx = InventoryContext::new(&mut world, actor);
        let mut tx = InventoryTransaction::new();
        tx.commit();

        let result = InventoryPipeline::new(&mut ctx).execute(&Boost::ok(), &mut tx);
        assert_eq!(CommandErrorCode::of(&result), CommandErrorCode::Exception);
        assert!(tx.is_empty());
        assert_eq!(strength(&world, actor), 10);
    }

    #[test]
    fn atomic_execute_rolls_back_panics() {
        let (mut world, actor) = world();
        let mut ctx = InventoryContext::new(&mut world, actor);
        let command = Boost {
            panic: true,
            ..Boost::ok()
        };

        let result = InventoryPipeline::new(&mut ctx).execute_atomic(&command);
        assert_eq!(
            result,
            Err(CommandError::Exception("boost exploded".into()))
        );
        assert_eq!(strength(&world, actor), 10);
    }

    #[test]
    fn atomic_execute_commits_success() {
        let (mut world, actor) = world();
        let mut ctx = InventoryContext::new(&mut world, actor);

        let outcome = InventoryPipeline::new(&mut ctx)
            .execute_atomic(&Boost::ok())
            .unwrap();
        assert_eq!(outcome.message, "boosted");
        assert_eq!(strength(&world, actor), 13);
    }
}
