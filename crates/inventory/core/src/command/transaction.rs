//! Undo log for inventory commands.
//!
//! Commands apply side effects through [`InventoryTransaction::apply`] or
//! register a compensating step with [`InventoryTransaction::record_undo`].
//! Rolling back replays the undo steps in reverse registration order.

use super::snapshot::{EquippedStateSnapshot, InventoryActionSnapshot, RestoreError, detach};
use crate::world::{EntityId, StatDelta, World};

/// A replayable world mutation.
///
/// Undo records are data rather than closures so a transaction can be
/// inspected, compared and persisted.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryOp {
    /// Adds every delta to the actor's bonus layer.
    AdjustStatBonuses {
        actor: EntityId,
        deltas: Vec<StatDelta>,
    },
    /// Takes the item off the actor and returns it to `carried_index`.
    ClearEquipment {
        actor: EntityId,
        item: EntityId,
        carried_index: Option<usize>,
    },
    /// Re-equips an item exactly where a snapshot recorded it.
    RestoreEquippedState {
        actor: EntityId,
        snapshot: EquippedStateSnapshot,
    },
    /// Restores actor stats and item placement captured before an item action.
    RestoreActionSnapshot(Box<InventoryActionSnapshot>),
}

impl InventoryOp {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn run(&self, world: &mut World) -> Result<(), RestoreError> {
        match self {
            Self::AdjustStatBonuses { actor, deltas } => {
                world.adjust_stat_bonuses(*actor, deltas)?;
            }
            Self::ClearEquipment {
                actor,
                item,
                carried_index,
            } => {
                detach(world, *actor, *item)?;
                if let Some(index) = carried_index {
                    world.insert_object_at(*actor, *item, *index)?;
                }
            }
            Self::RestoreEquippedState { actor, snapshot } => {
                snapshot.restore(world, *actor)?;
            }
            Self::RestoreActionSnapshot(snapshot) => {
                snapshot.restore(world)?;
            }
        }
        Ok(())
    }
}

/// Lifecycle of a transaction. Only `Open` accepts new entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactionState {
    Open,
    Committed,
    RolledBack,
}

/// One registered step: the forward operation (if run through `apply`) and
/// its compensation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionEntry {
    pub apply: Option<InventoryOp>,
    pub undo: InventoryOp,
}

/// A failed undo step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoFailure {
    pub op: &'static str,
    pub error: RestoreError,
}

/// Rollback completed, but some undo steps failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} undo step(s) failed during rollback", failures.len())]
pub struct RollbackError {
    pub failures: Vec<UndoFailure>,
}

/// Ordered undo log with explicit commit/rollback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryTransaction {
    entries: Vec<TransactionEntry>,
    state: TransactionState,
}

impl InventoryTransaction {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            state: TransactionState::Open,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TransactionState::Open
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TransactionEntry] {
        &self.entries
    }

    /// Runs `apply` now and records `undo` for rollback.
    ///
    /// Nothing is recorded when `apply` fails. A closed transaction refuses
    /// the operation without running it.
    pub fn apply(
        &mut self,
        world: &mut World,
        apply: InventoryOp,
        undo: InventoryOp,
    ) -> Result<(), RestoreError> {
        if !self.is_open() {
            tracing::warn!("refusing {} on {:?} transaction", apply.name(), self.state);
            return Err(RestoreError::TransactionClosed(self.state));
        }
        apply.run(world)?;
        self.entries.push(TransactionEntry {
            apply: Some(apply),
            undo,
        });
        Ok(())
    }

    /// Records a compensating step for a change the caller already made.
    pub fn record_undo(&mut self, undo: InventoryOp) {
        if !self.is_open() {
            tracing::warn!("ignoring undo {} on {:?} transaction", undo.name(), self.state);
            return;
        }
        self.entries.push(TransactionEntry { apply: None, undo });
    }

    /// Discards the undo log.
    pub fn commit(&mut self) {
        if !self.is_open() {
            tracing::warn!("commit on {:?} transaction", self.state);
            return;
        }
        self.entries.clear();
        self.state = TransactionState::Committed;
    }

    /// Replays every undo step in reverse order.
    ///
    /// A failing step does not stop the ones before it; all failures are
    /// reported together.
    pub fn rollback(&mut self, world: &mut World) -> Result<(), RollbackError> {
        if !self.is_open() {
            tracing::warn!("rollback on {:?} transaction", self.state);
            return Ok(());
        }
        let mut failures = Vec::new();
        while let Some(entry) = self.entries.pop() {
            if let Err(error) = entry.undo.run(world) {
                tracing::warn!("undo {} failed: {}", entry.undo.name(), error);
                failures.push(UndoFailure {
                    op: entry.undo.name(),
                    error,
                });
            }
        }
        self.state = TransactionState::RolledBack;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RollbackError { failures })
        }
    }
}

impl Default for InventoryTransaction {
    fn default() -> Self {
        Self::new()
    }
}
