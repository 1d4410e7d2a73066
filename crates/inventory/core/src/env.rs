//! External services consumed by inventory commands.
//!
//! The [`InventoryEnv`] bundles optional service references so commands can
//! reach collaborators without hard coupling to concrete implementations.
//! Only the tinkering service is needed today; crafting recipe math lives
//! entirely behind it.

use crate::error::{ErrorSeverity, RulesError};
use crate::world::{EntityId, World};

/// Reason a tinkering operation was refused, suitable for the player log.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{0}")]
pub struct TinkerRefusal(pub String);

impl TinkerRefusal {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Crafting, disassembly and item modification.
///
/// `can_*` queries must not mutate the world; `try_*` operations perform the
/// change and report refusal with a reason.
pub trait TinkeringService {
    fn can_disassemble(&self, world: &World, actor: EntityId, item: EntityId)
    -> Result<(), TinkerRefusal>;

    fn try_disassemble(
        &self,
        world: &mut World,
        actor: EntityId,
        item: EntityId,
    ) -> Result<(), TinkerRefusal>;

    fn can_apply_modification_target(
        &self,
        world: &World,
        recipe: &str,
        item: EntityId,
    ) -> Result<(), TinkerRefusal>;

    fn try_apply_modification(
        &self,
        world: &mut World,
        actor: EntityId,
        recipe: &str,
        item: EntityId,
    ) -> Result<(), TinkerRefusal>;

    /// Returns the entities produced by the recipe.
    fn try_craft(
        &self,
        world: &mut World,
        actor: EntityId,
        recipe: &str,
    ) -> Result<Vec<EntityId>, TinkerRefusal>;
}

/// Aggregates optional services required by commands.
#[derive(Clone, Copy, Default)]
pub struct InventoryEnv<'a> {
    tinkering: Option<&'a dyn TinkeringService>,
}

impl<'a> InventoryEnv<'a> {
    pub fn new(tinkering: Option<&'a dyn TinkeringService>) -> Self {
        Self { tinkering }
    }

    pub fn empty() -> Self {
        Self { tinkering: None }
    }

    pub fn with_tinkering(tinkering: &'a dyn TinkeringService) -> Self {
        Self::new(Some(tinkering))
    }

    /// Returns the tinkering service, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::TinkeringNotAvailable` if no service was provided.
    pub fn tinkering(&self) -> Result<&'a dyn TinkeringService, EnvError> {
        self.tinkering.ok_or(EnvError::TinkeringNotAvailable)
    }
}

impl core::fmt::Debug for InventoryEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryEnv")
            .field("tinkering", &self.tinkering.is_some())
            .finish()
    }
}

/// Errors that occur when a required service is missing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvError {
    #[error("tinkering service not available")]
    TinkeringNotAvailable,
}

impl RulesError for EnvError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TinkeringNotAvailable => "ENV_TINKERING_NOT_AVAILABLE",
        }
    }
}
