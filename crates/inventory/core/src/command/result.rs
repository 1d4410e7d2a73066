//! Validation and command result types.
//!
//! Two parallel taxonomies: [`ValidationError`] for side-effect-free
//! precondition failures, and [`CommandError`] for the overall outcome of a
//! validate/execute cycle. Every variant renders a message suitable for the
//! player log.

use super::snapshot::RestoreError;
use crate::env::EnvError;
use crate::error::{ErrorSeverity, RulesError};
use crate::world::{EntityId, WorldError};

/// Coarse classification of a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationErrorCode {
    InvalidActor,
    InvalidItem,
    MissingInventory,
    MissingEquippable,
    MissingTinkering,
    ItemNotOwned,
    BlockedByRule,
    Unknown,
}

/// Precondition failures reported by `validate`. Never mutates state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("there is no one to do that")]
    InvalidActor,

    #[error("there is nothing to do that with")]
    InvalidItem,

    #[error("{actor} has no inventory")]
    MissingInventory { actor: String },

    #[error("{item} can't be equipped")]
    MissingEquippable { item: String },

    #[error("{actor} doesn't know how to tinker")]
    MissingTinkering { actor: String },

    #[error("you don't have {item}")]
    ItemNotOwned { item: String },

    /// Domain-specific refusal carrying its own message.
    #[error("{0}")]
    BlockedByRule(String),

    #[error("{0}")]
    Unknown(String),
}

impl ValidationError {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::BlockedByRule(reason.into())
    }

    pub fn code(&self) -> ValidationErrorCode {
        match self {
            Self::InvalidActor => ValidationErrorCode::InvalidActor,
            Self::InvalidItem => ValidationErrorCode::InvalidItem,
            Self::MissingInventory { .. } => ValidationErrorCode::MissingInventory,
            Self::MissingEquippable { .. } => ValidationErrorCode::MissingEquippable,
            Self::MissingTinkering { .. } => ValidationErrorCode::MissingTinkering,
            Self::ItemNotOwned { .. } => ValidationErrorCode::ItemNotOwned,
            Self::BlockedByRule(_) => ValidationErrorCode::BlockedByRule,
            Self::Unknown(_) => ValidationErrorCode::Unknown,
        }
    }
}

impl RulesError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BlockedByRule(_) => ErrorSeverity::Recoverable,
            Self::Unknown(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self.code() {
            ValidationErrorCode::InvalidActor => "VALIDATION_INVALID_ACTOR",
            ValidationErrorCode::InvalidItem => "VALIDATION_INVALID_ITEM",
            ValidationErrorCode::MissingInventory => "VALIDATION_MISSING_INVENTORY",
            ValidationErrorCode::MissingEquippable => "VALIDATION_MISSING_EQUIPPABLE",
            ValidationErrorCode::MissingTinkering => "VALIDATION_MISSING_TINKERING",
            ValidationErrorCode::ItemNotOwned => "VALIDATION_ITEM_NOT_OWNED",
            ValidationErrorCode::BlockedByRule => "VALIDATION_BLOCKED_BY_RULE",
            ValidationErrorCode::Unknown => "VALIDATION_UNKNOWN",
        }
    }
}

/// Coarse classification of a command result; `None` means success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandErrorCode {
    None,
    ValidationFailed,
    ExecutionFailed,
    Exception,
}

impl CommandErrorCode {
    pub fn of(result: &CommandResult) -> Self {
        match result {
            Ok(_) => Self::None,
            Err(error) => error.code(),
        }
    }
}

/// Failure of a validate/execute cycle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    /// `validate` rejected the command; `execute` never ran.
    #[error("{0}")]
    ValidationFailed(#[from] ValidationError),

    /// A rule, veto or service call failed during `execute`.
    #[error("{0}")]
    ExecutionFailed(String),

    /// An unexpected fault was caught during `execute`.
    #[error("something went wrong: {0}")]
    Exception(String),
}

impl CommandError {
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed(reason.into())
    }

    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::ValidationFailed(_) => CommandErrorCode::ValidationFailed,
            Self::ExecutionFailed(_) => CommandErrorCode::ExecutionFailed,
            Self::Exception(_) => CommandErrorCode::Exception,
        }
    }

    /// The attached validation failure, distinguishing "never attempted".
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::ValidationFailed(error) => Some(error),
            _ => None,
        }
    }
}

impl From<WorldError> for CommandError {
    fn from(error: WorldError) -> Self {
        Self::Exception(error.to_string())
    }
}

impl From<EnvError> for CommandError {
    fn from(error: EnvError) -> Self {
        Self::Exception(error.to_string())
    }
}

impl From<RestoreError> for CommandError {
    fn from(error: RestoreError) -> Self {
        Self::Exception(error.to_string())
    }
}

impl RulesError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ValidationFailed(error) => error.severity(),
            Self::ExecutionFailed(_) => ErrorSeverity::Recoverable,
            Self::Exception(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(error) => error.error_code(),
            Self::ExecutionFailed(_) => "COMMAND_EXECUTION_FAILED",
            Self::Exception(_) => "COMMAND_EXCEPTION",
        }
    }
}

/// Successful command outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandOutcome {
    pub message: String,
    /// Entities created by the command (crafting output).
    pub produced: Vec<EntityId>,
}

impl CommandOutcome {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            produced: Vec::new(),
        }
    }

    pub fn with_produced(mut self, produced: Vec<EntityId>) -> Self {
        self.produced = produced;
        self
    }
}

pub type CommandResult = Result<CommandOutcome, CommandError>;
