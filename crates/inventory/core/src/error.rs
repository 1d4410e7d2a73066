//! Common error infrastructure for inventory-core.
//!
//! Domain-specific errors (e.g., `EquipPlanError`, `ValidationError`) are
//! defined next to the code that produces them. This module only provides the
//! shared classification used by all of them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error enum with specific variants
//! - **Displayable**: Every error renders a message suitable for the player log
//! - **Severity Classification**: Errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: The action may succeed later or with different input
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: The host wiring is broken (missing service, corrupt registry)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: slot occupied, inventory too heavy, event vetoed
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: item not owned, item not equippable
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: entity vanished between validate and execute
    Internal,

    /// Fatal error - the rules engine cannot continue.
    ///
    /// Examples: required service missing from the environment
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all inventory-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait RulesError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
