//! Rules configuration: name registries and tunable constants.

use std::collections::BTreeSet;

use crate::error::{ErrorSeverity, RulesError};

/// Registries and constants consulted when entities are spawned.
///
/// Slot types and stat names are data-driven strings. When `strict_registry`
/// is set, [`crate::world::World::spawn`] rejects equippables that reference
/// names missing from these registries, so typos surface at load time rather
/// than as a silently unequippable item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RulesConfig {
    pub known_slot_types: BTreeSet<String>,
    pub known_stats: BTreeSet<String>,
    pub strict_registry: bool,
}

impl RulesConfig {
    // ===== compile-time constants =====
    /// Maximum number of slot requirements a single equippable can declare.
    pub const MAX_SLOT_REQUIREMENTS: usize = 8;
    /// Separator between slot-type tokens (`"Hand,Hand"`).
    pub const SLOT_SEPARATOR: char = ',';
    /// Separator between pairs in a bonus spec (`"Strength:2,Agility:-1"`).
    pub const BONUS_PAIR_SEPARATOR: char = ',';
    /// Separator between stat name and amount inside a bonus pair.
    pub const BONUS_SEPARATOR: char = ':';

    pub const DEFAULT_SLOT_TYPES: &'static [&'static str] = &[
        "Head",
        "Face",
        "Body",
        "Back",
        "Arm",
        "Hand",
        "Hands",
        "Feet",
        "Floating Nearby",
        "Missile Weapon",
        "Thrown Weapon",
    ];

    pub const DEFAULT_STATS: &'static [&'static str] = &[
        "Strength",
        "Agility",
        "Toughness",
        "Intelligence",
        "Willpower",
        "Ego",
        "Hitpoints",
        "AV",
        "DV",
        "MA",
        "Speed",
    ];

    pub fn new() -> Self {
        Self {
            known_slot_types: Self::DEFAULT_SLOT_TYPES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            known_stats: Self::DEFAULT_STATS.iter().map(|s| (*s).to_string()).collect(),
            strict_registry: true,
        }
    }

    /// Configuration that accepts any slot type or stat name.
    pub fn permissive() -> Self {
        Self {
            strict_registry: false,
            ..Self::new()
        }
    }

    pub fn with_slot_type(mut self, slot_type: impl Into<String>) -> Self {
        self.known_slot_types.insert(slot_type.into());
        self
    }

    pub fn with_stat(mut self, stat: impl Into<String>) -> Self {
        self.known_stats.insert(stat.into());
        self
    }

    pub fn check_slot_type(&self, slot_type: &str) -> Result<(), ConfigError> {
        if self.strict_registry && !self.known_slot_types.contains(slot_type) {
            return Err(ConfigError::UnknownSlotType(slot_type.to_string()));
        }
        Ok(())
    }

    pub fn check_stat(&self, stat: &str) -> Result<(), ConfigError> {
        if self.strict_registry && !self.known_stats.contains(stat) {
            return Err(ConfigError::UnknownStat(stat.to_string()));
        }
        Ok(())
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry violations detected while loading entities.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    #[error("unknown slot type '{0}'")]
    UnknownSlotType(String),

    #[error("unknown stat '{0}'")]
    UnknownStat(String),

    #[error("equippable declares {count} slot requirements (max {max})")]
    TooManySlotRequirements { count: usize, max: usize },
}

impl RulesError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSlotType(_) => "CONFIG_UNKNOWN_SLOT_TYPE",
            Self::UnknownStat(_) => "CONFIG_UNKNOWN_STAT",
            Self::TooManySlotRequirements { .. } => "CONFIG_TOO_MANY_SLOT_REQUIREMENTS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_registry_rejects_typos() {
        let config = RulesConfig::new();
        assert!(config.check_slot_type("Hand").is_ok());
        assert_eq!(
            config.check_slot_type("Hnad"),
            Err(ConfigError::UnknownSlotType("Hnad".into()))
        );
        assert!(config.check_stat("Strenght").is_err());
    }

    #[test]
    fn permissive_registry_accepts_anything() {
        let config = RulesConfig::permissive();
        assert!(config.check_slot_type("Tentacle").is_ok());
        assert!(config.check_stat("Luck").is_ok());
    }
}
