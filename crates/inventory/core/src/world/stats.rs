//! Named statistics and equip-bonus specs.
//!
//! Stats are keyed by name on each entity. An item's equip bonus is a string
//! spec of `StatName:Amount` pairs that is added to the wearer's `bonus`
//! layer on equip and subtracted on unequip.

use std::collections::BTreeMap;

use crate::config::RulesConfig;
use crate::error::{ErrorSeverity, RulesError};

/// A single named statistic.
///
/// Value = clamp(base + bonus - penalty, min, max). `boost` is carried for
/// systems that scale stat shifts and is preserved verbatim by snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    pub base: i32,
    pub bonus: i32,
    pub penalty: i32,
    pub boost: i32,
    pub min: i32,
    pub max: i32,
}

impl Stat {
    pub fn new(base: i32, min: i32, max: i32) -> Self {
        Self {
            base,
            bonus: 0,
            penalty: 0,
            boost: 0,
            min,
            max,
        }
    }

    /// Stat with the default attribute range.
    pub fn attribute(base: i32) -> Self {
        Self::new(base, 1, 99)
    }

    pub fn value(&self) -> i32 {
        (self.base + self.bonus - self.penalty).clamp(self.min, self.max)
    }

    /// Overwrites every layer with `other`'s values.
    pub fn restore_from(&mut self, other: &Stat) {
        self.base = other.base;
        self.bonus = other.bonus;
        self.penalty = other.penalty;
        self.boost = other.boost;
        self.min = other.min;
        self.max = other.max;
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::attribute(10)
    }
}

pub type StatMap = BTreeMap<String, Stat>;

/// A signed adjustment to one stat's bonus layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatDelta {
    pub stat: String,
    pub amount: i32,
}

impl StatDelta {
    pub fn new(stat: impl Into<String>, amount: i32) -> Self {
        Self {
            stat: stat.into(),
            amount,
        }
    }

    pub fn negated(&self) -> Self {
        Self {
            stat: self.stat.clone(),
            amount: -self.amount,
        }
    }
}

/// Errors raised while parsing an equip-bonus spec.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusParseError {
    #[error("bonus entry '{0}' is missing a ':' separator")]
    MissingSeparator(String),

    #[error("bonus entry '{0}' has an empty stat name")]
    EmptyStat(String),

    #[error("bonus entry '{entry}' has a non-integer amount")]
    InvalidAmount { entry: String },
}

impl RulesError for BonusParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSeparator(_) => "BONUS_MISSING_SEPARATOR",
            Self::EmptyStat(_) => "BONUS_EMPTY_STAT",
            Self::InvalidAmount { .. } => "BONUS_INVALID_AMOUNT",
        }
    }
}

/// Parses `"Strength:2,Agility:-1"` into ordered deltas.
///
/// Empty entries are ignored, so `""` and `"Strength:1,"` are accepted.
pub fn parse_bonus_spec(spec: &str) -> Result<Vec<StatDelta>, BonusParseError> {
    spec.split(RulesConfig::BONUS_PAIR_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, amount) = entry
                .split_once(RulesConfig::BONUS_SEPARATOR)
                .ok_or_else(|| BonusParseError::MissingSeparator(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(BonusParseError::EmptyStat(entry.to_string()));
            }
            let amount = amount
                .trim()
                .parse::<i32>()
                .map_err(|_| BonusParseError::InvalidAmount {
                    entry: entry.to_string(),
                })?;
            Ok(StatDelta::new(name, amount))
        })
        .collect()
}

/// Adds each delta to the matching stat's bonus layer.
///
/// Stats the entity does not have are skipped. Returns the deltas that were
/// actually applied, which is what an undo must reverse.
pub fn apply_bonus_deltas(stats: &mut StatMap, deltas: &[StatDelta]) -> Vec<StatDelta> {
    let mut applied = Vec::with_capacity(deltas.len());
    for delta in deltas {
        match stats.get_mut(&delta.stat) {
            Some(stat) => {
                stat.bonus += delta.amount;
                applied.push(delta.clone());
            }
            None => tracing::debug!("skipping bonus for missing stat {}", delta.stat),
        }
    }
    applied
}
