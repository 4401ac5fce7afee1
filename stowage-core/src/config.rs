//! Transport tuning loaded from campaign options.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    PLATOON_FOOT_TONS, PLATOON_FOOT_TROOPERS, PLATOON_JUMP_TONS, PLATOON_JUMP_TROOPERS,
    PLATOON_MECHANIZED_TONS, PLATOON_MECHANIZED_TROOPERS, PLATOON_MOTORIZED_TONS,
    PLATOON_MOTORIZED_TROOPERS,
};
use crate::numbers::{groups_needed, u32_to_f64};
use crate::unit::PlatoonType;

/// What to do when a load would push remaining capacity below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Allow it and log a warning; the ledger shows the overdraw.
    #[default]
    Soft,
    /// Reject the load.
    Strict,
}

/// Bay footprint of one infantry platoon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatoonSpec {
    pub tons: f64,
    pub troopers: u32,
}

impl PlatoonSpec {
    const fn new(tons: f64, troopers: u32) -> Self {
        Self { tons, troopers }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatoonTable {
    #[serde(default = "PlatoonTable::default_foot")]
    pub foot: PlatoonSpec,
    #[serde(default = "PlatoonTable::default_jump")]
    pub jump: PlatoonSpec,
    #[serde(default = "PlatoonTable::default_motorized")]
    pub motorized: PlatoonSpec,
    #[serde(default = "PlatoonTable::default_mechanized")]
    pub mechanized: PlatoonSpec,
}

impl Default for PlatoonTable {
    fn default() -> Self {
        Self {
            foot: Self::default_foot(),
            jump: Self::default_jump(),
            motorized: Self::default_motorized(),
            mechanized: Self::default_mechanized(),
        }
    }
}

impl PlatoonTable {
    const fn default_foot() -> PlatoonSpec {
        PlatoonSpec::new(PLATOON_FOOT_TONS, PLATOON_FOOT_TROOPERS)
    }

    const fn default_jump() -> PlatoonSpec {
        PlatoonSpec::new(PLATOON_JUMP_TONS, PLATOON_JUMP_TROOPERS)
    }

    const fn default_motorized() -> PlatoonSpec {
        PlatoonSpec::new(PLATOON_MOTORIZED_TONS, PLATOON_MOTORIZED_TROOPERS)
    }

    const fn default_mechanized() -> PlatoonSpec {
        PlatoonSpec::new(PLATOON_MECHANIZED_TONS, PLATOON_MECHANIZED_TROOPERS)
    }

    #[must_use]
    pub const fn spec(&self, platoon: PlatoonType) -> PlatoonSpec {
        match platoon {
            PlatoonType::Foot => self.foot,
            PlatoonType::Jump => self.jump,
            PlatoonType::Motorized => self.motorized,
            PlatoonType::Mechanized => self.mechanized,
        }
    }

    /// Infantry bay tonnage for a force: whole platoons times platoon weight.
    #[must_use]
    pub fn bay_weight(&self, platoon: PlatoonType, troopers: u32) -> f64 {
        let spec = self.spec(platoon);
        u32_to_f64(groups_needed(troopers, spec.troopers)) * spec.tons
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, spec) in [
            ("foot", self.foot),
            ("jump", self.jump),
            ("motorized", self.motorized),
            ("mechanized", self.mechanized),
        ] {
            if !(spec.tons.is_finite() && spec.tons > 0.0) {
                return Err(ConfigError::PlatoonTons {
                    platoon: name,
                    value: spec.tons,
                });
            }
            if spec.troopers == 0 {
                return Err(ConfigError::PlatoonTroopers { platoon: name });
            }
        }
        Ok(())
    }
}

/// Campaign-level transport options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,
    #[serde(default)]
    pub platoons: PlatoonTable,
    /// Only JumpShips, WarShips and stations may dock DropShips.
    #[serde(default = "TransportConfig::default_collars_on_large_vessels_only")]
    pub collars_on_large_vessels_only: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::default(),
            platoons: PlatoonTable::default(),
            collars_on_large_vessels_only: Self::default_collars_on_large_vessels_only(),
        }
    }
}

impl TransportConfig {
    const fn default_collars_on_large_vessels_only() -> bool {
        true
    }

    #[must_use]
    pub fn strict() -> Self {
        Self {
            capacity_policy: CapacityPolicy::Strict,
            ..Self::default()
        }
    }

    /// Parse and validate options from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when a platoon entry has a non-positive size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.platoons.validate()
    }
}

/// Errors raised when transport options are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("transport options are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{platoon} platoon weight must be positive (got {value:.2})")]
    PlatoonTons { platoon: &'static str, value: f64 },
    #[error("{platoon} platoon must hold at least one trooper")]
    PlatoonTroopers { platoon: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = TransportConfig::from_json("{}").unwrap();
        assert_eq!(config, TransportConfig::default());
        assert_eq!(config.capacity_policy, CapacityPolicy::Soft);
        assert!(config.collars_on_large_vessels_only);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = TransportConfig::from_json(
            r#"{"capacity_policy":"strict","platoons":{"jump":{"tons":4.5,"troopers":20}}}"#,
        )
        .unwrap();
        assert_eq!(config.capacity_policy, CapacityPolicy::Strict);
        assert!((config.platoons.jump.tons - 4.5).abs() < f64::EPSILON);
        assert_eq!(config.platoons.foot, PlatoonTable::default_foot());
    }

    #[test]
    fn invalid_platoons_are_rejected() {
        let err = TransportConfig::from_json(r#"{"platoons":{"foot":{"tons":0.0,"troopers":28}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::PlatoonTons { platoon: "foot", .. }));

        let err =
            TransportConfig::from_json(r#"{"platoons":{"mechanized":{"tons":8.0,"troopers":0}}}"#)
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PlatoonTroopers {
                platoon: "mechanized"
            }
        ));
        assert!(matches!(
            TransportConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn bay_weight_rounds_up_to_whole_platoons() {
        let table = PlatoonTable::default();
        assert!((table.bay_weight(PlatoonType::Mechanized, 20) - 8.0).abs() < f64::EPSILON);
        assert!((table.bay_weight(PlatoonType::Mechanized, 21) - 16.0).abs() < f64::EPSILON);
        assert!(table.bay_weight(PlatoonType::Jump, 0).abs() < f64::EPSILON);
    }
}
