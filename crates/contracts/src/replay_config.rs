//! Replay configuration contracts that can be shared across crates.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ContractError;

/// Canonical update rates every detected rate is bucketed into (Hz)
pub const CANONICAL_RATES: [u16; 4] = [50, 100, 200, 400];

/// Replay engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplayConfig {
    /// Path of the flight log to replay
    pub log_path: PathBuf,

    /// Update rate override (Hz). None triggers rate detection.
    #[serde(default)]
    pub update_rate: Option<u16>,

    /// User parameter overrides, applied once after the log's leading
    /// configuration records. Duplicate names: the last one wins.
    #[serde(default)]
    #[validate(nested)]
    pub overrides: Vec<ParamOverride>,

    /// Accelerometer channel selection mask (opaque to the engine)
    #[serde(default)]
    pub accel_mask: Option<u8>,

    /// Gyro channel selection mask (opaque to the engine)
    #[serde(default)]
    pub gyro_mask: Option<u8>,

    /// Simulated arm time (replay-clock ms). None = gate disabled.
    #[serde(default)]
    pub arm_time_ms: Option<u32>,

    /// When false, the framed and alternate inertial paths are inert
    /// and format detection is legacy-only
    #[serde(default = "default_true")]
    pub framed_alt_enabled: bool,

    /// Record type used for rate detection
    #[serde(default = "default_reference_tag")]
    pub reference_tag: String,

    /// Directory the derived-output tables are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_reference_tag() -> String {
    "IMU2".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ReplayConfig {
    /// Minimal configuration for a log path, everything else default
    pub fn for_log(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            update_rate: None,
            overrides: Vec::new(),
            accel_mask: None,
            gyro_mask: None,
            arm_time_ms: None,
            framed_alt_enabled: true,
            reference_tag: default_reference_tag(),
            output_dir: default_output_dir(),
        }
    }
}

/// One user-supplied NAME=VALUE parameter override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ParamOverride {
    /// Parameter name (bounded length, matching the log's name field)
    #[validate(length(min = 1, max = 16))]
    pub name: String,

    /// Override value
    pub value: f32,
}

impl FromStr for ParamOverride {
    type Err = ContractError;

    /// Parse "NAME=VALUE" as supplied on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| ContractError::config_parse(format!("expected NAME=VALUE, got '{s}'")))?;

        if name.is_empty() {
            return Err(ContractError::config_parse(format!(
                "empty parameter name in '{s}'"
            )));
        }

        let value: f32 = value.parse().map_err(|_| {
            ContractError::config_parse(format!("invalid value '{value}' for parameter '{name}'"))
        })?;

        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

impl std::fmt::Display for ParamOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        let p: ParamOverride = "EKF_VELNE_NOISE=0.5".parse().unwrap();
        assert_eq!(p.name, "EKF_VELNE_NOISE");
        assert!((p.value - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_override_negative_value() {
        let p: ParamOverride = "AHRS_TRIM_X=-0.03".parse().unwrap();
        assert!((p.value + 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_parse_override_missing_equals() {
        let result = "EKF_VELNE_NOISE".parse::<ParamOverride>();
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_override_bad_value() {
        let result = "EKF_VELNE_NOISE=abc".parse::<ParamOverride>();
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_override_name_length_validated() {
        let p = ParamOverride {
            name: "A_NAME_LONGER_THAN_SIXTEEN".to_string(),
            value: 1.0,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = ReplayConfig::for_log("log.bin");
        assert!(config.update_rate.is_none());
        assert!(config.framed_alt_enabled);
        assert_eq!(config.reference_tag, "IMU2");
        assert!(config.arm_time_ms.is_none());
    }
}
