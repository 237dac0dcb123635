//! Configuration validation.
//!
//! Rules:
//! - log_path non-empty
//! - update_rate, when forced, is one of the canonical rates
//! - inertial channel masks fit the two recorded channels
//! - override names within the log's name-field bounds
//! - reference_tag non-empty
//!
//! Duplicate override names are allowed; the last one wins at
//! application time.

use contracts::{ContractError, ReplayConfig, CANONICAL_RATES};
use validator::Validate;

/// Validate a ReplayConfig. Returns the first violation found.
pub fn validate(config: &ReplayConfig) -> Result<(), ContractError> {
    validate_log_path(config)?;
    validate_update_rate(config)?;
    validate_masks(config)?;
    validate_overrides(config)?;
    validate_reference_tag(config)?;
    Ok(())
}

fn validate_log_path(config: &ReplayConfig) -> Result<(), ContractError> {
    if config.log_path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "log_path",
            "log path cannot be empty",
        ));
    }
    Ok(())
}

fn validate_update_rate(config: &ReplayConfig) -> Result<(), ContractError> {
    if let Some(rate) = config.update_rate {
        if !CANONICAL_RATES.contains(&rate) {
            return Err(ContractError::config_validation(
                "update_rate",
                format!("rate {rate} Hz is not one of {CANONICAL_RATES:?}"),
            ));
        }
    }
    Ok(())
}

fn validate_masks(config: &ReplayConfig) -> Result<(), ContractError> {
    for (field, mask) in [("accel_mask", config.accel_mask), ("gyro_mask", config.gyro_mask)] {
        if let Some(mask) = mask {
            // two recorded channels: valid masks are 1, 2 or 3
            if mask == 0 || mask > 3 {
                return Err(ContractError::config_validation(
                    field,
                    format!("mask must select from the two recorded channels, got {mask:#04b}"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_overrides(config: &ReplayConfig) -> Result<(), ContractError> {
    for (idx, override_) in config.overrides.iter().enumerate() {
        override_.validate().map_err(|e| {
            ContractError::config_validation(format!("overrides[{idx}]"), e.to_string())
        })?;
    }
    Ok(())
}

fn validate_reference_tag(config: &ReplayConfig) -> Result<(), ContractError> {
    if config.reference_tag.is_empty() {
        return Err(ContractError::config_validation(
            "reference_tag",
            "reference tag cannot be empty",
        ));
    }
    Ok(())
}
