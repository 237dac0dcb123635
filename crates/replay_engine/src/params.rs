//! Staged application of user parameter overrides.
//!
//! Overrides are deferred until the log's own leading configuration
//! records (FMT/PARM) have been consumed, then applied exactly once,
//! in the order supplied. An unknown name is a caller typo and fatal.

use contracts::{ContractError, Estimator, ParamOverride};
use tracing::{debug, info};

#[derive(Debug)]
pub struct ParameterStager {
    overrides: Vec<ParamOverride>,
    applied: bool,
}

impl ParameterStager {
    pub fn new(overrides: Vec<ParamOverride>) -> Self {
        Self {
            overrides,
            applied: false,
        }
    }

    /// Whether the overrides have been applied
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Apply the overrides if `tag` marks the end of the bootstrap
    /// section. Idempotent after the first application.
    pub fn maybe_apply(
        &mut self,
        is_bootstrap: bool,
        estimator: &mut dyn Estimator,
    ) -> Result<(), ContractError> {
        if self.applied || is_bootstrap {
            return Ok(());
        }
        self.applied = true;

        for override_ in &self.overrides {
            if !estimator.set_parameter(&override_.name, override_.value) {
                return Err(ContractError::UnknownParameter {
                    name: override_.name.clone(),
                    value: override_.value,
                });
            }
            debug!(name = %override_.name, value = override_.value, "parameter override applied");
        }

        if !self.overrides.is_empty() {
            info!(count = self.overrides.len(), "user parameter overrides applied");
        }
        Ok(())
    }
}
