//! One-shot simulated arming gate.

use contracts::Estimator;
use tracing::info;

/// Arms the estimator the first time the replay clock crosses a
/// configured threshold. Idempotent; inert when no threshold is set.
#[derive(Debug)]
pub struct ArmTimeGate {
    threshold_ms: Option<u32>,
    armed: bool,
}

impl ArmTimeGate {
    pub fn new(threshold_ms: Option<u32>) -> Self {
        Self {
            threshold_ms,
            armed: false,
        }
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Compare the replay clock against the threshold; returns true on
    /// the single disarmed->armed transition.
    pub fn poll(&mut self, now_ms: u64, estimator: &mut dyn Estimator) -> bool {
        let Some(threshold) = self.threshold_ms else {
            return false;
        };
        if self.armed || now_ms <= u64::from(threshold) {
            return false;
        }
        self.armed = true;
        estimator.set_soft_armed(true);
        info!(time_ms = now_ms, "arming");
        true
    }
}
