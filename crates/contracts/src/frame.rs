//! DerivedFrame - replay engine output
//!
//! Emitted once per triggering record; consumed by the table sinks.

use crate::{AttitudeSample, ContractError, DerivedState, NavSample};

/// Attitude/position values carried in the log itself, maintained by the
/// engine's side-update path and used for the comparison table
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceState {
    /// Simulator ground truth (SIM records)
    pub sim_attitude: AttitudeSample,
    /// Onboard attitude solution (ATT records)
    pub attitude: AttitudeSample,
    /// Secondary onboard attitude solution (AHR2 records)
    pub ahrs2_attitude: AttitudeSample,
    /// Onboard inertial-nav position (NTUN records)
    pub nav: NavSample,
}

/// One derived-output row, stamped with the replay clock
#[derive(Debug, Clone)]
pub struct DerivedFrame {
    /// Replay clock (ms)
    pub time_ms: u64,
    /// Values the log recorded onboard
    pub reference: ReferenceState,
    /// Values the offline estimator produced
    pub state: DerivedState,
}

impl DerivedFrame {
    /// Replay clock in seconds
    pub fn time_s(&self) -> f64 {
        self.time_ms as f64 * 0.001
    }
}

/// Destination for derived-output rows
pub trait FrameSink {
    fn name(&self) -> &str;

    /// Write one row set for a triggering step
    fn write(&mut self, frame: &DerivedFrame) -> Result<(), ContractError>;

    /// Flush buffered rows to the underlying resource
    fn flush(&mut self) -> Result<(), ContractError>;
}
