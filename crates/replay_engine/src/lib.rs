//! Replay engine - deterministic flight-log replay
//!
//! Pull-driven, single-threaded. Pulls decoded records from a
//! [`contracts::RecordSource`], drives a [`contracts::Estimator`]
//! through side updates and format-dependent full-update triggers, and
//! emits one [`contracts::DerivedFrame`] per trigger to the configured
//! sink.

mod arm;
mod engine;
mod format;
mod home;
mod params;
mod rate;

pub use arm::ArmTimeGate;
pub use engine::{ReplayDispatcher, ReplayStats};
pub use format::{InertialFormat, SensorFormatArbiter};
pub use home::HomeInitializer;
pub use params::ParameterStager;
pub use rate::{canonical_rate, detect_update_rate};
