//! Offline state-estimation backend.
//!
//! Implements the [`contracts::Estimator`] boundary with a
//! self-contained dead-reckoning filter: gyro integration with
//! accelerometer leveling for attitude, plain velocity/position
//! integration referenced to the committed home point. Deterministic
//! and dependency-free, so replays of the same log always produce the
//! same derived output.

mod offline;

pub use offline::OfflineEstimator;
