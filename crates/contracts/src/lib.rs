//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Record timestamps are log microseconds (u64), monotonically non-decreasing
//! - The replay clock is the estimator's millisecond counter derived from them

mod error;
mod estimator;
mod frame;
mod record;
mod replay_config;
mod source;

pub use error::*;
pub use estimator::*;
pub use frame::*;
pub use record::*;
pub use replay_config::*;
pub use source::RecordSource;
