//! # Log Ingestion
//!
//! Record sources for the replay engine.
//!
//! Responsibilities:
//! - Open a decoded flight log and stream its records in order
//! - Surface decode failures with the offending record index
//! - Forward inertial channel masks to the decoding layer
//!
//! The binary wire format is handled by an external decoder; replay
//! consumes its JSON-lines output. [`JsonLogReader`] streams a decoded
//! log from disk, [`ScriptedLog`] serves an in-memory record sequence
//! for tests.

mod reader;
mod scripted;

pub use contracts::{LogRecord, RecordSource};
pub use reader::JsonLogReader;
pub use scripted::ScriptedLog;
