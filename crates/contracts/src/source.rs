//! RecordSource - the decoder boundary
//!
//! The replay engine consumes the log strictly forward through this trait.
//! Rate detection uses an independently opened source for its dry-run pass.

use crate::{ContractError, LogRecord};

/// Sequential pull of decoded records from one flight log
pub trait RecordSource {
    /// Pull the next record, or `None` on exhaustion.
    fn next_record(&mut self) -> Result<Option<LogRecord>, ContractError>;

    /// Inertial-channel selection masks, passed through opaquely to the
    /// decoder. Decoders without channel selection ignore this.
    fn set_inertial_masks(&mut self, _accel_mask: Option<u8>, _gyro_mask: Option<u8>) {}
}
