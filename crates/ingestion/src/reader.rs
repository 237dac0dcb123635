//! JSON-lines log reader.
//!
//! The external wire decoder emits one JSON object per record, already
//! typed; this reader streams them back in log order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use contracts::{ContractError, LogRecord, RecordSource};
use tracing::{debug, trace};

/// Streams decoded records from a JSON-lines log file
#[derive(Debug)]
pub struct JsonLogReader {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    /// Records handed out so far, used in decode diagnostics
    index: u64,
    accel_mask: Option<u8>,
    gyro_mask: Option<u8>,
}

impl JsonLogReader {
    /// Open a decoded log for streaming
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ContractError::LogOpen {
            path: path.display().to_string(),
            source,
        })?;

        debug!(path = %path.display(), "log opened");
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            index: 0,
            accel_mask: None,
            gyro_mask: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inertial channel masks forwarded from the command line. The
    /// decoder applies them when re-synthesizing multi-channel streams;
    /// a plain JSON-lines log carries a single pre-selected channel, so
    /// they are recorded here for diagnostics only.
    pub fn inertial_masks(&self) -> (Option<u8>, Option<u8>) {
        (self.accel_mask, self.gyro_mask)
    }
}

impl RecordSource for JsonLogReader {
    fn next_record(&mut self) -> Result<Option<LogRecord>, ContractError> {
        loop {
            let Some(line) = self.lines.next() else {
                debug!(path = %self.path.display(), records = self.index, "log exhausted");
                return Ok(None);
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: LogRecord = serde_json::from_str(&line)
                .map_err(|e| ContractError::record_decode(self.index, e.to_string()))?;
            self.index += 1;
            metrics::counter!("ingestion_records_total").increment(1);
            trace!(tag = record.tag(), time_us = record.time_us, "record decoded");
            return Ok(Some(record));
        }
    }

    fn set_inertial_masks(&mut self, accel_mask: Option<u8>, gyro_mask: Option<u8>) {
        self.accel_mask = accel_mask;
        self.gyro_mask = gyro_mask;
        debug!(?accel_mask, ?gyro_mask, "inertial channel masks set");
    }
}
