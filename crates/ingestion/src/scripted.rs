//! In-memory record source for tests and demos.

use std::collections::VecDeque;

use contracts::{ContractError, LogRecord, RecordSource};

/// Serves a pre-built record sequence in order
#[derive(Debug, Default)]
pub struct ScriptedLog {
    records: VecDeque<LogRecord>,
}

impl ScriptedLog {
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Records not yet handed out
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for ScriptedLog {
    fn next_record(&mut self) -> Result<Option<LogRecord>, ContractError> {
        Ok(self.records.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RecordData;
    use rand::Rng;

    #[test]
    fn test_serves_in_order_then_exhausts() {
        let mut source = ScriptedLog::new(vec![
            LogRecord {
                time_us: 10,
                data: RecordData::FrameSync,
            },
            LogRecord {
                time_us: 20,
                data: RecordData::FrameSync,
            },
        ]);

        assert_eq!(source.next_record().unwrap().unwrap().time_us, 10);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.next_record().unwrap().unwrap().time_us, 20);
        assert!(source.next_record().unwrap().is_none());
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_jittered_timestamps_preserved() {
        let mut rng = rand::rng();
        let mut time_us = 0u64;
        let records: Vec<LogRecord> = (0..50)
            .map(|_| {
                time_us += 10_000 + rng.random_range(0..500);
                LogRecord {
                    time_us,
                    data: RecordData::FrameSync,
                }
            })
            .collect();
        let expected: Vec<u64> = records.iter().map(|r| r.time_us).collect();

        let mut source = ScriptedLog::new(records);
        let mut seen = Vec::new();
        while let Some(record) = source.next_record().unwrap() {
            seen.push(record.time_us);
        }
        assert_eq!(seen, expected);
    }
}
