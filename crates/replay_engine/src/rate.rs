//! Update-rate detection from raw timestamp deltas.
//!
//! A dry-run forward pass over an independently opened copy of the log:
//! the main replay stream is never rewound.

use contracts::{ContractError, RecordSource, CANONICAL_RATES};
use tracing::debug;

/// Inter-arrival intervals averaged before bucketing
const SAMPLE_COUNT: u64 = 10;

/// Map a measured rate onto the canonical set, using the asymmetric
/// tolerance windows checked in order.
pub fn canonical_rate(rate: f64) -> Option<u16> {
    if (rate - 50.0).abs() < 5.0 {
        return Some(50);
    }
    if (rate - 100.0).abs() < 10.0 {
        return Some(100);
    }
    if (rate - 200.0).abs() < 10.0 {
        return Some(200);
    }
    // logs have been seen a full 10 Hz off at this rate
    if (rate - 400.0).abs() < 20.0 {
        return Some(400);
    }
    None
}

/// Detect the log's nominal update rate from the first ten positive
/// inter-arrival intervals of `reference_tag` records.
///
/// The very first observed timestamp is a baseline and contributes no
/// interval; non-positive deltas are skipped without counting.
pub fn detect_update_rate(
    source: &mut dyn RecordSource,
    reference_tag: &str,
) -> Result<u16, ContractError> {
    let mut sample_count: u64 = 0;
    let mut sample_sum: u64 = 0;
    let mut prev: Option<u64> = None;

    while sample_count < SAMPLE_COUNT {
        let record = match source.next_record()? {
            Some(record) => record,
            None => break,
        };
        if record.tag() != reference_tag {
            continue;
        }

        if let Some(prev_us) = prev {
            if record.time_us > prev_us {
                sample_count += 1;
                sample_sum += record.time_us - prev_us;
            }
        }
        prev = Some(record.time_us);
    }

    if sample_count < SAMPLE_COUNT {
        return Err(ContractError::rate_detection(format!(
            "insufficient {reference_tag} records ({sample_count} intervals, need {SAMPLE_COUNT})"
        )));
    }

    let mean_interval_us = sample_sum / sample_count;
    let rate = 1_000_000.0 / mean_interval_us as f64;
    debug!(mean_interval_us, rate, "measured raw update rate");

    canonical_rate(rate).ok_or_else(|| {
        ContractError::rate_detection(format!(
            "{rate:.1} Hz matches no canonical rate {CANONICAL_RATES:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{InertialSample, LogRecord, RecordData};
    use ingestion::ScriptedLog;

    fn imu2_stream(interval_us: u64, count: usize) -> ScriptedLog {
        let records = (0..count)
            .map(|i| LogRecord {
                time_us: 1000 + i as u64 * interval_us,
                data: RecordData::Imu2(InertialSample::default()),
            })
            .collect();
        ScriptedLog::new(records)
    }

    #[test]
    fn test_bucket_windows() {
        // 50 +/- 4 passes, 100/200 +/- 9, 400 +/- 19
        assert_eq!(canonical_rate(46.0), Some(50));
        assert_eq!(canonical_rate(54.0), Some(50));
        assert_eq!(canonical_rate(91.0), Some(100));
        assert_eq!(canonical_rate(109.0), Some(100));
        assert_eq!(canonical_rate(191.0), Some(200));
        assert_eq!(canonical_rate(209.0), Some(200));
        assert_eq!(canonical_rate(381.0), Some(400));
        assert_eq!(canonical_rate(419.0), Some(400));
    }

    #[test]
    fn test_bucket_rejects_out_of_window() {
        assert_eq!(canonical_rate(45.0), None);
        assert_eq!(canonical_rate(60.0), None);
        assert_eq!(canonical_rate(111.0), None);
        assert_eq!(canonical_rate(300.0), None);
        assert_eq!(canonical_rate(425.0), None);
    }

    #[test]
    fn test_detect_50hz() {
        let mut source = imu2_stream(20_000, 12);
        assert_eq!(detect_update_rate(&mut source, "IMU2").unwrap(), 50);
    }

    #[test]
    fn test_detect_400hz() {
        let mut source = imu2_stream(2_500, 12);
        assert_eq!(detect_update_rate(&mut source, "IMU2").unwrap(), 400);
    }

    #[test]
    fn test_detect_ignores_other_tags() {
        let mut records = Vec::new();
        for i in 0..12u64 {
            records.push(LogRecord {
                time_us: 1000 + i * 10_000,
                data: RecordData::Imu2(InertialSample::default()),
            });
            // interleaved records of another type must not contribute intervals
            records.push(LogRecord {
                time_us: 1000 + i * 10_000 + 100,
                data: RecordData::Imu(InertialSample::default()),
            });
        }
        let mut source = ScriptedLog::new(records);
        assert_eq!(detect_update_rate(&mut source, "IMU2").unwrap(), 100);
    }

    #[test]
    fn test_detect_skips_non_positive_deltas() {
        let mut records = Vec::new();
        let mut t = 1000u64;
        for i in 0..14 {
            records.push(LogRecord {
                time_us: t,
                data: RecordData::Imu2(InertialSample::default()),
            });
            // two repeated timestamps in the middle of the run
            if i != 5 && i != 6 {
                t += 5_000;
            }
        }
        let mut source = ScriptedLog::new(records);
        assert_eq!(detect_update_rate(&mut source, "IMU2").unwrap(), 200);
    }

    #[test]
    fn test_detect_fails_on_short_stream() {
        let mut source = imu2_stream(20_000, 5);
        let err = detect_update_rate(&mut source, "IMU2").unwrap_err();
        assert!(matches!(err, ContractError::RateDetection { .. }));
    }

    #[test]
    fn test_detect_fails_on_unbucketable_rate() {
        // ~66.7 Hz, outside every window
        let mut source = imu2_stream(15_000, 12);
        let err = detect_update_rate(&mut source, "IMU2").unwrap_err();
        assert!(matches!(err, ContractError::RateDetection { .. }));
    }
}
