//! # Integration Tests
//!
//! Cross-crate integration and end-to-end tests.
//!
//! Covers:
//! - The full record path: source -> replay engine -> table sinks
//! - Rate detection over a real on-disk log
//! - Format arbitration across crate boundaries

#[cfg(test)]
mod e2e {
    use std::io::Write;
    use std::path::Path;

    use contracts::{
        BaroSample, Estimator, FixStatus, GeoLocation, GpsFix, InertialSample, LogRecord,
        ParamOverride, RecordData, ReplayConfig,
    };
    use dispatcher::SinkDispatcher;
    use estimation::OfflineEstimator;
    use ingestion::{JsonLogReader, ScriptedLog};
    use replay_engine::{detect_update_rate, InertialFormat, ReplayDispatcher};
    use tempfile::tempdir;

    const TABLE_NAMES: [&str; 6] = [
        "plot.dat", "plot2.dat", "EKF1.dat", "EKF2.dat", "EKF3.dat", "EKF4.dat",
    ];

    fn record(time_us: u64, data: RecordData) -> LogRecord {
        LogRecord { time_us, data }
    }

    fn gps(status: FixStatus) -> RecordData {
        RecordData::Gps(GpsFix {
            status,
            location: GeoLocation {
                lat: -353_632_610,
                lng: 1_491_652_300,
                alt_cm: 58_400,
            },
            ground_speed: 3.0,
            ground_course: 90.0,
        })
    }

    fn baro(altitude: f32) -> RecordData {
        RecordData::Baro(BaroSample {
            altitude,
            pressure: 101_000.0,
            temperature: 20.0,
        })
    }

    fn imu() -> RecordData {
        RecordData::Imu(InertialSample::default())
    }

    /// Log from the canonical scenario: bootstrap section, calibration,
    /// fix acquisition, then a run of triggering inertial records
    fn scenario_records() -> Vec<LogRecord> {
        let mut records = vec![
            record(
                0,
                RecordData::Format {
                    name: "GPS".to_string(),
                },
            ),
            record(
                0,
                RecordData::Parameter {
                    name: "TEST_PARAM".to_string(),
                    value: 1.0,
                },
            ),
            record(20_000, baro(12.0)),
            record(40_000, gps(FixStatus::NoFix)),
            record(60_000, imu()),
            record(80_000, gps(FixStatus::Fix3d)),
        ];
        for i in 0..10u64 {
            records.push(record(100_000 + i * 20_000, imu()));
        }
        records
    }

    fn table_lines(dir: &Path, name: &str) -> Vec<String> {
        std::fs::read_to_string(dir.join(name))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_scripted_replay_fills_all_tables() {
        let dir = tempdir().unwrap();
        let mut config = ReplayConfig::for_log("scenario");
        config.overrides.push(ParamOverride {
            name: "TEST_PARAM".to_string(),
            value: 3.0,
        });

        let mut source = ScriptedLog::new(scenario_records());
        let mut estimator = OfflineEstimator::new();
        let mut sink = SinkDispatcher::tables(dir.path()).unwrap();
        let mut replay = ReplayDispatcher::new(&config);

        let stats = replay
            .run(&mut source, &mut estimator, &mut sink)
            .unwrap();

        assert!(stats.home_established);
        assert_eq!(stats.triggers, 10);
        assert_eq!(estimator.parameter("TEST_PARAM"), Some(3.0));
        assert_eq!(replay.format(), InertialFormat::Legacy);

        // every table gets its header plus one row per trigger
        for name in TABLE_NAMES {
            let lines = table_lines(dir.path(), name);
            assert_eq!(lines.len(), 11, "{name}");
        }

        // replay clock stamped into the detail tables
        let ekf1 = table_lines(dir.path(), "EKF1.dat");
        assert!(ekf1[1].starts_with("0.100 100 "));
        assert!(ekf1[10].starts_with("0.280 280 "));
    }

    fn write_json_log(path: &Path, records: &[LogRecord]) {
        let mut file = std::fs::File::create(path).unwrap();
        for record in records {
            serde_json::to_writer(&file, record).unwrap();
            writeln!(file).unwrap();
        }
    }

    #[test]
    fn test_disk_log_replay_round_trip() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("flight.jsonl");
        write_json_log(&log_path, &scenario_records());

        let mut source = JsonLogReader::open(&log_path).unwrap();
        let mut estimator = OfflineEstimator::new();
        let mut sink = SinkDispatcher::tables(dir.path()).unwrap();
        let mut replay = ReplayDispatcher::new(&ReplayConfig::for_log(&log_path));

        let stats = replay
            .run(&mut source, &mut estimator, &mut sink)
            .unwrap();
        assert_eq!(stats.triggers, 10);
        assert_eq!(stats.final_clock_ms, 280);
        assert_eq!(estimator.home().unwrap().alt_cm, 58_400);
    }

    #[test]
    fn test_rate_detection_from_disk_log() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("rate.jsonl");

        // IMU2 every 2500 us -> 400 Hz, with unrelated records interleaved
        let mut records = Vec::new();
        for i in 0..12u64 {
            records.push(record(i * 2_500, RecordData::Imu2(InertialSample::default())));
            records.push(record(i * 2_500 + 1_000, imu()));
        }
        write_json_log(&log_path, &records);

        let mut source = JsonLogReader::open(&log_path).unwrap();
        let rate = detect_update_rate(&mut source, "IMU2").unwrap();
        assert_eq!(rate, 400);
    }

    #[test]
    fn test_rate_detection_fails_on_short_log() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("short.jsonl");
        let records: Vec<LogRecord> = (0..4u64)
            .map(|i| record(i * 10_000, RecordData::Imu2(InertialSample::default())))
            .collect();
        write_json_log(&log_path, &records);

        let mut source = JsonLogReader::open(&log_path).unwrap();
        assert!(detect_update_rate(&mut source, "IMU2").is_err());
    }

    #[test]
    fn test_framed_log_triggers_only_on_frame_markers() {
        let dir = tempdir().unwrap();
        let mut records = vec![
            record(20_000, baro(0.0)),
            record(40_000, gps(FixStatus::Fix3d)),
        ];
        // framed log: FRAM marker leading each inertial pair
        for i in 0..5u64 {
            let base = 60_000 + i * 20_000;
            records.push(record(base, RecordData::FrameSync));
            records.push(record(base + 1_000, imu()));
            records.push(record(base + 2_000, RecordData::Imu2(InertialSample::default())));
        }

        let mut source = ScriptedLog::new(records);
        let mut estimator = OfflineEstimator::new();
        let mut sink = SinkDispatcher::tables(dir.path()).unwrap();
        let mut replay = ReplayDispatcher::new(&ReplayConfig::for_log("framed"));

        let stats = replay
            .run(&mut source, &mut estimator, &mut sink)
            .unwrap();
        assert_eq!(replay.format(), InertialFormat::Framed);
        assert_eq!(stats.triggers, 5);
    }

    #[test]
    fn test_legacy_only_ignores_framed_markers() {
        let dir = tempdir().unwrap();
        let mut records = vec![
            record(20_000, baro(0.0)),
            record(40_000, gps(FixStatus::Fix3d)),
        ];
        for i in 0..5u64 {
            let base = 60_000 + i * 20_000;
            records.push(record(base, imu()));
            records.push(record(base + 2_000, RecordData::FrameSync));
        }

        let mut config = ReplayConfig::for_log("framed");
        config.framed_alt_enabled = false;

        let mut source = ScriptedLog::new(records);
        let mut estimator = OfflineEstimator::new();
        let mut sink = SinkDispatcher::tables(dir.path()).unwrap();
        let mut replay = ReplayDispatcher::new(&config);

        let stats = replay
            .run(&mut source, &mut estimator, &mut sink)
            .unwrap();
        assert_eq!(replay.format(), InertialFormat::Legacy);
        assert_eq!(stats.triggers, 5);
    }

    #[test]
    fn test_config_file_drives_replay() {
        use config_loader::{ConfigFormat, ConfigLoader};
        use contracts::{ContractError, DerivedFrame, FrameSink};
        use observability::ReplayMetricsAggregator;

        let dir = tempdir().unwrap();
        let log_path = dir.path().join("flight.jsonl");
        write_json_log(&log_path, &scenario_records());

        let toml = format!(
            "log_path = \"{}\"\n\n[[overrides]]\nname = \"TEST_PARAM\"\nvalue = 2.5\n",
            log_path.display()
        );
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        struct AggregatingSink {
            aggregator: ReplayMetricsAggregator,
        }

        impl FrameSink for AggregatingSink {
            fn name(&self) -> &str {
                "aggregating"
            }

            fn write(&mut self, frame: &DerivedFrame) -> Result<(), ContractError> {
                self.aggregator.update(frame);
                Ok(())
            }

            fn flush(&mut self) -> Result<(), ContractError> {
                Ok(())
            }
        }

        let mut source = JsonLogReader::open(&config.log_path).unwrap();
        let mut estimator = OfflineEstimator::new();
        let mut sink = AggregatingSink {
            aggregator: ReplayMetricsAggregator::new(),
        };
        let mut replay = ReplayDispatcher::new(&config);

        let stats = replay
            .run(&mut source, &mut estimator, &mut sink)
            .unwrap();
        assert_eq!(estimator.parameter("TEST_PARAM"), Some(2.5));
        assert_eq!(sink.aggregator.total_frames, stats.frames_emitted);
        // frames span the first to last trigger, 100ms..280ms
        let summary = sink.aggregator.summary();
        assert!((summary.duration_s - 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_override_leaves_tables_empty() {
        let dir = tempdir().unwrap();
        let mut config = ReplayConfig::for_log("scenario");
        config.overrides.push(ParamOverride {
            name: "NO_SUCH_PARAM".to_string(),
            value: 1.0,
        });

        let mut source = ScriptedLog::new(scenario_records());
        let mut estimator = OfflineEstimator::new();
        let mut sink = SinkDispatcher::tables(dir.path()).unwrap();
        let mut replay = ReplayDispatcher::new(&config);

        assert!(replay.run(&mut source, &mut estimator, &mut sink).is_err());
        for name in TABLE_NAMES {
            let lines = table_lines(dir.path(), name);
            assert_eq!(lines.len(), 1, "{name} should hold only its header");
        }
    }
}
