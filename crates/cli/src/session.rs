//! Replay session orchestration.
//!
//! Builds the effective configuration (config file merged with CLI
//! flags), resolves the update rate, wires source, estimator and table
//! sinks together and drives the replay to completion.

use std::fs;

use contracts::{ContractError, DerivedFrame, FrameSink, RecordSource, ReplayConfig};
use dispatcher::SinkDispatcher;
use estimation::OfflineEstimator;
use ingestion::JsonLogReader;
use observability::{record_frame_emitted, ReplayMetricsAggregator, StatsSummary};
use replay_engine::{detect_update_rate, ReplayDispatcher, ReplayStats};
use tracing::info;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Merge the optional config file with the command-line flags.
/// Flags win over file values; `--parm` overrides are appended after
/// the file's, so they take effect last.
pub fn build_config(cli: &Cli) -> Result<ReplayConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            config_loader::ConfigLoader::load_from_path(path)?
        }
        None => {
            let log = cli.log.as_ref().ok_or(CliError::MissingLogPath)?;
            ReplayConfig::for_log(log)
        }
    };

    if let Some(log) = &cli.log {
        config.log_path = log.clone();
    }
    if let Some(rate) = cli.rate {
        config.update_rate = Some(rate);
    }
    config.overrides.extend(cli.parm.iter().cloned());
    if let Some(mask) = cli.accel_mask {
        config.accel_mask = Some(mask);
    }
    if let Some(mask) = cli.gyro_mask {
        config.gyro_mask = Some(mask);
    }
    if let Some(arm_time) = cli.arm_time {
        config.arm_time_ms = Some(arm_time);
    }
    if cli.legacy_only {
        config.framed_alt_enabled = false;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    config_loader::validate(&config)?;
    Ok(config)
}

/// Table fan-out combined with the in-memory summary aggregate
struct RecordingSink<'a> {
    tables: SinkDispatcher,
    aggregator: &'a mut ReplayMetricsAggregator,
}

impl FrameSink for RecordingSink<'_> {
    fn name(&self) -> &str {
        "recording"
    }

    fn write(&mut self, frame: &DerivedFrame) -> std::result::Result<(), ContractError> {
        self.aggregator.update(frame);
        record_frame_emitted(frame);
        self.tables.write(frame)
    }

    fn flush(&mut self) -> std::result::Result<(), ContractError> {
        self.tables.flush()
    }
}

/// Run a full replay session. Returns the engine stats on clean
/// completion; any error is fatal for the process.
pub fn run(cli: &Cli) -> Result<ReplayStats> {
    let config = build_config(cli)?;

    let rate = resolve_update_rate(&config)?;
    info!(
        log = %config.log_path.display(),
        rate_hz = rate,
        overrides = config.overrides.len(),
        framed_alt = config.framed_alt_enabled,
        "replay session configured"
    );

    let mut source = JsonLogReader::open(&config.log_path)?;
    source.set_inertial_masks(config.accel_mask, config.gyro_mask);

    fs::create_dir_all(&config.output_dir)?;
    let mut aggregator = ReplayMetricsAggregator::new();
    let mut sink = RecordingSink {
        tables: SinkDispatcher::tables(&config.output_dir)?,
        aggregator: &mut aggregator,
    };

    let mut estimator = OfflineEstimator::new();
    let mut replay = ReplayDispatcher::new(&config);
    let stats = replay.run(&mut source, &mut estimator, &mut sink)?;

    info!(
        records = stats.records_read,
        triggers = stats.triggers,
        frames = stats.frames_emitted,
        duration_s = format!("{:.1}", stats.final_clock_s()),
        trigger_interval_ms = %StatsSummary::from(&stats.trigger_interval_ms),
        format = ?replay.format(),
        "replay finished"
    );
    println!("{}", aggregator.summary());

    Ok(stats)
}

/// Use the forced rate when given, otherwise run detection over an
/// independently opened pass of the log
fn resolve_update_rate(config: &ReplayConfig) -> Result<u16> {
    if let Some(rate) = config.update_rate {
        info!(rate_hz = rate, "update rate forced");
        return Ok(rate);
    }
    let mut probe = JsonLogReader::open(&config.log_path)?;
    let rate = detect_update_rate(&mut probe, &config.reference_tag)?;
    info!(rate_hz = rate, tag = %config.reference_tag, "update rate detected");
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("logreplay").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_config_from_flags_only() {
        let config = build_config(&cli(&[
            "flight.jsonl",
            "--rate",
            "100",
            "--parm",
            "EKF_VELNE_NOISE=0.5",
            "--legacy-only",
        ]))
        .unwrap();
        assert_eq!(config.log_path.to_str(), Some("flight.jsonl"));
        assert_eq!(config.update_rate, Some(100));
        assert_eq!(config.overrides.len(), 1);
        assert!(!config.framed_alt_enabled);
        assert_eq!(config.output_dir.to_str(), Some("."));
    }

    #[test]
    fn test_missing_log_path() {
        let err = build_config(&cli(&["--rate", "100"])).unwrap_err();
        assert!(matches!(err, CliError::MissingLogPath));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let err = build_config(&cli(&["flight.jsonl", "--rate", "123"])).unwrap_err();
        assert!(err.to_string().contains("123"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_path = \"from_file.jsonl\"\nupdate_rate = 50\narm_time_ms = 1000\n\n\
             [[overrides]]\nname = \"EKF_VELNE_NOISE\"\nvalue = 0.3\n"
        )
        .unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = build_config(&cli(&[
            "cli.jsonl",
            "--config",
            &path,
            "--rate",
            "200",
            "--parm",
            "EKF_VELNE_NOISE=0.9",
        ]))
        .unwrap();

        assert_eq!(config.log_path.to_str(), Some("cli.jsonl"));
        assert_eq!(config.update_rate, Some(200));
        assert_eq!(config.arm_time_ms, Some(1000));
        // file override first, CLI override appended after (last wins)
        assert_eq!(config.overrides.len(), 2);
        assert_eq!(config.overrides[1].value, 0.9);
    }

    #[test]
    fn test_config_file_not_found() {
        let err = build_config(&cli(&["--config", "/no/such/file.toml"])).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }
}
