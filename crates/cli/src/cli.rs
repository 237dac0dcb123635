//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use contracts::ParamOverride;
use std::path::PathBuf;

/// logreplay - offline flight-log replay through a state estimator
#[derive(Parser, Debug)]
#[command(
    name = "logreplay",
    author,
    version,
    about = "Flight-log replay synchronization engine",
    long_about = "Replays a decoded flight log through an offline state estimator.\n\n\
                  Detects the log's update rate and inertial packaging format, drives \n\
                  per-record sensor updates and estimator steps, and writes the derived \n\
                  analysis tables."
)]
pub struct Cli {
    /// Path to the decoded flight log (JSON lines)
    pub log: Option<PathBuf>,

    /// Force the update rate (Hz) instead of detecting it from the log
    #[arg(long, value_name = "HZ")]
    pub rate: Option<u16>,

    /// Parameter override as NAME=VALUE, repeatable, applied in order
    #[arg(long = "parm", visible_alias = "param", value_name = "NAME=VALUE")]
    pub parm: Vec<ParamOverride>,

    /// Accelerometer channel selection mask, forwarded to the decoder
    #[arg(long, value_name = "MASK")]
    pub accel_mask: Option<u8>,

    /// Gyro channel selection mask, forwarded to the decoder
    #[arg(long, value_name = "MASK")]
    pub gyro_mask: Option<u8>,

    /// Simulate arming at this replay-clock time (milliseconds)
    #[arg(long, value_name = "MS")]
    pub arm_time: Option<u32>,

    /// Restrict format detection to the legacy inertial formats
    #[arg(long)]
    pub legacy_only: bool,

    /// Directory the analysis tables are written into
    #[arg(long, value_name = "DIR", env = "LOGREPLAY_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (TOML or JSON); other flags override its values
    #[arg(short, long, env = "LOGREPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "LOGREPLAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", env = "LOGREPLAY_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGREPLAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
