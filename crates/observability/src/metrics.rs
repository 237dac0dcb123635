//! Replay metric collection.
//!
//! Live counters/gauges go through the `metrics` facade; the aggregator
//! keeps in-memory statistics for the summary printed at end of replay.

use contracts::DerivedFrame;
use metrics::{counter, gauge, histogram};

/// Record one emitted derived frame
pub fn record_frame_emitted(frame: &DerivedFrame) {
    counter!("replay_frames_total").increment(1);
    gauge!("replay_clock_seconds").set(frame.time_s());
    histogram!("replay_baro_alt_m").record(f64::from(frame.state.baro_alt));
}

/// Record one record pulled from the log
pub fn record_record_read(tag: &str) {
    counter!("replay_records_read_total", "tag" => tag.to_string()).increment(1);
}

/// Replay metric aggregator
///
/// Aggregates per-frame statistics in memory for the end-of-run
/// summary.
#[derive(Debug, Clone, Default)]
pub struct ReplayMetricsAggregator {
    /// Emitted frames
    pub total_frames: u64,

    /// Replay clock at the first emitted frame (ms)
    pub first_time_ms: Option<u64>,

    /// Replay clock at the latest emitted frame (ms)
    pub last_time_ms: u64,

    /// Roll deviation against the onboard solution (deg)
    pub roll_err_stats: RunningStats,

    /// Pitch deviation against the onboard solution (deg)
    pub pitch_err_stats: RunningStats,

    /// Barometric altitude above the calibration reference (m)
    pub baro_alt_stats: RunningStats,
}

impl ReplayMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one emitted frame into the aggregate
    pub fn update(&mut self, frame: &DerivedFrame) {
        self.total_frames += 1;
        self.first_time_ms.get_or_insert(frame.time_ms);
        self.last_time_ms = frame.time_ms;

        let roll_err =
            f64::from(frame.state.euler.x.to_degrees() - frame.reference.attitude.roll_deg);
        let pitch_err =
            f64::from(frame.state.euler.y.to_degrees() - frame.reference.attitude.pitch_deg);
        self.roll_err_stats.push(roll_err);
        self.pitch_err_stats.push(pitch_err);
        self.baro_alt_stats.push(f64::from(frame.state.baro_alt));
    }

    /// Produce the summary report
    pub fn summary(&self) -> ReplaySummary {
        let duration_s = match self.first_time_ms {
            Some(first) => (self.last_time_ms.saturating_sub(first)) as f64 * 0.001,
            None => 0.0,
        };
        ReplaySummary {
            total_frames: self.total_frames,
            duration_s,
            roll_err_deg: StatsSummary::from(&self.roll_err_stats),
            pitch_err_deg: StatsSummary::from(&self.pitch_err_stats),
            baro_alt_m: StatsSummary::from(&self.baro_alt_stats),
        }
    }

    /// Reset the aggregate
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// End-of-replay summary
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub total_frames: u64,
    pub duration_s: f64,
    pub roll_err_deg: StatsSummary,
    pub pitch_err_deg: StatsSummary,
    pub baro_alt_m: StatsSummary,
}

impl std::fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Replay Summary ===")?;
        writeln!(f, "Frames emitted: {}", self.total_frames)?;
        writeln!(f, "Replay span: {:.1} s", self.duration_s)?;
        writeln!(f, "Roll error (deg): {}", self.roll_err_deg)?;
        writeln!(f, "Pitch error (deg): {}", self.pitch_err_deg)?;
        writeln!(f, "Baro altitude (m): {}", self.baro_alt_m)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
