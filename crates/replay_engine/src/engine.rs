//! Main replay dispatch loop.

use contracts::{
    ContractError, DerivedFrame, Estimator, FixStatus, FrameSink, LogRecord, RecordData,
    RecordSource, ReferenceState, ReplayConfig,
};
use observability::RunningStats;
use tracing::{debug, info, instrument, warn};

use crate::arm::ArmTimeGate;
use crate::format::{InertialFormat, SensorFormatArbiter};
use crate::home::HomeInitializer;
use crate::params::ParameterStager;

/// Statistics from a completed replay
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// Records pulled from the stream (both phases)
    pub records_read: u64,
    /// Full estimator updates triggered
    pub triggers: u64,
    /// Derived-output rows emitted
    pub frames_emitted: u64,
    /// Estimator health transitions observed
    pub health_transitions: u64,
    /// Final replay clock (ms)
    pub final_clock_ms: u64,
    /// Whether home initialization completed
    pub home_established: bool,
    /// Replay-clock interval between triggers (ms)
    pub trigger_interval_ms: RunningStats,
}

impl ReplayStats {
    /// Final replay clock in seconds
    pub fn final_clock_s(&self) -> f64 {
        self.final_clock_ms as f64 * 0.001
    }
}

/// Top-level replay driver.
///
/// Owns all mutable session state: sticky format detection, the staging
/// gate, home state and the arm gate. Single-threaded and pull-driven;
/// every record is fully processed before the next one is read.
pub struct ReplayDispatcher {
    arbiter: SensorFormatArbiter,
    stager: ParameterStager,
    home: HomeInitializer,
    arm_gate: ArmTimeGate,
    reference: ReferenceState,
    baro_calibrated: bool,
    last_healthy: bool,
    last_trigger_ms: Option<u64>,
    stats: ReplayStats,
}

impl ReplayDispatcher {
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            arbiter: SensorFormatArbiter::new(config.framed_alt_enabled),
            stager: ParameterStager::new(config.overrides.clone()),
            home: HomeInitializer::new(),
            arm_gate: ArmTimeGate::new(config.arm_time_ms),
            reference: ReferenceState::default(),
            baro_calibrated: false,
            last_healthy: false,
            last_trigger_ms: None,
            stats: ReplayStats::default(),
        }
    }

    /// Currently detected inertial format
    pub fn format(&self) -> InertialFormat {
        self.arbiter.format()
    }

    /// Drive the replay to completion or fatal error.
    ///
    /// Phase one pulls records through the side-update path with
    /// triggers suppressed until home initialization completes; phase
    /// two dispatches the remainder of the stream.
    #[instrument(name = "replay_run", skip_all)]
    pub fn run(
        &mut self,
        source: &mut dyn RecordSource,
        estimator: &mut dyn Estimator,
        sink: &mut dyn FrameSink,
    ) -> Result<ReplayStats, ContractError> {
        info!("starting disarmed");
        estimator.set_soft_armed(false);

        if !self.initialize_home(source, estimator)? {
            warn!("log ended before home initialization completed");
            return self.finish(estimator, sink);
        }

        loop {
            let now_ms = estimator.millis();
            self.arm_gate.poll(now_ms, estimator);

            let Some(record) = source.next_record()? else {
                info!(
                    time_s = format!("{:.1}", estimator.millis() as f64 * 0.001),
                    "end of log"
                );
                return self.finish(estimator, sink);
            };
            self.step(&record, estimator, Some(sink))?;
        }
    }

    /// Pull records until home can be committed. Returns false when the
    /// stream exhausts first (replay then never leaves initialization).
    fn initialize_home(
        &mut self,
        source: &mut dyn RecordSource,
        estimator: &mut dyn Estimator,
    ) -> Result<bool, ContractError> {
        info!("waiting for GPS lock and barometer calibration");
        loop {
            let Some(record) = source.next_record()? else {
                return Ok(false);
            };
            self.step(&record, estimator, None)?;

            if self
                .home
                .observe(record.tag(), self.baro_calibrated, estimator)
            {
                self.stats.home_established = true;
                return Ok(true);
            }
        }
    }

    /// Process one record: staging gate, format arbitration, per-type
    /// side updates, and (when a sink is given) the trigger path.
    fn step(
        &mut self,
        record: &LogRecord,
        estimator: &mut dyn Estimator,
        sink: Option<&mut dyn FrameSink>,
    ) -> Result<(), ContractError> {
        self.stats.records_read += 1;
        observability::record_record_read(record.tag());

        estimator.advance_clock(record.time_us);
        self.stager
            .maybe_apply(record.data.is_bootstrap(), estimator)?;

        let trigger = self.arbiter.observe(record.tag());
        self.side_update(record, estimator);

        if trigger {
            if let Some(sink) = sink {
                self.run_update(estimator, sink)?;
            }
        }
        Ok(())
    }

    /// Type-specific sensor-state updates, independent of triggering
    fn side_update(&mut self, record: &LogRecord, estimator: &mut dyn Estimator) {
        match &record.data {
            RecordData::Parameter { name, value } => {
                estimator.load_log_parameter(name, *value);
            }
            RecordData::Gps(fix) => {
                estimator.ingest_gps(fix);
                if estimator.gps_status() >= FixStatus::Fix3d {
                    estimator.estimate_wind();
                }
            }
            RecordData::Mag(sample) => estimator.ingest_mag(sample),
            RecordData::Airspeed(sample) => estimator.attach_airspeed(sample),
            RecordData::Baro(sample) => {
                estimator.ingest_baro(sample);
                if !self.baro_calibrated {
                    self.baro_calibrated = true;
                    estimator.calibrate_baro();
                    info!("barometer calibrated");
                }
            }
            RecordData::Imu(sample) => estimator.ingest_inertial(sample, 0),
            RecordData::Imu2(sample) => estimator.ingest_inertial(sample, 1),
            RecordData::Imt(delta) => estimator.ingest_inertial_delta(delta, 0),
            RecordData::Imt2(delta) => estimator.ingest_inertial_delta(delta, 1),
            RecordData::Attitude(att) => self.reference.attitude = *att,
            RecordData::SimState(att) => self.reference.sim_attitude = *att,
            RecordData::Ahrs2(att) => self.reference.ahrs2_attitude = *att,
            RecordData::Nav(nav) => self.reference.nav = *nav,
            RecordData::Format { .. } | RecordData::FrameSync => {}
            RecordData::Other { tag, .. } => {
                debug!(tag = %tag, "skipping uninterpreted record");
            }
        }
    }

    /// Full estimator update plus derived-output emission
    fn run_update(
        &mut self,
        estimator: &mut dyn Estimator,
        sink: &mut dyn FrameSink,
    ) -> Result<(), ContractError> {
        estimator.update();
        if estimator.home().is_some() {
            estimator.advance_position_integrator(estimator.delta_time());
        }

        let now_ms = estimator.millis();
        self.stats.triggers += 1;
        metrics::counter!("replay_triggers_total").increment(1);
        if let Some(last) = self.last_trigger_ms {
            self.stats
                .trigger_interval_ms
                .push(now_ms.saturating_sub(last) as f64);
        }
        self.last_trigger_ms = Some(now_ms);

        let frame = DerivedFrame {
            time_ms: now_ms,
            reference: self.reference,
            state: estimator.derived(),
        };
        sink.write(&frame)?;
        self.stats.frames_emitted += 1;

        let healthy = estimator.healthy();
        if healthy != self.last_healthy {
            self.last_healthy = healthy;
            self.stats.health_transitions += 1;
            info!(healthy, time_ms = now_ms, "estimator health changed");
        }
        Ok(())
    }

    fn finish(
        &mut self,
        estimator: &mut dyn Estimator,
        sink: &mut dyn FrameSink,
    ) -> Result<ReplayStats, ContractError> {
        sink.flush()?;
        self.stats.final_clock_ms = estimator.millis();
        Ok(self.stats.clone())
    }
}
