//! Estimator - the state-estimation boundary
//!
//! The attitude/velocity/position estimation math is an external
//! collaborator. The replay engine drives it exclusively through this
//! trait: per-type sensor ingestion, the full update step, home and
//! parameter management, and the diagnostic snapshot emitted on each
//! triggering step.

use nalgebra::{Vector2, Vector3};

use crate::{AirspeedSample, BaroSample, GeoLocation, GpsFix, InertialDelta, InertialSample,
            MagSample};

/// State-estimation backend driven by the replay engine
pub trait Estimator {
    // ===== Replay clock =====

    /// Advance the monotonic replay clock from a record timestamp.
    /// Never moves backwards.
    fn advance_clock(&mut self, time_us: u64);

    /// Replay clock in milliseconds
    fn millis(&self) -> u64;

    // ===== Parameters =====

    /// Merge a parameter embedded in the log (baseline configuration)
    fn load_log_parameter(&mut self, name: &str, value: f32);

    /// Apply a user override. Returns false when the name is unknown.
    #[must_use]
    fn set_parameter(&mut self, name: &str, value: f32) -> bool;

    // ===== Sensor ingestion =====

    fn ingest_gps(&mut self, fix: &GpsFix);
    fn gps_status(&self) -> crate::FixStatus;
    fn gps_location(&self) -> GeoLocation;

    /// Request a wind estimate (called when a qualifying 3D fix is present)
    fn estimate_wind(&mut self);

    fn ingest_mag(&mut self, sample: &MagSample);

    /// Attach the airspeed source to the estimator
    fn attach_airspeed(&mut self, sample: &AirspeedSample);

    fn ingest_baro(&mut self, sample: &BaroSample);

    /// One-time ground calibration capture, performed on the first
    /// pressure record of the session
    fn calibrate_baro(&mut self);

    /// Rate-integrated inertial sample; `instance` 0 = primary stream
    fn ingest_inertial(&mut self, sample: &InertialSample, instance: usize);

    /// Delta-integrated inertial sample of the alternate format
    fn ingest_inertial_delta(&mut self, delta: &InertialDelta, instance: usize);

    // ===== Update step =====

    /// Full estimator update (one filter step)
    fn update(&mut self);

    /// Time delta of the most recent inertial sample (s)
    fn delta_time(&self) -> f32;

    /// Advance the secondary position integrator
    fn advance_position_integrator(&mut self, dt: f32);

    /// Estimator health (informational; transitions are logged, never fatal)
    fn healthy(&self) -> bool;

    // ===== Home / arming =====

    fn set_home(&mut self, location: GeoLocation);
    fn home(&self) -> Option<GeoLocation>;

    /// Reference location for magnetic declination lookup
    fn set_declination_origin(&mut self, lat: i32, lng: i32);

    fn set_soft_armed(&mut self, armed: bool);

    // ===== Diagnostics =====

    /// Snapshot of the diagnostic state mirrored into the detail tables
    fn derived(&self) -> DerivedState;
}

/// Diagnostic snapshot pulled from the estimator on each trigger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedState {
    /// Filter attitude solution (rad)
    pub euler: Vector3<f32>,
    /// Legacy direction-cosine attitude solution (rad)
    pub dcm_euler: Vector3<f32>,
    /// Velocity NED (m/s)
    pub vel_ned: Vector3<f32>,
    /// Position NED relative to home (m)
    pub pos_ned: Vector3<f32>,
    /// Gyro bias estimate (rad/s)
    pub gyro_bias: Vector3<f32>,
    /// Accelerometer blend weighting [0,1]
    pub accel_weighting: f32,
    /// Z accel bias, primary / secondary (m/s^2)
    pub accel_z_bias1: f32,
    pub accel_z_bias2: f32,
    /// Wind velocity NE (m/s); z unused
    pub wind: Vector3<f32>,
    /// Earth-frame magnetic field estimate (milligauss)
    pub mag_ned: Vector3<f32>,
    /// Body-frame magnetic field estimate (milligauss)
    pub mag_xyz: Vector3<f32>,
    /// Innovations
    pub vel_innov: Vector3<f32>,
    pub pos_innov: Vector3<f32>,
    pub mag_innov: Vector3<f32>,
    pub tas_innov: f32,
    /// Innovation variances
    pub vel_var: f32,
    pub pos_var: f32,
    pub hgt_var: f32,
    pub mag_var: Vector3<f32>,
    pub tas_var: f32,
    /// Position offset applied on fix glitches (m)
    pub pos_offset: Vector2<f32>,
    /// Filter fault status bitmask
    pub fault_status: u8,
    /// Secondary position integrator output (m)
    pub inav_pos: Vector3<f32>,
    /// Filter position relative to home (m)
    pub rel_pos: Vector3<f32>,
    /// Barometric altitude above calibration reference (m)
    pub baro_alt: f32,
}
