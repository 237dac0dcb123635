use std::collections::HashMap;

use contracts::{
    AirspeedSample, BaroSample, DerivedState, Estimator, FixStatus, GeoLocation, GpsFix,
    InertialDelta, InertialSample, MagSample,
};
use nalgebra::{Vector2, Vector3};
use tracing::{debug, trace};

const GRAVITY_MSS: f32 = 9.80665;

/// Accelerometer leveling gain of the complementary attitude filter
const LEVELING_GAIN: f32 = 0.02;

/// Deterministic offline estimation backend
pub struct OfflineEstimator {
    clock_us: u64,

    /// Known parameters: the log's own parameter records establish the
    /// baseline; overrides may only touch names present here
    params: HashMap<String, f32>,

    gps: GpsFix,
    baro: BaroSample,
    baro_ref_alt: f32,
    baro_calibrations: u32,
    mag: MagSample,
    airspeed: Option<AirspeedSample>,

    /// Latest sample per inertial stream (0 = primary)
    inertial: [InertialSample; 2],
    last_inertial_us: Option<u64>,
    dt: f32,

    euler: Vector3<f32>,
    /// Slower leveling-only solution, kept for comparison output
    dcm_euler: Vector3<f32>,
    vel_ned: Vector3<f32>,
    pos_ned: Vector3<f32>,
    inav_pos: Vector3<f32>,
    wind: Vector3<f32>,

    home: Option<GeoLocation>,
    declination_origin: Option<(i32, i32)>,
    soft_armed: bool,
    update_count: u64,
}

impl OfflineEstimator {
    pub fn new() -> Self {
        Self {
            clock_us: 0,
            params: HashMap::new(),
            gps: GpsFix::default(),
            baro: BaroSample::default(),
            baro_ref_alt: 0.0,
            baro_calibrations: 0,
            mag: MagSample::default(),
            airspeed: None,
            inertial: [InertialSample::default(); 2],
            last_inertial_us: None,
            dt: 0.0,
            euler: Vector3::zeros(),
            dcm_euler: Vector3::zeros(),
            vel_ned: Vector3::zeros(),
            pos_ned: Vector3::zeros(),
            inav_pos: Vector3::zeros(),
            wind: Vector3::zeros(),
            home: None,
            declination_origin: None,
            soft_armed: false,
            update_count: 0,
        }
    }

    /// Current value of a known parameter
    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.params.get(name).copied()
    }

    /// Ground calibrations performed so far
    pub fn baro_calibrations(&self) -> u32 {
        self.baro_calibrations
    }

    pub fn soft_armed(&self) -> bool {
        self.soft_armed
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn declination_origin(&self) -> Option<(i32, i32)> {
        self.declination_origin
    }

    /// Altitude above the calibration reference (m)
    fn baro_alt(&self) -> f32 {
        self.baro.altitude - self.baro_ref_alt
    }

    /// Complementary attitude step: gyro integration pulled toward the
    /// accelerometer gravity direction
    fn update_attitude(&mut self) {
        let gyro = self.inertial[0].gyro;
        let accel = self.inertial[0].accel;

        self.euler += gyro * self.dt;

        // leveling only meaningful near 1 g
        let accel_norm = accel.norm();
        if (accel_norm - GRAVITY_MSS).abs() < 0.5 * GRAVITY_MSS {
            let roll_meas = (-accel.y).atan2(-accel.z);
            let pitch_meas = accel.x.atan2((accel.y * accel.y + accel.z * accel.z).sqrt());
            self.euler.x += (roll_meas - self.euler.x) * LEVELING_GAIN;
            self.euler.y += (pitch_meas - self.euler.y) * LEVELING_GAIN;
            self.dcm_euler.x += (roll_meas - self.dcm_euler.x) * LEVELING_GAIN * 0.5;
            self.dcm_euler.y += (pitch_meas - self.dcm_euler.y) * LEVELING_GAIN * 0.5;
        }
        self.dcm_euler.z = self.euler.z;
    }

    /// Velocity/position dead reckoning, blended toward the fix when one
    /// is available
    fn update_position(&mut self) {
        let accel = self.inertial[0].accel;
        self.vel_ned.z += (accel.z + GRAVITY_MSS) * self.dt;

        if self.gps.status >= FixStatus::Fix3d {
            let course = self.gps.ground_course.to_radians();
            self.vel_ned.x = self.gps.ground_speed * course.cos();
            self.vel_ned.y = self.gps.ground_speed * course.sin();
        }

        self.pos_ned += self.vel_ned * self.dt;
        self.pos_ned.z = -(self.baro_alt());
    }
}

impl Default for OfflineEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for OfflineEstimator {
    fn advance_clock(&mut self, time_us: u64) {
        if time_us > self.clock_us {
            self.clock_us = time_us;
        }
    }

    fn millis(&self) -> u64 {
        self.clock_us / 1000
    }

    fn load_log_parameter(&mut self, name: &str, value: f32) {
        trace!(name, value, "log parameter");
        self.params.insert(name.to_string(), value);
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> bool {
        match self.params.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn ingest_gps(&mut self, fix: &GpsFix) {
        self.gps = *fix;
    }

    fn gps_status(&self) -> FixStatus {
        self.gps.status
    }

    fn gps_location(&self) -> GeoLocation {
        self.gps.location
    }

    fn estimate_wind(&mut self) {
        // triangle estimate: wind = ground vector minus air vector
        let Some(airspeed) = self.airspeed else {
            return;
        };
        let course = self.gps.ground_course.to_radians();
        let heading = self.euler.z;
        self.wind.x = self.gps.ground_speed * course.cos() - airspeed.airspeed * heading.cos();
        self.wind.y = self.gps.ground_speed * course.sin() - airspeed.airspeed * heading.sin();
    }

    fn ingest_mag(&mut self, sample: &MagSample) {
        self.mag = *sample;
    }

    fn attach_airspeed(&mut self, sample: &AirspeedSample) {
        self.airspeed = Some(*sample);
    }

    fn ingest_baro(&mut self, sample: &BaroSample) {
        self.baro = *sample;
    }

    fn calibrate_baro(&mut self) {
        self.baro_ref_alt = self.baro.altitude;
        self.baro_calibrations += 1;
        debug!(ref_alt = self.baro_ref_alt, "barometer ground reference captured");
    }

    fn ingest_inertial(&mut self, sample: &InertialSample, instance: usize) {
        if let Some(slot) = self.inertial.get_mut(instance) {
            *slot = *sample;
        }
        if instance == 0 {
            if let Some(last) = self.last_inertial_us {
                self.dt = self.clock_us.saturating_sub(last) as f32 * 1.0e-6;
            }
            self.last_inertial_us = Some(self.clock_us);
        }
    }

    fn ingest_inertial_delta(&mut self, delta: &InertialDelta, instance: usize) {
        if delta.delta_t <= 0.0 {
            return;
        }
        let sample = InertialSample {
            gyro: delta.delta_ang / delta.delta_t,
            accel: delta.delta_vel / delta.delta_t,
        };
        if let Some(slot) = self.inertial.get_mut(instance) {
            *slot = sample;
        }
        if instance == 0 {
            self.dt = delta.delta_t;
            self.last_inertial_us = Some(self.clock_us);
        }
    }

    fn update(&mut self) {
        self.update_count += 1;
        if self.dt <= 0.0 {
            return;
        }
        self.update_attitude();
        self.update_position();
    }

    fn delta_time(&self) -> f32 {
        self.dt
    }

    fn advance_position_integrator(&mut self, dt: f32) {
        self.inav_pos += self.vel_ned * dt;
        self.inav_pos.z = -(self.baro_alt());
    }

    fn healthy(&self) -> bool {
        self.update_count > 0
    }

    fn set_home(&mut self, location: GeoLocation) {
        self.home = Some(location);
        self.pos_ned = Vector3::zeros();
        self.inav_pos = Vector3::zeros();
    }

    fn home(&self) -> Option<GeoLocation> {
        self.home
    }

    fn set_declination_origin(&mut self, lat: i32, lng: i32) {
        self.declination_origin = Some((lat, lng));
    }

    fn set_soft_armed(&mut self, armed: bool) {
        self.soft_armed = armed;
    }

    fn derived(&self) -> DerivedState {
        DerivedState {
            euler: self.euler,
            dcm_euler: self.dcm_euler,
            vel_ned: self.vel_ned,
            pos_ned: self.pos_ned,
            gyro_bias: Vector3::zeros(),
            accel_weighting: if self.inertial[1].accel.norm() > 0.0 {
                0.5
            } else {
                1.0
            },
            accel_z_bias1: 0.0,
            accel_z_bias2: 0.0,
            wind: self.wind,
            mag_ned: self.mag.field + self.mag.offsets,
            mag_xyz: self.mag.field,
            vel_innov: Vector3::zeros(),
            pos_innov: Vector3::zeros(),
            mag_innov: Vector3::zeros(),
            tas_innov: 0.0,
            vel_var: 0.0,
            pos_var: 0.0,
            hgt_var: 0.0,
            mag_var: Vector3::zeros(),
            tas_var: 0.0,
            pos_offset: Vector2::zeros(),
            fault_status: 0,
            inav_pos: self.inav_pos,
            rel_pos: self.pos_ned,
            baro_alt: self.baro_alt(),
        }
    }
}
