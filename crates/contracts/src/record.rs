//! LogRecord - decoded flight-log records
//!
//! The binary wire decoder is an external collaborator; replay consumes
//! already-decoded, typed records. Each record carries the log timestamp
//! in microseconds and a typed payload identified by a short tag.

use bytes::Bytes;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One decoded record pulled from the log stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Log timestamp (microseconds, monotonically non-decreasing)
    pub time_us: u64,

    /// Typed payload
    pub data: RecordData,
}

impl LogRecord {
    /// Short type tag of the payload ("GPS", "IMU2", ...)
    pub fn tag(&self) -> &str {
        self.data.tag()
    }

    /// Timestamp in milliseconds
    pub fn time_ms(&self) -> u64 {
        self.time_us / 1000
    }
}

/// Typed record payloads
///
/// Variants mirror the log's record vocabulary. Types unknown to the
/// replay engine arrive as `Other` and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecordData {
    /// Log self-description record (leading configuration section)
    #[serde(rename = "FMT")]
    Format { name: String },

    /// Parameter record embedded by the logging firmware
    #[serde(rename = "PARM")]
    Parameter { name: String, value: f32 },

    /// Position fix
    #[serde(rename = "GPS")]
    Gps(GpsFix),

    /// Primary legacy inertial sample
    #[serde(rename = "IMU")]
    Imu(InertialSample),

    /// Secondary legacy inertial sample
    #[serde(rename = "IMU2")]
    Imu2(InertialSample),

    /// Alternate-format inertial sample (delta integrated), primary variant
    #[serde(rename = "IMT")]
    Imt(InertialDelta),

    /// Alternate-format inertial sample, secondary variant
    #[serde(rename = "IMT2")]
    Imt2(InertialDelta),

    /// Frame-synchronization marker of the framed inertial format
    #[serde(rename = "FRAM")]
    FrameSync,

    /// Barometric pressure sample
    #[serde(rename = "BARO")]
    Baro(BaroSample),

    /// Magnetic field sample
    #[serde(rename = "MAG")]
    Mag(MagSample),

    /// Airspeed sample
    #[serde(rename = "ARSP")]
    Airspeed(AirspeedSample),

    /// Onboard-estimated attitude carried in the log (reference)
    #[serde(rename = "ATT")]
    Attitude(AttitudeSample),

    /// Simulator ground-truth attitude (reference)
    #[serde(rename = "SIM")]
    SimState(AttitudeSample),

    /// Secondary onboard attitude solution (reference)
    #[serde(rename = "AHR2")]
    Ahrs2(AttitudeSample),

    /// Onboard inertial-navigation position (reference)
    #[serde(rename = "NTUN")]
    Nav(NavSample),

    /// Record type not interpreted by the replay engine
    #[serde(rename = "RAW")]
    Other { tag: String, raw: Bytes },
}

impl RecordData {
    /// Short type tag ("GPS", "IMU2", ...)
    pub fn tag(&self) -> &str {
        match self {
            RecordData::Format { .. } => "FMT",
            RecordData::Parameter { .. } => "PARM",
            RecordData::Gps(_) => "GPS",
            RecordData::Imu(_) => "IMU",
            RecordData::Imu2(_) => "IMU2",
            RecordData::Imt(_) => "IMT",
            RecordData::Imt2(_) => "IMT2",
            RecordData::FrameSync => "FRAM",
            RecordData::Baro(_) => "BARO",
            RecordData::Mag(_) => "MAG",
            RecordData::Airspeed(_) => "ARSP",
            RecordData::Attitude(_) => "ATT",
            RecordData::SimState(_) => "SIM",
            RecordData::Ahrs2(_) => "AHR2",
            RecordData::Nav(_) => "NTUN",
            RecordData::Other { tag, .. } => tag,
        }
    }

    /// Whether this record belongs to the log's leading configuration section
    pub fn is_bootstrap(&self) -> bool {
        matches!(
            self,
            RecordData::Format { .. } | RecordData::Parameter { .. }
        )
    }
}

/// GPS fix quality, ordered from worst to best
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    /// No receiver detected
    #[default]
    NoGps,
    /// Receiver present, no position lock
    NoFix,
    /// Horizontal-only lock
    Fix2d,
    /// Full three-dimensional lock
    Fix3d,
}

/// Geographic location in the log's fixed-point encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude, degrees * 1e7
    pub lat: i32,
    /// Longitude, degrees * 1e7
    pub lng: i32,
    /// Altitude above mean sea level, centimetres
    pub alt_cm: i32,
}

impl GeoLocation {
    pub fn lat_deg(&self) -> f64 {
        self.lat as f64 * 1.0e-7
    }

    pub fn lng_deg(&self) -> f64 {
        self.lng as f64 * 1.0e-7
    }

    pub fn alt_m(&self) -> f64 {
        self.alt_cm as f64 * 0.01
    }
}

/// Position fix payload
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GpsFix {
    pub status: FixStatus,
    pub location: GeoLocation,
    /// Ground speed (m/s)
    pub ground_speed: f32,
    /// Ground course (degrees)
    pub ground_course: f32,
}

/// Rate-integrated inertial sample (gyro rad/s, accel m/s^2)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InertialSample {
    pub gyro: Vector3<f32>,
    pub accel: Vector3<f32>,
}

/// Delta-integrated inertial sample of the alternate format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InertialDelta {
    /// Integrated velocity delta (m/s)
    pub delta_vel: Vector3<f32>,
    /// Integrated angle delta (rad)
    pub delta_ang: Vector3<f32>,
    /// Integration interval (s)
    pub delta_t: f32,
}

/// Barometer payload
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BaroSample {
    /// Altitude above the calibration reference (m)
    pub altitude: f32,
    /// Static pressure (Pa)
    pub pressure: f32,
    /// Sensor temperature (degC)
    pub temperature: f32,
}

/// Compass payload
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MagSample {
    /// Field strength, body frame (milligauss)
    pub field: Vector3<f32>,
    /// Applied offsets (milligauss)
    pub offsets: Vector3<f32>,
}

/// Airspeed payload
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AirspeedSample {
    /// True airspeed (m/s)
    pub airspeed: f32,
    /// Differential pressure (Pa)
    pub diff_pressure: f32,
}

/// Euler attitude carried in the log (degrees)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AttitudeSample {
    pub roll_deg: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
}

/// Onboard inertial-nav position carried in the log
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NavSample {
    /// Position north of origin (m)
    pub pos_north: f32,
    /// Position east of origin (m)
    pub pos_east: f32,
    /// Altitude above origin (m)
    pub rel_alt: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        let record = LogRecord {
            time_us: 123_456,
            data: RecordData::Gps(GpsFix {
                status: FixStatus::Fix3d,
                location: GeoLocation {
                    lat: -353_632_610,
                    lng: 1_491_652_300,
                    alt_cm: 58_400,
                },
                ground_speed: 12.5,
                ground_course: 90.0,
            }),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"GPS\""));

        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tag(), "GPS");
        assert_eq!(back.time_ms(), 123);
    }

    #[test]
    fn test_fix_status_ordering() {
        assert!(FixStatus::Fix3d >= FixStatus::Fix3d);
        assert!(FixStatus::Fix2d < FixStatus::Fix3d);
        assert!(FixStatus::NoFix < FixStatus::Fix2d);
        assert!(FixStatus::NoGps < FixStatus::NoFix);
    }

    #[test]
    fn test_location_conversions() {
        let loc = GeoLocation {
            lat: -353_632_610,
            lng: 1_491_652_300,
            alt_cm: 58_400,
        };
        assert!((loc.lat_deg() - (-35.3632610)).abs() < 1e-9);
        assert!((loc.lng_deg() - 149.1652300).abs() < 1e-9);
        assert!((loc.alt_m() - 584.0).abs() < 1e-9);
    }

    #[test]
    fn test_bootstrap_tags() {
        assert!(RecordData::Format {
            name: "GPS".to_string()
        }
        .is_bootstrap());
        assert!(RecordData::Parameter {
            name: "EKF_VELNE_NOISE".to_string(),
            value: 0.5,
        }
        .is_bootstrap());
        assert!(!RecordData::FrameSync.is_bootstrap());
    }
}
