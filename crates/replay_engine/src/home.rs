//! One-shot home/reference point initialization.
//!
//! Replay holds off normal dispatch until a qualifying 3D fix and a
//! calibrated pressure reference both exist, then commits the fix
//! location as the coordinate-system origin exactly once.

use contracts::{Estimator, FixStatus};
use tracing::info;

#[derive(Debug, Default)]
pub struct HomeInitializer {
    established: bool,
}

impl HomeInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn established(&self) -> bool {
        self.established
    }

    /// Check the commit conditions after a record's side updates ran.
    /// Returns true on the single not-established -> established
    /// transition.
    pub fn observe(
        &mut self,
        tag: &str,
        baro_calibrated: bool,
        estimator: &mut dyn Estimator,
    ) -> bool {
        if self.established || tag != "GPS" {
            return false;
        }
        if estimator.gps_status() < FixStatus::Fix3d || !baro_calibrated {
            return false;
        }

        let location = estimator.gps_location();
        estimator.set_home(location);
        estimator.set_declination_origin(location.lat, location.lng);
        self.established = true;

        info!(
            lat = format!("{:.7}", location.lat_deg()),
            lng = format!("{:.7}", location.lng_deg()),
            alt_m = format!("{:.2}", location.alt_m()),
            time_s = format!("{:.1}", estimator.millis() as f64 * 0.001),
            "home established from GPS lock"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GeoLocation, GpsFix};
    use estimation::OfflineEstimator;

    fn fix_3d() -> GpsFix {
        GpsFix {
            status: FixStatus::Fix3d,
            location: GeoLocation {
                lat: -353_632_610,
                lng: 1_491_652_300,
                alt_cm: 58_400,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_baro_calibration() {
        let mut estimator = OfflineEstimator::new();
        let mut home = HomeInitializer::new();

        estimator.ingest_gps(&fix_3d());
        assert!(!home.observe("GPS", false, &mut estimator));
        assert!(home.observe("GPS", true, &mut estimator));
        assert!(home.established());
    }

    #[test]
    fn test_requires_3d_fix() {
        let mut estimator = OfflineEstimator::new();
        let mut home = HomeInitializer::new();

        let mut fix = fix_3d();
        fix.status = FixStatus::Fix2d;
        estimator.ingest_gps(&fix);
        assert!(!home.observe("GPS", true, &mut estimator));
    }

    #[test]
    fn test_exactly_once() {
        let mut estimator = OfflineEstimator::new();
        let mut home = HomeInitializer::new();

        estimator.ingest_gps(&fix_3d());
        let mut transitions = 0;
        for _ in 0..5 {
            if home.observe("GPS", true, &mut estimator) {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(estimator.home(), Some(fix_3d().location));
    }

    #[test]
    fn test_non_gps_records_ignored() {
        let mut estimator = OfflineEstimator::new();
        let mut home = HomeInitializer::new();
        estimator.ingest_gps(&fix_3d());
        assert!(!home.observe("BARO", true, &mut estimator));
        assert!(!home.observe("IMU", true, &mut estimator));
    }
}
