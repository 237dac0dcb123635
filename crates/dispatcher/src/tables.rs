//! The six analysis table files.
//!
//! Row layouts are a bit-exact downstream contract: headers, column
//! order, precisions and integer scalings must not change. EKF4.dat
//! carries 13 header names over 12 row columns; the mismatch is part of
//! the contract and kept as is.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use contracts::{ContractError, DerivedFrame, FrameSink};
use tracing::debug;

use crate::encode::{clamp_i16, wrap_360_cd, wrap_180_cd};

/// One open table file with buffered row output
struct TableFile {
    name: &'static str,
    writer: BufWriter<File>,
}

impl TableFile {
    fn create(dir: &Path, name: &'static str, header: &str) -> Result<Self, ContractError> {
        let path = dir.join(name);
        let file = File::create(&path)
            .map_err(|e| ContractError::sink_write(name, e.to_string()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{header}").map_err(|e| ContractError::sink_write(name, e.to_string()))?;

        debug!(table = name, path = %path.display(), "table created");
        Ok(Self { name, writer })
    }

    fn sink_err(&self, e: std::io::Error) -> ContractError {
        ContractError::sink_write(self.name, e.to_string())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush().map_err(|e| ContractError::sink_write(self.name, e.to_string()))
    }
}

/// Primary comparison table: onboard/simulator attitudes next to every
/// offline attitude and position solution
pub struct PlotTable {
    file: TableFile,
}

impl PlotTable {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "plot.dat",
                "time SIM.Roll SIM.Pitch SIM.Yaw BAR.Alt FLIGHT.Roll FLIGHT.Pitch FLIGHT.Yaw \
                 FLIGHT.dN FLIGHT.dE FLIGHT.Alt AHR2.Roll AHR2.Pitch AHR2.Yaw DCM.Roll DCM.Pitch \
                 DCM.Yaw EKF.Roll EKF.Pitch EKF.Yaw INAV.dN INAV.dE INAV.Alt EKF.dN EKF.dE EKF.Alt",
            )?,
        })
    }
}

impl FrameSink for PlotTable {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let r = &f.reference;
        let s = &f.state;
        writeln!(
            self.file.writer,
            "{:.3} {:.1} {:.1} {:.1} {:.2} {:.1} {:.1} {:.1} {:.2} {:.2} {:.2} {:.1} {:.1} {:.1} \
             {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            f.time_s(),
            r.sim_attitude.roll_deg,
            r.sim_attitude.pitch_deg,
            r.sim_attitude.yaw_deg,
            s.baro_alt,
            r.attitude.roll_deg,
            r.attitude.pitch_deg,
            wrap_180_cd(r.attitude.yaw_deg * 100.0) * 0.01,
            r.nav.pos_north,
            r.nav.pos_east,
            r.nav.rel_alt,
            r.ahrs2_attitude.roll_deg,
            r.ahrs2_attitude.pitch_deg,
            wrap_180_cd(r.ahrs2_attitude.yaw_deg * 100.0) * 0.01,
            s.dcm_euler.x.to_degrees(),
            s.dcm_euler.y.to_degrees(),
            s.dcm_euler.z.to_degrees(),
            s.euler.x.to_degrees(),
            s.euler.y.to_degrees(),
            s.euler.z.to_degrees(),
            s.inav_pos.x,
            s.inav_pos.y,
            s.inav_pos.z,
            s.rel_pos.x,
            s.rel_pos.y,
            -s.rel_pos.z,
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}

/// Secondary comparison table: full filter state in engineering units
pub struct Plot2Table {
    file: TableFile,
}

impl Plot2Table {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "plot2.dat",
                "time E1 E2 E3 VN VE VD PN PE PD GX GY GZ WN WE MN ME MD MX MY MZ E1ref E2ref E3ref",
            )?,
        })
    }
}

impl FrameSink for Plot2Table {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let s = &f.state;
        // yaw as [0, 360) heading
        let mut heading = s.euler.z.to_degrees();
        if heading < 0.0 {
            heading += 360.0;
        }
        writeln!(
            self.file.writer,
            "{:.3} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} \
             {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}",
            f.time_s(),
            s.euler.x.to_degrees(),
            s.euler.y.to_degrees(),
            heading,
            s.vel_ned.x,
            s.vel_ned.y,
            s.vel_ned.z,
            s.pos_ned.x,
            s.pos_ned.y,
            s.pos_ned.z,
            60.0 * s.gyro_bias.x.to_degrees(),
            60.0 * s.gyro_bias.y.to_degrees(),
            60.0 * s.gyro_bias.z.to_degrees(),
            s.wind.x,
            s.wind.y,
            s.mag_ned.x,
            s.mag_ned.y,
            s.mag_ned.z,
            s.mag_xyz.x,
            s.mag_xyz.y,
            s.mag_xyz.z,
            f.reference.attitude.roll_deg,
            f.reference.attitude.pitch_deg,
            f.reference.attitude.yaw_deg,
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}

/// Detail table 1: attitude (centi-degrees), velocity, position, gyro
/// bias (centi-deg/min)
pub struct Ekf1Table {
    file: TableFile,
}

impl Ekf1Table {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "EKF1.dat",
                "timestamp TimeMS Roll Pitch Yaw VN VE VD PN PE PD GX GY GZ",
            )?,
        })
    }
}

impl FrameSink for Ekf1Table {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let s = &f.state;
        let roll = (100.0 * s.euler.x.to_degrees()) as i16;
        let pitch = (100.0 * s.euler.y.to_degrees()) as i16;
        let yaw = wrap_360_cd(100.0 * s.euler.z.to_degrees()) as u16;
        writeln!(
            self.file.writer,
            "{:.3} {} {} {} {} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.0} {:.0} {:.0}",
            f.time_s(),
            f.time_ms,
            roll,
            pitch,
            yaw,
            s.vel_ned.x,
            s.vel_ned.y,
            s.vel_ned.z,
            s.pos_ned.x,
            s.pos_ned.y,
            s.pos_ned.z,
            6000.0 * s.gyro_bias.x.to_degrees(),
            6000.0 * s.gyro_bias.y.to_degrees(),
            6000.0 * s.gyro_bias.z.to_degrees(),
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}

/// Detail table 2: accel weighting/biases, wind and magnetic field,
/// fixed-point
pub struct Ekf2Table {
    file: TableFile,
}

impl Ekf2Table {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "EKF2.dat",
                "timestamp TimeMS AX AY AZ VWN VWE MN ME MD MX MY MZ",
            )?,
        })
    }
}

impl FrameSink for Ekf2Table {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let s = &f.state;
        let acc_weight = (100.0 * s.accel_weighting) as i8;
        let acc1 = (100.0 * s.accel_z_bias1) as i8;
        let acc2 = (100.0 * s.accel_z_bias2) as i8;
        writeln!(
            self.file.writer,
            "{:.3} {} {} {} {} {} {} {} {} {} {} {} {}",
            f.time_s(),
            f.time_ms,
            acc_weight,
            acc1,
            acc2,
            (100.0 * s.wind.x) as i16,
            (100.0 * s.wind.y) as i16,
            s.mag_ned.x as i16,
            s.mag_ned.y as i16,
            s.mag_ned.z as i16,
            s.mag_xyz.x as i16,
            s.mag_xyz.y as i16,
            s.mag_xyz.z as i16,
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}

/// Detail table 3: innovations, fixed-point
pub struct Ekf3Table {
    file: TableFile,
}

impl Ekf3Table {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "EKF3.dat",
                "timestamp TimeMS IVN IVE IVD IPN IPE IPD IMX IMY IMZ IVT",
            )?,
        })
    }
}

impl FrameSink for Ekf3Table {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let s = &f.state;
        writeln!(
            self.file.writer,
            "{:.3} {} {} {} {} {} {} {} {} {} {} {}",
            f.time_s(),
            f.time_ms,
            (100.0 * s.vel_innov.x) as i16,
            (100.0 * s.vel_innov.y) as i16,
            (100.0 * s.vel_innov.z) as i16,
            (100.0 * s.pos_innov.x) as i16,
            (100.0 * s.pos_innov.y) as i16,
            (100.0 * s.pos_innov.z) as i16,
            s.mag_innov.x as i16,
            s.mag_innov.y as i16,
            s.mag_innov.z as i16,
            (100.0 * s.tas_innov) as i16,
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}

/// Detail table 4: variances, fix-glitch offsets and fault status.
/// Header has one more name than the rows have columns; downstream
/// tooling compensates, so both sides stay frozen.
pub struct Ekf4Table {
    file: TableFile,
}

impl Ekf4Table {
    pub fn create(dir: &Path) -> Result<Self, ContractError> {
        Ok(Self {
            file: TableFile::create(
                dir,
                "EKF4.dat",
                "timestamp TimeMS SV SP SH SMX SMY SMZ SVT OFN EFE FS DS",
            )?,
        })
    }
}

impl FrameSink for Ekf4Table {
    fn name(&self) -> &str {
        self.file.name
    }

    fn write(&mut self, f: &DerivedFrame) -> Result<(), ContractError> {
        let s = &f.state;
        // offsets pass through an 8-bit truncation, as recorded tooling
        // always has
        let offset_north = clamp_i16(s.pos_offset.x) as i8;
        let offset_east = clamp_i16(s.pos_offset.y) as i8;
        writeln!(
            self.file.writer,
            "{:.3} {} {} {} {} {} {} {} {} {} {} {}",
            f.time_s(),
            f.time_ms,
            clamp_i16(100.0 * s.vel_var),
            clamp_i16(100.0 * s.pos_var),
            clamp_i16(100.0 * s.hgt_var),
            clamp_i16(100.0 * s.mag_var.x),
            clamp_i16(100.0 * s.mag_var.y),
            clamp_i16(100.0 * s.mag_var.z),
            clamp_i16(100.0 * s.tas_var),
            offset_north,
            offset_east,
            s.fault_status,
        )
        .map_err(|e| self.file.sink_err(e))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.file.flush()
    }
}
