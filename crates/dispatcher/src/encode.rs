//! Fixed-point encoding helpers shared by the detail tables.

/// Wrap a centi-degree angle into [0, 36000)
pub fn wrap_360_cd(mut angle_cd: f32) -> f32 {
    while angle_cd >= 36_000.0 {
        angle_cd -= 36_000.0;
    }
    while angle_cd < 0.0 {
        angle_cd += 36_000.0;
    }
    angle_cd
}

/// Wrap a centi-degree angle into [-18000, 18000]
pub fn wrap_180_cd(mut angle_cd: f32) -> f32 {
    while angle_cd > 18_000.0 {
        angle_cd -= 36_000.0;
    }
    while angle_cd < -18_000.0 {
        angle_cd += 36_000.0;
    }
    angle_cd
}

/// Clamp to the signed 16-bit range, then truncate
pub fn clamp_i16(value: f32) -> i16 {
    value.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
