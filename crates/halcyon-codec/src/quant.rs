//! Quantized scalar codecs.
//!
//! Kinematic fields are packed as 8- or 16-bit integers linearly mapped
//! onto a fixed range. Values within one quantization step of zero snap
//! to exactly zero so that stationary objects decode as stationary.
//!
//! The full-update and terse encodings use different range tables.
//! They look unifiable but are distinct on the wire; keep both.

use glam::{Quat, Vec3};

// ---------------------------------------------------------------------------
// Range tables
// ---------------------------------------------------------------------------

/// Ranges for the full-update encodings.
pub mod full {
    /// 8-bit encoding: position, velocity, acceleration, and angular
    /// velocity all share one range.
    pub const BYTE_KINEMATIC: (f32, f32) = (-256.0, 256.0);
    /// 16-bit encoding: position X and Y.
    pub const POSITION_XY: (f32, f32) = (-0.5 * 256.0, 1.5 * 256.0);
    /// 16-bit encoding: position Z.
    pub const POSITION_Z: (f32, f32) = (-256.0, 3.0 * 256.0);
    /// 16-bit encoding: velocity, acceleration, angular velocity.
    pub const KINEMATIC: (f32, f32) = (-256.0, 256.0);
    /// Rotation components, both widths.
    pub const ROTATION: (f32, f32) = (-1.0, 1.0);
}

/// Ranges for the terse encoding (16-bit only).
pub mod terse {
    /// Velocity components.
    pub const VELOCITY: (f32, f32) = (-128.0, 128.0);
    /// Acceleration components.
    pub const ACCELERATION: (f32, f32) = (-64.0, 64.0);
    /// Rotation components.
    pub const ROTATION: (f32, f32) = (-1.0, 1.0);
    /// Angular velocity components.
    pub const ANGULAR_VELOCITY: (f32, f32) = (-64.0, 64.0);
}

// ---------------------------------------------------------------------------
// Scalar codecs
// ---------------------------------------------------------------------------

/// Expands an 8-bit quantized value onto `[lower, upper]`.
pub fn u8_to_float(value: u8, (lower, upper): (f32, f32)) -> f32 {
    const ONE_OVER_BYTE_MAX: f32 = 1.0 / 255.0;
    let delta = upper - lower;
    let expanded = f32::from(value) * ONE_OVER_BYTE_MAX * delta + lower;

    // Snap values within one step of zero.
    if expanded.abs() < delta * ONE_OVER_BYTE_MAX {
        0.0
    } else {
        expanded
    }
}

/// Expands a 16-bit quantized value onto `[lower, upper]`.
pub fn u16_to_float(value: u16, (lower, upper): (f32, f32)) -> f32 {
    const ONE_OVER_U16_MAX: f32 = 1.0 / 65535.0;
    let delta = upper - lower;
    let expanded = f32::from(value) * ONE_OVER_U16_MAX * delta + lower;

    if expanded.abs() < delta * ONE_OVER_U16_MAX {
        0.0
    } else {
        expanded
    }
}

/// Quantizes a float onto 8 bits over `[lower, upper]`. Inverse of
/// [`u8_to_float`] to within one quantization step.
pub fn float_to_u8(value: f32, (lower, upper): (f32, f32)) -> u8 {
    let clamped = value.clamp(lower, upper);
    let normalized = (clamped - lower) / (upper - lower);
    (normalized * 255.0).floor() as u8
}

/// Quantizes a float onto 16 bits over `[lower, upper]`. Inverse of
/// [`u16_to_float`] to within one quantization step.
pub fn float_to_u16(value: f32, (lower, upper): (f32, f32)) -> u16 {
    let clamped = value.clamp(lower, upper);
    let normalized = (clamped - lower) / (upper - lower);
    (normalized * 65535.0).floor() as u16
}

// ---------------------------------------------------------------------------
// Vector helpers
// ---------------------------------------------------------------------------

/// Expands three 16-bit values sharing one range into a vector.
pub fn vec3_from_u16(values: [u16; 3], range: (f32, f32)) -> Vec3 {
    Vec3::new(
        u16_to_float(values[0], range),
        u16_to_float(values[1], range),
        u16_to_float(values[2], range),
    )
}

/// Expands three 8-bit values sharing one range into a vector.
pub fn vec3_from_u8(values: [u8; 3], range: (f32, f32)) -> Vec3 {
    Vec3::new(
        u8_to_float(values[0], range),
        u8_to_float(values[1], range),
        u8_to_float(values[2], range),
    )
}

/// Expands four 16-bit rotation components into a quaternion.
pub fn quat_from_u16(values: [u16; 4], range: (f32, f32)) -> Quat {
    Quat::from_xyzw(
        u16_to_float(values[0], range),
        u16_to_float(values[1], range),
        u16_to_float(values[2], range),
        u16_to_float(values[3], range),
    )
}

/// Expands four 8-bit rotation components into a quaternion.
pub fn quat_from_u8(values: [u8; 4], range: (f32, f32)) -> Quat {
    Quat::from_xyzw(
        u8_to_float(values[0], range),
        u8_to_float(values[1], range),
        u8_to_float(values[2], range),
        u8_to_float(values[3], range),
    )
}
