//! Primitive construction (shape) parameters.
//!
//! The wire packs every path/profile parameter into a quantized integer
//! with a fixed quantum. Pack and unpack here are exact inverses of the
//! simulator's encoding; the asymmetric forms (end cut counts down from
//! 50000, path scale down from 200, revolutions offset by 1) follow the
//! wire layout.

use serde::{Deserialize, Serialize};

use crate::enums::{Material, PCode};

// ---------------------------------------------------------------------------
// Quanta
// ---------------------------------------------------------------------------

const CUT_QUANTA: f32 = 0.000_02;
const SCALE_QUANTA: f32 = 0.01;
const SHEAR_QUANTA: f32 = 0.01;
const TAPER_QUANTA: f32 = 0.01;
const REV_QUANTA: f32 = 0.015;
const HOLLOW_QUANTA: f32 = 0.000_02;

// ---------------------------------------------------------------------------
// Pack / unpack
// ---------------------------------------------------------------------------

pub fn unpack_begin_cut(begin_cut: u16) -> f32 {
    f32::from(begin_cut) * CUT_QUANTA
}

pub fn unpack_end_cut(end_cut: u16) -> f32 {
    (50_000 - i32::from(end_cut)) as f32 * CUT_QUANTA
}

pub fn unpack_path_scale(path_scale: u8) -> f32 {
    (200 - i32::from(path_scale)) as f32 * SCALE_QUANTA
}

pub fn unpack_path_shear(path_shear: i8) -> f32 {
    f32::from(path_shear) * SHEAR_QUANTA
}

/// Unpacks path twist, twist begin, radius offset, and skew.
pub fn unpack_path_twist(path_twist: i8) -> f32 {
    f32::from(path_twist) * SCALE_QUANTA
}

pub fn unpack_path_taper(path_taper: i8) -> f32 {
    f32::from(path_taper) * TAPER_QUANTA
}

pub fn unpack_path_revolutions(path_revolutions: u8) -> f32 {
    f32::from(path_revolutions) * REV_QUANTA + 1.0
}

pub fn unpack_profile_hollow(profile_hollow: u16) -> f32 {
    f32::from(profile_hollow) * HOLLOW_QUANTA
}

pub fn pack_begin_cut(begin_cut: f32) -> u16 {
    (begin_cut / CUT_QUANTA).round() as u16
}

pub fn pack_end_cut(end_cut: f32) -> u16 {
    (50_000 - (end_cut / CUT_QUANTA).round() as i32) as u16
}

pub fn pack_path_scale(path_scale: f32) -> u8 {
    (200 - (path_scale / SCALE_QUANTA).round() as i32) as u8
}

pub fn pack_path_shear(path_shear: f32) -> i8 {
    (path_shear / SHEAR_QUANTA).round() as i8
}

/// Packs path twist, twist begin, radius offset, and skew.
pub fn pack_path_twist(path_twist: f32) -> i8 {
    (path_twist / SCALE_QUANTA).round() as i8
}

pub fn pack_path_taper(path_taper: f32) -> i8 {
    (path_taper / TAPER_QUANTA).round() as i8
}

pub fn pack_path_revolutions(path_revolutions: f32) -> u8 {
    ((path_revolutions - 1.0) / REV_QUANTA).round() as u8
}

pub fn pack_profile_hollow(profile_hollow: f32) -> u16 {
    (profile_hollow / HOLLOW_QUANTA).round() as u16
}

// ---------------------------------------------------------------------------
// ConstructionData
// ---------------------------------------------------------------------------

/// Fully unpacked shape parameters for a primitive, plus the object
/// kind and state byte they arrived with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstructionData {
    /// Object state byte (attachment point bits for worn prims).
    pub state: u8,
    /// Object kind the block described.
    pub pcode: Option<PCode>,
    /// Surface material.
    pub material: Material,
    /// Raw path curve code.
    pub path_curve: u8,
    /// Raw profile curve code.
    pub profile_curve: u8,
    pub path_begin: f32,
    pub path_end: f32,
    pub path_scale_x: f32,
    pub path_scale_y: f32,
    pub path_shear_x: f32,
    pub path_shear_y: f32,
    pub path_twist: f32,
    pub path_twist_begin: f32,
    pub path_radius_offset: f32,
    pub path_taper_x: f32,
    pub path_taper_y: f32,
    pub path_revolutions: f32,
    pub path_skew: f32,
    pub profile_begin: f32,
    pub profile_end: f32,
    pub profile_hollow: f32,
}

/// Path curve code for a straight extrusion.
pub const PATH_CURVE_LINE: u8 = 0x10;
/// Profile curve code for a square cross-section.
pub const PROFILE_CURVE_SQUARE: u8 = 0x01;

impl ConstructionData {
    /// Shape parameters for a plain wooden cube, the conventional
    /// starting prim for build requests.
    pub fn cube() -> Self {
        Self {
            pcode: Some(PCode::Prim),
            material: Material::Wood,
            path_curve: PATH_CURVE_LINE,
            profile_curve: PROFILE_CURVE_SQUARE,
            path_end: 1.0,
            profile_end: 1.0,
            path_scale_x: 1.0,
            path_scale_y: 1.0,
            path_revolutions: 1.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_round_trip() {
        for value in [0.0_f32, 0.25, 0.5, 0.98] {
            let packed = pack_begin_cut(value);
            assert!((unpack_begin_cut(packed) - value).abs() <= CUT_QUANTA);

            let packed = pack_end_cut(value);
            assert!((unpack_end_cut(packed) - value).abs() <= CUT_QUANTA);
        }
    }

    #[test]
    fn test_path_scale_round_trip() {
        for value in [0.0_f32, 0.5, 1.0, 1.5] {
            let packed = pack_path_scale(value);
            assert!((unpack_path_scale(packed) - value).abs() <= SCALE_QUANTA);
        }
    }

    #[test]
    fn test_signed_twist_round_trip() {
        for value in [-1.0_f32, -0.35, 0.0, 0.35, 1.0] {
            let packed = pack_path_twist(value);
            assert!((unpack_path_twist(packed) - value).abs() <= SCALE_QUANTA);
        }
    }

    #[test]
    fn test_revolutions_offset() {
        // Revolutions start at 1.0, not 0.
        assert_eq!(unpack_path_revolutions(0), 1.0);
        let packed = pack_path_revolutions(2.5);
        assert!((unpack_path_revolutions(packed) - 2.5).abs() <= REV_QUANTA);
    }

    #[test]
    fn test_cube_shape() {
        let cube = ConstructionData::cube();
        assert_eq!(cube.pcode, Some(PCode::Prim));
        assert_eq!(cube.material, Material::Wood);
        assert_eq!(cube.path_end, 1.0);
        assert_eq!(cube.profile_end, 1.0);
        assert_eq!(cube.path_revolutions, 1.0);
    }
}
