//! Packed kinematics decoding for full object updates.
//!
//! The `ObjectData` field of a full update packs position, velocity,
//! acceleration, rotation, and angular velocity in one of three
//! precisions, selected by total field length:
//!
//! | length | encoding |
//! |--------|----------|
//! | 16     | 8-bit quantized channels |
//! | 32     | 16-bit quantized channels |
//! | 48     | 16-byte collision plane + 32-byte form |
//! | 60     | full 32-bit floats |
//! | 76     | 16-byte collision plane + 60-byte form |
//!
//! Any other length is a per-object decode failure.

use glam::{Quat, Vec3, Vec4};
use halcyon_types::texture::TextureEntry;
use serde::{Deserialize, Serialize};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::quant::{self, full};

// ---------------------------------------------------------------------------
// PackedKinematics
// ---------------------------------------------------------------------------

/// Kinematic state decoded from a packed movement field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedKinematics {
    /// Collision plane, present only in the 48- and 76-byte forms
    /// (avatars).
    pub collision_plane: Option<Vec4>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Quat,
    pub angular_velocity: Vec3,
}

// ---------------------------------------------------------------------------
// MovementUpdate
// ---------------------------------------------------------------------------

/// A decoded movement delta for one object, as carried by terse updates
/// and surfaced to raw-update consumers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MovementUpdate {
    /// Region-local id of the object.
    pub local_id: u32,
    /// Object state byte.
    pub state: u8,
    /// Whether the block describes an avatar.
    pub avatar: bool,
    /// Collision plane (avatars only).
    pub collision_plane: Option<Vec4>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Quat,
    pub angular_velocity: Vec3,
    /// Texture entry, when the block carried one.
    pub textures: Option<TextureEntry>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a packed movement field, dispatching on its length.
pub fn decode_movement(data: &[u8]) -> Result<PackedKinematics, DecodeError> {
    let mut cursor = ByteCursor::new(data);
    match data.len() {
        76 => {
            let plane = cursor.read_vec4()?;
            let mut kin = decode_float_form(&mut cursor)?;
            kin.collision_plane = Some(plane);
            Ok(kin)
        }
        60 => decode_float_form(&mut cursor),
        48 => {
            let plane = cursor.read_vec4()?;
            let mut kin = decode_u16_form(&mut cursor)?;
            kin.collision_plane = Some(plane);
            Ok(kin)
        }
        32 => decode_u16_form(&mut cursor),
        16 => decode_u8_form(&mut cursor),
        other => Err(DecodeError::UnknownMovementLength(other)),
    }
}

/// 60-byte form: unquantized floats, rotation stored as three
/// components with W reconstructed.
fn decode_float_form(cursor: &mut ByteCursor<'_>) -> Result<PackedKinematics, DecodeError> {
    Ok(PackedKinematics {
        collision_plane: None,
        position: cursor.read_vec3()?,
        velocity: cursor.read_vec3()?,
        acceleration: cursor.read_vec3()?,
        rotation: cursor.read_quat_normalized()?,
        angular_velocity: cursor.read_vec3()?,
    })
}

/// 32-byte form: 16-bit quantized channels. Position X/Y span one
/// region width beyond each edge; Z spans the full height range.
fn decode_u16_form(cursor: &mut ByteCursor<'_>) -> Result<PackedKinematics, DecodeError> {
    let position = Vec3::new(
        quant::u16_to_float(cursor.read_u16_le()?, full::POSITION_XY),
        quant::u16_to_float(cursor.read_u16_le()?, full::POSITION_XY),
        quant::u16_to_float(cursor.read_u16_le()?, full::POSITION_Z),
    );
    let velocity = read_vec3_u16(cursor, full::KINEMATIC)?;
    let acceleration = read_vec3_u16(cursor, full::KINEMATIC)?;
    let rotation = quant::quat_from_u16(
        [
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
        ],
        full::ROTATION,
    );
    let angular_velocity = read_vec3_u16(cursor, full::KINEMATIC)?;

    Ok(PackedKinematics {
        collision_plane: None,
        position,
        velocity,
        acceleration,
        rotation,
        angular_velocity,
    })
}

/// 16-byte form: 8-bit quantized channels.
fn decode_u8_form(cursor: &mut ByteCursor<'_>) -> Result<PackedKinematics, DecodeError> {
    let position = read_vec3_u8(cursor, full::BYTE_KINEMATIC)?;
    let velocity = read_vec3_u8(cursor, full::BYTE_KINEMATIC)?;
    let acceleration = read_vec3_u8(cursor, full::BYTE_KINEMATIC)?;
    let rotation = quant::quat_from_u8(
        [
            cursor.read_u8()?,
            cursor.read_u8()?,
            cursor.read_u8()?,
            cursor.read_u8()?,
        ],
        full::ROTATION,
    );
    let angular_velocity = read_vec3_u8(cursor, full::BYTE_KINEMATIC)?;

    Ok(PackedKinematics {
        collision_plane: None,
        position,
        velocity,
        acceleration,
        rotation,
        angular_velocity,
    })
}

fn read_vec3_u16(
    cursor: &mut ByteCursor<'_>,
    range: (f32, f32),
) -> Result<Vec3, DecodeError> {
    Ok(quant::vec3_from_u16(
        [
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
        ],
        range,
    ))
}

fn read_vec3_u8(cursor: &mut ByteCursor<'_>, range: (f32, f32)) -> Result<Vec3, DecodeError> {
    Ok(quant::vec3_from_u8(
        [cursor.read_u8()?, cursor.read_u8()?, cursor.read_u8()?],
        range,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::{float_to_u16, float_to_u8};

    fn push_f32(buf: &mut Vec<u8>, value: f32) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    fn push_u16(buf: &mut Vec<u8>, value: u16) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn test_60_byte_form_is_exact() {
        let mut data = Vec::new();
        for v in [128.0f32, 128.0, 25.0] {
            push_f32(&mut data, v); // position
        }
        for _ in 0..6 {
            push_f32(&mut data, 0.0); // velocity + acceleration
        }
        for _ in 0..3 {
            push_f32(&mut data, 0.0); // rotation xyz -> identity
        }
        for _ in 0..3 {
            push_f32(&mut data, 0.0); // angular velocity
        }
        assert_eq!(data.len(), 60);

        let kin = decode_movement(&data).unwrap();
        assert_eq!(kin.position, Vec3::new(128.0, 128.0, 25.0));
        assert_eq!(kin.velocity, Vec3::ZERO);
        assert_eq!(kin.acceleration, Vec3::ZERO);
        assert_eq!(kin.rotation, Quat::IDENTITY);
        assert_eq!(kin.angular_velocity, Vec3::ZERO);
        assert!(kin.collision_plane.is_none());
    }

    #[test]
    fn test_76_byte_form_carries_collision_plane() {
        let mut data = Vec::new();
        for v in [0.0f32, 0.0, 1.0, 20.0] {
            push_f32(&mut data, v); // collision plane
        }
        for _ in 0..15 {
            push_f32(&mut data, 0.0);
        }
        assert_eq!(data.len(), 76);

        let kin = decode_movement(&data).unwrap();
        assert_eq!(kin.collision_plane, Some(Vec4::new(0.0, 0.0, 1.0, 20.0)));
    }

    #[test]
    fn test_32_byte_form_quantization() {
        let mut data = Vec::new();
        push_u16(&mut data, float_to_u16(100.0, full::POSITION_XY));
        push_u16(&mut data, float_to_u16(200.0, full::POSITION_XY));
        push_u16(&mut data, float_to_u16(50.0, full::POSITION_Z));
        for _ in 0..6 {
            push_u16(&mut data, float_to_u16(0.0, full::KINEMATIC));
        }
        for component in [0.0f32, 0.0, 0.0, 1.0] {
            push_u16(&mut data, float_to_u16(component, full::ROTATION));
        }
        for _ in 0..3 {
            push_u16(&mut data, float_to_u16(0.0, full::KINEMATIC));
        }
        assert_eq!(data.len(), 32);

        let kin = decode_movement(&data).unwrap();
        let xy_step = 512.0 / 65535.0;
        assert!((kin.position.x - 100.0).abs() <= xy_step);
        assert!((kin.position.y - 200.0).abs() <= xy_step);
        assert!((kin.position.z - 50.0).abs() <= 1024.0 / 65535.0);
        assert_eq!(kin.velocity, Vec3::ZERO);
        assert!((kin.rotation.w - 1.0).abs() <= 2.0 / 65535.0 * 2.0);
    }

    #[test]
    fn test_16_byte_form_quantization() {
        let mut data = Vec::new();
        for v in [10.0f32, -10.0, 30.0] {
            data.push(float_to_u8(v, full::BYTE_KINEMATIC));
        }
        for _ in 0..6 {
            data.push(float_to_u8(0.0, full::BYTE_KINEMATIC));
        }
        for component in [0.0f32, 0.0, 0.0, 1.0] {
            data.push(float_to_u8(component, full::ROTATION));
        }
        for _ in 0..3 {
            data.push(float_to_u8(0.0, full::BYTE_KINEMATIC));
        }
        assert_eq!(data.len(), 16);

        let kin = decode_movement(&data).unwrap();
        let step = 512.0 / 255.0;
        assert!((kin.position.x - 10.0).abs() <= step);
        assert!((kin.position.y + 10.0).abs() <= step);
        assert!((kin.position.z - 30.0).abs() <= step);
        assert_eq!(kin.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_unknown_length_is_rejected() {
        let data = vec![0u8; 40];
        assert!(matches!(
            decode_movement(&data),
            Err(DecodeError::UnknownMovementLength(40))
        ));
    }
}
