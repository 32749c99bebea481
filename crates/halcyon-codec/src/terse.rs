//! Terse (delta) update decoding.
//!
//! Terse blocks carry only kinematic state, in a single dense encoding:
//! big-endian local id, state byte, avatar flag byte, an optional
//! 16-byte collision plane (avatars), a 12-byte float position, then
//! 16-bit quantized velocity, acceleration, rotation, and angular
//! velocity. The terse quantization ranges are narrower than the
//! full-update ones and must stay separate.

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::movement::MovementUpdate;
use crate::quant::{self, terse};
use crate::texture::decode_texture_entry;

/// Decodes one terse block. `texture_bytes` is the block's texture
/// entry field; its leading 4-byte length word is skipped, matching the
/// wire layout.
pub fn decode_terse_block(
    data: &[u8],
    texture_bytes: &[u8],
) -> Result<MovementUpdate, DecodeError> {
    let mut cursor = ByteCursor::new(data);

    let local_id = cursor.read_u32_be()?;
    let state = cursor.read_u8()?;
    let avatar = cursor.read_u8()? != 0;
    let collision_plane = if avatar {
        Some(cursor.read_vec4()?)
    } else {
        None
    };

    let position = cursor.read_vec3()?;
    let velocity = read_vec3_quantized(&mut cursor, terse::VELOCITY)?;
    let acceleration = read_vec3_quantized(&mut cursor, terse::ACCELERATION)?;
    let rotation = quant::quat_from_u16(
        [
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
        ],
        terse::ROTATION,
    );
    let angular_velocity = read_vec3_quantized(&mut cursor, terse::ANGULAR_VELOCITY)?;

    let textures = if texture_bytes.is_empty() {
        None
    } else {
        // The field leads with a 4-byte length word; the entry follows.
        let mut tex_cursor = ByteCursor::new(texture_bytes);
        tex_cursor.take(4)?;
        let rest = tex_cursor.remaining();
        Some(decode_texture_entry(tex_cursor.take(rest)?)?)
    };

    Ok(MovementUpdate {
        local_id,
        state,
        avatar,
        collision_plane,
        position,
        velocity,
        acceleration,
        rotation,
        angular_velocity,
        textures,
    })
}

fn read_vec3_quantized(
    cursor: &mut ByteCursor<'_>,
    range: (f32, f32),
) -> Result<glam::Vec3, DecodeError> {
    Ok(quant::vec3_from_u16(
        [
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
            cursor.read_u16_le()?,
        ],
        range,
    ))
}
