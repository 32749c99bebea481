//! Texture entry and texture animation decoding.
//!
//! A texture entry encodes each property (texture id, color, repeats,
//! offsets, rotation, material, media, glow) as a default value
//! followed by face-bitfield runs: a 7-bit continuation bitfield names
//! a set of faces, then one value shared by all of them. A zero
//! bitfield byte terminates each property's run list.
//!
//! Face overrides are created lazily from the default face as it stands
//! when the override first appears; later defaults do not back-fill
//! already-created overrides. This matches the wire producer.

use halcyon_types::Color4;
use halcyon_types::id::ObjectId;
use halcyon_types::texture::{TextureAnimation, TextureEntry, TextureFace};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// Decodes a texture entry field. An empty field decodes to the default
/// entry.
pub fn decode_texture_entry(data: &[u8]) -> Result<TextureEntry, DecodeError> {
    let mut entry = TextureEntry::default();
    if data.is_empty() {
        return Ok(entry);
    }
    let mut cursor = ByteCursor::new(data);

    decode_property(
        &mut cursor,
        &mut entry,
        read_texture_id,
        |face, id| face.texture_id = id,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_rgba,
        |face, rgba| face.rgba = rgba,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_f32,
        |face, v| face.repeat_u = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_f32,
        |face, v| face.repeat_v = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_offset,
        |face, v| face.offset_u = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_offset,
        |face, v| face.offset_v = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_rotation,
        |face, v| face.rotation = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_byte,
        |face, v| face.material = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_byte,
        |face, v| face.media = v,
    )?;
    decode_property(
        &mut cursor,
        &mut entry,
        read_glow,
        |face, v| face.glow = v,
    )?;

    Ok(entry)
}

/// Decodes a texture animation field. Fields shorter than the 16-byte
/// block decode as the default (no animation).
pub fn decode_texture_animation(data: &[u8]) -> TextureAnimation {
    let mut cursor = ByteCursor::new(data);
    let mut read = || -> Result<TextureAnimation, DecodeError> {
        Ok(TextureAnimation {
            flags: cursor.read_u8()?,
            face: cursor.read_u8()?,
            size_x: cursor.read_u8()?,
            size_y: cursor.read_u8()?,
            start: cursor.read_f32_le()?,
            length: cursor.read_f32_le()?,
            rate: cursor.read_f32_le()?,
        })
    };
    read().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Property runs
// ---------------------------------------------------------------------------

/// Decodes one property: default value, then face-bitfield runs fanning
/// a shared value out to every named face.
fn decode_property<T: Copy>(
    cursor: &mut ByteCursor<'_>,
    entry: &mut TextureEntry,
    read: impl Fn(&mut ByteCursor<'_>) -> Result<T, DecodeError>,
    set: impl Fn(&mut TextureFace, T),
) -> Result<(), DecodeError> {
    let default_value = read(cursor)?;
    set(&mut entry.default_face, default_value);

    while let Some((face_bits, bitfield_size)) = read_face_bitfield(cursor)? {
        let value = read(cursor)?;
        // Bits past the addressable face range are ignored.
        for face in 0..bitfield_size.min(32) {
            if face_bits & (1 << face) != 0
                && let Some(slot) = entry.face_mut(face as usize)
            {
                set(slot, value);
            }
        }
    }
    Ok(())
}

/// Reads the 7-bit continuation face bitfield. Returns `None` at end of
/// data or on the terminating zero bitfield.
fn read_face_bitfield(cursor: &mut ByteCursor<'_>) -> Result<Option<(u32, u32)>, DecodeError> {
    if cursor.remaining() == 0 {
        return Ok(None);
    }

    let mut face_bits: u32 = 0;
    let mut bitfield_size: u32 = 0;
    loop {
        let b = cursor.read_u8()?;
        // Wrapping matches the wire producer's 32-bit accumulator.
        face_bits = face_bits.wrapping_shl(7) | u32::from(b & 0x7F);
        bitfield_size += 7;
        if b & 0x80 == 0 {
            break;
        }
    }

    if face_bits == 0 {
        Ok(None)
    } else {
        Ok(Some((face_bits, bitfield_size)))
    }
}

// ---------------------------------------------------------------------------
// Field codecs
// ---------------------------------------------------------------------------

fn read_texture_id(cursor: &mut ByteCursor<'_>) -> Result<ObjectId, DecodeError> {
    cursor.read_object_id()
}

fn read_f32(cursor: &mut ByteCursor<'_>) -> Result<f32, DecodeError> {
    cursor.read_f32_le()
}

fn read_byte(cursor: &mut ByteCursor<'_>) -> Result<u8, DecodeError> {
    cursor.read_u8()
}

fn read_rgba(cursor: &mut ByteCursor<'_>) -> Result<Color4, DecodeError> {
    let bytes = cursor.take(4)?;
    Ok(Color4::from_bytes(
        [bytes[0], bytes[1], bytes[2], bytes[3]],
        true,
        false,
    ))
}

fn read_offset(cursor: &mut ByteCursor<'_>) -> Result<f32, DecodeError> {
    let raw = cursor.read_u16_le()? as i16;
    Ok(f32::from(raw) / 32767.0)
}

fn read_rotation(cursor: &mut ByteCursor<'_>) -> Result<f32, DecodeError> {
    let raw = cursor.read_u16_le()?;
    Ok(f32::from(raw) / 32767.0 * std::f32::consts::TAU)
}

fn read_glow(cursor: &mut ByteCursor<'_>) -> Result<f32, DecodeError> {
    Ok(f32::from(cursor.read_u8()?) / 255.0)
}
