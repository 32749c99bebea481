//! Compressed update decoding.
//!
//! A compressed block is a variable-length stream: fixed header (global
//! id, local id, kind), a common transform section, then a
//! [`CompressedFlags`] word gating optional sections. Sections appear
//! in a fixed order matching the flag bit layout and must be walked
//! sequentially; an index overrun anywhere is a recoverable per-object
//! failure.

use glam::{Quat, Vec3};
use halcyon_types::Color4;
use halcyon_types::construction::{self, ConstructionData};
use halcyon_types::enums::{ClickAction, Material, PCode, TreeSpecies};
use halcyon_types::flags::{CompressedFlags, SoundFlags};
use halcyon_types::id::ObjectId;
use halcyon_types::namevalue::NameValue;
use halcyon_types::texture::{TextureAnimation, TextureEntry};
use serde::{Deserialize, Serialize};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::extra::{ExtraParams, decode_extra_params};
use crate::texture::{decode_texture_animation, decode_texture_entry};

/// Byte length of a particle system block inside a compressed stream.
const PARTICLE_BLOCK_LEN: usize = 86;

// ---------------------------------------------------------------------------
// SoundData
// ---------------------------------------------------------------------------

/// Sound attached to a primitive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SoundData {
    /// Sound asset id.
    pub sound_id: ObjectId,
    /// Playback gain.
    pub gain: f32,
    /// Loop/sync flags.
    pub flags: SoundFlags,
    /// Audible radius in meters.
    pub radius: f32,
}

// ---------------------------------------------------------------------------
// CompressedObject
// ---------------------------------------------------------------------------

/// Everything a compressed block can carry. Optional sections that were
/// absent decode to their documented defaults (parent 0, empty text).
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedObject {
    pub full_id: ObjectId,
    pub local_id: u32,
    pub pcode: PCode,
    /// Section-presence flags (always `NONE` for foliage blocks).
    pub flags: CompressedFlags,
    pub state: u8,
    pub crc: u32,
    pub material: Material,
    pub click_action: ClickAction,
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub owner_id: ObjectId,
    /// Present only when `HAS_ANGULAR_VELOCITY` is set.
    pub angular_velocity: Option<Vec3>,
    /// 0 when `HAS_PARENT` is absent.
    pub parent_local_id: u32,
    pub tree_species: Option<TreeSpecies>,
    pub scratch_pad: Option<Vec<u8>>,
    /// Floating text; empty when `HAS_TEXT` is absent.
    pub text: String,
    pub text_color: Color4,
    pub media_url: Option<String>,
    /// Raw particle system block.
    pub particles: Option<Vec<u8>>,
    pub extra_params: ExtraParams,
    pub sound: Option<SoundData>,
    pub name_values: Vec<NameValue>,
    pub construction: ConstructionData,
    pub textures: Option<TextureEntry>,
    pub texture_anim: Option<TextureAnimation>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes one compressed block.
pub fn decode_compressed_block(data: &[u8]) -> Result<CompressedObject, DecodeError> {
    let mut cursor = ByteCursor::new(data);

    let full_id = cursor.read_object_id()?;
    let local_id = cursor.read_u32_le()?;
    let pcode_byte = cursor.read_u8()?;
    let pcode = PCode::from_u8(pcode_byte).ok_or(DecodeError::UnknownPCode(pcode_byte))?;

    match pcode {
        PCode::Grass | PCode::Tree | PCode::NewTree => {
            decode_foliage(&mut cursor, full_id, local_id, pcode)
        }
        PCode::Prim => decode_prim(&mut cursor, full_id, local_id),
        _ => Err(DecodeError::UnsupportedCompressedKind(pcode_byte)),
    }
}

/// Common transform prefix shared by foliage and prim layouts.
struct Transform {
    state: u8,
    crc: u32,
    material: Material,
    click_action: ClickAction,
    scale: Vec3,
    position: Vec3,
    rotation: Quat,
}

fn decode_transform(cursor: &mut ByteCursor<'_>) -> Result<Transform, DecodeError> {
    Ok(Transform {
        state: cursor.read_u8()?,
        crc: cursor.read_u32_le()?,
        material: Material::from_u8(cursor.read_u8()?),
        click_action: ClickAction::from_u8(cursor.read_u8()?),
        scale: cursor.read_vec3()?,
        position: cursor.read_vec3()?,
        rotation: cursor.read_quat_normalized()?,
    })
}

/// Foliage blocks stop after the transform; species arrives in the
/// generic data of full updates instead.
fn decode_foliage(
    cursor: &mut ByteCursor<'_>,
    full_id: ObjectId,
    local_id: u32,
    pcode: PCode,
) -> Result<CompressedObject, DecodeError> {
    let t = decode_transform(cursor)?;
    Ok(CompressedObject {
        full_id,
        local_id,
        pcode,
        flags: CompressedFlags::NONE,
        state: t.state,
        crc: t.crc,
        material: t.material,
        click_action: t.click_action,
        scale: t.scale,
        position: t.position,
        rotation: t.rotation,
        owner_id: ObjectId::ZERO,
        angular_velocity: None,
        parent_local_id: 0,
        tree_species: None,
        scratch_pad: None,
        text: String::new(),
        text_color: Color4::ZERO,
        media_url: None,
        particles: None,
        extra_params: ExtraParams::default(),
        sound: None,
        name_values: Vec::new(),
        construction: ConstructionData {
            state: t.state,
            pcode: Some(pcode),
            material: t.material,
            ..ConstructionData::default()
        },
        textures: None,
        texture_anim: None,
    })
}

fn decode_prim(
    cursor: &mut ByteCursor<'_>,
    full_id: ObjectId,
    local_id: u32,
) -> Result<CompressedObject, DecodeError> {
    let t = decode_transform(cursor)?;
    let flags = CompressedFlags(cursor.read_u32_be()?);
    let owner_id = cursor.read_object_id()?;

    let angular_velocity = if flags.contains(CompressedFlags::HAS_ANGULAR_VELOCITY) {
        Some(cursor.read_vec3()?)
    } else {
        None
    };

    let parent_local_id = if flags.contains(CompressedFlags::HAS_PARENT) {
        cursor.read_u32_le()?
    } else {
        0
    };

    let mut tree_species = None;
    let mut scratch_pad = None;
    if flags.contains(CompressedFlags::TREE) {
        tree_species = TreeSpecies::from_u8(cursor.read_u8()?);
    } else if flags.contains(CompressedFlags::SCRATCH_PAD) {
        let size = cursor.read_u8()? as usize;
        scratch_pad = Some(cursor.take(size)?.to_vec());
    }

    let (text, text_color) = if flags.contains(CompressedFlags::HAS_TEXT) {
        let text = cursor.read_cstr()?;
        let bytes = cursor.take(4)?;
        let color = Color4::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]], false, false);
        (text, color)
    } else {
        (String::new(), Color4::ZERO)
    };

    let media_url = if flags.contains(CompressedFlags::MEDIA_URL) {
        Some(cursor.read_cstr()?)
    } else {
        None
    };

    let particles = if flags.contains(CompressedFlags::HAS_PARTICLES) {
        Some(cursor.take(PARTICLE_BLOCK_LEN)?.to_vec())
    } else {
        None
    };

    let extra_params = decode_extra_params(cursor)?;

    let sound = if flags.contains(CompressedFlags::HAS_SOUND) {
        Some(SoundData {
            sound_id: cursor.read_object_id()?,
            gain: cursor.read_f32_le()?,
            flags: SoundFlags(cursor.read_u8()?),
            radius: cursor.read_f32_le()?,
        })
    } else {
        None
    };

    let name_values = if flags.contains(CompressedFlags::HAS_NAME_VALUES) {
        NameValue::parse_block(&cursor.read_cstr()?)
    } else {
        Vec::new()
    };

    let construction = decode_construction(cursor, t.state, t.material)?;

    let texture_len = cursor.read_u32_be()? as usize;
    let textures = Some(decode_texture_entry(cursor.take(texture_len)?)?);

    let texture_anim = if flags.contains(CompressedFlags::TEXTURE_ANIMATION) {
        // Length-prefixed, but the animation block itself is fixed-size
        // and sits at the end of the stream.
        let _anim_len = cursor.read_u32_be()?;
        let rest = cursor.remaining();
        Some(decode_texture_animation(cursor.take(rest)?))
    } else {
        None
    };

    Ok(CompressedObject {
        full_id,
        local_id,
        pcode: PCode::Prim,
        flags,
        state: t.state,
        crc: t.crc,
        material: t.material,
        click_action: t.click_action,
        scale: t.scale,
        position: t.position,
        rotation: t.rotation,
        owner_id,
        angular_velocity,
        parent_local_id,
        tree_species,
        scratch_pad,
        text,
        text_color,
        media_url,
        particles,
        extra_params,
        sound,
        name_values,
        construction,
        textures,
        texture_anim,
    })
}

/// Packed path/profile section at the tail of a prim block. Reads are
/// sequential; the wire order differs from the struct's field order.
fn decode_construction(
    cursor: &mut ByteCursor<'_>,
    state: u8,
    material: Material,
) -> Result<ConstructionData, DecodeError> {
    let path_curve = cursor.read_u8()?;
    let path_begin = construction::unpack_begin_cut(cursor.read_u16_le()?);
    let path_end = construction::unpack_end_cut(cursor.read_u16_le()?);
    let path_scale_x = construction::unpack_path_scale(cursor.read_u8()?);
    let path_scale_y = construction::unpack_path_scale(cursor.read_u8()?);
    let path_shear_x = construction::unpack_path_shear(cursor.read_i8()?);
    let path_shear_y = construction::unpack_path_shear(cursor.read_i8()?);
    let path_twist = construction::unpack_path_twist(cursor.read_i8()?);
    let path_twist_begin = construction::unpack_path_twist(cursor.read_i8()?);
    let path_radius_offset = construction::unpack_path_twist(cursor.read_i8()?);
    let path_taper_x = construction::unpack_path_taper(cursor.read_i8()?);
    let path_taper_y = construction::unpack_path_taper(cursor.read_i8()?);
    let path_revolutions = construction::unpack_path_revolutions(cursor.read_u8()?);
    let path_skew = construction::unpack_path_twist(cursor.read_i8()?);
    let profile_curve = cursor.read_u8()?;
    let profile_begin = construction::unpack_begin_cut(cursor.read_u16_le()?);
    let profile_end = construction::unpack_end_cut(cursor.read_u16_le()?);
    let profile_hollow = construction::unpack_profile_hollow(cursor.read_u16_le()?);

    Ok(ConstructionData {
        state,
        pcode: Some(PCode::Prim),
        material,
        path_curve,
        profile_curve,
        path_begin,
        path_end,
        path_scale_x,
        path_scale_y,
        path_shear_x,
        path_shear_y,
        path_twist,
        path_twist_begin,
        path_radius_offset,
        path_taper_x,
        path_taper_y,
        path_revolutions,
        path_skew,
        profile_begin,
        profile_end,
        profile_hollow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a compressed prim block with the given flags and optional
    /// section payloads appended in wire order.
    struct BlockBuilder {
        flags: CompressedFlags,
        sections: Vec<u8>,
        name_values: Option<&'static str>,
        parent: Option<u32>,
        angular_velocity: Option<Vec3>,
        text: Option<&'static str>,
    }

    impl BlockBuilder {
        fn new() -> Self {
            Self {
                flags: CompressedFlags::NONE,
                sections: Vec::new(),
                name_values: None,
                parent: None,
                angular_velocity: None,
                text: None,
            }
        }

        fn parent(mut self, id: u32) -> Self {
            self.flags |= CompressedFlags::HAS_PARENT;
            self.parent = Some(id);
            self
        }

        fn angular_velocity(mut self, v: Vec3) -> Self {
            self.flags |= CompressedFlags::HAS_ANGULAR_VELOCITY;
            self.angular_velocity = Some(v);
            self
        }

        fn name_values(mut self, block: &'static str) -> Self {
            self.flags |= CompressedFlags::HAS_NAME_VALUES;
            self.name_values = Some(block);
            self
        }

        fn text(mut self, text: &'static str) -> Self {
            self.flags |= CompressedFlags::HAS_TEXT;
            self.text = Some(text);
            self
        }

        fn build(self) -> Vec<u8> {
            let mut data = Vec::new();
            data.extend_from_slice(&[0xAB; 16]); // full id
            data.extend_from_slice(&42u32.to_le_bytes()); // local id
            data.push(PCode::Prim.as_u8());
            data.push(0); // state
            data.extend_from_slice(&0u32.to_le_bytes()); // crc
            data.push(3); // material: wood
            data.push(1); // click action: sit
            for c in [1.0f32, 1.0, 1.0] {
                data.extend_from_slice(&c.to_le_bytes()); // scale
            }
            for c in [10.0f32, 20.0, 30.0] {
                data.extend_from_slice(&c.to_le_bytes()); // position
            }
            for c in [0.0f32, 0.0, 0.0] {
                data.extend_from_slice(&c.to_le_bytes()); // rotation (identity)
            }
            data.extend_from_slice(&self.flags.0.to_be_bytes());
            data.extend_from_slice(&[0xCD; 16]); // owner id

            if let Some(v) = self.angular_velocity {
                for c in v.to_array() {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            if let Some(parent) = self.parent {
                data.extend_from_slice(&parent.to_le_bytes());
            }
            if let Some(text) = self.text {
                data.extend_from_slice(text.as_bytes());
                data.push(0);
                data.extend_from_slice(&[255, 255, 255, 255]); // text color
            }
            data.extend_from_slice(&self.sections);
            data.push(0); // extra params: count 0
            if let Some(nv) = self.name_values {
                data.extend_from_slice(nv.as_bytes());
                data.push(0);
            }
            // Construction section: line path, square profile, defaults.
            data.push(0x10); // path curve
            data.extend_from_slice(&0u16.to_le_bytes()); // path begin
            data.extend_from_slice(&0u16.to_le_bytes()); // path end (-> 1.0)
            data.push(100); // path scale x (-> 1.0)
            data.push(100); // path scale y
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0]); // shears..tapers
            data.push(0); // revolutions (-> 1.0)
            data.push(0); // skew
            data.push(0x01); // profile curve
            data.extend_from_slice(&0u16.to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes());
            // Empty texture entry.
            data.extend_from_slice(&0u32.to_be_bytes());
            data
        }
    }

    #[test]
    fn test_minimal_prim_block() {
        let block = BlockBuilder::new().build();
        let obj = decode_compressed_block(&block).unwrap();

        assert_eq!(obj.local_id, 42);
        assert_eq!(obj.pcode, PCode::Prim);
        assert_eq!(obj.full_id, ObjectId::from_bytes([0xAB; 16]));
        assert_eq!(obj.owner_id, ObjectId::from_bytes([0xCD; 16]));
        assert_eq!(obj.position, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(obj.rotation, Quat::IDENTITY);
        assert_eq!(obj.material, Material::Wood);
        assert_eq!(obj.click_action, ClickAction::Sit);
        assert_eq!(obj.parent_local_id, 0);
        assert!(obj.angular_velocity.is_none());
        assert!(obj.text.is_empty());
        assert!(obj.name_values.is_empty());
        assert!((obj.construction.path_end - 1.0).abs() < 1e-5);
        assert!((obj.construction.path_scale_x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_optional_sections_in_flag_order() {
        let block = BlockBuilder::new()
            .angular_velocity(Vec3::new(0.0, 0.0, 2.0))
            .parent(7)
            .text("for sale")
            .name_values("AttachItemID STRING RW SV abc")
            .build();
        let obj = decode_compressed_block(&block).unwrap();

        assert_eq!(obj.angular_velocity, Some(Vec3::new(0.0, 0.0, 2.0)));
        assert_eq!(obj.parent_local_id, 7);
        assert_eq!(obj.text, "for sale");
        assert_eq!(obj.name_values.len(), 1);
        assert_eq!(obj.name_values[0].name, "AttachItemID");
    }

    #[test]
    fn test_absent_parent_decodes_as_zero() {
        let block = BlockBuilder::new().text("hover").build();
        let obj = decode_compressed_block(&block).unwrap();
        assert_eq!(obj.parent_local_id, 0);
    }

    #[test]
    fn test_foliage_block_stops_after_transform() {
        let mut data = Vec::new();
        data.extend_from_slice(&[1u8; 16]);
        data.extend_from_slice(&9u32.to_le_bytes());
        data.push(PCode::Tree.as_u8());
        data.push(0); // state
        data.extend_from_slice(&0u32.to_le_bytes()); // crc
        data.push(0); // material
        data.push(0); // click action
        for c in [1.0f32, 1.0, 3.0, 50.0, 50.0, 21.0, 0.0, 0.0, 0.0] {
            data.extend_from_slice(&c.to_le_bytes());
        }

        let obj = decode_compressed_block(&data).unwrap();
        assert_eq!(obj.pcode, PCode::Tree);
        assert_eq!(obj.position, Vec3::new(50.0, 50.0, 21.0));
        assert_eq!(obj.flags, CompressedFlags::NONE);
    }

    #[test]
    fn test_truncated_block_is_recoverable_error() {
        let block = BlockBuilder::new().build();
        let result = decode_compressed_block(&block[..40]);
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_unknown_pcode_is_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(200); // not a PCode
        let result = decode_compressed_block(&data);
        assert!(matches!(result, Err(DecodeError::UnknownPCode(200))));
    }

    #[test]
    fn test_avatar_kind_has_no_compressed_layout() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(PCode::Avatar.as_u8());
        let result = decode_compressed_block(&data);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedCompressedKind(47))
        ));
    }
}
