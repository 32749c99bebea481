//! Tracked object state.
//!
//! Primitives and avatars share the same kinematic shape and differ in
//! their extra fields, so both embed [`Kinematics`] by composition.
//! Objects are created as placeholders (ids only) on first reference
//! and populated incrementally as updates arrive.

use glam::{Quat, Vec3, Vec4};
use halcyon_codec::compressed::SoundData;
use halcyon_codec::extra::ExtraParams;
use halcyon_codec::messages::{ObjectProperties, ObjectPropertiesFamily};
use halcyon_types::color::Color4;
use halcyon_types::construction::ConstructionData;
use halcyon_types::enums::{
    AttachmentPoint, ClickAction, GrassSpecies, JointType, PCode, TreeSpecies,
};
use halcyon_types::flags::UpdateFlags;
use halcyon_types::id::ObjectId;
use halcyon_types::namevalue::{NameValue, NameValueData};
use halcyon_types::texture::{TextureAnimation, TextureEntry};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Kinematic state shared by primitives and avatars. Positions are
/// parent-relative when the object is seated or linked, region-relative
/// otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Quat,
    pub angular_velocity: Vec3,
    /// Collision plane; meaningful only for avatars.
    pub collision_plane: Vec4,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            collision_plane: Vec4::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Prim
// ---------------------------------------------------------------------------

/// A tracked primitive (including foliage and attachments).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Prim {
    /// Region-local id. Unique within the region for this object's
    /// lifetime; reassignable after removal.
    pub local_id: u32,
    /// Persistent global id.
    pub full_id: ObjectId,
    /// Local id of the parent object; 0 when unlinked.
    pub parent_local_id: u32,
    /// Handle of the owning region.
    pub region_handle: u64,
    pub kinematics: Kinematics,
    pub flags: UpdateFlags,
    pub construction: ConstructionData,
    pub scale: Vec3,
    pub click_action: ClickAction,
    pub owner_id: ObjectId,
    pub joint: JointType,
    pub joint_pivot: Vec3,
    pub joint_axis_or_anchor: Vec3,
    /// Floating text above the prim.
    pub text: String,
    pub text_color: Color4,
    pub media_url: String,
    pub sound: SoundData,
    pub name_values: Vec<NameValue>,
    pub textures: Option<TextureEntry>,
    pub texture_anim: Option<TextureAnimation>,
    /// Raw particle system block; no consumer contract is defined for
    /// its contents.
    pub particles: Vec<u8>,
    pub extra_params: ExtraParams,
    pub tree_species: Option<TreeSpecies>,
    pub scratch_pad: Vec<u8>,
    /// Kind-specific generic data from full updates.
    pub generic_data: Vec<u8>,
    pub crc: u32,
    /// Rich metadata, present once a select round-trip completed.
    pub properties: Option<ObjectProperties>,
    pub properties_family: Option<ObjectPropertiesFamily>,
}

impl Prim {
    /// Creates a placeholder entry carrying only identity. Everything
    /// else stays default until the first full update fills it in.
    pub fn placeholder(local_id: u32, full_id: ObjectId) -> Self {
        Self {
            local_id,
            full_id,
            ..Self::default()
        }
    }

    /// Body attachment point for worn prims. The state byte stores the
    /// point index with its nibbles swapped.
    pub fn attachment_point(&self) -> Option<AttachmentPoint> {
        let state = self.construction.state;
        AttachmentPoint::from_u8((state & 0xF0) >> 4 | (state & 0x0F) << 4)
    }

    /// Grass species for grass prims, carried in the generic data.
    pub fn grass_species(&self) -> Option<GrassSpecies> {
        if self.construction.pcode == Some(PCode::Grass) {
            self.generic_data.first().copied().and_then(GrassSpecies::from_u8)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Avatar
// ---------------------------------------------------------------------------

/// A tracked avatar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Avatar {
    /// Region-local id.
    pub local_id: u32,
    /// Persistent global id.
    pub full_id: ObjectId,
    /// Handle of the owning region.
    pub region_handle: u64,
    pub kinematics: Kinematics,
    /// Local id of the seat object; 0 when standing.
    pub sitting_on: u32,
    pub construction: ConstructionData,
    pub name_values: Vec<NameValue>,
    pub textures: Option<TextureEntry>,
    /// Kind-specific generic data from full updates.
    pub generic_data: Vec<u8>,
}

impl Avatar {
    /// Creates a placeholder entry carrying only identity.
    pub fn placeholder(local_id: u32, full_id: ObjectId) -> Self {
        Self {
            local_id,
            full_id,
            ..Self::default()
        }
    }

    /// Full display name assembled from the `FirstName` and `LastName`
    /// metadata records, when both have arrived.
    pub fn name(&self) -> Option<String> {
        let find = |key: &str| {
            self.name_values.iter().find_map(|nv| match &nv.value {
                NameValueData::String(s) if nv.name == key => Some(s.as_str()),
                _ => None,
            })
        };
        match (find("FirstName"), find("LastName")) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_identity_only() {
        let id = ObjectId::from_bytes([1; 16]);
        let prim = Prim::placeholder(99, id);
        assert_eq!(prim.local_id, 99);
        assert_eq!(prim.full_id, id);
        assert_eq!(prim.parent_local_id, 0);
        assert_eq!(prim.kinematics, Kinematics::default());
        assert!(prim.textures.is_none());
        assert!(prim.properties.is_none());
    }

    #[test]
    fn test_default_rotation_is_identity() {
        assert_eq!(Kinematics::default().rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_attachment_point_nibble_swap() {
        let mut prim = Prim::placeholder(1, ObjectId::ZERO);
        // Chest (index 1) stored nibble-swapped: 0x10.
        prim.construction.state = 0x10;
        assert_eq!(prim.attachment_point(), Some(AttachmentPoint::Chest));

        prim.construction.state = 0;
        assert_eq!(prim.attachment_point(), Some(AttachmentPoint::Default));
    }

    #[test]
    fn test_grass_species_requires_grass_kind() {
        let mut prim = Prim::placeholder(1, ObjectId::ZERO);
        prim.generic_data = vec![2];
        assert_eq!(prim.grass_species(), None);

        prim.construction.pcode = Some(PCode::Grass);
        assert_eq!(prim.grass_species(), Some(GrassSpecies::Grass2));
    }

    #[test]
    fn test_avatar_name_from_records() {
        let mut avatar = Avatar::placeholder(1, ObjectId::ZERO);
        assert_eq!(avatar.name(), None);

        avatar.name_values = NameValue::parse_block(
            "FirstName STRING R SV Jane\nLastName STRING R SV Doe",
        );
        assert_eq!(avatar.name(), Some("Jane Doe".to_owned()));
    }
}
