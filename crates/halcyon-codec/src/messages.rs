//! Inbound batch messages, as delivered by the transport collaborator.
//!
//! The transport owns packet framing and reliability; this library
//! receives one batch struct per wire message, with per-object fields
//! already split out but packed payloads (kinematics, texture entries,
//! name values) still raw. Decoding those is the codec's job.

use glam::Vec3;
use halcyon_types::construction::{self, ConstructionData};
use halcyon_types::enums::{Material, PCode};
use halcyon_types::flags::{SoundFlags, UpdateFlags};
use halcyon_types::id::ObjectId;
use serde::{Deserialize, Serialize};

/// Expands the raw wire time-dilation word into the 0..1 scalar.
pub fn dilation_to_f32(raw: u16) -> f32 {
    f32::from(raw) / 65535.0
}

// ---------------------------------------------------------------------------
// Full updates
// ---------------------------------------------------------------------------

/// A full object update batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjectUpdateBatch {
    /// Handle of the region the batch describes.
    pub region_handle: u64,
    /// Raw time-dilation word (`/ 65535.0` for the scalar).
    pub time_dilation: u16,
    /// Per-object blocks.
    pub blocks: Vec<ObjectBlock>,
}

/// One object's block in a full update. Mirrors the wire block: typed
/// header fields plus raw packed payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjectBlock {
    /// Region-local id.
    pub id: u32,
    /// Global id.
    pub full_id: ObjectId,
    /// Object kind discriminant.
    pub pcode: u8,
    /// Object state byte.
    pub state: u8,
    /// Object cache CRC.
    pub crc: u32,
    pub material: u8,
    pub click_action: u8,
    pub scale: Vec3,
    pub owner_id: ObjectId,
    /// Packed kinematics (16/32/48/60/76 bytes).
    pub object_data: Vec<u8>,
    /// Parent local id; 0 when unlinked.
    pub parent_id: u32,
    pub update_flags: UpdateFlags,
    // Packed construction parameters.
    pub path_curve: u8,
    pub path_begin: u16,
    pub path_end: u16,
    pub path_scale_x: u8,
    pub path_scale_y: u8,
    pub path_shear_x: u8,
    pub path_shear_y: u8,
    pub path_twist: i8,
    pub path_twist_begin: i8,
    pub path_radius_offset: i8,
    pub path_taper_x: i8,
    pub path_taper_y: i8,
    pub path_revolutions: u8,
    pub path_skew: i8,
    pub profile_curve: u8,
    pub profile_begin: u16,
    pub profile_end: u16,
    pub profile_hollow: u16,
    /// Raw texture entry field.
    pub texture_entry: Vec<u8>,
    /// Raw texture animation field.
    pub texture_anim: Vec<u8>,
    /// Raw newline-delimited name/value field.
    pub name_value: Vec<u8>,
    /// Kind-specific data (foliage species, etc.).
    pub data: Vec<u8>,
    /// Floating text bytes.
    pub text: Vec<u8>,
    /// Floating text color (color channels inverted, alpha re-inverted).
    pub text_color: [u8; 4],
    pub media_url: Vec<u8>,
    /// Raw particle system block.
    pub ps_block: Vec<u8>,
    /// Raw extra parameter block.
    pub extra_params: Vec<u8>,
    pub sound_id: ObjectId,
    pub sound_gain: f32,
    pub sound_flags: SoundFlags,
    pub sound_radius: f32,
    pub joint_type: u8,
    pub joint_pivot: Vec3,
    pub joint_axis_or_anchor: Vec3,
}

impl ObjectBlock {
    /// Unpacks the quantized construction parameters.
    pub fn construction_data(&self) -> ConstructionData {
        ConstructionData {
            state: self.state,
            pcode: PCode::from_u8(self.pcode),
            material: Material::from_u8(self.material),
            path_curve: self.path_curve,
            profile_curve: self.profile_curve,
            path_begin: construction::unpack_begin_cut(self.path_begin),
            path_end: construction::unpack_end_cut(self.path_end),
            path_scale_x: construction::unpack_path_scale(self.path_scale_x),
            path_scale_y: construction::unpack_path_scale(self.path_scale_y),
            path_shear_x: construction::unpack_path_shear(self.path_shear_x as i8),
            path_shear_y: construction::unpack_path_shear(self.path_shear_y as i8),
            path_twist: construction::unpack_path_twist(self.path_twist),
            path_twist_begin: construction::unpack_path_twist(self.path_twist_begin),
            path_radius_offset: construction::unpack_path_twist(self.path_radius_offset),
            path_taper_x: construction::unpack_path_taper(self.path_taper_x),
            path_taper_y: construction::unpack_path_taper(self.path_taper_y),
            path_revolutions: construction::unpack_path_revolutions(self.path_revolutions),
            path_skew: construction::unpack_path_twist(self.path_skew),
            profile_begin: construction::unpack_begin_cut(self.profile_begin),
            profile_end: construction::unpack_end_cut(self.profile_end),
            profile_hollow: construction::unpack_profile_hollow(self.profile_hollow),
        }
    }
}

impl Default for ObjectBlock {
    fn default() -> Self {
        Self {
            id: 0,
            full_id: ObjectId::ZERO,
            pcode: 0,
            state: 0,
            crc: 0,
            material: 0,
            click_action: 0,
            scale: Vec3::ONE,
            owner_id: ObjectId::ZERO,
            object_data: Vec::new(),
            parent_id: 0,
            update_flags: UpdateFlags::NONE,
            path_curve: 0,
            path_begin: 0,
            path_end: 0,
            path_scale_x: 100,
            path_scale_y: 100,
            path_shear_x: 0,
            path_shear_y: 0,
            path_twist: 0,
            path_twist_begin: 0,
            path_radius_offset: 0,
            path_taper_x: 0,
            path_taper_y: 0,
            path_revolutions: 0,
            path_skew: 0,
            profile_curve: 0,
            profile_begin: 0,
            profile_end: 0,
            profile_hollow: 0,
            texture_entry: Vec::new(),
            texture_anim: Vec::new(),
            name_value: Vec::new(),
            data: Vec::new(),
            text: Vec::new(),
            text_color: [0; 4],
            media_url: Vec::new(),
            ps_block: Vec::new(),
            extra_params: Vec::new(),
            sound_id: ObjectId::ZERO,
            sound_gain: 0.0,
            sound_flags: SoundFlags::NONE,
            sound_radius: 0.0,
            joint_type: 0,
            joint_pivot: Vec3::ZERO,
            joint_axis_or_anchor: Vec3::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Terse updates
// ---------------------------------------------------------------------------

/// A terse (movement-only) update batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TerseUpdateBatch {
    pub region_handle: u64,
    /// Raw time-dilation word.
    pub time_dilation: u16,
    pub blocks: Vec<TerseBlock>,
}

/// One object's terse block: the packed movement bytes plus the raw
/// texture entry field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TerseBlock {
    /// Packed terse movement data.
    pub data: Vec<u8>,
    /// Raw texture entry field (length-prefixed), empty when absent.
    pub texture_entry: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Compressed updates
// ---------------------------------------------------------------------------

/// A compressed update batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompressedUpdateBatch {
    pub region_handle: u64,
    /// Raw time-dilation word.
    pub time_dilation: u16,
    pub blocks: Vec<CompressedBlock>,
}

/// One object's compressed block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CompressedBlock {
    pub update_flags: UpdateFlags,
    /// The flag-driven variable-length stream.
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Cached updates
// ---------------------------------------------------------------------------

/// A cached-update batch: ids plus CRCs for objects the simulator
/// believes the client has cached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CachedUpdateBatch {
    pub region_handle: u64,
    /// Raw time-dilation word.
    pub time_dilation: u16,
    pub blocks: Vec<CachedBlock>,
}

/// One cached-object reference.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedBlock {
    /// Region-local id.
    pub id: u32,
    /// Cache CRC for the object's last-known state.
    pub crc: u32,
}

// ---------------------------------------------------------------------------
// Kill batch
// ---------------------------------------------------------------------------

/// Object removal notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KillBatch {
    /// Local ids of the removed objects.
    pub ids: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Object properties
// ---------------------------------------------------------------------------

/// Permission masks for an object.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    pub base_mask: u32,
    pub everyone_mask: u32,
    pub group_mask: u32,
    pub next_owner_mask: u32,
    pub owner_mask: u32,
}

/// Rich metadata delivered in response to an object select.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ObjectProperties {
    /// Global id of the object the properties belong to.
    pub object_id: ObjectId,
    pub creator_id: ObjectId,
    pub owner_id: ObjectId,
    pub group_id: ObjectId,
    /// Creation timestamp (microseconds since the Unix epoch).
    pub creation_date: i64,
    pub permissions: Permissions,
    pub ownership_cost: i32,
    pub sale_type: u8,
    pub sale_price: i32,
    pub aggregate_perms: u8,
    pub aggregate_perm_textures: u8,
    pub aggregate_perm_textures_owner: u8,
    pub category: u32,
    pub inventory_serial: u16,
    pub item_id: ObjectId,
    pub folder_id: ObjectId,
    pub from_task_id: ObjectId,
    pub last_owner_id: ObjectId,
    pub name: String,
    pub description: String,
    pub touch_name: String,
    pub sit_name: String,
    /// Texture asset ids, 16 bytes each on the wire.
    pub texture_ids: Vec<ObjectId>,
}

/// A batch of object property blocks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ObjectPropertiesBatch {
    pub blocks: Vec<ObjectProperties>,
}

/// The subset of properties returned for family (unselected) requests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ObjectPropertiesFamily {
    pub request_flags: u32,
    /// Global id of the object the properties belong to.
    pub object_id: ObjectId,
    pub owner_id: ObjectId,
    pub group_id: ObjectId,
    pub permissions: Permissions,
    pub ownership_cost: i32,
    pub sale_type: u8,
    pub sale_price: i32,
    pub category: u32,
    pub last_owner_id: ObjectId,
    pub name: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Pay price
// ---------------------------------------------------------------------------

/// Price quick-buttons for paying an object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PayPriceReply {
    /// Global id of the payable object.
    pub object_id: ObjectId,
    /// Default payment amount.
    pub default_price: i32,
    /// Quick-pay button amounts.
    pub button_prices: Vec<i32>,
}
