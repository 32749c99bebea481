//! Update reconciliation: one handler per inbound wire message.
//!
//! [`ObjectSync`] merges decoded blocks into the tracked tables and
//! emits change notifications. Merge policy is last-writer-wins: every
//! field a block carries fully overwrites the tracked value. Per-object
//! decode failures are logged and skipped; nothing aborts a batch.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec4;
use tracing::{debug, warn};

use halcyon_codec::compressed::{CompressedObject, SoundData, decode_compressed_block};
use halcyon_codec::cursor::ByteCursor;
use halcyon_codec::error::DecodeError;
use halcyon_codec::extra::decode_extra_params;
use halcyon_codec::messages::{
    CachedUpdateBatch, CompressedBlock, CompressedUpdateBatch, KillBatch, ObjectBlock,
    ObjectPropertiesBatch, ObjectPropertiesFamily, ObjectUpdateBatch, PayPriceReply, TerseBlock,
    TerseUpdateBatch, dilation_to_f32,
};
use halcyon_codec::movement::{MovementUpdate, decode_movement};
use halcyon_codec::terse::decode_terse_block;
use halcyon_codec::texture::{decode_texture_animation, decode_texture_entry};
use halcyon_config::Settings;
use halcyon_types::color::Color4;
use halcyon_types::enums::{ClickAction, JointType, PCode, TreeSpecies};
use halcyon_types::flags::{CompressedFlags, UpdateFlags};
use halcyon_types::id::ObjectId;
use halcyon_types::namevalue::{NameValue, has_attach_item_id};

use crate::agent::AgentState;
use crate::events::{
    AvatarUpdated, Events, MovementApplied, ObjectKilled, PayPriceReceived, PrimUpdated,
    PropertiesFamilyReceived, PropertiesReceived, SitChanged,
};
use crate::interpolate::InterpolationTimer;
use crate::object::{Avatar, Kinematics, Prim};
use crate::region::{Region, World};
use crate::requests::RequestSink;

/// The update reconciler: owns the event registry, the agent mirror,
/// and the outbound request sink, and applies every inbound wire
/// message to the world's tables.
pub struct ObjectSync {
    settings: Settings,
    world: Arc<World>,
    events: Events,
    agent: AgentState,
    requests: Arc<dyn RequestSink>,
}

impl ObjectSync {
    /// Creates a reconciler for the given session agent.
    pub fn new(
        settings: Settings,
        world: Arc<World>,
        agent_id: ObjectId,
        requests: Arc<dyn RequestSink>,
    ) -> Self {
        Self {
            settings,
            world,
            events: Events::new(),
            agent: AgentState::new(agent_id),
            requests,
        }
    }

    /// The event registry consumers subscribe on.
    pub fn events(&self) -> &Events {
        &self.events
    }

    /// The client's own avatar mirror.
    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    /// The region registry.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Starts the dead-reckoning timer per the interpolation settings.
    /// Returns `None` when interpolation is disabled.
    pub fn start_interpolation(&self) -> Option<InterpolationTimer> {
        if !self.settings.interpolation.enabled {
            return None;
        }
        Some(InterpolationTimer::start(
            Arc::clone(&self.world),
            Duration::from_millis(self.settings.interpolation.interval_ms),
        ))
    }

    // -----------------------------------------------------------------
    // Full updates
    // -----------------------------------------------------------------

    /// Applies a full object update batch.
    pub fn handle_object_update(&self, batch: &ObjectUpdateBatch) {
        let region = self.world.region(batch.region_handle);
        let dilation = dilation_to_f32(batch.time_dilation);
        region.set_time_dilation(dilation);

        for block in &batch.blocks {
            if let Err(error) = self.apply_full_block(&region, dilation, block) {
                warn!(local_id = block.id, %error, "skipping object update block");
            }
        }
    }

    fn apply_full_block(
        &self,
        region: &Region,
        dilation: f32,
        block: &ObjectBlock,
    ) -> Result<(), DecodeError> {
        let Some(pcode) = PCode::from_u8(block.pcode) else {
            debug!(pcode = block.pcode, "object update with unrecognized kind");
            return Ok(());
        };

        // Particle-system-only blocks have no consumer contract; never
        // spend decode work on them.
        if matches!(pcode, PCode::ParticleSystem | PCode::None) {
            return Ok(());
        }

        if !self.settings.decode.always_decode_objects && !self.full_update_is_relevant(pcode, block.full_id) {
            return Ok(());
        }

        let name_values = NameValue::parse_block(&String::from_utf8_lossy(&block.name_value));
        let attachment = has_attach_item_id(&name_values);
        let movement = decode_movement(&block.object_data)?;

        // Pre-merge hook: the raw decoded block, before any table state
        // is touched.
        if self.events.raw_block_updated.has_subscribers() {
            self.events.raw_block_updated.emit(MovementApplied {
                region_handle: region.handle(),
                time_dilation: dilation,
                update: MovementUpdate {
                    local_id: block.id,
                    state: block.state,
                    avatar: pcode == PCode::Avatar,
                    collision_plane: movement.collision_plane,
                    position: movement.position,
                    velocity: movement.velocity,
                    acceleration: movement.acceleration,
                    rotation: movement.rotation,
                    angular_velocity: movement.angular_velocity,
                    textures: None,
                },
            });
        }

        let kinematics = Kinematics {
            position: movement.position,
            velocity: movement.velocity,
            acceleration: movement.acceleration,
            rotation: movement.rotation,
            angular_velocity: movement.angular_velocity,
            collision_plane: movement.collision_plane.unwrap_or(Vec4::ZERO),
        };

        match pcode {
            PCode::Prim | PCode::Grass | PCode::Tree | PCode::NewTree => self.apply_full_prim(
                region, dilation, block, pcode, kinematics, name_values, attachment,
            ),
            PCode::Avatar => self.apply_full_avatar(region, dilation, block, kinematics, name_values),
            _ => Ok(()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_full_prim(
        &self,
        region: &Region,
        dilation: f32,
        block: &ObjectBlock,
        pcode: PCode,
        kinematics: Kinematics,
        name_values: Vec<NameValue>,
        attachment: bool,
    ) -> Result<(), DecodeError> {
        if block.update_flags.contains(UpdateFlags::ZLIB_COMPRESSED) {
            warn!(local_id = block.id, "zlib-compressed object blocks are not supported");
            return Ok(());
        }

        // Newly rezzed objects arrive selected server-side, and the
        // properties payload only comes in response to a select.
        if block.update_flags.contains(UpdateFlags::CREATE_SELECTED) {
            self.requests.select_objects(region.handle(), &[block.id]);
        }

        let textures = if block.texture_entry.is_empty() {
            None
        } else {
            Some(decode_texture_entry(&block.texture_entry)?)
        };
        let texture_anim = if block.texture_anim.is_empty() {
            None
        } else {
            Some(decode_texture_animation(&block.texture_anim))
        };
        let extra_params = decode_extra_params(&mut ByteCursor::new(&block.extra_params))?;
        let construction = block.construction_data();

        let tree_species = if matches!(pcode, PCode::Tree | PCode::NewTree) {
            block.data.first().copied().and_then(TreeSpecies::from_u8)
        } else {
            None
        };

        let apply = |prim: &mut Prim| {
            prim.local_id = block.id;
            prim.full_id = block.full_id;
            prim.parent_local_id = block.parent_id;
            prim.region_handle = region.handle();
            prim.flags = block.update_flags;
            prim.kinematics = kinematics;
            prim.construction = construction;
            prim.scale = block.scale;
            prim.click_action = ClickAction::from_u8(block.click_action);
            prim.owner_id = block.owner_id;
            prim.joint = JointType::from_u8(block.joint_type);
            prim.joint_pivot = block.joint_pivot;
            prim.joint_axis_or_anchor = block.joint_axis_or_anchor;
            prim.text = String::from_utf8_lossy(&block.text).into_owned();
            prim.text_color = Color4::from_bytes(block.text_color, false, true);
            prim.media_url = String::from_utf8_lossy(&block.media_url).into_owned();
            prim.sound = SoundData {
                sound_id: block.sound_id,
                gain: block.sound_gain,
                flags: block.sound_flags,
                radius: block.sound_radius,
            };
            prim.name_values = name_values.clone();
            prim.textures = textures.clone();
            prim.texture_anim = texture_anim;
            prim.particles = block.ps_block.clone();
            prim.extra_params = extra_params.clone();
            prim.tree_species = tree_species;
            prim.generic_data = block.data.clone();
            prim.crc = block.crc;
        };

        let snapshot = if self.settings.tracking.track_objects {
            region.with_tables(|tables| {
                let prim = tables.prim_entry(block.id, block.full_id);
                apply(prim);
                prim.clone()
            })
        } else {
            let mut prim = Prim::placeholder(block.id, block.full_id);
            apply(&mut prim);
            prim
        };

        let event = PrimUpdated {
            region_handle: region.handle(),
            time_dilation: dilation,
            prim: snapshot,
        };
        if attachment {
            self.events.attachment_updated.emit(event);
        } else if pcode == PCode::Prim {
            self.events.prim_updated.emit(event);
        } else {
            self.events.foliage_updated.emit(event);
        }
        Ok(())
    }

    fn apply_full_avatar(
        &self,
        region: &Region,
        dilation: f32,
        block: &ObjectBlock,
        kinematics: Kinematics,
        name_values: Vec<NameValue>,
    ) -> Result<(), DecodeError> {
        // Mirror our own movement state, current region only.
        if block.full_id == self.agent.agent_id()
            && region.handle() == self.world.current_region()
        {
            self.agent.update(|agent| {
                agent.local_id = block.id;
                agent.collision_plane = kinematics.collision_plane;
                agent.relative_position = kinematics.position;
                agent.velocity = kinematics.velocity;
                agent.acceleration = kinematics.acceleration;
                agent.relative_rotation = kinematics.rotation;
                agent.angular_velocity = kinematics.angular_velocity;
            });
        }

        let textures = if block.texture_entry.is_empty() {
            None
        } else {
            Some(decode_texture_entry(&block.texture_entry)?)
        };
        let construction = block.construction_data();

        let apply = |avatar: &mut Avatar| {
            avatar.local_id = block.id;
            avatar.full_id = block.full_id;
            avatar.region_handle = region.handle();
            avatar.kinematics = kinematics;
            avatar.name_values = name_values.clone();
            avatar.construction = construction;
            avatar.generic_data = block.data.clone();
            avatar.textures = textures.clone();
            avatar.sitting_on = block.parent_id;
        };

        let (snapshot, old_seat) = if self.settings.tracking.track_avatars {
            region.with_tables(|tables| {
                let avatar = tables.avatar_entry(block.id, block.full_id);
                let old_seat = avatar.sitting_on;
                apply(avatar);
                (avatar.clone(), old_seat)
            })
        } else {
            let mut avatar = Avatar::placeholder(block.id, block.full_id);
            apply(&mut avatar);
            (avatar, 0)
        };

        self.note_seat_change(region.handle(), &snapshot, old_seat);

        self.events.avatar_updated.emit(AvatarUpdated {
            region_handle: region.handle(),
            time_dilation: dilation,
            avatar: snapshot,
        });
        Ok(())
    }

    fn full_update_is_relevant(&self, pcode: PCode, full_id: ObjectId) -> bool {
        match pcode {
            PCode::Grass | PCode::Tree | PCode::NewTree => {
                self.events.foliage_updated.has_subscribers()
            }
            PCode::Prim => {
                self.events.prim_updated.has_subscribers()
                    || self.events.attachment_updated.has_subscribers()
            }
            // Updates about our own agent are always relevant.
            PCode::Avatar => {
                full_id == self.agent.agent_id() || self.events.avatar_updated.has_subscribers()
            }
            _ => true,
        }
    }

    /// Records a seat assignment, mirrors it for the agent, and emits a
    /// sit-change event exactly when the seat differs from the old one.
    fn note_seat_change(&self, region_handle: u64, avatar: &Avatar, old_seat: u32) {
        let agent = self.agent.snapshot();
        if avatar.local_id == agent.local_id && agent.local_id != 0 {
            self.agent.update(|a| a.sitting_on = avatar.sitting_on);
        }

        if avatar.sitting_on != old_seat {
            self.events.sit_changed.emit(SitChanged {
                region_handle,
                avatar_local_id: avatar.local_id,
                avatar_id: avatar.full_id,
                sitting_on: avatar.sitting_on,
                old_seat,
            });
        }
    }

    // -----------------------------------------------------------------
    // Terse updates
    // -----------------------------------------------------------------

    /// Applies a terse update batch.
    pub fn handle_terse_update(&self, batch: &TerseUpdateBatch) {
        let region = self.world.region(batch.region_handle);
        let dilation = dilation_to_f32(batch.time_dilation);
        region.set_time_dilation(dilation);

        for block in &batch.blocks {
            if let Err(error) = self.apply_terse_block(&region, dilation, block) {
                warn!(%error, "skipping terse update block");
            }
        }
    }

    fn apply_terse_block(
        &self,
        region: &Region,
        dilation: f32,
        block: &TerseBlock,
    ) -> Result<(), DecodeError> {
        // Peek the id before decoding the rest; relevance may let us
        // skip the block entirely.
        let local_id = ByteCursor::new(&block.data).read_u32_be()?;
        let agent = self.agent.snapshot();

        if !self.settings.decode.always_decode_objects
            && local_id != agent.local_id
            && !self.events.terse_updated.has_subscribers()
        {
            return Ok(());
        }

        let update = decode_terse_block(&block.data, &block.texture_entry)?;

        // Mirror our own movement state, current region only.
        if update.local_id == agent.local_id
            && agent.local_id != 0
            && region.handle() == self.world.current_region()
        {
            self.agent.update(|a| {
                a.collision_plane = update.collision_plane.unwrap_or(Vec4::ZERO);
                a.relative_position = update.position;
                a.velocity = update.velocity;
                a.acceleration = update.acceleration;
                a.relative_rotation = update.rotation;
                a.angular_velocity = update.angular_velocity;
            });
        }

        let merge_kinematics = |kin: &mut Kinematics| {
            kin.position = update.position;
            kin.velocity = update.velocity;
            kin.acceleration = update.acceleration;
            kin.rotation = update.rotation;
            kin.angular_velocity = update.angular_velocity;
            kin.collision_plane = update.collision_plane.unwrap_or(Vec4::ZERO);
        };

        if update.avatar {
            if self.settings.tracking.track_avatars {
                region.with_tables(|tables| {
                    // Terse updates can reference avatars not yet seen
                    // via a full update; track a placeholder.
                    let avatar = tables.avatar_entry(update.local_id, ObjectId::ZERO);
                    merge_kinematics(&mut avatar.kinematics);
                    if let Some(textures) = &update.textures {
                        avatar.textures = Some(textures.clone());
                    }
                });
            }
        } else if self.settings.tracking.track_objects {
            region.with_tables(|tables| {
                let prim = tables.prim_entry(update.local_id, ObjectId::ZERO);
                merge_kinematics(&mut prim.kinematics);
                if let Some(textures) = &update.textures {
                    prim.textures = Some(textures.clone());
                }
            });
        }

        self.events.terse_updated.emit(MovementApplied {
            region_handle: region.handle(),
            time_dilation: dilation,
            update,
        });
        Ok(())
    }

    // -----------------------------------------------------------------
    // Compressed updates
    // -----------------------------------------------------------------

    /// Applies a compressed update batch. Unlike full and terse
    /// batches, compressed batches do not refresh the region's time
    /// dilation.
    pub fn handle_compressed_update(&self, batch: &CompressedUpdateBatch) {
        let region = self.world.region(batch.region_handle);
        let dilation = dilation_to_f32(batch.time_dilation);

        for block in &batch.blocks {
            if let Err(error) = self.apply_compressed_block(&region, dilation, block) {
                warn!(%error, "skipping compressed update block");
            }
        }
    }

    fn apply_compressed_block(
        &self,
        region: &Region,
        dilation: f32,
        block: &CompressedBlock,
    ) -> Result<(), DecodeError> {
        // The kind byte sits right after the two ids; peek it so the
        // relevance filter can skip the full decode.
        if !self.settings.decode.always_decode_objects
            && let Some(&pcode_byte) = block.data.get(20)
        {
            let relevant = match PCode::from_u8(pcode_byte) {
                Some(pcode) if pcode.is_foliage() => self.events.foliage_updated.has_subscribers(),
                Some(PCode::Prim) => {
                    self.events.prim_updated.has_subscribers()
                        || self.events.attachment_updated.has_subscribers()
                }
                _ => true,
            };
            if !relevant {
                return Ok(());
            }
        }

        let obj = decode_compressed_block(&block.data)?;

        let apply = |prim: &mut Prim| {
            merge_compressed(prim, &obj, block.update_flags, region.handle());
        };

        let snapshot = if self.settings.tracking.track_objects {
            region.with_tables(|tables| {
                let prim = tables.prim_entry(obj.local_id, obj.full_id);
                apply(prim);
                prim.clone()
            })
        } else {
            let mut prim = Prim::placeholder(obj.local_id, obj.full_id);
            apply(&mut prim);
            prim
        };

        let event = PrimUpdated {
            region_handle: region.handle(),
            time_dilation: dilation,
            prim: snapshot,
        };
        // Attachment status: name values present plus a parent link.
        if obj.flags.contains(CompressedFlags::HAS_NAME_VALUES) && obj.parent_local_id != 0 {
            self.events.attachment_updated.emit(event);
        } else if obj.flags.contains(CompressedFlags::TREE) || obj.pcode.is_foliage() {
            self.events.foliage_updated.emit(event);
        } else {
            self.events.prim_updated.emit(event);
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Cached updates
    // -----------------------------------------------------------------

    /// Handles a cached-update batch with the always-miss cache policy:
    /// every referenced id is re-requested. A real CRC cache belongs to
    /// the embedding application.
    pub fn handle_cached_update(&self, batch: &CachedUpdateBatch) {
        if !self.settings.decode.always_request_objects {
            return;
        }
        let ids: Vec<u32> = batch.blocks.iter().map(|b| b.id).collect();
        if !ids.is_empty() {
            self.requests.request_objects(batch.region_handle, &ids);
        }
    }

    // -----------------------------------------------------------------
    // Kill
    // -----------------------------------------------------------------

    /// Removes objects and everything seated on or linked to them.
    /// Kill notifications fire before the tables are mutated.
    pub fn handle_kill(&self, region_handle: u64, kill: &KillBatch) {
        let region = self.world.region(region_handle);

        for &local_id in &kill.ids {
            self.events.object_killed.emit(ObjectKilled {
                region_handle,
                local_id,
            });
        }

        region.with_tables(|tables| {
            for &local_id in &kill.ids {
                tables.remove_cascade(
                    local_id,
                    self.settings.tracking.track_objects,
                    self.settings.tracking.track_avatars,
                    |child_id| {
                        self.events.object_killed.emit(ObjectKilled {
                            region_handle,
                            local_id: child_id,
                        });
                    },
                );
            }
        });
    }

    // -----------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------

    /// Merges property payloads into tracked prims and re-emits them.
    pub fn handle_object_properties(&self, region_handle: u64, batch: &ObjectPropertiesBatch) {
        let region = self.world.region(region_handle);

        for properties in &batch.blocks {
            if self.settings.tracking.track_objects {
                region.with_tables(|tables| {
                    if let Some(prim) = tables.prim_by_full_id(properties.object_id) {
                        prim.properties = Some(properties.clone());
                    }
                });
            }
            self.events.object_properties.emit(PropertiesReceived {
                region_handle,
                properties: properties.clone(),
            });
        }
    }

    /// Merges a family-properties payload and re-emits it.
    pub fn handle_object_properties_family(
        &self,
        region_handle: u64,
        properties: &ObjectPropertiesFamily,
    ) {
        let region = self.world.region(region_handle);

        if self.settings.tracking.track_objects {
            region.with_tables(|tables| {
                if let Some(prim) = tables.prim_by_full_id(properties.object_id) {
                    prim.properties_family = Some(properties.clone());
                }
            });
        }
        self.events
            .object_properties_family
            .emit(PropertiesFamilyReceived {
                region_handle,
                properties: properties.clone(),
            });
    }

    /// Re-emits a pay-price reply.
    pub fn handle_pay_price_reply(&self, region_handle: u64, reply: &PayPriceReply) {
        self.events.pay_price.emit(PayPriceReceived {
            region_handle,
            reply: reply.clone(),
        });
    }
}

/// Compressed merge policy. Sections the block did not carry leave the
/// tracked value alone, except parent (reset to 0 when absent) and
/// floating text (cleared when absent), which the wire treats as
/// always-authoritative.
fn merge_compressed(
    prim: &mut Prim,
    obj: &CompressedObject,
    update_flags: UpdateFlags,
    region_handle: u64,
) {
    prim.local_id = obj.local_id;
    prim.full_id = obj.full_id;
    prim.region_handle = region_handle;
    prim.flags = update_flags;
    prim.crc = obj.crc;
    prim.kinematics.position = obj.position;
    prim.kinematics.rotation = obj.rotation;
    prim.scale = obj.scale;
    prim.click_action = obj.click_action;

    if obj.pcode.is_foliage() {
        // Foliage blocks stop after the transform; leave the rest of
        // the tracked state alone.
        prim.construction.state = obj.state;
        prim.construction.material = obj.material;
        prim.construction.pcode = Some(obj.pcode);
        return;
    }

    prim.construction = obj.construction;
    prim.owner_id = obj.owner_id;
    if let Some(angular_velocity) = obj.angular_velocity {
        prim.kinematics.angular_velocity = angular_velocity;
    }
    prim.parent_local_id = obj.parent_local_id;
    if obj.flags.contains(CompressedFlags::TREE) {
        prim.tree_species = obj.tree_species;
    }
    if let Some(pad) = &obj.scratch_pad {
        prim.scratch_pad = pad.clone();
    }
    prim.text = obj.text.clone();
    if obj.flags.contains(CompressedFlags::HAS_TEXT) {
        prim.text_color = obj.text_color;
    }
    if let Some(url) = &obj.media_url {
        prim.media_url = url.clone();
    }
    if let Some(particles) = &obj.particles {
        prim.particles = particles.clone();
    }
    prim.extra_params = obj.extra_params.clone();
    if let Some(sound) = obj.sound {
        prim.sound = sound;
    }
    if obj.flags.contains(CompressedFlags::HAS_NAME_VALUES) {
        prim.name_values = obj.name_values.clone();
    }
    if let Some(textures) = &obj.textures {
        prim.textures = Some(textures.clone());
    }
    if let Some(anim) = obj.texture_anim {
        prim.texture_anim = Some(anim);
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
