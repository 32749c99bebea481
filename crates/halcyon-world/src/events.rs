//! Change notification fan-out.
//!
//! Each event kind is a [`Topic`]: subscribers get their own channel
//! receiver, and every emit clones the snapshot into each live channel.
//! Dropping a receiver unsubscribes; dead senders are pruned on the
//! next emit. Payloads are owned snapshots, never live references into
//! the tables.

use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

use halcyon_codec::messages::{ObjectProperties, ObjectPropertiesFamily, PayPriceReply};
use halcyon_codec::movement::MovementUpdate;
use halcyon_types::id::ObjectId;

use crate::object::{Avatar, Prim};

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A single event kind's subscriber list.
#[derive(Debug)]
pub struct Topic<T> {
    senders: Mutex<Vec<Sender<T>>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> Topic<T> {
    /// Creates a topic with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. The returned receiver is the
    /// subscription handle: drop it to unsubscribe.
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.push(tx);
        rx
    }

    /// Returns `true` if any subscriber is registered. May count a
    /// just-dropped receiver until the next emit prunes it, which only
    /// makes relevance filtering conservative.
    pub fn has_subscribers(&self) -> bool {
        let senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        !senders.is_empty()
    }

    /// Delivers `value` to every live subscriber, pruning channels
    /// whose receiver has been dropped.
    pub fn emit(&self, value: T) {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        senders.retain(|sender| sender.send(value.clone()).is_ok());
    }
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// A primitive (or foliage, or attachment) was created or updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrimUpdated {
    pub region_handle: u64,
    /// Region time dilation at delivery, 0..1.
    pub time_dilation: f32,
    /// Snapshot of the tracked state after the merge.
    pub prim: Prim,
}

/// An avatar was created or updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AvatarUpdated {
    pub region_handle: u64,
    pub time_dilation: f32,
    /// Snapshot of the tracked state after the merge.
    pub avatar: Avatar,
}

/// A movement delta was applied (terse update), or a full update's
/// movement block decoded (raw pre-merge hook).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MovementApplied {
    pub region_handle: u64,
    pub time_dilation: f32,
    /// The decoded movement data.
    pub update: MovementUpdate,
}

/// An object was removed from its region.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectKilled {
    pub region_handle: u64,
    /// Local id of the removed object.
    pub local_id: u32,
}

/// An avatar sat down, stood up, or changed seats.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitChanged {
    pub region_handle: u64,
    /// Local id of the avatar.
    pub avatar_local_id: u32,
    /// Global id of the avatar.
    pub avatar_id: ObjectId,
    /// New seat local id; 0 means standing.
    pub sitting_on: u32,
    /// Previous seat local id.
    pub old_seat: u32,
}

/// Object properties arrived (select response).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PropertiesReceived {
    pub region_handle: u64,
    pub properties: ObjectProperties,
}

/// Object family properties arrived.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PropertiesFamilyReceived {
    pub region_handle: u64,
    pub properties: ObjectPropertiesFamily,
}

/// Pay-price information arrived for an object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PayPriceReceived {
    pub region_handle: u64,
    pub reply: PayPriceReply,
}

// ---------------------------------------------------------------------------
// Events registry
// ---------------------------------------------------------------------------

/// All event topics the synchronization core emits on.
#[derive(Debug, Default)]
pub struct Events {
    /// Full or compressed update for an unattached prim.
    pub prim_updated: Topic<PrimUpdated>,
    /// Full or compressed update for an avatar attachment.
    pub attachment_updated: Topic<PrimUpdated>,
    /// Full or compressed update for grass or trees.
    pub foliage_updated: Topic<PrimUpdated>,
    /// Full update for an avatar.
    pub avatar_updated: Topic<AvatarUpdated>,
    /// Terse movement delta applied.
    pub terse_updated: Topic<MovementApplied>,
    /// Raw movement block decoded from a full update, pre-merge.
    pub raw_block_updated: Topic<MovementApplied>,
    /// Object removed.
    pub object_killed: Topic<ObjectKilled>,
    /// Avatar seat changed.
    pub sit_changed: Topic<SitChanged>,
    /// Object properties received.
    pub object_properties: Topic<PropertiesReceived>,
    /// Object family properties received.
    pub object_properties_family: Topic<PropertiesFamilyReceived>,
    /// Pay-price reply received.
    pub pay_price: Topic<PayPriceReceived>,
}

impl Events {
    /// Creates a registry with no subscribers on any topic.
    pub fn new() -> Self {
        Self::default()
    }
}
