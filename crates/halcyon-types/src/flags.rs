//! Flag words carried by object update packets.
//!
//! Each flag type is a thin newtype over its wire integer. Combines via
//! bitwise OR; test membership with `contains`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UpdateFlags
// ---------------------------------------------------------------------------

/// Primary object flags sent with full and compressed updates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UpdateFlags(pub u32);

impl UpdateFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Physics are enabled for this object.
    pub const PHYSICS: Self = Self(0x0000_0001);
    /// Object was rezzed in a selected state; the server only sends the
    /// properties payload in response to an explicit select.
    pub const CREATE_SELECTED: Self = Self(0x0000_0002);
    pub const OBJECT_MODIFY: Self = Self(0x0000_0004);
    pub const OBJECT_COPY: Self = Self(0x0000_0008);
    pub const OBJECT_ANY_OWNER: Self = Self(0x0000_0010);
    pub const OBJECT_YOU_OWNER: Self = Self(0x0000_0020);
    /// Object contains a running script.
    pub const SCRIPTED: Self = Self(0x0000_0040);
    /// Object contains an active touch script.
    pub const TOUCH: Self = Self(0x0000_0080);
    pub const OBJECT_MOVE: Self = Self(0x0000_0100);
    /// Object can receive payments.
    pub const MONEY: Self = Self(0x0000_0200);
    /// Object is phantom (no collisions).
    pub const PHANTOM: Self = Self(0x0000_0400);
    pub const INVENTORY_EMPTY: Self = Self(0x0000_0800);
    pub const JOINT_HINGE: Self = Self(0x0000_1000);
    pub const JOINT_P2P: Self = Self(0x0000_2000);
    pub const JOINT_LP2P: Self = Self(0x0000_4000);
    pub const ALLOW_INVENTORY_DROP: Self = Self(0x0001_0000);
    pub const OBJECT_TRANSFER: Self = Self(0x0002_0000);
    pub const OBJECT_GROUP_OWNED: Self = Self(0x0004_0000);
    pub const CAMERA_DECOUPLED: Self = Self(0x0010_0000);
    pub const ANIM_SOURCE: Self = Self(0x0020_0000);
    pub const CAMERA_SOURCE: Self = Self(0x0040_0000);
    pub const CAST_SHADOWS: Self = Self(0x0080_0000);
    pub const OBJECT_OWNER_MODIFY: Self = Self(0x1000_0000);
    pub const TEMPORARY_ON_REZ: Self = Self(0x2000_0000);
    pub const TEMPORARY: Self = Self(0x4000_0000);
    /// Block payload is zlib-compressed; not decoded by this library.
    pub const ZLIB_COMPRESSED: Self = Self(0x8000_0000);

    /// Returns `true` if `self` contains all bits in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no bits are set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for UpdateFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ---------------------------------------------------------------------------
// CompressedFlags
// ---------------------------------------------------------------------------

/// Bitmask at the head of a compressed update block declaring which
/// optional sections follow. Sections appear in the byte stream in the
/// fixed order documented on each constant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompressedFlags(pub u32);

impl CompressedFlags {
    /// No optional sections present.
    pub const NONE: Self = Self(0);
    /// Length-prefixed opaque scratch pad data.
    pub const SCRATCH_PAD: Self = Self(0x01);
    /// Single tree-species byte.
    pub const TREE: Self = Self(0x02);
    /// Floating text (NUL-terminated) plus a 4-byte color.
    pub const HAS_TEXT: Self = Self(0x04);
    /// 86-byte particle system block.
    pub const HAS_PARTICLES: Self = Self(0x08);
    /// Sound id, gain, flags, and radius.
    pub const HAS_SOUND: Self = Self(0x10);
    /// 4-byte parent local id (absent means parent 0).
    pub const HAS_PARENT: Self = Self(0x20);
    /// Texture animation block.
    pub const TEXTURE_ANIMATION: Self = Self(0x40);
    /// 12-byte angular velocity vector.
    pub const HAS_ANGULAR_VELOCITY: Self = Self(0x80);
    /// NUL-terminated name/value record block.
    pub const HAS_NAME_VALUES: Self = Self(0x100);
    /// NUL-terminated media URL.
    pub const MEDIA_URL: Self = Self(0x200);

    /// Returns `true` if `self` contains all bits in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no bits are set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CompressedFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for CompressedFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ---------------------------------------------------------------------------
// SoundFlags
// ---------------------------------------------------------------------------

/// Flags for sounds attached to a primitive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoundFlags(pub u8);

impl SoundFlags {
    pub const NONE: Self = Self(0);
    pub const LOOP: Self = Self(0x01);
    pub const SYNC_MASTER: Self = Self(0x02);
    pub const SYNC_SLAVE: Self = Self(0x04);
    pub const SYNC_PENDING: Self = Self(0x08);
    pub const QUEUE: Self = Self(0x10);
    pub const STOP: Self = Self(0x20);

    /// Returns `true` if `self` contains all bits in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}
