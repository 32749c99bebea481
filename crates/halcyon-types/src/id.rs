//! Object identifiers.
//!
//! Every object in the world carries two identifiers: a region-local
//! `u32` (compact, reused after removal) and a persistent [`ObjectId`]
//! that is stable across regions and sessions. Tables key on the local
//! id; the global id is carried as a field.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistent, globally unique object identifier (128-bit GUID on the
/// wire, stored raw byte order).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// The all-zero id, used for "no object" and placeholder entries.
    pub const ZERO: Self = Self(Uuid::nil());

    /// Builds an id from 16 raw wire bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns `true` if this is the zero id.
    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_id_is_nil() {
        assert!(ObjectId::ZERO.is_zero());
        assert_eq!(ObjectId::default(), ObjectId::ZERO);
    }

    #[test]
    fn test_from_bytes_preserves_wire_order() {
        let bytes: [u8; 16] = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
            0x0F, 0x10,
        ];
        let id = ObjectId::from_bytes(bytes);
        assert_eq!(id.0.as_bytes(), &bytes);
        assert!(!id.is_zero());
    }
}
