//! Texture entry and texture animation structures.
//!
//! A texture entry describes the default face plus per-face overrides
//! for up to [`MAX_FACES`] faces. On the wire each property is encoded
//! as a default value followed by face-bitfield runs; decoding lives in
//! `halcyon-codec`.

use serde::{Deserialize, Serialize};

use crate::color::Color4;
use crate::id::ObjectId;

/// Maximum number of faces a texture entry can address.
pub const MAX_FACES: usize = 32;

// ---------------------------------------------------------------------------
// TextureFace
// ---------------------------------------------------------------------------

/// Texture parameters for a single face.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TextureFace {
    /// Texture asset id.
    pub texture_id: ObjectId,
    /// Face tint.
    pub rgba: Color4,
    /// Horizontal repeats per face.
    pub repeat_u: f32,
    /// Vertical repeats per face.
    pub repeat_v: f32,
    /// Horizontal offset, -1..1.
    pub offset_u: f32,
    /// Vertical offset, -1..1.
    pub offset_v: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Packed bump/shiny/fullbright byte.
    pub material: u8,
    /// Packed media-flags/mapping byte.
    pub media: u8,
    /// Glow intensity, 0..1.
    pub glow: f32,
}

impl Default for TextureFace {
    fn default() -> Self {
        Self {
            texture_id: ObjectId::ZERO,
            rgba: Color4 {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 1.0,
            },
            repeat_u: 1.0,
            repeat_v: 1.0,
            offset_u: 0.0,
            offset_v: 0.0,
            rotation: 0.0,
            material: 0,
            media: 0,
            glow: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TextureEntry
// ---------------------------------------------------------------------------

/// Complete texture state for an object: one default face plus sparse
/// per-face overrides.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TextureEntry {
    /// Parameters applied to every face without an override.
    pub default_face: TextureFace,
    /// Per-face overrides, indexed by face number.
    pub faces: Vec<Option<TextureFace>>,
}

impl TextureEntry {
    /// Returns the effective parameters for `index`: the override if one
    /// exists, otherwise the default face.
    pub fn face(&self, index: usize) -> &TextureFace {
        self.faces
            .get(index)
            .and_then(Option::as_ref)
            .unwrap_or(&self.default_face)
    }

    /// Returns the override slot for `index`, creating it from the
    /// default face if absent. Indexes at or above [`MAX_FACES`] return
    /// `None`.
    pub fn face_mut(&mut self, index: usize) -> Option<&mut TextureFace> {
        if index >= MAX_FACES {
            return None;
        }
        if self.faces.len() <= index {
            self.faces.resize(index + 1, None);
        }
        let default = self.default_face;
        Some(self.faces[index].get_or_insert(default))
    }
}

// ---------------------------------------------------------------------------
// TextureAnimation
// ---------------------------------------------------------------------------

/// Texture animation settings for a primitive (16-byte wire block).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureAnimation {
    /// Animation mode flags.
    pub flags: u8,
    /// Face the animation applies to (255 = all).
    pub face: u8,
    /// Horizontal frame count.
    pub size_x: u8,
    /// Vertical frame count.
    pub size_y: u8,
    /// Start offset.
    pub start: f32,
    /// Animation length.
    pub length: f32,
    /// Frame rate.
    pub rate: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_falls_back_to_default() {
        let entry = TextureEntry::default();
        assert_eq!(entry.face(3), &entry.default_face);
    }

    #[test]
    fn test_face_mut_creates_override() {
        let mut entry = TextureEntry::default();
        entry.face_mut(2).unwrap().repeat_u = 4.0;
        assert_eq!(entry.face(2).repeat_u, 4.0);
        // Other faces are untouched.
        assert_eq!(entry.face(1).repeat_u, 1.0);
    }

    #[test]
    fn test_face_mut_rejects_out_of_range() {
        let mut entry = TextureEntry::default();
        assert!(entry.face_mut(MAX_FACES).is_none());
    }
}
