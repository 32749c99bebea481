//! RGBA color as carried on the wire.

use serde::{Deserialize, Serialize};

/// Normalized RGBA color. Wire encoding is one byte per channel; some
/// fields store the channels inverted (`0xFF - value`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    /// Fully transparent black.
    pub const ZERO: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Decodes four wire bytes. `inverted` flips every channel,
    /// `alpha_inverted` flips the alpha channel back again (used by
    /// floating-text colors, which invert only the color channels).
    pub fn from_bytes(bytes: [u8; 4], inverted: bool, alpha_inverted: bool) -> Self {
        let channel = |b: u8| {
            if inverted {
                f32::from(0xFF - b) / 255.0
            } else {
                f32::from(b) / 255.0
            }
        };
        let alpha = |b: u8| {
            if inverted != alpha_inverted {
                f32::from(0xFF - b) / 255.0
            } else {
                f32::from(b) / 255.0
            }
        };
        Self {
            r: channel(bytes[0]),
            g: channel(bytes[1]),
            b: channel(bytes[2]),
            a: alpha(bytes[3]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_decode() {
        let c = Color4::from_bytes([255, 0, 128, 255], false, false);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_inverted_decode() {
        // Opaque black stored inverted: 0xFF 0xFF 0xFF 0x00.
        let c = Color4::from_bytes([0xFF, 0xFF, 0xFF, 0x00], true, false);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_alpha_reinverted_decode() {
        let c = Color4::from_bytes([0xFF, 0xFF, 0xFF, 0xFF], true, true);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.a, 1.0);
    }
}
