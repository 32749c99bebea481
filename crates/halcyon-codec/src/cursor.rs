//! Checked sequential reader over a wire block.

use glam::{Quat, Vec3, Vec4};
use halcyon_types::ObjectId;

use crate::error::DecodeError;

/// Sequential reader over a byte slice. Every read is bounds-checked
/// and returns [`DecodeError::Truncated`] instead of panicking, so an
/// index overrun in a malformed block stays scoped to that block.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Takes the next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                needed: len,
                have: self.remaining(),
                offset: self.offset,
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Reads a 16-byte global object id.
    pub fn read_object_id(&mut self) -> Result<ObjectId, DecodeError> {
        Ok(ObjectId::from_bytes(self.take_array()?))
    }

    /// Reads three little-endian floats.
    pub fn read_vec3(&mut self) -> Result<Vec3, DecodeError> {
        Ok(Vec3::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    /// Reads four little-endian floats.
    pub fn read_vec4(&mut self) -> Result<Vec4, DecodeError> {
        Ok(Vec4::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    /// Reads a normalized quaternion stored as three components, with W
    /// reconstructed to restore unit length.
    pub fn read_quat_normalized(&mut self) -> Result<Quat, DecodeError> {
        let x = self.read_f32_le()?;
        let y = self.read_f32_le()?;
        let z = self.read_f32_le()?;
        let xyz_sum = 1.0 - x * x - y * y - z * z;
        let w = if xyz_sum > 0.0 { xyz_sum.sqrt() } else { 0.0 };
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    /// Reads a NUL-terminated string, consuming the terminator. Invalid
    /// UTF-8 is replaced rather than rejected, matching the tolerant
    /// behavior expected of metadata fields.
    pub fn read_cstr(&mut self) -> Result<String, DecodeError> {
        let start = self.offset;
        while self.read_u8()? != 0 {}
        let bytes = &self.data[start..self.offset - 1];
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_read_reports_offsets() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        cursor.read_u8().unwrap();
        let err = cursor.read_u32_le().unwrap_err();
        match err {
            DecodeError::Truncated {
                needed,
                have,
                offset,
            } => {
                assert_eq!(needed, 4);
                assert_eq!(have, 2);
                assert_eq!(offset, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_vec3_little_endian() {
        let mut data = Vec::new();
        for f in [1.0f32, -2.5, 100.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_vec3().unwrap(), Vec3::new(1.0, -2.5, 100.0));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_normalized_quat_reconstructs_w() {
        // Identity rotation stored as (0, 0, 0) -> W = 1.
        let mut data = Vec::new();
        for f in [0.0f32, 0.0, 0.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        let q = ByteCursor::new(&data).read_quat_normalized().unwrap();
        assert_eq!(q, Quat::IDENTITY);

        // Components summing past unit length clamp W to zero.
        let mut data = Vec::new();
        for f in [1.0f32, 0.1, 0.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }
        let q = ByteCursor::new(&data).read_quat_normalized().unwrap();
        assert_eq!(q.w, 0.0);
    }

    #[test]
    fn test_cstr_stops_at_nul() {
        let mut cursor = ByteCursor::new(b"hello\0world\0");
        assert_eq!(cursor.read_cstr().unwrap(), "hello");
        assert_eq!(cursor.read_cstr().unwrap(), "world");
        // Missing terminator is a truncation error.
        let mut cursor = ByteCursor::new(b"dangling");
        assert!(matches!(
            cursor.read_cstr(),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
