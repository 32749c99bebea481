//! Extra parameter block decoding.
//!
//! Extra params extend the original flag byte space: a count byte,
//! then `(type: u16, length: u32, body)` records. Flexible, light, and
//! sculpt payloads are retained; unknown types are skipped by length.

use serde::{Deserialize, Serialize};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

const PARAM_FLEXIBLE: u16 = 0x10;
const PARAM_LIGHT: u16 = 0x20;
const PARAM_SCULPT: u16 = 0x30;

/// Decoded extra parameter payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtraParams {
    /// Flexible-path parameters, raw payload.
    pub flexible: Option<Vec<u8>>,
    /// Light emission parameters, raw payload.
    pub light: Option<Vec<u8>>,
    /// Sculpted-prim parameters, raw payload.
    pub sculpt: Option<Vec<u8>>,
}

/// Decodes an extra parameter block in place, leaving the cursor after
/// the block. An exhausted cursor decodes as no parameters.
pub fn decode_extra_params(cursor: &mut ByteCursor<'_>) -> Result<ExtraParams, DecodeError> {
    let mut params = ExtraParams::default();
    if cursor.remaining() == 0 {
        return Ok(params);
    }

    let count = cursor.read_u8()?;
    for _ in 0..count {
        let param_type = cursor.read_u16_le()?;
        let length = cursor.read_u32_le()? as usize;
        let body = cursor.take(length)?;

        match param_type {
            PARAM_FLEXIBLE => params.flexible = Some(body.to_vec()),
            PARAM_LIGHT => params.light = Some(body.to_vec()),
            PARAM_SCULPT => params.sculpt = Some(body.to_vec()),
            _ => {}
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(param_type: u16, body: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&param_type.to_le_bytes());
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_recognized_params_are_kept() {
        let mut data = vec![2u8];
        data.extend(record(PARAM_LIGHT, &[1, 2, 3, 4]));
        data.extend(record(PARAM_SCULPT, &[5, 6]));

        let mut cursor = ByteCursor::new(&data);
        let params = decode_extra_params(&mut cursor).unwrap();
        assert_eq!(params.light.as_deref(), Some(&[1, 2, 3, 4][..]));
        assert_eq!(params.sculpt.as_deref(), Some(&[5, 6][..]));
        assert!(params.flexible.is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_unknown_param_skipped_by_length() {
        let mut data = vec![2u8];
        data.extend(record(0x99, &[0xAA; 7]));
        data.extend(record(PARAM_FLEXIBLE, &[1]));

        let mut cursor = ByteCursor::new(&data);
        let params = decode_extra_params(&mut cursor).unwrap();
        assert_eq!(params.flexible.as_deref(), Some(&[1][..]));
    }

    #[test]
    fn test_empty_cursor_is_no_params() {
        let mut cursor = ByteCursor::new(&[]);
        assert_eq!(
            decode_extra_params(&mut cursor).unwrap(),
            ExtraParams::default()
        );
    }

    #[test]
    fn test_overlong_record_is_truncation() {
        let mut data = vec![1u8];
        data.extend_from_slice(&PARAM_LIGHT.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.push(0);

        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            decode_extra_params(&mut cursor),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
