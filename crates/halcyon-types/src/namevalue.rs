//! Name/value metadata records.
//!
//! Avatars and attachments carry a newline-delimited block of records,
//! each `name type class sendto value`. The value occupies the rest of
//! the record and may contain spaces. Attachment status is signalled by
//! the presence of an `AttachItemID` record.

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record fields
// ---------------------------------------------------------------------------

/// Declared type of a record's value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameValueType {
    /// Plain string (also the fallback for unknown type tags).
    #[default]
    String,
    F32,
    S32,
    Vec3,
    U32,
    U64,
    /// String designated as an asset id.
    Asset,
}

impl NameValueType {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "F32" => Self::F32,
            "S32" => Self::S32,
            "VEC3" => Self::Vec3,
            "U32" => Self::U32,
            "U64" => Self::U64,
            "ASSET" => Self::Asset,
            _ => Self::String,
        }
    }
}

/// Access class of a record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameValueClass {
    #[default]
    ReadOnly,
    ReadWrite,
    Callback,
}

impl NameValueClass {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "RW" => Self::ReadWrite,
            "CB" => Self::Callback,
            _ => Self::ReadOnly,
        }
    }
}

/// Distribution target of a record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameValueSendto {
    #[default]
    Sim,
    DataSim,
    SimViewer,
    DataSimViewer,
}

impl NameValueSendto {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "DS" => Self::DataSim,
            "SV" => Self::SimViewer,
            "DSV" => Self::DataSimViewer,
            _ => Self::Sim,
        }
    }
}

/// A record's parsed value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum NameValueData {
    String(String),
    F32(f32),
    S32(i32),
    Vec3(Vec3),
    U32(u32),
    U64(u64),
}

// ---------------------------------------------------------------------------
// NameValue
// ---------------------------------------------------------------------------

/// One parsed name/value record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NameValue {
    /// Record name, e.g. `FirstName` or `AttachItemID`.
    pub name: String,
    /// Declared value type.
    pub value_type: NameValueType,
    /// Access class.
    pub class: NameValueClass,
    /// Distribution target.
    pub sendto: NameValueSendto,
    /// Parsed value. Unparseable numerics fall back to zero, matching
    /// the tolerant wire behavior.
    pub value: NameValueData,
}

impl NameValue {
    /// Parses a single record. Returns `None` for records without a
    /// name/body separator.
    pub fn parse(record: &str) -> Option<Self> {
        let mut parts = record.splitn(5, [' ', '\t', '\r']);
        let name = parts.next().filter(|n| !n.is_empty())?;
        let value_type = NameValueType::from_tag(parts.next()?);
        let class = parts.next().map(NameValueClass::from_tag).unwrap_or_default();
        let sendto = parts.next().map(NameValueSendto::from_tag).unwrap_or_default();
        let raw = parts.next().unwrap_or_default();

        let value = match value_type {
            NameValueType::String | NameValueType::Asset => {
                NameValueData::String(raw.to_owned())
            }
            NameValueType::F32 => NameValueData::F32(raw.trim().parse().unwrap_or(0.0)),
            NameValueType::S32 => NameValueData::S32(raw.trim().parse().unwrap_or(0)),
            NameValueType::U32 => NameValueData::U32(raw.trim().parse().unwrap_or(0)),
            NameValueType::U64 => NameValueData::U64(raw.trim().parse().unwrap_or(0)),
            NameValueType::Vec3 => {
                let mut it = raw
                    .trim_matches(|c| c == '<' || c == '>' || c == ' ')
                    .split(',')
                    .map(|s| s.trim().parse::<f32>().unwrap_or(0.0));
                let x = it.next().unwrap_or(0.0);
                let y = it.next().unwrap_or(0.0);
                let z = it.next().unwrap_or(0.0);
                NameValueData::Vec3(Vec3::new(x, y, z))
            }
        };

        Some(Self {
            name: name.to_owned(),
            value_type,
            class,
            sendto,
            value,
        })
    }

    /// Parses a newline-delimited block of records, skipping empty and
    /// malformed lines.
    pub fn parse_block(block: &str) -> Vec<Self> {
        block.split('\n').filter_map(Self::parse).collect()
    }
}

/// Returns `true` if the records mark the object as an avatar
/// attachment (an `AttachItemID` record is present).
pub fn has_attach_item_id(records: &[NameValue]) -> bool {
    records.iter().any(|nv| nv.name == "AttachItemID")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_avatar_names() {
        let block = "FirstName STRING R SV Jane\nLastName STRING R SV Doe";
        let records = NameValue::parse_block(block);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "FirstName");
        assert_eq!(records[0].value_type, NameValueType::String);
        assert_eq!(records[0].sendto, NameValueSendto::SimViewer);
        assert_eq!(records[0].value, NameValueData::String("Jane".to_owned()));
        assert_eq!(records[1].value, NameValueData::String("Doe".to_owned()));
    }

    #[test]
    fn test_value_keeps_embedded_spaces() {
        let nv = NameValue::parse("Title STRING RW SV Grand Vizier of Testing").unwrap();
        assert_eq!(
            nv.value,
            NameValueData::String("Grand Vizier of Testing".to_owned())
        );
    }

    #[test]
    fn test_typed_values() {
        let nv = NameValue::parse("Health F32 RW S 73.5").unwrap();
        assert_eq!(nv.value, NameValueData::F32(73.5));

        let nv = NameValue::parse("Score S32 RW S -12").unwrap();
        assert_eq!(nv.value, NameValueData::S32(-12));

        let nv = NameValue::parse("Offset VEC3 RW S <1.0, 2.0, 3.0>").unwrap();
        assert_eq!(nv.value, NameValueData::Vec3(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_attach_item_id_detection() {
        let block =
            "AttachItemID STRING RW SV c5a0cb5c-0000-4000-8000-000000000000\nAttachmentOffset VEC3 RW SV <0,0,0>";
        let records = NameValue::parse_block(block);
        assert!(has_attach_item_id(&records));

        let records = NameValue::parse_block("FirstName STRING R SV Jane");
        assert!(!has_attach_item_id(&records));
    }

    #[test]
    fn test_empty_and_malformed_lines_skipped() {
        let records = NameValue::parse_block("\n\nNameOnly\n");
        // "NameOnly" has no separator, so no record is produced for it.
        assert!(records.is_empty());
    }
}
