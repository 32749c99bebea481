//! Shared protocol types for the halcyon virtual-world client library.
//!
//! Identifier types, wire enums and flag words, name/value metadata,
//! primitive construction (shape) parameters, and texture entry
//! structures. Everything here is plain data; wire decoding lives in
//! `halcyon-codec`.

pub mod color;
pub mod construction;
pub mod enums;
pub mod flags;
pub mod id;
pub mod namevalue;
pub mod texture;

pub use color::Color4;
pub use enums::PCode;
pub use id::ObjectId;
