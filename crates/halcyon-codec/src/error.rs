//! Decode error taxonomy.

/// Errors produced while decoding a single object block. All variants
/// are recoverable: the reconciler logs a warning, skips the object,
/// and continues with the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The block ended before a read completed.
    #[error("block truncated: needed {needed} bytes at offset {offset}, {have} remain")]
    Truncated {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the block.
        have: usize,
        /// Offset the read started at.
        offset: usize,
    },

    /// The packed-kinematics field had a length no encoding matches.
    #[error("unrecognized movement block length {0}")]
    UnknownMovementLength(usize),

    /// The object kind discriminant is not a known PCode.
    #[error("unrecognized object kind code {0}")]
    UnknownPCode(u8),

    /// The compressed encoding does not define a layout for this kind.
    #[error("no compressed layout for object kind code {0}")]
    UnsupportedCompressedKind(u8),
}
