//! Pure wire decoders for simulator object-update messages.
//!
//! Three encodings carry object state: full updates (fixed-width packed
//! kinematics in one of three precisions), terse updates (dense
//! kinematic deltas), and compressed updates (variable-length,
//! flag-driven). Every decoder is a pure function from bytes to typed
//! data; failures are scoped to a single object and never abort a
//! batch.

pub mod compressed;
pub mod cursor;
pub mod error;
pub mod extra;
pub mod messages;
pub mod movement;
pub mod quant;
pub mod terse;
pub mod texture;

pub use error::DecodeError;
pub use movement::MovementUpdate;
