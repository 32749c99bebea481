//! Object and avatar state synchronization.
//!
//! Maintains the live per-region object tables, reconciles decoded
//! wire updates into them, dead-reckons motion between authoritative
//! updates, and fans change notifications out to subscribers.
//!
//! All table access is synchronized per region: update handlers and the
//! interpolation timer share one mutex per region, held only for the
//! table mutation itself. Decoding happens outside any lock.

pub mod agent;
pub mod events;
pub mod interpolate;
pub mod object;
pub mod region;
pub mod requests;
pub mod sync;

pub use object::{Avatar, Kinematics, Prim};
pub use region::{Region, World};
pub use sync::ObjectSync;
