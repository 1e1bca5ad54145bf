//! Shared value types and geometry used by every borgshield crate.
//!
//! # Invariants
//! - Everything here is a plain value: `Copy`, no interior state.
//! - Geometry is world-space, right-handed, Y up.

pub mod geometry;
pub mod types;

pub use geometry::{BoxFace, OrientedBox, Ray, RayHit};
pub use types::{ColorParseError, Rgb, Transform};

pub fn crate_info() -> &'static str {
    "borgshield-common v0.1.0"
}
