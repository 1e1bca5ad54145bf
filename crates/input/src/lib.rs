//! Input: raw pointer/keyboard events mapped to actions, and fire rays turned
//! into world-space impact points.
//!
//! # Invariants
//! - Only the nearest surface along a firing ray is reported.
//! - A ray that hits nothing yields no point; it is not an error.

pub mod action;
pub mod pick;

pub use action::Action;
pub use pick::{PickHit, PickTarget, fire, pick_nearest, scene_targets};

pub fn crate_info() -> &'static str {
    "borgshield-input v0.1.0"
}
