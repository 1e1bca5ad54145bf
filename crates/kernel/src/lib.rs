//! Shield kernel: impact bookkeeping and the per-frame tick contract.
//!
//! # Invariants
//! - The impact buffer always holds exactly [`IMPACT_CAPACITY`] slots.
//! - Readers only ever see whole snapshots; a record replaces the buffer at once.
//! - Impacts and frames are stamped from the same scene clock.

pub mod config;
pub mod impact;
pub mod scene;

pub use config::{ConfigError, SceneConfig};
pub use impact::{
    IMPACT_CAPACITY, ImpactBuffer, ImpactEvent, ImpactSnapshot, RIPPLE_LIFETIME, SENTINEL_TIME,
};
pub use scene::{ShieldParameters, ShieldScene};
