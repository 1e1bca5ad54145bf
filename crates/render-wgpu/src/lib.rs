//! wgpu render backend for the shield scene.
//!
//! Renders a starfield, the rotating cube and the translucent shield shell.
//! The camera orbits the cube with clamped distance and no panning.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - The shield is drawn last, additively, without writing depth.
//! - Camera motion is not part of the scene.

mod camera;
mod context;
mod gpu;
mod mesh;
mod shaders;
mod stars;

pub use camera::OrbitCamera;
pub use context::{GpuContext, GpuInitError};
pub use gpu::WgpuRenderer;
pub use stars::{Star, StarfieldConfig, starfield};
