//! Shield rendering: the per-point shading function and renderers built on it.
//!
//! # Invariants
//! - Shading is a pure function of the surface point and [`ShieldParameters`].
//! - Renderers read the scene; they never mutate it.
//! - The WGSL shield shader in `borgshield-render-wgpu` implements the same
//!   formula as [`shield::shade`].
//!
//! [`ShieldParameters`]: borgshield_kernel::ShieldParameters

mod renderer;
pub mod shield;
mod software;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use shield::{ShadingInput, ShieldSample, shade};
pub use software::{ShieldFrame, SoftwareShieldRenderer};

pub fn crate_info() -> &'static str {
    "borgshield-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
