use borgshield_common::Ray;
use borgshield_kernel::ShieldScene;
use glam::{Vec2, Vec3};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
        }
    }
}

impl RenderView {
    /// Orthonormal (forward, right, up) basis of the view.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or_zero();
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < 1e-12 {
            // Looking straight up or down.
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        (forward, right, up)
    }

    /// World-space ray through a point in normalized device coordinates.
    ///
    /// `ndc` spans `[-1, 1]` on both axes with +y up; `aspect` is width / height.
    pub fn ray(&self, ndc: Vec2, aspect: f32) -> Ray {
        let (forward, right, up) = self.basis();
        let tan_half = (self.fov_degrees.to_radians() * 0.5).tan();
        let dir = forward + right * (ndc.x * tan_half * aspect) + up * (ndc.y * tan_half);
        Ray::new(self.eye, dir)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(&self, scene: &ShieldScene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene state.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &ShieldScene, view: &RenderView) -> String {
        let now = scene.elapsed();
        let euler = scene.cube_euler();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Shield Scene (frame={}, t={:.3}s) ===\n",
            scene.frame(),
            now
        ));
        out.push_str(&format!(
            "Cube rotation: ({:.3}, {:.3}, {:.3}) rad\n",
            euler.x, euler.y, euler.z
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        out.push_str(&format!(
            "Impacts: {} active\n",
            scene.impacts().active_count(now)
        ));

        for (slot, impact) in scene.impacts().slots().iter().enumerate() {
            if impact.is_sentinel() {
                out.push_str(&format!("  [{slot}] empty\n"));
                continue;
            }
            let age = impact.age_at(now);
            let p = impact.position;
            out.push_str(&format!(
                "  [{slot}] pos=({:.2}, {:.2}, {:.2}) age={:.2}s radius={:.2} {}\n",
                p.x,
                p.y,
                p.z,
                age,
                (age * crate::shield::RING_SPEED).max(0.0),
                if impact.is_active_at(now) { "active" } else { "spent" }
            ));
        }

        out
    }
}
