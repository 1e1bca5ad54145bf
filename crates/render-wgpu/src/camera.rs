use borgshield_common::Ray;
use borgshield_render::RenderView;
use glam::{Mat4, Vec2, Vec3};

/// Orbit camera circling a fixed target.
/// Camera motion is cosmetic; it never feeds back into the scene.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    /// Fractional distance change per scroll line.
    pub zoom_step: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 8.0,
            min_distance: 5.0,
            max_distance: 15.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.005,
            zoom_step: 0.05,
        }
    }
}

impl OrbitCamera {
    pub fn with_distance_limits(min_distance: f32, max_distance: f32) -> Self {
        let mut cam = Self {
            min_distance,
            max_distance,
            ..Self::default()
        };
        cam.distance = cam.distance.clamp(min_distance, max_distance);
        cam
    }

    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    /// Drag by a pointer delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self.pitch.clamp(
            -89.0_f32.to_radians(),
            89.0_f32.to_radians(),
        );
    }

    /// Zoom by scroll lines; positive moves towards the target.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - self.zoom_step).powf(lines);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }

    /// Picking ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        self.render_view().ray(ndc, self.aspect)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
