use crate::config::SceneConfig;
use crate::impact::{ImpactBuffer, ImpactEvent, ImpactSnapshot};
use borgshield_common::Transform;
use glam::Vec3;

/// Everything the shield shading stage needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldParameters {
    /// Seconds since scene start.
    pub time: f32,
    pub base_color: Vec3,
    pub rim_color: Vec3,
    pub impacts: ImpactSnapshot,
}

impl ShieldParameters {
    /// Parameters at `time` with no impacts recorded.
    pub fn idle(time: f32, base_color: Vec3, rim_color: Vec3) -> Self {
        Self {
            time,
            base_color,
            rim_color,
            impacts: ImpactBuffer::new().snapshot(),
        }
    }
}

/// The scene state the host frame loop drives.
///
/// Exposes the two tick entry points: [`ShieldScene::on_frame`] once per
/// rendered frame and [`ShieldScene::on_hit`] per fire action.
#[derive(Debug, Clone)]
pub struct ShieldScene {
    config: SceneConfig,
    impacts: ImpactBuffer,
    cube_euler: Vec3,
    elapsed: f32,
    frame: u64,
}

impl Default for ShieldScene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl ShieldScene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            impacts: ImpactBuffer::new(),
            cube_euler: Vec3::ZERO,
            elapsed: 0.0,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn impacts(&self) -> &ImpactBuffer {
        &self.impacts
    }

    /// Elapsed time seen by the last frame.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of frames processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Accumulated cube rotation as XYZ Euler angles.
    pub fn cube_euler(&self) -> Vec3 {
        self.cube_euler
    }

    pub fn cube_transform(&self) -> Transform {
        Transform::default().with_euler(self.cube_euler)
    }

    /// The shield does not rotate with the cube.
    pub fn shield_transform(&self) -> Transform {
        Transform::default()
    }

    /// Advance one rendered frame and produce that frame's shield parameters.
    ///
    /// The cube spin is a fixed per-frame step, independent of `elapsed`.
    pub fn on_frame(&mut self, elapsed: f32) -> ShieldParameters {
        let _span = tracing::trace_span!("on_frame", frame = self.frame).entered();
        self.elapsed = elapsed;
        self.frame += 1;
        self.cube_euler += self.config.cube_spin_per_frame;
        self.parameters()
    }

    /// Shield parameters for the current state, without advancing.
    pub fn parameters(&self) -> ShieldParameters {
        ShieldParameters {
            time: self.elapsed,
            base_color: self.config.base_color.to_vec3(),
            rim_color: self.config.rim_color.to_vec3(),
            impacts: self.impacts.snapshot(),
        }
    }

    /// Record an impact at `point`, stamped `time`.
    pub fn on_hit(&mut self, point: Vec3, time: f32) -> ImpactEvent {
        let event = self.impacts.record(point, time);
        tracing::info!(
            "shield hit at ({:.2}, {:.2}, {:.2}) t={:.3}",
            point.x,
            point.y,
            point.z,
            time
        );
        event
    }

    /// Record the result of a fire action at the current scene time.
    ///
    /// A miss (`None`) records nothing.
    pub fn on_fire(&mut self, pick: Option<Vec3>) -> Option<ImpactEvent> {
        match pick {
            Some(point) => Some(self.on_hit(point, self.elapsed)),
            None => {
                tracing::debug!("fire missed every surface");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::SENTINEL_TIME;

    #[test]
    fn frame_pushes_time_and_snapshot() {
        let mut scene = ShieldScene::default();
        scene.on_hit(Vec3::X, 0.5);
        let params = scene.on_frame(1.25);
        assert_eq!(params.time, 1.25);
        assert_eq!(params.impacts[4].position, Vec3::X);
        assert_eq!(params.base_color, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(scene.frame(), 1);
    }

    #[test]
    fn cube_spins_per_frame_not_per_second() {
        let mut scene = ShieldScene::default();
        scene.on_frame(0.0);
        scene.on_frame(100.0);
        let euler = scene.cube_euler();
        assert!((euler.x - 0.002).abs() < 1e-7);
        assert!((euler.y - 0.004).abs() < 1e-7);
        assert_eq!(euler.z, 0.0);
    }

    #[test]
    fn shield_stays_put_while_cube_spins() {
        let mut scene = ShieldScene::default();
        for i in 0..10 {
            scene.on_frame(i as f32);
        }
        assert_ne!(scene.cube_transform(), Transform::default());
        assert_eq!(scene.shield_transform(), Transform::default());
    }

    #[test]
    fn fire_uses_scene_clock() {
        let mut scene = ShieldScene::default();
        scene.on_frame(3.5);
        let event = scene.on_fire(Some(Vec3::Z)).unwrap();
        assert_eq!(event.time, 3.5);
        assert_eq!(scene.impacts().latest(), Some(event));
    }

    #[test]
    fn fire_miss_records_nothing() {
        let mut scene = ShieldScene::default();
        scene.on_frame(1.0);
        assert!(scene.on_fire(None).is_none());
        assert!(scene.impacts().slots().iter().all(|e| e.time == SENTINEL_TIME));
    }

    #[test]
    fn parameters_do_not_advance() {
        let mut scene = ShieldScene::default();
        scene.on_frame(2.0);
        let a = scene.parameters();
        let b = scene.parameters();
        assert_eq!(a, b);
        assert_eq!(scene.frame(), 1);
    }

    #[test]
    fn idle_parameters_have_only_sentinels() {
        let p = ShieldParameters::idle(0.0, Vec3::ZERO, Vec3::ONE);
        assert!(p.impacts.iter().all(|e| e.is_sentinel()));
    }
}
