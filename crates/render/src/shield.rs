//! The shield's energy-field shading.
//!
//! Per surface point the shield combines three terms:
//! - a fresnel rim, bright where the surface turns away from the viewer;
//! - one expanding, fading ring per recent impact;
//! - a thin static grid drawn from the texture coordinates.
//!
//! Alpha is clamped to `[0, 1]`. The colour mix factor is deliberately left
//! unclamped, so strong ripples extrapolate past the rim colour.

use borgshield_kernel::{ImpactEvent, RIPPLE_LIFETIME, ShieldParameters};
use glam::{Vec2, Vec3};

/// World units per second the ring radius grows.
pub const RING_SPEED: f32 = 2.0;
/// Radial thickness of a ring.
pub const RING_WIDTH: f32 = 0.2;
/// Intensity of a fresh ring before fading.
pub const RIPPLE_GAIN: f32 = 2.0;
/// Exponent applied to `1 - cos` for the rim term.
pub const FRESNEL_POWER: i32 = 3;
/// Grid lines per unit of texture coordinate.
pub const GRID_FREQUENCY: f32 = 50.0;
/// Fractional position past which a texel counts as a grid line.
pub const GRID_THRESHOLD: f32 = 0.98;

const FRESNEL_ALPHA: f32 = 0.4;
const RIPPLE_ALPHA: f32 = 0.5;
const GRID_ALPHA: f32 = 0.1;

/// Per-point inputs supplied by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingInput {
    /// World-space surface point.
    pub position: Vec3,
    /// Direction from the point towards the eye; need not be normalized.
    pub view_dir: Vec3,
    /// Surface normal; need not be normalized.
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Shaded output for one point, blended additively by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldSample {
    pub color: Vec3,
    pub alpha: f32,
}

impl ShieldSample {
    pub const TRANSPARENT: Self = Self {
        color: Vec3::ZERO,
        alpha: 0.0,
    };
}

/// Shader-style `fract`: `x - floor(x)`, always in `[0, 1)`.
fn fract_gl(x: f32) -> f32 {
    x - x.floor()
}

/// Rim term `(1 - n.v)^3`.
pub fn fresnel(view_dir: Vec3, normal: Vec3) -> f32 {
    let cos = view_dir.normalize_or_zero().dot(normal.normalize_or_zero());
    (1.0 - cos).powi(FRESNEL_POWER)
}

/// Contribution of a single impact ring at `point`.
pub fn ring_contribution(point: Vec3, time: f32, impact: &ImpactEvent) -> f32 {
    if !impact.is_active_at(time) {
        return 0.0;
    }
    let since = impact.age_at(time);
    let dist = point.distance(impact.position);
    let radius = since * RING_SPEED;
    if dist > radius && dist < radius + RING_WIDTH {
        let fade = 1.0 - since / RIPPLE_LIFETIME;
        fade * RIPPLE_GAIN
    } else {
        0.0
    }
}

/// Summed ring contributions of every slot. Overlapping rings add up unclamped.
pub fn ripple_intensity(point: Vec3, time: f32, impacts: &[ImpactEvent]) -> f32 {
    impacts
        .iter()
        .map(|impact| ring_contribution(point, time, impact))
        .sum()
}

/// Grid lines: 0, 1 or 2 depending on how many of u/v sit on a line.
pub fn grid_term(uv: Vec2) -> f32 {
    let line = |c: f32| {
        if fract_gl(c * GRID_FREQUENCY) > GRID_THRESHOLD {
            1.0
        } else {
            0.0
        }
    };
    line(uv.x) + line(uv.y)
}

/// Shade one shield point.
pub fn shade(input: &ShadingInput, params: &ShieldParameters) -> ShieldSample {
    let rim = fresnel(input.view_dir, input.normal);
    let ripple = ripple_intensity(input.position, params.time, &params.impacts);
    let grid = grid_term(input.uv);

    let alpha = (rim * FRESNEL_ALPHA + ripple * RIPPLE_ALPHA + grid * GRID_ALPHA).clamp(0.0, 1.0);
    let color = params.base_color.lerp(params.rim_color, rim + ripple);

    ShieldSample { color, alpha }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borgshield_kernel::{IMPACT_CAPACITY, ImpactBuffer, SENTINEL_TIME};

    const EPS: f32 = 1e-5;

    fn params_with(buffer: &ImpactBuffer, time: f32) -> ShieldParameters {
        ShieldParameters {
            time,
            base_color: Vec3::new(0.0, 1.0, 0.0),
            rim_color: Vec3::new(0.8, 1.0, 0.8),
            impacts: buffer.snapshot(),
        }
    }

    fn face_on(position: Vec3) -> ShadingInput {
        ShadingInput {
            position,
            view_dir: Vec3::Z,
            normal: Vec3::Z,
            uv: Vec2::splat(0.5),
        }
    }

    #[test]
    fn fresnel_face_on_and_grazing() {
        assert!(fresnel(Vec3::Z, Vec3::Z).abs() < EPS);
        assert!((fresnel(Vec3::X, Vec3::Z) - 1.0).abs() < EPS);
        // Unnormalized inputs give the same answer.
        assert!((fresnel(Vec3::new(0.0, 0.0, 7.0), Vec3::new(0.0, 0.0, 0.1))).abs() < EPS);
        let half = fresnel(Vec3::new(1.0, 0.0, 1.0), Vec3::Z);
        let expected = (1.0 - std::f32::consts::FRAC_1_SQRT_2).powi(3);
        assert!((half - expected).abs() < EPS);
    }

    #[test]
    fn scenario_ring_at_half_second() {
        let mut buf = ImpactBuffer::new();
        buf.record(Vec3::new(1.0, 0.0, 0.0), 10.0);
        let point = Vec3::new(2.05, 0.0, 0.0);
        let intensity = ripple_intensity(point, 10.5, &buf.snapshot());
        assert!((intensity - 1.5).abs() < EPS, "got {intensity}");
    }

    #[test]
    fn ripple_time_window() {
        let p0 = Vec3::new(0.0, 1.6, 0.0);
        let impact = ImpactEvent::new(p0, 4.0);
        // At the impact point the ring has already left for any positive age,
        // so probe on the ring itself instead.
        let probe = |now: f32| {
            let radius = (now - impact.time) * RING_SPEED;
            p0 + Vec3::X * (radius + RING_WIDTH * 0.5)
        };
        assert_eq!(ring_contribution(p0, 3.0, &impact), 0.0);
        assert_eq!(ring_contribution(p0, 4.0, &impact), 0.0);
        assert!(ring_contribution(probe(4.5), 4.5, &impact) > 0.0);
        assert!(ring_contribution(probe(5.9), 5.9, &impact) > 0.0);
        assert_eq!(ring_contribution(probe(6.0), 6.0, &impact), 0.0);
        assert_eq!(ring_contribution(probe(7.0), 7.0, &impact), 0.0);
    }

    #[test]
    fn ring_band_edges_are_exclusive() {
        let impact = ImpactEvent::new(Vec3::ZERO, 0.0);
        let now = 0.25; // radius 0.5, band (0.5, 0.7)
        let at = |d: f32| ring_contribution(Vec3::new(d, 0.0, 0.0), now, &impact);
        assert_eq!(at(0.4), 0.0);
        assert_eq!(at(0.5), 0.0);
        assert!(at(0.51) > 0.0);
        assert!(at(0.69) > 0.0);
        assert_eq!(at(0.75), 0.0);
        assert!((at(0.6) - 0.875 * RIPPLE_GAIN).abs() < EPS);
    }

    #[test]
    fn sentinels_contribute_nothing() {
        let buf = ImpactBuffer::new();
        for now in [0.0, 0.5, 10.0, 98.5, 500.0] {
            for d in [0.0, 1.0, 5.0, 200.0] {
                let p = Vec3::new(d, 0.0, 0.0);
                assert_eq!(ripple_intensity(p, now, &buf.snapshot()), 0.0);
            }
        }
        assert_eq!(ImpactEvent::sentinel().time, SENTINEL_TIME);
    }

    #[test]
    fn overlapping_rings_sum() {
        let mut buf = ImpactBuffer::new();
        buf.record(Vec3::ZERO, 1.0);
        buf.record(Vec3::ZERO, 1.0);
        let p = Vec3::new(1.1, 0.0, 0.0);
        let one = ring_contribution(p, 1.5, &ImpactEvent::new(Vec3::ZERO, 1.0));
        assert!(one > 0.0);
        assert!((ripple_intensity(p, 1.5, &buf.snapshot()) - 2.0 * one).abs() < EPS);
    }

    #[test]
    fn grid_lines() {
        assert_eq!(grid_term(Vec2::new(0.5, 0.5)), 0.0);
        // fract(0.0199 * 50) = 0.995
        assert_eq!(grid_term(Vec2::new(0.0199, 0.5)), 1.0);
        assert_eq!(grid_term(Vec2::new(0.0199, 0.0199)), 2.0);
        // Negative coordinates wrap like the shader's fract.
        assert_eq!(grid_term(Vec2::new(-0.0001, 0.5)), 1.0);
    }

    #[test]
    fn alpha_stays_in_unit_range() {
        let mut buf = ImpactBuffer::new();
        for _ in 0..5 {
            buf.record(Vec3::ZERO, 1.0);
        }
        let params = params_with(&buf, 1.5);
        let input = ShadingInput {
            position: Vec3::new(1.1, 0.0, 0.0),
            view_dir: Vec3::new(-1.0, 0.0, 0.05),
            normal: Vec3::X,
            uv: Vec2::splat(0.0199),
        };
        let s = shade(&input, &params);
        assert_eq!(s.alpha, 1.0);

        let idle = shade(&face_on(Vec3::ZERO), &params_with(&ImpactBuffer::new(), 0.0));
        assert!((0.0..=1.0).contains(&idle.alpha));
        assert!(idle.alpha.abs() < EPS);
    }

    #[test]
    fn alpha_clamped_across_angles_impacts_and_uvs() {
        const UVS: [Vec2; 4] = [Vec2::ZERO, Vec2::splat(0.0199), Vec2::new(0.5, 0.98), Vec2::ONE];
        let points = [Vec3::ZERO, Vec3::new(0.3, 0.0, 1.6), Vec3::new(1.6, -0.9, 0.2)];
        for filled in 0..=IMPACT_CAPACITY {
            let mut buf = ImpactBuffer::new();
            for i in 0..filled {
                buf.record(points[i % points.len()], 1.0 + i as f32 * 0.1);
            }
            for now in [0.0, 1.05, 1.3, 2.0, 4.0] {
                let params = params_with(&buf, now);
                // View directions over the whole sphere, including back faces.
                for yaw_step in 0..12 {
                    for pitch_step in 0..7 {
                        let yaw = yaw_step as f32 * std::f32::consts::TAU / 12.0;
                        let pitch = (pitch_step as f32 / 6.0 - 0.5) * std::f32::consts::PI;
                        let view_dir = Vec3::new(
                            pitch.cos() * yaw.sin(),
                            pitch.sin(),
                            pitch.cos() * yaw.cos(),
                        );
                        for uv in UVS {
                            for position in [Vec3::new(0.1, 0.0, 1.6), Vec3::new(0.5, 0.0, 0.0)] {
                                let input = ShadingInput {
                                    position,
                                    view_dir,
                                    normal: Vec3::Z,
                                    uv,
                                };
                                let alpha = shade(&input, &params).alpha;
                                assert!(
                                    (0.0..=1.0).contains(&alpha),
                                    "alpha {alpha} out of range: filled={filled} now={now} view={view_dir} uv={uv}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn face_on_idle_is_base_colour() {
        let s = shade(&face_on(Vec3::ZERO), &params_with(&ImpactBuffer::new(), 3.0));
        assert!((s.color - Vec3::new(0.0, 1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn colour_mix_is_not_clamped() {
        let mut buf = ImpactBuffer::new();
        buf.record(Vec3::ZERO, 0.0);
        let params = params_with(&buf, 0.25);
        let s = shade(&face_on(Vec3::new(0.6, 0.0, 0.0)), &params);
        // mix factor = 1.75 > 1, so red overshoots the rim colour.
        assert!(s.color.x > params.rim_color.x);
        assert!((s.color.x - 0.8 * 1.75).abs() < 1e-4);
    }
}
