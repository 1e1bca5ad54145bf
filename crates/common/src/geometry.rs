use crate::types::Transform;
use glam::{Quat, Vec2, Vec3};

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; the direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// One of the six faces of a box, in box-local space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::PosX,
        BoxFace::NegX,
        BoxFace::PosY,
        BoxFace::NegY,
        BoxFace::PosZ,
        BoxFace::NegZ,
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            BoxFace::PosX => Vec3::X,
            BoxFace::NegX => Vec3::NEG_X,
            BoxFace::PosY => Vec3::Y,
            BoxFace::NegY => Vec3::NEG_Y,
            BoxFace::PosZ => Vec3::Z,
            BoxFace::NegZ => Vec3::NEG_Z,
        }
    }

    /// Local axes spanning the face, as (u, v) component indices.
    pub fn tangent_axes(self) -> (usize, usize) {
        match self {
            BoxFace::PosX | BoxFace::NegX => (2, 1),
            BoxFace::PosY | BoxFace::NegY => (0, 2),
            BoxFace::PosZ | BoxFace::NegZ => (0, 1),
        }
    }

    /// Texture coordinate of a box-local point on this face, each in `[0, 1]`.
    ///
    /// GPU meshes and the CPU raycaster both use this mapping.
    pub fn uv(self, local: Vec3, half_extents: Vec3) -> Vec2 {
        let (u, v) = self.tangent_axes();
        Vec2::new(
            0.5 + local[u] / (2.0 * half_extents[u]),
            0.5 + local[v] / (2.0 * half_extents[v]),
        )
    }

    /// The face whose outward normal best matches a box-local point.
    fn from_local_point(local: Vec3, half_extents: Vec3) -> Self {
        let scaled = local / half_extents;
        let abs = scaled.abs();
        if abs.x >= abs.y && abs.x >= abs.z {
            if scaled.x >= 0.0 { BoxFace::PosX } else { BoxFace::NegX }
        } else if abs.y >= abs.z {
            if scaled.y >= 0.0 { BoxFace::PosY } else { BoxFace::NegY }
        } else if scaled.z >= 0.0 {
            BoxFace::PosZ
        } else {
            BoxFace::NegZ
        }
    }
}

/// Result of a ray hitting a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space outward surface normal.
    pub normal: Vec3,
    pub face: BoxFace,
    pub uv: Vec2,
}

/// A box with arbitrary rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// A cube of the given edge length placed by `transform` (scale is folded in).
    pub fn cube(edge: f32, transform: &Transform) -> Self {
        Self {
            center: transform.position,
            rotation: transform.rotation,
            half_extents: transform.scale * (edge * 0.5),
        }
    }

    /// Nearest intersection in front of the ray origin.
    ///
    /// A ray starting inside the box reports its exit point.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let inv = self.rotation.inverse();
        let origin = inv * (ray.origin - self.center);
        let dir = inv * ray.direction;

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let h = self.half_extents[axis];
            if dir[axis].abs() < 1e-8 {
                if origin[axis].abs() > h {
                    return None;
                }
                continue;
            }
            let t1 = (-h - origin[axis]) / dir[axis];
            let t2 = (h - origin[axis]) / dir[axis];
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_far < t_near.max(0.0) {
            return None;
        }
        let distance = if t_near > 0.0 { t_near } else { t_far };
        let local = origin + dir * distance;
        let face = BoxFace::from_local_point(local, self.half_extents);

        Some(RayHit {
            distance,
            point: ray.at(distance),
            normal: self.rotation * face.normal(),
            face,
            uv: face.uv(local, self.half_extents),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> OrientedBox {
        OrientedBox::cube(2.0, &Transform::default())
    }

    #[test]
    fn ray_direction_is_normalized() {
        let r = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        assert!((r.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(r.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn ray_hits_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 8.0), Vec3::NEG_Z);
        let hit = unit_box().intersect(&ray).unwrap();
        assert!((hit.distance - 7.0).abs() < 1e-5);
        assert_eq!(hit.face, BoxFace::PosZ);
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
        assert!((hit.uv - Vec2::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn ray_misses_box() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 8.0), Vec3::NEG_Z);
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn box_behind_ray_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 8.0), Vec3::Z);
        assert!(unit_box().intersect(&ray).is_none());
    }

    #[test]
    fn ray_from_inside_exits() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = unit_box().intersect(&ray).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert_eq!(hit.face, BoxFace::PosX);
    }

    #[test]
    fn rotated_box_hit_distance() {
        let t = Transform::default()
            .with_euler(Vec3::new(0.0, std::f32::consts::FRAC_PI_4, 0.0));
        let b = OrientedBox::cube(2.0, &t);
        let ray = Ray::new(Vec3::new(0.1, 0.0, 8.0), Vec3::NEG_Z);
        let hit = b.intersect(&ray).unwrap();
        // Seen from +Z the rotated cross-section is the diamond |x| + |z| <= sqrt(2).
        let expected = 8.0 - (2.0_f32.sqrt() - 0.1);
        assert!((hit.distance - expected).abs() < 1e-4);
    }

    #[test]
    fn face_uv_spans_unit_square() {
        let h = Vec3::splat(1.6);
        let corner = BoxFace::PosZ.uv(Vec3::new(-1.6, -1.6, 1.6), h);
        assert!(corner.length() < 1e-6);
        let opposite = BoxFace::PosZ.uv(Vec3::new(1.6, 1.6, 1.6), h);
        assert!((opposite - Vec2::ONE).length() < 1e-6);
    }
}
