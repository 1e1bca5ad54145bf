use borgshield_common::{OrientedBox, Ray, RayHit, Transform};
use glam::Vec3;

/// A pickable surface in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTarget {
    pub name: &'static str,
    pub shape: OrientedBox,
}

/// The nearest surface a ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub target: &'static str,
    pub hit: RayHit,
}

/// The cube and its shield as pick targets.
pub fn scene_targets(
    cube_edge: f32,
    cube: &Transform,
    shield_edge: f32,
    shield: &Transform,
) -> [PickTarget; 2] {
    [
        PickTarget {
            name: "cube",
            shape: OrientedBox::cube(cube_edge, cube),
        },
        PickTarget {
            name: "shield",
            shape: OrientedBox::cube(shield_edge, shield),
        },
    ]
}

/// Closest hit along `ray` across all targets.
pub fn pick_nearest(ray: &Ray, targets: &[PickTarget]) -> Option<PickHit> {
    targets
        .iter()
        .filter_map(|t| {
            t.shape.intersect(ray).map(|hit| PickHit {
                target: t.name,
                hit,
            })
        })
        .min_by(|a, b| a.hit.distance.total_cmp(&b.hit.distance))
}

/// World-space impact point for a fire action, if the ray hits anything.
pub fn fire(ray: &Ray, targets: &[PickTarget]) -> Option<Vec3> {
    let picked = pick_nearest(ray, targets);
    match &picked {
        Some(p) => tracing::debug!(target_name = p.target, distance = p.hit.distance, "fire ray hit"),
        None => tracing::debug!("fire ray hit nothing"),
    }
    picked.map(|p| p.hit.point)
}
