use borgshield_common::BoxFace;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Unit cube (edge 1) with per-face normals and uvs.
///
/// Uvs follow [`BoxFace::uv`] so the GPU grid lines up with CPU shading.
/// Triangles wind counter-clockwise seen from outside.
pub(crate) fn unit_box_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let half = Vec3::splat(0.5);
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for face in BoxFace::ALL {
        let normal = face.normal();
        let (u_axis, v_axis) = face.tangent_axes();
        let base = vertices.len() as u16;

        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)].map(|(su, sv)| {
            let mut local = normal * 0.5;
            local[u_axis] = su * 0.5;
            local[v_axis] = sv * 0.5;
            local
        });
        for local in corners {
            vertices.push(Vertex {
                position: local.to_array(),
                normal: normal.to_array(),
                uv: face.uv(local, half).to_array(),
            });
        }

        let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        if winding.dot(normal) > 0.0 {
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        } else {
            indices.extend_from_slice(&[base, base + 3, base + 2, base + 2, base + 1, base]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3(a: [f32; 3]) -> Vec3 {
        Vec3::from_array(a)
    }

    #[test]
    fn box_has_24_vertices_36_indices() {
        let (v, i) = unit_box_mesh();
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn triangles_face_outward() {
        let (v, i) = unit_box_mesh();
        for tri in i.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|k| v3(v[k as usize].position));
            let n = v3(v[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn uvs_cover_unit_square() {
        let (v, _) = unit_box_mesh();
        for vert in &v {
            for c in vert.uv {
                assert!(c == 0.0 || c == 1.0, "uv {c}");
            }
        }
    }
}
