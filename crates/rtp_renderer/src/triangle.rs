//! Triangle primitive referencing a shared mesh.

use crate::sphere::tangent_basis;
use crate::{HitRecord, Hittable, Material};
use rtp_core::Mesh;
use rtp_math::{near_zero, unit_vector, Aabb, Interval, Ray, Vec2, Vec3};
use std::sync::Arc;

/// Parallel-ray threshold on `n·d`
const PARALLEL_EPSILON: f32 = 1e-8;

/// One face of a [`Mesh`], stored as three vertex indices.
pub struct Triangle {
    mesh: Arc<Mesh>,
    vertices: [u32; 3],
    material: Arc<dyn Material>,
}

impl Triangle {
    pub fn new(mesh: Arc<Mesh>, vertices: [u32; 3], material: Arc<dyn Material>) -> Self {
        Self {
            mesh,
            vertices,
            material,
        }
    }

    /// One triangle per face of `mesh`, all sharing `material`.
    pub fn from_mesh(mesh: Arc<Mesh>, material: Arc<dyn Material>) -> Vec<Triangle> {
        (0..mesh.triangle_count())
            .map(|i| Triangle::new(mesh.clone(), mesh.triangle(i), material.clone()))
            .collect()
    }

    #[inline]
    fn positions(&self) -> [Vec3; 3] {
        self.vertices.map(|i| self.mesh.positions[i as usize])
    }

    #[inline]
    fn uvs(&self) -> [Vec2; 3] {
        self.vertices.map(|i| self.mesh.uvs[i as usize])
    }

    /// Inverse-distance weighted UV at `p`, with v flipped.
    fn interpolate_uv(&self, p: Vec3, positions: &[Vec3; 3]) -> (f32, f32) {
        let uvs = self.uvs();
        let dist = positions.map(|v| (p - v).length());

        // A hit exactly on a vertex takes that vertex's UV
        let weights = match dist.iter().position(|&d| d == 0.0) {
            Some(i) => {
                let mut w = [0.0; 3];
                w[i] = 1.0;
                w
            }
            None => {
                let inv = dist.map(|d| 1.0 / d);
                let total = inv[0] + inv[1] + inv[2];
                inv.map(|w| w / total)
            }
        };

        let uv = uvs[0] * weights[0] + uvs[1] * weights[1] + uvs[2] * weights[2];
        (uv.x, 1.0 - uv.y)
    }

    /// Tangent frame from the UV gradients of the face.
    fn tangent_frame(&self, positions: &[Vec3; 3], normal: Vec3) -> (Vec3, Vec3) {
        let uvs = self.uvs();
        let edge1 = positions[1] - positions[0];
        let edge2 = positions[2] - positions[0];
        let duv1 = uvs[1] - uvs[0];
        let duv2 = uvs[2] - uvs[0];

        let mut det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det == 0.0 {
            det = f32::EPSILON;
        }
        let r = 1.0 / det;

        let tangent = unit_vector((edge1 * duv2.y - edge2 * duv1.y) * r);
        let bitangent = unit_vector((edge2 * duv1.x - edge1 * duv2.x) * r);

        if near_zero(tangent) || near_zero(bitangent) || !tangent.is_finite() {
            // Faces without usable UVs get an arbitrary frame around the normal
            return tangent_basis(normal);
        }
        (tangent, bitangent)
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let positions = self.positions();
        let [v0, v1, v2] = positions;

        let n = (v1 - v0).cross(v2 - v0);
        let n_dot_dir = n.dot(ray.direction());

        // Parallel or seen from behind; the threshold scales with |n| and |d|
        let parallel_limit = PARALLEL_EPSILON * n.length() * ray.direction().length();
        if n_dot_dir.abs() < parallel_limit || n_dot_dir > 0.0 {
            return None;
        }

        let t = -(n.dot(ray.origin()) - n.dot(v0)) / n_dot_dir;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);

        // Inside test against each edge
        let edges = [(v0, v1), (v1, v2), (v2, v0)];
        for (a, b) in edges {
            if n.dot((b - a).cross(p - a)) < 0.0 {
                return None;
            }
        }

        let normal = unit_vector(n);
        let mut rec = HitRecord::new(ray, t, normal, self.material.as_ref());
        (rec.u, rec.v) = self.interpolate_uv(p, &positions);
        (rec.tangent, rec.bitangent) = self.tangent_frame(&positions, normal);
        Some(rec)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let [v0, v1, v2] = self.positions();
        // Aabb::new pads flat axes
        Some(Aabb::new(v0.min(v1).min(v2), v0.max(v1).max(v2)))
    }
}
