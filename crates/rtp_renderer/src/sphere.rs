//! Sphere primitive, optionally moving linearly over the shutter interval.

use crate::{HitRecord, Hittable, Material};
use rtp_math::{unit_vector, Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere whose center travels from `center0` at `time0` to `center1` at `time1`.
pub struct Sphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self::moving(center, center, 0.0, 1.0, radius, material)
    }

    /// Create a sphere moving linearly between two centers.
    pub fn moving(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            material,
        }
    }

    /// Center at the given time.
    pub fn center(&self, time: f32) -> Vec3 {
        if self.center0 == self.center1 || self.time1 == self.time0 {
            return self.center0;
        }
        let s = (time - self.time0) / (self.time1 - self.time0);
        self.center0 + s * (self.center1 - self.center0)
    }

    /// UV coordinates for a point on the unit sphere.
    fn sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle up from -Y, phi: angle around Y from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }
}

/// Tangent and bitangent for a unit normal, using +Y as the reference axis
/// (or -Z when the normal is parallel to Y).
pub(crate) fn tangent_basis(normal: Vec3) -> (Vec3, Vec3) {
    let reference = if 1.0 - normal.dot(Vec3::Y).abs() < f32::EPSILON {
        -Vec3::Z
    } else {
        Vec3::Y
    };
    let tangent = unit_vector(reference.cross(normal));
    let bitangent = unit_vector(normal.cross(tangent));
    (tangent, bitangent)
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = ray.origin() - center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root in range, then the far one
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = unit_vector(p - center);
        let mut rec = HitRecord::new(ray, root, outward_normal, self.material.as_ref());
        (rec.u, rec.v) = Self::sphere_uv(outward_normal);
        (rec.tangent, rec.bitangent) = tangent_basis(outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let c0 = self.center(time0);
        let c1 = self.center(time1);
        let box0 = Aabb::new(c0 - rvec, c0 + rvec);
        let box1 = Aabb::new(c1 - rvec, c1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Arc::new(Lambertian::new(Vec3::splat(0.5))))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((rec.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Y);
        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_sphere_far_root_from_inside() {
        let sphere = unit_sphere();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Z);

        let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal - (-Vec3::Z)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_respects_interval() {
        let sphere = unit_sphere();
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(sphere.hit(&ray, Interval::new(0.001, 3.5)).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        // -X maps to u = 0, top of the sphere to v = 1
        let (u, v) = Sphere::sphere_uv(Vec3::new(-1.0, 0.0, 0.0));
        assert!(u.abs() < 1e-5 || (u - 1.0).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        let (_, v) = Sphere::sphere_uv(Vec3::Y);
        assert!((v - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_basis_orthonormal() {
        for n in [Vec3::X, Vec3::Y, -Vec3::Y, unit_vector(Vec3::new(1.0, 2.0, 3.0))] {
            let (t, b) = tangent_basis(n);
            assert!((t.length() - 1.0).abs() < 1e-4);
            assert!((b.length() - 1.0).abs() < 1e-4);
            assert!(t.dot(n).abs() < 1e-4);
            assert!(b.dot(n).abs() < 1e-4);
            assert!(t.dot(b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_moving_sphere() {
        let mat: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::ONE));
        let sphere = Sphere::moving(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 0.0, 1.0, 0.5, mat);

        assert_eq!(sphere.center(0.5), Vec3::new(1.0, 0.0, 0.0));

        // Ray at time 1 sees the sphere at its end position
        let ray = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::Z, 1.0);
        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
        let early = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(sphere.hit(&early, Interval::new(0.001, f32::INFINITY)).is_none());

        let bbox = sphere.bounding_box(0.0, 1.0).unwrap();
        assert!((bbox.min.x + 0.5).abs() < 1e-5);
        assert!((bbox.max.x - 2.5).abs() < 1e-5);
    }
}
