//! Hittable trait, hit records and the linear scene aggregate.

use crate::Material;
use rtp_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Shading tangent, perpendicular to the outward normal
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Start a record for a hit at `t`, orienting the normal against the ray.
    ///
    /// UVs and the tangent frame are zeroed; primitives fill them in.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            tangent: Vec3::ZERO,
            bitangent: Vec3::ZERO,
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
            material,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can intersect.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t` (bounds inclusive).
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    /// Bounding box over the shutter interval `[time0, time1]`.
    ///
    /// `None` for objects with no finite bounds.
    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb>;
}

/// Insertion-ordered list of hittables, tested linearly.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Hand the objects over to another aggregate (the BVH).
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Extend<Box<dyn Hittable>> for HittableList {
    fn extend<I: IntoIterator<Item = Box<dyn Hittable>>>(&mut self, iter: I) {
        self.objects.extend(iter);
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let mut objects = self.objects.iter();
        let first = objects.next()?.bounding_box(time0, time1)?;
        objects.try_fold(first, |acc, object| {
            object
                .bounding_box(time0, time1)
                .map(|b| Aabb::surrounding(&acc, &b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Box<dyn Hittable> {
        let mat = Arc::new(Lambertian::new(Vec3::splat(0.5)));
        Box::new(Sphere::new(center, radius, mat))
    }

    #[test]
    fn test_list_returns_closest() {
        let mut list = HittableList::new();
        list.add(sphere(Vec3::new(0.0, 0.0, 10.0), 1.0));
        list.add(sphere(Vec3::new(0.0, 0.0, 0.0), 1.0));

        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_list() {
        let list = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Z);
        assert!(list.hit(&ray, Interval::UNIVERSE).is_none());
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_list_bounding_box_merges_children() {
        let mut list = HittableList::new();
        list.add(sphere(Vec3::new(-2.0, 0.0, 0.0), 1.0));
        list.add(sphere(Vec3::new(3.0, 0.0, 0.0), 0.5));

        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert!((bbox.min.x + 3.0).abs() < 1e-5);
        assert!((bbox.max.x - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_face_normal_flips_inside() {
        let mat = Lambertian::new(Vec3::ONE);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Z);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Z, &mat);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }
}
