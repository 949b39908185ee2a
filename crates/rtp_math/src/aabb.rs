use crate::{Interval, Ray, Vec3, AABB_PAD};

/// Axis-aligned bounding box used by the BVH.
///
/// Stored as minimum and maximum corners. Every constructor pads axes whose
/// extent is below [`AABB_PAD`] so flat geometry still has a slab a ray can
/// enter and leave.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from its corners, padding zero-extent axes.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let mut aabb = Self { min, max };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Merge two boxes: componentwise min of minimums, max of maximums.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self::new(box0.min.min(box1.min), box0.max.max(box1.max))
    }

    /// Minimum coordinate on `axis` (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn axis_min(&self, axis: usize) -> f32 {
        self.min[axis]
    }

    /// Slab test. Returns true if the ray passes through the box inside `ray_t`.
    #[inline]
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.hit_interval(r, ray_t).is_some()
    }

    /// Slab test returning the narrowed `[entry, exit]` interval.
    ///
    /// On an axis where the direction component is zero the ray never
    /// crosses the slab, so it is kept only if its origin lies inside the
    /// closed slab `[min, max]`. Boundary origins count as inside, matching
    /// the inclusive edge test of triangles.
    pub fn hit_interval(&self, r: &Ray, mut ray_t: Interval) -> Option<Interval> {
        let origin = r.origin();
        let direction = r.direction();

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }

            let adinv = 1.0 / direction[axis];
            let a = (self.min[axis] - origin[axis]) * adinv;
            let b = (self.max[axis] - origin[axis]) * adinv;

            ray_t.min = a.min(b).max(ray_t.min);
            ray_t.max = a.max(b).min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return None;
            }
        }

        Some(ray_t)
    }

    fn pad_to_minimums(&mut self) {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < AABB_PAD {
                self.min[axis] -= AABB_PAD;
                self.max[axis] += AABB_PAD;
            }
        }
    }

    /// Identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}
