//! Math types shared by the rtp crates.
//!
//! `glam` provides the vector/matrix types; this crate adds the ray-tracing
//! specific pieces on top: rays, parametric intervals and bounding boxes.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Padding applied to zero-extent bounding box axes.
pub const AABB_PAD: f32 = 0.0001;

/// Normalize `v`, returning it unchanged when its length is zero.
#[inline]
pub fn unit_vector(v: Vec3) -> Vec3 {
    let len = v.length();
    if len != 0.0 {
        v / len
    } else {
        v
    }
}

/// True when every component of `v` is within 1e-8 of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f32 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_vector_zero_passthrough() {
        assert_eq!(unit_vector(Vec3::ZERO), Vec3::ZERO);
        let v = unit_vector(Vec3::new(3.0, 0.0, 4.0));
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_zero() {
        assert!(near_zero(Vec3::new(1e-9, -1e-9, 0.0)));
        assert!(!near_zero(Vec3::new(1e-3, 0.0, 0.0)));
    }
}
