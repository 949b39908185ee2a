//! rtp renderer - CPU path tracing core.
//!
//! A Monte Carlo path tracer: primitives and a BVH answer nearest-hit
//! queries, materials scatter or emit, and [`ray_color`] recursively
//! estimates the radiance along a camera ray. [`render_pass`] drives the
//! integrator over the image in parallel buckets and accumulates into a
//! [`FrameBuffer`].

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod material;
mod pbr;
mod renderer;
mod sampling;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{BuildError, Bvh, NodeRef};
pub use camera::{Camera, CameraSettings};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use pbr::{fresnel_epic, schlick_gaf, trowbridge_reitz_ndf, PbrMetallicRoughness};
pub use renderer::{
    color_to_rgba, ray_color, render, render_pass, sample_pixel, FrameBuffer, RenderConfig,
    T_MIN,
};
pub use sampling::{gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector};
pub use sphere::Sphere;
pub use texture::{Checker, ImageTexture, SolidColor, Texture, MISSING_TEXTURE_COLOR};
pub use triangle::Triangle;

/// Re-export common math types from rtp_math
pub use rtp_math::{Aabb, Interval, Ray, Vec2, Vec3};
