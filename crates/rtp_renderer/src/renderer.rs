//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Progressive accumulation, one sample per pixel per pass
//! - Gamma correction and 8-bit quantization in the frame buffer

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::sampling::gen_f32;
use crate::{Camera, Color, Hittable};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use rtp_math::{Interval, Ray};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Near clip for secondary rays, avoids self-intersection acne.
pub const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel; each sample is one progressive pass
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance returned by rays that escape the scene
    pub background: Color,
    /// Base seed for the per-bucket generators
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 4,
            max_depth: 4,
            background: Color::new(0.53, 0.81, 0.92),
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Compute the color seen by a ray.
///
/// Radiance is the emission at the hit plus the attenuated radiance along
/// the scattered ray, down to `depth` bounces.
pub fn ray_color(
    ray: &Ray,
    background: Color,
    world: &dyn Hittable,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // Out of bounces, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) else {
        return background;
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let incoming = ray_color(&result.scattered, background, world, depth - 1, rng);
            emitted + result.attenuation * incoming
        }
        None => emitted,
    }
}

/// Trace one jittered sample through pixel `(x, y)`, with `y` counted
/// from the top row.
#[allow(clippy::too_many_arguments)]
pub fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    image_width: u32,
    image_height: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let du = (image_width.max(2) - 1) as f32;
    let dv = (image_height.max(2) - 1) as f32;

    // Viewport t runs bottom to top
    let row = image_height.saturating_sub(1).saturating_sub(y);
    let s = (x as f32 + gen_f32(rng)) / du;
    let t = (row as f32 + gen_f32(rng)) / dv;

    let ray = camera.get_ray(s, t, rng);
    ray_color(&ray, config.background, world, config.max_depth, rng)
}

/// Convert an accumulated color to 8-bit RGBA.
///
/// `scale` is one over the number of accumulated samples. Gamma 2 is
/// applied before quantizing to `[0, 255]`.
pub fn color_to_rgba(color: Color, scale: f32) -> [u8; 4] {
    let quantize = |c: f32| (256.0 * (c * scale).sqrt().clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// Linear radiance accumulated over progressive passes.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    accum: Vec<Color>,
    passes: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            accum: vec![Color::ZERO; width as usize * height as usize],
            passes: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Completed passes, i.e. samples per pixel so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Add one bucket's samples into the accumulation buffer.
    pub fn accumulate(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            let index = self.index(bucket.x + local_x, bucket.y + local_y);
            self.accum[index] += *color;
        }
    }

    pub fn finish_pass(&mut self) {
        self.passes += 1;
    }

    /// Mean linear color at `(x, y)`.
    pub fn average(&self, x: u32, y: u32) -> Color {
        if self.passes == 0 {
            return Color::ZERO;
        }
        self.accum[self.index(x, y)] / self.passes as f32
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Reset to an empty accumulation.
    pub fn clear(&mut self) {
        self.accum.fill(Color::ZERO);
        self.passes = 0;
    }

    /// Gamma-corrected RGBA8 bytes, rows top to bottom.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let scale = 1.0 / self.passes.max(1) as f32;
        let pixels: Vec<[u8; 4]> = self
            .accum
            .iter()
            .map(|c| color_to_rgba(*c, scale))
            .collect();
        bytemuck::cast_slice(&pixels).to_vec()
    }
}

/// Seed for one bucket of one pass; distinct for every (pass, bucket).
fn bucket_seed(seed: u64, pass: u32, bucket: usize) -> u64 {
    seed ^ (((pass as u64) << 32) | bucket as u64)
}

/// Render one sample for every pixel and add it to `frame`.
///
/// Buckets run in parallel, each with its own generator, so the result
/// only depends on the seed and the pass number.
pub fn render_pass(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    frame: &mut FrameBuffer,
) {
    let (width, height) = (frame.width(), frame.height());
    let pass = frame.passes();
    let buckets = generate_buckets(width, height, config.bucket_size);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, pass, bucket.index));
            let pixels = render_bucket(bucket, camera, world, config, width, height, &mut rng);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    for result in &results {
        frame.accumulate(result);
    }
    frame.finish_pass();
}

/// Render `samples_per_pixel` passes into a new frame buffer.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    width: u32,
    height: u32,
) -> FrameBuffer {
    let start = Instant::now();
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth
    );

    let mut frame = FrameBuffer::new(width, height);
    for _ in 0..config.samples_per_pixel {
        render_pass(camera, world, config, &mut frame);
        log::debug!("Pass {}/{} done", frame.passes(), config.samples_per_pixel);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    frame
}
