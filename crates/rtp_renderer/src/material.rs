//! Material trait and the classic surface models.

use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector, reflect, refract};
use crate::texture::decode_normal;
use crate::{HitRecord, SolidColor, Texture};
use rand::RngCore;
use rtp_math::{near_zero, unit_vector, Quat, Ray, Vec3};
use std::sync::Arc;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Outgoing ray and its throughput weight.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Light emitted at the given UV coordinates and point. Black by default.
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// World-space normal from a tangent-space normal map at the hit point.
///
/// Returns `None` when the decoded normal collapses to zero.
pub(crate) fn mapped_normal(rec: &HitRecord, normal_map: &dyn Texture) -> Option<Vec3> {
    let n = decode_normal(normal_map.value(rec.u, rec.v, rec.p));
    let world = unit_vector(rec.tangent * n.x + rec.bitangent * n.y + rec.normal * n.z);
    (!near_zero(world)).then_some(world)
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
    tint: Color,
    normal_map: Option<Arc<dyn Texture>>,
}

impl Lambertian {
    /// Create a new Lambertian material with a constant albedo.
    pub fn new(albedo: Color) -> Self {
        Self::with_texture(Arc::new(SolidColor::new(albedo)))
    }

    pub fn with_texture(albedo: Arc<dyn Texture>) -> Self {
        Self {
            albedo,
            tint: Color::ONE,
            normal_map: None,
        }
    }

    /// Multiply the albedo texture by a constant color.
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_normal_map(mut self, normal_map: Arc<dyn Texture>) -> Self {
        self.normal_map = Some(normal_map);
        self
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(direction) {
            direction = rec.normal;
        }
        let mut direction = unit_vector(direction);

        if let Some(normal) = self
            .normal_map
            .as_deref()
            .and_then(|map| mapped_normal(rec, map))
        {
            direction = Quat::from_rotation_arc(rec.normal, normal) * direction;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p) * self.tint,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(unit_vector(ray_in.direction()), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Absorb rays fuzzed below the surface
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = unit_vector(ray_in.direction());
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::with_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn with_texture(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.emit.value(u, v, p)
    }
}
