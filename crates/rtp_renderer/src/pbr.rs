//! Metallic-roughness PBR material.
//!
//! Lambertian diffuse plus a Cook-Torrance microfacet specular lobe:
//!
//! ```text
//! f(l, v) = kd * albedo / pi + D(h) * F(v, h) * G(l, v) / (4 (n.l) (n.v))
//! ```
//!
//! with a Trowbridge-Reitz (GGX) distribution, Schlick's geometry term
//! (`k = (roughness + 1)^2 / 8`) and the spherical-Gaussian Fresnel fit.

use crate::material::mapped_normal;
use crate::sampling::random_unit_vector;
use crate::{Color, HitRecord, Material, ScatterResult, SolidColor, Texture};
use rand::RngCore;
use rtp_math::{near_zero, unit_vector, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Dielectric reflectance at normal incidence
const DIELECTRIC_F0: f32 = 0.04;

/// Lower bound on roughness; the NDF is a spike at zero.
const MIN_ROUGHNESS: f32 = 0.05;

/// Trowbridge-Reitz (GGX) normal distribution, with `alpha = roughness^2`.
pub fn trowbridge_reitz_ndf(n_dot_h: f32, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha2 = alpha * alpha;
    let n_dot_h2 = n_dot_h * n_dot_h;
    let denom = PI * (n_dot_h2 * (alpha2 - 1.0) + 1.0).powi(2);
    alpha2 / denom
}

/// Schlick-GGX geometry term for one direction.
pub fn schlick_gaf(n_dot_v: f32, roughness: f32) -> f32 {
    let k = (roughness + 1.0) * (roughness + 1.0) / 8.0;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

/// Fresnel-Schlick with the spherical-Gaussian exponent.
pub fn fresnel_epic(f0: Color, h_dot_v: f32) -> Color {
    let power = 2.0f32.powf((-5.55473 * h_dot_v - 6.98316) * h_dot_v);
    f0 + (Color::ONE - f0) * power
}

/// PBR metallic-roughness material.
///
/// Every input is either a texture or a constant; the metallic and
/// roughness maps are read from their red channel.
pub struct PbrMetallicRoughness {
    albedo: Arc<dyn Texture>,
    tint: Color,
    normal_map: Option<Arc<dyn Texture>>,
    metallic_map: Option<Arc<dyn Texture>>,
    roughness_map: Option<Arc<dyn Texture>>,
    metallic: f32,
    roughness: f32,
}

impl PbrMetallicRoughness {
    /// Constant albedo, metallic and roughness.
    pub fn new(albedo: Color, metallic: f32, roughness: f32) -> Self {
        Self::with_texture(Arc::new(SolidColor::new(albedo)))
            .with_metallic(metallic)
            .with_roughness(roughness)
    }

    /// Textured albedo; dielectric with medium roughness until overridden.
    pub fn with_texture(albedo: Arc<dyn Texture>) -> Self {
        Self {
            albedo,
            tint: Color::ONE,
            normal_map: None,
            metallic_map: None,
            roughness_map: None,
            metallic: 0.0,
            roughness: 0.5,
        }
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_normal_map(mut self, map: Arc<dyn Texture>) -> Self {
        self.normal_map = Some(map);
        self
    }

    pub fn with_metallic_map(mut self, map: Arc<dyn Texture>) -> Self {
        self.metallic_map = Some(map);
        self
    }

    pub fn with_roughness_map(mut self, map: Arc<dyn Texture>) -> Self {
        self.roughness_map = Some(map);
        self
    }

    fn sample_scalar(map: &Option<Arc<dyn Texture>>, constant: f32, rec: &HitRecord) -> f32 {
        map.as_ref()
            .map_or(constant, |m| m.value(rec.u, rec.v, rec.p).x)
            .clamp(0.0, 1.0)
    }

    /// BRDF for light arriving along `l` and leaving along `v`.
    fn brdf(&self, n: Vec3, v: Vec3, l: Vec3, albedo: Color, metallic: f32, roughness: f32) -> Color {
        let n_dot_l = n.dot(l).max(0.0);
        let n_dot_v = n.dot(v).max(1e-4);
        let h = unit_vector(v + l);
        let n_dot_h = n.dot(h).max(0.0);
        let h_dot_v = h.dot(v).max(0.0);

        let f0 = Color::splat(DIELECTRIC_F0).lerp(albedo, metallic);
        let f = fresnel_epic(f0, h_dot_v);
        let d = trowbridge_reitz_ndf(n_dot_h, roughness);
        let g = schlick_gaf(n_dot_v, roughness) * schlick_gaf(n_dot_l, roughness);

        let specular = d * g * f / (4.0 * n_dot_l * n_dot_v).max(1e-4);
        let kd = (Color::ONE - f) * (1.0 - metallic);
        let diffuse = kd * albedo / PI;

        diffuse + specular
    }
}

impl Material for PbrMetallicRoughness {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let n = self
            .normal_map
            .as_deref()
            .and_then(|map| mapped_normal(rec, map))
            .unwrap_or(rec.normal);
        let v = -unit_vector(ray_in.direction());

        // Cosine-weighted direction around the shading normal
        let mut l = n + random_unit_vector(rng);
        if near_zero(l) {
            l = n;
        }
        let l = unit_vector(l);

        // Below either the shading or the geometric surface
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 || l.dot(rec.normal) <= 0.0 {
            return None;
        }

        let albedo = self.albedo.value(rec.u, rec.v, rec.p) * self.tint;
        let metallic = Self::sample_scalar(&self.metallic_map, self.metallic, rec);
        let roughness =
            Self::sample_scalar(&self.roughness_map, self.roughness, rec).max(MIN_ROUGHNESS);

        let brdf = self.brdf(n, v, l, albedo, metallic, roughness);
        let pdf = n_dot_l / PI;

        Some(ScatterResult {
            attenuation: brdf * n_dot_l / pdf,
            scattered: Ray::new(rec.p, l, ray_in.time()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageTexture;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rtp_core::ImageData;

    #[test]
    fn test_ndf_peaks_at_normal() {
        let rough = 0.5;
        assert!(trowbridge_reitz_ndf(1.0, rough) > trowbridge_reitz_ndf(0.8, rough));
        // alpha = 1 makes the distribution uniform: 1 / pi
        assert!((trowbridge_reitz_ndf(0.3, 1.0) - 1.0 / PI).abs() < 1e-5);
    }

    #[test]
    fn test_gaf_range() {
        assert!((schlick_gaf(1.0, 0.5) - 1.0).abs() < 1e-5);
        assert_eq!(schlick_gaf(0.0, 0.5), 0.0);
        let g = schlick_gaf(0.5, 0.5);
        assert!(g > 0.0 && g < 1.0);
    }

    #[test]
    fn test_fresnel_limits() {
        let f0 = Color::splat(0.04);
        // Head-on: exponent vanishes to ~2^-12.5
        let head_on = fresnel_epic(f0, 1.0);
        assert!((head_on.x - 0.04).abs() < 1e-3);
        // Grazing: full reflectance
        let grazing = fresnel_epic(f0, 0.0);
        assert!((grazing.x - 1.0).abs() < 1e-6);
    }

    fn scatter_many(mat: &PbrMetallicRoughness, count: usize) -> Vec<ScatterResult> {
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let mut rec = HitRecord::new(&ray, 1.0, Vec3::Z, mat);
        rec.tangent = Vec3::X;
        rec.bitangent = Vec3::Y;
        let mut rng = StdRng::seed_from_u64(17);
        (0..count)
            .filter_map(|_| mat.scatter(&ray, &rec, &mut rng))
            .collect()
    }

    #[test]
    fn test_scatter_is_finite_and_above_surface() {
        let mat = PbrMetallicRoughness::new(Color::new(0.9, 0.5, 0.2), 0.5, 0.3);
        let results = scatter_many(&mat, 500);
        assert!(!results.is_empty());
        for s in results {
            assert!(s.attenuation.is_finite());
            assert!(s.attenuation.min_element() >= 0.0);
            assert!(s.scattered.direction().z > 0.0);
        }
    }

    #[test]
    fn test_steep_normal_map_never_scatters_below_surface() {
        // Shading normal tilted about 80 degrees toward +X
        let tilted = Vec3::new(80f32.to_radians().sin(), 0.0, 80f32.to_radians().cos());
        let bytes = ((tilted * 128.0) + Vec3::splat(128.0)).min(Vec3::splat(255.0));
        let data = vec![bytes.x as u8, bytes.y as u8, bytes.z as u8];
        let map = ImageTexture::new(Arc::new(ImageData::new(1, 1, 3, data).unwrap()));

        let mat = PbrMetallicRoughness::new(Color::splat(0.8), 0.0, 0.5)
            .with_normal_map(Arc::new(map));
        let results = scatter_many(&mat, 2000);
        assert!(!results.is_empty());
        // Part of the lobe around the shading normal is culled
        assert!(results.len() < 2000);
        for s in results {
            assert!(s.scattered.direction().z > 0.0);
            assert!(s.attenuation.is_finite());
        }
    }

    #[test]
    fn test_full_metal_has_no_diffuse() {
        let n = Vec3::Z;
        let v = Vec3::Z;
        let l = unit_vector(Vec3::new(0.3, 0.0, 1.0));
        let albedo = Color::new(1.0, 0.8, 0.2);

        let metal = PbrMetallicRoughness::new(albedo, 1.0, 1.0);
        let brdf = metal.brdf(n, v, l, albedo, 1.0, 1.0);
        let h = unit_vector(v + l);
        let spec_only = trowbridge_reitz_ndf(n.dot(h), 1.0)
            * schlick_gaf(n.dot(v), 1.0)
            * schlick_gaf(n.dot(l), 1.0)
            * fresnel_epic(albedo, h.dot(v))
            / (4.0 * n.dot(l) * n.dot(v));
        assert!((brdf - spec_only).length() < 1e-5);
    }

    #[test]
    fn test_rough_dielectric_tracks_albedo() {
        // Mostly diffuse: the average weight stays near the albedo
        let albedo = Color::splat(0.5);
        let mat = PbrMetallicRoughness::new(albedo, 0.0, 1.0);
        let results = scatter_many(&mat, 4000);
        let mean = results
            .iter()
            .fold(Color::ZERO, |acc, s| acc + s.attenuation)
            / results.len() as f32;
        assert!(mean.x > 0.35 && mean.x < 0.75, "mean weight {:?}", mean);
    }
}
