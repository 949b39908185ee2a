//! Thin-lens camera for ray generation.

use crate::sampling::{gen_f32, random_in_unit_disk};
use rand::RngCore;
use rtp_math::{unit_vector, Ray, Vec3};
use serde::{Deserialize, Serialize};

/// Camera placement and lens description.
///
/// Loaded from the render config file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Width over height of the viewport
    pub aspect: f32,
    /// Lens diameter; zero is a pinhole
    pub aperture: f32,
    /// Distance to the plane of perfect focus
    pub focus_dist: f32,
    /// Shutter open/close times
    pub time0: f32,
    pub time1: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(0.0, 3.0, 5.0),
            look_at: Vec3::new(0.0, 2.5, 0.0),
            vup: Vec3::Y,
            vfov: 70.0,
            aspect: 2.0,
            aperture: 0.1,
            focus_dist: 10.0,
            time0: 0.0,
            time1: 1.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
    time0: f32,
    time1: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = settings.aspect * viewport_height;

        // Camera basis
        let w = unit_vector(settings.look_from - settings.look_at);
        let u = unit_vector(settings.vup.cross(w));
        let v = unit_vector(w.cross(u));

        let origin = settings.look_from;
        let horizontal = settings.focus_dist * viewport_width * u;
        let vertical = settings.focus_dist * viewport_height * v;
        let lower_left = origin - horizontal / 2.0 - vertical / 2.0 - settings.focus_dist * w;

        Self {
            origin,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: settings.aperture / 2.0,
            time0: settings.time0,
            time1: settings.time1,
        }
    }

    /// Ray through normalized viewport coordinates, `(0, 0)` at the lower left.
    ///
    /// The origin is jittered across the lens and the time across the shutter.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;
        let time = self.time0 + (self.time1 - self.time0) * gen_f32(rng);

        Ray::new(
            self.origin + offset,
            self.lower_left + s * self.horizontal + t * self.vertical - self.origin - offset,
            time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> CameraSettings {
        CameraSettings::default()
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect(1.0)
    }

    #[test]
    fn test_center_ray_looks_at_target() {
        let camera = Camera::new(&pinhole());
        let ray = camera.get_ray(0.5, 0.5, &mut StdRng::seed_from_u64(0));

        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((unit_vector(ray.direction()) - (-Vec3::Z)).length() < 1e-5);
    }

    #[test]
    fn test_corner_rays() {
        // 90 degree fov at focus distance 1 spans [-1, 1]
        let camera = Camera::new(&pinhole());
        let mut rng = StdRng::seed_from_u64(0);

        let ll = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((ll.direction() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);
        let ur = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((ur.direction() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_lens_and_shutter_jitter() {
        let settings = pinhole().with_lens(90.0, 0.5, 1.0).with_shutter(2.0, 3.0);
        let camera = Camera::new(&settings);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().length() < 0.25 + 1e-5);
            assert!(ray.origin().z.abs() < 1e-6);
            assert!((2.0..=3.0).contains(&ray.time()));
            // All lens samples converge on the focus point
            let focus = ray.origin() + ray.direction();
            assert!((focus - (-Vec3::Z)).length() < 1e-5);
        }
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: CameraSettings =
            serde_json::from_str(r#"{ "vfov": 40.0, "look_from": [1.0, 2.0, 3.0] }"#).unwrap();
        assert_eq!(settings.vfov, 40.0);
        assert_eq!(settings.look_from, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(settings.aspect, CameraSettings::default().aspect);
    }
}
