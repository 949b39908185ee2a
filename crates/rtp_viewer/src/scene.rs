//! The demo scene: a checkered ground, one strong light and a handful of
//! spheres and a textured quad showing each material.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtp_core::{Mesh, TextureCache};
use rtp_math::{Mat4, Quat, Vec2, Vec3};
use rtp_renderer::{
    Bvh, Checker, Color, Dielectric, DiffuseLight, HittableList, ImageTexture, Lambertian,
    Material, Metal, PbrMetallicRoughness, Sphere, Texture, Triangle,
};
use std::sync::Arc;

const IRON_ALBEDO: &str = "rustediron2_basecolor-2x1.png";
const IRON_NORMAL: &str = "rustediron2_normal-2x1.png";
const IRON_METALLIC: &str = "rustediron2_metallic-2x1.png";
const IRON_ROUGHNESS: &str = "rustediron2_roughness-2x1.png";

/// Build the demo scene and its BVH over the shutter `[time0, time1]`.
///
/// Missing textures are logged and sampled as magenta.
pub fn demo_scene(textures: &mut TextureCache, seed: u64, time0: f32, time1: f32) -> Result<Bvh> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = HittableList::new();

    // Ground
    let checker: Arc<dyn Texture> = Arc::new(Checker::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    let ground = PbrMetallicRoughness::with_texture(checker).with_roughness(0.8);
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(ground),
    )));

    // Light
    let light = DiffuseLight::new(Color::new(250.2, 220.9, 110.2));
    world.add(Box::new(Sphere::new(Vec3::new(-7.0, 4.0, 6.0), 1.0, Arc::new(light))));

    let iron = rusted_iron(textures);
    world.add(Box::new(Sphere::new(Vec3::new(-3.0, 1.0, 0.0), 1.0, iron)));

    let metal = Metal::new(Color::new(0.7, 0.6, 0.5), 0.0);
    world.add(Box::new(Sphere::new(Vec3::new(3.0, 1.0, 0.0), 1.0, Arc::new(metal))));

    let glass = Dielectric::new(1.5);
    world.add(Box::new(Sphere::new(Vec3::new(0.0, 1.0, 2.25), 1.0, Arc::new(glass))));

    // Small diffuse spheres bouncing up during the shutter
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        let center0 = Vec3::new(5.5 * angle.cos(), 0.2, 5.5 * angle.sin() - 1.0);
        let center1 = center0 + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
        let albedo = Color::new(
            rng.gen::<f32>() * rng.gen::<f32>(),
            rng.gen::<f32>() * rng.gen::<f32>(),
            rng.gen::<f32>() * rng.gen::<f32>(),
        );
        world.add(Box::new(Sphere::moving(
            center0,
            center1,
            time0,
            time1,
            0.2,
            Arc::new(Lambertian::new(albedo)),
        )));
    }

    for triangle in textured_quad(textures)? {
        world.add(Box::new(triangle));
    }

    log::info!("Demo scene: {} objects", world.len());

    Bvh::new(world, time0, time1, &mut rng).context("Failed to build scene BVH")
}

/// PBR material from the rusted iron texture set.
fn rusted_iron(textures: &mut TextureCache) -> Arc<dyn Material> {
    let albedo = ImageTexture::from_option(textures.load_or_warn(IRON_ALBEDO, 3));
    let mut material = PbrMetallicRoughness::with_texture(Arc::new(albedo));

    if let Some(normal) = textures.load_or_warn(IRON_NORMAL, 3) {
        material = material.with_normal_map(Arc::new(ImageTexture::new(normal)));
    }
    if let Some(metallic) = textures.load_or_warn(IRON_METALLIC, 1) {
        material = material.with_metallic_map(Arc::new(ImageTexture::new(metallic)));
    }
    if let Some(roughness) = textures.load_or_warn(IRON_ROUGHNESS, 1) {
        material = material.with_roughness_map(Arc::new(ImageTexture::new(roughness)));
    }

    Arc::new(material)
}

/// Unit quad standing behind the spheres, turned slightly toward the camera.
fn textured_quad(textures: &mut TextureCache) -> Result<Vec<Triangle>> {
    let mut mesh = Mesh::new(
        vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
        Some(vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ]),
    )
    .context("Failed to build demo quad")?;

    mesh.transform(&Mat4::from_scale_rotation_translation(
        Vec3::splat(1.5),
        Quat::from_rotation_y((-15.0f32).to_radians()),
        Vec3::new(0.0, 2.0, -3.0),
    ));

    // Shares the cached albedo image with the iron sphere
    let albedo = ImageTexture::from_option(textures.load_or_warn(IRON_ALBEDO, 3));
    let material = Lambertian::with_texture(Arc::new(albedo)).with_tint(Color::splat(0.9));

    Ok(Triangle::from_mesh(Arc::new(mesh), Arc::new(material)))
}
