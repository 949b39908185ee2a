//! Texture trait and the procedural / image-backed textures.
//!
//! Colors are linear RGB in `[0, 1]`; image bytes are divided by 255.

use crate::Color;
use rtp_core::ImageData;
use rtp_math::Vec3;
use std::sync::Arc;

/// Returned by image textures with no pixel data.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Anything that maps a surface point to a color.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// Checker cells per 2π world units along each axis.
const CHECKER_FREQUENCY: f32 = 10.0;

/// 3D checkerboard alternating between two textures.
pub struct Checker {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl Checker {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self { even, odd }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }
}

impl Texture for Checker {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let f = CHECKER_FREQUENCY;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Nearest-texel lookup into decoded image data.
pub struct ImageTexture {
    image: Option<Arc<ImageData>>,
}

impl ImageTexture {
    pub fn new(image: Arc<ImageData>) -> Self {
        Self { image: Some(image) }
    }

    /// Texture whose image failed to load; samples as magenta.
    pub fn missing() -> Self {
        Self { image: None }
    }

    pub fn from_option(image: Option<Arc<ImageData>>) -> Self {
        Self { image }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let Some(image) = &self.image else {
            return MISSING_TEXTURE_COLOR;
        };
        if image.width == 0 || image.height == 0 {
            return MISSING_TEXTURE_COLOR;
        }

        // Image rows run top to bottom
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * image.width as f32) as u32).min(image.width - 1);
        let j = ((v * image.height as f32) as u32).min(image.height - 1);

        match image.texel(i, j) {
            [g] | [g, _] => Color::splat(*g as f32 / 255.0),
            [r, g, b, ..] => Color::new(*r as f32, *g as f32, *b as f32) / 255.0,
            [] => MISSING_TEXTURE_COLOR,
        }
    }
}

/// Decode a tangent-space normal stored in an 8-bit texture.
///
/// `color` is the texture value in `[0, 1]`; channels are remapped as
/// `(c - 128) / 128` on the 8-bit scale.
pub(crate) fn decode_normal(color: Color) -> Vec3 {
    (color * 255.0 - Vec3::splat(128.0)) / 128.0
}
