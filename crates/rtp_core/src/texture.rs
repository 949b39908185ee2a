//! Decoded image buffers and a texture cache that loads them from disk.
//!
//! Pixels stay as raw bytes (row-major, `bytes_per_pixel` channels per texel);
//! conversion to colors happens when the tracer samples them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported texture format: {0}")]
    UnsupportedFormat(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image: `width * height * bytes_per_pixel` bytes, row-major.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    /// Wrap an already-decoded buffer, checking its length.
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32, data: Vec<u8>) -> TextureResult<Self> {
        if !(1..=4).contains(&bytes_per_pixel) {
            return Err(TextureError::UnsupportedFormat(format!(
                "{} bytes per pixel",
                bytes_per_pixel
            )));
        }

        let expected = width as usize * height as usize * bytes_per_pixel as usize;
        if data.len() != expected || expected == 0 {
            return Err(TextureError::LoadError(format!(
                "{}x{}x{} image needs {} bytes, got {}",
                width,
                height,
                bytes_per_pixel,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            data,
        })
    }

    /// Decode an encoded image (PNG, JPEG, ...) held in memory.
    pub fn decode(bytes: &[u8], channels: u32) -> TextureResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Self::from_dynamic(img, channels)
    }

    fn from_dynamic(img: image::DynamicImage, channels: u32) -> TextureResult<Self> {
        let (width, height) = (img.width(), img.height());
        let data = match channels {
            1 => img.to_luma8().into_raw(),
            2 => img.to_luma_alpha8().into_raw(),
            3 => img.to_rgb8().into_raw(),
            4 => img.to_rgba8().into_raw(),
            n => {
                return Err(TextureError::UnsupportedFormat(format!(
                    "{} channels requested",
                    n
                )))
            }
        };
        Self::new(width, height, channels, data)
    }

    /// Channel bytes of the texel at integer coordinates (clamped to the image).
    pub fn texel(&self, x: u32, y: u32) -> &[u8] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let bpp = self.bytes_per_pixel as usize;
        let start = (y * self.width as usize + x) * bpp;
        &self.data[start..start + bpp]
    }

    /// Get total size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and cached per (path, channel count).
pub struct TextureCache {
    textures: HashMap<(String, u32), Arc<ImageData>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file with `channels` bytes per pixel, using the
    /// cache if available.
    pub fn load(&mut self, path: &str, channels: u32) -> TextureResult<Arc<ImageData>> {
        let key = (path.to_string(), channels);
        if let Some(texture) = self.textures.get(&key) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path, channels)?);
        self.textures.insert(key, texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.bytes_per_pixel,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Load a texture, logging and returning `None` on failure.
    ///
    /// Callers turn `None` into the tracer's missing-texture sentinel so a
    /// broken asset shows up in the image instead of aborting the render.
    pub fn load_or_warn(&mut self, path: &str, channels: u32) -> Option<Arc<ImageData>> {
        match self.load(path, channels) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Could not load image file '{}': {}", path, e);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Get total memory usage of cached textures.
    pub fn total_size_bytes(&self) -> usize {
        self.textures.values().map(|t| t.size_bytes()).sum()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

fn load_texture_file(path: &Path, channels: u32) -> TextureResult<ImageData> {
    let img = image::open(path).map_err(|e| {
        TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    ImageData::from_dynamic(img, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_validates_length() {
        assert!(ImageData::new(2, 2, 3, vec![0; 12]).is_ok());
        assert!(matches!(
            ImageData::new(2, 2, 3, vec![0; 11]),
            Err(TextureError::LoadError(_))
        ));
        assert!(matches!(
            ImageData::new(1, 1, 5, vec![0; 5]),
            Err(TextureError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_texel_lookup_and_clamp() {
        // 2x1 RGB: red, green
        let img = ImageData::new(2, 1, 3, vec![255, 0, 0, 0, 255, 0]).unwrap();

        assert_eq!(img.texel(0, 0), &[255, 0, 0]);
        assert_eq!(img.texel(1, 0), &[0, 255, 0]);
        assert_eq!(img.texel(7, 3), &[0, 255, 0]);
    }

    #[test]
    fn test_cache_loads_and_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let mut rgb = image::RgbImage::new(4, 2);
        rgb.put_pixel(3, 1, image::Rgb([10, 20, 30]));
        rgb.save(dir.path().join("tex.png")).unwrap();

        let mut cache = TextureCache::with_base_dir(dir.path());
        let a = cache.load("tex.png", 3).unwrap();
        let b = cache.load("tex.png", 3).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!((a.width, a.height, a.bytes_per_pixel), (4, 2, 3));
        assert_eq!(a.texel(3, 1), &[10, 20, 30]);

        // Same file as a single channel map is a separate entry
        let gray = cache.load("tex.png", 1).unwrap();
        assert_eq!(gray.bytes_per_pixel, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cache = TextureCache::new();
        assert!(matches!(
            cache.load("does/not/exist.png", 3),
            Err(TextureError::LoadError(_))
        ));
        assert!(cache.load_or_warn("does/not/exist.png", 3).is_none());
        assert!(cache.is_empty());
    }
}
