use anyhow::{Context, Result};
use rtp_renderer::{CameraSettings, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the host needs to render a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Image height in pixels
    pub height: u32,
    pub render: RenderConfig,
    pub camera: CameraSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            height: 240,
            render: RenderConfig::default(),
            camera: CameraSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Image width from the height and the camera aspect ratio.
    pub fn width(&self) -> u32 {
        ((self.height as f32 * self.camera.aspect) as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_width_follows_aspect() {
        let config = ViewerConfig::default();
        assert_eq!(config.width(), 480);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "height": 100, "render": {{ "samples_per_pixel": 8 }}, "camera": {{ "aspect": 1.5 }} }}"#
        )
        .unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.height, 100);
        assert_eq!(config.width(), 150);
        assert_eq!(config.render.samples_per_pixel, 8);
        assert_eq!(config.render.max_depth, RenderConfig::default().max_depth);
    }

    #[test]
    fn test_load_errors() {
        assert!(ViewerConfig::load(Path::new("/nonexistent/rtp.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ViewerConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
