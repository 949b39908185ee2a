use anyhow::{Context, Result};
use image::RgbaImage;
use rtp_renderer::FrameBuffer;
use std::path::Path;

/// Write the frame buffer's current average as an 8-bit PNG.
pub fn save_png(frame: &FrameBuffer, path: &Path) -> Result<()> {
    let image = RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba8())
        .context("Frame buffer size does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!(
        "Wrote {} ({} passes)",
        path.display(),
        frame.passes()
    );
    Ok(())
}
