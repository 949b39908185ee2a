use anyhow::Result;
use clap::Parser;
use rtp_core::TextureCache;
use rtp_renderer::{render, render_pass, Camera, FrameBuffer};
use std::time::Instant;

mod cli;
mod config;
mod logger;
mod output;
mod scene;

use cli::Args;
use config::ViewerConfig;
use logger::init_logger;
use output::save_png;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    args.apply(&mut config);

    let width = config.width();
    let height = config.height;
    let camera = Camera::new(&config.camera);

    let mut textures = TextureCache::with_base_dir(args.textures.clone());
    let world = scene::demo_scene(
        &mut textures,
        config.render.seed,
        config.camera.time0,
        config.camera.time1,
    )?;
    log::info!(
        "Loaded {} textures ({:.1} MB)",
        textures.len(),
        textures.total_size_bytes() as f64 / (1024.0 * 1024.0)
    );

    let frame = match args.checkpoint {
        Some(every) if every > 0 => {
            let start = Instant::now();
            let mut frame = FrameBuffer::new(width, height);
            for _ in 0..config.render.samples_per_pixel {
                render_pass(&camera, &world, &config.render, &mut frame);
                if frame.passes() % every == 0 {
                    save_png(&frame, &args.output)?;
                }
            }
            log::info!("Render finished in {:.2?}", start.elapsed());
            frame
        }
        _ => render(&camera, &world, &config.render, width, height),
    };

    save_png(&frame, &args.output)?;
    Ok(())
}
