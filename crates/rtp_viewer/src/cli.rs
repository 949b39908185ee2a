use crate::config::ViewerConfig;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "rtp")]
#[command(about = "Render the rtp demo scene with the CPU path tracer")]
pub struct Args {
    /// JSON render settings; command line flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Directory holding the demo scene textures
    #[arg(long, default_value = "data")]
    pub textures: PathBuf,

    /// Image height in pixels; width follows the camera aspect
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for the scene layout, BVH build and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rewrite the output every N passes while rendering
    #[arg(long)]
    pub checkpoint: Option<u32>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut ViewerConfig) {
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.render.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.render.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.render.seed = seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["rtp", "--samples", "32", "--height", "120", "--seed", "5"]);
        let mut config = ViewerConfig::default();
        args.apply(&mut config);

        assert_eq!(config.render.samples_per_pixel, 32);
        assert_eq!(config.height, 120);
        assert_eq!(config.render.seed, 5);
        assert_eq!(config.render.max_depth, ViewerConfig::default().render.max_depth);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["rtp", "--log-level", "debug"]);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }
}
