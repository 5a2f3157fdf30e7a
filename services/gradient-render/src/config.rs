//! Command-line and environment configuration.
//!
//! Every flag can also be set through an environment variable, and a `.env`
//! file in the working directory is loaded before parsing.

use std::path::PathBuf;

use clap::Parser;
use raster_engine::PngMode;
use tracing::Level;

#[derive(Parser, Debug, Clone)]
#[command(name = "gradient-render")]
#[command(about = "Render a gradient on a pool of worker threads and save it as PNG")]
pub struct Args {
    /// Image width in pixels
    #[arg(short = 'W', long, env = "RENDER_WIDTH", default_value = "1024")]
    pub width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, env = "RENDER_HEIGHT", default_value = "1024")]
    pub height: u32,

    /// Worker threads (default: one per logical CPU)
    #[arg(short, long, env = "RENDER_WORKERS", allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Maximum rows waiting in the queue (default: unbounded)
    #[arg(long, env = "RENDER_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Output PNG path
    #[arg(short, long, env = "RENDER_OUTPUT", default_value = "gradient.png")]
    pub output: PathBuf,

    /// PNG color type: auto (indexed when possible) or rgba
    #[arg(long, env = "RENDER_FORMAT", default_value = "auto")]
    pub format: PngMode,

    /// Log every finished row
    #[arg(long)]
    pub progress: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
