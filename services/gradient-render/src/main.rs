//! Gradient render driver.
//!
//! Renders a linear RGB gradient with the parallel row engine, saves it as
//! a PNG and prints a JSON summary of the pass on stdout.

mod config;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use raster_engine::{save_png, Engine, Gradient, PngMode, RenderStats, RgbaBuffer, RowProgress};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::Args;

/// Printed on stdout after a successful run.
#[derive(Debug, Serialize)]
struct Summary {
    #[serde(flatten)]
    stats: RenderStats,
    output: PathBuf,
    format: PngMode,
    bytes: u64,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!(
        width = args.width,
        height = args.height,
        output = %args.output.display(),
        "Starting gradient render"
    );

    match run(&args) {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Render failed");
            Err(e)
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.level().to_string().to_lowercase()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    let installed = if args.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}

fn log_progress(progress: RowProgress) {
    info!(
        row = progress.row,
        completed = progress.completed,
        total = progress.total,
        worker = progress.worker,
        "Rendered row {} ({:.1}%)",
        progress.row,
        progress.fraction() * 100.0
    );
}

/// Render, encode and save one image.
fn run(args: &Args) -> Result<Summary> {
    let buffer = RgbaBuffer::new(args.width, args.height);
    let source = Gradient::new(args.width, args.height);
    let progress = log_progress;

    let mut engine = Engine::new(&source, &buffer).context("failed to set up render")?;
    if let Some(workers) = args.workers {
        engine
            .set_workers(workers)
            .context("invalid --workers")?;
    }
    engine
        .set_queue_capacity(args.queue_capacity)
        .context("invalid --queue-capacity")?;
    if args.progress {
        engine = engine.with_observer(&progress);
    }

    let stats = engine.run().context("render failed")?;

    let bytes = save_png(&args.output, &buffer, args.format)
        .with_context(|| format!("failed to save {}", args.output.display()))?;

    Ok(Summary {
        stats,
        output: args.output.clone(),
        format: args.format,
        bytes,
    })
}
