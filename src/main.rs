// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depth_viewer::config::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-viewer")]
#[command(about = "Side-by-side color and depth stream viewer")]
#[command(version)]
struct Cli {
    /// Use the built-in synthetic frame source instead of V4L2 devices
    #[arg(long, global = true)]
    synthetic: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available V4L2 capture devices
    List,

    /// Capture one frame pair and save it as PNG images
    Snapshot {
        /// Output directory (default: ~/Pictures/depth-viewer)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_viewer=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Some(Commands::List) => cli::list_devices()?,
        Some(Commands::Snapshot { output }) => cli::snapshot(&config, cli.synthetic, output)?,
        None => depth_viewer::viewer::run(&config, cli.synthetic)?,
    }

    Ok(())
}
