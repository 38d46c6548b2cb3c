// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available capture devices
//! - Taking a one-shot snapshot without the interactive viewer

use depth_viewer::capture::{self, SensorFormat, StreamKind};
use depth_viewer::config::Config;
use depth_viewer::constants::{
    SNAPSHOT_ACQUIRE_ATTEMPTS, STREAM_HEIGHT, STREAM_RATE, STREAM_WIDTH,
};
use depth_viewer::render::display::DisplayBuffer;
use depth_viewer::render::driver::RenderLoop;
use depth_viewer::storage;
use std::path::PathBuf;
use v4l::prelude::*;
use v4l::video::Capture;

/// List all V4L2 capture devices with their current format
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let nodes = v4l::context::enum_devices();

    if nodes.is_empty() {
        println!("No V4L2 capture devices found.");
        return Ok(());
    }

    println!("Available capture devices:");
    println!();
    for node in nodes {
        let name = node.name().unwrap_or_else(|| "unknown".to_string());
        println!("  [{}] {} ({})", node.index(), name, node.path().display());

        if let Ok(dev) = Device::with_path(node.path())
            && let Ok(format) = dev.format()
        {
            let friendly = SensorFormat::from_fourcc(&format.fourcc.repr)
                .map(|f| f.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            println!(
                "      Current format: {}x{} {} ({})",
                format.width, format.height, format.fourcc, friendly
            );
        }
        println!();
    }

    Ok(())
}

/// Capture one frame pair and save both surfaces as PNG files
pub fn snapshot(
    config: &Config,
    synthetic: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = capture::create_source(config, synthetic);
    println!("Using source: {}", source.name());

    source.enable_stream(StreamKind::Color, STREAM_WIDTH, STREAM_HEIGHT, STREAM_RATE)?;
    source.enable_stream(StreamKind::Depth, STREAM_WIDTH, STREAM_HEIGHT, STREAM_RATE)?;
    source.init()?;

    let mut color = DisplayBuffer::new(STREAM_WIDTH, STREAM_HEIGHT);
    let mut depth = DisplayBuffer::new(STREAM_WIDTH, STREAM_HEIGHT);
    let mut driver = RenderLoop::new();
    driver.activate();

    println!("Capturing...");
    let mut delivered = false;
    for _ in 0..SNAPSHOT_ACQUIRE_ATTEMPTS {
        driver.on_idle(&mut *source, &mut color, &mut depth);
        if driver.frames() > 0 {
            delivered = true;
            break;
        }
    }
    if !delivered {
        return Err("no frame delivered by the source".into());
    }

    let dir = output.unwrap_or_else(|| storage::snapshot_dir(config));
    let (color_path, depth_path) = storage::save_snapshot(&color, &depth, &dir)?;
    println!("Saved: {}", color_path.display());
    println!("Saved: {}", depth_path.display());

    Ok(())
}
