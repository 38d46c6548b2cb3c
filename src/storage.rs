// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot storage
//!
//! Writes the current color and depth display buffers as timestamped PNG
//! files under the snapshot directory.

use crate::config::Config;
use crate::constants::APP_NAME;
use crate::errors::{AppError, AppResult};
use crate::render::display::DisplayBuffer;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve the snapshot directory: configured override, else
/// ~/Pictures/depth-viewer, else ./depth-viewer
pub fn snapshot_dir(config: &Config) -> PathBuf {
    if let Some(dir) = &config.snapshot_dir {
        return dir.clone();
    }
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Convert a (B, G, R) display buffer into an RGB image
fn to_rgb_image(display: &DisplayBuffer) -> AppResult<image::RgbImage> {
    let mut rgb = Vec::with_capacity(display.as_bytes().len());
    for px in display.as_bytes().chunks_exact(3) {
        rgb.push(px[2]);
        rgb.push(px[1]);
        rgb.push(px[0]);
    }
    image::RgbImage::from_raw(display.width(), display.height(), rgb)
        .ok_or_else(|| AppError::Storage("display buffer has no pixels".to_string()))
}

/// Save both display buffers as PNGs, returning the written paths
pub fn save_snapshot(
    color: &DisplayBuffer,
    depth: &DisplayBuffer,
    dir: &Path,
) -> AppResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::Storage(e.to_string()))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let color_path = dir.join(format!("color_{}.png", timestamp));
    let depth_path = dir.join(format!("depth_{}.png", timestamp));

    to_rgb_image(color)?
        .save(&color_path)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    to_rgb_image(depth)?
        .save(&depth_path)
        .map_err(|e| AppError::Storage(e.to_string()))?;

    info!(
        color = %color_path.display(),
        depth = %depth_path.display(),
        "Snapshot saved"
    );
    Ok((color_path, depth_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_conversion_swaps_channels() {
        let mut display = DisplayBuffer::new(1, 1);
        display.set_bgr(0, 0, [30, 20, 10]);

        let img = to_rgb_image(&display).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_snapshot_dir_override() {
        let mut config = Config::default();
        config.snapshot_dir = Some(PathBuf::from("/tmp/override"));
        assert_eq!(snapshot_dir(&config), PathBuf::from("/tmp/override"));
    }
}
