// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Application name, used for config and snapshot directory names
pub const APP_NAME: &str = "depth-viewer";

/// Negotiated stream width in pixels (fixed, both streams)
pub const STREAM_WIDTH: u32 = 640;

/// Negotiated stream height in pixels (fixed, both streams)
pub const STREAM_HEIGHT: u32 = 480;

/// Negotiated stream rate in frames per second
pub const STREAM_RATE: u32 = 30;

/// Bytes per pixel for display buffers (B, G, R)
pub const DISPLAY_BYTES_PER_PIXEL: u32 = 3;

/// Maximum raw depth sample value (full 16-bit range)
pub const DEPTH_RAW_MAX: u16 = u16::MAX;

/// How many acquire attempts a one-shot snapshot makes before giving up
pub const SNAPSHOT_ACQUIRE_ATTEMPTS: u32 = 30;
