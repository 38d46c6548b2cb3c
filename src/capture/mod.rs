// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! This module provides a trait-based abstraction over paired color/depth
//! frame delivery, with two implementations: direct V4L2 capture and an
//! in-process synthetic pattern source.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Viewer / Driver    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  FrameSource trait  │  ← enable_stream / init / acquire
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴──────┐
//!      ▼            ▼
//! ┌─────────┐ ┌───────────┐
//! │  V4L2   │ │ Synthetic │
//! └─────────┘ └───────────┘
//! ```
//!
//! Frame release is expressed through ownership: `acquire` returns a
//! [`Frame`](types::Frame) that borrows the source, so the frame is
//! released exactly once (on drop) and no second acquire can start while
//! one is outstanding.

pub mod synthetic;
pub mod types;
pub mod v4l2;

pub use types::{CaptureError, CaptureResult, Frame, SensorFormat, SensorImage, StreamKind};

use crate::config::{Config, SourceKind};

/// A source of paired color and depth frames
///
/// Lifecycle: `enable_stream` for each stream kind, then `init`, then any
/// number of `acquire` brackets. Teardown happens on drop.
pub trait FrameSource {
    /// Negotiate one stream before initialization
    ///
    /// # Arguments
    /// * `kind` - Color or Depth
    /// * `width`, `height` - requested geometry in pixels
    /// * `rate` - requested frames per second (0 = source default / unpaced)
    fn enable_stream(
        &mut self,
        kind: StreamKind,
        width: u32,
        height: u32,
        rate: u32,
    ) -> CaptureResult<()>;

    /// Open the device(s) and start streaming
    ///
    /// Both streams must have been enabled. Failure here is fatal at
    /// startup ([`CaptureError::Negotiation`]).
    fn init(&mut self) -> CaptureResult<()>;

    /// Whether `init` has completed successfully
    fn is_initialized(&self) -> bool;

    /// Acquire the next frame pair
    ///
    /// With `blocking` set, waits for the next frame the source delivers;
    /// otherwise returns [`CaptureError::Busy`] when no frame is due yet.
    /// Acquire failures are transient statuses, not fatal errors; the
    /// caller decides whether to retry.
    fn acquire(&mut self, blocking: bool) -> CaptureResult<Frame<'_>>;

    /// Short human-readable source name for the status line
    fn name(&self) -> &'static str;
}

/// Build the frame source selected by config (or forced synthetic)
pub fn create_source(config: &Config, force_synthetic: bool) -> Box<dyn FrameSource> {
    if force_synthetic || config.source == SourceKind::Synthetic {
        Box::new(synthetic::SyntheticSource::new())
    } else {
        Box::new(v4l2::V4l2Source::new(
            &config.color_device,
            &config.depth_device,
        ))
    }
}
