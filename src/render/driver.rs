// SPDX-License-Identifier: GPL-3.0-only

//! Cooperative render loop
//!
//! The loop is driven by idle notifications from the surrounding event
//! loop rather than a timer: while active, every notification runs one
//! step (acquire, convert both images, release, request repaint) and asks
//! to be notified again. Step frequency is therefore bounded by camera
//! delivery and idle-event frequency. Everything runs on the caller's
//! thread; at most one step is ever in flight.

use crate::capture::FrameSource;
use crate::render::convert::{convert_color, convert_depth};
use crate::render::display::DisplayBuffer;
use tracing::{debug, warn};

/// Loop state: detached does nothing and requests nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    IdleDetached,
    Active,
}

/// What one idle notification asks of the surrounding event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Schedule a (non-forced) repaint of both display regions
    pub repaint: bool,
    /// Deliver another idle notification
    pub request_more: bool,
}

impl StepOutcome {
    const DETACHED: Self = Self {
        repaint: false,
        request_more: false,
    };
    const STEPPED: Self = Self {
        repaint: true,
        request_more: true,
    };
}

/// Render loop state machine
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
    last_status: Option<String>,
}

impl RenderLoop {
    /// Create a loop in the detached state
    pub fn new() -> Self {
        Self {
            state: LoopState::IdleDetached,
            frames: 0,
            last_status: None,
        }
    }

    /// Subscribe to idle notifications; idempotent
    pub fn activate(&mut self) {
        if self.state != LoopState::Active {
            debug!("Render loop activated");
            self.state = LoopState::Active;
        }
    }

    /// Unsubscribe from idle notifications; a no-op when already
    /// detached. Takes effect before the next notification, never
    /// mid-step.
    pub fn deactivate(&mut self) {
        if self.state != LoopState::IdleDetached {
            debug!("Render loop deactivated");
            self.state = LoopState::IdleDetached;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LoopState::Active
    }

    /// Frames successfully acquired since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Most recent capture/conversion status message, if any
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    /// Run one step of the render loop
    ///
    /// When detached this does nothing and requests nothing. When active:
    /// acquire a frame (blocking), transcode both images into the display
    /// buffers, release the frame, then request a repaint and another
    /// notification. A failed acquire skips conversion but still requests
    /// the repaint and the next notification; the polling loop is the
    /// retry.
    pub fn on_idle(
        &mut self,
        source: &mut dyn FrameSource,
        color: &mut DisplayBuffer,
        depth: &mut DisplayBuffer,
    ) -> StepOutcome {
        if self.state != LoopState::Active {
            return StepOutcome::DETACHED;
        }

        match source.acquire(true) {
            Err(e) => {
                debug!(error = %e, "Frame acquire failed, skipping step");
                self.last_status = Some(e.to_string());
            }
            Ok(frame) => {
                if let Err(e) = convert_color(&frame.color, color) {
                    warn!(error = %e, "Color conversion skipped");
                    self.last_status = Some(format!("color: {}", e));
                }
                if let Err(e) = convert_depth(&frame.depth, depth) {
                    warn!(error = %e, "Depth conversion skipped");
                    self.last_status = Some(format!("depth: {}", e));
                }
                // Frame released here (drop ends the acquire bracket)
                drop(frame);
                self.frames += 1;
            }
        }

        StepOutcome::STEPPED
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
