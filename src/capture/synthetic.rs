// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic frame source
//!
//! Generates deterministic color/depth frame pairs without hardware. Used
//! by the `--synthetic` flag when no depth camera is attached, and by the
//! test suite, which also needs uniform fills and injectable acquire
//! failures.

use super::FrameSource;
use super::types::{CaptureError, CaptureResult, Frame, SensorFormat, SensorImage, StreamKind};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct StreamConfig {
    width: u32,
    height: u32,
    rate: u32,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// Animated gradient sweep (demo mode)
    Sweep,
    /// Every color pixel is `rgb`, every depth sample is `z_raw`
    Uniform { rgb: [u8; 3], z_raw: u16 },
}

/// In-process frame source producing synthetic patterns
pub struct SyntheticSource {
    pattern: Pattern,
    color_cfg: Option<StreamConfig>,
    depth_cfg: Option<StreamConfig>,
    initialized: bool,
    color_data: Vec<u8>,
    depth_data: Vec<u8>,
    phase: u32,
    pending_failures: u32,
    last_frame_at: Option<Instant>,
}

impl SyntheticSource {
    /// Create a source producing an animated gradient sweep
    pub fn new() -> Self {
        Self::with_pattern(Pattern::Sweep)
    }

    /// Create a source where every color pixel is `rgb` (R, G, B byte
    /// order) and every depth sample is `z_raw`
    pub fn uniform(rgb: [u8; 3], z_raw: u16) -> Self {
        Self::with_pattern(Pattern::Uniform { rgb, z_raw })
    }

    fn with_pattern(pattern: Pattern) -> Self {
        Self {
            pattern,
            color_cfg: None,
            depth_cfg: None,
            initialized: false,
            color_data: Vec::new(),
            depth_data: Vec::new(),
            phase: 0,
            pending_failures: 0,
            last_frame_at: None,
        }
    }

    /// Make the next `count` acquires fail with [`CaptureError::Busy`]
    pub fn fail_next(&mut self, count: u32) {
        self.pending_failures = count;
    }

    fn regenerate(&mut self, color_cfg: StreamConfig, depth_cfg: StreamConfig) {
        let (cw, ch) = (color_cfg.width as usize, color_cfg.height as usize);
        let (dw, dh) = (depth_cfg.width as usize, depth_cfg.height as usize);

        match self.pattern {
            Pattern::Uniform { rgb, z_raw } => {
                for px in self.color_data.chunks_exact_mut(3) {
                    px.copy_from_slice(&rgb);
                }
                let be = z_raw.to_be_bytes();
                for px in self.depth_data.chunks_exact_mut(2) {
                    px.copy_from_slice(&be);
                }
            }
            Pattern::Sweep => {
                let phase = self.phase as usize;
                for y in 0..ch {
                    for x in 0..cw {
                        let i = (y * cw + x) * 3;
                        self.color_data[i] = (x * 255 / cw.max(1)) as u8;
                        self.color_data[i + 1] = (y * 255 / ch.max(1)) as u8;
                        self.color_data[i + 2] = (phase & 0xFF) as u8;
                    }
                }
                // Horizontal depth ramp scrolling with the phase
                for y in 0..dh {
                    for x in 0..dw {
                        let i = (y * dw + x) * 2;
                        let t = (x + phase * 4) % dw.max(1);
                        let z = (t * 65535 / dw.max(1)) as u16;
                        self.depth_data[i..i + 2].copy_from_slice(&z.to_be_bytes());
                    }
                }
            }
        }
        self.phase = self.phase.wrapping_add(1);
    }

    /// Pace delivery to the negotiated rate; `rate == 0` means unpaced
    fn wait_for_frame(&mut self, blocking: bool) -> CaptureResult<()> {
        let rate = self.color_cfg.map(|c| c.rate).unwrap_or(0);
        if rate == 0 {
            return Ok(());
        }
        let interval = Duration::from_secs(1) / rate;
        let due = match self.last_frame_at {
            Some(last) => last + interval,
            None => Instant::now(),
        };
        let now = Instant::now();
        if now < due {
            if !blocking {
                return Err(CaptureError::Busy);
            }
            std::thread::sleep(due - now);
        }
        self.last_frame_at = Some(Instant::now());
        Ok(())
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticSource {
    fn enable_stream(
        &mut self,
        kind: StreamKind,
        width: u32,
        height: u32,
        rate: u32,
    ) -> CaptureResult<()> {
        if self.initialized {
            return Err(CaptureError::Negotiation(
                "source already initialized".into(),
            ));
        }
        let cfg = StreamConfig {
            width,
            height,
            rate,
        };
        match kind {
            StreamKind::Color => self.color_cfg = Some(cfg),
            StreamKind::Depth => self.depth_cfg = Some(cfg),
        }
        Ok(())
    }

    fn init(&mut self) -> CaptureResult<()> {
        let color = self
            .color_cfg
            .ok_or_else(|| CaptureError::Negotiation("color stream not enabled".into()))?;
        let depth = self
            .depth_cfg
            .ok_or_else(|| CaptureError::Negotiation("depth stream not enabled".into()))?;
        self.color_data = vec![0u8; (color.width * color.height * 3) as usize];
        self.depth_data = vec![0u8; (depth.width * depth.height * 2) as usize];
        self.initialized = true;
        debug!(
            color_width = color.width,
            color_height = color.height,
            depth_width = depth.width,
            depth_height = depth.height,
            "Synthetic source initialized"
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn acquire(&mut self, blocking: bool) -> CaptureResult<Frame<'_>> {
        if !self.initialized {
            return Err(CaptureError::NotInitialized);
        }
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(CaptureError::Busy);
        }
        let (Some(color_cfg), Some(depth_cfg)) = (self.color_cfg, self.depth_cfg) else {
            return Err(CaptureError::NotInitialized);
        };
        self.wait_for_frame(blocking)?;
        self.regenerate(color_cfg, depth_cfg);

        Ok(Frame {
            color: SensorImage::new(
                color_cfg.width,
                color_cfg.height,
                SensorFormat::Rgb24,
                color_cfg.width * 3,
                &self.color_data,
            ),
            depth: SensorImage::new(
                depth_cfg.width,
                depth_cfg.height,
                SensorFormat::Depth16,
                depth_cfg.width * 2,
                &self.depth_data,
            ),
        })
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_source(pattern: SyntheticSource, w: u32, h: u32) -> SyntheticSource {
        let mut src = pattern;
        src.enable_stream(StreamKind::Color, w, h, 0).unwrap();
        src.enable_stream(StreamKind::Depth, w, h, 0).unwrap();
        src.init().unwrap();
        src
    }

    #[test]
    fn test_acquire_before_init_fails() {
        let mut src = SyntheticSource::new();
        assert!(matches!(
            src.acquire(true),
            Err(CaptureError::NotInitialized)
        ));
    }

    #[test]
    fn test_init_requires_both_streams() {
        let mut src = SyntheticSource::new();
        src.enable_stream(StreamKind::Color, 4, 4, 0).unwrap();
        assert!(matches!(src.init(), Err(CaptureError::Negotiation(_))));
    }

    #[test]
    fn test_uniform_pattern() {
        let mut src = ready_source(SyntheticSource::uniform([10, 20, 30], 0x1234), 2, 2);
        let frame = src.acquire(true).unwrap();

        assert_eq!(frame.color.format(), SensorFormat::Rgb24);
        assert_eq!(frame.color.stride(), 6);
        assert_eq!(&frame.color.data()[..3], &[10, 20, 30]);

        assert_eq!(frame.depth.format(), SensorFormat::Depth16);
        // High byte first
        assert_eq!(&frame.depth.data()[..2], &[0x12, 0x34]);
    }

    #[test]
    fn test_injected_failures() {
        let mut src = ready_source(SyntheticSource::uniform([0, 0, 0], 0), 2, 2);
        src.fail_next(2);
        assert!(matches!(src.acquire(true), Err(CaptureError::Busy)));
        assert!(matches!(src.acquire(true), Err(CaptureError::Busy)));
        assert!(src.acquire(true).is_ok());
    }

    #[test]
    fn test_nonblocking_respects_pacing() {
        // 5 fps: the 200ms interval is far longer than two test calls
        let mut src = SyntheticSource::uniform([0, 0, 0], 0);
        src.enable_stream(StreamKind::Color, 2, 2, 5).unwrap();
        src.enable_stream(StreamKind::Depth, 2, 2, 5).unwrap();
        src.init().unwrap();

        assert!(src.acquire(false).is_ok());
        // Immediately after a frame, the next one is not due yet
        assert!(matches!(src.acquire(false), Err(CaptureError::Busy)));
    }
}
