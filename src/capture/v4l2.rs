// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 frame source
//!
//! Captures the color stream (RGB24) and the depth stream (big-endian
//! 16-bit) from two V4L2 capture devices using memory-mapped streaming.
//! Capture is strictly synchronous: `acquire` dequeues one buffer from
//! each stream inline on the calling thread, so a blocking acquire stalls
//! the caller until the hardware delivers the next frame pair.

use super::FrameSource;
use super::types::{CaptureError, CaptureResult, Frame, SensorFormat, SensorImage, StreamKind};
use tracing::{info, warn};
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::video::capture::parameters::Parameters;

/// FourCC for packed RGB24 ('RGB3')
const COLOR_FOURCC: [u8; 4] = *b"RGB3";

/// FourCC for big-endian 16-bit depth: 'Y16 ' with the V4L2 big-endian
/// flag bit set on the last byte (V4L2_PIX_FMT_Y16_BE)
const DEPTH_FOURCC: [u8; 4] = [b'Y', b'1', b'6', b' ' | 0x80];

#[derive(Debug, Clone, Copy)]
struct StreamConfig {
    width: u32,
    height: u32,
    rate: u32,
}

struct ActiveStream {
    stream: MmapStream<'static>,
    stride: u32,
}

/// Frame source backed by two V4L2 capture devices
pub struct V4l2Source {
    color_path: String,
    depth_path: String,
    color_cfg: Option<StreamConfig>,
    depth_cfg: Option<StreamConfig>,
    color: Option<ActiveStream>,
    depth: Option<ActiveStream>,
}

impl V4l2Source {
    /// Create a source for the given device paths; nothing is opened
    /// until `init`
    pub fn new(color_path: &str, depth_path: &str) -> Self {
        Self {
            color_path: color_path.to_string(),
            depth_path: depth_path.to_string(),
            color_cfg: None,
            depth_cfg: None,
            color: None,
            depth: None,
        }
    }
}

/// Open one device, negotiate the format, and start a mmap stream
///
/// The stream keeps the device handle alive internally, so the `Device`
/// value does not need to outlive this call.
fn open_stream(
    path: &str,
    cfg: StreamConfig,
    fourcc: [u8; 4],
    format: SensorFormat,
    kind: StreamKind,
) -> CaptureResult<ActiveStream> {
    let dev = Device::with_path(path)
        .map_err(|e| CaptureError::Negotiation(format!("open {}: {}", path, e)))?;

    let mut requested = dev
        .format()
        .map_err(|e| CaptureError::Negotiation(format!("query format on {}: {}", path, e)))?;
    requested.width = cfg.width;
    requested.height = cfg.height;
    requested.fourcc = FourCC::new(&fourcc);

    let negotiated = dev
        .set_format(&requested)
        .map_err(|e| CaptureError::Negotiation(format!("set format on {}: {}", path, e)))?;

    if negotiated.fourcc != FourCC::new(&fourcc) {
        return Err(CaptureError::Negotiation(format!(
            "{} stream on {}: device negotiated {} instead of {}",
            kind,
            path,
            negotiated.fourcc,
            FourCC::new(&fourcc),
        )));
    }
    if negotiated.width != cfg.width || negotiated.height != cfg.height {
        return Err(CaptureError::Negotiation(format!(
            "{} stream on {}: device negotiated {}x{} instead of {}x{}",
            kind, path, negotiated.width, negotiated.height, cfg.width, cfg.height,
        )));
    }

    if cfg.rate > 0 {
        // Frame rate is best-effort; drivers that ignore it still stream
        if let Err(e) = dev.set_params(&Parameters::with_fps(cfg.rate)) {
            warn!(path, rate = cfg.rate, error = %e, "Could not set frame rate");
        }
    }

    let stride = if negotiated.stride != 0 {
        negotiated.stride
    } else {
        negotiated.width * format.bytes_per_pixel()
    };

    let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, 4)
        .map_err(|e| CaptureError::Negotiation(format!("start streaming on {}: {}", path, e)))?;

    info!(
        path,
        width = negotiated.width,
        height = negotiated.height,
        stride,
        fourcc = %negotiated.fourcc,
        "V4L2 stream started"
    );

    Ok(ActiveStream { stream, stride })
}

/// Dequeue one buffer and check it covers the negotiated geometry
fn next_image<'a>(
    active: &'a mut ActiveStream,
    cfg: StreamConfig,
    format: SensorFormat,
) -> CaptureResult<SensorImage<'a>> {
    let stride = active.stride;
    let (buf, _meta) = active.stream.next().map_err(CaptureError::from_io)?;
    let expected = (stride * cfg.height) as usize;
    if buf.len() < expected {
        return Err(CaptureError::ShortFrame {
            expected,
            actual: buf.len(),
        });
    }
    Ok(SensorImage::new(
        cfg.width,
        cfg.height,
        format,
        stride,
        &buf[..expected],
    ))
}

impl FrameSource for V4l2Source {
    fn enable_stream(
        &mut self,
        kind: StreamKind,
        width: u32,
        height: u32,
        rate: u32,
    ) -> CaptureResult<()> {
        if self.is_initialized() {
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
        let color_cfg = self
            .color_cfg
            .ok_or_else(|| CaptureError::Negotiation("color stream not enabled".into()))?;
        let depth_cfg = self
            .depth_cfg
            .ok_or_else(|| CaptureError::Negotiation("depth stream not enabled".into()))?;

        self.color = Some(open_stream(
            &self.color_path,
            color_cfg,
            COLOR_FOURCC,
            SensorFormat::Rgb24,
            StreamKind::Color,
        )?);
        self.depth = Some(open_stream(
            &self.depth_path,
            depth_cfg,
            DEPTH_FOURCC,
            SensorFormat::Depth16,
            StreamKind::Depth,
        )?);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.color.is_some() && self.depth.is_some()
    }

    /// Acquire the next frame pair
    ///
    /// The mmap stream API has no non-blocking dequeue, so `blocking` is
    /// effectively always true here; the wait is bounded by the driver's
    /// own timeout.
    fn acquire(&mut self, _blocking: bool) -> CaptureResult<Frame<'_>> {
        let (Some(color_cfg), Some(depth_cfg)) = (self.color_cfg, self.depth_cfg) else {
            return Err(CaptureError::NotInitialized);
        };
        let (Some(color), Some(depth)) = (self.color.as_mut(), self.depth.as_mut()) else {
            return Err(CaptureError::NotInitialized);
        };

        let color_image = next_image(color, color_cfg, SensorFormat::Rgb24)?;
        let depth_image = next_image(depth, depth_cfg, SensorFormat::Depth16)?;

        Ok(Frame {
            color: color_image,
            depth: depth_image,
        })
    }

    fn name(&self) -> &'static str {
        "v4l2"
    }
}
