// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for frame sources

use std::fmt;

/// Stream kind negotiated with a frame source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Packed RGB24 color stream
    Color,
    /// 16-bit depth stream
    Depth,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Color => write!(f, "color"),
            StreamKind::Depth => write!(f, "depth"),
        }
    }
}

/// Pixel format of a sensor image
///
/// Only `Rgb24` and `Depth16` are ever produced by the sources in this
/// crate; the remaining variants exist so diagnostics can name the formats
/// depth-camera hardware commonly negotiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFormat {
    /// Packed 8-bit-per-channel RGB, 3 bytes per pixel, R first
    Rgb24,
    /// 16-bit unsigned depth, 2 bytes per pixel, high byte first
    Depth16,
    /// Packed YUV 4:2:2 (Y0 U Y1 V)
    Yuy2,
    /// Semi-planar YUV 4:2:0
    Nv12,
    /// Packed 32-bit RGB with padding byte
    Rgb32,
    /// 8-bit grayscale
    Y8,
    /// 16-bit grayscale, little-endian
    Y16,
}

impl SensorFormat {
    /// Bytes per pixel for packed formats (average for subsampled ones)
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            SensorFormat::Rgb24 => 3,
            SensorFormat::Depth16 | SensorFormat::Yuy2 | SensorFormat::Y16 => 2,
            SensorFormat::Nv12 => 2, // 1.5 rounded up; never produced here
            SensorFormat::Rgb32 => 4,
            SensorFormat::Y8 => 1,
        }
    }

    /// Look up a format from a V4L2 FourCC code
    ///
    /// Returns `None` for codes this crate has no name for; callers fall
    /// back to "UNKNOWN" when printing.
    pub fn from_fourcc(repr: &[u8; 4]) -> Option<Self> {
        match repr {
            b"RGB3" => Some(SensorFormat::Rgb24),
            b"YUYV" | b"YUY2" => Some(SensorFormat::Yuy2),
            b"NV12" => Some(SensorFormat::Nv12),
            b"RGB4" => Some(SensorFormat::Rgb32),
            b"GREY" => Some(SensorFormat::Y8),
            b"Y16 " => Some(SensorFormat::Y16),
            _ => None,
        }
    }
}

impl fmt::Display for SensorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorFormat::Rgb24 => write!(f, "RGB24"),
            SensorFormat::Depth16 => write!(f, "DEPTH16"),
            SensorFormat::Yuy2 => write!(f, "YUY2"),
            SensorFormat::Nv12 => write!(f, "NV12"),
            SensorFormat::Rgb32 => write!(f, "RGB32"),
            SensorFormat::Y8 => write!(f, "Y8"),
            SensorFormat::Y16 => write!(f, "Y16"),
        }
    }
}

/// One sensor image, borrowed from a frame source for the lifetime of the
/// acquire bracket
///
/// The raw bytes belong to the source (an mmap'd V4L2 buffer or a pattern
/// buffer); they are valid only while the owning [`Frame`] is alive.
#[derive(Debug, Clone, Copy)]
pub struct SensorImage<'a> {
    width: u32,
    height: u32,
    format: SensorFormat,
    stride: u32,
    data: &'a [u8],
}

impl<'a> SensorImage<'a> {
    pub fn new(width: u32, height: u32, format: SensorFormat, stride: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            format,
            stride,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel format of the raw bytes
    pub fn format(&self) -> SensorFormat {
        self.format
    }

    /// Bytes per row
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Raw bytes, row-major, top row first
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// One frame pair: the color and depth images delivered together
///
/// Valid only within one acquire bracket. Dropping the frame releases it
/// back to the source; the borrow prevents a second acquire while one is
/// outstanding.
#[derive(Debug)]
pub struct Frame<'a> {
    pub color: SensorImage<'a>,
    pub depth: SensorImage<'a>,
}

/// Result type for frame source operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error/status taxonomy for frame sources
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Operation requires `init()` to have succeeded first
    NotInitialized,
    /// Stream negotiation or device open failed (fatal at startup)
    Negotiation(String),
    /// Device is busy; the frame was not delivered this time
    Busy,
    /// The blocking wait for a frame timed out
    Timeout,
    /// The device went away mid-stream
    Disconnected,
    /// A delivered buffer was smaller than the negotiated geometry implies
    ShortFrame { expected: usize, actual: usize },
    /// Other I/O error from the device layer
    Io(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NotInitialized => write!(f, "frame source not initialized"),
            CaptureError::Negotiation(msg) => write!(f, "stream negotiation failed: {}", msg),
            CaptureError::Busy => write!(f, "device busy"),
            CaptureError::Timeout => write!(f, "frame wait timed out"),
            CaptureError::Disconnected => write!(f, "device disconnected"),
            CaptureError::ShortFrame { expected, actual } => {
                write!(f, "short frame: expected {} bytes, got {}", expected, actual)
            }
            CaptureError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

impl CaptureError {
    /// Classify an I/O error from the device layer into the status taxonomy
    pub fn from_io(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => CaptureError::Timeout,
            ErrorKind::ResourceBusy => CaptureError::Busy,
            ErrorKind::NotFound | ErrorKind::NotConnected | ErrorKind::BrokenPipe => {
                CaptureError::Disconnected
            }
            _ => CaptureError::Io(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(SensorFormat::Rgb24.to_string(), "RGB24");
        assert_eq!(SensorFormat::Depth16.to_string(), "DEPTH16");
    }

    #[test]
    fn test_fourcc_lookup() {
        assert_eq!(
            SensorFormat::from_fourcc(b"RGB3"),
            Some(SensorFormat::Rgb24)
        );
        assert_eq!(SensorFormat::from_fourcc(b"Y16 "), Some(SensorFormat::Y16));
        // Unnamed codes fall through to the caller's UNKNOWN fallback
        assert_eq!(SensorFormat::from_fourcc(b"MJPG"), None);
    }

    #[test]
    fn test_io_error_classification() {
        use std::io::{Error, ErrorKind};
        assert!(matches!(
            CaptureError::from_io(Error::from(ErrorKind::TimedOut)),
            CaptureError::Timeout
        ));
        assert!(matches!(
            CaptureError::from_io(Error::from(ErrorKind::NotFound)),
            CaptureError::Disconnected
        ));
    }
}
