// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format conversion into display buffers
//!
//! Two converters cover the two negotiated sensor formats: packed RGB24
//! color and big-endian 16-bit depth. Both write scanline by scanline,
//! top row first, into a same-sized [`DisplayBuffer`].
//!
//! A geometry or format mismatch performs no writes at all and returns a
//! diagnostic; partial writes would leave a torn image on screen.

use crate::capture::types::{SensorFormat, SensorImage};
use crate::constants::DEPTH_RAW_MAX;
use crate::render::display::DisplayBuffer;
use std::fmt;

/// Why a converter refused an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Source image is not in the format this converter handles
    FormatMismatch {
        expected: SensorFormat,
        actual: SensorFormat,
    },
    /// Source and destination dimensions differ
    SizeMismatch { src: (u32, u32), dst: (u32, u32) },
    /// Source stride is not exactly width * bytes-per-pixel
    StrideMismatch { expected: u32, actual: u32 },
    /// Source byte buffer is shorter than its geometry implies
    Truncated { expected: usize, actual: usize },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::FormatMismatch { expected, actual } => {
                write!(f, "expected {} image, got {}", expected, actual)
            }
            ConvertError::SizeMismatch { src, dst } => write!(
                f,
                "image is {}x{} but display buffer is {}x{}",
                src.0, src.1, dst.0, dst.1
            ),
            ConvertError::StrideMismatch { expected, actual } => {
                write!(f, "expected stride {}, got {}", expected, actual)
            }
            ConvertError::Truncated { expected, actual } => {
                write!(f, "image data is {} bytes, need {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Check the preconditions shared by both converters
fn check_geometry(
    src: &SensorImage<'_>,
    dst: &DisplayBuffer,
    format: SensorFormat,
) -> Result<(), ConvertError> {
    if src.format() != format {
        return Err(ConvertError::FormatMismatch {
            expected: format,
            actual: src.format(),
        });
    }
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(ConvertError::SizeMismatch {
            src: (src.width(), src.height()),
            dst: (dst.width(), dst.height()),
        });
    }
    let expected_stride = src.width() * format.bytes_per_pixel();
    if src.stride() != expected_stride {
        return Err(ConvertError::StrideMismatch {
            expected: expected_stride,
            actual: src.stride(),
        });
    }
    let expected_len = (src.stride() * src.height()) as usize;
    if src.data().len() < expected_len {
        return Err(ConvertError::Truncated {
            expected: expected_len,
            actual: src.data().len(),
        });
    }
    Ok(())
}

/// Transcode a packed RGB24 image into a display buffer
///
/// Source bytes are (R, G, B) per pixel; the display buffer stores
/// (B, G, R). On any precondition mismatch the buffer is left untouched.
pub fn convert_color(src: &SensorImage<'_>, dst: &mut DisplayBuffer) -> Result<(), ConvertError> {
    check_geometry(src, dst, SensorFormat::Rgb24)?;

    let width = src.width() as usize;
    let stride = src.stride() as usize;
    let data = src.data();
    for y in 0..src.height() {
        let src_row = &data[y as usize * stride..][..width * 3];
        let dst_row = dst.row_mut(y);
        for x in 0..width {
            let s = &src_row[x * 3..x * 3 + 3];
            let d = &mut dst_row[x * 3..x * 3 + 3];
            d[0] = s[2];
            d[1] = s[1];
            d[2] = s[0];
        }
    }
    Ok(())
}

/// Map one raw 16-bit depth sample to a display intensity
///
/// Linear full-range normalization, rounded: 0 maps to 0, 65535 to 255.
fn depth_intensity(z_raw: u16) -> u8 {
    (255.0 * z_raw as f32 / DEPTH_RAW_MAX as f32).round() as u8
}

/// Transcode a big-endian 16-bit depth image into a grayscale rendering
///
/// Each sample is two bytes, high byte first. The intensity is written to
/// all three channels of the display pixel. On any precondition mismatch
/// the buffer is left untouched.
pub fn convert_depth(src: &SensorImage<'_>, dst: &mut DisplayBuffer) -> Result<(), ConvertError> {
    check_geometry(src, dst, SensorFormat::Depth16)?;

    let width = src.width() as usize;
    let stride = src.stride() as usize;
    let data = src.data();
    for y in 0..src.height() {
        let src_row = &data[y as usize * stride..][..width * 2];
        let dst_row = dst.row_mut(y);
        for x in 0..width {
            let z_raw = u16::from_be_bytes([src_row[x * 2], src_row[x * 2 + 1]]);
            let z = depth_intensity(z_raw);
            dst_row[x * 3] = z;
            dst_row[x * 3 + 1] = z;
            dst_row[x * 3 + 2] = z;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_image(width: u32, height: u32, data: &[u8]) -> SensorImage<'_> {
        SensorImage::new(width, height, SensorFormat::Rgb24, width * 3, data)
    }

    fn depth_image(width: u32, height: u32, data: &[u8]) -> SensorImage<'_> {
        SensorImage::new(width, height, SensorFormat::Depth16, width * 2, data)
    }

    #[test]
    fn test_color_channel_swap() {
        // 2x2 with distinct values per pixel and channel
        let src_data: Vec<u8> = (0..12).collect();
        let src = rgb_image(2, 2, &src_data);
        let mut dst = DisplayBuffer::new(2, 2);

        convert_color(&src, &mut dst).unwrap();

        // Pixel (0,0): source (0,1,2) -> dest (2,1,0)
        assert_eq!(dst.bgr(0, 0), [2, 1, 0]);
        // Pixel (1,0): source (3,4,5) -> dest (5,4,3)
        assert_eq!(dst.bgr(1, 0), [5, 4, 3]);
        // Pixel (0,1): source (6,7,8) -> dest (8,7,6)
        assert_eq!(dst.bgr(0, 1), [8, 7, 6]);
        // Pixel (1,1): source (9,10,11) -> dest (11,10,9)
        assert_eq!(dst.bgr(1, 1), [11, 10, 9]);
    }

    #[test]
    fn test_depth_intensity_endpoints() {
        assert_eq!(depth_intensity(0), 0);
        assert_eq!(depth_intensity(65535), 255);
        // Midpoint rounds up, not down
        assert_eq!(depth_intensity(32768), 128);
    }

    #[test]
    fn test_depth_intensity_monotonic() {
        let mut prev = 0u8;
        for z in (0..=65535u32).step_by(257) {
            let v = depth_intensity(z as u16);
            assert!(v >= prev, "intensity decreased at z_raw={}", z);
            prev = v;
        }
    }

    #[test]
    fn test_depth_big_endian_decode() {
        // One pixel: bytes [0x80, 0x00] = 32768 -> 128
        let data = [0x80u8, 0x00];
        let src = depth_image(1, 1, &data);
        let mut dst = DisplayBuffer::new(1, 1);

        convert_depth(&src, &mut dst).unwrap();
        assert_eq!(dst.bgr(0, 0), [128, 128, 128]);
    }

    #[test]
    fn test_color_mismatch_leaves_buffer_untouched() {
        let src_data = vec![1u8; 4 * 4 * 3];
        let mut dst = DisplayBuffer::new(2, 2);
        dst.fill([0xAB, 0xCD, 0xEF]);
        let before = dst.as_bytes().to_vec();

        // Wrong dimensions
        let src = rgb_image(4, 4, &src_data);
        assert!(matches!(
            convert_color(&src, &mut dst),
            Err(ConvertError::SizeMismatch { .. })
        ));
        assert_eq!(dst.as_bytes(), &before[..]);

        // Wrong stride
        let src = SensorImage::new(2, 2, SensorFormat::Rgb24, 8, &src_data);
        assert!(matches!(
            convert_color(&src, &mut dst),
            Err(ConvertError::StrideMismatch { .. })
        ));
        assert_eq!(dst.as_bytes(), &before[..]);

        // Wrong format
        let src = SensorImage::new(2, 2, SensorFormat::Depth16, 4, &src_data);
        assert!(matches!(
            convert_color(&src, &mut dst),
            Err(ConvertError::FormatMismatch { .. })
        ));
        assert_eq!(dst.as_bytes(), &before[..]);
    }

    #[test]
    fn test_depth_mismatch_leaves_buffer_untouched() {
        let src_data = vec![0u8; 2 * 2 * 2];
        let mut dst = DisplayBuffer::new(2, 2);
        dst.fill([1, 2, 3]);
        let before = dst.as_bytes().to_vec();

        let src = depth_image(2, 3, &src_data);
        assert!(convert_depth(&src, &mut dst).is_err());
        assert_eq!(dst.as_bytes(), &before[..]);
    }

    #[test]
    fn test_truncated_data_rejected() {
        // Geometry says 8 bytes, buffer has 6
        let src_data = vec![0u8; 6];
        let src = depth_image(2, 2, &src_data);
        let mut dst = DisplayBuffer::new(2, 2);
        dst.fill([9, 9, 9]);
        let before = dst.as_bytes().to_vec();

        assert!(matches!(
            convert_depth(&src, &mut dst),
            Err(ConvertError::Truncated { .. })
        ));
        assert_eq!(dst.as_bytes(), &before[..]);
    }
}
