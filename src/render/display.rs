// SPDX-License-Identifier: GPL-3.0-only

//! Display buffers and the terminal paint path
//!
//! A [`DisplayBuffer`] is the owned pixel surface behind one on-screen
//! panel: fixed dimensions chosen at construction, 3 bytes per pixel in
//! (B, G, R) order, repainted in place every render step and never
//! reallocated. Painting to the terminal uses Unicode half-block
//! characters so each cell carries two vertical pixels.

use crate::constants::DISPLAY_BYTES_PER_PIXEL;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

/// Owned, fixed-size (B, G, R) pixel surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DisplayBuffer {
    /// Create a zero-filled (black) buffer; the dimensions are final
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height * DISPLAY_BYTES_PER_PIXEL) as usize],
        }
    }

    /// Buffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixel bytes, row-major, top row first
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One row of pixel bytes
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = (self.width * DISPLAY_BYTES_PER_PIXEL) as usize;
        &self.data[y as usize * stride..][..stride]
    }

    /// One row of pixel bytes, writable
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = (self.width * DISPLAY_BYTES_PER_PIXEL) as usize;
        &mut self.data[y as usize * stride..][..stride]
    }

    /// Read the (B, G, R) bytes at a pixel
    pub fn bgr(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Write the (B, G, R) bytes at a pixel
    pub fn set_bgr(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        let i = ((y * self.width + x) * 3) as usize;
        self.data[i..i + 3].copy_from_slice(&bgr);
    }

    /// Overwrite every pixel with one (B, G, R) value
    pub fn fill(&mut self, bgr: [u8; 3]) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&bgr);
        }
    }
}

/// Sample a pixel as a terminal color, clamping out-of-range coordinates
fn sample_pixel(display: &DisplayBuffer, x: u32, y: u32) -> Color {
    if display.width() == 0 || display.height() == 0 {
        return Color::Black;
    }
    let x = x.min(display.width() - 1);
    let y = y.min(display.height() - 1);
    let [b, g, r] = display.bgr(x, y);
    Color::Rgb(r, g, b)
}

/// Paint a display buffer into a terminal region
///
/// Uses half-block characters (each cell shows two vertical pixels: upper
/// half via the foreground color, lower half via the background),
/// preserving aspect ratio and centering within the region.
pub fn paint(display: &DisplayBuffer, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 || display.width() == 0 || display.height() == 0 {
        return;
    }

    // Each terminal cell displays 2 vertical pixels
    let frame_aspect = display.width() as f64 / display.height() as f64;
    let term_width = area.width as f64;
    let term_height = (area.height * 2) as f64;

    let (display_width, display_height) = if term_width / term_height > frame_aspect {
        let h = term_height;
        let w = h * frame_aspect;
        (w as u16, (h / 2.0) as u16)
    } else {
        let w = term_width;
        let h = w / frame_aspect;
        (w as u16, (h / 2.0) as u16)
    };
    if display_width == 0 || display_height == 0 {
        return;
    }

    let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
    let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

    let x_scale = display.width() as f64 / display_width as f64;
    let y_scale = display.height() as f64 / (display_height * 2) as f64;

    for ty in 0..display_height {
        for tx in 0..display_width {
            let term_x = x_offset + tx;
            let term_y = y_offset + ty;
            if term_x >= area.x + area.width || term_y >= area.y + area.height {
                continue;
            }

            let src_x = (tx as f64 * x_scale) as u32;
            let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
            let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

            let top_color = sample_pixel(display, src_x, src_y_top);
            let bottom_color = sample_pixel(display, src_x, src_y_bottom);

            if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                cell.set_char('▀');
                cell.set_fg(top_color);
                cell.set_bg(bottom_color);
            }
        }
    }
}

/// Widget wrapper so a display buffer can be rendered by the terminal UI
pub struct SurfaceWidget<'a> {
    display: &'a DisplayBuffer,
}

impl<'a> SurfaceWidget<'a> {
    pub fn new(display: &'a DisplayBuffer) -> Self {
        Self { display }
    }
}

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        paint(self.display, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_fixed_at_construction() {
        let buf = DisplayBuffer::new(4, 2);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.as_bytes().len(), 4 * 2 * 3);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let mut buf = DisplayBuffer::new(3, 3);
        buf.set_bgr(1, 2, [10, 20, 30]);
        assert_eq!(buf.bgr(1, 2), [10, 20, 30]);
        // Neighbors untouched
        assert_eq!(buf.bgr(0, 2), [0, 0, 0]);
        assert_eq!(buf.bgr(2, 2), [0, 0, 0]);
    }

    #[test]
    fn test_row_access() {
        let mut buf = DisplayBuffer::new(2, 2);
        buf.row_mut(1).copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(buf.row(1), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(buf.row(0), &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_paint_uniform_color() {
        let mut display = DisplayBuffer::new(8, 8);
        display.fill([30, 20, 10]); // B=30 G=20 R=10

        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        paint(&display, area, &mut buf);

        let cell = buf.cell((4, 2)).expect("cell in area");
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn test_paint_empty_area_is_noop() {
        let display = DisplayBuffer::new(4, 4);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        paint(&display, area, &mut buf);
    }
}
