// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture/convert/display pipeline

use depth_viewer::capture::synthetic::SyntheticSource;
use depth_viewer::capture::{FrameSource, StreamKind};
use depth_viewer::render::display::DisplayBuffer;
use depth_viewer::render::driver::RenderLoop;

fn uniform_source(width: u32, height: u32, rgb: [u8; 3], z_raw: u16) -> SyntheticSource {
    let mut src = SyntheticSource::uniform(rgb, z_raw);
    src.enable_stream(StreamKind::Color, width, height, 0)
        .expect("enable color stream");
    src.enable_stream(StreamKind::Depth, width, height, 0)
        .expect("enable depth stream");
    src.init().expect("init synthetic source");
    src
}

#[test]
fn test_end_to_end_uniform_frame() {
    // 4x4 frame: color all (R=10, G=20, B=30), depth all 32768
    let mut src = uniform_source(4, 4, [10, 20, 30], 32768);
    let mut color = DisplayBuffer::new(4, 4);
    let mut depth = DisplayBuffer::new(4, 4);

    let mut driver = RenderLoop::new();
    driver.activate();
    let outcome = driver.on_idle(&mut src, &mut color, &mut depth);

    assert!(outcome.repaint);
    assert!(outcome.request_more);
    assert_eq!(color.width(), 4);
    assert_eq!(color.height(), 4);
    assert_eq!(depth.width(), 4);
    assert_eq!(depth.height(), 4);

    // Every color pixel reads (B=30, G=20, R=10); every depth pixel is
    // the uniform gray round(255 * 32768 / 65535) = 128
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(color.bgr(x, y), [30, 20, 10], "color pixel ({}, {})", x, y);
            assert_eq!(depth.bgr(x, y), [128, 128, 128], "depth pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_depth_extremes_render_black_and_white() {
    let mut src = uniform_source(2, 2, [0, 0, 0], 0);
    let mut color = DisplayBuffer::new(2, 2);
    let mut depth = DisplayBuffer::new(2, 2);
    let mut driver = RenderLoop::new();
    driver.activate();

    driver.on_idle(&mut src, &mut color, &mut depth);
    assert_eq!(depth.bgr(0, 0), [0, 0, 0]);

    let mut src = uniform_source(2, 2, [0, 0, 0], 65535);
    driver.on_idle(&mut src, &mut color, &mut depth);
    assert_eq!(depth.bgr(0, 0), [255, 255, 255]);
}

#[test]
fn test_failed_acquire_then_recovery() {
    let mut src = uniform_source(4, 4, [1, 2, 3], 1000);
    src.fail_next(1);

    let mut color = DisplayBuffer::new(4, 4);
    let mut depth = DisplayBuffer::new(4, 4);
    color.fill([100, 101, 102]);
    depth.fill([103, 104, 105]);

    let mut driver = RenderLoop::new();
    driver.activate();

    // Failing step: buffers untouched, next notification still requested
    let outcome = driver.on_idle(&mut src, &mut color, &mut depth);
    assert!(outcome.request_more);
    assert_eq!(driver.frames(), 0);
    assert_eq!(color.bgr(2, 2), [100, 101, 102]);
    assert_eq!(depth.bgr(2, 2), [103, 104, 105]);

    // The polling loop retries on the next notification and succeeds
    driver.on_idle(&mut src, &mut color, &mut depth);
    assert_eq!(driver.frames(), 1);
    assert_eq!(color.bgr(2, 2), [3, 2, 1]);
}

#[test]
fn test_driver_lifecycle_through_public_api() {
    let mut src = uniform_source(2, 2, [5, 6, 7], 500);
    let mut color = DisplayBuffer::new(2, 2);
    let mut depth = DisplayBuffer::new(2, 2);

    let mut driver = RenderLoop::new();

    // Deactivating while detached is a no-op
    driver.deactivate();
    assert!(!driver.is_active());

    // Activating twice has no additional effect
    driver.activate();
    driver.activate();
    assert!(driver.is_active());
    driver.on_idle(&mut src, &mut color, &mut depth);
    assert_eq!(driver.frames(), 1);

    // After deactivation, notifications run no further steps
    driver.deactivate();
    let outcome = driver.on_idle(&mut src, &mut color, &mut depth);
    assert!(!outcome.repaint);
    assert!(!outcome.request_more);
    assert_eq!(driver.frames(), 1);
}

#[test]
fn test_display_buffers_persist_across_steps() {
    let mut src = uniform_source(2, 2, [8, 9, 10], 2000);
    let mut color = DisplayBuffer::new(2, 2);
    let mut depth = DisplayBuffer::new(2, 2);
    let mut driver = RenderLoop::new();
    driver.activate();

    driver.on_idle(&mut src, &mut color, &mut depth);
    let first = color.clone();
    driver.on_idle(&mut src, &mut color, &mut depth);

    // Uniform pattern: repainting in place yields identical contents,
    // same dimensions, no reallocation semantics observable
    assert_eq!(color, first);
    assert_eq!(driver.frames(), 2);
}
