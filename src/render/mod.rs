// SPDX-License-Identifier: GPL-3.0-only

//! Frame rendering pipeline
//!
//! One render step moves a frame pair through three stages:
//!
//! ```text
//! SensorImage ──convert──▶ DisplayBuffer ──paint──▶ terminal cells
//! ```
//!
//! - [`convert`]: per-pixel transcoding from sensor formats into the
//!   fixed B,G,R display layout
//! - [`display`]: the owned display buffers and the terminal paint path
//! - [`driver`]: the cooperative render loop stepping the pipeline on
//!   idle notifications

pub mod convert;
pub mod display;
pub mod driver;

pub use convert::{ConvertError, convert_color, convert_depth};
pub use display::DisplayBuffer;
pub use driver::{RenderLoop, StepOutcome};
