//! Image module: sample types, read-only raster views, and runtime dispatch.
//!
//! Components
//! - `sample`: the [`Sample`] trait (per-type similarity predicate), the
//!   [`PixelType`] tag enum, and the [`PixelBuffer`] tagged union used by the
//!   dynamic entry point.
//! - `view`: the borrowed [`ImageView`] over an external sample buffer.
//!
//! Design goals
//! - Make ownership explicit: views borrow external data; the segmentation
//!   builder copies nothing until it emits its own point buffer.
//! - Keep per-pixel comparison monomorphised: the runtime `PixelBuffer` match
//!   happens once per call, then the generic link builder runs for the
//!   concrete sample type.

pub mod sample;
pub mod view;

pub use self::sample::{PixelBuffer, PixelType, Sample};
pub use self::view::ImageView;
