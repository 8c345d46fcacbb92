#![doc = include_str!("../README.md")]

pub mod chains;
pub mod error;
pub mod image;
pub mod links;
pub mod segmentation;

// --- High-level re-exports -------------------------------------------------

// Main entry points: segmentation builder + chain pool.
pub use crate::chains::{Chain, ChainOptions, ChainPool};
pub use crate::error::Error;
pub use crate::image::{ImageView, PixelBuffer, PixelType};
pub use crate::segmentation::{Point, Segment, Segmentation};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use std::sync::Arc;
/// use textline_detector::prelude::*;
///
/// # fn main() -> Result<(), textline_detector::Error> {
/// let (w, h) = (64usize, 48usize);
/// let gray = vec![0u8; w * h];
/// let view = ImageView::new(&gray, 0, w, h, w)?;
///
/// let sgm = Arc::new(Segmentation::from_image(&view, 0.0)?);
/// let pool = ChainPool::build(&sgm, &ChainOptions::default())?;
/// println!("segments={} chains={}", sgm.len(), pool.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageView, PixelBuffer};
    pub use crate::{ChainOptions, ChainPool, Segmentation};
}
