//! Region segmentation: connected components of the pixel link map.
//!
//! A [`Segmentation`] is the immutable result of flood-filling an image's
//! link map: a packed buffer of [`Point`]s (segment after segment, in
//! deterministic breadth-first order) and a parallel table of [`Segment`]
//! records with bounding boxes and centres. Concatenating the point runs of
//! all segments yields every pixel of the image exactly once.
//!
//! Sharing is expressed with `std::sync::Arc`: cloning the `Arc` takes a
//! reference, dropping releases it, and `Arc::strong_count` answers how many
//! holders remain. [`ChainPool::build`](crate::chains::ChainPool::build)
//! keeps one reference for the lifetime of the pool.

mod extractor;
#[cfg(test)]
mod tests;
pub mod types;

pub use types::{Point, Segment};

use log::debug;

use crate::error::{Error, Result};
use crate::image::{ImageView, PixelBuffer, Sample};
use crate::links::build_links;

/// Largest accepted image dimension; point coordinates are stored as `i16`.
const MAX_DIM: usize = i16::MAX as usize + 1;

/// Immutable, shareable result of segmenting one image.
#[derive(Clone, Debug)]
pub struct Segmentation {
    width: usize,
    height: usize,
    points: Vec<Point>,
    segments: Vec<Segment>,
}

impl Segmentation {
    /// Segment an image of statically known sample type.
    ///
    /// Neighbour pixels belong to the same region when their absolute
    /// difference is at most `threshold`; a threshold that converts to zero
    /// in the sample space selects exact equality. A zero-pixel view yields
    /// a valid, empty segmentation.
    pub fn from_image<S: Sample>(img: &ImageView<'_, S>, threshold: f64) -> Result<Self> {
        if img.width > MAX_DIM || img.height > MAX_DIM {
            return Err(Error::InvalidArgument("image dimension exceeds 32768"));
        }
        let mut map = build_links(img, threshold)?;
        let (points, segments) = extractor::extract(&mut map)?;
        debug!(
            "segmentation: {} segments over {}x{} {:?} ({} points)",
            segments.len(),
            img.width,
            img.height,
            S::TYPE,
            points.len()
        );
        Ok(Self {
            width: img.width,
            height: img.height,
            points,
            segments,
        })
    }

    /// Segment a runtime-tagged sample buffer.
    ///
    /// This is the dynamic entry point: the ten numeric [`PixelBuffer`]
    /// variants route to [`Segmentation::from_image`]; complex and colour
    /// variants are rejected with [`Error::InvalidArgument`].
    pub fn from_raw(
        buf: &PixelBuffer<'_>,
        offset: usize,
        width: usize,
        height: usize,
        stride: usize,
        threshold: f64,
    ) -> Result<Self> {
        macro_rules! dispatch {
            ($data:expr) => {
                Self::from_image(
                    &ImageView::new($data, offset, width, height, stride)?,
                    threshold,
                )
            };
        }
        match *buf {
            PixelBuffer::I8(data) => dispatch!(data),
            PixelBuffer::U8(data) => dispatch!(data),
            PixelBuffer::I16(data) => dispatch!(data),
            PixelBuffer::U16(data) => dispatch!(data),
            PixelBuffer::I32(data) => dispatch!(data),
            PixelBuffer::U32(data) => dispatch!(data),
            PixelBuffer::I64(data) => dispatch!(data),
            PixelBuffer::U64(data) => dispatch!(data),
            PixelBuffer::F32(data) => dispatch!(data),
            PixelBuffer::F64(data) => dispatch!(data),
            PixelBuffer::CplxF32(_)
            | PixelBuffer::CplxF64(_)
            | PixelBuffer::Rgb(_)
            | PixelBuffer::Rgba(_) => Err(Error::InvalidArgument(
                "complex and colour samples are not segmentable",
            )),
        }
    }

    /// Copy the segments at `indices` (in the given order) into a new
    /// segmentation with its own point buffer.
    ///
    /// Duplicates and reorderings are permitted; an empty or out-of-range
    /// index list is an error.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::InvalidArgument("empty segment index list"));
        }
        let mut npoints = 0usize;
        for &j in indices {
            let s = self
                .segments
                .get(j)
                .ok_or(Error::InvalidArgument("segment index out of range"))?;
            npoints += s.count;
        }

        let mut points: Vec<Point> = Vec::new();
        points
            .try_reserve_exact(npoints)
            .map_err(|_| Error::OutOfMemory)?;
        let mut segments: Vec<Segment> = Vec::with_capacity(indices.len());
        for &j in indices {
            let src = self.segments[j];
            let first = points.len();
            points.extend_from_slice(self.points_of(j));
            segments.push(Segment { first, ..src });
        }
        Ok(Self {
            width: self.width,
            height: self.height,
            points,
            segments,
        })
    }

    // --- Queries -----------------------------------------------------------

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Width of the source image.
    pub fn image_width(&self) -> usize {
        self.width
    }

    /// Height of the source image.
    pub fn image_height(&self) -> usize {
        self.height
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, j: usize) -> Result<&Segment> {
        self.segments
            .get(j)
            .ok_or(Error::InvalidArgument("segment index out of range"))
    }

    /// The shared point buffer, segment after segment.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points of segment `j`, in emission (breadth-first) order.
    pub fn segment_points(&self, j: usize) -> Result<&[Point]> {
        let s = self.segment(j)?;
        Ok(&self.points[s.first..s.first + s.count])
    }

    #[inline]
    pub(crate) fn points_of(&self, j: usize) -> &[Point] {
        let s = &self.segments[j];
        &self.points[s.first..s.first + s.count]
    }

    /// X coordinates of the points of segment `j`.
    pub fn point_xs(&self, j: usize) -> Result<Vec<i16>> {
        Ok(self.segment_points(j)?.iter().map(|p| p.x).collect())
    }

    /// Y coordinates of the points of segment `j`.
    pub fn point_ys(&self, j: usize) -> Result<Vec<i16>> {
        Ok(self.segment_points(j)?.iter().map(|p| p.y).collect())
    }

    /// Neighbour-link masks of the points of segment `j`.
    pub fn point_links(&self, j: usize) -> Result<Vec<u8>> {
        Ok(self.segment_points(j)?.iter().map(|p| p.link).collect())
    }
}

macro_rules! segment_attr_vec {
    ($(#[$doc:meta] $name:ident: $field:ident -> $ty:ty,)*) => {
        impl Segmentation {
            $(
                #[$doc]
                pub fn $name(&self) -> Vec<$ty> {
                    self.segments.iter().map(|s| s.$field).collect()
                }
            )*
        }
    };
}

segment_attr_vec! {
    /// Point counts of all segments.
    counts: count -> usize,
    /// `xmin` of all segments.
    xmins: xmin -> i32,
    /// `xmax` of all segments.
    xmaxs: xmax -> i32,
    /// `ymin` of all segments.
    ymins: ymin -> i32,
    /// `ymax` of all segments.
    ymaxs: ymax -> i32,
    /// Bounding-box widths of all segments.
    widths: width -> i32,
    /// Bounding-box heights of all segments.
    heights: height -> i32,
    /// Centre abscissae of all segments.
    xcens: xcen -> f64,
    /// Centre ordinates of all segments.
    ycens: ycen -> f64,
}
