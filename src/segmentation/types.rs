use serde::Serialize;

/// One pixel of a segment, in flood-fill order.
///
/// `link` carries the four-direction neighbour mask of the pixel (see the
/// [`links`](crate::links) constants); the extractor's transient visited mark
/// is stripped before emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub link: u8,
}

/// A maximal connected region of similar-valued pixels.
///
/// `first` and `count` locate the segment's points inside the owning
/// segmentation's shared point buffer. The bounding box is inclusive on both
/// ends in integer pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Segment {
    /// Index of the segment's first point in the shared point buffer.
    pub first: usize,
    /// Number of points (always > 0).
    pub count: usize,
    pub xmin: i32,
    pub xmax: i32,
    pub ymin: i32,
    pub ymax: i32,
    /// `xmax - xmin + 1`.
    pub width: i32,
    /// `ymax - ymin + 1`.
    pub height: i32,
    /// `(xmin + xmax) / 2`.
    pub xcen: f64,
    /// `(ymin + ymax) / 2`.
    pub ycen: f64,
}
