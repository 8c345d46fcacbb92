use serde::{Deserialize, Serialize};

/// Runtime tag identifying the sample type of a raster.
///
/// The set of names is closed. Only the ten numeric variants are accepted by
/// the segmentation path; the complex and colour variants are recognised so
/// that callers can route them, but [`Segmentation::from_raw`] rejects them.
///
/// [`Segmentation::from_raw`]: crate::segmentation::Segmentation::from_raw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    None = 0,
    I8 = 1,
    U8 = 2,
    I16 = 3,
    U16 = 4,
    I32 = 5,
    U32 = 6,
    I64 = 7,
    U64 = 8,
    F32 = 9,
    F64 = 10,
    CplxF32 = 11,
    CplxF64 = 12,
    Rgb = 13,
    Rgba = 14,
}

/// Numeric pixel sample usable by the link builder.
///
/// `within` is the absolute-difference-against-threshold predicate. The
/// caller-facing threshold is a `f64` converted once per image via
/// [`Sample::threshold_from`]; when the converted threshold is zero the link
/// builder switches to exact equality, which is the only sensible comparison
/// for integer samples at tolerance zero.
pub trait Sample: Copy + PartialEq {
    const TYPE: PixelType;

    /// Convert a raw threshold into the sample's own numeric space.
    /// Integer samples truncate; negative thresholds collapse to zero.
    fn threshold_from(raw: f64) -> Self;

    /// Whether the converted threshold selects the exact-match path.
    fn is_zero(self) -> bool;

    /// `|self - other| <= tol`, computed without overflow.
    fn within(self, other: Self, tol: Self) -> bool;
}

macro_rules! unsigned_sample {
    ($($t:ty => $tag:ident),* $(,)?) => {$(
        impl Sample for $t {
            const TYPE: PixelType = PixelType::$tag;

            #[inline]
            fn threshold_from(raw: f64) -> Self {
                if raw <= 0.0 { 0 } else { raw as $t }
            }

            #[inline]
            fn is_zero(self) -> bool {
                self == 0
            }

            #[inline]
            fn within(self, other: Self, tol: Self) -> bool {
                self.abs_diff(other) <= tol
            }
        }
    )*};
}

macro_rules! signed_sample {
    ($($t:ty as $u:ty => $tag:ident),* $(,)?) => {$(
        impl Sample for $t {
            const TYPE: PixelType = PixelType::$tag;

            #[inline]
            fn threshold_from(raw: f64) -> Self {
                if raw <= 0.0 { 0 } else { raw as $t }
            }

            #[inline]
            fn is_zero(self) -> bool {
                self == 0
            }

            #[inline]
            fn within(self, other: Self, tol: Self) -> bool {
                // tol is non-negative by construction.
                self.abs_diff(other) <= tol as $u
            }
        }
    )*};
}

macro_rules! float_sample {
    ($($t:ty => $tag:ident),* $(,)?) => {$(
        impl Sample for $t {
            const TYPE: PixelType = PixelType::$tag;

            #[inline]
            fn threshold_from(raw: f64) -> Self {
                if raw <= 0.0 { 0.0 } else { raw as $t }
            }

            #[inline]
            fn is_zero(self) -> bool {
                self == 0.0
            }

            #[inline]
            fn within(self, other: Self, tol: Self) -> bool {
                (self - other).abs() <= tol
            }
        }
    )*};
}

unsigned_sample! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

signed_sample! {
    i8 as u8 => I8,
    i16 as u16 => I16,
    i32 as u32 => I32,
    i64 as u64 => I64,
}

float_sample! {
    f32 => F32,
    f64 => F64,
}

/// Borrowed sample buffer tagged with its type at runtime.
///
/// This is the dynamic counterpart of the `Sample`-generic entry points: a
/// closed union of typed slices matched once per call, after which the
/// monomorphised path runs. The complex and colour variants exist so that a
/// host handing over an arbitrary raster gets a clean rejection instead of a
/// type error.
#[derive(Clone, Copy, Debug)]
pub enum PixelBuffer<'a> {
    I8(&'a [i8]),
    U8(&'a [u8]),
    I16(&'a [i16]),
    U16(&'a [u16]),
    I32(&'a [i32]),
    U32(&'a [u32]),
    I64(&'a [i64]),
    U64(&'a [u64]),
    F32(&'a [f32]),
    F64(&'a [f64]),
    /// Recognised but unsupported by the segmentation path.
    CplxF32(&'a [[f32; 2]]),
    /// Recognised but unsupported by the segmentation path.
    CplxF64(&'a [[f64; 2]]),
    /// Recognised but unsupported by the segmentation path.
    Rgb(&'a [[u8; 3]]),
    /// Recognised but unsupported by the segmentation path.
    Rgba(&'a [[u8; 4]]),
}

impl PixelBuffer<'_> {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelBuffer::I8(_) => PixelType::I8,
            PixelBuffer::U8(_) => PixelType::U8,
            PixelBuffer::I16(_) => PixelType::I16,
            PixelBuffer::U16(_) => PixelType::U16,
            PixelBuffer::I32(_) => PixelType::I32,
            PixelBuffer::U32(_) => PixelType::U32,
            PixelBuffer::I64(_) => PixelType::I64,
            PixelBuffer::U64(_) => PixelType::U64,
            PixelBuffer::F32(_) => PixelType::F32,
            PixelBuffer::F64(_) => PixelType::F64,
            PixelBuffer::CplxF32(_) => PixelType::CplxF32,
            PixelBuffer::CplxF64(_) => PixelType::CplxF64,
            PixelBuffer::Rgb(_) => PixelType::Rgb,
            PixelBuffer::Rgba(_) => PixelType::Rgba,
        }
    }
}
