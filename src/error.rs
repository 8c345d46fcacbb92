use thiserror::Error;

/// Errors reported by the segmentation and chaining builders.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Bad dimensions or stride, short buffers, out-of-range or empty index
    /// lists, or a pixel variant the segmentation path does not support.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Allocation failure while reserving a point or link buffer.
    #[error("out of memory")]
    OutOfMemory,

    /// Degenerate linear regression (no horizontal spread) or a shear fit
    /// that failed to converge. Never escapes the chain-pool builder: the
    /// offending chain is dropped and the build continues.
    #[error("singular regression")]
    Singular,

    /// Internal invariant violation. Cannot fire on valid inputs; the
    /// corresponding checks are `debug_assert!`s in the builders.
    #[error("unexpected internal state: {0}")]
    Unexpected(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
