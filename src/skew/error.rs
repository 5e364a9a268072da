//! Error types for the skew transform engine

use thiserror::Error;

/// Errors that can occur while transforming a sprite
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkewError {
    /// The pixel buffer does not hold `width * height` RGBA pixels.
    #[error("Invalid image size {width}x{height}x4={expected}, got {actual} bytes")]
    InvalidBufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The stride of a bitmap view is smaller than its width.
    #[error("Invalid stride {stride} for a row of {width} pixels")]
    InvalidStride { width: u32, stride: u32 },

    /// Dimensions too large to address in memory.
    #[error("Image dimensions {width}x{height} overflow the address space")]
    DimensionOverflow { width: u32, height: u32 },

    /// A scratch buffer could not be allocated.
    #[error("Failed to allocate {0} bytes for a resample buffer")]
    AllocationFailed(usize),
}

/// Result type for skew operations
pub type SkewResult<T> = Result<T, SkewError>;
