use thiserror::Error;

/// Errors that can occur while thinning or tracing a bitmap.
///
/// Algorithmic dead ends (exhausted depth budget, no usable seam, unmatched
/// fragments) are not errors; only caller contract violations and I/O are.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("buffer of length {len} does not match {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("pixel {index} has value {value}, expected 0 or 1")]
    NonBinaryPixel { index: usize, value: u8 },

    #[error(
        "region {width}x{height} at ({x}, {y}) exceeds image bounds {image_width}x{image_height}"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        image_width: usize,
        image_height: usize,
    },

    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("no skeleton found in image")]
    NoSkeleton,

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
