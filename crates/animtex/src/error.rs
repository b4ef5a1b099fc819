use std::io;

/// Errors produced while fetching, decoding or caching animation frames
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("image error: {0}")]
    Image(#[from] image::error::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("http error: {0}")]
    Http(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(FrameError),

    #[error("decoder worker is gone")]
    WorkerGone,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// The rgba patch length doesn't match the declared dimensions
    #[error("patch has {actual} bytes, expected {expected}")]
    PatchLength { expected: usize, actual: usize },

    #[error("zero sized frame")]
    ZeroSized,

    /// Larger than the gpu will accept as a single texture
    #[error("{width}x{height} exceeds the {max}px texture limit")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("no frame at index {0}")]
    Missing(usize),
}

impl Error {
    pub fn patch_length(expected: usize, actual: usize) -> Self {
        Error::InvalidFrame(FrameError::PatchLength { expected, actual })
    }

    pub fn zero_sized() -> Self {
        Error::InvalidFrame(FrameError::ZeroSized)
    }

    pub fn too_large(width: usize, height: usize, max: usize) -> Self {
        Error::InvalidFrame(FrameError::TooLarge { width, height, max })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
