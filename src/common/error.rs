use std::path::PathBuf;

use thiserror::Error;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum WriterError {
    // Configuration
    #[error("Failed to read image at {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Block width must be positive")]
    InvalidBlockWidth,

    // Rendering
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

impl WriterError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ImageRead { .. } | Self::InvalidColor(_) | Self::InvalidBlockWidth)
    }
}

pub type WriterResult<T> = Result<T, WriterError>;
