use std::path::PathBuf;
use thiserror::Error;

use imageproc::image::ImageError;

/// Errors returned by the codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input was empty after trimming
    #[error("Please enter a Base64 string.")]
    EmptyInput,

    /// Input is not Base64, or the bytes are not an image.
    ///
    /// Both cases share one message; the cause is kept as the error source.
    #[error("Invalid Base64 string.")]
    InvalidEncoding(#[source] InvalidInput),

    /// Destination could not be written
    #[error("Failed to write image: {0}")]
    Write(#[source] std::io::Error),

    /// The encoder rejected the raster
    #[error("Failed to encode image: {0}")]
    Encode(#[source] ImageError),

    /// Save path does not end in .png, .jpg or .jpeg
    #[error("Unsupported file type: {} (expected .png, .jpg or .jpeg)", .0.display())]
    UnsupportedExtension(PathBuf),

    /// Raster with a zero width or height
    #[error("Image has no pixels")]
    EmptyImage,
}

/// Why a non-empty input could not be decoded.
#[derive(Debug, Error)]
pub enum InvalidInput {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not a recognized image: {0}")]
    Image(#[from] ImageError),
}

impl From<InvalidInput> for CodecError {
    fn from(err: InvalidInput) -> Self {
        CodecError::InvalidEncoding(err)
    }
}

impl CodecError {
    /// True for errors caused by the text the user supplied.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CodecError::EmptyInput | CodecError::InvalidEncoding(_))
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
