//! Base64 to image codec.
//!
//! Decodes Base64 text into an RGBA raster and writes rasters back out as
//! PNG or JPEG. Nothing in here knows about terminals or windows.

pub mod codec;
pub mod error;
pub mod image;

// Re-export commonly used types
pub use codec::{decode, encode, ImageCodec};
pub use error::{CodecError, InvalidInput, Result};
pub use image::{DecodedImage, EncodeOptions, OutputFormat, PngCompression};
