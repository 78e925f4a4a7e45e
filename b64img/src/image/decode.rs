//! Base64 and image decoding

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use imageproc::image::{guess_format, load_from_memory};

use crate::error::{CodecError, InvalidInput, Result};

use super::DecodedImage;

/// Standard alphabet. Padding may be omitted but must be canonical when present.
const STANDARD_LENIENT_PAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode Base64 text into an image.
///
/// The container is detected from the decoded bytes, not from any name.
pub fn decode(input: &str) -> Result<DecodedImage> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let bytes = STANDARD_LENIENT_PAD
        .decode(input)
        .map_err(InvalidInput::from)
        .inspect_err(|e| log::debug!("Rejected input of {} chars: {e}", input.len()))?;

    decode_bytes(&bytes)
}

/// Decode raw container bytes (PNG, JPEG, ...) into an image.
fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let format = guess_format(bytes).ok();
    let img = load_from_memory(bytes)
        .map_err(InvalidInput::from)
        .inspect_err(|e| log::debug!("Rejected {} decoded bytes: {e}", bytes.len()))?;

    log::debug!(
        "Decoded {}x{} {:?} image ({:?})",
        img.width(),
        img.height(),
        format,
        img.color()
    );

    DecodedImage::from_rgba(img.into_rgba8())
        .map(|decoded| decoded.with_source_format(format))
        .map_err(|_| InvalidInput::Image(empty_image_error()).into())
}

fn empty_image_error() -> imageproc::image::ImageError {
    use imageproc::image::error::{LimitError, LimitErrorKind};
    imageproc::image::ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError))
}
