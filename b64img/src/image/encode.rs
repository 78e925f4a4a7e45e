//! Image encoding: JPEG, PNG

use imageproc::image::{
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
    ExtendedColorType, ImageEncoder, ImageResult, Rgb, RgbImage, Rgba, RgbaImage,
};

use super::{DecodedImage, EncodeOptions, OutputFormat, PngCompression};

/// Encode the whole raster into an in-memory container.
pub(crate) fn encode_to_vec(
    img: &DecodedImage,
    format: OutputFormat,
    options: &EncodeOptions,
) -> ImageResult<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity((width * height) as usize);

    match format {
        OutputFormat::Jpeg => {
            let flat = flatten(img.as_rgba(), options.background);
            compress_to_jpeg(&flat, &mut buffer, options.jpeg_quality)?;
        }
        OutputFormat::Png => {
            compress_to_png(img.as_rgba(), &mut buffer, options.png_compression)?;
        }
    }

    log::debug!(
        "Encoded {width}x{height} image as {format} ({} bytes)",
        buffer.len()
    );

    Ok(buffer)
}

/// Compress an RGB image to JPEG with the specified quality
fn compress_to_jpeg<W>(img: &RgbImage, writer: &mut W, quality: u8) -> ImageResult<()>
where
    W: std::io::Write,
{
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )
}

/// Compress an RGBA image to PNG with the specified compression level
fn compress_to_png<W>(
    img: &RgbaImage,
    writer: &mut W,
    compression: PngCompression,
) -> ImageResult<()>
where
    W: std::io::Write,
{
    let compression_type = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let encoder = PngEncoder::new_with_quality(writer, compression_type, FilterType::Adaptive);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )
}

/// Blend every pixel onto an opaque background, dropping alpha
fn flatten(img: &RgbaImage, background: [u8; 3]) -> RgbImage {
    imageproc::map::map_colors(img, |Rgba([r, g, b, a])| {
        let blend = |c: u8, bg: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}
