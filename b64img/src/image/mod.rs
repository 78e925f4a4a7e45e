//! Raster type, output formats and encoder settings

pub(crate) mod decode;
pub(crate) mod encode;

use std::path::Path;

use imageproc::image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use strum::{Display, EnumIter};

use crate::error::{CodecError, Result};

/// A decoded image, normalized to 8-bit RGBA.
///
/// Dimensions are fixed for the life of the value. Scaling for display
/// happens on copies owned by the view.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
    source_format: Option<ImageFormat>,
}

impl DecodedImage {
    /// Wrap an existing raster. Fails with [`CodecError::EmptyImage`] if
    /// either dimension is zero.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CodecError::EmptyImage);
        }
        Ok(Self {
            pixels,
            source_format: None,
        })
    }

    pub(crate) fn with_source_format(mut self, format: Option<ImageFormat>) -> Self {
        self.source_format = format;
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel at `(x, y)`, or `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Container format the bytes were decoded from, if known
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    /// True if any pixel is not fully opaque
    pub fn has_transparency(&self) -> bool {
        self.pixels.pixels().any(|p| p[3] != u8::MAX)
    }

    /// Owned copy for consumers that want a `DynamicImage` (previews)
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.pixels.clone())
    }
}

/// Container written on save
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, serde::Serialize, serde::Deserialize,
)]
pub enum OutputFormat {
    #[strum(to_string = "JPEG")]
    Jpeg,
    #[strum(to_string = "PNG")]
    Png,
}

impl OutputFormat {
    /// Infer the format from a destination path's extension.
    ///
    /// `.png` is PNG, `.jpg` and `.jpeg` are JPEG, case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }

    /// Preferred extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Every extension accepted for this format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Jpeg => &["jpg", "jpeg"],
            OutputFormat::Png => &["png"],
        }
    }

    pub fn supports_alpha(self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

/// Encoder settings shared by every save
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// 1..=100
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
    /// Opaque color that transparent pixels are blended onto for JPEG
    pub background: [u8; 3],
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            png_compression: PngCompression::Default,
            background: [255, 255, 255],
        }
    }
}

impl EncodeOptions {
    /// Nudge the setting that applies to `format`: quality for JPEG,
    /// compression level for PNG.
    pub fn adjust(&mut self, format: OutputFormat, increase: bool, fine: bool) {
        let step = if fine { 1 } else { 5 };
        match format {
            OutputFormat::Jpeg => {
                self.jpeg_quality = if increase {
                    self.jpeg_quality.saturating_add(step).min(100)
                } else {
                    self.jpeg_quality.saturating_sub(step).max(1)
                };
            }
            OutputFormat::Png => {
                self.png_compression = if increase {
                    match self.png_compression {
                        PngCompression::Fast => PngCompression::Default,
                        PngCompression::Default | PngCompression::Best => PngCompression::Best,
                    }
                } else {
                    match self.png_compression {
                        PngCompression::Fast | PngCompression::Default => PngCompression::Fast,
                        PngCompression::Best => PngCompression::Default,
                    }
                };
            }
        }
    }
}
