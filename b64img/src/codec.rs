//! The two codec operations, plus saving to a path

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{CodecError, Result};
use crate::image::{self, DecodedImage, EncodeOptions, OutputFormat};

/// Decode Base64 text into an image. See [`ImageCodec::decode`].
pub fn decode(input: &str) -> Result<DecodedImage> {
    image::decode::decode(input)
}

/// Encode with default options. See [`ImageCodec::encode`].
pub fn encode<W: Write>(img: &DecodedImage, format: OutputFormat, destination: W) -> Result<()> {
    ImageCodec::default().encode(img, format, destination)
}

/// Stateless codec carrying the encoder settings used for every save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCodec {
    options: EncodeOptions,
}

impl ImageCodec {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Decode trimmed Base64 text into an image.
    ///
    /// Empty input is [`CodecError::EmptyInput`]. Anything that is not
    /// Base64, or decodes to bytes that are not an image, is
    /// [`CodecError::InvalidEncoding`].
    pub fn decode(&self, input: &str) -> Result<DecodedImage> {
        decode(input)
    }

    /// Serialize `img` as `format` and write it to `destination`.
    ///
    /// The container is built in memory first, so an encoder failure never
    /// writes anything. JPEG output has no alpha channel; PNG keeps it.
    pub fn encode<W: Write>(
        &self,
        img: &DecodedImage,
        format: OutputFormat,
        mut destination: W,
    ) -> Result<()> {
        let bytes = image::encode::encode_to_vec(img, format, &self.options)
            .map_err(CodecError::Encode)?;

        destination
            .write_all(&bytes)
            .and_then(|_| destination.flush())
            .map_err(CodecError::Write)
    }

    /// Save `img` to `path`, picking the format from its extension.
    ///
    /// Bytes go to a temporary file next to `path` which is renamed into
    /// place once complete, so a failure never leaves a partial file.
    pub fn save(&self, img: &DecodedImage, path: &Path) -> Result<OutputFormat> {
        let format = OutputFormat::from_path(path)
            .ok_or_else(|| CodecError::UnsupportedExtension(path.to_path_buf()))?;

        let bytes = image::encode::encode_to_vec(img, format, &self.options)
            .map_err(CodecError::Encode)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(CodecError::Write)?;
        file.write_all(&bytes)
            .and_then(|_| file.as_file().sync_all())
            .map_err(CodecError::Write)?;

        // temp files are owner-only; give the result the mode a plain write would
        if let Some(permissions) = target_permissions(path) {
            file.as_file()
                .set_permissions(permissions)
                .map_err(CodecError::Write)?;
        }
        file.persist(path).map_err(|e| CodecError::Write(e.error))?;

        log::info!(
            "Saved {}x{} {format} to {}",
            img.width(),
            img.height(),
            path.display()
        );

        Ok(format)
    }
}

/// Mode for the saved file: the existing file's when overwriting, else 0644.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::image::{Rgba, RgbaImage};

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample() -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 4]))).unwrap()
    }

    #[test]
    fn write_failures_are_reported() {
        let err = encode(&sample(), OutputFormat::Png, FailingWriter).unwrap_err();
        assert!(matches!(err, CodecError::Write(_)));
    }

    #[test]
    fn save_rejects_unknown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");

        let err = ImageCodec::default().save(&sample(), &path).unwrap_err();

        assert!(matches!(err, CodecError::UnsupportedExtension(_)));
        assert!(!path.exists());
    }
}
