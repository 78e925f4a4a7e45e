use std::io::Cursor;

use b64img::{decode, encode, CodecError, DecodedImage, EncodeOptions, ImageCodec, OutputFormat};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use imageproc::image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    ColorType, ExtendedColorType, ImageEncoder, ImageReader, Rgba, RgbaImage,
};

/// 16x9 gradient with a transparent band on the right
fn gradient() -> RgbaImage {
    RgbaImage::from_fn(16, 9, |x, y| {
        let alpha = if x >= 12 { (x * 20) as u8 } else { 255 };
        Rgba([(x * 15) as u8, (y * 28) as u8, 128, alpha])
    })
}

fn png_of(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .unwrap();
    out
}

fn reencode(img: &DecodedImage, format: OutputFormat) -> Vec<u8> {
    let mut out = Vec::new();
    encode(img, format, &mut out).unwrap();
    out
}

#[test]
fn decodes_png_with_declared_dimensions() {
    let source = gradient();
    let img = decode(&STANDARD.encode(png_of(&source))).unwrap();

    assert_eq!(img.dimensions(), (16, 9));
    assert_eq!(img.as_rgba(), &source);
}

#[test]
fn decodes_jpeg_by_content() {
    let rgb = imageproc::image::RgbImage::from_pixel(7, 5, imageproc::image::Rgb([90, 160, 30]));
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90)
        .write_image(rgb.as_raw(), 7, 5, ExtendedColorType::Rgb8)
        .unwrap();

    let img = decode(&STANDARD.encode(&jpeg)).unwrap();

    assert_eq!(img.dimensions(), (7, 5));
    assert!(!img.has_transparency());
}

#[test]
fn empty_is_never_invalid_encoding() {
    assert!(matches!(decode(""), Err(CodecError::EmptyInput)));
}

#[test]
fn garbage_is_invalid_encoding() {
    assert!(matches!(
        decode("not-valid-base64!!"),
        Err(CodecError::InvalidEncoding(_))
    ));
}

#[test]
fn png_round_trip_is_lossless() {
    let first = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    let again = decode(&STANDARD.encode(reencode(&first, OutputFormat::Png))).unwrap();

    assert_eq!(first.as_rgba(), again.as_rgba());
}

#[test]
fn jpeg_round_trip_keeps_dimensions() {
    let first = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    let again = decode(&STANDARD.encode(reencode(&first, OutputFormat::Jpeg))).unwrap();

    assert_eq!(first.dimensions(), again.dimensions());
}

#[test]
fn jpeg_output_has_no_alpha_and_png_keeps_it() {
    let img = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    assert!(img.has_transparency());

    let jpeg = ImageReader::new(Cursor::new(reencode(&img, OutputFormat::Jpeg)))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(jpeg.color(), ColorType::Rgb8);

    let png = ImageReader::new(Cursor::new(reencode(&img, OutputFormat::Png)))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(png.color(), ColorType::Rgba8);
    assert_eq!(png.to_rgba8(), gradient());
}

#[test]
fn save_picks_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let img = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    let codec = ImageCodec::new(EncodeOptions {
        jpeg_quality: 95,
        ..Default::default()
    });

    let png_path = dir.path().join("out.PNG");
    let jpeg_path = dir.path().join("out.jpeg");

    assert_eq!(codec.save(&img, &png_path).unwrap(), OutputFormat::Png);
    assert_eq!(codec.save(&img, &jpeg_path).unwrap(), OutputFormat::Jpeg);

    let png = std::fs::read(&png_path).unwrap();
    let jpeg = std::fs::read(&jpeg_path).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
    assert!(jpeg.starts_with(&[0xFF, 0xD8]));

    // only the two outputs, no leftover temp files
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn save_into_missing_directory_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.png");
    let img = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    let before = img.clone();

    let err = ImageCodec::default().save(&img, &path).unwrap_err();

    assert!(matches!(err, CodecError::Write(_)));
    assert!(!path.exists());
    assert_eq!(img, before);
}

#[test]
fn save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    std::fs::write(&path, b"stale").unwrap();

    let img = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    ImageCodec::default().save(&img, &path).unwrap();

    let saved = decode(&STANDARD.encode(std::fs::read(&path).unwrap())).unwrap();
    assert_eq!(saved, img);
}

#[cfg(unix)]
#[test]
fn saved_files_are_not_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let img = decode(&STANDARD.encode(png_of(&gradient()))).unwrap();
    let mode = |path: &std::path::Path| {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    };

    let fresh = dir.path().join("fresh.png");
    ImageCodec::default().save(&img, &fresh).unwrap();
    assert_eq!(mode(&fresh), 0o644);

    // overwriting keeps the mode the file already had
    let existing = dir.path().join("existing.png");
    std::fs::write(&existing, b"stale").unwrap();
    std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o640)).unwrap();
    ImageCodec::default().save(&img, &existing).unwrap();
    assert_eq!(mode(&existing), 0o640);
}

#[test]
fn encoder_failure_leaves_destination_untouched() {
    // wider than JPEG's 65535 pixel limit
    let img = DecodedImage::from_rgba(RgbaImage::new(70_000, 1)).unwrap();

    let mut out = Vec::new();
    let err = encode(&img, OutputFormat::Jpeg, &mut out).unwrap_err();
    assert!(matches!(err, CodecError::Encode(_)));
    assert!(out.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.jpg");
    let err = ImageCodec::default().save(&img, &path).unwrap_err();
    assert!(matches!(err, CodecError::Encode(_)));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
