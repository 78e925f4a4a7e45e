use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::io::Read;
use std::path::PathBuf;

use b64img::{CodecError, EncodeOptions, ImageCodec, OutputFormat, PngCompression};

#[derive(Parser)]
#[command(name = "b64img-cli")]
#[command(about = "Decode a base64 string into an image and optionally save it", long_about = None)]
#[command(version)]
struct Args {
    /// Base64 text. Read from --file or stdin when omitted
    #[arg(value_name = "BASE64", conflicts_with = "file")]
    input: Option<String>,

    /// Read the base64 text from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Save the image here. The extension picks the format: .png, .jpg or .jpeg
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, value_name = "QUALITY", default_value_t = 85)]
    quality: u8,

    /// PNG compression level
    #[arg(long, value_enum, default_value_t = PngCompressionArg::Default)]
    png_compression: PngCompressionArg,

    /// Background that transparent pixels are blended onto for JPEG, as RRGGBB
    #[arg(long, value_name = "RRGGBB", default_value = "ffffff", value_parser = parse_background)]
    background: [u8; 3],

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

fn parse_background(value: &str) -> Result<[u8; 3], String> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected 6 hex digits, got `{value}`"));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex color `{value}`"))
    };

    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    let options = build_options(&args)?;
    let codec = ImageCodec::new(options);

    // Validate output path before doing any work
    if let Some(output) = &args.output {
        if OutputFormat::from_path(output).is_none() {
            anyhow::bail!(CodecError::UnsupportedExtension(output.clone()));
        }
    }

    let text = read_input(&args)?;

    let img = codec.decode(&text).map_err(user_facing)?;

    let (width, height) = img.dimensions();
    let source = img
        .source_format()
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|| "unknown".into());
    log::info!("Decoded {width}x{height} {source} image");
    if img.has_transparency() {
        log::debug!("Image has transparent pixels");
    }

    let Some(output) = &args.output else {
        return Ok(());
    };

    let format = codec.save(&img, output).map_err(user_facing)?;

    if !format.supports_alpha() && img.has_transparency() {
        log::warn!("JPEG has no alpha channel, transparent pixels were flattened");
    }
    log::info!("Saved {format}: {}", output.display());

    Ok(())
}

/// Keep the short message for the user, log the cause for diagnostics.
///
/// Bad input only gets the fixed message; the decoder's reason is debug
/// detail. Anything else already names its cause in the message.
fn user_facing(err: CodecError) -> anyhow::Error {
    if err.is_input_error() {
        if let Some(source) = std::error::Error::source(&err) {
            log::debug!("{err} ({source})");
        }
    } else {
        log::debug!("{err:?}");
    }
    anyhow::anyhow!("{err}")
}

fn read_input(args: &Args) -> Result<String> {
    if let Some(input) = &args.input {
        return Ok(input.clone());
    }

    match &args.file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_options(args: &Args) -> Result<EncodeOptions> {
    // Validate quality
    if args.quality == 0 || args.quality > 100 {
        anyhow::bail!("Quality must be between 1 and 100");
    }

    Ok(EncodeOptions {
        jpeg_quality: args.quality,
        png_compression: args.png_compression.into(),
        background: args.background,
    })
}
