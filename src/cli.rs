use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::format::{ImageError, ImageKind, TargetSpec};

/// Parses a byte count with an optional `k`, `m` or `g` suffix (either case,
/// powers of 1024).
///
/// # Errors
/// Returns `ImageError::InvalidSize` for anything else, including overflow.
pub fn parse_size(input: &str) -> Result<u64, ImageError> {
    let invalid = || ImageError::InvalidSize(input.to_string());

    let digits_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, suffix) = input.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value = digits.parse::<u64>().map_err(|_| invalid())?;

    let shift = match suffix {
        "" => 0,
        "k" | "K" => 10,
        "m" | "M" => 20,
        "g" | "G" => 30,
        _ => return Err(invalid()),
    };
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(invalid)
}

/// Renders a command-line error as `<program>: <detail>` when it comes from
/// one of our own value parsers. Other clap errors keep clap's usage text.
#[must_use]
pub fn parse_error_message(err: &clap::Error, program: &str) -> Option<String> {
    std::error::Error::source(err)
        .and_then(|source| source.downcast_ref::<ImageError>())
        .map(|image_err| format!("{program}: {image_err}"))
}

/// Name used in front of diagnostics, taken from `argv[0]`.
#[must_use]
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(PathBuf::from)
        .as_deref()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

#[derive(Debug, Parser)]
#[command(name = "mkrom", version, about = "Build padded ROM and cartridge images")]
pub struct Args {
    /// Print diagnostic events to stderr
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Do not print progress lines
    #[arg(long = "quiet", short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: ImageCommand,
}

#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Generic zero padding
    Pad {
        /// Target size in bytes, optionally suffixed with k, m or g
        #[arg(value_parser = parse_size)]
        size: u64,
        source: PathBuf,
        destination: PathBuf,
    },
    /// PAK/3 image
    Pak3 {
        #[arg(value_name = "SOURCE.IMG")]
        source: PathBuf,
        #[arg(value_name = "DESTINATION.IMG")]
        destination: PathBuf,
    },
    /// Steem Engine cartridge image
    Stc {
        #[arg(value_name = "SOURCE.IMG")]
        source: PathBuf,
        #[arg(value_name = "DESTINATION.STC")]
        destination: PathBuf,
    },
}

impl ImageCommand {
    #[must_use]
    pub fn kind(&self) -> ImageKind {
        match self {
            Self::Pad { .. } => ImageKind::Pad,
            Self::Pak3 { .. } => ImageKind::Pak3,
            Self::Stc { .. } => ImageKind::Stc,
        }
    }

    /// Layout from the kind table; `pad` supplies its own target size.
    #[must_use]
    pub fn target_spec(&self) -> TargetSpec {
        let pad_size = match self {
            Self::Pad { size, .. } => *size,
            Self::Pak3 { .. } | Self::Stc { .. } => 0,
        };
        self.kind()
            .spec()
            .unwrap_or_else(|| TargetSpec::pad(pad_size))
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Pad { source, .. } | Self::Pak3 { source, .. } | Self::Stc { source, .. } => {
                source
            }
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::Pad { destination, .. }
            | Self::Pak3 { destination, .. }
            | Self::Stc { destination, .. } => destination,
        }
    }
}
