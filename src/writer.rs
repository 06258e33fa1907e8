use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::format::{ImageError, ImageKind, Stream, TargetSpec, PAK3_SPEC, STC_SPEC};

pub mod stream;

use stream::{copy_exact, fill_exact, probe_size, Scratch};

/// Outcome of a successful transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageReport {
    pub kind: ImageKind,
    pub source_size: u64,
    pub target_size: u64,
    /// Zero bytes left behind the image. `None` for patched kinds, whose
    /// padding is partly overwritten.
    pub free_bytes: Option<u64>,
}

/// Lays `input` out in `output` according to `spec`:
/// prefix, image, zero padding up to the target size, then the patch.
///
/// # Errors
/// `TooLarge` when the input exceeds the kind's ceiling, before anything is
/// written. Any stream failure is returned as soon as it happens.
pub fn write_image<R, W>(
    spec: &TargetSpec,
    input: &mut R,
    output: &mut W,
    scratch: &mut Scratch,
) -> Result<ImageReport, ImageError>
where
    R: Read + Seek + ?Sized,
    W: Write + Seek + ?Sized,
{
    let source_size = probe_size(input)?;
    let ceiling = spec.ceiling();
    debug!(kind = ?spec.kind, source_size, ceiling, target = spec.target_size, "probed source");
    if source_size > ceiling {
        return Err(ImageError::TooLarge {
            size: source_size,
            ceiling,
            excess: source_size - ceiling,
        });
    }

    if let Some(prefix) = spec.prefix {
        fill_exact(output, prefix.fill, prefix.len, scratch)?;
    }
    copy_exact(input, output, source_size, scratch)?;

    let free = spec.target_size - spec.prefix_len() - source_size;
    fill_exact(output, 0, free, scratch)?;

    if let Some(patch) = spec.patch {
        debug!(offset = patch.offset, len = patch.bytes.len(), "patching output");
        output
            .seek(SeekFrom::Start(patch.offset))
            .map_err(|error| ImageError::Seek {
                stream: Stream::Destination,
                error,
            })?;
        output
            .write_all(patch.bytes)
            .map_err(|error| ImageError::ShortWrite { error })?;
    }

    Ok(ImageReport {
        kind: spec.kind,
        source_size,
        target_size: spec.target_size,
        free_bytes: spec.patch.is_none().then_some(free),
    })
}

/// Copies the image and zero-pads it to `target_size` bytes.
///
/// # Errors
/// See [`write_image`].
pub fn pad_image<R, W>(
    target_size: u64,
    input: &mut R,
    output: &mut W,
    scratch: &mut Scratch,
) -> Result<ImageReport, ImageError>
where
    R: Read + Seek + ?Sized,
    W: Write + Seek + ?Sized,
{
    write_image(&TargetSpec::pad(target_size), input, output, scratch)
}

/// Builds a 128 KiB Steem Engine cartridge: a zero long, the image, zeros.
///
/// # Errors
/// See [`write_image`].
pub fn stc_image<R, W>(
    input: &mut R,
    output: &mut W,
    scratch: &mut Scratch,
) -> Result<ImageReport, ImageError>
where
    R: Read + Seek + ?Sized,
    W: Write + Seek + ?Sized,
{
    write_image(&STC_SPEC, input, output, scratch)
}

/// Builds a 512 KiB PAK/3 image from a 256 KiB ROM and plants the jump at
/// 0x40030. `output` must be seekable.
///
/// # Errors
/// See [`write_image`].
pub fn pak3_image<R, W>(
    input: &mut R,
    output: &mut W,
    scratch: &mut Scratch,
) -> Result<ImageReport, ImageError>
where
    R: Read + Seek + ?Sized,
    W: Write + Seek + ?Sized,
{
    write_image(&PAK3_SPEC, input, output, scratch)
}
