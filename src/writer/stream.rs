use std::io::{Read, Seek, SeekFrom, Write};

use crate::format::{ImageError, Stream};

pub const BUFFER_SIZE: usize = 16 * 1024;

/// Intermediate buffer shared serially by the copy and fill primitives.
/// Memory use stays at one buffer whatever the image size.
#[derive(Debug)]
pub struct Scratch {
    buf: Vec<u8>,
}

impl Scratch {
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(BUFFER_SIZE)
    }

    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0; size.max(1)],
        }
    }

    fn chunk(&self, remaining: u64) -> usize {
        usize::try_from(remaining).map_or(self.buf.len(), |r| r.min(self.buf.len()))
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies exactly `count` bytes from `source` to `dest`.
///
/// # Errors
/// `ShortRead` when `source` ends early, `Read` on a read error and
/// `ShortWrite` when `dest` refuses bytes. Positions are not rolled back.
pub fn copy_exact<R, W>(
    source: &mut R,
    dest: &mut W,
    count: u64,
    scratch: &mut Scratch,
) -> Result<(), ImageError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut remaining = count;
    while remaining > 0 {
        let want = scratch.chunk(remaining);
        let buf = &mut scratch.buf[..want];
        let got = source
            .read(buf)
            .map_err(|error| ImageError::Read { error })?;
        if got == 0 {
            return Err(ImageError::ShortRead {
                expected: count,
                copied: count - remaining,
            });
        }
        dest.write_all(&buf[..got])
            .map_err(|error| ImageError::ShortWrite { error })?;
        remaining -= got as u64;
    }
    Ok(())
}

/// Writes `count` copies of `value` to `dest`.
///
/// # Errors
/// `ShortWrite` when `dest` refuses bytes.
pub fn fill_exact<W>(
    dest: &mut W,
    value: u8,
    count: u64,
    scratch: &mut Scratch,
) -> Result<(), ImageError>
where
    W: Write + ?Sized,
{
    if count == 0 {
        return Ok(());
    }
    let filled = scratch.chunk(count);
    scratch.buf[..filled].fill(value);

    let mut remaining = count;
    while remaining > 0 {
        let chunk = scratch.chunk(remaining).min(filled);
        dest.write_all(&scratch.buf[..chunk])
            .map_err(|error| ImageError::ShortWrite { error })?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Returns the total length of `stream` and leaves its position where it
/// was.
///
/// # Errors
/// `Seek` when the position cannot be queried, moved or restored.
pub fn probe_size<S>(stream: &mut S) -> Result<u64, ImageError>
where
    S: Seek + ?Sized,
{
    let seek_err = |error| ImageError::Seek {
        stream: Stream::Source,
        error,
    };
    let initial = stream.stream_position().map_err(seek_err)?;
    let end = stream.seek(SeekFrom::End(0)).map_err(seek_err)?;
    stream.seek(SeekFrom::Start(initial)).map_err(seek_err)?;
    Ok(end)
}
