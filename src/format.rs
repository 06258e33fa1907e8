use std::io;

use thiserror::Error;

pub const KIB: u64 = 1024;

pub const STC_TARGET_SIZE: u64 = 128 * KIB;
pub const STC_PREFIX_LEN: u64 = 4;

pub const PAK3_TARGET_SIZE: u64 = 512 * KIB;
pub const PAK3_MAX_INPUT: u64 = 256 * KIB;
pub const PAK3_PATCH_OFFSET: u64 = 0x40030;
/// `jmp $e00000.l`
pub const PAK3_PATCH_BYTES: [u8; 6] = [0x4e, 0xf9, 0x00, 0xe0, 0x00, 0x00];

pub const PAK3_SPEC: TargetSpec = TargetSpec {
    kind: ImageKind::Pak3,
    target_size: PAK3_TARGET_SIZE,
    max_input: Some(PAK3_MAX_INPUT),
    prefix: None,
    patch: Some(Patch {
        offset: PAK3_PATCH_OFFSET,
        bytes: &PAK3_PATCH_BYTES,
    }),
};

pub const STC_SPEC: TargetSpec = TargetSpec {
    kind: ImageKind::Stc,
    target_size: STC_TARGET_SIZE,
    max_input: None,
    prefix: Some(Prefix {
        len: STC_PREFIX_LEN,
        fill: 0x00,
    }),
    patch: None,
};

/// Which of the two streams an I/O failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Source,
    Destination,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{0}: invalid size.")]
    InvalidSize(String),
    #[error("image is too big: {excess} extra bytes")]
    TooLarge { size: u64, ceiling: u64, excess: u64 },
    #[error("premature end of file")]
    ShortRead { expected: u64, copied: u64 },
    #[error("{error}")]
    ShortWrite { error: io::Error },
    #[error("{error}")]
    Read { error: io::Error },
    #[error("{error}")]
    Seek { stream: Stream, error: io::Error },
    #[error("{error}")]
    Open { stream: Stream, error: io::Error },
    #[error("{error}")]
    Close { stream: Stream, error: io::Error },
}

impl ImageError {
    /// Stream whose path belongs in front of the message, if any.
    #[must_use]
    pub fn stream(&self) -> Option<Stream> {
        match self {
            Self::InvalidSize(_) => None,
            Self::TooLarge { .. } | Self::ShortRead { .. } | Self::Read { .. } => {
                Some(Stream::Source)
            }
            Self::ShortWrite { .. } => Some(Stream::Destination),
            Self::Seek { stream, .. } | Self::Open { stream, .. } | Self::Close { stream, .. } => {
                Some(*stream)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Pad,
    Pak3,
    Stc,
}

impl ImageKind {
    /// Fixed layout of a cartridge kind. `Pad` has no fixed layout and
    /// yields `None`; use [`TargetSpec::pad`] for it.
    #[must_use]
    pub fn spec(self) -> Option<TargetSpec> {
        match self {
            Self::Pad => None,
            Self::Pak3 => Some(PAK3_SPEC),
            Self::Stc => Some(STC_SPEC),
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Pad | Self::Pak3 => "image",
            Self::Stc => "Steem Engine cartridge image",
        }
    }
}

/// Bytes written in front of the copied image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    pub len: u64,
    pub fill: u8,
}

/// Literal bytes stamped at an absolute offset after the sequential pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub offset: u64,
    pub bytes: &'static [u8],
}

impl Patch {
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }
}

/// Size and layout of one target container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub kind: ImageKind,
    pub target_size: u64,
    pub max_input: Option<u64>,
    pub prefix: Option<Prefix>,
    pub patch: Option<Patch>,
}

impl TargetSpec {
    #[must_use]
    pub fn pad(target_size: u64) -> Self {
        Self {
            kind: ImageKind::Pad,
            target_size,
            max_input: None,
            prefix: None,
            patch: None,
        }
    }

    #[must_use]
    pub fn prefix_len(&self) -> u64 {
        self.prefix.map_or(0, |p| p.len)
    }

    /// Largest accepted input. The image always has to fit behind the
    /// prefix; `max_input` can only lower that.
    #[must_use]
    pub fn ceiling(&self) -> u64 {
        let room = self.target_size.saturating_sub(self.prefix_len());
        self.max_input.map_or(room, |max| max.min(room))
    }
}
