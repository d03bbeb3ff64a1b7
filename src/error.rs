//! Error type shared by every codec.
//!
//! Each codec module used to carry its own small hand-rolled error enum
//! (one per format). This is the unification of all of them into the
//! stable kind taxonomy every codec agrees on.

use std::fmt;

/// Stable, `#[repr(u8)]` error kind. Useful when a caller (e.g. the CLI)
/// wants a plain integer rather than matching on [`CodecError`] variants.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MemoryRunout = 1,
    Unsupported = 2,
    DstOverflow = 3,
    SrcOverflow = 4,
    Data = 5,
    OutputLenMismatch = 6,
    Corrupt = 7,
}

/// Error returned by any codec entry point in this crate.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A required transient allocation failed.
    MemoryRunout,
    /// Input demands a feature this implementation does not provide
    /// (ZIP64, an out-of-range LZMA `lc/lp/pb`, an LZ4/Zstandard dictionary, ...).
    Unsupported(&'static str),
    /// Writing the next output byte would exceed the caller-supplied destination capacity.
    DstOverflow,
    /// Reading the next input byte would exceed the supplied source length.
    SrcOverflow,
    /// Decoded structure violates a format invariant (e.g. a back-reference
    /// distance reaching before the start of output).
    Data,
    /// LZMA header declared an uncompressed length different from what was decoded.
    OutputLenMismatch,
    /// Zstandard: any structural violation (bad FSE distribution, reserved
    /// bits set, reused table absent, wrong frame magic, ...).
    Corrupt(&'static str),
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::MemoryRunout => ErrorKind::MemoryRunout,
            CodecError::Unsupported(_) => ErrorKind::Unsupported,
            CodecError::DstOverflow => ErrorKind::DstOverflow,
            CodecError::SrcOverflow => ErrorKind::SrcOverflow,
            CodecError::Data => ErrorKind::Data,
            CodecError::OutputLenMismatch => ErrorKind::OutputLenMismatch,
            CodecError::Corrupt(_) => ErrorKind::Corrupt,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MemoryRunout => write!(f, "allocation failed"),
            CodecError::Unsupported(what) => write!(f, "unsupported: {what}"),
            CodecError::DstOverflow => write!(f, "destination buffer too small"),
            CodecError::SrcOverflow => write!(f, "source buffer truncated"),
            CodecError::Data => write!(f, "invalid compressed data"),
            CodecError::OutputLenMismatch => {
                write!(f, "decoded length does not match the declared length")
            }
            CodecError::Corrupt(what) => write!(f, "corrupt stream: {what}"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type Result<T> = std::result::Result<T, CodecError>;
