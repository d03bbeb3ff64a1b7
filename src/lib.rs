//! A small lossless-compression codec suite: DEFLATE/gzip and LZMA
//! encoders, an LZ4 encoder/decoder, a Zstandard decoder, and a minimal
//! ZIP container writer. Every codec works in-memory, one-shot, against
//! caller-supplied `src`/`dst` slices.
//!
//! Ported from a small, readable reference implementation of each format
//! rather than from the "real" production codebases (zlib, liblzma, the
//! upstream lz4/zstd C libraries) — see `DESIGN.md` for what each module
//! is grounded on.

pub mod bitstream;
pub mod cli;
pub mod crc32;
pub mod deflate;
pub mod error;
pub mod lz4;
pub mod lzma;
mod lzmatch;
mod rangecoder;
pub mod zip;
pub mod zstd;

#[cfg(test)]
mod test_support;

pub use error::{CodecError, ErrorKind, Result};
