//! LZ4 encoder and decoder: block-format sequences wrapped in modern,
//! legacy, or skippable frames.
//!
//! Ported from `original_source/lz4C.c` and `lz4D.c`, the smaller
//! reference-style LZ4 codec that format this crate targets rather than
//! upstream `lz4.c`'s hash-chain/HC search.

mod block;
mod frame;

pub use block::MAX_OFFSET;

use crate::error::Result;

/// Encodes `src` into a single modern LZ4 frame, returning bytes written.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    frame::encode(src, dst)
}

/// Decodes every LZ4 frame concatenated in `src` (modern, legacy, or
/// skippable), returning the total number of bytes written to `dst`.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    frame::decode(src, dst)
}
