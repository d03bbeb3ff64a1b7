//! Reference-decoder helpers used by this crate's own `#[cfg(test)]`
//! modules, kept behind the same `flate2`/`lz4_flex` dev-dependencies
//! the `e2e/interop.rs` suite uses for its own independent checks.

use std::io::Read;

/// Decodes a gzip member with `flate2`, for round-trip checks against this
/// crate's own DEFLATE/gzip encoder.
pub fn gunzip_via_flate2(gz: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(gz).read_to_end(&mut out).expect("flate2 failed to decode our gzip output");
    out
}

/// Decodes a raw DEFLATE stream (no gzip wrapper) with `flate2`.
pub fn inflate_via_flate2(deflate: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(deflate).read_to_end(&mut out).expect("flate2 failed to decode our deflate output");
    out
}

/// Decodes an LZ4 frame with `lz4_flex`, for round-trip checks against this
/// crate's own LZ4 frame encoder.
pub fn lz4_decompress_via_lz4_flex(frame: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    lz4_flex::frame::FrameDecoder::new(frame).read_to_end(&mut out).expect("lz4_flex failed to decode our frame output");
    out
}
