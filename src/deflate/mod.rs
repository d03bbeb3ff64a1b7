//! DEFLATE (RFC 1951) block encoder and gzip envelope.
//!
//! Encode-only: this crate's Zstandard/LZ4/LZMA decoders don't need a
//! DEFLATE decoder, and gunzip is an explicit non-goal (§1).

mod block;
mod huffman;
mod tables;

use crate::bitstream::ForwardWriter;
use crate::crc32::crc32;
use crate::error::{CodecError, Result};

#[cfg(feature = "dynamic-huffman")]
const MAX_BLOCK_LEN: usize = 32_768;
#[cfg(not(feature = "dynamic-huffman"))]
const MAX_BLOCK_LEN: usize = 16_777_216;

/// Encodes `src` as a raw DEFLATE stream (no gzip wrapper) into `dst`,
/// returning the number of bytes written.
///
/// Splits `src` into `MAX_BLOCK_LEN`-byte blocks. For each block, tries a
/// fixed-Huffman encoding and (when the `dynamic-huffman` feature is on) a
/// dynamic-Huffman encoding, keeping whichever produced fewer bytes; fixed
/// wins on a tie.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    if src.len() > 0xFFFF_0000 {
        return Err(CodecError::SrcOverflow);
    }
    if dst.len() > 0xFFFF_0000 {
        return Err(CodecError::DstOverflow);
    }

    let mut w = ForwardWriter::new(dst);

    if src.is_empty() {
        block::emit_fixed_block(&mut w, &[], true)?;
    } else {
        let mut i = 0usize;
        while i < src.len() {
            let is_final = i + MAX_BLOCK_LEN >= src.len();
            let block_len = if is_final { src.len() - i } else { MAX_BLOCK_LEN };
            let chunk = &src[i..i + block_len];

            let backup = w.snapshot();
            block::emit_fixed_block(&mut w, chunk, is_final)?;
            let fixed_len = w.bytes_written();

            #[cfg(feature = "dynamic-huffman")]
            {
                w.restore(backup);
                block::emit_dynamic_block(&mut w, chunk, is_final)?;
                let dynamic_len = w.bytes_written();

                if fixed_len <= dynamic_len {
                    log::debug!("deflate: block at {i} ({block_len}B) keeps fixed Huffman");
                    w.restore(backup);
                    block::emit_fixed_block(&mut w, chunk, is_final)?;
                } else {
                    log::debug!("deflate: block at {i} ({block_len}B) keeps dynamic Huffman");
                }
            }
            #[cfg(not(feature = "dynamic-huffman"))]
            {
                let _ = fixed_len;
            }

            i += block_len;
        }
    }

    w.align_to_byte()?;
    Ok(w.bytes_written())
}

/// gzip's fixed 10-byte member header: magic `1F 8B`, method 8 (deflate),
/// flags 0, mtime 0, extra-flags 0x03, OS 0x04. Matches the source's
/// header bytes exactly rather than the conventional XFL=0/OS=3 (Unix)
/// values most gzip implementations emit.
const GZIP_HEADER: [u8; 10] = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x04];

/// Wraps `src`'s DEFLATE encoding in a gzip member: 10-byte header, the
/// DEFLATE payload, then CRC-32 and length-mod-2^32 trailers (both LE).
pub fn gzip(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    if dst.len() < GZIP_HEADER.len() {
        return Err(CodecError::DstOverflow);
    }
    dst[..10].copy_from_slice(&GZIP_HEADER);
    let mut pos = 10;

    let n = encode(src, &mut dst[pos..])?;
    pos += n;

    let crc = crc32(src);
    let len = src.len() as u32;
    let trailer = dst.get_mut(pos..pos + 8).ok_or(CodecError::DstOverflow)?;
    trailer[0..4].copy_from_slice(&crc.to_le_bytes());
    trailer[4..8].copy_from_slice(&len.to_le_bytes());
    pos += 8;

    log::trace!("gzip: wrote {pos} bytes for {} input bytes", src.len());
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_20_byte_stream() {
        let mut dst = [0u8; 20];
        let n = gzip(&[], &mut dst).unwrap();
        assert_eq!(n, 20);
        assert_eq!(
            dst,
            [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x04, 0x03, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn highly_repetitive_input_compresses_small_and_round_trips() {
        let src = vec![0u8; 10_000];
        let mut dst = vec![0u8; 20_000];
        let n = gzip(&src, &mut dst).unwrap();
        assert!(n < 100, "expected < 100 bytes, got {n}");
        let decoded = crate::test_support::gunzip_via_flate2(&dst[..n]);
        assert_eq!(decoded, src);
    }

    #[test]
    fn random_like_input_round_trips() {
        let mut src = vec![0u8; 5000];
        let mut x: u32 = 0x2545F491;
        for b in src.iter_mut() {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *b = (x & 0xFF) as u8;
        }
        let mut dst = vec![0u8; src.len() * 2 + 1024];
        let n = gzip(&src, &mut dst).unwrap();
        let decoded = crate::test_support::gunzip_via_flate2(&dst[..n]);
        assert_eq!(decoded, src);
    }

    #[test]
    fn dst_overflow_is_reported() {
        let mut dst = [0u8; 5];
        assert_eq!(gzip(&[1, 2, 3], &mut dst), Err(CodecError::DstOverflow));
    }
}
