//! Zstandard decoder: frame/block parsing, literals and sequence
//! decoding, and sequence execution. Decode-only — this format has no
//! encoder in this crate.
//!
//! Ported from `original_source/ZSTD/TinyZstdDecompress.c`. That decoder
//! only ever processes a single frame (its own comment says so); this
//! module adds the multi-frame and skippable-frame dispatch at the top
//! level, styled after [`crate::lz4`]'s analogous frame loop, since a
//! concatenation of frames is otherwise a valid Zstandard stream.

mod fse;
mod huffman;
mod literals;
mod sequences;

use crate::bitstream::ForwardReader;
use crate::error::{CodecError, Result};
use fse::FseDtable;
use huffman::HufDtable;
use sequences::SeqPart;

const ZSTD_MAGIC_NUMBER: u32 = 0xFD2F_B528;
const MAGIC_SKIPPABLE_MIN: u32 = 0x184D_2A50;
const MAGIC_SKIPPABLE_MAX: u32 = 0x184D_2A5F;

/// State carried across a frame's blocks: the repeat-offset history and
/// whichever Huffman/FSE tables later blocks may reuse.
#[derive(Default)]
struct FrameContext {
    window_size: u64,
    frame_content_size: u64,
    content_checksum_flag: bool,
    n_bytes_decoded: u64,
    prev_offsets: [u64; 3],
    huf_table: Option<HufDtable>,
    ll_table: Option<FseDtable>,
    of_table: Option<FseDtable>,
    ml_table: Option<FseDtable>,
}

/// Decodes every frame concatenated in `src` (Zstandard or skippable),
/// returning the total bytes written to `dst`.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut r = ForwardReader::new(src);
    let mut dst_pos = 0usize;

    while !r.is_empty() {
        let magic = r.read_bytes_le(4)? as u32;
        if (MAGIC_SKIPPABLE_MIN..=MAGIC_SKIPPABLE_MAX).contains(&magic) {
            let len = r.read_bytes_le(4)? as usize;
            r.skip(len)?;
            log::debug!("zstd: skipping skippable frame, {len} bytes");
            continue;
        }
        if magic != ZSTD_MAGIC_NUMBER {
            return Err(CodecError::Corrupt("zstd: frame did not start with the zstd or skippable-frame magic"));
        }
        decode_frame(&mut r, dst, &mut dst_pos)?;
    }

    Ok(dst_pos)
}

fn parse_frame_header(r: &mut ForwardReader, ctx: &mut FrameContext) -> Result<()> {
    let dictionary_id_flag = r.read_bits(2)?;
    let content_checksum_flag = r.read_bits(1)? != 0;
    let reserved_bit = r.read_bits(1)?;
    let _unused_bit = r.read_bits(1)?;
    let single_segment_flag = r.read_bits(1)? != 0;
    let frame_content_size_flag = r.read_bits(2)?;

    if reserved_bit != 0 {
        return Err(CodecError::Corrupt("zstd: frame header reserved bit is set"));
    }
    if dictionary_id_flag != 0 {
        return Err(CodecError::Unsupported("zstd dictionary frames"));
    }

    ctx.content_checksum_flag = content_checksum_flag;

    if !single_segment_flag {
        let mantissa = r.read_bits(3)?;
        let exponent = r.read_bits(5)? as u32;
        let window_base = 1u64 << (10 + exponent);
        let window_add = (window_base / 8) * mantissa;
        ctx.window_size = window_base + window_add;
    }

    if single_segment_flag || frame_content_size_flag != 0 {
        let bytes = [1u32, 2, 4, 8][frame_content_size_flag as usize];
        let mut size = r.read_bits(bytes * 8)?;
        if bytes == 2 {
            size += 256;
        }
        ctx.frame_content_size = size;
    }

    if single_segment_flag {
        ctx.window_size = ctx.frame_content_size;
    }
    Ok(())
}

fn decode_frame(r: &mut ForwardReader, dst: &mut [u8], dst_pos: &mut usize) -> Result<()> {
    let mut ctx = FrameContext { prev_offsets: [1, 4, 8], ..FrameContext::default() };
    parse_frame_header(r, &mut ctx)?;

    if ctx.frame_content_size != 0 && ctx.frame_content_size as usize > dst.len() - *dst_pos {
        return Err(CodecError::DstOverflow);
    }

    loop {
        let last = r.read_bits(1)? != 0;
        let block_type = r.read_bits(2)?;
        let block_len = r.read_bits(21)? as usize;

        match block_type {
            0 => {
                let sub = r.fork_substream(block_len)?;
                let bytes = sub.remaining_bytes()?;
                if block_len > dst.len() - *dst_pos {
                    return Err(CodecError::DstOverflow);
                }
                dst[*dst_pos..*dst_pos + block_len].copy_from_slice(bytes);
                *dst_pos += block_len;
                ctx.n_bytes_decoded += block_len as u64;
            }
            1 => {
                let byte = r.read_bits(8)? as u8;
                if block_len > dst.len() - *dst_pos {
                    return Err(CodecError::DstOverflow);
                }
                dst[*dst_pos..*dst_pos + block_len].fill(byte);
                *dst_pos += block_len;
                ctx.n_bytes_decoded += block_len as u64;
            }
            2 => {
                let mut in_blk = r.fork_substream(block_len)?;
                decode_compressed_block(&mut in_blk, dst, dst_pos, &mut ctx)?;
            }
            _ => return Err(CodecError::Corrupt("zstd: reserved block type")),
        }

        if last {
            break;
        }
    }

    if ctx.content_checksum_flag {
        // Unverified: this decoder does not compute XXH64 over output.
        r.skip(4)?;
    }

    Ok(())
}

fn decode_compressed_block(r: &mut ForwardReader, dst: &mut [u8], dst_pos: &mut usize, ctx: &mut FrameContext) -> Result<()> {
    let literals_block_type = r.read_bits(2)? as u8;
    let literals = if literals_block_type <= 1 {
        literals::decode_literals_simple(r, literals_block_type)?
    } else {
        literals::decode_literals_compressed(r, &mut ctx.huf_table, literals_block_type)?
    };

    let hbyte = r.read_bits(8)? as u8;
    let n_seq = if hbyte < 128 {
        hbyte as usize
    } else if hbyte < 255 {
        (((hbyte - 128) as usize) << 8) + r.read_bits(8)? as usize
    } else {
        r.read_bits(16)? as usize + 0x7F00
    };

    let sequences = if n_seq > 0 {
        let compression_modes = r.read_bits(8)? as u8;
        if compression_modes & 3 != 0 {
            return Err(CodecError::Corrupt("zstd: reserved sequence compression-mode bits set"));
        }
        sequences::decode_seq_table(r, &mut ctx.ll_table, SeqPart::LiteralLength, (compression_modes >> 6) & 3)?;
        sequences::decode_seq_table(r, &mut ctx.of_table, SeqPart::Offset, (compression_modes >> 4) & 3)?;
        sequences::decode_seq_table(r, &mut ctx.ml_table, SeqPart::MatchLength, (compression_modes >> 2) & 3)?;

        let ll = ctx.ll_table.as_ref().expect("just decoded or reused above");
        let of = ctx.of_table.as_ref().expect("just decoded or reused above");
        let ml = ctx.ml_table.as_ref().expect("just decoded or reused above");
        sequences::decompress_sequences(r, ll, of, ml, n_seq)?
    } else {
        Vec::new()
    };

    sequences::execute_sequences(dst, dst_pos, &literals, &sequences, &mut ctx.prev_offsets, ctx.window_size, &mut ctx.n_bytes_decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let src = [0u8, 0, 0, 0];
        let mut dst = [0u8; 16];
        assert!(decode(&src, &mut dst).is_err());
    }

    #[test]
    fn skips_a_skippable_frame_then_fails_on_no_data() {
        // Skippable frame magic + 0-length body, nothing else follows.
        let mut src = MAGIC_SKIPPABLE_MIN.to_le_bytes().to_vec();
        src.extend_from_slice(&0u32.to_le_bytes());
        let mut dst = [0u8; 16];
        assert_eq!(decode(&src, &mut dst).unwrap(), 0);
    }

    #[test]
    fn single_segment_frame_with_raw_block_round_trips() {
        // Frame descriptor: single_segment=1, frame_content_size_flag=0 (1-byte size).
        // bit0-1 dict=00, bit2 checksum=0, bit3 reserved=0, bit4 unused=0,
        // bit5 single_segment=1, bit6-7 fcs_flag=00 -> byte = 0b00100000 = 0x20.
        let mut src = ZSTD_MAGIC_NUMBER.to_le_bytes().to_vec();
        src.push(0x20);
        src.push(5); // frame_content_size = 5
        // Block header: last=1,type=0(raw),len=5 -> 1 + (0<<1) + (5<<3) = 41 = 0x29,0x00,0x00 (21-bit len, 3 bytes LE across the bitstream).
        // last(1 bit)+type(2 bits)+len(21 bits) = 24 bits = 3 bytes, LSB-first.
        let header: u32 = 1 | (0 << 1) | (5 << 3);
        src.push((header & 0xFF) as u8);
        src.push(((header >> 8) & 0xFF) as u8);
        src.push(((header >> 16) & 0xFF) as u8);
        src.extend_from_slice(b"hello");

        let mut dst = [0u8; 16];
        let n = decode(&src, &mut dst).unwrap();
        assert_eq!(&dst[..n], b"hello");
    }
}
