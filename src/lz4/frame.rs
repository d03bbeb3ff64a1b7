//! LZ4 frame container: magic-number dispatch across modern, legacy, and
//! skippable frames, one or more of which may be concatenated in `src`.
//!
//! Ported from `lz4C`/`lz4D` (`original_source/lz4C.c`, `lz4D.c`).

use super::block::{compress_block, decompress_block};
use crate::error::{CodecError, Result};

const MAGIC_LZ4LEGACY: u64 = 0x184C_2102;
const MAGIC_LZ4FRAME: u64 = 0x184D_2204;
const MAGIC_SKIPFRAME_MIN: u64 = 0x184D_2A50;
const MAGIC_SKIPFRAME_MAX: u64 = 0x184D_2A5F;

/// Largest number of source bytes compressed into a single block; inputs
/// larger than this are split across several blocks within one frame.
const MAX_COMPRESSED_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Encoder's fixed frame descriptor: version 1, block-max-size index 7
/// (4 MiB nominal; this crate's actual per-block cap is
/// [`MAX_COMPRESSED_BLOCK_SIZE`]), no content size, no checksums.
const ENCODER_PROLOGUE: [u8; 7] = [0x04, 0x22, 0x4D, 0x18, 0x60, 0x70, 0x73];

fn write_bytes(dst: &mut [u8], pos: &mut usize, bytes: &[u8]) -> Result<()> {
    if bytes.len() > dst.len() - *pos {
        return Err(CodecError::DstOverflow);
    }
    dst[*pos..*pos + bytes.len()].copy_from_slice(bytes);
    *pos += bytes.len();
    Ok(())
}

fn compress_or_copy_block_with_csize(src: &[u8], dst: &mut [u8], pos: &mut usize) -> Result<()> {
    if dst.len() - *pos < 4 {
        return Err(CodecError::DstOverflow);
    }
    let size_field_pos = *pos;
    *pos += 4;
    let dst_base = *pos;

    let csize: u32 = if src.len() <= 13 {
        write_bytes(dst, pos, src)?;
        (src.len() as u32) | 0x8000_0000
    } else {
        let compressed_len = compress_block(src, &mut dst[*pos..])?;
        if src.len() > compressed_len {
            *pos += compressed_len;
            compressed_len as u32
        } else {
            *pos = dst_base;
            write_bytes(dst, pos, src)?;
            (src.len() as u32) | 0x8000_0000
        }
    };
    dst[size_field_pos..size_field_pos + 4].copy_from_slice(&csize.to_le_bytes());
    Ok(())
}

/// Encodes `src` as a single modern LZ4 frame, returning bytes written.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut pos = 0usize;
    write_bytes(dst, &mut pos, &ENCODER_PROLOGUE)?;

    let mut i = 0usize;
    while i < src.len() {
        let end = (i + MAX_COMPRESSED_BLOCK_SIZE).min(src.len());
        log::debug!("lz4: encoding block [{i}, {end})");
        compress_or_copy_block_with_csize(&src[i..end], dst, &mut pos)?;
        i = end;
    }
    write_bytes(dst, &mut pos, &[0, 0, 0, 0])?;
    Ok(pos)
}

fn read_le(src: &[u8], pos: &mut usize, n: usize) -> Result<u64> {
    if n > src.len() - *pos {
        return Err(CodecError::SrcOverflow);
    }
    let mut v = 0u64;
    for i in 0..n {
        v += (src[*pos + i] as u64) << (i * 8);
    }
    *pos += n;
    Ok(v)
}

fn skip(src: &[u8], pos: &mut usize, n: usize) -> Result<()> {
    if n > src.len() - *pos {
        return Err(CodecError::SrcOverflow);
    }
    *pos += n;
    Ok(())
}

fn decompress_blocks_until_endmark(src: &[u8], src_pos: &mut usize, dst: &mut [u8], dst_pos: &mut usize, block_checksum_flag: bool) -> Result<()> {
    let mut block_csize = read_le(src, src_pos, 4)?;
    while block_csize != 0 {
        if block_csize < 0x8000_0000 {
            decompress_block(src, src_pos, dst, dst_pos, block_csize as usize)?;
        } else {
            let n = (block_csize - 0x8000_0000) as usize;
            if n > src.len() - *src_pos {
                return Err(CodecError::SrcOverflow);
            }
            if n > dst.len() - *dst_pos {
                return Err(CodecError::DstOverflow);
            }
            dst[*dst_pos..*dst_pos + n].copy_from_slice(&src[*src_pos..*src_pos + n]);
            *src_pos += n;
            *dst_pos += n;
        }
        if block_checksum_flag {
            skip(src, src_pos, 4)?;
        }
        block_csize = read_le(src, src_pos, 4)?;
    }
    Ok(())
}

fn decompress_blocks_legacy(src: &[u8], src_pos: &mut usize, dst: &mut [u8], dst_pos: &mut usize) -> Result<()> {
    while *src_pos != src.len() {
        let block_csize = read_le(src, src_pos, 4)?;
        if block_csize == MAGIC_LZ4LEGACY
            || block_csize == MAGIC_LZ4FRAME
            || (MAGIC_SKIPFRAME_MIN..=MAGIC_SKIPFRAME_MAX).contains(&block_csize)
        {
            *src_pos -= 4;
            break;
        }
        decompress_block(src, src_pos, dst, dst_pos, block_csize as usize)?;
    }
    Ok(())
}

struct FrameDescriptor {
    block_checksum_flag: bool,
    content_checksum_flag: bool,
    content_size_flag: bool,
    content_size: u64,
}

fn parse_frame_descriptor(src: &[u8], pos: &mut usize) -> Result<FrameDescriptor> {
    let bd_flg = read_le(src, pos, 2)?;
    if bd_flg & 1 != 0 {
        log::warn!("lz4: dictionary flag set, unsupported");
        return Err(CodecError::Unsupported("lz4 frame dictionary"));
    }
    if (bd_flg >> 1) & 1 != 0 {
        return Err(CodecError::Unsupported("lz4 frame reserved bit 1 set"));
    }
    let content_checksum_flag = (bd_flg >> 2) & 1 != 0;
    let content_size_flag = (bd_flg >> 3) & 1 != 0;
    let block_checksum_flag = (bd_flg >> 4) & 1 != 0;
    if (bd_flg >> 6) & 3 != 1 {
        return Err(CodecError::Unsupported("lz4 frame version must be 1"));
    }
    if (bd_flg >> 8) & 0xF != 0 {
        return Err(CodecError::Unsupported("lz4 frame reserved bits [8..12) set"));
    }
    if (bd_flg >> 12) & 7 < 4 {
        return Err(CodecError::Unsupported("lz4 frame block max-size below 4"));
    }
    if (bd_flg >> 15) & 1 != 0 {
        return Err(CodecError::Unsupported("lz4 frame reserved bit 15 set"));
    }

    let content_size = if content_size_flag { read_le(src, pos, 8)? } else { 0 };
    skip(src, pos, 1)?; // header checksum byte, not verified

    Ok(FrameDescriptor { block_checksum_flag, content_checksum_flag, content_size_flag, content_size })
}

/// Decodes one frame starting at `src[*src_pos..]`, advancing both cursors
/// past it. Dispatches on the 4-byte magic at the current position.
fn decode_frame(src: &[u8], src_pos: &mut usize, dst: &mut [u8], dst_pos: &mut usize) -> Result<()> {
    let magic = read_le(src, src_pos, 4)?;
    if magic == MAGIC_LZ4LEGACY {
        log::trace!("lz4: legacy frame");
        decompress_blocks_legacy(src, src_pos, dst, dst_pos)?;
    } else if magic == MAGIC_LZ4FRAME {
        log::trace!("lz4: modern frame");
        let dst_base = *dst_pos;
        let fd = parse_frame_descriptor(src, src_pos)?;
        decompress_blocks_until_endmark(src, src_pos, dst, dst_pos, fd.block_checksum_flag)?;
        if fd.content_checksum_flag {
            skip(src, src_pos, 4)?; // content checksum, not verified
        }
        if fd.content_size_flag && (*dst_pos - dst_base) as u64 != fd.content_size {
            log::warn!("lz4: decoded length disagrees with declared content size");
            return Err(CodecError::Corrupt("lz4 content size mismatch"));
        }
    } else if (MAGIC_SKIPFRAME_MIN..=MAGIC_SKIPFRAME_MAX).contains(&magic) {
        let skip_len = read_le(src, src_pos, 4)? as usize;
        skip(src, src_pos, skip_len)?;
    } else {
        log::warn!("lz4: unrecognized frame magic {magic:#010x}");
        return Err(CodecError::Unsupported("not an lz4 frame"));
    }
    Ok(())
}

/// Decodes every frame concatenated in `src` (modern, legacy, or
/// skippable), returning total bytes written to `dst`.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut src_pos = 0usize;
    let mut dst_pos = 0usize;
    while src_pos < src.len() {
        decode_frame(src, &mut src_pos, dst, &mut dst_pos)?;
    }
    Ok(dst_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(src: &[u8]) {
        let mut dst = vec![0u8; src.len() * 2 + 256];
        let n = encode(src, &mut dst).unwrap();
        assert_eq!(&dst[..7], &ENCODER_PROLOGUE);

        let mut out = vec![0u8; src.len() + 32];
        let decoded_len = decode(&dst[..n], &mut out).unwrap();
        assert_eq!(&out[..decoded_len], src);
    }

    #[test]
    fn empty_frame_round_trips() {
        roundtrip(b"");
    }

    #[test]
    fn repetitive_input_compresses_small_and_round_trips() {
        let src = vec![0u8; 10_000];
        let mut dst = vec![0u8; 20_000];
        let n = encode(&src, &mut dst).unwrap();
        assert!(n < 100, "expected < 100 bytes, got {n}");
        let mut out = vec![0u8; src.len() + 32];
        let decoded_len = decode(&dst[..n], &mut out).unwrap();
        assert_eq!(&out[..decoded_len], &src[..]);
    }

    #[test]
    fn concatenated_frames_both_decode() {
        let mut dst1 = vec![0u8; 64];
        let n1 = encode(b"hello", &mut dst1).unwrap();
        let mut dst2 = vec![0u8; 64];
        let n2 = encode(b"world", &mut dst2).unwrap();

        let mut combined = dst1[..n1].to_vec();
        combined.extend_from_slice(&dst2[..n2]);

        let mut out = vec![0u8; 32];
        let decoded_len = decode(&combined, &mut out).unwrap();
        assert_eq!(&out[..decoded_len], b"helloworld");
    }

    #[test]
    fn skippable_frame_is_skipped() {
        let mut buf = vec![];
        buf.extend_from_slice(&(MAGIC_SKIPFRAME_MIN as u32).to_le_bytes());
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(&[1, 2, 3, 4]);
        let mut dst = vec![0u8; 64];
        let n = encode(b"hi", &mut dst).unwrap();
        buf.extend_from_slice(&dst[..n]);

        let mut out = vec![0u8; 16];
        let decoded_len = decode(&buf, &mut out).unwrap();
        assert_eq!(&out[..decoded_len], b"hi");
    }

    #[test]
    fn content_size_mismatch_is_corrupt() {
        // Hand-built minimal frame: descriptor declares content_size_flag
        // with a value that disagrees with the 2-byte literal-only block
        // that follows.
        let mut buf = vec![];
        buf.extend_from_slice(&(MAGIC_LZ4FRAME as u32).to_le_bytes());
        let bd_flg: u16 = (1 << 3) | (1 << 6) | (4 << 12); // content_size_flag, version=1, block-max=4
        buf.extend_from_slice(&bd_flg.to_le_bytes());
        buf.extend_from_slice(&999u64.to_le_bytes()); // wrong content size
        buf.push(0); // header checksum byte, unchecked
        buf.extend_from_slice(&3u32.to_le_bytes()); // block compressed size
        buf.extend_from_slice(&[0x20, b'h', b'i']); // token ll=2 ml=0, literals "hi"
        buf.extend_from_slice(&[0, 0, 0, 0]); // end marker

        let mut out = vec![0u8; 16];
        assert_eq!(decode(&buf, &mut out), Err(CodecError::Corrupt("lz4 content size mismatch")));
    }
}
