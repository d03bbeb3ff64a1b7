//! Literals-section decoding: raw, RLE, and Huffman-compressed (1-stream
//! or 4-stream) variants.
//!
//! Ported from `TinyZstdDecompress.c`'s `decode_literals_simple` and
//! `decode_literals_compressed`.

use crate::bitstream::ForwardReader;
use crate::error::{CodecError, Result};
use crate::zstd::huffman::{decode_huf_table, HufDtable};

const MAX_LITERALS_SIZE: usize = 128 * 1024;

/// Decodes a `Raw_Literals_Block` (0) or `RLE_Literals_Block` (1).
pub fn decode_literals_simple(r: &mut ForwardReader, block_type: u8) -> Result<Vec<u8>> {
    let size_format = r.read_bits(2)? as u8;

    let size = match size_format {
        0 | 2 => ((r.read_bits(4)? as usize) << 1) + (size_format >> 1) as usize,
        1 => r.read_bits(12)? as usize,
        _ => r.read_bits(20)? as usize,
    };
    if size > MAX_LITERALS_SIZE {
        return Err(CodecError::Corrupt("literals section exceeds the maximum block size"));
    }

    if block_type == 0 {
        let sub = r.fork_substream(size)?;
        Ok(sub.remaining_bytes()?.to_vec())
    } else {
        let byte = r.read_bits(8)? as u8;
        Ok(vec![byte; size])
    }
}

/// Decodes a Huffman-compressed literals block (type 2, fresh table) or
/// treeless one (type 3, reusing `huf_table`'s existing table).
pub fn decode_literals_compressed(r: &mut ForwardReader, huf_table: &mut Option<HufDtable>, block_type: u8) -> Result<Vec<u8>> {
    let size_format = r.read_bits(2)? as u8;
    let single_stream = size_format == 0;

    let (regenerated_size, compressed_size) = match size_format {
        0 | 1 => (r.read_bits(10)? as usize, r.read_bits(10)? as usize),
        2 => (r.read_bits(14)? as usize, r.read_bits(14)? as usize),
        _ => (r.read_bits(18)? as usize, r.read_bits(18)? as usize),
    };
    if regenerated_size > MAX_LITERALS_SIZE {
        return Err(CodecError::Corrupt("literals section exceeds the maximum block size"));
    }

    let mut huf_stream = r.fork_substream(compressed_size)?;

    if block_type == 2 {
        *huf_table = Some(decode_huf_table(&mut huf_stream)?);
    } else if huf_table.is_none() {
        return Err(CodecError::Corrupt("treeless literals block with no prior huffman table"));
    }
    let table = huf_table.as_ref().expect("checked above");

    let mut out = Vec::with_capacity(regenerated_size);
    table.decompress(&mut huf_stream, single_stream, regenerated_size, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_small_raw_block() {
        // size_format=0 (bits 0-1) then a 4-bit nibble=2 (bits 2-5, LSB-first)
        // -> size=(2<<1)+0=4, then 4 raw bytes.
        let buf = [0x08u8, b'a', b'b', b'c', b'd'];
        let mut r = ForwardReader::new(&buf);
        let out = decode_literals_simple(&mut r, 0).unwrap();
        assert_eq!(out, b"abcd");
    }

    #[test]
    fn decodes_an_rle_block() {
        // size_format=0, nibble=3 -> size=(3<<1)+0=6, then the repeated byte.
        let buf = [0x0Cu8, b'z'];
        let mut r = ForwardReader::new(&buf);
        let out = decode_literals_simple(&mut r, 1).unwrap();
        assert_eq!(out, vec![b'z'; 6]);
    }
}
