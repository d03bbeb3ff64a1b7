//! Huffman decode table construction and the 1-stream/4-stream decode
//! loops used for Huffman-compressed literal sections.
//!
//! Ported from `TinyZstdDecompress.c`'s `HUF_*` family.

use crate::bitstream::BackwardReader;
use crate::bitstream::ForwardReader;
use crate::error::{CodecError, Result};
use crate::zstd::fse::FseDtable;

const HUF_MAX_BITS: u32 = 16;
const HUF_MAX_SYMBS: usize = 256;

/// A canonical Huffman decode table, flattened to `1 << max_bits` entries
/// so a lookup is a single bit-window index.
pub struct HufDtable {
    pub symbols: Vec<u8>,
    pub num_bits: Vec<u8>,
    pub max_bits: u32,
}

impl HufDtable {
    /// Builds a canonical-Huffman table from each symbol's code length
    /// (`bits[i]`, 0 meaning "absent").
    pub fn build(bits: &[u8]) -> Result<Self> {
        if bits.len() > HUF_MAX_SYMBS {
            return Err(CodecError::Corrupt("too many huffman symbols"));
        }

        let mut rank_count = [0i32; HUF_MAX_BITS as usize + 1];
        let mut max_bits = 0u32;
        for &b in bits {
            if b as u32 > HUF_MAX_BITS {
                return Err(CodecError::Corrupt("huffman code too deep"));
            }
            rank_count[b as usize] += 1;
            max_bits = max_bits.max(b as u32);
        }

        let size = 1usize << max_bits;
        let mut symbols = vec![0u8; size];
        let mut num_bits = vec![0u8; size];

        let mut rank_idx = [0u64; HUF_MAX_BITS as usize + 2];
        rank_idx[max_bits as usize] = 0;
        for i in (1..=max_bits as usize).rev() {
            rank_idx[i - 1] = rank_idx[i] + rank_count[i] as u64 * (1u64 << (max_bits as usize - i));
            let start = rank_idx[i] as usize;
            let end = rank_idx[i - 1] as usize;
            for slot in num_bits.iter_mut().take(end).skip(start) {
                *slot = i as u8;
            }
        }
        if rank_idx[0] != size as u64 {
            return Err(CodecError::Corrupt("huffman code lengths did not tile the table"));
        }

        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                let code = rank_idx[b as usize] as usize;
                let len = 1usize << (max_bits - b as u32);
                for slot in symbols.iter_mut().skip(code).take(len) {
                    *slot = i as u8;
                }
                rank_idx[b as usize] += len as u64;
            }
        }

        Ok(HufDtable { symbols, num_bits, max_bits })
    }

    /// Decodes one backward-ordered Huffman substream, appending symbols to
    /// `out` until the stream is exhausted.
    fn decompress_1stream(&self, buf: &[u8], out: &mut Vec<u8>) -> Result<()> {
        if buf.is_empty() {
            return Err(CodecError::Corrupt("empty huffman stream"));
        }
        let mut r = BackwardReader::new(buf, 0, buf.len(), self.max_bits)?;
        loop {
            let idx = r.read() as usize;
            out.push(self.symbols[idx]);
            let nb = self.num_bits[idx] as u32;
            r.move_bits(nb);
            if r.load_and_judge_ended() {
                break;
            }
        }
        r.check_ended()
    }

    /// Decodes the 4-stream variant: a 6-byte header of three 16-bit
    /// compressed sizes, the fourth stream's size implied by what's left.
    fn decompress_4stream(&self, r: &mut ForwardReader, out: &mut Vec<u8>) -> Result<()> {
        let csize1 = r.read_bits(16)? as usize;
        let csize2 = r.read_bits(16)? as usize;
        let csize3 = r.read_bits(16)? as usize;

        let s1 = r.fork_substream(csize1)?;
        let s2 = r.fork_substream(csize2)?;
        let s3 = r.fork_substream(csize3)?;
        let csize4 = r.remaining_len()?;
        let s4 = r.fork_substream(csize4)?;

        self.decompress_1stream(s1.remaining_bytes()?, out)?;
        self.decompress_1stream(s2.remaining_bytes()?, out)?;
        self.decompress_1stream(s3.remaining_bytes()?, out)?;
        self.decompress_1stream(s4.remaining_bytes()?, out)
    }

    /// Decodes either variant depending on `single_stream`, writing exactly
    /// `regenerated_size` bytes.
    pub fn decompress(&self, r: &mut ForwardReader, single_stream: bool, regenerated_size: usize, out: &mut Vec<u8>) -> Result<()> {
        if single_stream {
            let bytes = r.remaining_bytes()?;
            self.decompress_1stream(bytes, out)?;
        } else {
            self.decompress_4stream(r, out)?;
        }
        if out.len() != regenerated_size {
            return Err(CodecError::Corrupt("huffman output length did not match the declared size"));
        }
        Ok(())
    }
}

/// Derives the code-length array from a transmitted weight array: the last
/// weight isn't transmitted, so it's inferred from the requirement that
/// `sum(2^(weight-1)) == 2^max_bits`.
fn convert_huf_weights_to_bits(weights: &[u8]) -> Result<Vec<u8>> {
    if weights.len() + 1 > HUF_MAX_SYMBS {
        return Err(CodecError::Corrupt("too many huffman weights"));
    }

    let mut weight_sum: u64 = 0;
    for &w in weights {
        if w as u32 > HUF_MAX_BITS {
            return Err(CodecError::Corrupt("huffman weight out of range"));
        }
        if w > 0 {
            weight_sum += 1u64 << (w - 1);
        }
    }

    let max_bits = 63 - weight_sum.leading_zeros() as i32 + 1;
    let left_over = (1u64 << max_bits) - weight_sum;
    if left_over & (left_over.wrapping_sub(1)) != 0 {
        return Err(CodecError::Corrupt("huffman weights did not sum to a power of two"));
    }
    let last_weight = (63 - left_over.leading_zeros() as i32) + 1;

    let mut bits = Vec::with_capacity(weights.len() + 1);
    for &w in weights {
        bits.push(if w > 0 { (max_bits + 1 - w as i32) as u8 } else { 0 });
    }
    bits.push((max_bits + 1 - last_weight) as u8);
    Ok(bits)
}

/// Decodes a Huffman table description: a single header byte selects a
/// direct 4-bit-per-weight array (`>= 128`) or an FSE-compressed one.
pub fn decode_huf_table(r: &mut ForwardReader) -> Result<HufDtable> {
    let hbyte = r.read_bits(8)? as u8;

    let weights: Vec<u8> = if hbyte >= 128 {
        let num_symbs = (hbyte - 127) as usize;
        let src = r.fork_substream((num_symbs + 1) / 2)?;
        let src = src.remaining_bytes()?;
        (0..num_symbs)
            .map(|i| if i % 2 == 0 { src[i / 2] >> 4 } else { src[i / 2] & 0xF })
            .collect()
    } else {
        let fse_sub = r.fork_substream(hbyte as usize)?;
        let mut fse_r = fse_sub;
        let dtable = FseDtable::decode_header(&mut fse_r, 7)?;
        let tail = fse_r.remaining_bytes()?;
        let mut weights = vec![0u8; HUF_MAX_SYMBS];
        let n = dtable.decompress_interleaved2(tail, &mut weights)?;
        weights.truncate(n);
        weights
    };

    let bits = convert_huf_weights_to_bits(&weights)?;
    HufDtable::build(&bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_two_symbol_table() {
        // Symbol 0 gets a 1-bit code, symbol 1 gets a 1-bit code (max_bits=1).
        let t = HufDtable::build(&[1, 1]).unwrap();
        assert_eq!(t.max_bits, 1);
        assert_eq!(t.symbols.len(), 2);
    }

    #[test]
    fn rejects_mistiled_lengths() {
        // A single symbol at depth 2 only covers half the table.
        assert!(HufDtable::build(&[2]).is_err());
    }

    #[test]
    fn converts_weights_with_inferred_last_weight() {
        // Two transmitted weights of 1 sum to mass 2; the next power of two
        // is 4, so max_bits=2 and the untransmitted last weight is 2.
        let bits = convert_huf_weights_to_bits(&[1, 1]).unwrap();
        assert_eq!(bits, vec![2, 2, 1]);
    }
}
