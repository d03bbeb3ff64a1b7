//! FSE (tANS) decode tables and the two-stream interleaved decode loop used
//! both for sequence decoding and for Huffman weight arrays.
//!
//! Ported from `TinyZstdDecompress.c`'s `FSE_*` family.

use crate::bitstream::BackwardReader;
use crate::bitstream::ForwardReader;
use crate::error::{CodecError, Result};

const FSE_MAX_ACCURACY_LOG: u32 = 15;
const FSE_MAX_SYMBS: usize = 256;

/// A built FSE decoding table: for each of `1 << accuracy_log` states, the
/// symbol it decodes to, how many bits to read to find the next state, and
/// the baseline to add those bits to.
pub struct FseDtable {
    pub symbols: Vec<u8>,
    pub num_bits: Vec<u8>,
    pub new_state_base: Vec<i32>,
    pub accuracy_log: u32,
}

fn highest_set_bit_u32(v: i32) -> i32 {
    31 - v.leading_zeros() as i32
}

impl FseDtable {
    /// Builds a table from normalized frequencies (a `-1` entry is a "less
    /// than 1 probability" symbol) summing to `1 << accuracy_log`.
    pub fn build(norm_freqs: &[i32], accuracy_log: u32) -> Result<Self> {
        if accuracy_log > FSE_MAX_ACCURACY_LOG {
            return Err(CodecError::Corrupt("fse accuracy log too large"));
        }
        if norm_freqs.len() > FSE_MAX_SYMBS {
            return Err(CodecError::Corrupt("too many fse symbols"));
        }

        let size = 1usize << accuracy_log;
        let mut symbols = vec![0u8; size];
        let mut num_bits = vec![0u8; size];
        let mut new_state_base = vec![0i32; size];
        let mut state_desc = vec![0i32; norm_freqs.len()];

        let mut high_threshold = size;
        for (s, &freq) in norm_freqs.iter().enumerate() {
            if freq == -1 {
                high_threshold -= 1;
                symbols[high_threshold] = s as u8;
                state_desc[s] = 1;
            }
        }

        let step = (size >> 1) + (size >> 3) + 3;
        let mask = size - 1;
        let mut pos = 0usize;
        for (s, &freq) in norm_freqs.iter().enumerate() {
            if freq <= 0 {
                continue;
            }
            state_desc[s] = freq;
            for _ in 0..freq {
                symbols[pos] = s as u8;
                loop {
                    pos = (pos + step) & mask;
                    if pos < high_threshold {
                        break;
                    }
                }
            }
        }
        if pos != 0 {
            return Err(CodecError::Corrupt("fse table did not tile exactly"));
        }

        for i in 0..size {
            let symbol = symbols[i] as usize;
            let next_state_desc = state_desc[symbol];
            state_desc[symbol] += 1;
            let nb = accuracy_log as i32 - highest_set_bit_u32(next_state_desc);
            num_bits[i] = nb as u8;
            new_state_base[i] = (next_state_desc << nb) - size as i32;
        }

        Ok(FseDtable { symbols, num_bits, new_state_base, accuracy_log })
    }

    /// A degenerate table that always decodes to `symb` and never consumes
    /// a bit ("RLE_Mode" for a sequence part).
    pub fn build_rle(symb: u8) -> Self {
        FseDtable { symbols: vec![symb], num_bits: vec![0], new_state_base: vec![0], accuracy_log: 0 }
    }

    /// Reads a normalized-frequency header (`FSE_decode_header`) and builds
    /// the table from it.
    pub fn decode_header(r: &mut ForwardReader, max_accuracy_log: u32) -> Result<Self> {
        let accuracy_log = 5 + r.read_bits(4)? as u32;
        if accuracy_log > max_accuracy_log {
            return Err(CodecError::Corrupt("fse accuracy log exceeds this field's maximum"));
        }

        let mut remaining: i32 = 1 + (1i32 << accuracy_log);
        let mut frequencies = Vec::with_capacity(64);

        while remaining > 1 && frequencies.len() < FSE_MAX_SYMBS {
            let bits = highest_set_bit_u32(remaining) as u32;
            let mut val = r.read_bits(bits)? as i32;
            let thresh = (1i32 << (bits + 1)) - 1 - remaining;
            if val >= thresh {
                if r.read_bits(1)? != 0 {
                    val |= 1 << bits;
                    val -= thresh;
                }
            }

            let proba = val - 1;
            remaining -= proba.abs();
            frequencies.push(proba);

            if proba == 0 {
                let mut repeat = r.read_bits(2)? as i32;
                loop {
                    for _ in 0..repeat {
                        if frequencies.len() >= FSE_MAX_SYMBS {
                            break;
                        }
                        frequencies.push(0);
                    }
                    if repeat == 3 {
                        repeat = r.read_bits(2)? as i32;
                    } else {
                        break;
                    }
                }
            }
        }

        r.align();

        if remaining != 1 || frequencies.len() >= FSE_MAX_SYMBS {
            return Err(CodecError::Corrupt("fse distribution did not sum to the accuracy log"));
        }

        FseDtable::build(&frequencies, accuracy_log)
    }

    /// Decodes a two-state interleaved FSE stream (used for Huffman weight
    /// arrays), writing decoded symbols to `out` and returning how many were
    /// produced.
    pub fn decompress_interleaved2(&self, buf: &[u8], out: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Err(CodecError::Corrupt("empty fse stream"));
        }
        let mut r = BackwardReader::new(buf, 0, buf.len(), 0)?;
        let mut state1 = r.readmove(self.accuracy_log) as usize;
        r.load();
        let mut state2 = r.readmove(self.accuracy_log) as usize;
        r.load();

        let mut n = 0usize;
        loop {
            *out.get_mut(n).ok_or(CodecError::DstOverflow)? = self.symbols[state1];
            n += 1;
            let nb = self.num_bits[state1] as u32;
            let add = r.readmove(nb) as i32;
            state1 = (self.new_state_base[state1] + add) as usize;
            if r.load_and_judge_ended() {
                *out.get_mut(n).ok_or(CodecError::DstOverflow)? = self.symbols[state2];
                return Ok(n + 1);
            }

            *out.get_mut(n).ok_or(CodecError::DstOverflow)? = self.symbols[state2];
            n += 1;
            let nb = self.num_bits[state2] as u32;
            let add = r.readmove(nb) as i32;
            state2 = (self.new_state_base[state2] + add) as usize;
            if r.load_and_judge_ended() {
                *out.get_mut(n).ok_or(CodecError::DstOverflow)? = self.symbols[state1];
                return Ok(n + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_table_always_decodes_same_symbol() {
        let t = FseDtable::build_rle(7);
        assert_eq!(t.symbols[0], 7);
        assert_eq!(t.num_bits[0], 0);
        assert_eq!(t.new_state_base[0], 0);
    }

    #[test]
    fn build_rejects_oversized_accuracy_log() {
        assert!(FseDtable::build(&[1], 16).is_err());
    }

    #[test]
    fn build_tiles_a_small_uniform_distribution() {
        // accuracy_log = 2 (size 4), two symbols each with frequency 2.
        let t = FseDtable::build(&[2, 2], 2).unwrap();
        assert_eq!(t.symbols.len(), 4);
        let count0 = t.symbols.iter().filter(|&&s| s == 0).count();
        let count1 = t.symbols.iter().filter(|&&s| s == 1).count();
        assert_eq!(count0, 2);
        assert_eq!(count1, 2);
    }
}
