use super::{BIT_MODEL_TOTAL, MOVE_BITS, N_BIT_MODEL_TOTAL_BITS, NORMALIZE_THRESHOLD};
use crate::error::{CodecError, Result};

/// Binary range encoder writing into a caller-owned destination slice.
///
/// Tracks a 33-bit conceptual `low` as a 1-bit `low_msb` plus a 32-bit
/// `low_lsb`, which keeps every intermediate value inside a `u32` and
/// avoids needing a 64-bit accumulator. Carries are propagated lazily
/// through `cache`/`cache_size`: a pending run of bytes is held back
/// until it's known whether the next shift-out produces a carry.
pub struct RangeEncoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
    low_msb: u8,
    low_lsb: u32,
    range: u32,
    cache: u8,
    cache_size: u64,
}

impl<'a> RangeEncoder<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        RangeEncoder {
            buf,
            pos: 0,
            low_msb: 0,
            low_lsb: 0,
            range: 0xFFFF_FFFF,
            cache: 0,
            cache_size: 1,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.pos
    }

    fn out_byte(&mut self, b: u8) -> Result<()> {
        let dst = self.buf.get_mut(self.pos).ok_or(CodecError::DstOverflow)?;
        *dst = b;
        self.pos += 1;
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        if self.range < NORMALIZE_THRESHOLD {
            if self.low_msb != 0 {
                // low >= 1<<32: the pending cache byte (and every 0xFF behind it) carries.
                self.out_byte(self.cache.wrapping_add(1))?;
                for _ in 1..self.cache_size {
                    self.out_byte(0x00)?;
                }
                self.cache = (self.low_lsb >> 24) as u8;
                self.cache_size = 0;
            } else if self.low_lsb < 0xFF00_0000 {
                // low < (1<<32) - (1<<24): no carry possible, flush the pending run as-is.
                self.out_byte(self.cache)?;
                for _ in 1..self.cache_size {
                    self.out_byte(0xFF)?;
                }
                self.cache = (self.low_lsb >> 24) as u8;
                self.cache_size = 0;
            }
            // else: carry still undecidable (0xFF000000 <= low < 1<<32); hold the run open.
            self.cache_size += 1;
            self.low_msb = 0;
            self.low_lsb <<= 8;
            self.range <<= 8;
        }
        Ok(())
    }

    /// Flushes the coder: forces `range` to 0 and normalizes 6 times, which
    /// drains `cache_size` pending bytes regardless of their count.
    pub fn terminate(&mut self) -> Result<()> {
        self.range = 0;
        for _ in 0..6 {
            self.normalize()?;
        }
        Ok(())
    }

    /// Encodes `bit_count` bits of `val` assuming a fixed 50/50 probability.
    pub fn encode_int_by_fixed_prob(&mut self, val: u32, bit_count: u32) -> Result<()> {
        for i in (0..bit_count).rev() {
            self.normalize()?;
            self.range >>= 1;
            let bit = (val >> i) & 1;
            if bit != 0 {
                let (sum, carry) = self.low_lsb.overflowing_add(self.range);
                self.low_lsb = sum;
                if carry {
                    self.low_msb = 1;
                }
            }
        }
        Ok(())
    }

    /// Encodes one bit under an adaptively updated probability.
    pub fn encode_bit(&mut self, prob: &mut u16, bit: u32) -> Result<()> {
        self.normalize()?;
        let bound = (self.range >> N_BIT_MODEL_TOTAL_BITS) * (*prob as u32);
        if bit == 0 {
            self.range = bound;
            *prob = (*prob as u32 + ((BIT_MODEL_TOTAL - *prob as u32) >> MOVE_BITS)) as u16;
        } else {
            self.range -= bound;
            let (sum, carry) = self.low_lsb.overflowing_add(bound);
            self.low_lsb = sum;
            if carry {
                self.low_msb = 1;
            }
            *prob = (*prob as u32 - (*prob as u32 >> MOVE_BITS)) as u16;
        }
        Ok(())
    }

    /// Tree-codes `val`'s low `bit_count` bits MSB-first through `probs`,
    /// walking a binary tree of probability slots rooted at `probs[0]`.
    pub fn encode_int(&mut self, probs: &mut [u16], val: u32, bit_count: u32) -> Result<()> {
        let mut treepos: u32 = 1;
        for i in (0..bit_count).rev() {
            let bit = (val >> i) & 1;
            self.encode_bit(&mut probs[(treepos - 1) as usize], bit)?;
            treepos = (treepos << 1) | bit;
        }
        Ok(())
    }

    /// Encodes an 8-bit literal against the byte at the current match
    /// offset, used by LZMA right after a match/rep when the previous
    /// output byte at `distance` is known (`matched_byte`).
    ///
    /// Mirrors `rangeEncodeMB`: for each bit, the candidate bit from
    /// `matched_byte` selects one of two probability sub-trees (`off0`
    /// tracks whether the match byte is still "in agreement"; `off1`
    /// tracks the literal tree's own top bit), falling back to the plain
    /// literal tree once they diverge.
    pub fn encode_matched_byte(
        &mut self,
        probs: &mut [u16],
        mut byte: u32,
        mut matched_byte: u32,
    ) -> Result<()> {
        let mut treepos: u32 = 1;
        let mut off0: u32 = 0x100;
        for _ in 0..8 {
            let bit = (byte >> 7) & 1;
            byte <<= 1;
            matched_byte <<= 1;
            let off1 = off0;
            off0 &= matched_byte;
            let idx = (off0 + off1 + treepos - 1) as usize;
            self.encode_bit(&mut probs[idx], bit)?;
            treepos <<= 1;
            if bit != 0 {
                treepos |= 1;
            } else {
                off0 ^= off1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rangecoder::{RangeDecoder, PROB_INIT};

    #[test]
    fn fixed_prob_round_trips() {
        let mut buf = [0u8; 64];
        let mut e = RangeEncoder::new(&mut buf);
        e.encode_int_by_fixed_prob(0x2C9, 10).unwrap();
        e.terminate().unwrap();
        let n = e.bytes_written();

        let mut d = RangeDecoder::new(&buf[..n]);
        assert_eq!(d.decode_int_by_fixed_prob(10).unwrap(), 0x2C9);
    }

    #[test]
    fn adaptive_bit_round_trips() {
        let mut buf = [0u8; 64];
        let bits = [0u32, 1, 1, 0, 1, 0, 0, 0, 1, 1];
        let mut e = RangeEncoder::new(&mut buf);
        let mut eprob = PROB_INIT;
        for &b in &bits {
            e.encode_bit(&mut eprob, b).unwrap();
        }
        e.terminate().unwrap();
        let n = e.bytes_written();

        let mut d = RangeDecoder::new(&buf[..n]);
        let mut dprob = PROB_INIT;
        for &b in &bits {
            assert_eq!(d.decode_bit(&mut dprob).unwrap(), b);
        }
    }

    #[test]
    fn overflow_is_reported() {
        let mut buf = [0u8; 1];
        let mut e = RangeEncoder::new(&mut buf);
        for _ in 0..64 {
            e.encode_int_by_fixed_prob(1, 1).unwrap();
        }
        assert_eq!(e.terminate(), Err(CodecError::DstOverflow));
    }
}
