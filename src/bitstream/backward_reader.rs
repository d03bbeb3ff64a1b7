use crate::error::{CodecError, Result};

/// Backward bit reader used by Zstandard's FSE and Huffman substreams.
///
/// Scans from the high end of a substream toward its base. The top bit of
/// the final byte is a `1` sentinel marking where the logical bitstream
/// starts; [`BackwardReader::new`] locates it via `highest_set_bit` the
/// same way the format's own decoders do.
///
/// `load` is allowed to read up to 7 bytes before the substream's `base`
/// (those bytes belong to whatever precedes the substream in the full
/// buffer); the invariant the format relies on is that such over-read bits
/// are always discarded by [`ended`](BackwardReader::ended)/[`check_ended`](BackwardReader::check_ended)
/// before ever being consumed by [`read`](BackwardReader::read). Bytes
/// that would fall before the start of the whole buffer are treated as
/// zero, since they too are structurally unreachable once `ended` fires.
pub struct BackwardReader<'a> {
    buf: &'a [u8],
    base: isize,
    smt: u32,
    c: u32,
    p: isize,
    data: u64,
}

fn highest_set_bit(v: u8) -> i32 {
    if v == 0 {
        -1
    } else {
        7 - v.leading_zeros() as i32
    }
}

impl<'a> BackwardReader<'a> {
    /// `base..limit` is the substream's byte range within `buf`.
    /// `n_bits_for_huf_read` is the fixed width used by [`read`](Self::read)
    /// (0 for FSE's variable-width reads, the Huffman table's `max_bits` otherwise).
    pub fn new(buf: &'a [u8], base: usize, limit: usize, n_bits_for_huf_read: u32) -> Result<Self> {
        if limit == 0 || limit > buf.len() || base >= limit {
            return Err(CodecError::Corrupt("empty backward substream"));
        }
        let last = buf[limit - 1];
        let hsb = highest_set_bit(last);
        if hsb < 0 {
            return Err(CodecError::Corrupt("backward stream missing terminator bit"));
        }
        let mut r = BackwardReader {
            buf,
            base: base as isize,
            smt: 64 - n_bits_for_huf_read,
            c: 8 - hsb as u32,
            p: limit as isize - 8,
            data: 0,
        };
        r.load();
        Ok(r)
    }

    fn read_u64_at(&self, p: isize) -> u64 {
        let mut data: u64 = 0;
        for i in 0..8i64 {
            let idx = p + i as isize;
            if idx >= 0 && (idx as usize) < self.buf.len() {
                data |= (self.buf[idx as usize] as u64) << (i * 8);
            }
        }
        data
    }

    /// Refills the 64-bit working register from an 8-byte aligned window.
    pub fn load(&mut self) {
        self.p -= (self.c >> 3) as isize;
        self.c &= 7;
        self.data = self.read_u64_at(self.p) << self.c;
    }

    /// Peeks the next `smt`-complement bits without consuming them.
    pub fn read(&self) -> u64 {
        if self.smt >= 64 {
            0
        } else {
            self.data >> self.smt
        }
    }

    pub fn move_bits(&mut self, n_bits: u32) {
        self.data <<= n_bits;
        self.c += n_bits;
    }

    /// Reads and consumes `n_bits` from the current window, MSB-first.
    pub fn readmove(&mut self, n_bits: u32) -> u64 {
        let res = if n_bits == 0 { 0 } else { self.data >> (64 - n_bits) };
        self.data <<= n_bits;
        self.c += n_bits;
        res
    }

    /// Loads, then reports whether the substream has been fully consumed.
    pub fn load_and_judge_ended(&mut self) -> bool {
        self.load();
        if self.p + 8 < self.base {
            true
        } else if self.p + 8 == self.base {
            self.c > 0
        } else {
            false
        }
    }

    /// Verifies consumption finished exactly at the base with no leftover bits.
    pub fn check_ended(&mut self) -> Result<()> {
        self.load();
        if self.p + 8 != self.base || self.c != 0 {
            return Err(CodecError::Corrupt("backward stream did not end exactly at base"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_substream_ends_immediately() {
        // single-byte substream holding only the sentinel bit.
        let buf = [0u8, 0, 0, 0, 0, 0, 0, 0b0000_0001u8];
        let mut r = BackwardReader::new(&buf, 7, 8, 0).unwrap();
        assert!(r.check_ended().is_ok());
    }

    #[test]
    fn readmove_extracts_payload_bits_below_sentinel() {
        // A = buf[6], B = buf[7] (terminator). B's sentinel sits at bit 3;
        // bits 2..0 below it (1,0,1) are the first 3 payload bits.
        let buf = [0u8, 0, 0, 0, 0, 0, 0xABu8, 0b0000_1101u8];
        let mut r = BackwardReader::new(&buf, 6, 8, 0).unwrap();
        assert_eq!(r.readmove(3), 0b101);
    }

    #[test]
    fn rejects_missing_terminator() {
        let buf = [0u8, 0u8];
        assert!(BackwardReader::new(&buf, 0, 2, 0).is_err());
    }
}
