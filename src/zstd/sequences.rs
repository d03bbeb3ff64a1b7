//! Sequence-table decoding and sequence execution (the match/literal
//! copy loop that turns a compressed block's symbols into output bytes).
//!
//! Ported from `TinyZstdDecompress.c`'s `decode_seq_table`,
//! `decompress_sequences`, `parse_offset`, and `execute_sequences`.

use crate::bitstream::BackwardReader;
use crate::bitstream::ForwardReader;
use crate::error::{CodecError, Result};
use crate::zstd::fse::FseDtable;

const MAX_CODE_LIT_LEN: u8 = 35;
const MAX_CODE_MAT_LEN: u8 = 52;

const SEQ_LITERAL_LENGTH_DEFAULT_DIST: [i32; 36] = [
    4, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 2, 1, 1, 1, 1, 1, -1, -1, -1, -1,
];
const SEQ_OFFSET_DEFAULT_DIST: [i32; 29] = [
    1, 1, 1, 1, 1, 1, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1,
];
const SEQ_MATCH_LENGTH_DEFAULT_DIST: [i32; 53] = [
    1, 4, 3, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1, -1,
];

const SEQ_LITERAL_LENGTH_BASELINES: [u64; 36] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 20, 22, 24, 28, 32, 40, 48, 64, 128, 256, 512,
    1024, 2048, 4096, 8192, 16384, 32768, 65536,
];
const SEQ_LITERAL_LENGTH_EXTRA_BITS: [u32; 36] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 3, 3, 4, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
];

const SEQ_MATCH_LENGTH_BASELINES: [u64; 53] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32,
    33, 34, 35, 37, 39, 41, 43, 47, 51, 59, 67, 83, 99, 131, 259, 515, 1027, 2051, 4099, 8195, 16387, 32771, 65539,
];
const SEQ_MATCH_LENGTH_EXTRA_BITS: [u32; 53] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2,
    3, 3, 4, 4, 5, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
];

/// Which of the three sequence parts a table belongs to, selecting its
/// predefined distribution and maximum FSE accuracy.
#[derive(Clone, Copy)]
pub enum SeqPart {
    LiteralLength,
    Offset,
    MatchLength,
}

impl SeqPart {
    fn predefined(self) -> (&'static [i32], u32) {
        match self {
            SeqPart::LiteralLength => (&SEQ_LITERAL_LENGTH_DEFAULT_DIST, 6),
            SeqPart::Offset => (&SEQ_OFFSET_DEFAULT_DIST, 5),
            SeqPart::MatchLength => (&SEQ_MATCH_LENGTH_DEFAULT_DIST, 6),
        }
    }

    fn max_accuracy_log(self) -> u32 {
        match self {
            SeqPart::LiteralLength => 9,
            SeqPart::Offset => 8,
            SeqPart::MatchLength => 9,
        }
    }
}

/// Builds or reuses one of the three sequence FSE tables according to its
/// 2-bit compression mode (`0`=predefined, `1`=RLE, `2`=FSE-compressed,
/// `3`=repeat the table already in `table`).
pub fn decode_seq_table(r: &mut ForwardReader, table: &mut Option<FseDtable>, part: SeqPart, mode: u8) -> Result<()> {
    match mode {
        0 => {
            let (dist, acc) = part.predefined();
            *table = Some(FseDtable::build(dist, acc)?);
        }
        1 => {
            let symb = r.read_bits(8)? as u8;
            *table = Some(FseDtable::build_rle(symb));
        }
        2 => {
            *table = Some(FseDtable::decode_header(r, part.max_accuracy_log())?);
        }
        _ => {
            if table.is_none() {
                return Err(CodecError::Corrupt("sequence table repeat mode with no prior table"));
            }
        }
    }
    Ok(())
}

/// One decoded `(literal_length, match_length, offset)` triple, still in
/// raw/code form pending `parse_offset`'s repeat-offset resolution.
pub struct Sequence {
    pub lit_len: u64,
    pub mat_len: u64,
    pub offset: u64,
}

/// Decodes `n_seq` sequences from the remainder of `r` (after its
/// compression-modes byte has already selected `ll`/`of`/`ml`), via the
/// three interleaved FSE states.
pub fn decompress_sequences(
    r: &mut ForwardReader,
    ll: &FseDtable,
    of: &FseDtable,
    ml: &FseDtable,
    n_seq: usize,
) -> Result<Vec<Sequence>> {
    let tail = r.remaining_bytes()?;
    let mut br = BackwardReader::new(tail, 0, tail.len(), 0)?;

    let mut ll_state = br.readmove(ll.accuracy_log) as usize;
    br.load();
    let mut of_state = br.readmove(of.accuracy_log) as usize;
    br.load();
    let mut ml_state = br.readmove(ml.accuracy_log) as usize;
    br.load();

    let mut out = Vec::with_capacity(n_seq);
    for i in 0..n_seq {
        if i > 0 {
            let nb = ll.num_bits[ll_state] as u32;
            ll_state = (ll.new_state_base[ll_state] + br.readmove(nb) as i32) as usize;
            br.load();
            let nb = ml.num_bits[ml_state] as u32;
            ml_state = (ml.new_state_base[ml_state] + br.readmove(nb) as i32) as usize;
            br.load();
            let nb = of.num_bits[of_state] as u32;
            of_state = (of.new_state_base[of_state] + br.readmove(nb) as i32) as usize;
            br.load();
        }

        let ll_code = ll.symbols[ll_state];
        let of_code = of.symbols[of_state];
        let ml_code = ml.symbols[ml_state];
        if ll_code > MAX_CODE_LIT_LEN || ml_code > MAX_CODE_MAT_LEN {
            return Err(CodecError::Corrupt("sequence length code out of range"));
        }

        let offset = (1u64 << of_code) + br.readmove(of_code as u32);
        br.load();
        let mat_len = SEQ_MATCH_LENGTH_BASELINES[ml_code as usize] + br.readmove(SEQ_MATCH_LENGTH_EXTRA_BITS[ml_code as usize]);
        br.load();
        let lit_len = SEQ_LITERAL_LENGTH_BASELINES[ll_code as usize] + br.readmove(SEQ_LITERAL_LENGTH_EXTRA_BITS[ll_code as usize]);
        br.load();

        out.push(Sequence { lit_len, mat_len, offset });
    }

    br.check_ended()?;
    Ok(out)
}

/// Resolves an encoded offset against the 3-entry repeat-offset history,
/// updating it in place, per the format's special cases for raw values 1-3.
fn parse_offset(offset: u64, prev_offsets: &mut [u64; 3], lit_len: u64) -> u64 {
    if offset > 3 {
        prev_offsets[2] = prev_offsets[1];
        prev_offsets[1] = prev_offsets[0];
        prev_offsets[0] = offset - 3;
        prev_offsets[0]
    } else {
        let offset = offset - if lit_len == 0 { 0 } else { 1 };
        if offset == 0 {
            prev_offsets[0]
        } else {
            let real_offset = if offset < 3 { prev_offsets[offset as usize] } else { prev_offsets[0] - 1 };
            if offset > 1 {
                prev_offsets[2] = prev_offsets[1];
            }
            prev_offsets[1] = prev_offsets[0];
            prev_offsets[0] = real_offset;
            real_offset
        }
    }
}

/// Executes decoded sequences against `literals`, writing to
/// `dst[*dst_pos..]`: copies `lit_len` literal bytes, resolves the
/// offset, then copies `mat_len` match bytes byte-by-byte to allow
/// overlapping (run-length) copies.
pub fn execute_sequences(
    dst: &mut [u8],
    dst_pos: &mut usize,
    literals: &[u8],
    sequences: &[Sequence],
    prev_offsets: &mut [u64; 3],
    window_size: u64,
    n_bytes_decoded: &mut u64,
) -> Result<()> {
    let mut lit_pos = 0usize;

    for seq in sequences {
        let lit_len = seq.lit_len as usize;
        if lit_len > literals.len() - lit_pos {
            return Err(CodecError::Corrupt("sequence literal length exceeds the literals section"));
        }
        if lit_len > dst.len() - *dst_pos {
            return Err(CodecError::DstOverflow);
        }
        dst[*dst_pos..*dst_pos + lit_len].copy_from_slice(&literals[lit_pos..lit_pos + lit_len]);
        lit_pos += lit_len;
        *dst_pos += lit_len;
        *n_bytes_decoded += lit_len as u64;

        let offset = parse_offset(seq.offset, prev_offsets, seq.lit_len);
        let max_offset = (*n_bytes_decoded).min(window_size);
        if offset > max_offset || offset == 0 {
            return Err(CodecError::Corrupt("sequence offset reaches before the decoding window"));
        }

        let mat_len = seq.mat_len as usize;
        if mat_len > dst.len() - *dst_pos {
            return Err(CodecError::DstOverflow);
        }
        let offset = offset as usize;
        for i in 0..mat_len {
            dst[*dst_pos + i] = dst[*dst_pos + i - offset];
        }
        *dst_pos += mat_len;
        *n_bytes_decoded += mat_len as u64;
    }

    let leftover = literals.len() - lit_pos;
    if leftover > dst.len() - *dst_pos {
        return Err(CodecError::DstOverflow);
    }
    dst[*dst_pos..*dst_pos + leftover].copy_from_slice(&literals[lit_pos..]);
    *dst_pos += leftover;
    *n_bytes_decoded += leftover as u64;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_offset_resolves_repeat_one_without_literals() {
        let mut prev = [10u64, 20, 30];
        // offset==1 with lit_len==0 maps to repeat-offset[0] unchanged.
        assert_eq!(parse_offset(1, &mut prev, 0), 10);
        assert_eq!(prev, [10, 20, 30]);
    }

    #[test]
    fn parse_offset_resolves_repeat_two_with_literals() {
        let mut prev = [10u64, 20, 30];
        // offset==2 with lit_len>0: subtract 1 -> raw 1 -> repeat[1], and
        // prev_offsets[0]/[1] swap.
        assert_eq!(parse_offset(2, &mut prev, 5), 20);
        assert_eq!(prev, [20, 10, 30]);
    }

    #[test]
    fn parse_offset_treats_large_values_as_absolute() {
        let mut prev = [10u64, 20, 30];
        assert_eq!(parse_offset(7, &mut prev, 5), 4);
        assert_eq!(prev, [4, 10, 20]);
    }

    #[test]
    fn execute_sequences_copies_overlapping_match() {
        let mut dst = vec![0u8; 16];
        let mut dst_pos = 0usize;
        let literals = b"ab";
        let sequences = vec![Sequence { lit_len: 2, mat_len: 6, offset: 4 /* raw, maps to prev_offsets[0]=1 initially? */ }];
        let mut prev = [1u64, 4, 8];
        let mut n_bytes = 0u64;
        execute_sequences(&mut dst, &mut dst_pos, literals, &sequences, &mut prev, 1000, &mut n_bytes).unwrap();
        // offset 4 (raw) -> real = 4-3=1: a run-length copy of the last byte ('b').
        assert_eq!(&dst[..8], b"abbbbbbb");
    }
}
