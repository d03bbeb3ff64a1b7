//! Main LZMA packet-decoding loop.

use super::probs::LzmaProbs;
use super::state::{transition, Packet, N_LIT_STATES};
use super::bits_reverse;
use crate::error::{CodecError, Result};
use crate::rangecoder::RangeDecoder;

/// Decodes a raw LZMA packet stream (no header) from `src` into
/// `dst[..target_len]`. Stops either once `target_len` bytes have been
/// produced or an end-of-stream marker is met, whichever comes first, and
/// returns the number of bytes actually produced (mirrors `lzmaDecode`:
/// the caller compares this against a header-declared length itself).
pub fn decode_core(src: &[u8], dst: &mut [u8], target_len: usize, lc: u8, lp: u8, pb: u8) -> Result<usize> {
    let lc_shift = 8 - lc as u32;
    let lc_mask = (1u32 << lc) - 1;
    let lp_mask = (1u32 << lp) - 1;
    let pb_mask = (1u32 << pb) - 1;

    let mut coder = RangeDecoder::new(src);
    let mut probs = LzmaProbs::new(lc, lp, pb);

    let mut prev_byte: u8 = 0;
    let mut state: u8 = 0;
    let mut pos: usize = 0;
    let mut rep = [1u32; 4];

    while pos < target_len {
        coder.check_overflow()?;

        let prev_byte_lc_msbs = ((prev_byte as u32) >> lc_shift) & lc_mask;
        let lit_pos_state = (pos as u32) & lp_mask;
        let pos_state = (pos as u32) & pb_mask;

        let packet = if coder.decode_bit(probs.is_match_at(state, pos_state))? == 0 {
            Packet::Lit
        } else if coder.decode_bit(&mut probs.is_rep[state as usize])? == 0 {
            Packet::Match
        } else if coder.decode_bit(&mut probs.is_rep0[state as usize])? == 0 {
            if coder.decode_bit(probs.is_rep0_long_at(state, pos_state))? != 0 {
                Packet::Rep0
            } else {
                Packet::ShortRep
            }
        } else if coder.decode_bit(&mut probs.is_rep1[state as usize])? == 0 {
            Packet::Rep1
        } else if coder.decode_bit(&mut probs.is_rep2[state as usize])? != 0 {
            Packet::Rep3
        } else {
            Packet::Rep2
        };

        if packet == Packet::Lit {
            let ctx = probs.literal_ctx(lit_pos_state, prev_byte_lc_msbs);
            prev_byte = if state < N_LIT_STATES {
                coder.decode_int(ctx, 8)? as u8
            } else {
                let match_byte = if pos >= rep[0] as usize { dst[pos - rep[0] as usize] } else { 0 };
                coder.decode_matched_byte(ctx, match_byte as u32)? as u8
            };
        }

        state = transition(state, packet);

        let mut dist = match packet {
            Packet::ShortRep | Packet::Rep0 => rep[0],
            Packet::Rep1 => rep[1],
            Packet::Rep2 => rep[2],
            Packet::Rep3 => rep[3],
            _ => 0,
        };

        let mut len = match packet {
            Packet::Lit | Packet::ShortRep => 1,
            _ => 0,
        };

        match packet {
            Packet::Match | Packet::Rep3 => {
                rep[3] = rep[2];
                rep[2] = rep[1];
                rep[1] = rep[0];
            }
            Packet::Rep2 => {
                rep[2] = rep[1];
                rep[1] = rep[0];
            }
            Packet::Rep1 => {
                rep[1] = rep[0];
            }
            _ => {}
        }

        if len == 0 {
            let is_rep = packet.is_rep();
            if coder.decode_bit(&mut probs.len_choice[is_rep as usize])? == 0 {
                len = 2 + coder.decode_int(probs.len_low_tree(is_rep, pos_state), 3)?;
            } else if coder.decode_bit(&mut probs.len_choice2[is_rep as usize])? == 0 {
                len = 10 + coder.decode_int(probs.len_mid_tree(is_rep, pos_state), 3)?;
            } else {
                len = 18 + coder.decode_int(probs.len_high_tree(is_rep), 8)?;
            }
        }

        if packet == Packet::Match {
            let len_min5_minus2 = if len > 5 { 3 } else { len - 2 };
            let dist_slot = coder.decode_int(probs.dist_slot_tree(len_min5_minus2), 6)?;

            let d = if dist_slot < 4 {
                dist_slot
            } else {
                let bcnt = (dist_slot >> 1) - 1;
                let mut d = (2 | (dist_slot & 1)) << bcnt;
                if dist_slot >= 14 {
                    d |= coder.decode_int_by_fixed_prob(bcnt - 4)? << 4;
                    d |= bits_reverse(coder.decode_int(&mut probs.dist_align, 4)?, 4);
                } else {
                    d |= bits_reverse(coder.decode_int(probs.dist_special_tree(dist_slot - 4), bcnt)?, bcnt);
                }
                d
            };

            if d == 0xFFFF_FFFF {
                break;
            }
            dist = d + 1;
        }

        if dist as usize > pos {
            return Err(CodecError::Data);
        }
        if pos + len as usize > target_len {
            return Err(CodecError::DstOverflow);
        }

        if packet == Packet::Lit {
            dst[pos] = prev_byte;
        } else {
            rep[0] = dist;
        }

        for _ in 0..len {
            let b = dst[pos - dist as usize];
            dst[pos] = b;
            prev_byte = b;
            pos += 1;
        }
    }

    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzma::encoder::encode;
    use crate::lzma::LzmaParams;

    #[test]
    fn empty_input_decodes_to_nothing() {
        let mut dst = vec![0u8; 16];
        let n = encode(&[], &mut dst).unwrap();
        let mut out = vec![0u8; 4];
        let params = LzmaParams::default();
        let decoded_len = decode_core(&dst[..n], &mut out, out.len(), params.lc, params.lp, params.pb).unwrap();
        assert_eq!(decoded_len, 0);
    }

    #[test]
    fn declared_length_longer_than_actual_stream_is_detected_by_caller() {
        // decode_core itself just reports how many bytes it produced before
        // hitting the end marker; the OutputLenMismatch check happens one
        // layer up, in `lzma::decode`, by comparing that count against the
        // header's declared length.
        let mut dst = vec![0u8; 32];
        let n = encode(b"ab", &mut dst).unwrap();
        let mut out = vec![0u8; 10];
        let params = LzmaParams::default();
        let decoded_len = decode_core(&dst[..n], &mut out, out.len(), params.lc, params.lp, params.pb).unwrap();
        assert_eq!(decoded_len, 2);
    }
}
