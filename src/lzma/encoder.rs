//! Main LZMA packet-encoding loop.

use super::probs::LzmaProbs;
use super::state::{transition, Packet, N_LIT_STATES};
use super::{bits_reverse, LzmaParams};
use crate::error::Result;
use crate::lzmatch::multi_level::MultiLevelHashTable;
use crate::lzmatch::Match;
use crate::rangecoder::RangeEncoder;

/// Encodes `src` as a raw LZMA packet stream (no 13-byte header) into `dst`,
/// always with an end-of-stream marker, returning the number of bytes
/// written. Uses the encoder's one fixed `(lc, lp, pb)` combination
/// ([`LzmaParams::default()`]).
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let params = LzmaParams::default();
    let LzmaParams { lc, lp, pb } = params;
    let lc_shift = 8 - lc as u32;
    let lc_mask = (1u32 << lc) - 1;
    let lp_mask = (1u32 << lp) - 1;
    let pb_mask = (1u32 << pb) - 1;

    let mut coder = RangeEncoder::new(dst);
    let mut probs = LzmaProbs::new(lc, lp, pb);
    let mut table = MultiLevelHashTable::new();

    let mut state: u8 = 0;
    let mut pos: usize = 0;
    let mut rep = [1u32; 4];
    let mut n_bypass: u32 = 0;
    let mut len_bypass: u32 = 0;
    let mut dist_bypass: u32 = 0;
    let mut end_mark_pending = true;

    loop {
        let lit_pos_state = (pos as u32) & lp_mask;
        let pos_state = (pos as u32) & pb_mask;
        let mut curr_byte = 0u32;
        let mut match_byte = 0u32;
        let mut prev_byte_lc_msbs = 0u32;

        if pos < src.len() {
            curr_byte = src[pos] as u32;
        }
        if pos > 0 {
            match_byte = src[pos - rep[0] as usize] as u32;
            prev_byte_lc_msbs = ((src[pos - 1] as u32) >> lc_shift) & lc_mask;
        }

        let packet;
        let mut len;
        let mut dist;

        if pos >= src.len() {
            if !end_mark_pending {
                break;
            }
            end_mark_pending = false;
            packet = Packet::Match;
            len = 2;
            dist = 0;
        } else {
            if n_bypass > 0 {
                len = 0;
                dist = 0;
                n_bypass -= 1;
            } else if len_bypass > 0 {
                len = len_bypass;
                dist = dist_bypass;
                len_bypass = 0;
                dist_bypass = 0;
            } else {
                let m = table.search(src, pos, rep);
                len = m.len;
                dist = m.dist;

                if src.len() - pos > 8 && len >= 2 {
                    let score0 = MultiLevelHashTable::score(len, dist, rep);
                    let m1 = table.search(src, pos + 1, rep);
                    let score1 = MultiLevelHashTable::score(m1.len, m1.dist, rep);
                    let mut m2 = Match::NONE;
                    let mut score2 = 0u32;
                    if len >= 3 {
                        m2 = table.search(src, pos + 2, rep);
                        score2 = MultiLevelHashTable::score(m2.len, m2.dist, rep).saturating_sub(1);
                    }

                    if score2 > score0 && score2 > score1 {
                        let r = MultiLevelHashTable::search_rep(src, pos, rep, 2);
                        len = r.len;
                        dist = r.dist;
                        len_bypass = m2.len;
                        dist_bypass = m2.dist;
                        n_bypass = if len < 2 { 1 } else { 0 };
                    } else if score1 > score0 {
                        len = 0;
                        dist = 0;
                        len_bypass = m1.len;
                        dist_bypass = m1.dist;
                        n_bypass = 0;
                    }
                }
            }

            if len < 2 {
                packet = if is_short_rep(src, pos, rep[0]) { Packet::ShortRep } else { Packet::Lit };
            } else if dist == rep[0] {
                packet = Packet::Rep0;
            } else if dist == rep[1] {
                packet = Packet::Rep1;
                rep = [dist, rep[0], rep[2], rep[3]];
            } else if dist == rep[2] {
                packet = Packet::Rep2;
                rep = [dist, rep[0], rep[1], rep[3]];
            } else if dist == rep[3] {
                packet = Packet::Rep3;
                rep = [dist, rep[0], rep[1], rep[2]];
            } else {
                packet = Packet::Match;
                rep = [dist, rep[0], rep[1], rep[2]];
            }

            let pos2 = pos + if matches!(packet, Packet::Lit | Packet::ShortRep) { 1 } else { len as usize };
            while pos < pos2 {
                table.update(src, pos);
                pos += 1;
            }
        }

        match packet {
            Packet::Lit => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 0)?;
            }
            Packet::Match => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 0)?;
            }
            Packet::ShortRep => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep0[state as usize], 0)?;
                coder.encode_bit(probs.is_rep0_long_at(state, pos_state), 0)?;
            }
            Packet::Rep0 => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep0[state as usize], 0)?;
                coder.encode_bit(probs.is_rep0_long_at(state, pos_state), 1)?;
            }
            Packet::Rep1 => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep0[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep1[state as usize], 0)?;
            }
            Packet::Rep2 => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep0[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep1[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep2[state as usize], 0)?;
            }
            Packet::Rep3 => {
                coder.encode_bit(probs.is_match_at(state, pos_state), 1)?;
                coder.encode_bit(&mut probs.is_rep[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep0[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep1[state as usize], 1)?;
                coder.encode_bit(&mut probs.is_rep2[state as usize], 1)?;
            }
        }

        if packet == Packet::Lit {
            let ctx = probs.literal_ctx(lit_pos_state, prev_byte_lc_msbs);
            if state < N_LIT_STATES {
                coder.encode_int(ctx, curr_byte, 8)?;
            } else {
                coder.encode_matched_byte(ctx, curr_byte, match_byte)?;
            }
        }

        if matches!(packet, Packet::Match | Packet::Rep0 | Packet::Rep1 | Packet::Rep2 | Packet::Rep3) {
            let is_rep = packet.is_rep();
            if len < 10 {
                coder.encode_bit(&mut probs.len_choice[is_rep as usize], 0)?;
                coder.encode_int(probs.len_low_tree(is_rep, pos_state), len - 2, 3)?;
            } else if len < 18 {
                coder.encode_bit(&mut probs.len_choice[is_rep as usize], 1)?;
                coder.encode_bit(&mut probs.len_choice2[is_rep as usize], 0)?;
                coder.encode_int(probs.len_mid_tree(is_rep, pos_state), len - 10, 3)?;
            } else {
                coder.encode_bit(&mut probs.len_choice[is_rep as usize], 1)?;
                coder.encode_bit(&mut probs.len_choice2[is_rep as usize], 1)?;
                coder.encode_int(probs.len_high_tree(is_rep), len - 18, 8)?;
            }
        }

        if packet == Packet::Match {
            let len_min5_minus2 = if len > 5 { 3 } else { len - 2 };
            dist = dist.wrapping_sub(1);

            let dist_slot = if dist < 4 {
                dist
            } else {
                let cb = 32 - dist.leading_zeros() - 1;
                (cb << 1) | ((dist >> (cb - 1)) & 1)
            };

            coder.encode_int(probs.dist_slot_tree(len_min5_minus2), dist_slot, 6)?;

            if dist_slot >= 14 {
                let bcnt = (dist_slot >> 1) - 1 - 4;
                let bits = (dist >> 4) & ((1u32 << bcnt) - 1);
                coder.encode_int_by_fixed_prob(bits, bcnt)?;
                let align_bits = bits_reverse(dist & 0xF, 4);
                coder.encode_int(&mut probs.dist_align, align_bits, 4)?;
            } else if dist_slot >= 4 {
                let bcnt = (dist_slot >> 1) - 1;
                let bits = bits_reverse(dist & ((1u32 << bcnt) - 1), bcnt);
                coder.encode_int(probs.dist_special_tree(dist_slot - 4), bits, bcnt)?;
            }
        }

        state = transition(state, packet);
    }

    coder.terminate()?;
    Ok(coder.bytes_written())
}

fn is_short_rep(src: &[u8], pos: usize, rep0: u32) -> bool {
    pos >= rep0 as usize && src[pos] == src[pos - rep0 as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzma::decoder::decode_core;

    #[test]
    fn round_trips_through_this_crates_own_decoder() {
        let src = b"the quick brown fox jumps over the lazy dog. the quick brown fox.";
        let mut dst = vec![0u8; src.len() * 2 + 64];
        let n = encode(src, &mut dst).unwrap();

        let mut out = vec![0u8; src.len() + 16];
        let params = LzmaParams::default();
        let decoded_len = decode_core(&dst[..n], &mut out, out.len(), params.lc, params.lp, params.pb).unwrap();
        assert_eq!(decoded_len, src.len());
        assert_eq!(&out[..decoded_len], &src[..]);
    }
}
