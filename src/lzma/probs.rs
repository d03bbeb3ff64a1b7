//! LZMA's probability banks, sized at construction time by `lc`/`lp`/`pb`
//! since the decoder must accept any header-declared combination while the
//! encoder always uses one fixed combination.
//!
//! Every bank starts at [`PROB_INIT`] (50%), same as the source's
//! `INIT_PROBS` macro.

use crate::rangecoder::PROB_INIT;

use super::state::N_STATES;

/// Per-context-literal-tree span: a plain 8-bit tree (255 nodes) shares its
/// slot range with the matched-byte tree's 3 offset bands, so each
/// `(lit_pos_state, prev_byte_msbs)` context gets `3 * 256` slots.
const LITERAL_CTX_LEN: usize = 3 * 256;

pub struct LzmaProbs {
    pub is_match: Vec<u16>,      // [N_STATES][n_pos_states]
    pub is_rep: Vec<u16>,        // [N_STATES]
    pub is_rep0: Vec<u16>,       // [N_STATES]
    pub is_rep0_long: Vec<u16>,  // [N_STATES][n_pos_states]
    pub is_rep1: Vec<u16>,       // [N_STATES]
    pub is_rep2: Vec<u16>,       // [N_STATES]
    pub literal: Vec<u16>,       // [n_lit_pos_states][n_prev_byte_msbs][LITERAL_CTX_LEN]
    pub dist_slot: Vec<u16>,     // [4][63]
    pub dist_special: Vec<u16>, // [10][31]
    pub dist_align: Vec<u16>,   // [15]
    pub len_choice: [u16; 2],
    pub len_choice2: [u16; 2],
    pub len_low: Vec<u16>,  // [2][n_pos_states][7]
    pub len_mid: Vec<u16>,  // [2][n_pos_states][7]
    pub len_high: Vec<u16>, // [2][255]

    n_pos_states: usize,
    n_prev_byte_msbs: usize,
}

impl LzmaProbs {
    pub fn new(lc: u8, lp: u8, pb: u8) -> Self {
        let n_pos_states = 1usize << pb;
        let n_lit_pos_states = 1usize << lp;
        let n_prev_byte_msbs = 1usize << lc;
        let n_states = N_STATES as usize;

        let filled = |len: usize| vec![PROB_INIT; len];
        LzmaProbs {
            is_match: filled(n_states * n_pos_states),
            is_rep: filled(n_states),
            is_rep0: filled(n_states),
            is_rep0_long: filled(n_states * n_pos_states),
            is_rep1: filled(n_states),
            is_rep2: filled(n_states),
            literal: filled(n_lit_pos_states * n_prev_byte_msbs * LITERAL_CTX_LEN),
            dist_slot: filled(4 * 63),
            dist_special: filled(10 * 31),
            dist_align: filled(15),
            len_choice: [PROB_INIT; 2],
            len_choice2: [PROB_INIT; 2],
            len_low: filled(2 * n_pos_states * 7),
            len_mid: filled(2 * n_pos_states * 7),
            len_high: filled(2 * 255),
            n_pos_states,
            n_prev_byte_msbs,
        }
    }

    pub fn is_match_at(&mut self, state: u8, pos_state: u32) -> &mut u16 {
        &mut self.is_match[state as usize * self.n_pos_states + pos_state as usize]
    }

    pub fn is_rep0_long_at(&mut self, state: u8, pos_state: u32) -> &mut u16 {
        &mut self.is_rep0_long[state as usize * self.n_pos_states + pos_state as usize]
    }

    /// The 768-slot literal-coding context for `(lit_pos_state, prev_byte_msbs)`,
    /// shared by the plain 8-bit tree (`encode_int`/`decode_int`, slots
    /// 0..255) and the matched-byte tree (`encode_matched_byte`, slots
    /// 0..767).
    pub fn literal_ctx(&mut self, lit_pos_state: u32, prev_byte_msbs: u32) -> &mut [u16] {
        let base = (lit_pos_state as usize * self.n_prev_byte_msbs + prev_byte_msbs as usize) * LITERAL_CTX_LEN;
        &mut self.literal[base..base + LITERAL_CTX_LEN]
    }

    pub fn dist_slot_tree(&mut self, len_min5_minus2: u32) -> &mut [u16] {
        let base = len_min5_minus2 as usize * 63;
        &mut self.dist_slot[base..base + 63]
    }

    pub fn dist_special_tree(&mut self, dist_slot_minus4: u32) -> &mut [u16] {
        let base = dist_slot_minus4 as usize * 31;
        &mut self.dist_special[base..base + 31]
    }

    pub fn len_low_tree(&mut self, is_rep: bool, pos_state: u32) -> &mut [u16] {
        let base = (is_rep as usize * self.n_pos_states + pos_state as usize) * 7;
        &mut self.len_low[base..base + 7]
    }

    pub fn len_mid_tree(&mut self, is_rep: bool, pos_state: u32) -> &mut [u16] {
        let base = (is_rep as usize * self.n_pos_states + pos_state as usize) * 7;
        &mut self.len_mid[base..base + 7]
    }

    pub fn len_high_tree(&mut self, is_rep: bool) -> &mut [u16] {
        let base = is_rep as usize * 255;
        &mut self.len_high[base..base + 255]
    }
}
