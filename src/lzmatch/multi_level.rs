//! LZMA's match finder: up to 16 candidate positions per hash bucket, plus
//! a handful of recent-offset probes, picked by a length/distance scoring
//! function that favors repeat-offset reuse and penalizes long distances.

use super::{fingerprint, Match};

pub const HASH_LEVEL: usize = 16;
pub const HASH_BITS: u32 = 21;
pub const TABLE_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: u32 = (1 << HASH_BITS) - 1;

pub const MAX_LEN: u32 = 273;
/// `LZ_DIST_MAX_PLUS1` in the source: matches may reach back up to (but not
/// including) this distance.
pub const MAX_DIST_PLUS1: u32 = 0x4000_0000;

const EMPTY: u32 = u32::MAX;

pub struct MultiLevelHashTable {
    /// `table[bucket * HASH_LEVEL + slot]`; `EMPTY` marks an unused slot.
    table: Vec<u32>,
}

impl MultiLevelHashTable {
    pub fn new() -> Self {
        MultiLevelHashTable { table: vec![EMPTY; TABLE_SIZE * HASH_LEVEL] }
    }

    fn bucket(src: &[u8], pos: usize) -> usize {
        (fingerprint(src, pos) & HASH_MASK) as usize
    }

    /// Records `pos`, evicting the slot holding the smallest (oldest)
    /// position if every slot is already occupied.
    pub fn update(&mut self, src: &[u8], pos: usize) {
        if pos + 2 >= src.len() {
            return;
        }
        let b = Self::bucket(src, pos);
        let slots = &mut self.table[b * HASH_LEVEL..(b + 1) * HASH_LEVEL];
        for slot in slots.iter_mut() {
            if *slot == EMPTY {
                *slot = pos as u32;
                return;
            }
        }
        let (oldest_i, _) = slots.iter().enumerate().min_by_key(|&(_, &p)| p).unwrap();
        slots[oldest_i] = pos as u32;
    }

    /// Distance band 4 (closest) down to 0 (farthest), each threshold 12x
    /// the size of the last (`lenDistScore`'s `TABLE_THRESHOLDS`).
    fn dist_band(dist: u32) -> u32 {
        const D: u64 = 12;
        if dist as u64 <= D {
            4
        } else if dist as u64 <= D * D * 2 {
            3
        } else if dist as u64 <= D * D * D * 3 {
            2
        } else if dist as u64 <= D * D * D * D * 4 {
            1
        } else {
            0
        }
    }

    /// Scores a candidate `(len, dist)` against the four repeat-offset
    /// registers: an exact repeat-offset hit always scores band 5,
    /// otherwise the score trades off length against [`dist_band`].
    pub fn score(len: u32, dist: u32, reps: [u32; 4]) -> u32 {
        let band = if reps.contains(&dist) { 5 } else { Self::dist_band(dist) };
        if len < 2 {
            8 + 5
        } else if len == 2 {
            8 + band + 1
        } else {
            8 + band + len
        }
    }

    /// Queries all 16 hash-bucket slots plus 2 recent-position probes
    /// (`pos-1`, `pos-2`), keeping the highest-scoring candidate of length
    /// >= 2. Scored with all-zero repeat offsets, as in the source: this
    /// search never favors a candidate merely for matching a current rep
    /// register, leaving that comparison to the caller.
    pub fn search_match(&self, src: &[u8], pos: usize) -> Match {
        let len_max = (src.len() - pos).min(MAX_LEN as usize) as u32;
        let b = Self::bucket(src, pos);
        let slots = &self.table[b * HASH_LEVEL..(b + 1) * HASH_LEVEL];
        let no_reps = [0u32; 4];

        let mut best = Match::NONE;
        let mut best_score = Self::score(0, 0xFFFF_FFFF, no_reps);

        for i in 0..HASH_LEVEL + 2 {
            let cand = if i < HASH_LEVEL {
                let v = slots[i];
                if v == EMPTY {
                    continue;
                }
                v as usize
            } else {
                let back = i - HASH_LEVEL + 1;
                if pos < back {
                    continue;
                }
                pos - back
            };
            if cand >= pos {
                continue;
            }
            let dist = (pos - cand) as u32;
            if dist >= MAX_DIST_PLUS1 {
                continue;
            }
            let len = common_prefix_len(src, pos, cand, len_max);
            if len < 2 {
                continue;
            }
            let s = Self::score(len, dist, no_reps);
            if s > best_score {
                best_score = s;
                best = Match { len, dist };
            }
        }
        best
    }

    /// Runs [`search_rep`](Self::search_rep) and [`search_match`](Self::search_match)
    /// and keeps whichever scores at least as well under the real repeat
    /// offsets, ties favoring the (cheaper-to-code) repeat offset.
    pub fn search(&self, src: &[u8], pos: usize, reps: [u32; 4]) -> Match {
        let r = Self::search_rep(src, pos, reps, u32::MAX);
        let m = self.search_match(src, pos);
        if Self::score(r.len, r.dist, reps) >= Self::score(m.len, m.dist, reps) {
            r
        } else {
            m
        }
    }

    /// Restricts the search to the 4 repeat offsets, keeping the longest
    /// match of length >= 2 (ties favor the lowest-index repeat offset, the
    /// source's iteration order).
    pub fn search_rep(src: &[u8], pos: usize, reps: [u32; 4], len_limit: u32) -> Match {
        let len_max = (src.len() - pos).min(MAX_LEN as usize).min(len_limit as usize) as u32;
        let mut best = Match::NONE;
        for &dist in &reps {
            if dist as usize > pos {
                continue;
            }
            let cand = pos - dist as usize;
            let len = common_prefix_len(src, pos, cand, len_max);
            if len >= 2 && len > best.len {
                best = Match { len, dist };
            }
        }
        best
    }
}

fn common_prefix_len(src: &[u8], pos: usize, cand: usize, len_max: u32) -> u32 {
    let mut len = 0u32;
    while len < len_max && src[pos + len as usize] == src[cand + len as usize] {
        len += 1;
    }
    len
}

impl Default for MultiLevelHashTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_repeated_run() {
        let src = b"abcdefghijabcdefghij";
        let mut t = MultiLevelHashTable::new();
        for pos in 0..src.len() {
            if pos == 10 {
                let m = t.search_match(src, pos);
                assert_eq!(m, Match { len: 10, dist: 10 });
            }
            t.update(src, pos);
        }
    }

    #[test]
    fn search_picks_up_fresh_matches_via_search_fn() {
        let src = b"abcdefghijabcdefghij";
        let mut t = MultiLevelHashTable::new();
        for pos in 0..src.len() {
            if pos == 10 {
                let m = t.search(src, pos, [99, 99, 99, 99]);
                assert_eq!(m, Match { len: 10, dist: 10 });
            }
            t.update(src, pos);
        }
    }

    #[test]
    fn search_rep_prefers_longest_among_repeat_offsets() {
        let src = b"xxxxxAAAAAAAAxx";
        // rep0 = 5 -> points at src[pos-5]; construct so rep0 gives a
        // longer match than rep1.
        let m = MultiLevelHashTable::search_rep(src, 10, [5, 9, 1, 1], 0xFFFFFFFF);
        assert!(m.len >= 2);
    }
}
