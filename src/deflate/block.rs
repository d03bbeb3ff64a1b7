//! Per-block LZ77 scanning and Huffman-coded emission (fixed and dynamic).

use super::huffman::{build_huffman_bits, build_huffman_len};
use super::tables::{
    fixed_dist_bits, fixed_symbol_bits, fixed_symbol_len, lz77_symbol_and_extra, DIST_TREE_MERGE_INC,
    NUM_LZ77_DIST, NUM_LZ77_LEN, NUM_LITERAL, NUM_SYMBOL, SYMBOL_END, SYMBOL_TREE_MERGE_INC,
};
use crate::bitstream::ForwardWriter;
use crate::error::Result;
use crate::lzmatch::single_level::SingleLevelHashTable;

/// One LZ77 event: a literal byte, a (length, distance) match, or the
/// block-terminating end marker.
enum Lz77Event {
    Literal(u8),
    Match { len: u32, dist: u32 },
    End,
}

/// Scans `src[pos..]` for the next LZ77 event, advancing `pos` and updating
/// the hash table over every position the match covers (mirrors
/// `getLZ77NextSymbol`, minus its 4-way hash table — this uses the shared
/// single-level finder instead, per the data model in §3).
fn next_event(src: &[u8], pos: &mut usize, table: &mut SingleLevelHashTable) -> Lz77Event {
    if *pos >= src.len() {
        return Lz77Event::End;
    }
    let m = table.search_match(src, *pos);
    if m.is_none() {
        table.update(src, *pos);
        let b = src[*pos];
        *pos += 1;
        Lz77Event::Literal(b)
    } else {
        for _ in 0..m.len {
            table.update(src, *pos);
            *pos += 1;
        }
        Lz77Event::Match { len: m.len, dist: m.dist }
    }
}

fn write_symbol_extra(
    w: &mut ForwardWriter<'_>,
    symbol_bits: &[u32],
    symbol_len: &[u32],
    dist_bits: &dyn Fn(u32) -> u32,
    dist_len: &dyn Fn(u32) -> u32,
    symbol: u32,
    len_extra_bits: u32,
    len_extra_len: u32,
    dist_symbol: u32,
    dist_extra_bits: u32,
    dist_extra_len: u32,
) -> Result<()> {
    w.append(symbol_bits[symbol as usize], symbol_len[symbol as usize])?;
    if symbol as usize > SYMBOL_END {
        w.append(len_extra_bits, len_extra_len)?;
        w.append(dist_bits(dist_symbol), dist_len(dist_symbol))?;
        w.append(dist_extra_bits, dist_extra_len)?;
    }
    Ok(())
}

/// Emits one block using the fixed RFC-1951 §3.2.6 Huffman codes.
pub fn emit_fixed_block(w: &mut ForwardWriter<'_>, src: &[u8], is_final: bool) -> Result<()> {
    let symbol_bits = fixed_symbol_bits();
    let symbol_len: Vec<u32> = (0..288).map(fixed_symbol_len).collect();

    w.append(is_final as u32, 1)?;
    w.append(0b01, 2)?;

    let mut table = SingleLevelHashTable::new();
    let mut pos = 0usize;
    loop {
        match next_event(src, &mut pos, &mut table) {
            Lz77Event::End => {
                w.append(symbol_bits[SYMBOL_END], symbol_len[SYMBOL_END])?;
                break;
            }
            Lz77Event::Literal(b) => {
                w.append(symbol_bits[b as usize], symbol_len[b as usize])?;
            }
            Lz77Event::Match { len, dist } => {
                let (sym, lex_bits, lex_len, dsym, dex_bits, dex_len) = lz77_symbol_and_extra(dist, len);
                write_symbol_extra(
                    w,
                    &symbol_bits,
                    &symbol_len,
                    &fixed_dist_bits,
                    &|_| 5,
                    sym,
                    lex_bits,
                    lex_len,
                    dsym,
                    dex_bits,
                    dex_len,
                )?;
            }
        }
    }
    Ok(())
}

/// Emits one block choosing per-symbol Huffman codes built from the block's
/// own symbol frequencies (two scanning passes: count, then emit).
pub fn emit_dynamic_block(w: &mut ForwardWriter<'_>, src: &[u8], is_final: bool) -> Result<()> {
    let mut symbol_cnt = vec![0u32; NUM_SYMBOL];
    let mut dist_cnt = vec![0u32; NUM_LZ77_DIST];

    {
        let mut table = SingleLevelHashTable::new();
        let mut pos = 0usize;
        loop {
            match next_event(src, &mut pos, &mut table) {
                Lz77Event::End => {
                    symbol_cnt[SYMBOL_END] += 1;
                    break;
                }
                Lz77Event::Literal(b) => symbol_cnt[b as usize] += 1,
                Lz77Event::Match { len, dist } => {
                    let (sym, _, _, dsym, _, _) = lz77_symbol_and_extra(dist, len);
                    symbol_cnt[sym as usize] += 1;
                    dist_cnt[dsym as usize] += 1;
                }
            }
        }
    }

    let dist_huffman_len = build_huffman_len(&mut dist_cnt, DIST_TREE_MERGE_INC);
    let dist_huffman_bits = build_huffman_bits(&dist_huffman_len);
    let symbol_huffman_len = build_huffman_len(&mut symbol_cnt, SYMBOL_TREE_MERGE_INC);
    let symbol_huffman_bits = build_huffman_bits(&symbol_huffman_len);

    w.append(is_final as u32, 1)?;
    w.append(0b10, 2)?;

    let hlit = (1..=NUM_LZ77_LEN as u32)
        .rev()
        .find(|&h| symbol_huffman_len[NUM_LITERAL + h as usize] != 0)
        .unwrap_or(0);
    let hdist = (1..NUM_LZ77_DIST as u32)
        .rev()
        .find(|&h| dist_huffman_len[h as usize] != 0)
        .unwrap_or(0);

    w.append(hlit, 5)?;
    w.append(hdist, 5)?;
    w.append(19 - 4, 4)?;

    // Non-standard (by design, per the spec's §4.4 deviation from RFC 1951):
    // a constant code-length-code-length prefix, then the actual code
    // lengths written uncompressed as 4-bit reversed fields.
    for _ in 0..3 {
        w.append(0, 3)?;
    }
    for _ in 0..16 {
        w.append(4, 3)?;
    }

    for i in 0..NUM_LITERAL + 1 + hlit as usize {
        w.append(reverse4(symbol_huffman_len[i]), 4)?;
    }
    for i in 0..hdist as usize + 1 {
        w.append(reverse4(dist_huffman_len[i]), 4)?;
    }

    let mut table = SingleLevelHashTable::new();
    let mut pos = 0usize;
    loop {
        match next_event(src, &mut pos, &mut table) {
            Lz77Event::End => {
                w.append(symbol_huffman_bits[SYMBOL_END], symbol_huffman_len[SYMBOL_END])?;
                break;
            }
            Lz77Event::Literal(b) => {
                w.append(symbol_huffman_bits[b as usize], symbol_huffman_len[b as usize])?;
            }
            Lz77Event::Match { len, dist } => {
                let (sym, lex_bits, lex_len, dsym, dex_bits, dex_len) = lz77_symbol_and_extra(dist, len);
                write_symbol_extra(
                    w,
                    &symbol_huffman_bits,
                    &symbol_huffman_len,
                    &|s| dist_huffman_bits[s as usize],
                    &|s| dist_huffman_len[s as usize],
                    sym,
                    lex_bits,
                    lex_len,
                    dsym,
                    dex_bits,
                    dex_len,
                )?;
            }
        }
    }
    Ok(())
}

fn reverse4(v: u32) -> u32 {
    let mut r = 0u32;
    let mut v = v;
    for _ in 0..4 {
        r = (r << 1) | (v & 1);
        v >>= 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_empty_block_matches_known_vector() {
        let mut buf = [0u8; 8];
        let mut w = ForwardWriter::new(&mut buf);
        emit_fixed_block(&mut w, &[], true).unwrap();
        w.align_to_byte().unwrap();
        // final=1, type=01, end-of-block symbol (7 zero bits), padded: 03 00.
        assert_eq!(&buf[..2], &[0x03, 0x00]);
        assert_eq!(w.bytes_written(), 2);
    }
}
