//! The six boundary scenarios this crate's requirements call out
//! explicitly: empty input, a single byte, highly repetitive input,
//! uniform-random input, a reserved Zstandard block type, and an LZMA
//! header whose declared length disagrees with the decoded length.

use tinycodecs::error::CodecError;

fn xorshift_bytes(len: usize) -> Vec<u8> {
    let mut x: u32 = 0x2545F491;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            (x & 0xFF) as u8
        })
        .collect()
}

#[test]
fn empty_input_gzip_is_exactly_20_known_bytes() {
    let mut dst = [0u8; 20];
    let n = tinycodecs::deflate::gzip(&[], &mut dst).unwrap();
    assert_eq!(n, 20);
    assert_eq!(
        dst,
        [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x04, 0x03, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn single_byte_input_round_trips_through_lzma() {
    let src = [0x41u8];
    let mut dst = vec![0u8; tinycodecs::lzma::HEADER_LEN + 64];
    let n = tinycodecs::lzma::encode(&src, &mut dst).unwrap();

    let mut out = [0u8; 8];
    let decoded_len = tinycodecs::lzma::decode(&dst[..n], &mut out).unwrap();
    assert_eq!(decoded_len, 1);
    assert_eq!(&out[..1], &src);
}

#[test]
fn highly_repetitive_input_compresses_under_100_bytes_on_every_encoder() {
    let src = vec![0u8; 10_000];

    let mut gz = vec![0u8; 20_000];
    let gz_len = tinycodecs::deflate::gzip(&src, &mut gz).unwrap();
    assert!(gz_len < 100, "gzip: expected < 100 bytes, got {gz_len}");

    let mut lz4 = vec![0u8; 20_000];
    let lz4_len = tinycodecs::lz4::encode(&src, &mut lz4).unwrap();
    assert!(lz4_len < 100, "lz4: expected < 100 bytes, got {lz4_len}");
    let mut lz4_out = vec![0u8; src.len() + 64];
    assert_eq!(tinycodecs::lz4::decode(&lz4[..lz4_len], &mut lz4_out).unwrap(), src.len());

    let mut lzma = vec![0u8; 20_000];
    let lzma_len = tinycodecs::lzma::encode(&src, &mut lzma).unwrap();
    assert!(lzma_len < 100, "lzma: expected < 100 bytes, got {lzma_len}");
    let mut lzma_out = vec![0u8; src.len() + 64];
    assert_eq!(tinycodecs::lzma::decode(&lzma[..lzma_len], &mut lzma_out).unwrap(), src.len());
}

#[test]
fn uniform_random_input_round_trips_within_size_bound() {
    let src = xorshift_bytes(20_000);
    let bound = src.len() + src.len() / 128 + 4096;

    let mut lz4 = vec![0u8; src.len() * 2 + 4096];
    let lz4_len = tinycodecs::lz4::encode(&src, &mut lz4).unwrap();
    assert!(lz4_len <= bound, "lz4 output {lz4_len} exceeded bound {bound}");
    let mut lz4_out = vec![0u8; src.len() + 64];
    let n = tinycodecs::lz4::decode(&lz4[..lz4_len], &mut lz4_out).unwrap();
    assert_eq!(&lz4_out[..n], &src[..]);

    let mut lzma = vec![0u8; src.len() * 2 + 4096];
    let lzma_len = tinycodecs::lzma::encode(&src, &mut lzma).unwrap();
    assert!(lzma_len <= bound, "lzma output {lzma_len} exceeded bound {bound}");
    let mut lzma_out = vec![0u8; src.len() + 64];
    let n = tinycodecs::lzma::decode(&lzma[..lzma_len], &mut lzma_out).unwrap();
    assert_eq!(&lzma_out[..n], &src[..]);
}

#[test]
fn zstd_reserved_block_type_is_corrupt() {
    // A single-segment frame (content size byte = 5) followed by a block
    // header whose 2-bit type field is 3 (reserved).
    let mut src = 0xFD2F_B528u32.to_le_bytes().to_vec();
    src.push(0x20); // single_segment=1, fcs_flag=0
    src.push(5); // frame_content_size = 5
    let header: u32 = 1 | (3 << 1) | (5 << 3); // last=1, type=3 (reserved)
    src.push((header & 0xFF) as u8);
    src.push(((header >> 8) & 0xFF) as u8);
    src.push(((header >> 16) & 0xFF) as u8);

    let mut dst = [0u8; 16];
    assert_eq!(tinycodecs::zstd::decode(&src, &mut dst).unwrap_err().kind(), tinycodecs::error::ErrorKind::Corrupt);
}

#[test]
fn lzma_declared_length_mismatch_is_output_len_mismatch() {
    let src = b"some bytes to compress for this particular check".to_vec();
    let mut dst = vec![0u8; src.len() * 2 + 4096];
    let n = tinycodecs::lzma::encode(&src, &mut dst).unwrap();

    // Overwrite the header's 8-byte declared length (bytes 5..13) with a
    // value one larger than the true length.
    let mut tampered = dst[..n].to_vec();
    let wrong_len = (src.len() as u64) + 1;
    tampered[5..13].copy_from_slice(&wrong_len.to_le_bytes());

    let mut out = vec![0u8; src.len() + 64];
    assert_eq!(tinycodecs::lzma::decode(&tampered, &mut out), Err(CodecError::OutputLenMismatch));
}
