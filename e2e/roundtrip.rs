//! Whole-codec round-trip tests: encode then decode (or decode-against-a-
//! reference-encoder where this crate doesn't encode) and compare against
//! the original bytes.

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
fn lzma_round_trips_empty_and_varied_inputs() {
    for src in [
        Vec::new(),
        b"a".to_vec(),
        b"the quick brown fox jumps over the lazy dog".to_vec(),
        vec![0u8; 10_000],
        xorshift_bytes(5_000),
    ] {
        let mut dst = vec![0u8; src.len() * 2 + 4096];
        let n = tinycodecs::lzma::encode(&src, &mut dst).unwrap();
        let mut out = vec![0u8; src.len() + 64];
        let decoded_len = tinycodecs::lzma::decode(&dst[..n], &mut out).unwrap();
        assert_eq!(&out[..decoded_len], &src[..]);
    }
}

#[test]
fn lz4_round_trips_through_its_own_frame_decoder() {
    for src in [Vec::new(), b"hello hello hello hello".to_vec(), xorshift_bytes(8_000)] {
        let mut dst = vec![0u8; src.len() * 2 + 4096];
        let n = tinycodecs::lz4::encode(&src, &mut dst).unwrap();
        let mut out = vec![0u8; src.len() + 64];
        let decoded_len = tinycodecs::lz4::decode(&dst[..n], &mut out).unwrap();
        assert_eq!(&out[..decoded_len], &src[..]);
    }
}

#[test]
fn gzip_decodes_with_flate2() {
    use std::io::Read;

    let src = b"hello hello hello, this is a repetitive little fixture".repeat(20);
    let mut dst = vec![0u8; src.len() * 2 + 4096];
    let n = tinycodecs::deflate::gzip(&src, &mut dst).unwrap();

    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(&dst[..n]).read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, src);
}

#[test]
fn zip_deflate_entry_is_readable_by_flate2_as_raw_deflate() {
    use std::io::Read;

    let src = b"ziparchive payload, repeated, repeated, repeated".to_vec();
    let mut dst = vec![0u8; src.len() * 2 + 4096];
    let n = tinycodecs::zip::write(&src, &mut dst, "payload.txt", tinycodecs::zip::Method::Deflate).unwrap();

    // Local File Header is 30 bytes + filename; the DEFLATE payload follows directly.
    let payload_start = 30 + "payload.txt".len();
    let crc = u32::from_le_bytes(dst[14..18].try_into().unwrap());
    let compressed_len = u32::from_le_bytes(dst[18..22].try_into().unwrap()) as usize;
    assert_eq!(crc, tinycodecs::crc32::crc32(&src));

    let mut decoded = Vec::new();
    flate2::read::DeflateDecoder::new(&dst[payload_start..payload_start + compressed_len])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, src);
    assert!(n > payload_start);
}
