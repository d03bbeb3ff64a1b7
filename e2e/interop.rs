//! Cross-checks this crate's encoders against independent reference
//! decoders (`flate2`, `lz4_flex`), so a bug shared between this crate's
//! encoder and decoder can't hide a wire-format mistake from itself.

use std::io::Read;

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
fn gzip_output_decodes_with_flate2_across_several_inputs() {
    for src in [Vec::new(), b"abc".to_vec(), xorshift_bytes(50_000), b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(500)] {
        let mut dst = vec![0u8; src.len() * 2 + 4096];
        let n = tinycodecs::deflate::gzip(&src, &mut dst).unwrap();

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&dst[..n]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, src);
    }
}

#[test]
fn lz4_frame_output_decodes_with_lz4_flex() {
    for src in [Vec::new(), b"hello world".to_vec(), xorshift_bytes(70_000)] {
        let mut dst = vec![0u8; src.len() * 2 + 4096];
        let n = tinycodecs::lz4::encode(&src, &mut dst).unwrap();

        let mut decoded = Vec::new();
        lz4_flex::frame::FrameDecoder::new(&dst[..n]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, src);
    }
}

#[test]
fn lz4_flex_frame_output_decodes_with_this_crate() {
    let src = xorshift_bytes(40_000);

    let mut compressed = Vec::new();
    {
        use std::io::Write;
        let mut enc = lz4_flex::frame::FrameEncoder::new(&mut compressed);
        enc.write_all(&src).unwrap();
        enc.finish().unwrap();
    }

    let mut dst = vec![0u8; src.len() + 64];
    let n = tinycodecs::lz4::decode(&compressed, &mut dst).unwrap();
    assert_eq!(&dst[..n], &src[..]);
}
