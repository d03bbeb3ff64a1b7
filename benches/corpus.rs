/// Synthetic, highly-compressible text used as benchmark input so that
/// `cargo bench` always runs without an external corpus.
pub fn synthetic_data(size: usize) -> Vec<u8> {
    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
        sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
        Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi \
        ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit \
        in voluptate velit esse cillum dolore eu fugiat nulla pariatur. ";

    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let rem = size - out.len();
        let take = rem.min(LOREM.len());
        out.extend_from_slice(&LOREM[..take]);
    }
    out
}
