//! Thin command-line wrapper around the codec library: no streaming, no
//! directory recursion, no benchmarking — reads one file fully into
//! memory, calls one codec entry point, writes one file.
//!
//! Ported from `original_source/tinyZZZ_main.c`'s `main()`, trimmed to the
//! formats this crate implements (LPAQ8 is header-only in the source; this
//! crate rejects it as [`CodecError::Unsupported`] rather than silently
//! dropping the switch).

pub mod args;

use std::fs;

use args::{Action, Container, Format, ParsedArgs};
use crate::error::{CodecError, Result};
use crate::zip;

/// Initial destination buffer size, grown once on [`CodecError::DstOverflow`].
const INITIAL_DST_MARGIN: usize = 4096;

/// Runs one codec invocation sized generously, retrying once with a larger
/// buffer if it reports [`CodecError::DstOverflow`].
fn run_with_growth(src: &[u8], codec: impl Fn(&[u8], &mut [u8]) -> Result<usize>) -> Result<Vec<u8>> {
    let mut cap = src.len() * 2 + INITIAL_DST_MARGIN;
    loop {
        let mut dst = vec![0u8; cap];
        match codec(src, &mut dst) {
            Ok(n) => {
                dst.truncate(n);
                return Ok(dst);
            }
            Err(CodecError::DstOverflow) if cap < (1usize << 32) => {
                cap = cap.saturating_mul(4) + INITIAL_DST_MARGIN;
                log::debug!("cli: destination buffer too small, retrying with {cap} bytes");
            }
            Err(e) => return Err(e),
        }
    }
}

fn dispatch(args: &ParsedArgs, src: &[u8]) -> Result<Vec<u8>> {
    if args.format != Format::Lpaq8 {
        if args.level.is_some() {
            return Err(CodecError::Unsupported("compression level is only accepted for --lpaq8"));
        }
    } else {
        return Err(CodecError::Unsupported("lpaq8 codec"));
    }

    match (args.format, args.action, args.container) {
        (Format::Gzip, Action::Compress, Container::Native) => run_with_growth(src, crate::deflate::gzip),
        (Format::Gzip, Action::Decompress, _) => Err(CodecError::Unsupported("gzip decompression")),
        (Format::Gzip, Action::Compress, Container::Zip) => Err(CodecError::Unsupported("gzip payload inside a zip container")),

        (Format::Lz4, Action::Compress, Container::Native) => run_with_growth(src, crate::lz4::encode),
        (Format::Lz4, Action::Decompress, Container::Native) => run_with_growth(src, crate::lz4::decode),
        (Format::Lz4, _, Container::Zip) => Err(CodecError::Unsupported("lz4 payload inside a zip container")),

        (Format::Zstd, Action::Decompress, Container::Native) => run_with_growth(src, crate::zstd::decode),
        (Format::Zstd, Action::Compress, _) => Err(CodecError::Unsupported("zstd compression")),
        (Format::Zstd, Action::Decompress, Container::Zip) => Err(CodecError::Unsupported("zstd payload inside a zip container")),

        (Format::Lzma, Action::Compress, Container::Native) => run_with_growth(src, crate::lzma::encode),
        (Format::Lzma, Action::Decompress, Container::Native) => run_with_growth(src, crate::lzma::decode),
        (Format::Lzma, Action::Compress, Container::Zip) => {
            run_with_growth(src, |s, d| zip::write(s, d, &args.src, zip::Method::Lzma))
        }
        (Format::Lzma, Action::Decompress, Container::Zip) => Err(CodecError::Unsupported("reading a zip container")),

        (Format::Lpaq8, ..) => unreachable!("rejected above"),
    }
}

/// Parses argv, runs the selected codec, and returns the process exit code:
/// `0` on success, `-1` on a CLI usage error (bad switch, missing field,
/// unreadable/unwritable file), otherwise the codec's
/// [`crate::error::ErrorKind`] as a small positive integer.
pub fn run() -> i32 {
    let parsed = match args::parse_args() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("tinycodecs: {e}");
            return -1;
        }
    };

    let src = match fs::read(&parsed.src) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("tinycodecs: reading {:?}: {e}", parsed.src);
            return -1;
        }
    };
    log::trace!("cli: read {} bytes from {:?}", src.len(), parsed.src);

    let out = match dispatch(&parsed, &src) {
        Ok(out) => out,
        Err(e) => {
            log::warn!("cli: {e}");
            eprintln!("tinycodecs: {e}");
            return e.kind() as u8 as i32;
        }
    };

    if let Err(e) = fs::write(&parsed.dst, &out) {
        eprintln!("tinycodecs: writing {:?}: {e}", parsed.dst);
        return -1;
    }
    log::trace!("cli: wrote {} bytes to {:?}", out.len(), parsed.dst);
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use args::{Action, Container, Format};

    fn args(format: Format, action: Action, container: Container) -> ParsedArgs {
        ParsedArgs { action, format, container, level: None, dst: "out".into(), src: "in".into() }
    }

    #[test]
    fn gzip_decompress_is_unsupported() {
        let a = args(Format::Gzip, Action::Decompress, Container::Native);
        assert_eq!(dispatch(&a, b"x"), Err(CodecError::Unsupported("gzip decompression")));
    }

    #[test]
    fn lpaq8_is_always_unsupported() {
        let a = args(Format::Lpaq8, Action::Compress, Container::Native);
        assert_eq!(dispatch(&a, b"x"), Err(CodecError::Unsupported("lpaq8 codec")));
    }

    #[test]
    fn level_without_lpaq8_is_unsupported() {
        let mut a = args(Format::Gzip, Action::Compress, Container::Native);
        a.level = Some(5);
        assert_eq!(dispatch(&a, b"x"), Err(CodecError::Unsupported("compression level is only accepted for --lpaq8")));
    }

    #[test]
    fn gzip_compress_round_trips_through_dispatch() {
        let a = args(Format::Gzip, Action::Compress, Container::Native);
        let out = dispatch(&a, b"hello hello hello").unwrap();
        assert_eq!(&out[..2], &[0x1F, 0x8B]);
    }
}
