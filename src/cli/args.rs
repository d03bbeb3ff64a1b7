//! Command-line argument parsing.
//!
//! Ported from `original_source/tinyZZZ_main.c`'s `main()` argument loop,
//! which scans `argv` from the *last* element back to `argv[1]`. Switches
//! (`-c`, `--gzip`, ...) are recognized in any position; the first bare
//! (non-switch) argument encountered — which, scanning backward, is the
//! *last* one on the command line — becomes the destination file name, and
//! the second becomes the source. This crate keeps that scan order rather
//! than "fixing" it to the more usual `src` then `dst`; see `DESIGN.md`.

use anyhow::anyhow;

/// Compression direction selected by `-c`/`-d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Compress,
    Decompress,
}

/// Codec selected by `--gzip`/`--lz4`/`--lzma`/`--zstd`/`--lpaq8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gzip,
    Lz4,
    Lzma,
    Zstd,
    Lpaq8,
}

/// Output envelope selected by `--zip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Native,
    Zip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub action: Action,
    pub format: Format,
    pub container: Container,
    pub level: Option<u8>,
    pub dst: String,
    pub src: String,
}

/// Parses `std::env::args()` (skipping argv[0]).
///
/// Usage errors (an unrecognized switch, missing required fields, too many
/// positional arguments) come back as `anyhow::Error`, the same way
/// `jafreck-lz4r`'s own `cli::args::parse_args` reports them; `cli::run`
/// maps any of them to process exit code -1, per the source's `main()`,
/// which returns -1 from every argument-parsing failure path.
pub fn parse_args() -> anyhow::Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parses an already-collected argv slice, scanning it back to front per
/// the source's reversed loop.
pub fn parse_args_from(argv: &[String]) -> anyhow::Result<ParsedArgs> {
    let mut action = None;
    let mut format = None;
    let mut container = Container::Native;
    let mut level = None;
    let mut dst: Option<String> = None;
    let mut src: Option<String> = None;

    for arg in argv.iter().rev() {
        if let Some(stripped) = arg.strip_prefix('-') {
            match arg.as_str() {
                "-c" => action = Some(Action::Compress),
                "-d" => action = Some(Action::Decompress),
                "--gzip" => format = Some(Format::Gzip),
                "--lz4" => format = Some(Format::Lz4),
                "--lzma" => format = Some(Format::Lzma),
                "--zstd" => format = Some(Format::Zstd),
                "--lpaq8" => format = Some(Format::Lpaq8),
                "--zip" => container = Container::Zip,
                _ if stripped.len() == 1 && stripped.chars().next().unwrap().is_ascii_digit() => {
                    level = Some(stripped.as_bytes()[0] - b'0');
                }
                _ => return Err(anyhow!("unknown switch: {arg}")),
            }
        } else if dst.is_none() {
            dst = Some(arg.clone());
        } else if src.is_none() {
            src = Some(arg.clone());
        } else {
            return Err(anyhow!("too many file names given"));
        }
    }

    let (action, format, dst, src) = match (action, format, dst, src) {
        (Some(a), Some(f), Some(d), Some(s)) => (a, f, d, s),
        _ => return Err(anyhow!("missing required -c/-d, format, or file names")),
    };

    Ok(ParsedArgs { action, format, container, level, dst, src })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn last_positional_is_destination() {
        let parsed = parse_args_from(&argv(&["-c", "--gzip", "in.txt", "out.gz"])).unwrap();
        assert_eq!(parsed.action, Action::Compress);
        assert_eq!(parsed.format, Format::Gzip);
        assert_eq!(parsed.dst, "out.gz");
        assert_eq!(parsed.src, "in.txt");
    }

    #[test]
    fn zip_and_level_switches_are_recognized() {
        let parsed = parse_args_from(&argv(&["-c", "--lzma", "--zip", "-9", "in.txt", "out.zip"])).unwrap();
        assert_eq!(parsed.container, Container::Zip);
        assert_eq!(parsed.level, Some(9));
    }

    #[test]
    fn missing_format_is_a_usage_error() {
        assert!(parse_args_from(&argv(&["-c", "in.txt", "out.gz"])).is_err());
    }

    #[test]
    fn unknown_switch_is_a_usage_error() {
        assert!(parse_args_from(&argv(&["-c", "--bzip2", "in.txt", "out.bz"])).is_err());
    }

    #[test]
    fn a_third_positional_is_a_usage_error() {
        assert!(parse_args_from(&argv(&["-c", "--gzip", "a", "b", "c"])).is_err());
    }
}
