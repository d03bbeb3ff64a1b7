//! `tinycodecs` command-line entry point.
//!
//! All argument parsing and dispatch logic lives in [`tinycodecs::cli`];
//! this binary only wires up logging and the process exit code.

fn main() {
    env_logger::init();
    std::process::exit(tinycodecs::cli::run());
}
