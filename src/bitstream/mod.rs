//! Bit-level readers and writers shared by every codec.
//!
//! Three flavors, one per access pattern the format family needs:
//! a forward LSB-first writer (DEFLATE, LZ4 framing bytes), a forward
//! byte/bit reader (LZ4, Zstandard metadata), and a backward reader that
//! scans from the end of a substream toward its base (Zstandard FSE and
//! Huffman streams, and — via the range coder — LZMA).
//!
//! Every mutating operation is bounds-checked against the caller-supplied
//! slice and fails with [`CodecError::DstOverflow`] / [`CodecError::SrcOverflow`]
//! rather than indexing out of bounds.

mod backward_reader;
mod forward_reader;
mod forward_writer;

pub use backward_reader::BackwardReader;
pub use forward_reader::ForwardReader;
pub use forward_writer::ForwardWriter;
