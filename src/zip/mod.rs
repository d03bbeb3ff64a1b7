//! Minimal single-file ZIP container writer wrapping a DEFLATE or LZMA
//! payload.
//!
//! Ported from `original_source/zipC.c`'s `zipC`/`writeZipHeader`/
//! `writeZipFooter`, byte-exact including the placeholder-then-rewrite
//! two-pass local header.

use crate::crc32::crc32;
use crate::error::{CodecError, Result};
use crate::{deflate, lzma};

const ZIP_HEADER_LEN_EXCLUDE_FILENAME: usize = 30;
const ZIP_FOOTER_LEN_EXCLUDE_FILENAME: usize = 46 + 22;

const FILE_NAME_IN_ZIP_MAX_LEN: usize = 0xFF00;
const ZIP_UNCOMPRESSED_MAX_LEN: u64 = 0xFFFF_0000;
const ZIP_COMPRESSED_MAX_LEN: u64 = 0xFFFF_0000;

/// Which encoder backs the ZIP entry's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Deflate,
    Lzma,
}

impl Method {
    fn code(self) -> u8 {
        match self {
            Method::Deflate => 0x08,
            Method::Lzma => 0x0E,
        }
    }
}

/// Strips any directory prefix from `name` (the last component after `/`
/// or `\`), matching the expectation that ZIP entries store bare file
/// names rather than caller-supplied paths.
fn sanitize_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn write_local_header(
    dst: &mut [u8],
    crc: u32,
    compressed_len: u64,
    uncompressed_len: u64,
    file_name: &str,
    method: Method,
) -> Result<usize> {
    let file_name = file_name.as_bytes();
    if file_name.len() > FILE_NAME_IN_ZIP_MAX_LEN {
        return Err(CodecError::Unsupported("zip file name too long"));
    }
    if uncompressed_len > ZIP_UNCOMPRESSED_MAX_LEN || compressed_len > ZIP_COMPRESSED_MAX_LEN {
        return Err(CodecError::Unsupported("zip entry exceeds 32-bit size (no ZIP64)"));
    }
    let total = ZIP_HEADER_LEN_EXCLUDE_FILENAME + file_name.len();
    if dst.len() < total {
        return Err(CodecError::DstOverflow);
    }

    dst[0..4].copy_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
    dst[4..6].copy_from_slice(&[0x3F, 0x00]);
    dst[6..8].copy_from_slice(&[0x00, 0x00]);
    dst[8] = method.code();
    dst[9] = 0x00;
    dst[10..14].copy_from_slice(&[0, 0, 0, 0]); // mtime, mdate
    dst[14..18].copy_from_slice(&crc.to_le_bytes());
    dst[18..22].copy_from_slice(&(compressed_len as u32).to_le_bytes());
    dst[22..26].copy_from_slice(&(uncompressed_len as u32).to_le_bytes());
    dst[26..28].copy_from_slice(&(file_name.len() as u16).to_le_bytes());
    dst[28..30].copy_from_slice(&[0, 0]);
    dst[30..total].copy_from_slice(file_name);
    Ok(total)
}

fn write_footer(
    dst: &mut [u8],
    crc: u32,
    compressed_len: u64,
    uncompressed_len: u64,
    file_name: &str,
    local_header_offset: u64,
    method: Method,
) -> Result<usize> {
    let file_name = file_name.as_bytes();
    let total = ZIP_FOOTER_LEN_EXCLUDE_FILENAME + file_name.len();
    if dst.len() < total {
        return Err(CodecError::DstOverflow);
    }

    // Central Directory File Header.
    dst[0..4].copy_from_slice(&[0x50, 0x4B, 0x01, 0x02]);
    dst[4..6].copy_from_slice(&[0x1E, 0x03]);
    dst[6..8].copy_from_slice(&[0x3F, 0x00]);
    dst[8..10].copy_from_slice(&[0x00, 0x00]);
    dst[10] = method.code();
    dst[11] = 0x00;
    dst[12..16].copy_from_slice(&[0, 0, 0, 0]); // mtime, mdate
    dst[16..20].copy_from_slice(&crc.to_le_bytes());
    dst[20..24].copy_from_slice(&(compressed_len as u32).to_le_bytes());
    dst[24..28].copy_from_slice(&(uncompressed_len as u32).to_le_bytes());
    dst[28..30].copy_from_slice(&(file_name.len() as u16).to_le_bytes());
    dst[30..32].copy_from_slice(&[0, 0]); // extra field length
    dst[32..34].copy_from_slice(&[0, 0]); // comment length
    dst[34..36].copy_from_slice(&[0, 0]); // disk number
    dst[36..38].copy_from_slice(&[0, 0]); // internal attrs
    dst[38..42].copy_from_slice(&[0, 0, 0, 0]); // external attrs
    dst[42..46].copy_from_slice(&(local_header_offset as u32).to_le_bytes());
    dst[46..46 + file_name.len()].copy_from_slice(file_name);

    let cd_pos = 46 + file_name.len();
    let cd_size = (46 + file_name.len()) as u32;
    let cd_offset = local_header_offset as u32;

    // End of Central Directory Record.
    dst[cd_pos..cd_pos + 4].copy_from_slice(&[0x50, 0x4B, 0x05, 0x06]);
    dst[cd_pos + 4..cd_pos + 8].copy_from_slice(&[0, 0, 0, 0]); // disk numbers
    dst[cd_pos + 8..cd_pos + 10].copy_from_slice(&1u16.to_le_bytes());
    dst[cd_pos + 10..cd_pos + 12].copy_from_slice(&1u16.to_le_bytes());
    dst[cd_pos + 12..cd_pos + 16].copy_from_slice(&cd_size.to_le_bytes());
    dst[cd_pos + 16..cd_pos + 20].copy_from_slice(&cd_offset.to_le_bytes());
    dst[cd_pos + 20..cd_pos + 22].copy_from_slice(&[0, 0]); // comment length

    Ok(total)
}

/// Writes a minimal single-file ZIP archive containing `src`, compressed
/// with `method`, stored under `file_name` (directory components
/// stripped). Returns the total number of bytes written to `dst`.
///
/// Two-pass: the Local File Header is written once with CRC/sizes as
/// placeholder zero, then rewritten with the real values once the payload
/// size is known — mirroring the source's own `writeZipHeader` being
/// called before and after compression.
pub fn write(src: &[u8], dst: &mut [u8], file_name: &str, method: Method) -> Result<usize> {
    let file_name = sanitize_file_name(file_name);

    let hdr_len = write_local_header(dst, 0, 0, src.len() as u64, file_name, method)?;

    let lzma_prop_len = if method == Method::Lzma {
        lzma::write_zip_lzma_property(&mut dst[hdr_len..])?
    } else {
        0
    };
    let payload_start = hdr_len + lzma_prop_len;

    let payload_len = match method {
        Method::Lzma => lzma::encoder::encode(src, &mut dst[payload_start..])?,
        Method::Deflate => deflate::encode(src, &mut dst[payload_start..])?,
    };

    let compressed_len = (lzma_prop_len + payload_len) as u64;
    if compressed_len > ZIP_COMPRESSED_MAX_LEN {
        return Err(CodecError::Unsupported("zip compressed payload exceeds 32-bit size"));
    }

    let crc = crc32(src);
    let footer_start = payload_start + payload_len;
    let footer_len = write_footer(&mut dst[footer_start..], crc, compressed_len, src.len() as u64, file_name, (hdr_len as u64) + compressed_len, method)?;

    write_local_header(dst, crc, compressed_len, src.len() as u64, file_name, method)?;

    log::debug!("zip: wrote entry {file_name:?} ({} -> {compressed_len} bytes, method {:?})", src.len(), method);
    Ok(footer_start + footer_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_directory_prefix_is_stripped() {
        assert_eq!(sanitize_file_name("a/b/c.txt"), "c.txt");
        assert_eq!(sanitize_file_name("c:\\a\\b.txt"), "b.txt");
        assert_eq!(sanitize_file_name("bare.txt"), "bare.txt");
    }

    #[test]
    fn deflate_entry_has_expected_signatures() {
        let src = b"hello world, hello world, hello world";
        let mut dst = vec![0u8; src.len() * 2 + 512];
        let n = write(src, &mut dst, "hello.txt", Method::Deflate).unwrap();
        assert_eq!(&dst[0..4], &[0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(dst[8], 0x08);

        let cd_pos = dst[..n].windows(4).position(|w| w == [0x50, 0x4B, 0x01, 0x02]).unwrap();
        assert_eq!(dst[cd_pos + 10], 0x08);
        let eocd_pos = dst[..n].windows(4).position(|w| w == [0x50, 0x4B, 0x05, 0x06]).unwrap();
        assert!(eocd_pos > cd_pos);
    }

    #[test]
    fn lzma_entry_includes_property_block() {
        let src = b"the quick brown fox jumps over the lazy dog";
        let mut dst = vec![0u8; src.len() * 2 + 512];
        let n = write(src, &mut dst, "f.bin", Method::Lzma).unwrap();
        assert_eq!(dst[8], 0x0E);
        // LZMA property block sits right after the 30-byte header + "f.bin".
        let prop_start = 30 + "f.bin".len();
        assert_eq!(&dst[prop_start..prop_start + 4], &[0x10, 0x02, 0x05, 0x00]);
        let _ = n;
    }

    #[test]
    fn name_too_long_is_unsupported() {
        let name = "a".repeat(FILE_NAME_IN_ZIP_MAX_LEN + 1);
        let mut dst = vec![0u8; 1024];
        assert_eq!(write(b"x", &mut dst, &name, Method::Deflate), Err(CodecError::Unsupported("zip file name too long")));
    }
}
