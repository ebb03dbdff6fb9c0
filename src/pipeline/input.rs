//! Input validation: decide whether a file is something Ghostscript can
//! rasterise before we ever build a command line for it.
//!
//! Detection is pluggable through [`MimeSniffer`]. The default,
//! [`MagicSniffer`], reads the first few bytes of the file and recognises
//! PDF, PostScript and EPS by their signatures. [`NoSniffer`] reports
//! detection as unavailable, in which case any file is accepted unchecked.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// MIME types accepted as render input.
pub const SUPPORTED_MIME_TYPES: &[&str] = &["application/eps", "application/pdf", "application/ps"];

/// Bytes read from the head of a file for signature matching.
const SNIFF_LEN: usize = 64;

/// DOS EPS binary header (`C5 D0 D3 C6`), used by EPS files with a
/// TIFF/WMF preview.
const DOS_EPS_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];

/// Detects the MIME type of a file.
///
/// `Ok(None)` means "detection unavailable": the caller accepts the file
/// without checking.
pub trait MimeSniffer: Send + Sync {
    fn sniff(&self, path: &Path) -> io::Result<Option<String>>;
}

/// Signature-based detection from the leading bytes of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl MimeSniffer for MagicSniffer {
    fn sniff(&self, path: &Path) -> io::Result<Option<String>> {
        let mut head = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)?;
        let mime = mime_from_magic(&head);
        debug!("Sniffed {} as {}", path.display(), mime);
        Ok(Some(mime.to_string()))
    }
}

/// Detection disabled; every file is accepted unchecked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSniffer;

impl MimeSniffer for NoSniffer {
    fn sniff(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Check whether a MIME type is one of [`SUPPORTED_MIME_TYPES`].
pub fn is_supported(mime: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime)
}

/// Map leading file bytes to a MIME type.
pub fn mime_from_magic(head: &[u8]) -> &'static str {
    if head.starts_with(b"%PDF") {
        "application/pdf"
    } else if head.starts_with(&DOS_EPS_MAGIC) || is_eps_header(head) {
        "application/eps"
    } else if head.starts_with(b"%!") {
        "application/ps"
    } else {
        "application/octet-stream"
    }
}

/// `%!PS-Adobe-3.0 EPSF-3.0` and friends: a PostScript header whose first
/// line declares EPSF conformance.
fn is_eps_header(head: &[u8]) -> bool {
    if !head.starts_with(b"%!PS-Adobe-") {
        return false;
    }
    let first_line = head
        .split(|&b| b == b'\n' || b == b'\r')
        .next()
        .unwrap_or_default();
    first_line.windows(4).any(|w| w == b"EPSF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic() {
        assert_eq!(mime_from_magic(b"%PDF-1.7\n%\xe2\xe3"), "application/pdf");
    }

    #[test]
    fn postscript_magic() {
        assert_eq!(mime_from_magic(b"%!PS-Adobe-3.0\n%%Title"), "application/ps");
        assert_eq!(mime_from_magic(b"%!\n/Times findfont"), "application/ps");
    }

    #[test]
    fn eps_magic() {
        assert_eq!(
            mime_from_magic(b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 10 10"),
            "application/eps"
        );
        assert_eq!(
            mime_from_magic(&[0xC5, 0xD0, 0xD3, 0xC6, 0x1E, 0x00]),
            "application/eps"
        );
    }

    #[test]
    fn eps_marker_on_later_line_is_plain_ps() {
        assert_eq!(
            mime_from_magic(b"%!PS-Adobe-3.0\n% not EPSF\n"),
            "application/ps"
        );
    }

    #[test]
    fn unknown_bytes() {
        assert_eq!(mime_from_magic(b"\x89PNG\r\n"), "application/octet-stream");
        assert_eq!(mime_from_magic(b""), "application/octet-stream");
    }

    #[test]
    fn supported_set() {
        assert!(is_supported("application/pdf"));
        assert!(is_supported("application/eps"));
        assert!(is_supported("application/ps"));
        assert!(!is_supported("application/postscript"));
        assert!(!is_supported("image/png"));
    }

    #[test]
    fn magic_sniffer_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();
        assert_eq!(
            MagicSniffer.sniff(&path).unwrap().as_deref(),
            Some("application/pdf")
        );
    }

    #[test]
    fn magic_sniffer_missing_file_is_io_error() {
        assert!(MagicSniffer.sniff(Path::new("/no/such/file.pdf")).is_err());
    }

    #[test]
    fn no_sniffer_is_unavailable() {
        assert_eq!(NoSniffer.sniff(Path::new("/anything")).unwrap(), None);
    }
}
