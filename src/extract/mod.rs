//! Plaintext recovery from uploaded bytes.
//!
//! - `pdf_text`: heuristic scanner for uncompressed PDF content streams
//! - `decode_text`: lossy UTF-8 decoding for text uploads

pub mod pdf_text;

pub use pdf_text::{extract_pdf_text, scan_pdf, PdfScan, MIN_RELIABLE_CHARS};

/// Decode a text upload, replacing invalid UTF-8 and dropping a leading BOM.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_handles_bom_and_crlf() {
        let bytes = b"\xef\xbb\xbfDear Sir,\r\nPay now.";
        assert_eq!(decode_text(bytes), "Dear Sir,\nPay now.");
    }

    #[test]
    fn test_decode_text_is_lossy() {
        let decoded = decode_text(b"ok \xff done");
        assert!(decoded.starts_with("ok "));
        assert!(decoded.ends_with(" done"));
    }
}
