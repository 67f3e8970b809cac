//! Heuristic text recovery from raw PDF bytes.
//!
//! This is a token scanner, not a PDF parser. It walks every
//! `stream ... endstream` region, pulls out `[...] TJ` show-text arrays and
//! bare `(...)` literal strings, and stitches the fragments together.
//! Flate-compressed content streams are opaque to it, so most real-world
//! PDFs come back empty and callers must fall back to vision analysis.

use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::debug;

/// Below this many characters the extraction is treated as a failure.
pub const MIN_RELIABLE_CHARS: usize = 100;

static STREAM_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)stream\r?\n?(.*?)endstream").expect("stream pattern should compile")
});

static TJ_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)\[((?:[^\]\\]|\\.)*)\]\s*TJ").expect("TJ pattern should compile")
});

// Literals may hold one level of balanced, unescaped parentheses.
static LITERAL_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)\(((?:[^()\\]|\\.|\((?:[^()\\]|\\.)*\))*)\)")
        .expect("literal pattern should compile")
});

/// Statistics about one extraction run, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfScan {
    /// Cleaned text (not yet subject to the reliability threshold).
    pub text: String,
    /// Number of `stream ... endstream` regions seen.
    pub streams: usize,
    /// Number of text fragments recovered.
    pub fragments: usize,
}

impl PdfScan {
    /// Whether the recovered text is long enough to trust.
    pub fn is_reliable(&self) -> bool {
        self.text.chars().count() >= MIN_RELIABLE_CHARS
    }
}

/// Extract visible text from PDF bytes.
///
/// Returns an empty string when fewer than [`MIN_RELIABLE_CHARS`] printable
/// characters could be recovered; a short result is a failure signal, not a
/// partial success.
pub fn extract_pdf_text(bytes: &[u8]) -> String {
    let scan = scan_pdf(bytes);
    if scan.is_reliable() {
        scan.text
    } else {
        debug!(
            "PDF text extraction unreliable: {} chars from {} streams",
            scan.text.len(),
            scan.streams
        );
        String::new()
    }
}

/// Run the scanner and report what it found without applying the threshold.
pub fn scan_pdf(bytes: &[u8]) -> PdfScan {
    let mut fragments: Vec<Vec<u8>> = Vec::new();
    let mut streams = 0;

    for caps in STREAM_REGION.captures_iter(bytes) {
        let Some(body) = caps.get(1) else {
            continue;
        };
        streams += 1;
        collect_stream_fragments(body.as_bytes(), &mut fragments);
    }

    let fragment_count = fragments.iter().filter(|f| !f.is_empty()).count();
    let joined = fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.as_slice())
        .collect::<Vec<_>>()
        .join(&b' ');

    PdfScan {
        text: clean_text(&joined),
        streams,
        fragments: fragment_count,
    }
}

/// Pull text fragments out of one content stream, in stream order.
///
/// A `TJ` array contributes one fragment (its strings concatenated, kerning
/// numbers dropped). Literal strings outside any `TJ` array each contribute
/// their own fragment.
fn collect_stream_fragments(body: &[u8], fragments: &mut Vec<Vec<u8>>) {
    let mut found: Vec<(usize, Vec<u8>)> = Vec::new();
    let mut tj_spans: Vec<Range<usize>> = Vec::new();

    for caps in TJ_ARRAY.captures_iter(body) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let mut text = Vec::new();
        for lit in LITERAL_STRING.captures_iter(inner.as_bytes()) {
            if let Some(content) = lit.get(1) {
                text.extend(unescape_literal(content.as_bytes()));
            }
        }
        tj_spans.push(whole.range());
        found.push((whole.start(), text));
    }

    for lit in LITERAL_STRING.captures_iter(body) {
        let (Some(whole), Some(content)) = (lit.get(0), lit.get(1)) else {
            continue;
        };
        let inside_tj = tj_spans
            .iter()
            .any(|span| span.start <= whole.start() && whole.end() <= span.end);
        if !inside_tj {
            found.push((whole.start(), unescape_literal(content.as_bytes())));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    fragments.extend(found.into_iter().map(|(_, text)| text));
}

/// Resolve the backslash escapes of a PDF literal string.
///
/// `\n \r \t \( \) \\` map to their characters; any other escaped byte is
/// kept as-is without the backslash.
fn unescape_literal(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut iter = raw.iter().copied();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Drop bytes outside printable ASCII (plus CR, LF, tab) and collapse whitespace.
fn clean_text(raw: &[u8]) -> String {
    let printable: String = raw
        .iter()
        .copied()
        .filter(|b| (0x20..=0x7E).contains(b) || matches!(b, b'\n' | b'\r' | b'\t'))
        .map(char::from)
        .collect();

    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_with_stream(content: &str) -> Vec<u8> {
        format!(
            "%PDF-1.4\n1 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n%%EOF",
            content.len(),
            content
        )
        .into_bytes()
    }

    #[test]
    fn test_extracts_literal_strings() {
        let sentence = "Plaintiff John Smith demands payment of the full settlement amount before the deadline expires. Respond today.";
        let pdf = pdf_with_stream(&format!("BT /F1 12 Tf 72 712 Td ({}) Tj ET", sentence));
        assert_eq!(extract_pdf_text(&pdf), sentence);
    }

    #[test]
    fn test_tj_arrays_are_concatenated() {
        let pdf = pdf_with_stream("BT [(Hel) -20 (lo) 15 (, World)] TJ ET");
        let scan = scan_pdf(&pdf);
        assert_eq!(scan.text, "Hello, World");
        assert_eq!(scan.fragments, 1);
    }

    #[test]
    fn test_fragment_order_follows_stream() {
        let pdf = pdf_with_stream("BT (First) Tj [(Sec) (ond)] TJ (Third) Tj ET");
        assert_eq!(scan_pdf(&pdf).text, "First Second Third");
    }

    #[test]
    fn test_unescapes_sequences() {
        let pdf = pdf_with_stream(r"BT (a\(b\)c\\d\te) Tj ET");
        assert_eq!(scan_pdf(&pdf).text, r"a(b)c\d e");
    }

    #[test]
    fn test_balanced_parentheses_stay_in_literal() {
        let pdf = pdf_with_stream(r"BT (a (b) c) Tj [(x \( (y) z)] TJ ET");
        let scan = scan_pdf(&pdf);
        assert_eq!(scan.text, "a (b) c x ( (y) z");
        assert_eq!(scan.fragments, 2);
    }

    #[test]
    fn test_strips_non_printable_and_collapses_whitespace() {
        let mut pdf = b"stream\n(Hi \x01\x02   there\n\n friend) Tj\nendstream".to_vec();
        pdf.extend_from_slice(b"\xff\xfe");
        assert_eq!(scan_pdf(&pdf).text, "Hi there friend");
    }

    #[test]
    fn test_short_output_is_failure() {
        let pdf = pdf_with_stream("BT (Too short) Tj ET");
        let scan = scan_pdf(&pdf);
        assert_eq!(scan.text, "Too short");
        assert!(!scan.is_reliable());
        assert_eq!(extract_pdf_text(&pdf), "");
    }

    #[test]
    fn test_compressed_stream_yields_nothing() {
        let mut pdf = b"%PDF-1.5\n4 0 obj\n<< /Filter /FlateDecode /Length 12 >>\nstream\n".to_vec();
        pdf.extend_from_slice(&[0x78, 0x9c, 0xcb, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x00, 0x06]);
        pdf.extend_from_slice(b"\nendstream\nendobj\n");
        assert_eq!(extract_pdf_text(&pdf), "");
    }

    #[test]
    fn test_text_outside_streams_is_ignored() {
        let pdf = b"%PDF-1.4\n<< /Title (Not body text) >>\n%%EOF";
        let scan = scan_pdf(pdf);
        assert_eq!(scan.streams, 0);
        assert!(scan.text.is_empty());
    }

    #[test]
    fn test_multiple_streams() {
        let mut pdf = pdf_with_stream("BT (Page one) Tj ET");
        pdf.extend(pdf_with_stream("BT (Page two) Tj ET"));
        let scan = scan_pdf(&pdf);
        assert_eq!(scan.streams, 2);
        assert_eq!(scan.text, "Page one Page two");
    }
}
