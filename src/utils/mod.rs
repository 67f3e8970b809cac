//! Shared utility functions.
//!
//! - `mime`: content-kind classification for uploads
//! - `truncate_utf8`: byte-bounded truncation on a char boundary

mod mime;

pub use mime::{classify_content, effective_mime, mime_type_category, ContentKind};

/// Truncate text to at most `max_bytes` bytes without splitting a character.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_utf8_respects_boundaries() {
        assert_eq!(truncate_utf8("hello", 10), "hello");
        assert_eq!(truncate_utf8("hello", 3), "hel");
        // 'é' is two bytes; cutting inside it backs off
        assert_eq!(truncate_utf8("né", 2), "n");
    }
}
