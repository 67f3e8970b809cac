//! Specificity-based confidence for regex-extracted fields.
//!
//! A match starts at [`BASE_CONFIDENCE`]. Patterns anchored on legal
//! context words earn [`CONTEXT_BONUS`] when the document actually uses
//! such words, and patterns that require digits earn [`NUMERIC_BONUS`].
//! This ranks how specific a pattern is; it is not a probability.

use std::collections::HashSet;

pub const BASE_CONFIDENCE: f32 = 0.7;
pub const CONTEXT_BONUS: f32 = 0.2;
pub const NUMERIC_BONUS: f32 = 0.1;

/// Words that make a pattern (and a document) "legal context".
pub const CONTEXT_TERMS: [&str; 5] = ["plaintiff", "attorney", "counsel", "esq", "firm"];

/// Lowercased word tokens of a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentTokens {
    tokens: HashSet<String>,
}

impl DocumentTokens {
    pub fn from_text(text: &str) -> Self {
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Whether any legal context term occurs in the document.
    pub fn has_context_term(&self) -> bool {
        CONTEXT_TERMS.iter().any(|t| self.contains(t))
    }
}

/// Whether the pattern source mentions a legal context term.
///
/// Case classes such as `[Pp]` are folded to a single letter first, so
/// `[Pp]laintiff` counts as "plaintiff".
pub fn references_context(pattern: &str) -> bool {
    let folded = fold_case_classes(pattern);
    CONTEXT_TERMS.iter().any(|t| folded.contains(t))
}

/// Lowercase `pattern`, collapsing two-letter case classes (`[Xx]`).
fn fold_case_classes(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut folded = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' && i + 3 < chars.len() && chars[i + 3] == ']' {
            let (a, b) = (chars[i + 1], chars[i + 2]);
            if a.is_alphabetic() && a != b && a.to_lowercase().eq(b.to_lowercase()) {
                folded.extend(a.to_lowercase());
                i += 4;
                continue;
            }
        }
        folded.extend(chars[i].to_lowercase());
        i += 1;
    }
    folded
}

/// Whether the pattern source contains a numeric digit class.
pub fn has_digit_class(pattern: &str) -> bool {
    pattern.contains(r"\d") || pattern.contains("[0-9]")
}

/// Score a match produced by `pattern` in a document with `tokens`.
pub fn score_pattern(pattern: &str, tokens: &DocumentTokens) -> f32 {
    let mut score = BASE_CONFIDENCE;
    if references_context(pattern) && tokens.has_context_term() {
        score += CONTEXT_BONUS;
    }
    if has_digit_class(pattern) {
        score += NUMERIC_BONUS;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score() {
        let tokens = DocumentTokens::from_text("hello world");
        assert!((score_pattern(r"([A-Z][a-z]+)", &tokens) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_context_bonus_needs_document_term() {
        let pattern = r"[Pp]laintiff:\s*([A-Z][a-z]+)";
        let with_term = DocumentTokens::from_text("The Plaintiff, John Smith");
        let without = DocumentTokens::from_text("John Smith wrote");

        assert!((score_pattern(pattern, &with_term) - 0.9).abs() < 1e-6);
        assert!((score_pattern(pattern, &without) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_numeric_bonus() {
        let tokens = DocumentTokens::from_text("pay now");
        assert!((score_pattern(r"\$(\d+)", &tokens) - 0.8).abs() < 1e-6);
        assert!((score_pattern(r"([0-9]+)", &tokens) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_clamped() {
        let tokens = DocumentTokens::from_text("counsel for plaintiff");
        let score = score_pattern(r"[Cc]ounsel\s+(\d+)", &tokens);
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_case_class_spellings_count_as_context() {
        assert!(references_context(r"[Pp]laintiff"));
        assert!(references_context(r"(?:[Aa]ttorney|[Cc]ounsel)[ \t]+(\w+)"));
        assert!(references_context(r"PLAINTIFF:"));
        assert!(!references_context(r"[Ff]iled[ \t]+on"));
        assert_eq!(fold_case_classes(r"[Pp]laintiff[0-9]"), "plaintiff[0-9]");

        let tokens = DocumentTokens::from_text("Jane Roe, the plaintiff, retained an attorney.");
        let trailing_role = r"([A-Z][a-z]+(?:[ \t]+[A-Z][a-z'\-]+){1,2}),?[ \t]+\(?(?:the[ \t]+)?[Pp]laintiff";
        assert!((score_pattern(trailing_role, &tokens) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_tokenizer_splits_punctuation() {
        let tokens = DocumentTokens::from_text("Jane Doe, Esq.");
        assert!(tokens.contains("esq"));
        assert!(tokens.has_context_term());
    }
}
