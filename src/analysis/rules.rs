//! Ordered "first match wins" pattern rules.
//!
//! Each field owns a [`RuleSet`]: a list of (pattern, extractor) pairs tried
//! in order, most specific first. A rule whose extractor rejects a capture
//! moves on to the rule's next capture, then to the next rule.

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::confidence::{score_pattern, DocumentTokens};

/// Inputs every extractor may consult besides the captures.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext {
    /// Date relative deadlines are resolved against.
    pub today: NaiveDate,
}

/// Turns a capture into a typed value, or rejects it.
pub type Extractor<T> = fn(&Captures<'_>, &ExtractContext) -> Option<T>;

/// One compiled pattern with its extractor.
pub struct FieldRule<T> {
    pattern: &'static str,
    regex: Regex,
    extract: Extractor<T>,
}

impl<T> FieldRule<T> {
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }
}

/// A value produced by a rule, with the pattern that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<T> {
    pub value: T,
    pub pattern: &'static str,
}

impl<T> RuleMatch<T> {
    /// Confidence of this match in a document with `tokens`.
    pub fn confidence(&self, tokens: &DocumentTokens) -> f32 {
        score_pattern(self.pattern, tokens)
    }
}

/// Ordered list of rules for one field.
pub struct RuleSet<T> {
    rules: Vec<FieldRule<T>>,
}

impl<T> RuleSet<T> {
    /// Compile the given (pattern, extractor) pairs, in priority order.
    ///
    /// Patterns are compile-time constants; a pattern that fails to compile
    /// is a programming error.
    pub fn new(rules: &[(&'static str, Extractor<T>)]) -> Self {
        let rules = rules
            .iter()
            .map(|&(pattern, extract)| FieldRule {
                pattern,
                regex: Regex::new(pattern).expect("field pattern should compile"),
                extract,
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule<T>] {
        &self.rules
    }

    /// Evaluate the rules in order and return the first accepted value.
    pub fn first_match(&self, text: &str, ctx: &ExtractContext) -> Option<RuleMatch<T>> {
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                if let Some(value) = (rule.extract)(&caps, ctx) {
                    return Some(RuleMatch {
                        value,
                        pattern: rule.pattern,
                    });
                }
            }
        }
        None
    }
}

/// Extractor returning capture group 1, trimmed.
pub fn group_text(caps: &Captures<'_>, _ctx: &ExtractContext) -> Option<String> {
    let text = caps.get(1)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExtractContext {
        ExtractContext {
            today: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    fn reject_short(caps: &Captures<'_>, ctx: &ExtractContext) -> Option<String> {
        group_text(caps, ctx).filter(|s| s.len() > 3)
    }

    #[test]
    fn test_first_rule_wins() {
        let rules: RuleSet<String> = RuleSet::new(&[
            (r"Name:\s*(\w+)", group_text),
            (r"(\w+) wrote", group_text),
        ]);
        let m = rules.first_match("Alice wrote. Name: Bob", &ctx()).unwrap();
        assert_eq!(m.value, "Bob");
        assert_eq!(m.pattern, r"Name:\s*(\w+)");
    }

    #[test]
    fn test_rejected_capture_tries_next_capture_then_rule() {
        let rules: RuleSet<String> = RuleSet::new(&[
            (r"Name:\s*(\w+)", reject_short),
            (r"(\w+) wrote", group_text),
        ]);
        let m = rules
            .first_match("Name: Al. Name: Alfred", &ctx())
            .unwrap();
        assert_eq!(m.value, "Alfred");

        let m = rules.first_match("Name: Al. Carol wrote", &ctx()).unwrap();
        assert_eq!(m.value, "Carol");
    }

    #[test]
    fn test_no_match_is_none() {
        let rules: RuleSet<String> = RuleSet::new(&[(r"Name:\s*(\w+)", group_text)]);
        assert!(rules.first_match("nothing here", &ctx()).is_none());
    }
}
