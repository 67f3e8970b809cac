//! Domain field extraction for legal letters.
//!
//! Every field has an ordered [`RuleSet`]; the first accepted match wins and
//! is scored by [`super::confidence`]. Absence of a match is `None`.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Captures;

use super::confidence::DocumentTokens;
use super::rules::{group_text, ExtractContext, RuleMatch, RuleSet};
use crate::models::{ExtractedField, ExtractedFields};

/// Tokens that end a captured name rather than belong to it.
const ROLE_WORDS: &[&str] = &[
    "Attorney", "Attorneys", "Counsel", "Esq", "Esquire", "Plaintiff", "Plaintiffs", "Defendant",
    "Defendants", "Law", "Legal", "Firm", "Re", "Case", "Court", "Dated", "Date",
];

/// Tokens that never appear in a person's name.
const NON_NAME_WORDS: &[&str] = &[
    "The", "Dear", "This", "That", "Our", "Your", "Notice", "Demand", "Letter", "Settlement",
    "Agreement", "United", "States", "District", "County", "Superior", "Section", "Title",
    "Complaint", "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December", "Inc", "Corp", "LLC", "LLP",
];

static PLAINTIFF_RULES: LazyLock<RuleSet<String>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"(?:[Pp]laintiff|PLAINTIFF)(?:'s[ \t]+name)?[ \t]*[:\-][ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2})",
            person_name,
        ),
        (
            r"(?:[Oo]n[ \t]+behalf[ \t]+of|[Rr]epresent(?:s|ing)?)[ \t]+(?:(?:our|my)[ \t]+client,?[ \t]+)?([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2})",
            person_name,
        ),
        (
            r"([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2}),?[ \t]+\(?(?:the[ \t]+)?[Pp]laintiff",
            person_name,
        ),
    ])
});

static ATTORNEY_RULES: LazyLock<RuleSet<String>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"(?:[Aa]ttorney|ATTORNEY|[Cc]ounsel|COUNSEL)(?:[ \t]+for[ \t]+[Pp]laintiffs?)?[ \t]*[:\-][ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2})",
            person_name,
        ),
        (
            r"([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2}),?[ \t]+(?:Esq\.?|Esquire)",
            person_name,
        ),
        (
            r"(?:[Aa]ttorney|[Cc]ounsel)[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2})",
            person_name,
        ),
        (
            r"(?:Sincerely|Respectfully(?:[ \t]+submitted)?|Regards),?[ \t]*\n+[ \t]*(?:/s/[ \t]*)?([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'\-]+){1,2})",
            person_name,
        ),
    ])
});

static FIRM_RULES: LazyLock<RuleSet<String>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"((?:Law[ \t]+Offices?|Law[ \t]+Firm)[ \t]+of[ \t]+[A-Z][A-Za-z'\-]+(?:[ \t]+[A-Z][A-Za-z'\-.]+){0,3})",
            firm_name,
        ),
        (
            r"([A-Z][A-Za-z'\-]+(?:(?:,?[ \t]+|[ \t]+&[ \t]+|[ \t]+and[ \t]+)[A-Z][A-Za-z'\-]+)*,?[ \t]+(?:Law[ \t]+(?:Firm|Group|Offices?)\b|LLP\b|PLLC\b|LLC\b|P\.C\.|PC\b))",
            firm_name,
        ),
    ])
});

static CASE_NUMBER_RULES: LazyLock<RuleSet<String>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"(?i:case|civil[ \t]+action|docket)[ \t]*(?i:no\.?|number|#)[ \t]*:?[ \t]*([A-Za-z0-9][A-Za-z0-9:\-./]*\d[A-Za-z0-9\-]*)",
            group_text,
        ),
        (
            r"\b(\d{1,2}:\d{2}-[a-zA-Z]{2,4}-\d{3,6}(?:-[A-Z]{2,4})*)\b",
            group_text,
        ),
    ])
});

static COURT_RULES: LazyLock<RuleSet<String>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"((?:United[ \t]+States[ \t]+)?District[ \t]+Court[ \t]+(?:for|of)[ \t]+the[ \t]+[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*(?:[ \t]+of[ \t]+[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)?)",
            group_text,
        ),
        (
            r"((?:Superior|Circuit|Supreme|County|Municipal|Family)[ \t]+Court[ \t]+(?:of|for|in)[ \t]+(?:the[ \t]+)?[A-Z][a-z]+(?:[ \t]+(?:of[ \t]+)?[A-Z][a-z]+)*)",
            group_text,
        ),
        (
            r"([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?[ \t]+County[ \t]+(?:Superior|Circuit|District|Municipal)[ \t]+Court)",
            group_text,
        ),
    ])
});

static FILING_DATE_RULES: LazyLock<RuleSet<NaiveDate>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"\b(?i:filed|filing[ \t]+date|date[ \t]+filed)\b[ \t]*(?i:on)?[ \t]*:?[ \t]*((?:January|February|March|April|May|June|July|August|September|October|November|December)[ \t]+\d{1,2},?[ \t]+\d{4})",
            absolute_date,
        ),
        (
            r"\b(?i:filed|filing[ \t]+date|date[ \t]+filed)\b[ \t]*(?i:on)?[ \t]*:?[ \t]*(\d{1,2}/\d{1,2}/\d{4})",
            absolute_date,
        ),
        (
            r"\b(?i:dated?)\b[ \t]*:?[ \t]*((?:January|February|March|April|May|June|July|August|September|October|November|December)[ \t]+\d{1,2},?[ \t]+\d{4})",
            absolute_date,
        ),
    ])
});

static DEADLINE_RULES: LazyLock<RuleSet<NaiveDate>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"\b(?i:respond|response|reply|deadline|due|no[ \t]+later[ \t]+than|on[ \t]+or[ \t]+before)\b[^.\n]{0,40}?((?:January|February|March|April|May|June|July|August|September|October|November|December)[ \t]+\d{1,2},?[ \t]+\d{4})",
            absolute_date,
        ),
        (
            r"\b(?i:respond|response|reply|deadline|due|no[ \t]+later[ \t]+than|on[ \t]+or[ \t]+before)\b[^.\n]{0,40}?(\d{1,2}/\d{1,2}/\d{4})",
            absolute_date,
        ),
        (
            r"\b(?i:within)[ \t]+(\d{1,3})[ \t]+(?i:(calendar|business)[ \t]+)?(?i:days?)\b",
            relative_days,
        ),
        (
            r"\b(?i:within)[ \t]+(?i)(seven|ten|fourteen|fifteen|twenty|twenty-one|thirty|forty-five|sixty|ninety)(?:[ \t]*\(\d{1,3}\))?[ \t]+(?:(calendar|business)[ \t]+)?days?\b",
            relative_word_days,
        ),
    ])
});

static AMOUNT_RULES: LazyLock<RuleSet<f64>> = LazyLock::new(|| {
    RuleSet::new(&[
        (
            r"(?i:settle(?:ment)?|demand(?:s|ing)?|sum|amount|compensation|damages|pay(?:ment)?)[^$\n]{0,40}?\$[ \t]?(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)",
            amount,
        ),
        (
            r"\$[ \t]?(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)",
            amount,
        ),
    ])
});

/// Run every field's rule set over `text`.
pub fn extract_fields(text: &str, ctx: &ExtractContext) -> ExtractedFields {
    let tokens = DocumentTokens::from_text(text);
    let scored = |m: Option<RuleMatch<String>>| {
        m.map(|m| {
            let confidence = m.confidence(&tokens);
            ExtractedField::regex(m.value, confidence)
        })
    };

    ExtractedFields {
        plaintiff_name: scored(PLAINTIFF_RULES.first_match(text, ctx)),
        attorney_name: scored(ATTORNEY_RULES.first_match(text, ctx)),
        attorney_firm: scored(FIRM_RULES.first_match(text, ctx)),
        case_number: scored(CASE_NUMBER_RULES.first_match(text, ctx)),
        court_name: scored(COURT_RULES.first_match(text, ctx)),
        filing_date: FILING_DATE_RULES
            .first_match(text, ctx)
            .map(|m| ExtractedField::regex(m.value, m.confidence(&tokens))),
        response_deadline: DEADLINE_RULES
            .first_match(text, ctx)
            .map(|m| ExtractedField::regex(m.value, m.confidence(&tokens))),
        settlement_amount: AMOUNT_RULES
            .first_match(text, ctx)
            .map(|m| ExtractedField::regex(m.value, m.confidence(&tokens))),
    }
}

/// Clean a captured person name: drop trailing role words, reject
/// captures containing words that never belong to a name.
pub fn clean_person_name(raw: &str) -> Option<String> {
    let mut tokens: Vec<&str> = raw
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c == ',' || c == ';'))
        .collect();

    while let Some(last) = tokens.last() {
        if ROLE_WORDS.contains(&last.trim_end_matches('.')) {
            tokens.pop();
        } else {
            break;
        }
    }

    if tokens.len() < 2 || tokens.len() > 4 {
        return None;
    }
    if tokens
        .iter()
        .any(|t| NON_NAME_WORDS.contains(t) || ROLE_WORDS.contains(&t.trim_end_matches('.')))
    {
        return None;
    }
    Some(tokens.join(" "))
}

fn person_name(caps: &Captures<'_>, _ctx: &ExtractContext) -> Option<String> {
    clean_person_name(caps.get(1)?.as_str())
}

fn firm_name(caps: &Captures<'_>, _ctx: &ExtractContext) -> Option<String> {
    let raw = caps.get(1)?.as_str();
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    // Sentence-initial words are not part of a firm's name.
    while tokens.len() > 2 && matches!(tokens[0], "Dear" | "The" | "To" | "Re" | "From" | "Contact") {
        tokens.remove(0);
    }
    let name = tokens.join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn absolute_date(caps: &Captures<'_>, _ctx: &ExtractContext) -> Option<NaiveDate> {
    parse_date_text(caps.get(1)?.as_str())
}

fn relative_days(caps: &Captures<'_>, ctx: &ExtractContext) -> Option<NaiveDate> {
    let days: u64 = caps.get(1)?.as_str().parse().ok()?;
    offset_days(ctx.today, days, counts_business_days(caps))
}

fn relative_word_days(caps: &Captures<'_>, ctx: &ExtractContext) -> Option<NaiveDate> {
    let days = match caps.get(1)?.as_str().to_lowercase().as_str() {
        "seven" => 7,
        "ten" => 10,
        "fourteen" => 14,
        "fifteen" => 15,
        "twenty" => 20,
        "twenty-one" => 21,
        "thirty" => 30,
        "forty-five" => 45,
        "sixty" => 60,
        "ninety" => 90,
        _ => return None,
    };
    offset_days(ctx.today, days, counts_business_days(caps))
}

/// Whether the optional day-kind capture (group 2) says "business".
fn counts_business_days(caps: &Captures<'_>) -> bool {
    caps.get(2)
        .is_some_and(|kind| kind.as_str().eq_ignore_ascii_case("business"))
}

/// `days` after `start`; business days skip Saturdays and Sundays.
fn offset_days(start: NaiveDate, days: u64, business: bool) -> Option<NaiveDate> {
    if !business {
        return start.checked_add_days(Days::new(days));
    }
    let mut date = start;
    let mut counted = 0;
    while counted < days {
        date = date.succ_opt()?;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            counted += 1;
        }
    }
    Some(date)
}

fn amount(caps: &Captures<'_>, _ctx: &ExtractContext) -> Option<f64> {
    parse_amount(caps.get(1)?.as_str())
}

/// Parse "15,000.00" style amounts (thousands separators stripped).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Parse "March 5, 2025", "March 5 2025", "03/05/2025" or "2025-03-05".
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ,", ",");

    const FORMATS: [&str; 5] = ["%B %d, %Y", "%B %d %Y", "%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}
