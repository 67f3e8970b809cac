//! Lexical document-type classification.

use std::sync::LazyLock;

use regex::Regex;

static LEGAL_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:attorneys?|plaintiffs?|defendants?|demand(?:s|ed|ing)?|settlement|compliance)\b",
    )
    .expect("legal terms pattern should compile")
});

// "ADA" is matched case-sensitively so "ada" in ordinary words never counts.
static ADA_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bADA\b").expect("ADA pattern should compile"));

static MEDICAL_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:patients?|diagnos(?:is|es|ed)|prescriptions?)\b")
        .expect("medical terms pattern should compile")
});

static FINANCIAL_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:invoices?|balance[ \t]+due|payments?)\b")
        .expect("financial terms pattern should compile")
});

static DEMAND_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdemand(?:[ \t]+letter)?\b").expect("demand pattern should compile")
});

static COMPLAINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcomplaint\b").expect("complaint pattern should compile"));

static SETTLEMENT_AGREEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsettlement[ \t]+agreement\b")
        .expect("settlement agreement pattern should compile")
});

static ACCESSIBILITY_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:WCAG|accessib(?:le|ility)|screen[ \t]+readers?|Section[ \t]+508)\b|\bADA\b")
        .expect("accessibility pattern should compile")
});

/// Sub-kinds of legal documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalKind {
    DemandLetter,
    Complaint,
    SettlementAgreement,
    Notice,
}

/// Coarse document categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Legal(LegalKind),
    Medical,
    Financial,
    General,
}

impl DocumentKind {
    /// The `documentType` label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Legal(LegalKind::DemandLetter) => "Demand Letter",
            Self::Legal(LegalKind::Complaint) => "Legal Complaint",
            Self::Legal(LegalKind::SettlementAgreement) => "Settlement Agreement",
            Self::Legal(LegalKind::Notice) => "Legal Notice",
            Self::Medical => "Medical Document",
            Self::Financial => "Financial Document",
            Self::General => "General Document",
        }
    }

    pub fn is_legal(&self) -> bool {
        matches!(self, Self::Legal(_))
    }
}

/// Classify a document by keyword buckets: legal, then medical, then
/// financial, else general.
pub fn classify_document(text: &str) -> DocumentKind {
    if LEGAL_TERMS.is_match(text) || ADA_TERM.is_match(text) {
        return DocumentKind::Legal(legal_kind(text));
    }
    if MEDICAL_TERMS.is_match(text) {
        return DocumentKind::Medical;
    }
    if FINANCIAL_TERMS.is_match(text) {
        return DocumentKind::Financial;
    }
    DocumentKind::General
}

/// Second pass within the legal bucket.
fn legal_kind(text: &str) -> LegalKind {
    if SETTLEMENT_AGREEMENT.is_match(text) {
        LegalKind::SettlementAgreement
    } else if DEMAND_LETTER.is_match(text) {
        LegalKind::DemandLetter
    } else if COMPLAINT.is_match(text) {
        LegalKind::Complaint
    } else {
        LegalKind::Notice
    }
}

/// Whether the document raises web or physical accessibility claims.
pub fn mentions_accessibility(text: &str) -> bool {
    ACCESSIBILITY_TERMS.is_match(text)
}

/// Whether a `documentType` label (from either path) names a legal document.
pub fn is_legal_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    ["legal", "demand", "complaint", "settlement", "summons", "lawsuit", "notice"]
        .iter()
        .any(|k| lower.contains(k))
}
