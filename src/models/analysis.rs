//! Analysis record models.
//!
//! `DocumentAnalysis` is what both extraction paths (AI and regex) produce.
//! The orchestrator wraps it with `Diagnostics` into the final
//! `AnalysisRecord` handed to persistence and returned to the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where an extracted value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Ai,
    Regex,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Regex => "regex",
        }
    }
}

/// A single extracted value with its confidence and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField<T> {
    pub value: T,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    pub provenance: Provenance,
}

impl<T> ExtractedField<T> {
    /// Create a field, clamping confidence into `[0, 1]`.
    pub fn new(value: T, confidence: f32, provenance: Provenance) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            value,
            confidence,
            provenance,
        }
    }

    pub fn regex(value: T, confidence: f32) -> Self {
        Self::new(value, confidence, Provenance::Regex)
    }

    pub fn ai(value: T, confidence: f32) -> Self {
        Self::new(value, confidence, Provenance::Ai)
    }
}

/// Domain fields pulled out of a legal letter.
///
/// Missing fields are `None` and omitted from the JSON output, so the
/// confidence of every serialized field travels with its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaintiff_name: Option<ExtractedField<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attorney_name: Option<ExtractedField<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attorney_firm: Option<ExtractedField<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<ExtractedField<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_name: Option<ExtractedField<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<ExtractedField<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_deadline: Option<ExtractedField<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_amount: Option<ExtractedField<f64>>,
}

impl ExtractedFields {
    /// Confidence per present field, keyed by wire name.
    pub fn confidences(&self) -> Vec<(&'static str, f32)> {
        let mut out = Vec::new();
        let mut push = |name: &'static str, confidence: Option<f32>| {
            if let Some(c) = confidence {
                out.push((name, c));
            }
        };
        push("plaintiffName", self.plaintiff_name.as_ref().map(|f| f.confidence));
        push("attorneyName", self.attorney_name.as_ref().map(|f| f.confidence));
        push("attorneyFirm", self.attorney_firm.as_ref().map(|f| f.confidence));
        push("caseNumber", self.case_number.as_ref().map(|f| f.confidence));
        push("courtName", self.court_name.as_ref().map(|f| f.confidence));
        push("filingDate", self.filing_date.as_ref().map(|f| f.confidence));
        push(
            "responseDeadline",
            self.response_deadline.as_ref().map(|f| f.confidence),
        );
        push(
            "settlementAmount",
            self.settlement_amount.as_ref().map(|f| f.confidence),
        );
        out
    }

    pub fn is_empty(&self) -> bool {
        self.confidences().is_empty()
    }
}

/// Generic entities recognised anywhere in the document.
///
/// Persons, organizations and citations are sets; dates and amounts keep
/// document order and their original text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBag {
    #[serde(default)]
    pub persons: BTreeSet<String>,
    #[serde(default)]
    pub organizations: BTreeSet<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub amounts: Vec<String>,
    #[serde(default)]
    pub legal_citations: BTreeSet<String>,
}

impl EntityBag {
    pub fn add_person(&mut self, name: &str) {
        insert_trimmed(&mut self.persons, name);
    }

    pub fn add_organization(&mut self, name: &str) {
        insert_trimmed(&mut self.organizations, name);
    }

    pub fn add_citation(&mut self, citation: &str) {
        insert_trimmed(&mut self.legal_citations, citation);
    }

    pub fn push_date(&mut self, date: &str) {
        push_unique(&mut self.dates, date);
    }

    pub fn push_amount(&mut self, amount: &str) {
        push_unique(&mut self.amounts, amount);
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
            && self.organizations.is_empty()
            && self.dates.is_empty()
            && self.amounts.is_empty()
            && self.legal_citations.is_empty()
    }
}

fn insert_trimmed(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

fn push_unique(seq: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !seq.iter().any(|v| v == value) {
        seq.push(value.to_string());
    }
}

/// Optional legal read of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalAssessment {
    pub claim_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statute_of_limitations: Option<String>,
    #[serde(default)]
    pub potential_defenses: Vec<String>,
    pub risk_assessment: String,
}

/// Coarse priority classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "urgent" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which degradation tier produced the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisMethod {
    #[serde(rename = "ai-vision")]
    AiVision,
    #[serde(rename = "ai-pdf")]
    AiPdf,
    #[serde(rename = "ai-text")]
    AiText,
    #[serde(rename = "regex-pdf")]
    RegexPdf,
    #[serde(rename = "regex-text")]
    RegexText,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiVision => "ai-vision",
            Self::AiPdf => "ai-pdf",
            Self::AiText => "ai-text",
            Self::RegexPdf => "regex-pdf",
            Self::RegexText => "regex-text",
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Self::AiVision | Self::AiPdf | Self::AiText)
    }
}

impl std::fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model identifier reported when the regex path served the request.
pub const REGEX_MODEL_ID: &str = "regex";

/// Audit block telling which tier served a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub analysis_method: AnalysisMethod,
    #[serde(rename = "aiModel", alias = "modelUsed")]
    pub model_used: String,
    #[serde(rename = "hasAIConfigured")]
    pub has_ai_configured: bool,
    pub file_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Analysis content produced by either extraction path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub document_type: String,
    pub document_summary: String,
    pub key_points: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub additional_resources: Vec<String>,
    pub extracted_fields: ExtractedFields,
    pub entities: EntityBag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_assessment: Option<LegalAssessment>,
}

/// Root output of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
    pub diagnostics: Diagnostics,
}

impl AnalysisRecord {
    pub fn new(analysis: DocumentAnalysis, diagnostics: Diagnostics) -> Self {
        Self {
            analysis,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_field_clamps_confidence() {
        assert_eq!(ExtractedField::regex("x", 1.4).confidence, 1.0);
        assert_eq!(ExtractedField::ai("x", -0.5).confidence, 0.0);
        assert_eq!(ExtractedField::ai("x", f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_entity_bag_semantics() {
        let mut bag = EntityBag::default();
        bag.add_organization("Smith Law");
        bag.add_organization(" Smith Law ");
        bag.push_date("March 1, 2025");
        bag.push_date("01/02/2025");
        bag.push_date("March 1, 2025");

        assert_eq!(bag.organizations.len(), 1);
        assert_eq!(bag.dates, vec!["March 1, 2025", "01/02/2025"]);
    }

    #[test]
    fn test_confidences_only_cover_present_fields() {
        let fields = ExtractedFields {
            plaintiff_name: Some(ExtractedField::regex("John Smith".to_string(), 0.9)),
            settlement_amount: Some(ExtractedField::regex(15000.0, 0.8)),
            ..Default::default()
        };
        let keys: Vec<_> = fields.confidences().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["plaintiffName", "settlementAmount"]);

        let json = serde_json::to_value(&fields).unwrap();
        assert!(json.get("plaintiffName").is_some());
        assert!(json.get("attorneyName").is_none());
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(UrgencyLevel::Critical > UrgencyLevel::High);
        assert!(UrgencyLevel::High > UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium > UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::default(), UrgencyLevel::Medium);
    }

    #[test]
    fn test_method_wire_names() {
        let json = serde_json::to_string(&AnalysisMethod::RegexPdf).unwrap();
        assert_eq!(json, "\"regex-pdf\"");
        assert!(AnalysisMethod::AiVision.is_ai());
        assert!(!AnalysisMethod::RegexText.is_ai());
    }
}
