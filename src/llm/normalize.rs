//! Turning free-form model output into a `DocumentAnalysis`.
//!
//! Models are asked for pure JSON but routinely wrap it in prose or
//! markdown fences, so the first balanced `{...}` object is cut out of the
//! raw text before parsing. Anything that does not yield a usable analysis
//! is `None`; nothing here returns an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::analysis::{parse_amount, parse_date_text};
use crate::models::{
    DocumentAnalysis, EntityBag, ExtractedField, ExtractedFields, LegalAssessment, UrgencyLevel,
};

/// Confidence assigned to an AI field the model did not score.
pub const DEFAULT_AI_CONFIDENCE: f32 = 0.8;

/// Values models use to say "not present".
const ABSENT_MARKERS: &[&str] = &["null", "none", "n/a", "na", "unknown", "not specified", "not stated"];

/// Raw model answer, as lenient as the models are.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiPayload {
    pub document_type: Option<String>,
    pub document_summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub key_points: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommended_actions: Vec<Value>,
    pub urgency_level: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_resources: Vec<Value>,
    pub extracted_fields: Value,
    pub confidence: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub entities: AiEntities,
    pub legal_assessment: Option<AiLegalAssessment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiEntities {
    #[serde(deserialize_with = "null_as_default")]
    pub persons: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub organizations: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub dates: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub amounts: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub legal_citations: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiLegalAssessment {
    pub claim_type: Option<String>,
    pub jurisdiction: Option<String>,
    pub statute_of_limitations: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub potential_defenses: Vec<Value>,
    pub risk_assessment: Option<String>,
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Find the first balanced JSON object in `raw`.
///
/// Braces inside string literals are ignored.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse raw model output into an analysis.
pub fn parse_ai_response(raw: &str) -> Option<DocumentAnalysis> {
    let json = extract_json_object(raw)?;
    let payload: AiPayload = serde_json::from_str(json).ok()?;
    normalize_payload(payload)
}

/// Validate and convert a payload. `documentType` and `documentSummary`
/// are required; everything else degrades to empty.
pub fn normalize_payload(payload: AiPayload) -> Option<DocumentAnalysis> {
    let document_type = non_empty(payload.document_type)?;
    let document_summary = non_empty(payload.document_summary)?;

    let extracted_fields = normalize_fields(&payload.extracted_fields, &payload.confidence);

    let urgency_level = payload
        .urgency_level
        .as_deref()
        .and_then(UrgencyLevel::from_str)
        .unwrap_or_default();

    let mut entities = EntityBag::default();
    for v in &payload.entities.persons {
        if let Some(s) = value_text(v) {
            entities.add_person(&s);
        }
    }
    for v in &payload.entities.organizations {
        if let Some(s) = value_text(v) {
            entities.add_organization(&s);
        }
    }
    for v in &payload.entities.dates {
        if let Some(s) = value_text(v) {
            entities.push_date(&s);
        }
    }
    for v in &payload.entities.amounts {
        if let Some(s) = value_text(v) {
            entities.push_amount(&s);
        }
    }
    for v in &payload.entities.legal_citations {
        if let Some(s) = value_text(v) {
            entities.add_citation(&s);
        }
    }

    let legal_assessment = payload.legal_assessment.and_then(|la| {
        Some(LegalAssessment {
            claim_type: non_empty(la.claim_type)?,
            jurisdiction: non_empty(la.jurisdiction),
            statute_of_limitations: non_empty(la.statute_of_limitations),
            potential_defenses: text_list(&la.potential_defenses),
            risk_assessment: non_empty(la.risk_assessment).unwrap_or_default(),
        })
    });

    Some(DocumentAnalysis {
        document_type,
        document_summary,
        key_points: text_list(&payload.key_points),
        recommended_actions: text_list(&payload.recommended_actions),
        urgency_level,
        additional_resources: text_list(&payload.additional_resources),
        extracted_fields,
        entities,
        legal_assessment,
    })
}

fn normalize_fields(fields: &Value, confidence: &Value) -> ExtractedFields {
    let score = |key: &str| {
        confidence
            .get(key)
            .and_then(Value::as_f64)
            .map(|c| c as f32)
            .unwrap_or(DEFAULT_AI_CONFIDENCE)
    };
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(value_text)
            .map(|v| ExtractedField::ai(v, score(key)))
    };
    let date = |key: &str| {
        fields
            .get(key)
            .and_then(value_text)
            .and_then(|v| parse_date_text(&v))
            .map(|v| ExtractedField::ai(v, score(key)))
    };

    let settlement_amount = fields
        .get("settlementAmount")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_amount(s),
            _ => None,
        })
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| ExtractedField::ai(v, score("settlementAmount")));

    ExtractedFields {
        plaintiff_name: text("plaintiffName"),
        attorney_name: text("attorneyName"),
        attorney_firm: text("attorneyFirm"),
        case_number: text("caseNumber"),
        court_name: text("courtName"),
        filing_date: date("filingDate"),
        response_deadline: date("responseDeadline"),
        settlement_amount,
    }
}

/// Non-empty trimmed text from a JSON scalar; absent markers are `None`.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || ABSENT_MARKERS.contains(&text.to_lowercase().as_str()) {
        None
    } else {
        Some(text)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value_text(&Value::String(value?))
}

fn text_list(values: &[Value]) -> Vec<String> {
    values.iter().filter_map(value_text).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_extract_json_object_skips_prose_and_fences() {
        let raw = "Sure! Here is the analysis:\n```json\n{\"a\": {\"b\": \"}\"}, \"c\": 1}\n```\nDone.";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"a\": {\"b\": \"}\"}, \"c\": 1}")
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"unterminated\": 1"), None);
    }

    #[test]
    fn test_escaped_quotes_in_strings() {
        let raw = r#"{"s": "say \"}\" now"} trailing"#;
        assert_eq!(extract_json_object(raw), Some(r#"{"s": "say \"}\" now"}"#));
    }

    #[test]
    fn test_full_payload() {
        let raw = r#"```json
        {
          "documentType": "ADA Demand Letter",
          "documentSummary": "Demand for website accessibility fixes.",
          "keyPoints": ["Alleges WCAG violations", ""],
          "recommendedActions": ["Call a lawyer"],
          "urgencyLevel": "HIGH",
          "additionalResources": [],
          "extractedFields": {
            "plaintiffName": "John Smith",
            "attorneyName": null,
            "responseDeadline": "2025-03-11",
            "settlementAmount": "$15,000"
          },
          "confidence": {"plaintiffName": 0.95, "attorneyName": 0.4, "bogus": 0.9},
          "entities": {
            "persons": ["John Smith", "John Smith "],
            "dates": ["March 11, 2025"],
            "amounts": ["$15,000"],
            "legalCitations": ["WCAG 2.1"]
          }
        }
        ```"#;
        let analysis = parse_ai_response(raw).unwrap();

        assert_eq!(analysis.document_type, "ADA Demand Letter");
        assert_eq!(analysis.key_points, vec!["Alleges WCAG violations"]);
        assert_eq!(analysis.urgency_level, UrgencyLevel::High);

        let fields = &analysis.extracted_fields;
        let plaintiff = fields.plaintiff_name.as_ref().unwrap();
        assert_eq!(plaintiff.value, "John Smith");
        assert!((plaintiff.confidence - 0.95).abs() < 1e-6);
        assert!(fields.attorney_name.is_none());
        assert_eq!(
            fields.response_deadline.as_ref().unwrap().value,
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        let amount = fields.settlement_amount.as_ref().unwrap();
        assert_eq!(amount.value, 15000.0);
        assert!((amount.confidence - DEFAULT_AI_CONFIDENCE).abs() < 1e-6);

        // Confidence keys never outnumber present fields.
        let keys: Vec<_> = fields.confidences().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["plaintiffName", "responseDeadline", "settlementAmount"]);

        assert_eq!(analysis.entities.persons.len(), 1);
        assert!(analysis.legal_assessment.is_none());
    }

    #[test]
    fn test_missing_required_keys_is_failure() {
        assert!(parse_ai_response(r#"{"documentType": "Letter"}"#).is_none());
        assert!(parse_ai_response(r#"{"documentType": "", "documentSummary": "x"}"#).is_none());
        assert!(parse_ai_response("I could not read this document.").is_none());
    }

    #[test]
    fn test_null_lists_are_empty() {
        let analysis = parse_ai_response(
            r#"{"documentType": "Demand Letter", "documentSummary": "x",
                "keyPoints": null, "recommendedActions": null, "additionalResources": null,
                "entities": {"persons": null, "legalCitations": ["WCAG 2.1"]},
                "legalAssessment": {"claimType": "ADA", "potentialDefenses": null}}"#,
        )
        .unwrap();
        assert!(analysis.key_points.is_empty());
        assert!(analysis.recommended_actions.is_empty());
        assert!(analysis.entities.persons.is_empty());
        assert!(analysis.entities.legal_citations.contains("WCAG 2.1"));
        assert!(analysis.legal_assessment.unwrap().potential_defenses.is_empty());

        let analysis = parse_ai_response(
            r#"{"documentType": "Letter", "documentSummary": "x", "entities": null}"#,
        )
        .unwrap();
        assert!(analysis.entities.is_empty());
    }

    #[test]
    fn test_unknown_urgency_defaults_to_medium() {
        let analysis = parse_ai_response(
            r#"{"documentType": "Letter", "documentSummary": "A letter.", "urgencyLevel": "whenever"}"#,
        )
        .unwrap();
        assert_eq!(analysis.urgency_level, UrgencyLevel::Medium);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let analysis = parse_ai_response(
            r#"{"documentType": "Letter", "documentSummary": "A letter.",
                "extractedFields": {"caseNumber": "2:24-cv-01234"},
                "confidence": {"caseNumber": 7}}"#,
        )
        .unwrap();
        assert_eq!(analysis.extracted_fields.case_number.unwrap().confidence, 1.0);
    }

    #[test]
    fn test_legal_assessment_kept_when_named() {
        let analysis = parse_ai_response(
            r#"{"documentType": "Demand Letter", "documentSummary": "Demand.",
                "legalAssessment": {"claimType": "ADA Accessibility", "potentialDefenses": ["Standing"],
                                    "riskAssessment": "Moderate"}}"#,
        )
        .unwrap();
        let assessment = analysis.legal_assessment.unwrap();
        assert_eq!(assessment.claim_type, "ADA Accessibility");
        assert_eq!(assessment.potential_defenses, vec!["Standing"]);
        assert!(assessment.jurisdiction.is_none());
    }
}
