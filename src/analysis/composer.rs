//! Deterministic analysis composition.
//!
//! Runs field extraction, entity recognition, classification and urgency
//! over plaintext and assembles a complete [`DocumentAnalysis`]. The same
//! text and `today` always yield the same analysis.

use chrono::NaiveDate;

use super::classify::{classify_document, mentions_accessibility, DocumentKind, LegalKind};
use super::entities::extract_entities;
use super::fields::extract_fields;
use super::rules::ExtractContext;
use super::urgency::classify_urgency;
use crate::models::{
    AnalysisDepth, DocumentAnalysis, EntityBag, ExtractedFields, LegalAssessment, UrgencyLevel,
};

pub const ADA_RESOURCE: &str = "ADA.gov - Americans with Disabilities Act information and technical assistance (https://www.ada.gov)";
pub const WCAG_RESOURCE: &str =
    "W3C WCAG 2.1 Quick Reference (https://www.w3.org/WAI/WCAG21/quickref/)";
pub const LEGAL_HELP_RESOURCE: &str =
    "American Bar Association - Find Legal Help (https://www.americanbar.org/groups/legal_services/flh-home/)";

/// Inputs besides the text that shape a composed analysis.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    pub today: NaiveDate,
    pub depth: AnalysisDepth,
}

/// Build a full analysis from plaintext using only local heuristics.
pub fn compose_analysis(text: &str, options: &ComposeOptions) -> DocumentAnalysis {
    let ctx = ExtractContext {
        today: options.today,
    };
    let fields = extract_fields(text, &ctx);
    let entities = extract_entities(text);
    let kind = classify_document(text);
    let urgency_level = classify_urgency(&fields, kind.is_legal(), options.today);
    let accessibility = kind.is_legal() && mentions_accessibility(text);

    let legal_assessment = match (kind, options.depth) {
        (DocumentKind::Legal(legal), AnalysisDepth::Detailed) => {
            Some(assess(legal, accessibility, &fields, &entities, urgency_level))
        }
        _ => None,
    };

    DocumentAnalysis {
        document_type: kind.label().to_string(),
        document_summary: summarize(kind, &fields, text),
        key_points: key_points(&fields, &entities),
        recommended_actions: recommended_actions(kind, accessibility, &fields, urgency_level),
        urgency_level,
        additional_resources: resources(kind, accessibility),
        extracted_fields: fields,
        entities,
        legal_assessment,
    }
}

fn summarize(kind: DocumentKind, fields: &ExtractedFields, text: &str) -> String {
    let words = text.split_whitespace().count();
    match kind {
        DocumentKind::Legal(_) => {
            let mut summary = format!("{} detected by local text analysis", kind.label());
            if let Some(firm) = &fields.attorney_firm {
                summary.push_str(&format!(" from {}", firm.value));
            } else if let Some(attorney) = &fields.attorney_name {
                summary.push_str(&format!(" from {}", attorney.value));
            }
            if let Some(plaintiff) = &fields.plaintiff_name {
                summary.push_str(&format!(" on behalf of {}", plaintiff.value));
            }
            summary.push('.');
            if let Some(amount) = &fields.settlement_amount {
                summary.push_str(&format!(" It seeks {}.", format_amount(amount.value)));
            }
            if let Some(deadline) = &fields.response_deadline {
                summary.push_str(&format!(
                    " A response is requested by {}.",
                    deadline.value.format("%B %-d, %Y")
                ));
            }
            summary
        }
        _ => format!(
            "{} ({} words) analyzed with local text analysis; no legal claims were detected.",
            kind.label(),
            words
        ),
    }
}

fn key_points(fields: &ExtractedFields, entities: &EntityBag) -> Vec<String> {
    let mut points = Vec::new();
    if let Some(f) = &fields.plaintiff_name {
        points.push(format!("Plaintiff: {}", f.value));
    }
    if let Some(f) = &fields.attorney_name {
        points.push(format!("Attorney: {}", f.value));
    }
    if let Some(f) = &fields.attorney_firm {
        points.push(format!("Law firm: {}", f.value));
    }
    if let Some(f) = &fields.case_number {
        points.push(format!("Case number: {}", f.value));
    }
    if let Some(f) = &fields.court_name {
        points.push(format!("Court: {}", f.value));
    }
    if let Some(f) = &fields.filing_date {
        points.push(format!("Filed: {}", f.value.format("%B %-d, %Y")));
    }
    if let Some(f) = &fields.settlement_amount {
        points.push(format!("Amount demanded: {}", format_amount(f.value)));
    }
    if let Some(f) = &fields.response_deadline {
        points.push(format!("Response deadline: {}", f.value.format("%B %-d, %Y")));
    }
    if !entities.legal_citations.is_empty() {
        let cited: Vec<&str> = entities.legal_citations.iter().map(String::as_str).collect();
        points.push(format!("Cites: {}", cited.join("; ")));
    }
    if points.is_empty() {
        points.push("No specific legal fields were identified in the document".to_string());
    }
    points
}

fn recommended_actions(
    kind: DocumentKind,
    accessibility: bool,
    fields: &ExtractedFields,
    urgency: UrgencyLevel,
) -> Vec<String> {
    if !kind.is_legal() {
        return vec![
            "Review the document carefully and keep a copy for your records".to_string(),
            "Contact the sender if anything in the document is unclear".to_string(),
        ];
    }

    let mut actions = Vec::new();
    if urgency == UrgencyLevel::Critical {
        actions.push("Consult a qualified attorney immediately".to_string());
    } else {
        actions.push("Consult a qualified attorney before responding".to_string());
    }
    if let Some(deadline) = &fields.response_deadline {
        actions.push(format!(
            "Calendar the response deadline of {}",
            deadline.value.format("%B %-d, %Y")
        ));
    }
    if fields.settlement_amount.is_some() {
        actions.push("Do not pay or sign anything until counsel has reviewed the demand".to_string());
    }
    if accessibility {
        actions.push(
            "Commission an accessibility audit of the website or premises named in the letter"
                .to_string(),
        );
    }
    actions.push("Preserve all related documents, emails and records".to_string());
    actions.push("Notify your business liability insurance carrier".to_string());
    actions
}

fn resources(kind: DocumentKind, accessibility: bool) -> Vec<String> {
    if !kind.is_legal() {
        return Vec::new();
    }
    let mut out = Vec::new();
    if accessibility {
        out.push(ADA_RESOURCE.to_string());
        out.push(WCAG_RESOURCE.to_string());
    }
    out.push(LEGAL_HELP_RESOURCE.to_string());
    out
}

fn assess(
    legal: LegalKind,
    accessibility: bool,
    fields: &ExtractedFields,
    entities: &EntityBag,
    urgency: UrgencyLevel,
) -> LegalAssessment {
    let claim_type = if accessibility {
        "ADA Accessibility"
    } else if legal == LegalKind::SettlementAgreement {
        "Breach of Contract"
    } else if entities
        .legal_citations
        .iter()
        .any(|c| c.contains("Title I") && !c.contains("Title II"))
    {
        "Employment"
    } else {
        "General Legal Claim"
    };

    let mut potential_defenses = Vec::new();
    if accessibility {
        potential_defenses.push("Remediation already completed or in progress".to_string());
        potential_defenses.push("Lack of standing to sue".to_string());
        potential_defenses.push("Undue burden or fundamental alteration".to_string());
    } else {
        potential_defenses.push("Insufficient factual basis for the claim".to_string());
        potential_defenses.push("Claim is time-barred".to_string());
    }

    let mut risk_assessment = format!("{} urgency", capitalize(urgency.as_str()));
    if let Some(amount) = &fields.settlement_amount {
        risk_assessment.push_str(&format!(
            " with {} demanded",
            format_amount(amount.value)
        ));
    }
    risk_assessment.push_str("; assessment based on local text analysis only.");

    LegalAssessment {
        claim_type: claim_type.to_string(),
        jurisdiction: fields.court_name.as_ref().map(|c| c.value.clone()),
        statute_of_limitations: None,
        potential_defenses,
        risk_assessment,
    }
}

/// Format a dollar amount with thousands separators, e.g. `$15,000`.
pub fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac == 0 {
        format!("${grouped}")
    } else {
        format!("${grouped}.{frac:02}")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
