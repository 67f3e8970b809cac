//! Prompt for structured legal-document analysis.

use chrono::NaiveDate;

use crate::models::AnalysisDepth;

/// JSON shape the model must answer with. Mirrors `DocumentAnalysis`.
pub const RESPONSE_SCHEMA: &str = r#"{
  "documentType": "string, e.g. \"ADA Demand Letter\", \"Legal Complaint\", \"Medical Document\", \"General Document\"",
  "documentSummary": "string, 2-4 sentences",
  "keyPoints": ["string"],
  "recommendedActions": ["string, most important first"],
  "urgencyLevel": "low | medium | high | critical",
  "additionalResources": ["string"],
  "extractedFields": {
    "plaintiffName": "string or null",
    "attorneyName": "string or null",
    "attorneyFirm": "string or null",
    "caseNumber": "string or null",
    "courtName": "string or null",
    "filingDate": "YYYY-MM-DD or null",
    "responseDeadline": "YYYY-MM-DD or null",
    "settlementAmount": "number or null"
  },
  "confidence": {
    "<field name from extractedFields>": "number between 0 and 1"
  },
  "entities": {
    "persons": ["string"],
    "organizations": ["string"],
    "dates": ["string, as written in the document"],
    "amounts": ["string, as written in the document"],
    "legalCitations": ["string"]
  }
}"#;

/// Extra key requested for detailed analysis.
pub const LEGAL_ASSESSMENT_SCHEMA: &str = r#"  "legalAssessment": {
    "claimType": "string",
    "jurisdiction": "string or null",
    "statuteOfLimitations": "string or null",
    "potentialDefenses": ["string"],
    "riskAssessment": "string"
  }"#;

/// Build the analysis prompt for one document.
pub fn build_analysis_prompt(file_name: &str, depth: AnalysisDepth, today: NaiveDate) -> String {
    let mut prompt = format!(
        "You are a legal intake assistant for small businesses. Analyze the attached document \
         \"{file_name}\" and respond with ONLY a JSON object matching this schema:\n\n{RESPONSE_SCHEMA}\n"
    );

    if depth == AnalysisDepth::Detailed {
        prompt.push_str(
            "\nBecause a detailed analysis was requested, also include this key in the same object:\n",
        );
        prompt.push_str(LEGAL_ASSESSMENT_SCHEMA);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nRules:\n\
         - Today's date is {today}. Resolve relative deadlines such as \"within 10 days\" against it.\n\
         - Use null for any field the document does not state. Do not guess names or amounts.\n\
         - Only include a confidence entry for fields you filled in.\n\
         - urgencyLevel: critical if a deadline is within 7 days, high within 14 days or a demand over $10,000, \
           medium for other legal documents, low otherwise.\n\
         - Do not wrap the JSON in markdown or add commentary.\n",
        today = today.format("%Y-%m-%d")
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_prompt_requests_assessment() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let standard = build_analysis_prompt("letter.pdf", AnalysisDepth::Standard, today);
        let detailed = build_analysis_prompt("letter.pdf", AnalysisDepth::Detailed, today);

        assert!(standard.contains("\"letter.pdf\""));
        assert!(standard.contains("2025-03-01"));
        assert!(!standard.contains("legalAssessment"));
        assert!(detailed.contains("legalAssessment"));
    }
}
