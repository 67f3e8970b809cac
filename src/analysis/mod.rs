//! Local (non-AI) document analysis.
//!
//! - `rules` / `confidence`: ordered regex rules and their specificity score
//! - `fields`: domain fields of a legal letter
//! - `entities`: generic persons, organizations, dates, amounts, citations
//! - `classify` / `urgency`: document type and priority tier
//! - `composer`: assembles everything into a `DocumentAnalysis`

pub mod classify;
pub mod composer;
pub mod confidence;
pub mod entities;
pub mod fields;
pub mod rules;
pub mod urgency;

pub use classify::{classify_document, is_legal_label, DocumentKind, LegalKind};
pub use composer::{compose_analysis, ComposeOptions};
pub use entities::extract_entities;
pub use fields::{extract_fields, parse_amount, parse_date_text};
pub use rules::ExtractContext;
pub use urgency::classify_urgency;
