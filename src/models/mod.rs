//! Data models for document intake analysis.

mod analysis;
mod request;

pub use analysis::{
    AnalysisMethod, AnalysisRecord, Diagnostics, DocumentAnalysis, EntityBag, ExtractedField,
    ExtractedFields, LegalAssessment, Provenance, UrgencyLevel, REGEX_MODEL_ID,
};
pub use request::{AnalysisDepth, AnalysisRequest, ModelPreference};
