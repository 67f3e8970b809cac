//! Service layer for document intake.
//!
//! Domain orchestration separated from transport concerns; the HTTP server
//! and the CLI both drive the same [`Orchestrator`].

pub mod orchestrator;

pub use orchestrator::{AnalysisError, AnalysisOutcome, Clock, Orchestrator, Stage};
