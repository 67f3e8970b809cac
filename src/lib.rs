//! docintake - legal document intake analysis.
//!
//! Turns an uploaded letter (scanned image, PDF or plain text) into a
//! structured record of extracted fields, entities and an urgency tier,
//! trying a generative-AI backend first and a deterministic regex
//! analysis second.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod repository;
pub mod server;
pub mod services;
pub mod utils;
