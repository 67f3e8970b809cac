//! One-shot analysis of a local file.

use std::path::Path;

use console::style;
use tracing::warn;

use crate::config::Settings;
use crate::models::{AnalysisDepth, AnalysisRequest, ModelPreference};
use crate::server::{build_orchestrator, AnalyzeResponse};
use crate::services::AnalysisError;

pub struct AnalyzeOptions {
    pub mime: Option<String>,
    pub model: String,
    pub depth: String,
    pub offline: bool,
    pub pretty: bool,
}

/// Analyze `file` exactly as the HTTP endpoint would, without persisting.
pub async fn cmd_analyze(settings: &Settings, file: &Path, options: AnalyzeOptions) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    let model = ModelPreference::from_str(&options.model).unwrap_or_else(|| {
        warn!("Unknown model {:?}, using flash", options.model);
        ModelPreference::Fast
    });
    let depth = AnalysisDepth::from_str(&options.depth).unwrap_or_else(|| {
        warn!("Unknown depth {:?}, using standard", options.depth);
        AnalysisDepth::Standard
    });

    let mut settings = settings.clone();
    if options.offline {
        settings.ai.enabled = false;
    }
    let orchestrator = build_orchestrator(&settings, false)?;

    let request = AnalysisRequest::new(bytes, file_name, options.mime.unwrap_or_default())
        .with_model(model)
        .with_depth(depth);

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    match orchestrator.analyze_until(request, interrupted).await {
        Ok(outcome) => {
            let response = AnalyzeResponse {
                success: true,
                letter_id: outcome.letter_id,
                debug: outcome.record.diagnostics.clone(),
                analysis: outcome.record,
            };
            let json = if options.pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
            Ok(())
        }
        Err(AnalysisError::Cancelled) => {
            eprintln!("{} Interrupted", style("!").yellow());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {} ({})", style("✗").red(), e, e.error_type());
            if let Some(hint) = e.hint() {
                eprintln!("  {} {}", style("hint:").dim(), hint);
            }
            Err(e.into())
        }
    }
}
