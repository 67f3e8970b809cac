//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod extract_text;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "docintake")]
#[command(about = "Legal document intake analysis")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "DOCINTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis HTTP server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config)
        #[arg(long)]
        bind: Option<String>,
        /// Do not persist analyses
        #[arg(long)]
        no_db: bool,
    },

    /// Analyze a local file and print the response JSON
    Analyze {
        /// File to analyze
        file: PathBuf,
        /// Declared MIME type (sniffed from content and extension if omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Model tier: flash or pro
        #[arg(long, default_value = "flash")]
        model: String,
        /// Analysis depth: standard or detailed
        #[arg(long, default_value = "standard")]
        depth: String,
        /// Skip AI even if configured
        #[arg(long)]
        offline: bool,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the text recovered from a PDF's uncompressed content streams
    ExtractText {
        /// PDF file
        file: PathBuf,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, no_db } => serve::cmd_serve(&settings, bind.as_deref(), no_db).await,
        Commands::Analyze {
            file,
            mime,
            model,
            depth,
            offline,
            pretty,
        } => {
            let options = analyze::AnalyzeOptions {
                mime,
                model,
                depth,
                offline,
                pretty,
            };
            analyze::cmd_analyze(&settings, &file, options).await
        }
        Commands::ExtractText { file } => extract_text::cmd_extract_text(&file),
    }
}
