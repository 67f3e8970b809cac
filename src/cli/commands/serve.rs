//! Web server command.

use console::style;

use crate::config::Settings;
use crate::server::{self, AppState};

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>, no_db: bool) -> anyhow::Result<()> {
    let bind = match bind {
        Some(bind) => parse_bind_address(bind),
        None => settings.bind.clone(),
    };

    let state = AppState::from_settings(settings, !no_db)?;

    println!(
        "{} AI extraction: {}",
        style("→").cyan(),
        if state.orchestrator.ai_configured() {
            style("configured").green()
        } else {
            style("not configured (regex only)").yellow()
        }
    );
    if no_db {
        println!("{} Persistence disabled", style("→").cyan());
    }
    println!(
        "{} Starting docintake server at http://{}",
        style("→").cyan(),
        bind
    );
    println!("  Press Ctrl+C to stop");

    server::serve(state, &bind).await
}

/// Parse a bind address that can be:
/// - Just a port: "8787" -> 127.0.0.1:8787
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8787
/// - Host and port: "0.0.0.0:8787"
fn parse_bind_address(bind: &str) -> String {
    if let Ok(port) = bind.parse::<u16>() {
        return format!("127.0.0.1:{}", port);
    }

    if let Some((_, port)) = bind.rsplit_once(':') {
        if port.parse::<u16>().is_ok() {
            return bind.to_string();
        }
    }

    format!("{}:8787", bind)
}
