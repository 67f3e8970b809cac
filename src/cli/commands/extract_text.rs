//! PDF text recovery command.

use std::path::Path;

use console::style;

use crate::extract::{scan_pdf, MIN_RELIABLE_CHARS};

/// Print the text the heuristic scanner recovers from a PDF.
pub fn cmd_extract_text(file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let scan = scan_pdf(&bytes);

    eprintln!(
        "{} {} streams, {} fragments, {} chars",
        style("→").cyan(),
        scan.streams,
        scan.fragments,
        scan.text.chars().count()
    );

    if scan.is_reliable() {
        println!("{}", scan.text);
    } else {
        eprintln!(
            "{} Extraction unreliable (fewer than {} characters); the PDF is likely compressed or scanned",
            style("✗").yellow(),
            MIN_RELIABLE_CHARS
        );
    }
    Ok(())
}
