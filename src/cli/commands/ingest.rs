//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(
    path: &str,
    id: Option<String>,
    force: bool,
    user: Option<&str>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'terp doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pdf_path = Path::new(path);
    if !pdf_path.exists() {
        Output::error(&format!("File not found: {}", path));
        return Err(anyhow::anyhow!("File not found: {}", path));
    }

    let owner = settings.resolve_principal(user)?;

    Output::info(&format!("Ingesting: {}", path));

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Extracting, chunking, and embedding...");
    let result = orchestrator
        .ingest_document(pdf_path, id, &owner, force)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            if result.skipped {
                Output::warning(&format!(
                    "'{}' is already indexed. Use --force to reprocess.",
                    result.file_id
                ));
            } else {
                Output::success(&format!(
                    "Successfully indexed '{}' ({} chunks)",
                    result.file_id, result.chunks_indexed
                ));
                Output::info(&format!(
                    "Try: terp ask {} \"What is this document about?\"",
                    result.file_id
                ));
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to ingest: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
