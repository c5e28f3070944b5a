//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.vector_store().list_documents().await {
        Ok(documents) => {
            if documents.is_empty() {
                Output::info("No documents ingested yet. Use 'terp ingest <file.pdf>' to add one.");
            } else {
                Output::header(&format!("Ingested Documents ({})", documents.len()));
                println!();

                for document in &documents {
                    Output::document_info(
                        &document.file_name,
                        &document.file_id,
                        document.chunk_count,
                    );
                }

                let total_chunks: u32 = documents.iter().map(|d| d.chunk_count).sum();
                println!();
                Output::kv("Total documents", &documents.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list documents: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
