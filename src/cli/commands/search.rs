//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use uuid::Uuid;

/// Run the search command.
pub async fn run_search(
    document: &str,
    query: &str,
    limit: usize,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'terp doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.vector_store();
    let embedder = orchestrator.embedder();

    let spinner = Output::spinner("Searching...");

    let result = async {
        let query_embedding = embedder.embed(query).await?;
        let hits = store.search(&query_embedding, document, limit).await?;
        let ids: Vec<Uuid> = hits.iter().map(|hit| hit.id).collect();
        let chunks = store.fetch_by_ids(&ids).await?;
        Ok::<_, crate::error::TerpError>((hits, chunks))
    }
    .await;

    spinner.finish_and_clear();

    match result {
        Ok((hits, chunks)) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));

                for (i, (hit, chunk)) in hits.iter().zip(chunks.iter()).enumerate() {
                    Output::search_result(i + 1, chunk.page_number, hit.score, &chunk.content);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
