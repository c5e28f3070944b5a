//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(document: &str, question: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'terp doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching document...");
    let reply = orchestrator.chat(document, question).await;
    spinner.finish_and_clear();

    println!("\n{}\n", reply.answer);

    if !reply.sources.is_empty() {
        Output::header("Sources");
        for (i, source) in reply.sources.iter().enumerate() {
            Output::source(i + 1, source.page_number, &source.content);
        }
    }

    Ok(())
}
