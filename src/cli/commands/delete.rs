//! Delete command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, Write};

/// Run the delete command.
pub async fn run_delete(document: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let indexed = orchestrator
        .vector_store()
        .is_document_indexed(document)
        .await?;
    let record = orchestrator.sqlite_store().get_document(document)?;

    if !indexed && record.is_none() {
        Output::warning(&format!("No document '{}' found.", document));
        return Ok(());
    }

    if let Some(record) = &record {
        Output::info(&format!("Deleting '{}' ({})", record.file_name, document));
    }

    if !confirm("Delete this document and all its flashcards, quizzes, and chat history?")? {
        Output::info("Cancelled.");
        return Ok(());
    }

    let summary = orchestrator.delete_document(document).await?;

    Output::success(&format!(
        "Deleted {} chunks, {} flashcards, {} quiz questions, {} quiz results.",
        summary.chunks, summary.flashcards, summary.quiz_questions, summary.quiz_results
    ));

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn confirm(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
