//! Stats command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the stats command.
pub fn run_stats(clear: bool, user: Option<&str>, settings: Settings) -> Result<()> {
    let owner = settings.resolve_principal(user)?;
    let orchestrator = Orchestrator::new(settings)?;

    if clear {
        let cleared = orchestrator
            .sqlite_store()
            .clear_quiz_results_by_owner(&owner)?;
        Output::success(&format!("Cleared {} quiz results.", cleared));
        return Ok(());
    }

    let (stats, results) = orchestrator.quiz_stats(&owner)?;

    if results.is_empty() {
        Output::info("No quiz results yet. Take a quiz with 'terp quiz <document>'.");
        return Ok(());
    }

    Output::header(&format!("Quiz Performance - {}", owner));
    println!();
    Output::kv("Attempts", &stats.attempts.to_string());
    Output::kv("Average", &format!("{:.0}%", stats.average_percentage));
    Output::kv("Best", &format!("{:.0}%", stats.best_percentage));

    Output::header("Recent Attempts");
    println!();
    for result in results.iter().take(10) {
        Output::list_item(&format!(
            "{} - {}/{} ({:.0}%) on {}",
            result.file_id,
            result.score,
            result.total_questions,
            result.percentage,
            result.taken_at.format("%Y-%m-%d %H:%M")
        ));
    }

    Ok(())
}
