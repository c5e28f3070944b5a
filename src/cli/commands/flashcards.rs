//! Flashcards command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::generate::GenerationOutcome;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the flashcards command.
pub async fn run_flashcards(
    document: &str,
    generate: bool,
    user: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let owner = settings.resolve_principal(user)?;
    let orchestrator = Orchestrator::new(settings.clone())?;
    let store = orchestrator.sqlite_store();

    if generate {
        if let Err(e) = preflight::check(Operation::Generate, &settings) {
            Output::error(&format!("{}", e));
            Output::info("Run 'terp doctor' for detailed diagnostics.");
            return Err(e.into());
        }

        let spinner = Output::spinner("Generating flashcards...");
        let outcome = orchestrator.generate_flashcards(document, &owner).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(GenerationOutcome::Generated(count)) => {
                Output::success(&format!("Generated {} flashcards.", count));
            }
            Ok(GenerationOutcome::SkippedExisting) => {
                Output::info("Flashcards already exist for this document.");
            }
            Err(e) => {
                Output::error(&format!("Flashcard generation failed: {}", e));
                return Err(e.into());
            }
        }
    }

    let cards = store.flashcards_by_file_id(document)?;

    if cards.is_empty() {
        Output::info(&format!(
            "No flashcards for '{}' yet. Run 'terp flashcards {} --generate' to create some.",
            document, document
        ));
        return Ok(());
    }

    println!(
        "\n{}",
        style(format!("Flashcards - {} ({} cards)", document, cards.len()))
            .bold()
            .cyan()
    );
    println!(
        "{}\n",
        style("Press Enter to flip each card, 'q' to stop.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (i, card) in cards.iter().enumerate() {
        println!(
            "{} {}",
            style(format!("Card {}/{}:", i + 1, cards.len())).bold(),
            card.front
        );
        print!("{} ", style("(flip)").dim());
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;
        if input.trim().eq_ignore_ascii_case("q") {
            break;
        }

        println!("{} {}\n", style("Answer:").green().bold(), card.back);
    }

    Ok(())
}
