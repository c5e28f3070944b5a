//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(document: &str, fresh: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'terp doctor' for detailed diagnostics.");
        return Err(e);
    }

    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.sqlite_store();

    if !orchestrator.vector_store().is_document_indexed(document).await? {
        Output::warning(&format!(
            "Document '{}' has no indexed chunks. Answers will fall back to \"not found\".",
            document
        ));
    }

    let mut engine = orchestrator.chat_engine();

    // Resume the saved conversation unless starting fresh
    if !fresh {
        if let Some(messages) = store.get_chat_transcript(document)? {
            Output::info(&format!("Resumed saved conversation ({} turns).", messages.len() / 2));
            engine = engine.with_history(messages);
        }
    }

    println!("\n{}", style(format!("Terp Chat - {}", document)).bold().cyan());
    println!(
        "{}\n",
        style("Type your questions. 'save' stores the conversation, 'clear' resets it, 'exit' saves and quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            engine.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        if input.eq_ignore_ascii_case("save") {
            store.save_chat_transcript(document, engine.history())?;
            Output::info("Conversation saved.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let reply = engine.chat(input, document).await;
        spinner.finish_and_clear();

        println!("\n{} {}\n", style("Terp:").cyan().bold(), reply.answer);
    }

    // Overwrite the saved conversation wholesale on the way out
    if !engine.history().is_empty() {
        store.save_chat_transcript(document, engine.history())?;
        Output::info("Conversation saved. Goodbye!");
    } else {
        Output::info("Goodbye!");
    }

    Ok(())
}
