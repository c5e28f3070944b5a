//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Terp Setup");
    println!();
    println!("Welcome to Terp! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API keys
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let mut missing_keys = false;

    if std::env::var(&settings.api.api_key_env).is_err() {
        missing_keys = true;
        Output::warning(&format!(
            "{} environment variable is not set.",
            settings.api.api_key_env
        ));
        println!();
        println!("  Terp needs a chat API key for answers, flashcards, and quizzes.");
        println!(
            "  Get one from: {}",
            style("https://console.groq.com/keys").underlined()
        );
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!(
            "  {}",
            style(format!("export {}='gsk_...'", settings.api.api_key_env)).green()
        );
        println!();
    }

    if std::env::var(&settings.embedding.api_key_env).is_err() {
        missing_keys = true;
        Output::warning(&format!(
            "{} environment variable is not set.",
            settings.embedding.api_key_env
        ));
        println!();
        println!("  Terp needs an embedding API token for document search.");
        println!(
            "  Get one from: {}",
            style("https://huggingface.co/settings/tokens").underlined()
        );
        println!();
        println!(
            "  {}",
            style(format!("export {}='hf_...'", settings.embedding.api_key_env)).green()
        );
        println!();
    }

    if missing_keys {
        if !prompt_continue("Continue without API keys?")? {
            println!();
            Output::info("Setup cancelled. Set your API keys and run 'terp init' again.");
            return Ok(());
        }
    } else {
        Output::success("API keys are configured!");
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("terp config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("terp doctor").cyan());
    println!("  {} Ingest your first document", style("terp ingest <file.pdf>").cyan());
    println!(
        "  {} Ask questions about it",
        style("terp ask <document> \"<question>\"").cyan()
    );
    println!();
    println!("For more help: {}", style("terp --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
