//! Terp CLI entry point.

use anyhow::Result;
use clap::Parser;
use terp::cli::{commands, Cli, Commands};
use terp::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("terp={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Ingest { path, id, force } => {
            commands::run_ingest(path, id.clone(), *force, cli.user.as_deref(), settings).await?;
        }

        Commands::Ask { document, question } => {
            commands::run_ask(document, question, settings).await?;
        }

        Commands::Chat { document, fresh } => {
            commands::run_chat(document, *fresh, settings).await?;
        }

        Commands::Search {
            document,
            query,
            limit,
        } => {
            commands::run_search(document, query, *limit, settings).await?;
        }

        Commands::Flashcards { document, generate } => {
            commands::run_flashcards(document, *generate, cli.user.as_deref(), settings).await?;
        }

        Commands::Quiz {
            document,
            regenerate,
        } => {
            commands::run_quiz(document, *regenerate, cli.user.as_deref(), settings).await?;
        }

        Commands::Stats { clear } => {
            commands::run_stats(*clear, cli.user.as_deref(), settings)?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Delete { document } => {
            commands::run_delete(document, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
