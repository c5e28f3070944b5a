//! CLI module for Terp.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Terp - Study PDFs with AI
///
/// A local-first CLI tool for studying PDF documents: chat with your
/// documents, and generate flashcards and quizzes from them.
/// The name "Terp" comes from the Norwegian "terpe," to drill or cram.
#[derive(Parser, Debug)]
#[command(name = "terp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Act as this user (overrides general.default_principal)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Terp and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Ingest a PDF document into the library
    Ingest {
        /// Path to the PDF file
        path: String,

        /// Document id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Force re-ingestion even if already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a single question about a document
    Ask {
        /// Document id
        document: String,

        /// The question to ask
        question: String,
    },

    /// Start an interactive chat session about a document
    Chat {
        /// Document id
        document: String,

        /// Discard the saved conversation and start fresh
        #[arg(long)]
        fresh: bool,
    },

    /// Search for relevant passages in a document
    Search {
        /// Document id
        document: String,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Review flashcards for a document, or generate new ones
    Flashcards {
        /// Document id
        document: String,

        /// Generate a new set of cards (adds to any existing cards)
        #[arg(short, long)]
        generate: bool,
    },

    /// Take a quiz on a document (generates questions on first run)
    Quiz {
        /// Document id
        document: String,

        /// Clear existing questions and generate a new quiz
        #[arg(long)]
        regenerate: bool,
    },

    /// Show quiz performance stats
    Stats {
        /// Clear recorded quiz results
        #[arg(long)]
        clear: bool,
    },

    /// List ingested documents
    List,

    /// Delete a document and all its derived data
    Delete {
        /// Document id
        document: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
