//! Terp - Study PDFs with AI
//!
//! A local-first CLI tool for studying PDF documents with an AI assistant.
//!
//! The name "Terp" comes from the Norwegian word "terpe," to drill or cram.
//!
//! # Overview
//!
//! Terp allows you to:
//! - Ingest PDF documents into a local, searchable vector library
//! - Chat with your documents and get answers with bracketed citations
//! - Generate flashcards and multiple-choice quizzes from a document
//! - Track quiz performance over time
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `pdf` - PDF text extraction
//! - `chunking` - Overlapping text chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction and study data storage
//! - `rag` - Retrieval and chat with citations
//! - `generate` - Flashcard and quiz generation
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use terp::config::Settings;
//! use terp::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Ingest a PDF document
//!     let result = orchestrator
//!         .ingest_document(Path::new("notes.pdf"), None, "dev_user_123", false)
//!         .await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     // Ask a question about it
//!     let reply = orchestrator.chat(&result.file_id, "What is this about?").await;
//!     println!("{}", reply.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod openai;
pub mod orchestrator;
pub mod pdf;
pub mod rag;
pub mod study;
pub mod vector_store;

pub use error::{Result, TerpError};
