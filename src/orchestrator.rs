//! Pipeline orchestrator for Terp.
//!
//! Coordinates the entire process from PDF extraction to indexing, and
//! wires the stores and clients behind chat and generation.

use crate::chunking::{split_text, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, HfEmbedder};
use crate::error::{Result, TerpError};
use crate::generate::{FlashcardGenerator, GenerationOutcome, QuizGenerator};
use crate::pdf;
use crate::rag::{ChatEngine, ChatReply};
use crate::study::{QuizResult, QuizStats};
use crate::vector_store::{Chunk, DocumentRecord, SqliteVectorStore, VectorStore};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Terp pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    store: Arc<SqliteVectorStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(HfEmbedder::with_settings(&settings.embedding));
        let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Ok(Self {
            settings,
            prompts,
            embedder,
            store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<SqliteVectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            store,
        }
    }

    /// Get a reference to the store (as trait object).
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.store.clone() as Arc<dyn VectorStore>
    }

    /// Get a reference to the SQLite store (for study data).
    pub fn sqlite_store(&self) -> Arc<SqliteVectorStore> {
        self.store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ingest a PDF: extract text, chunk, then embed and index.
    ///
    /// Chunks are processed strictly sequentially: one embedding call, then
    /// one insert, per chunk. An error aborts the remaining batch and
    /// leaves already-inserted chunks in place.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest_document(
        &self,
        path: &Path,
        id: Option<String>,
        owner: &str,
        force: bool,
    ) -> Result<IngestResult> {
        let file_id = match id {
            Some(id) => id,
            None => derive_file_id(path)?,
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_id.clone());

        // Check if already indexed
        if !force && self.store.is_document_indexed(&file_id).await? {
            info!("Document {} is already indexed, skipping", file_id);
            return Ok(IngestResult {
                file_id,
                file_name,
                chunks_indexed: 0,
                skipped: true,
            });
        }

        info!("Extracting text from {}", path.display());
        let extracted = pdf::extract_text(path)?;

        let config = ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size,
            chunk_overlap: self.settings.chunking.chunk_overlap,
        };

        let mut chunks = split_text(&extracted.full_text, &config);
        for chunk in &mut chunks {
            chunk.page_number = extracted.page_at(chunk.start);
        }

        // Re-ingest replaces previous chunks
        if force {
            self.store.delete_by_file_id(&file_id).await?;
        }

        self.store.upsert_document(&DocumentRecord {
            file_id: file_id.clone(),
            file_name: file_name.clone(),
            source_path: path.display().to_string(),
            owner: owner.to_string(),
            created_at: Utc::now(),
        })?;

        info!("Vectorizing {} chunks for document {}", chunks.len(), file_id);

        let dimensions = self.embedder.dimensions();
        let mut indexed = 0usize;

        for chunk in chunks {
            let embedding = match self.embedder.embed(&chunk.content).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(
                        "Ingestion of {} aborted at chunk {}: {} ({} chunks already stored)",
                        file_id, chunk.order, e, indexed
                    );
                    return Err(e);
                }
            };

            if embedding.len() != dimensions {
                return Err(TerpError::Embedding(format!(
                    "chunk {} embedding has {} dimensions, expected {}",
                    chunk.order,
                    embedding.len(),
                    dimensions
                )));
            }

            self.store
                .insert(&Chunk::new(
                    file_id.clone(),
                    chunk.content,
                    embedding,
                    chunk.page_number,
                    chunk.order,
                ))
                .await?;

            indexed += 1;
        }

        info!("Ingestion complete: {} chunks for {}", indexed, file_id);

        Ok(IngestResult {
            file_id,
            file_name,
            chunks_indexed: indexed,
            skipped: false,
        })
    }

    /// Create a chat engine for this library.
    pub fn chat_engine(&self) -> ChatEngine {
        ChatEngine::new(
            self.vector_store(),
            self.embedder.clone(),
            &self.settings.api,
            &self.settings.rag,
        )
        .with_prompts(self.prompts.clone())
    }

    /// Answer a single question about a document.
    ///
    /// Never fails: internal errors become a displayable fallback answer.
    pub async fn chat(&self, file_id: &str, user_input: &str) -> ChatReply {
        let mut engine = self.chat_engine();
        engine.chat(user_input, file_id).await
    }

    /// Full document text, reassembled from chunks in insertion order.
    pub async fn document_text(&self, file_id: &str) -> Result<String> {
        let chunks = self.store.get_by_file_id(file_id).await?;
        if chunks.is_empty() {
            return Err(TerpError::DocumentNotFound(file_id.to_string()));
        }

        Ok(chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Generate flashcards from a document's text.
    pub async fn generate_flashcards(&self, file_id: &str, owner: &str) -> Result<GenerationOutcome> {
        let text = self.document_text(file_id).await?;

        let generator = FlashcardGenerator::new(self.store.clone(), &self.settings)
            .with_prompts(self.prompts.clone());

        generator.generate(file_id, owner, &text).await
    }

    /// Generate a quiz from a document's text. At-most-once per document
    /// unless existing questions are cleared first.
    pub async fn generate_quiz(&self, file_id: &str, owner: &str) -> Result<GenerationOutcome> {
        let text = self.document_text(file_id).await?;

        let generator = QuizGenerator::new(self.store.clone(), &self.settings)
            .with_prompts(self.prompts.clone());

        generator.generate(file_id, owner, &text).await
    }

    /// Clear a document's quiz questions so the next generation runs again.
    pub fn clear_quiz_questions(&self, file_id: &str) -> Result<usize> {
        self.store.delete_quiz_questions_by_file_id(file_id)
    }

    /// Record a completed quiz attempt.
    pub fn record_quiz_result(
        &self,
        file_id: &str,
        owner: &str,
        score: u32,
        total_questions: u32,
    ) -> Result<QuizResult> {
        let result = QuizResult::new(
            file_id.to_string(),
            owner.to_string(),
            score,
            total_questions,
        );
        self.store.insert_quiz_result(&result)?;
        Ok(result)
    }

    /// Quiz performance for a principal: aggregated stats plus the raw
    /// results, newest first.
    pub fn quiz_stats(&self, owner: &str) -> Result<(QuizStats, Vec<QuizResult>)> {
        let results = self.store.quiz_results_by_owner(owner)?;
        let stats = QuizStats::from_results(&results);
        Ok((stats, results))
    }

    /// Delete a document and fan out to every dependent record, so no
    /// orphaned chunks or study data remain.
    #[instrument(skip(self))]
    pub async fn delete_document(&self, file_id: &str) -> Result<DeleteSummary> {
        let chunks = self.store.delete_by_file_id(file_id).await?;
        let flashcards = self.store.delete_flashcards_by_file_id(file_id)?;
        let quiz_questions = self.store.delete_quiz_questions_by_file_id(file_id)?;
        let quiz_results = self.store.delete_quiz_results_by_file_id(file_id)?;
        let had_transcript = self.store.delete_chat_transcript(file_id)?;
        let had_record = self.store.delete_document_record(file_id)?;

        info!(
            "Deleted document {}: {} chunks, {} flashcards, {} quiz questions",
            file_id, chunks, flashcards, quiz_questions
        );

        Ok(DeleteSummary {
            chunks,
            flashcards,
            quiz_questions,
            quiz_results,
            had_transcript,
            had_record,
        })
    }
}

/// Derive a document id from the file stem.
fn derive_file_id(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            TerpError::InvalidInput(format!("cannot derive a document id from {}", path.display()))
        })
}

/// Result of ingesting a document.
#[derive(Debug)]
pub struct IngestResult {
    /// Document ID.
    pub file_id: String,
    /// Display name.
    pub file_name: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
    /// Whether ingestion was skipped (already indexed).
    pub skipped: bool,
}

/// What a document deletion removed.
#[derive(Debug)]
pub struct DeleteSummary {
    /// Chunks removed.
    pub chunks: usize,
    /// Flashcards removed.
    pub flashcards: usize,
    /// Quiz questions removed.
    pub quiz_questions: usize,
    /// Quiz results removed.
    pub quiz_results: usize,
    /// Whether a saved chat transcript was removed.
    pub had_transcript: bool,
    /// Whether a registry record was removed.
    pub had_record: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::ChatMessage;
    use crate::study::{Flashcard, QuizQuestion};

    fn test_orchestrator() -> Orchestrator {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let settings = Settings::default();
        let embedder = Arc::new(HfEmbedder::with_settings(&settings.embedding));
        Orchestrator::with_components(settings, Prompts::default(), embedder, store)
    }

    #[test]
    fn test_derive_file_id() {
        assert_eq!(
            derive_file_id(Path::new("/tmp/biology-notes.pdf")).unwrap(),
            "biology-notes"
        );
        assert!(derive_file_id(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_document_text_joins_chunks_in_order() {
        let orchestrator = test_orchestrator();
        let store = orchestrator.sqlite_store();

        store
            .insert_batch(&[
                Chunk::new("doc".to_string(), "beta".to_string(), vec![1.0], None, 1),
                Chunk::new("doc".to_string(), "alpha".to_string(), vec![1.0], None, 0),
            ])
            .await
            .unwrap();

        let text = orchestrator.document_text("doc").await.unwrap();
        assert_eq!(text, "alpha beta");
    }

    #[tokio::test]
    async fn test_document_text_missing_document() {
        let orchestrator = test_orchestrator();
        assert!(matches!(
            orchestrator.document_text("nope").await,
            Err(TerpError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_document_fans_out() {
        let orchestrator = test_orchestrator();
        let store = orchestrator.sqlite_store();

        store
            .insert(&Chunk::new(
                "doc".to_string(),
                "content".to_string(),
                vec![1.0, 0.0],
                None,
                0,
            ))
            .await
            .unwrap();
        store
            .upsert_document(&DocumentRecord {
                file_id: "doc".to_string(),
                file_name: "doc.pdf".to_string(),
                source_path: "/tmp/doc.pdf".to_string(),
                owner: "user".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
        store
            .insert_flashcard(&Flashcard::new(
                "doc".to_string(),
                "user".to_string(),
                "Q".to_string(),
                "A".to_string(),
            ))
            .unwrap();
        store
            .insert_quiz_question(&QuizQuestion::new(
                "doc".to_string(),
                "user".to_string(),
                "Q".to_string(),
                vec!["a".into(), "b".into(), "c".into(), "d".into()],
                0,
                "E".to_string(),
            ))
            .unwrap();
        store
            .save_chat_transcript("doc", &[ChatMessage::user("hi")])
            .unwrap();

        let summary = orchestrator.delete_document("doc").await.unwrap();

        assert_eq!(summary.chunks, 1);
        assert_eq!(summary.flashcards, 1);
        assert_eq!(summary.quiz_questions, 1);
        assert!(summary.had_transcript);
        assert!(summary.had_record);

        // Nothing left behind
        assert!(!store.is_document_indexed("doc").await.unwrap());
        assert!(store.flashcards_by_file_id("doc").unwrap().is_empty());
        assert_eq!(store.quiz_question_count("doc").unwrap(), 0);
        assert!(store.get_chat_transcript("doc").unwrap().is_none());
        assert!(store.get_document("doc").unwrap().is_none());
    }
}
