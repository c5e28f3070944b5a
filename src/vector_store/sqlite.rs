//! SQLite-backed store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large libraries consider the sqlite-vec extension or a dedicated
//! vector database. Besides chunks, the same database carries the study
//! data: document registry, chat transcripts, flashcards, quizzes, and
//! quiz results.

use super::{
    cosine_similarity, Chunk, DocumentRecord, IndexedDocument, SearchHit, VectorStore,
};
use crate::error::{Result, TerpError};
use crate::rag::ChatMessage;
use crate::study::{Flashcard, QuizQuestion, QuizResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    file_id TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    source_path TEXT NOT NULL,
    owner TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    file_id TEXT NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    page_number INTEGER,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks(file_id);

CREATE TABLE IF NOT EXISTS chat_transcripts (
    file_id TEXT PRIMARY KEY,
    messages_json TEXT NOT NULL,
    saved_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flashcards (
    id TEXT PRIMARY KEY,
    file_id TEXT NOT NULL,
    owner TEXT NOT NULL,
    front TEXT NOT NULL,
    back TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_flashcards_file_id ON flashcards(file_id);

CREATE TABLE IF NOT EXISTS quiz_questions (
    id TEXT PRIMARY KEY,
    file_id TEXT NOT NULL,
    owner TEXT NOT NULL,
    question TEXT NOT NULL,
    options_json TEXT NOT NULL,
    correct_answer INTEGER NOT NULL,
    explanation TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quiz_questions_file_id ON quiz_questions(file_id);

CREATE TABLE IF NOT EXISTS quiz_results (
    id TEXT PRIMARY KEY,
    file_id TEXT NOT NULL,
    owner TEXT NOT NULL,
    score INTEGER NOT NULL,
    total_questions INTEGER NOT NULL,
    percentage REAL NOT NULL,
    taken_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quiz_results_owner ON quiz_results(owner);
"#;

/// SQLite-backed store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TerpError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<Chunk> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(3)?;
        let page_number: Option<i64> = row.get(4)?;
        let indexed_at_str: String = row.get(6)?;

        Ok(Chunk {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            file_id: row.get(1)?,
            content: row.get(2)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            page_number: page_number.map(|p| p as u32),
            chunk_order: row.get(5)?,
            indexed_at: Self::parse_timestamp(&indexed_at_str),
        })
    }

    fn insert_chunk_row(conn: &Connection, chunk: &Chunk) -> Result<()> {
        if chunk.embedding.is_empty() {
            return Err(TerpError::VectorStore(format!(
                "refusing to insert chunk with empty embedding for document {}",
                chunk.file_id
            )));
        }

        let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO chunks
            (id, file_id, content, embedding, page_number, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                chunk.id.to_string(),
                chunk.file_id,
                chunk.content,
                embedding_bytes,
                chunk.page_number.map(|p| p as i64),
                chunk.chunk_order,
                chunk.indexed_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunk))]
    async fn insert(&self, chunk: &Chunk) -> Result<()> {
        let conn = self.conn()?;
        Self::insert_chunk_row(&conn, chunk)?;
        debug!("Inserted chunk {}", chunk.id);
        Ok(())
    }

    #[instrument(skip(self, chunks))]
    async fn insert_batch(&self, chunks: &[Chunk]) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            Self::insert_chunk_row(&tx, chunk)?;
        }

        tx.commit()?;
        info!("Batch inserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        file_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, embedding FROM chunks WHERE file_id = ?1")?;

        let rows = stmt.query_map(params![file_id], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(1)?;
            Ok((id_str, Self::bytes_to_embedding(&embedding_bytes)))
        })?;

        let mut hits: Vec<SearchHit> = rows
            .filter_map(|r| r.ok())
            .map(|(id_str, embedding)| SearchHit {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                score: cosine_similarity(query_embedding, &embedding),
            })
            .collect();

        // Sort by score descending
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        debug!("Found {} matching chunks in {}", hits.len(), file_id);
        Ok(hits)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Chunk>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, file_id, content, embedding, page_number, chunk_order, indexed_at
            FROM chunks
            WHERE id = ?1
            "#,
        )?;

        let mut chunks = Vec::with_capacity(ids.len());
        for id in ids {
            match stmt.query_row(params![id.to_string()], Self::row_to_chunk) {
                Ok(chunk) => chunks.push(chunk),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(chunks)
    }

    #[instrument(skip(self))]
    async fn get_by_file_id(&self, file_id: &str) -> Result<Vec<Chunk>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, file_id, content, embedding, page_number, chunk_order, indexed_at
            FROM chunks
            WHERE file_id = ?1
            ORDER BY chunk_order
            "#,
        )?;

        let chunks = stmt.query_map(params![file_id], Self::row_to_chunk)?;

        let result: Vec<Chunk> = chunks.filter_map(|c| c.ok()).collect();
        debug!("Found {} chunks for document {}", result.len(), file_id);
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn delete_by_file_id(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn()?;

        let deleted = conn.execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])?;

        info!("Deleted {} chunks for document {}", deleted, file_id);
        Ok(deleted)
    }

    async fn is_document_indexed(&self, file_id: &str) -> Result<bool> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE file_id = ?1",
            params![file_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.file_id,
                   COALESCE(d.file_name, c.file_id) AS file_name,
                   COUNT(*) AS chunk_count,
                   MAX(c.indexed_at) AS indexed_at
            FROM chunks c
            LEFT JOIN documents d ON d.file_id = c.file_id
            GROUP BY c.file_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let documents = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(3)?;
            Ok(IndexedDocument {
                file_id: row.get(0)?,
                file_name: row.get(1)?,
                chunk_count: row.get(2)?,
                indexed_at: Self::parse_timestamp(&indexed_at_str),
            })
        })?;

        let result: Vec<IndexedDocument> = documents.filter_map(|d| d.ok()).collect();
        Ok(result)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// Document registry methods (not part of VectorStore trait)
impl SqliteVectorStore {
    /// Register or update a document record.
    pub fn upsert_document(&self, record: &DocumentRecord) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents (file_id, file_name, source_path, owner, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.file_id,
                record.file_name,
                record.source_path,
                record.owner,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Look up a document record.
    pub fn get_document(&self, file_id: &str) -> Result<Option<DocumentRecord>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            "SELECT file_id, file_name, source_path, owner, created_at FROM documents WHERE file_id = ?1",
            params![file_id],
            |row| {
                let created_at_str: String = row.get(4)?;
                Ok(DocumentRecord {
                    file_id: row.get(0)?,
                    file_name: row.get(1)?,
                    source_path: row.get(2)?,
                    owner: row.get(3)?,
                    created_at: Self::parse_timestamp(&created_at_str),
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a document's registry record.
    pub fn delete_document_record(&self, file_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM documents WHERE file_id = ?1", params![file_id])?;
        Ok(deleted > 0)
    }
}

// Chat transcript methods
impl SqliteVectorStore {
    /// Save a conversation wholesale, replacing any previous transcript.
    pub fn save_chat_transcript(&self, file_id: &str, messages: &[ChatMessage]) -> Result<()> {
        let conn = self.conn()?;

        let messages_json = serde_json::to_string(messages)?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO chat_transcripts (file_id, messages_json, saved_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![file_id, messages_json, Utc::now().to_rfc3339()],
        )?;

        info!("Saved chat transcript for document {}", file_id);
        Ok(())
    }

    /// Load the saved conversation for a document.
    pub fn get_chat_transcript(&self, file_id: &str) -> Result<Option<Vec<ChatMessage>>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            "SELECT messages_json FROM chat_transcripts WHERE file_id = ?1",
            params![file_id],
            |row| {
                let json: String = row.get(0)?;
                Ok(json)
            },
        );

        match result {
            Ok(json) => {
                let messages: Vec<ChatMessage> = serde_json::from_str(&json)?;
                Ok(Some(messages))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a document's saved conversation.
    pub fn delete_chat_transcript(&self, file_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM chat_transcripts WHERE file_id = ?1",
            params![file_id],
        )?;
        Ok(deleted > 0)
    }
}

// Flashcard methods
impl SqliteVectorStore {
    /// Persist one flashcard.
    pub fn insert_flashcard(&self, card: &Flashcard) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO flashcards (id, file_id, owner, front, back, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                card.id.to_string(),
                card.file_id,
                card.owner,
                card.front,
                card.back,
                card.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// All flashcards for a document, oldest first.
    pub fn flashcards_by_file_id(&self, file_id: &str) -> Result<Vec<Flashcard>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, file_id, owner, front, back, created_at FROM flashcards WHERE file_id = ?1 ORDER BY created_at",
        )?;

        let cards = stmt.query_map(params![file_id], |row| {
            let id_str: String = row.get(0)?;
            let created_at_str: String = row.get(5)?;
            Ok(Flashcard {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                file_id: row.get(1)?,
                owner: row.get(2)?,
                front: row.get(3)?,
                back: row.get(4)?,
                created_at: Self::parse_timestamp(&created_at_str),
            })
        })?;

        Ok(cards.filter_map(|c| c.ok()).collect())
    }

    /// Remove all flashcards for a document.
    pub fn delete_flashcards_by_file_id(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM flashcards WHERE file_id = ?1", params![file_id])?;
        Ok(deleted)
    }
}

// Quiz methods
impl SqliteVectorStore {
    /// Persist one quiz question.
    pub fn insert_quiz_question(&self, question: &QuizQuestion) -> Result<()> {
        let conn = self.conn()?;

        let options_json = serde_json::to_string(&question.options)?;

        conn.execute(
            r#"
            INSERT INTO quiz_questions
            (id, file_id, owner, question, options_json, correct_answer, explanation, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                question.id.to_string(),
                question.file_id,
                question.owner,
                question.question,
                options_json,
                question.correct_answer as i64,
                question.explanation,
                question.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Number of stored quiz questions for a document.
    ///
    /// The generator checks this before calling the model so quiz
    /// generation stays at-most-once per document.
    pub fn quiz_question_count(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM quiz_questions WHERE file_id = ?1",
            params![file_id],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    /// All quiz questions for a document, oldest first.
    pub fn quiz_questions_by_file_id(&self, file_id: &str) -> Result<Vec<QuizQuestion>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, file_id, owner, question, options_json, correct_answer, explanation, created_at
            FROM quiz_questions
            WHERE file_id = ?1
            ORDER BY created_at
            "#,
        )?;

        let questions = stmt.query_map(params![file_id], |row| {
            let id_str: String = row.get(0)?;
            let options_json: String = row.get(4)?;
            let correct_answer: i64 = row.get(5)?;
            let created_at_str: String = row.get(7)?;
            Ok(QuizQuestion {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                file_id: row.get(1)?,
                owner: row.get(2)?,
                question: row.get(3)?,
                options: serde_json::from_str(&options_json).unwrap_or_default(),
                correct_answer: correct_answer as u8,
                explanation: row.get(6)?,
                created_at: Self::parse_timestamp(&created_at_str),
            })
        })?;

        Ok(questions.filter_map(|q| q.ok()).collect())
    }

    /// Remove all quiz questions for a document.
    pub fn delete_quiz_questions_by_file_id(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM quiz_questions WHERE file_id = ?1",
            params![file_id],
        )?;
        Ok(deleted)
    }

    /// Record a completed quiz attempt.
    pub fn insert_quiz_result(&self, result: &QuizResult) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO quiz_results
            (id, file_id, owner, score, total_questions, percentage, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                result.id.to_string(),
                result.file_id,
                result.owner,
                result.score as i64,
                result.total_questions as i64,
                result.percentage,
                result.taken_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// All quiz results for a principal, newest first.
    pub fn quiz_results_by_owner(&self, owner: &str) -> Result<Vec<QuizResult>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, file_id, owner, score, total_questions, percentage, taken_at
            FROM quiz_results
            WHERE owner = ?1
            ORDER BY taken_at DESC
            "#,
        )?;

        let results = stmt.query_map(params![owner], |row| {
            let id_str: String = row.get(0)?;
            let score: i64 = row.get(3)?;
            let total: i64 = row.get(4)?;
            let taken_at_str: String = row.get(6)?;
            Ok(QuizResult {
                id: Uuid::parse_str(&id_str).unwrap_or_default(),
                file_id: row.get(1)?,
                owner: row.get(2)?,
                score: score as u32,
                total_questions: total as u32,
                percentage: row.get(5)?,
                taken_at: Self::parse_timestamp(&taken_at_str),
            })
        })?;

        Ok(results.filter_map(|r| r.ok()).collect())
    }

    /// Remove all quiz results for a principal.
    pub fn clear_quiz_results_by_owner(&self, owner: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM quiz_results WHERE owner = ?1", params![owner])?;
        Ok(deleted)
    }

    /// Delete all quiz results for a document.
    pub fn delete_quiz_results_by_file_id(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM quiz_results WHERE file_id = ?1",
            params![file_id],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_insert_and_search_scoped() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let chunk_a = Chunk::new(
            "doc1".to_string(),
            "This is test content".to_string(),
            vec![1.0, 0.0, 0.0],
            Some(1),
            0,
        );
        let chunk_b = Chunk::new(
            "doc2".to_string(),
            "Identical vector, different document".to_string(),
            vec![1.0, 0.0, 0.0],
            None,
            0,
        );

        store.insert(&chunk_a).await.unwrap();
        store.insert(&chunk_b).await.unwrap();

        // Search scoped to doc1 never returns doc2 chunks, however close
        let hits = store.search(&[1.0, 0.0, 0.0], "doc1", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, chunk_a.id);
        assert!((hits[0].score - 1.0).abs() < 0.001);

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 2);

        let deleted = store.delete_by_file_id("doc1").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(!store.is_document_indexed("doc1").await.unwrap());
        assert!(store.is_document_indexed("doc2").await.unwrap());
    }

    #[tokio::test]
    async fn test_on_disk_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("library.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .insert(&Chunk::new(
                    "doc".to_string(),
                    "persisted".to_string(),
                    vec![0.5, -0.25],
                    Some(2),
                    0,
                ))
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), 1);

        let chunks = store.get_by_file_id("doc").await.unwrap();
        assert_eq!(chunks[0].content, "persisted");
        assert_eq!(chunks[0].embedding, vec![0.5, -0.25]);
        assert_eq!(chunks[0].page_number, Some(2));
    }

    #[tokio::test]
    async fn test_empty_embedding_rejected() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let chunk = Chunk::new("doc1".to_string(), "content".to_string(), vec![], None, 0);

        let result = store.insert(&chunk).await;
        assert!(result.is_err());
        assert_eq!(store.chunk_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_by_ids_preserves_order_and_skips_missing() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let first = Chunk::new("doc".to_string(), "first".to_string(), vec![1.0], None, 0);
        let second = Chunk::new("doc".to_string(), "second".to_string(), vec![0.5], None, 1);
        store.insert_batch(&[first.clone(), second.clone()]).await.unwrap();

        let missing = Uuid::new_v4();
        let fetched = store
            .fetch_by_ids(&[second.id, missing, first.id])
            .await
            .unwrap();

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].content, "second");
        assert_eq!(fetched[1].content, "first");
    }

    #[test]
    fn test_document_registry_roundtrip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let record = DocumentRecord {
            file_id: "notes".to_string(),
            file_name: "notes.pdf".to_string(),
            source_path: "/tmp/notes.pdf".to_string(),
            owner: "dev_user_123".to_string(),
            created_at: Utc::now(),
        };

        store.upsert_document(&record).unwrap();

        let loaded = store.get_document("notes").unwrap().unwrap();
        assert_eq!(loaded.file_name, "notes.pdf");
        assert_eq!(loaded.owner, "dev_user_123");

        assert!(store.delete_document_record("notes").unwrap());
        assert!(store.get_document("notes").unwrap().is_none());
    }

    #[test]
    fn test_chat_transcript_overwritten_wholesale() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let first = vec![ChatMessage::user("hello")];
        store.save_chat_transcript("doc", &first).unwrap();

        let second = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi [1]"),
        ];
        store.save_chat_transcript("doc", &second).unwrap();

        let loaded = store.get_chat_transcript("doc").unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].content, "hi [1]");
    }

    #[test]
    fn test_quiz_questions_and_results() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let question = QuizQuestion::new(
            "doc".to_string(),
            "user".to_string(),
            "What is 2+2?".to_string(),
            vec!["1".into(), "2".into(), "4".into(), "8".into()],
            2,
            "Basic arithmetic.".to_string(),
        );

        store.insert_quiz_question(&question).unwrap();
        assert_eq!(store.quiz_question_count("doc").unwrap(), 1);

        let loaded = store.quiz_questions_by_file_id("doc").unwrap();
        assert_eq!(loaded[0].options.len(), 4);
        assert_eq!(loaded[0].correct_answer, 2);

        let result = QuizResult::new("doc".to_string(), "user".to_string(), 1, 1);
        store.insert_quiz_result(&result).unwrap();

        let results = store.quiz_results_by_owner("user").unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].percentage - 100.0).abs() < 0.001);

        assert_eq!(store.clear_quiz_results_by_owner("user").unwrap(), 1);
        assert!(store.quiz_results_by_owner("user").unwrap().is_empty());
    }
}
