//! Vector store abstraction for Terp.
//!
//! Provides a trait-based interface for different vector database backends.
//! Every similarity search is scoped to a single document; chunks never
//! match across document boundaries.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Document this chunk belongs to.
    pub file_id: String,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Page the chunk starts on, when known.
    pub page_number: Option<u32>,
    /// Order of this chunk in the document.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(
        file_id: String,
        content: String,
        embedding: Vec<f32>,
        page_number: Option<u32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_id,
            content,
            embedding,
            page_number,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }
}

/// A similarity search hit: chunk id and score, descending by score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// ID of the matched chunk.
    pub id: Uuid,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Registry entry for an ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document ID.
    pub file_id: String,
    /// Display name.
    pub file_name: String,
    /// Path the PDF was ingested from.
    pub source_path: String,
    /// Principal that owns this document.
    pub owner: String,
    /// When the document was registered.
    pub created_at: DateTime<Utc>,
}

/// Summary information about an indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document ID.
    pub file_id: String,
    /// Display name.
    pub file_name: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the document was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a chunk with its embedding.
    ///
    /// Chunks with an empty embedding are rejected before persistence so
    /// the vector index never holds malformed rows.
    async fn insert(&self, chunk: &Chunk) -> Result<()>;

    /// Bulk insert chunks.
    async fn insert_batch(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Search for similar chunks within a single document.
    async fn search(
        &self,
        query_embedding: &[f32],
        file_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Materialize full chunk records for the given ids, in the order the
    /// ids are given. Missing ids are skipped.
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Chunk>>;

    /// Get all chunks for a document, in insertion order.
    async fn get_by_file_id(&self, file_id: &str) -> Result<Vec<Chunk>>;

    /// Delete all chunks for a document.
    async fn delete_by_file_id(&self, file_id: &str) -> Result<usize>;

    /// Check if a document has indexed chunks.
    async fn is_document_indexed(&self, file_id: &str) -> Result<bool>;

    /// List all indexed documents.
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>>;

    /// Get total chunk count.
    async fn chunk_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_chunk_new() {
        let chunk = Chunk::new(
            "doc1".to_string(),
            "content".to_string(),
            vec![1.0, 0.0],
            Some(3),
            7,
        );

        assert_eq!(chunk.file_id, "doc1");
        assert_eq!(chunk.page_number, Some(3));
        assert_eq!(chunk.chunk_order, 7);
    }
}
