//! In-memory vector store implementation.
//!
//! Useful for testing and small libraries.

use super::{cosine_similarity, Chunk, IndexedDocument, SearchHit, VectorStore};
use crate::error::{Result, TerpError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector store.
pub struct MemoryVectorStore {
    chunks: RwLock<HashMap<Uuid, Chunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert(&self, chunk: &Chunk) -> Result<()> {
        if chunk.embedding.is_empty() {
            return Err(TerpError::VectorStore(format!(
                "refusing to insert chunk with empty embedding for document {}",
                chunk.file_id
            )));
        }

        let mut chunks = self.chunks.write().unwrap();
        chunks.insert(chunk.id, chunk.clone());
        Ok(())
    }

    async fn insert_batch(&self, batch: &[Chunk]) -> Result<usize> {
        for chunk in batch {
            self.insert(chunk).await?;
        }
        Ok(batch.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        file_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let chunks = self.chunks.read().unwrap();

        let mut hits: Vec<SearchHit> = chunks
            .values()
            .filter(|chunk| chunk.file_id == file_id)
            .map(|chunk| SearchHit {
                id: chunk.id,
                score: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        Ok(hits)
    }

    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read().unwrap();
        Ok(ids.iter().filter_map(|id| chunks.get(id).cloned()).collect())
    }

    async fn get_by_file_id(&self, file_id: &str) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read().unwrap();
        let mut result: Vec<Chunk> = chunks
            .values()
            .filter(|chunk| chunk.file_id == file_id)
            .cloned()
            .collect();
        result.sort_by_key(|chunk| chunk.chunk_order);
        Ok(result)
    }

    async fn delete_by_file_id(&self, file_id: &str) -> Result<usize> {
        let mut chunks = self.chunks.write().unwrap();
        let initial_len = chunks.len();
        chunks.retain(|_, chunk| chunk.file_id != file_id);
        Ok(initial_len - chunks.len())
    }

    async fn is_document_indexed(&self, file_id: &str) -> Result<bool> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.values().any(|chunk| chunk.file_id == file_id))
    }

    async fn list_documents(&self) -> Result<Vec<IndexedDocument>> {
        let chunks = self.chunks.read().unwrap();

        let mut document_map: HashMap<String, IndexedDocument> = HashMap::new();

        for chunk in chunks.values() {
            let entry = document_map
                .entry(chunk.file_id.clone())
                .or_insert_with(|| IndexedDocument {
                    file_id: chunk.file_id.clone(),
                    file_name: chunk.file_id.clone(),
                    chunk_count: 0,
                    indexed_at: chunk.indexed_at,
                });

            entry.chunk_count += 1;
            if chunk.indexed_at > entry.indexed_at {
                entry.indexed_at = chunk.indexed_at;
            }
        }

        let mut documents: Vec<IndexedDocument> = document_map.into_values().collect();
        documents.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(documents)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let chunk1 = Chunk::new(
            "doc1".to_string(),
            "Hello world".to_string(),
            vec![1.0, 0.0, 0.0],
            Some(1),
            0,
        );
        let chunk2 = Chunk::new(
            "doc1".to_string(),
            "Goodbye world".to_string(),
            vec![0.0, 1.0, 0.0],
            Some(1),
            1,
        );

        store.insert_batch(&[chunk1, chunk2]).await.unwrap();

        assert_eq!(store.chunk_count().await.unwrap(), 2);

        let hits = store.search(&[1.0, 0.0, 0.0], "doc1", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score > hits[1].score);

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].chunk_count, 2);
    }

    #[tokio::test]
    async fn test_search_never_crosses_documents() {
        let store = MemoryVectorStore::new();

        let ours = Chunk::new("d1".to_string(), "ours".to_string(), vec![1.0, 0.0], None, 0);
        let theirs = Chunk::new("d2".to_string(), "theirs".to_string(), vec![1.0, 0.0], None, 0);
        store.insert_batch(&[ours.clone(), theirs]).await.unwrap();

        let hits = store.search(&[1.0, 0.0], "d1", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ours.id);
    }

    #[tokio::test]
    async fn test_empty_embedding_rejected() {
        let store = MemoryVectorStore::new();
        let chunk = Chunk::new("d1".to_string(), "bad".to_string(), vec![], None, 0);
        assert!(store.insert(&chunk).await.is_err());
    }
}
