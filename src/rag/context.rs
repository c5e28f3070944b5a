//! Context building for RAG responses.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{Chunk, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Returned instead of a context block when no chunks match. Callers treat
/// this as valid-but-empty context, not an error.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant information found in the document.";

/// Retrieves and labels context for a query, scoped to one document.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_sources: usize,
}

impl Retriever {
    /// Create a new retriever.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            max_sources: 5,
        }
    }

    /// Set the maximum number of context sources.
    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }

    /// Build a citation-ready context for a query against one document.
    ///
    /// Sources are labeled 1-based in fetch order; the labels in the
    /// returned text line up with the `sources` vector.
    #[instrument(skip(self), fields(query = %query, file_id = %file_id))]
    pub async fn build_context(&self, query: &str, file_id: &str) -> Result<RetrievedContext> {
        let query_embedding = self.embedder.embed(query).await?;

        let hits = self
            .store
            .search(&query_embedding, file_id, self.max_sources)
            .await?;

        if hits.is_empty() {
            debug!("No matching chunks for document {}", file_id);
            return Ok(RetrievedContext::empty());
        }

        let ids: Vec<Uuid> = hits.iter().map(|hit| hit.id).collect();
        let sources = self.store.fetch_by_ids(&ids).await?;

        let text = format_context(&sources);
        debug!("Labeled context created with {} sources", sources.len());

        Ok(RetrievedContext { text, sources })
    }
}

/// Retrieved context: the labeled text and the source chunks behind it.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Labeled context text, or the sentinel when nothing matched.
    pub text: String,
    /// Source chunks in label order (SOURCE [1] is `sources[0]`).
    pub sources: Vec<Chunk>,
}

impl RetrievedContext {
    /// Context with no matching sources.
    pub fn empty() -> Self {
        Self {
            text: NO_CONTEXT_SENTINEL.to_string(),
            sources: Vec::new(),
        }
    }

    /// Whether any sources matched.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of labeled sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Label chunks as delimited, indexable source blocks.
pub fn format_context(sources: &[Chunk]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("--- SOURCE [{}] ---\n{}\n", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{split_text, ChunkingConfig};
    use crate::error::Result as TerpResult;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Deterministic bag-of-words embedder for tests.
    struct BagOfWordsEmbedder;

    #[async_trait]
    impl Embedder for BagOfWordsEmbedder {
        async fn embed(&self, text: &str) -> TerpResult<Vec<f32>> {
            let mut vector = vec![0.0f32; 64];
            for word in text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                let mut hash = 0usize;
                for byte in word.bytes() {
                    hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
                }
                vector[hash % 64] += 1.0;
            }
            Ok(vector)
        }

        async fn embed_batch(&self, texts: &[String]) -> TerpResult<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            64
        }
    }

    async fn ingest(store: &MemoryVectorStore, embedder: &dyn Embedder, file_id: &str, text: &str) {
        let config = ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 5,
        };
        for chunk in split_text(text, &config) {
            let embedding = embedder.embed(&chunk.content).await.unwrap();
            store
                .insert(&Chunk::new(
                    file_id.to_string(),
                    chunk.content,
                    embedding,
                    None,
                    chunk.order,
                ))
                .await
                .unwrap();
        }
    }

    #[test]
    fn test_format_context_labels() {
        let sources = vec![
            Chunk::new("d".to_string(), "alpha".to_string(), vec![1.0], None, 0),
            Chunk::new("d".to_string(), "beta".to_string(), vec![1.0], None, 1),
        ];

        let text = format_context(&sources);
        assert!(text.contains("--- SOURCE [1] ---\nalpha"));
        assert!(text.contains("--- SOURCE [2] ---\nbeta"));
    }

    #[tokio::test]
    async fn test_zero_hits_returns_sentinel() {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = Arc::new(BagOfWordsEmbedder);

        let retriever = Retriever::new(store, embedder);
        let context = retriever.build_context("anything", "empty-doc").await.unwrap();

        assert!(context.is_empty());
        assert_eq!(context.text, NO_CONTEXT_SENTINEL);
    }

    #[tokio::test]
    async fn test_retrieval_end_to_end() {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = BagOfWordsEmbedder;

        let text =
            "Photosynthesis converts light into chemical energy. Chlorophyll absorbs light.";
        ingest(&store, &embedder, "bio", text).await;

        let retriever = Retriever::new(store, Arc::new(BagOfWordsEmbedder));
        let context = retriever
            .build_context("What absorbs light?", "bio")
            .await
            .unwrap();

        assert!(!context.is_empty());
        assert!(
            context
                .sources
                .iter()
                .any(|chunk| chunk.content.contains("Chlorophyll")),
            "expected a source mentioning Chlorophyll, got: {}",
            context.text
        );
        assert!(context.text.contains("--- SOURCE [1] ---"));
    }

    #[tokio::test]
    async fn test_retrieval_scoped_to_document() {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = BagOfWordsEmbedder;

        ingest(&store, &embedder, "bio", "Chlorophyll absorbs light.").await;
        ingest(&store, &embedder, "physics", "Light is electromagnetic radiation.").await;

        let retriever = Retriever::new(store, Arc::new(BagOfWordsEmbedder));
        let context = retriever
            .build_context("What absorbs light?", "physics")
            .await
            .unwrap();

        for chunk in &context.sources {
            assert_eq!(chunk.file_id, "physics");
        }
    }
}
