//! Hugging Face Inference API embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, TerpError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Request timeout for embedding calls.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Hugging Face Inference API embedder.
pub struct HfEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    dimensions: usize,
}

impl HfEmbedder {
    /// Create a new embedder with default settings.
    pub fn new() -> Self {
        Self::with_settings(&EmbeddingSettings::default())
    }

    /// Create a new embedder from embedding settings.
    pub fn with_settings(settings: &EmbeddingSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
            dimensions: settings.dimensions as usize,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/pipeline/feature-extraction/{}",
            self.endpoint, self.model
        )
    }

    fn api_token(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(TerpError::Config(format!(
                "{} not set. Set it with: export {}='hf_...'",
                self.api_key_env, self.api_key_env
            ))),
        }
    }
}

impl Default for HfEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| TerpError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let token = self.api_token()?;

        let response = self
            .client
            .post(self.url())
            .bearer_auth(token)
            .json(&FeatureExtractionRequest { inputs: texts })
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(TerpError::RateLimited("embedding service".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(TerpError::Embedding(format!(
                "embedding API returned {}: {}",
                status, preview
            )));
        }

        let embeddings: Vec<Vec<f32>> = response.json().await?;

        if embeddings.len() != texts.len() {
            return Err(TerpError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(TerpError::Embedding(format!(
                    "expected {}-dimensional embedding, got {}",
                    self.dimensions,
                    embedding.len()
                )));
            }
        }

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = HfEmbedder::new();
        assert_eq!(embedder.dimensions(), 384);
        assert!(embedder.url().contains("all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let settings = EmbeddingSettings {
            endpoint: "https://example.test/".to_string(),
            ..EmbeddingSettings::default()
        };
        let embedder = HfEmbedder::with_settings(&settings);
        assert!(embedder
            .url()
            .starts_with("https://example.test/pipeline/feature-extraction/"));
    }
}
