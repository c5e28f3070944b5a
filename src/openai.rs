//! Chat-completions client configuration with sensible defaults.
//!
//! Terp talks to any OpenAI-compatible endpoint; the default configuration
//! points at Groq's compatibility layer.

use crate::config::ApiSettings;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for chat API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a chat client for the configured OpenAI-compatible endpoint.
pub fn create_client(api: &ApiSettings) -> Client<OpenAIConfig> {
    create_client_with_timeout(api, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a chat client with a custom timeout.
pub fn create_client_with_timeout(api: &ApiSettings, timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let api_key = std::env::var(&api.api_key_env).unwrap_or_default();

    let config = OpenAIConfig::new()
        .with_api_base(&api.api_base)
        .with_api_key(api_key);

    Client::with_config(config).with_http_client(http_client)
}
