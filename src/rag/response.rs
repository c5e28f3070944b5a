//! RAG response generation.

use super::{context::Retriever, ChatMessage, RetrievedContext};
use crate::config::{ApiSettings, Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{Result, TerpError};
use crate::openai::create_client;
use crate::vector_store::{Chunk, VectorStore};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Answer for questions with no matching context in the document.
pub const NOT_FOUND_FALLBACK: &str =
    "I'm sorry, I couldn't find that information in the uploaded document.";

/// Shown when the chat service rate-limits us.
pub const BUSY_FALLBACK: &str = "The system is a bit busy. Please try again in a moment.";

/// Shown for any other internal failure during a chat turn.
pub const ERROR_FALLBACK: &str =
    "I hit a snag communicating with the AI. Please verify your settings.";

/// Keep at most this many turns of conversation history.
const MAX_HISTORY_TURNS: usize = 20;

/// Chat engine for answering questions about a single document.
pub struct ChatEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retriever: Retriever,
    prompts: Prompts,
    history: Vec<ChatMessage>,
}

impl ChatEngine {
    /// Create a new chat engine.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        api: &ApiSettings,
        rag: &RagSettings,
    ) -> Self {
        let retriever = Retriever::new(store, embedder)
            .with_max_sources(rag.max_context_chunks as usize);

        Self {
            client: create_client(api),
            model: rag.model.clone(),
            temperature: rag.temperature,
            max_tokens: rag.max_tokens,
            retriever,
            prompts: Prompts::default(),
            history: Vec::new(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Seed conversation history (e.g. from a saved transcript).
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// The conversation so far, as displayed turns.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Clear conversation history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Answer a question about one document.
    ///
    /// Internal failures are absorbed into a displayable answer: a
    /// rate-limited upstream yields [`BUSY_FALLBACK`], anything else yields
    /// [`ERROR_FALLBACK`]. This never returns an error to the caller.
    #[instrument(skip(self), fields(file_id = %file_id))]
    pub async fn chat(&mut self, user_input: &str, file_id: &str) -> ChatReply {
        let reply = match self.try_chat(user_input, file_id).await {
            Ok(reply) => reply,
            Err(TerpError::RateLimited(service)) => {
                warn!("Rate limited by {}", service);
                ChatReply {
                    answer: BUSY_FALLBACK.to_string(),
                    sources: Vec::new(),
                }
            }
            Err(e) => {
                warn!("Chat turn failed: {}", e);
                ChatReply {
                    answer: ERROR_FALLBACK.to_string(),
                    sources: Vec::new(),
                }
            }
        };

        self.record_turn(user_input, &reply.answer);
        reply
    }

    async fn try_chat(&self, user_input: &str, file_id: &str) -> Result<ChatReply> {
        info!("Processing question for document {}", file_id);

        let context = self.retriever.build_context(user_input, file_id).await?;

        if context.is_empty() {
            return Ok(ChatReply {
                answer: NOT_FOUND_FALLBACK.to_string(),
                sources: Vec::new(),
            });
        }

        let user_prompt = self.render_user_prompt(user_input, &context);

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.rag.system.clone())
                .build()
                .map_err(|e| TerpError::Rag(e.to_string()))?
                .into(),
        ];
        messages.extend(self.history_messages()?);
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| TerpError::Rag(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| TerpError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_chat_error)?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TerpError::Rag("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer with {} sources", context.source_count());

        Ok(ChatReply {
            answer,
            sources: context.sources,
        })
    }

    fn render_user_prompt(&self, user_input: &str, context: &RetrievedContext) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), user_input.to_string());
        vars.insert("context".to_string(), context.text.clone());

        self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
    }

    fn history_messages(&self) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(self.history.len());
        for turn in &self.history {
            let message: ChatCompletionRequestMessage = match turn.role.as_str() {
                "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| TerpError::Rag(e.to_string()))?
                    .into(),
                _ => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| TerpError::Rag(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }
        Ok(messages)
    }

    fn record_turn(&mut self, user_input: &str, answer: &str) {
        self.history.push(ChatMessage::user(user_input));
        self.history.push(ChatMessage::assistant(answer));

        // Trim history if too long
        let max_messages = MAX_HISTORY_TURNS * 2;
        if self.history.len() > max_messages {
            self.history = self.history[self.history.len() - max_messages..].to_vec();
        }
    }
}

/// A chat reply with the answer and its sources.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// The generated answer, or a fallback message.
    pub answer: String,
    /// Source chunks in citation label order.
    pub sources: Vec<Chunk>,
}

impl ChatReply {
    /// Citation indices referenced in the answer.
    pub fn citations(&self) -> Vec<usize> {
        super::extract_citations(&self.answer)
    }
}

/// Distinguish rate-limit responses from other chat API failures.
fn classify_chat_error(error: OpenAIError) -> TerpError {
    if is_rate_limited(&error) {
        TerpError::RateLimited("chat service".to_string())
    } else {
        TerpError::ChatApi(error.to_string())
    }
}

fn is_rate_limited(error: &OpenAIError) -> bool {
    match error {
        OpenAIError::ApiError(api) => {
            api.code.as_deref() == Some("rate_limit_exceeded")
                || api.message.to_lowercase().contains("rate limit")
                || api.message.contains("429")
        }
        OpenAIError::Reqwest(e) => e
            .status()
            .is_some_and(|status| status == reqwest::StatusCode::TOO_MANY_REQUESTS),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(message: &str, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: None,
            param: None,
            code: code.map(|c| c.to_string()),
        })
    }

    #[test]
    fn test_rate_limit_detected_by_code() {
        let error = api_error("Too many requests", Some("rate_limit_exceeded"));
        assert!(matches!(
            classify_chat_error(error),
            TerpError::RateLimited(_)
        ));
    }

    #[test]
    fn test_rate_limit_detected_by_message() {
        let error = api_error("Rate limit reached for model", None);
        assert!(matches!(
            classify_chat_error(error),
            TerpError::RateLimited(_)
        ));
    }

    #[test]
    fn test_other_errors_are_chat_api() {
        let error = api_error("model not found", Some("model_not_found"));
        assert!(matches!(classify_chat_error(error), TerpError::ChatApi(_)));
    }

    #[test]
    fn test_chat_reply_citations() {
        let reply = ChatReply {
            answer: "Light is absorbed by chlorophyll [2].".to_string(),
            sources: Vec::new(),
        };
        assert_eq!(reply.citations(), vec![2]);
    }

    /// Stub embedder so the zero-chunk path needs no network.
    struct ZeroEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ZeroEmbedder {
        async fn embed(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0; 4]).collect())
        }

        fn dimensions(&self) -> usize {
            4
        }
    }

    #[tokio::test]
    async fn test_chat_with_no_ingested_chunks_never_throws() {
        use crate::vector_store::MemoryVectorStore;

        let store = Arc::new(MemoryVectorStore::new());
        let mut engine = ChatEngine::new(
            store,
            Arc::new(ZeroEmbedder),
            &ApiSettings::default(),
            &RagSettings::default(),
        );

        let reply = engine.chat("What is this about?", "empty-doc").await;

        assert_eq!(reply.answer, NOT_FOUND_FALLBACK);
        assert!(reply.sources.is_empty());
        // The failed lookup still lands in the conversation history
        assert_eq!(engine.history().len(), 2);
    }
}
