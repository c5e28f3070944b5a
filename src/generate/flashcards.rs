//! Flashcard generation from document text.

use super::{truncate_chars, unwrap_array, GenerationOutcome, IdempotencyPolicy};
use crate::config::{Prompts, Settings};
use crate::error::{Result, TerpError};
use crate::openai::create_client;
use crate::study::Flashcard;
use crate::vector_store::SqliteVectorStore;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct ParsedFlashcard {
    front: String,
    back: String,
}

/// Generates question/answer flashcards from document text.
pub struct FlashcardGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: Prompts,
    count: u32,
    max_input_chars: usize,
    policy: IdempotencyPolicy,
    store: Arc<SqliteVectorStore>,
}

impl FlashcardGenerator {
    /// Create a new flashcard generator.
    ///
    /// Repeated generation appends more cards by default; pass
    /// [`IdempotencyPolicy::SkipIfExisting`] via [`with_policy`] to change
    /// that.
    ///
    /// [`with_policy`]: Self::with_policy
    pub fn new(store: Arc<SqliteVectorStore>, settings: &Settings) -> Self {
        Self {
            client: create_client(&settings.api),
            model: settings.rag.model.clone(),
            prompts: Prompts::default(),
            count: settings.generation.flashcard_count,
            max_input_chars: settings.generation.flashcard_input_chars,
            policy: IdempotencyPolicy::AlwaysGenerate,
            store,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Override the idempotency policy.
    pub fn with_policy(mut self, policy: IdempotencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate flashcards for a document and persist them.
    #[instrument(skip(self, document_text), fields(file_id = %file_id))]
    pub async fn generate(
        &self,
        file_id: &str,
        owner: &str,
        document_text: &str,
    ) -> Result<GenerationOutcome> {
        if self.policy == IdempotencyPolicy::SkipIfExisting
            && !self.store.flashcards_by_file_id(file_id)?.is_empty()
        {
            info!("Flashcards already exist for {}, skipping", file_id);
            return Ok(GenerationOutcome::SkippedExisting);
        }

        let text = truncate_chars(document_text, self.max_input_chars);

        let mut vars = HashMap::new();
        vars.insert("count".to_string(), self.count.to_string());
        vars.insert("text".to_string(), text.to_string());

        let system_message = self
            .prompts
            .render_with_custom(&self.prompts.flashcards.system, &vars);
        let user_message = self
            .prompts
            .render_with_custom(&self.prompts.flashcards.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_message)
                .build()
                .map_err(|e| TerpError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| TerpError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.7)
            .build()
            .map_err(|e| TerpError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TerpError::ChatApi(format!("Flashcard generation failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TerpError::Generation("Empty response from LLM".to_string()))?;

        let cards = parse_flashcards(content)?;

        for card in &cards {
            self.store.insert_flashcard(&Flashcard::new(
                file_id.to_string(),
                owner.to_string(),
                card.front.clone(),
                card.back.clone(),
            ))?;
        }

        info!("Generated {} flashcards for {}", cards.len(), file_id);
        Ok(GenerationOutcome::Generated(cards.len()))
    }
}

/// Parse and validate the model's flashcard response.
fn parse_flashcards(content: &str) -> Result<Vec<ParsedFlashcard>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| TerpError::MalformedModelOutput(format!("not valid JSON: {}", e)))?;

    let items = unwrap_array(value, "flashcards")?;

    let cards = items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<ParsedFlashcard>(item)
                .map_err(|e| TerpError::MalformedModelOutput(format!("bad flashcard: {}", e)))
        })
        .collect::<Result<Vec<_>>>()?;

    if cards.is_empty() {
        return Err(TerpError::MalformedModelOutput(
            "model returned no flashcards".to_string(),
        ));
    }

    for card in &cards {
        if card.front.trim().is_empty() || card.back.trim().is_empty() {
            return Err(TerpError::MalformedModelOutput(
                "flashcard with empty front or back".to_string(),
            ));
        }
    }

    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_skip_if_existing_policy() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        store
            .insert_flashcard(&Flashcard::new(
                "doc".to_string(),
                "user".to_string(),
                "Q".to_string(),
                "A".to_string(),
            ))
            .unwrap();

        let generator = FlashcardGenerator::new(store.clone(), &Settings::default())
            .with_policy(IdempotencyPolicy::SkipIfExisting);

        let outcome = generator.generate("doc", "user", "text").await.unwrap();
        assert_eq!(outcome, GenerationOutcome::SkippedExisting);
        assert_eq!(store.flashcards_by_file_id("doc").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_bare_array() {
        let content = r#"[{"front": "What is RAM?", "back": "Volatile memory."}]"#;
        let cards = parse_flashcards(content).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "What is RAM?");
    }

    #[test]
    fn test_parse_wrapped_object() {
        let content = r#"{"flashcards": [
            {"front": "Q1", "back": "A1"},
            {"front": "Q2", "back": "A2"}
        ]}"#;
        let cards = parse_flashcards(content).unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = parse_flashcards("I could not generate flashcards, sorry!");
        assert!(matches!(result, Err(TerpError::MalformedModelOutput(_))));
    }

    #[test]
    fn test_parse_rejects_missing_keys() {
        let result = parse_flashcards(r#"[{"question": "wrong schema"}]"#);
        assert!(matches!(result, Err(TerpError::MalformedModelOutput(_))));
    }

    #[test]
    fn test_parse_rejects_empty_fields() {
        let result = parse_flashcards(r#"[{"front": " ", "back": "A"}]"#);
        assert!(matches!(result, Err(TerpError::MalformedModelOutput(_))));
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        let result = parse_flashcards("[]");
        assert!(matches!(result, Err(TerpError::MalformedModelOutput(_))));
    }
}
