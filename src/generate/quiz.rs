//! Quiz generation from document text.

use super::{truncate_chars, unwrap_array, GenerationOutcome, IdempotencyPolicy};
use crate::config::{Prompts, Settings};
use crate::error::{Result, TerpError};
use crate::openai::create_client;
use crate::study::{QuizQuestion, QUIZ_OPTION_COUNT};
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
struct ParsedQuestion {
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: u8,
    explanation: String,
}

/// Generates multiple-choice quizzes from document text.
pub struct QuizGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    prompts: Prompts,
    count: u32,
    max_input_chars: usize,
    policy: IdempotencyPolicy,
    store: Arc<SqliteVectorStore>,
}

impl QuizGenerator {
    /// Create a new quiz generator.
    ///
    /// Quiz generation is at-most-once per document: existing questions
    /// short-circuit the model call. Clear them first to regenerate, or
    /// override the policy with [`with_policy`].
    ///
    /// [`with_policy`]: Self::with_policy
    pub fn new(store: Arc<SqliteVectorStore>, settings: &Settings) -> Self {
        Self {
            client: create_client(&settings.api),
            model: settings.rag.model.clone(),
            prompts: Prompts::default(),
            count: settings.generation.quiz_question_count,
            max_input_chars: settings.generation.quiz_input_chars,
            policy: IdempotencyPolicy::SkipIfExisting,
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

    /// Generate quiz questions for a document and persist them.
    #[instrument(skip(self, document_text), fields(file_id = %file_id))]
    pub async fn generate(
        &self,
        file_id: &str,
        owner: &str,
        document_text: &str,
    ) -> Result<GenerationOutcome> {
        if self.policy == IdempotencyPolicy::SkipIfExisting
            && self.store.quiz_question_count(file_id)? > 0
        {
            info!("Quiz questions already exist for {}, skipping", file_id);
            return Ok(GenerationOutcome::SkippedExisting);
        }

        let text = truncate_chars(document_text, self.max_input_chars);

        let mut vars = HashMap::new();
        vars.insert("count".to_string(), self.count.to_string());
        vars.insert("text".to_string(), text.to_string());

        let system_message = self
            .prompts
            .render_with_custom(&self.prompts.quiz.system, &vars);
        let user_message = self
            .prompts
            .render_with_custom(&self.prompts.quiz.user, &vars);

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
            .build()
            .map_err(|e| TerpError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TerpError::ChatApi(format!("Quiz generation failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TerpError::Generation("Empty response from LLM".to_string()))?;

        let questions = parse_questions(content)?;

        for question in &questions {
            self.store.insert_quiz_question(&QuizQuestion::new(
                file_id.to_string(),
                owner.to_string(),
                question.question.clone(),
                question.options.clone(),
                question.correct_answer,
                question.explanation.clone(),
            ))?;
        }

        info!("Generated {} quiz questions for {}", questions.len(), file_id);
        Ok(GenerationOutcome::Generated(questions.len()))
    }
}

/// Parse and validate the model's quiz response.
fn parse_questions(content: &str) -> Result<Vec<ParsedQuestion>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| TerpError::MalformedModelOutput(format!("not valid JSON: {}", e)))?;

    let items = unwrap_array(value, "questions")?;

    let questions = items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<ParsedQuestion>(item)
                .map_err(|e| TerpError::MalformedModelOutput(format!("bad question: {}", e)))
        })
        .collect::<Result<Vec<_>>>()?;

    if questions.is_empty() {
        return Err(TerpError::MalformedModelOutput(
            "model returned no questions".to_string(),
        ));
    }

    for question in &questions {
        if question.question.trim().is_empty() {
            return Err(TerpError::MalformedModelOutput(
                "question with empty text".to_string(),
            ));
        }
        if question.options.len() != QUIZ_OPTION_COUNT {
            return Err(TerpError::MalformedModelOutput(format!(
                "expected {} options, got {}",
                QUIZ_OPTION_COUNT,
                question.options.len()
            )));
        }
        if question.correct_answer as usize >= QUIZ_OPTION_COUNT {
            return Err(TerpError::MalformedModelOutput(format!(
                "correctAnswer index {} out of range",
                question.correct_answer
            )));
        }
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_questions_skip_generation() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
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

        let generator = QuizGenerator::new(store.clone(), &Settings::default());

        // Short-circuits before any model call
        let outcome = generator.generate("doc", "user", "text").await.unwrap();
        assert_eq!(outcome, GenerationOutcome::SkippedExisting);
        assert_eq!(store.quiz_question_count("doc").unwrap(), 1);
    }

    const VALID: &str = r#"{"questions": [{
        "question": "What does chlorophyll absorb?",
        "options": ["Sound", "Light", "Heat", "Water"],
        "correctAnswer": 1,
        "explanation": "Chlorophyll absorbs light for photosynthesis."
    }]}"#;

    #[test]
    fn test_parse_wrapped_questions() {
        let questions = parse_questions(VALID).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, 1);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn test_parse_bare_array() {
        let content = r#"[{
            "question": "Q", "options": ["a","b","c","d"],
            "correctAnswer": 0, "explanation": "E"
        }]"#;
        assert_eq!(parse_questions(content).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_wrong_option_count() {
        let content = r#"[{
            "question": "Q", "options": ["a","b","c"],
            "correctAnswer": 0, "explanation": "E"
        }]"#;
        assert!(matches!(
            parse_questions(content),
            Err(TerpError::MalformedModelOutput(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_answer() {
        let content = r#"[{
            "question": "Q", "options": ["a","b","c","d"],
            "correctAnswer": 4, "explanation": "E"
        }]"#;
        assert!(matches!(
            parse_questions(content),
            Err(TerpError::MalformedModelOutput(_))
        ));
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            parse_questions("Here are your questions..."),
            Err(TerpError::MalformedModelOutput(_))
        ));
    }
}
