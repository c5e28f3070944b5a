//! Configuration management for Terp.

mod prompts;
mod settings;

pub use prompts::{FlashcardPrompts, Prompts, QuizPrompts, RagPrompts};
pub use settings::{
    ApiSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, RagSettings, Settings, VectorStoreSettings,
};
