use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message role in a conversation replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One completion from the external model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation failed: {0}")]
    Failed(String),
}

/// The external text-generation collaborator: prompt in, text out.
///
/// Implementations must not mutate domain state; output is free text and is
/// never trusted to be well-formed.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<Generation, GenerationError>;
}
