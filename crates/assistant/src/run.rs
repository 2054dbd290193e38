//! Immutable chat-run records.
//!
//! Every assistant interaction — successful or not — leaves one append-only
//! run record, which doubles as the conversation history for replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{ChatRunId, UserId};

use crate::generate::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRunKind {
    Chat,
    InvoiceDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRunStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRun {
    pub id: ChatRunId,
    pub user_id: UserId,
    pub conversation_id: String,
    pub kind: ChatRunKind,
    pub model: String,
    pub input: String,
    pub output: Option<String>,
    pub token_usage: Option<u32>,
    pub status: ChatRunStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatRun {
    pub fn completed(
        user_id: UserId,
        conversation_id: impl Into<String>,
        kind: ChatRunKind,
        model: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        token_usage: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ChatRunId::new(),
            user_id,
            conversation_id: conversation_id.into(),
            kind,
            model: model.into(),
            input: input.into(),
            output: Some(output.into()),
            token_usage,
            status: ChatRunStatus::Completed,
            error: None,
            created_at,
        }
    }

    pub fn failed(
        user_id: UserId,
        conversation_id: impl Into<String>,
        kind: ChatRunKind,
        model: impl Into<String>,
        input: impl Into<String>,
        error: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ChatRunId::new(),
            user_id,
            conversation_id: conversation_id.into(),
            kind,
            model: model.into(),
            input: input.into(),
            output: None,
            token_usage: None,
            status: ChatRunStatus::Failed,
            error: Some(error.into()),
            created_at,
        }
    }
}

/// Rebuild the user/assistant message history from a conversation's runs
/// (assumed ascending by creation).
pub fn build_messages(runs: &[ChatRun]) -> Vec<ChatMessage> {
    let mut messages = Vec::new();
    for run in runs {
        if !run.input.is_empty() {
            messages.push(ChatMessage::user(run.input.clone()));
        }
        if let Some(output) = &run.output {
            messages.push(ChatMessage::assistant(output.clone()));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Role;

    #[test]
    fn completed_and_failed_constructors() {
        let user = UserId::new();
        let ok = ChatRun::completed(
            user,
            "conv-1",
            ChatRunKind::Chat,
            "test-model",
            "hello",
            "hi there",
            Some(12),
            Utc::now(),
        );
        assert_eq!(ok.status, ChatRunStatus::Completed);
        assert_eq!(ok.output.as_deref(), Some("hi there"));
        assert!(ok.error.is_none());

        let failed = ChatRun::failed(
            user,
            "conv-1",
            ChatRunKind::InvoiceDraft,
            "test-model",
            "make an invoice",
            "model unavailable",
            Utc::now(),
        );
        assert_eq!(failed.status, ChatRunStatus::Failed);
        assert!(failed.output.is_none());
        assert_eq!(failed.error.as_deref(), Some("model unavailable"));
    }

    #[test]
    fn build_messages_interleaves_inputs_and_outputs() {
        let user = UserId::new();
        let runs = vec![
            ChatRun::completed(
                user,
                "c",
                ChatRunKind::Chat,
                "m",
                "first question",
                "first answer",
                None,
                Utc::now(),
            ),
            ChatRun::failed(user, "c", ChatRunKind::Chat, "m", "second question", "boom", Utc::now()),
        ];

        let messages = build_messages(&runs);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "first question");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "first answer");
        // Failed run contributes its input but no assistant turn.
        assert_eq!(messages[2].role, Role::User);
    }
}
