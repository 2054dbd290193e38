use std::sync::{Arc, RwLock};

use ledgerly_assistant::ChatRun;
use ledgerly_core::UserId;

use super::{StoreError, StoreResult};

/// Append-only chat-run storage (conversation history + audit trail).
pub trait ChatRunStore: Send + Sync {
    fn append(&self, run: ChatRun) -> StoreResult<()>;
    /// Runs of one conversation, ascending by creation.
    fn list_conversation(&self, user_id: UserId, conversation_id: &str)
    -> StoreResult<Vec<ChatRun>>;
}

/// In-memory chat-run store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryChatRunStore {
    inner: RwLock<Vec<ChatRun>>,
}

impl InMemoryChatRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ChatRunStore for InMemoryChatRunStore {
    fn append(&self, run: ChatRun) -> StoreResult<()> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("chat run store lock poisoned".to_string()))?
            .push(run);
        Ok(())
    }

    fn list_conversation(
        &self,
        user_id: UserId,
        conversation_id: &str,
    ) -> StoreResult<Vec<ChatRun>> {
        let runs = self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("chat run store lock poisoned".to_string()))?;
        Ok(runs
            .iter()
            .filter(|r| r.user_id == user_id && r.conversation_id == conversation_id)
            .cloned()
            .collect())
    }
}

impl ChatRunStore for Arc<InMemoryChatRunStore> {
    fn append(&self, run: ChatRun) -> StoreResult<()> {
        (**self).append(run)
    }

    fn list_conversation(
        &self,
        user_id: UserId,
        conversation_id: &str,
    ) -> StoreResult<Vec<ChatRun>> {
        (**self).list_conversation(user_id, conversation_id)
    }
}
