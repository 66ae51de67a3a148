use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The single multi-step input flow a chat is currently in. At most one
/// variant is active per chat; entering a mode replaces whatever was there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    SettingBalance,
    ResettingBalance,
    DeletingAllData,
    SettingCurrency(String),
}

/// In-memory per-chat mode flags. Ephemeral by design: a restart drops every
/// chat back to Idle while the durable records survive in the store.
#[derive(Clone, Default)]
pub struct StateStore {
    states: Arc<Mutex<HashMap<i64, ConversationState>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: i64) -> ConversationState {
        self.states
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite semantics enforce mutual exclusivity: there is no way to
    /// have two modes active for one chat.
    pub async fn enter(&self, chat_id: i64, state: ConversationState) {
        if state == ConversationState::Idle {
            self.clear(chat_id).await;
            return;
        }
        self.states.lock().await.insert(chat_id, state);
    }

    pub async fn clear(&self, chat_id: i64) {
        self.states.lock().await.remove(&chat_id);
    }
}
