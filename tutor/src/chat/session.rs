use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ChatResponder;
use crate::error::TutorResult;
use crate::model::{ChatMessage, HistoryTurn};
use crate::validation::{validate_chat_message, window};

#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<ChatMessage>,
    last_error: Option<String>,
    /// Bumped by `clear()`; sends started before a clear do not write back.
    epoch: u64,
}

/// A single conversation: the full display log plus the send queue.
#[derive(Debug)]
pub struct ChatSession {
    id: String,
    created_at: DateTime<Utc>,
    last_active: RwLock<DateTime<Utc>>,
    state: RwLock<SessionState>,
    /// Held from the user-turn append to the model-turn append. Tokio's mutex is fair,
    /// so concurrent sends complete in the order they were issued.
    send_queue: Mutex<()>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_active: RwLock::new(now),
            state: RwLock::new(SessionState::default()),
            send_queue: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        *self.last_active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Full display log, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.read().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Sends a user message and returns the model's reply.
    ///
    /// The user turn is logged before the model is called and stays logged if the call
    /// fails. The model sees only the window of turns preceding the new message.
    pub async fn send(
        &self,
        responder: &ChatResponder,
        message: &str,
        context: Option<&str>,
    ) -> TutorResult<ChatMessage> {
        let message = match validate_chat_message(Some(message.to_string())) {
            Ok(message) => message,
            Err(e) => {
                self.write().last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let _turn = self.send_queue.lock().await;
        self.touch();

        let (epoch, history) = {
            let mut state = self.write();
            state.last_error = None;
            let history: Vec<HistoryTurn> = window(&state.messages)
                .iter()
                .map(ChatMessage::to_turn)
                .collect();
            state.messages.push(ChatMessage::user(message.clone()));
            (state.epoch, history)
        };

        let context = context.filter(|c| !c.trim().is_empty());
        let result = responder.complete_turn(context, &history, &message).await;

        let mut state = self.write();
        let current = state.epoch == epoch;
        if !current {
            debug!(session = %self.id, "Session cleared during send, dropping reply");
        }
        match result {
            Ok(text) => {
                let reply = ChatMessage::model(text);
                if current {
                    state.messages.push(reply.clone());
                }
                Ok(reply)
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Chat turn failed");
                if current {
                    state.last_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Discards the whole log and any error. In-flight sends finish but are not logged.
    pub fn clear(&self) {
        let mut state = self.write();
        state.messages.clear();
        state.last_error = None;
        state.epoch += 1;
    }

    fn touch(&self) {
        *self
            .last_active
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
