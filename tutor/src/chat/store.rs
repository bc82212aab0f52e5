use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::ChatSession;
use crate::error::{TutorError, TutorResult};

/// Trait defining the interface for chat session stores
#[async_trait]
pub trait ChatSessionStore: Send + Sync + Debug {
    /// Create a new, empty session
    async fn create_session(&self) -> TutorResult<Arc<ChatSession>>;

    /// Get a session by ID
    async fn get_session(&self, id: &str) -> TutorResult<Arc<ChatSession>>;

    /// Delete a session by ID
    async fn delete_session(&self, id: &str) -> TutorResult<()>;

    /// Drop sessions with no activity for longer than `max_idle`
    async fn cleanup_idle_sessions(&self, max_idle: Duration) -> TutorResult<usize>;

    /// Number of live sessions
    async fn session_count(&self) -> usize;
}

/// Type alias for Arc-wrapped ChatSessionStore trait objects
pub type ChatSessionStoreRef = Arc<dyn ChatSessionStore>;

/// In-memory implementation of ChatSessionStore
#[derive(Debug, Default)]
pub struct InMemoryChatSessionStore {
    sessions: RwLock<HashMap<String, Arc<ChatSession>>>,
}

impl InMemoryChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatSessionStore for InMemoryChatSessionStore {
    async fn create_session(&self) -> TutorResult<Arc<ChatSession>> {
        let session = Arc::new(ChatSession::new());
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id().to_string(), session.clone());
        debug!(session = session.id(), "Created chat session");
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> TutorResult<Arc<ChatSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| TutorError::SessionNotFound(id.to_string()))
    }

    async fn delete_session(&self, id: &str) -> TutorResult<()> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        match removed {
            Some(_) => {
                debug!(session = id, "Deleted chat session");
                Ok(())
            }
            None => Err(TutorError::SessionNotFound(id.to_string())),
        }
    }

    async fn cleanup_idle_sessions(&self, max_idle: Duration) -> TutorResult<usize> {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let before = sessions.len();
        sessions.retain(|_, session| session.last_active() >= cutoff);
        let removed = before - sessions.len();

        if removed > 0 {
            info!(removed, "Cleaned up idle chat sessions");
        }
        Ok(removed)
    }

    async fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
