use chrono::{DateTime, Utc};
use kisan_core::types::{Content, GenerateContentRequest};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// A multi-turn conversation with the model
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Unique session identifier
    pub id: Uuid,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last time a turn completed
    pub updated_at: DateTime<Utc>,
    system_instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(system_instruction: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            system_instruction: system_instruction.to_string(),
            history: Vec::new(),
        }
    }

    /// Completed turns, alternating user and model entries
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Request carrying the whole history followed by `message`
    pub fn build_request(&self, message: &str) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(Content::user(message));
        GenerateContentRequest {
            contents,
            system_instruction: None,
            generation_config: None,
        }
        .with_system_instruction(&self.system_instruction)
    }

    /// Append a completed exchange. Failed turns are never recorded.
    pub fn record_turn(&mut self, message: &str, reply: &str) {
        self.history.push(Content::user(message));
        self.history.push(Content::model(reply));
        self.updated_at = Utc::now();
    }
}

/// Holds zero or one `ChatSession`.
///
/// The slot lock is held for the duration of a turn, so a reset issued while a
/// turn is in flight takes effect once that turn settles.
#[derive(Debug)]
pub struct ChatSessionSlot {
    system_instruction: String,
    current: Mutex<Option<ChatSession>>,
}

impl ChatSessionSlot {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            current: Mutex::new(None),
        }
    }

    /// The active session, created with an empty history if there is none.
    pub async fn get_or_create(&self) -> MappedMutexGuard<'_, ChatSession> {
        let guard = self.current.lock().await;
        MutexGuard::map(guard, |slot| {
            slot.get_or_insert_with(|| {
                let session = ChatSession::new(&self.system_instruction);
                info!(session_id = %session.id, "Created chat session");
                session
            })
        })
    }

    /// Drop the active session. Returns whether one existed.
    pub async fn destroy(&self) -> bool {
        match self.current.lock().await.take() {
            Some(session) => {
                info!(
                    session_id = %session.id,
                    turns = session.history.len() / 2,
                    "Destroyed chat session"
                );
                true
            }
            None => {
                debug!("No chat session to destroy");
                false
            }
        }
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.current.lock().await.as_ref().map(|s| s.id)
    }

    /// Number of history entries in the active session, 0 if none exists
    pub async fn history_len(&self) -> usize {
        self.current
            .lock()
            .await
            .as_ref()
            .map_or(0, |s| s.history.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kisan_core::types::{ROLE_MODEL, ROLE_USER};

    #[test]
    fn test_session_creation() {
        let session = ChatSession::new("Be brief.");
        assert!(session.history().is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_build_request_includes_history() {
        let mut session = ChatSession::new("Be brief.");
        session.record_turn("Hello", "Namaste");

        let request = session.build_request("How do I grow okra?");
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some(ROLE_USER));
        assert_eq!(request.contents[1].role.as_deref(), Some(ROLE_MODEL));
        assert_eq!(
            request.contents[2].parts[0].text.as_deref(),
            Some("How do I grow okra?")
        );
        let instruction = request.system_instruction.expect("system instruction");
        assert_eq!(instruction.parts[0].text.as_deref(), Some("Be brief."));

        // Building a request does not record anything
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let slot = ChatSessionSlot::new("Be brief.");
        assert_eq!(slot.session_id().await, None);

        let first = slot.get_or_create().await.id;
        let second = slot.get_or_create().await.id;
        assert_eq!(first, second);
        assert_eq!(slot.session_id().await, Some(first));
    }

    #[tokio::test]
    async fn test_destroy_replaces_session() {
        let slot = ChatSessionSlot::new("Be brief.");
        let old_id = {
            let mut session = slot.get_or_create().await;
            session.record_turn("Hello", "Namaste");
            session.id
        };
        assert_eq!(slot.history_len().await, 2);

        assert!(slot.destroy().await);
        assert_eq!(slot.session_id().await, None);
        assert_eq!(slot.history_len().await, 0);

        let fresh = slot.get_or_create().await;
        assert_ne!(fresh.id, old_id);
        assert!(fresh.history().is_empty());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let slot = ChatSessionSlot::new("Be brief.");
        assert!(!slot.destroy().await);
        assert!(!slot.destroy().await);
        assert_eq!(slot.session_id().await, None);
    }
}
