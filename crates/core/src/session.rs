//! Session Store
//!
//! In-memory conversation state for every live interview, keyed by an opaque
//! session id. Each session sits behind its own async mutex, so work on one
//! interview never waits on another. The outer map lock is only held long
//! enough to look up, insert or remove a handle.
//!
//! The state mutex is only ever held for short, non-blocking edits. A second
//! per-session lock, the turn gate, orders whole answer/question turns
//! without keeping readers out while a question is being generated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Who produced a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Assistant => write!(f, "assistant"),
            Role::User => write!(f, "user"),
        }
    }
}

/// One recorded message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Conversation state for a single interview.
///
/// The message log is append-only and the fallback cursor only moves forward;
/// the only way to go back is to drop the whole session through
/// [`SessionStore::reset`].
#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Turn>,
    has_greeted: bool,
    last_activity: DateTime<Utc>,
    pub(crate) fallback_cursor: usize,
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            has_greeted: false,
            last_activity: Utc::now(),
            fallback_cursor: 0,
        }
    }

    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    pub fn has_greeted(&self) -> bool {
        self.has_greeted
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn fallback_cursor(&self) -> usize {
        self.fallback_cursor
    }

    /// Appends a turn stamped with the current time.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Turn::new(role, content));
        self.touch();
    }

    /// The most recent thing the interviewer said, if anything.
    pub fn last_assistant_turn(&self) -> Option<&Turn> {
        self.messages.iter().rev().find(|t| t.role == Role::Assistant)
    }

    pub(crate) fn mark_greeted(&mut self) {
        self.has_greeted = true;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// One stored session: its state plus the gate that orders its turns.
#[derive(Debug, Default)]
pub struct SessionSlot {
    state: Mutex<Session>,
    turn: Mutex<()>,
}

impl SessionSlot {
    /// Locks the session state. Never hold this across a slow await.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().await
    }

    /// Waits for every earlier turn on this session to finish.
    ///
    /// Waiters are served in arrival order. The state itself stays unlocked,
    /// so reads go through while a turn is in progress.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }
}

/// A shared, individually lockable session.
pub type SessionHandle = Arc<SessionSlot>;

/// Process-wide map of live sessions.
///
/// No operation fails for an unknown id. Reads of an unknown id return empty
/// or default values and never create state; writes create it on demand.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates fresh state for `id`, replacing anything already stored under it.
    pub async fn initialize(&self, id: &str) -> SessionHandle {
        let handle: SessionHandle = Arc::new(SessionSlot::default());
        self.sessions
            .write()
            .await
            .insert(id.to_string(), handle.clone());
        tracing::debug!(session_id = %id, "Session initialized");
        handle
    }

    /// Looks up a session without creating it.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Looks up a session, creating empty state for it if it does not exist yet.
    pub async fn get_or_init(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.get(id).await {
            return handle;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id = %id, "Session auto-initialized on first write");
                Arc::new(SessionSlot::default())
            })
            .clone()
    }

    pub async fn record_turn(&self, id: &str, role: Role, content: impl Into<String>) {
        let handle = self.get_or_init(id).await;
        handle.lock().await.push(role, content);
    }

    pub async fn history(&self, id: &str) -> Vec<Turn> {
        match self.get(id).await {
            Some(handle) => handle.lock().await.messages().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn should_greet(&self, id: &str) -> bool {
        match self.get(id).await {
            Some(handle) => !handle.lock().await.has_greeted(),
            None => true,
        }
    }

    /// Sets the greeted flag. Does nothing for an unknown id.
    pub async fn mark_greeted(&self, id: &str) {
        if let Some(handle) = self.get(id).await {
            handle.lock().await.mark_greeted();
        }
    }

    /// Drops all state for `id`, fallback cursor included.
    ///
    /// Returns whether anything was stored. A turn that is still in flight
    /// keeps writing into the detached state and never reaches the new one.
    pub async fn reset(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session reset");
        }
        removed
    }

    pub async fn fallback_cursor(&self, id: &str) -> usize {
        match self.get(id).await {
            Some(handle) => handle.lock().await.fallback_cursor(),
            None => 0,
        }
    }

    pub async fn last_activity(&self, id: &str) -> Option<DateTime<Utc>> {
        match self.get(id).await {
            Some(handle) => Some(handle.lock().await.last_activity()),
            None => None,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
