use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-caller session key issued by `/start` and echoed on every
/// subsequent turn. Replaces the cookie the legacy flow relied on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// Progress through the questionnaire. `answers.len() == index` always.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub index: usize,
    pub answers: Vec<u8>,
}

impl SessionState {
    pub fn total(&self) -> u8 {
        self.answers.iter().sum()
    }
}

/// Keyed session storage so the screening service can be exercised in
/// isolation and backed by any store.
pub trait SessionStore: Send + Sync {
    /// Create a fresh session and return its token.
    fn create(&self) -> Result<SessionToken, SessionStoreError>;
    fn fetch(&self, token: &SessionToken) -> Result<Option<SessionState>, SessionStoreError>;
    fn update(&self, token: &SessionToken, state: SessionState) -> Result<(), SessionStoreError>;
    fn clear(&self, token: &SessionToken) -> Result<(), SessionStoreError>;
}

/// Error enumeration for session storage failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map; the default store for a single-process deployment.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionToken, SessionState>>,
}

impl InMemorySessionStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionToken, SessionState>>, SessionStoreError> {
        self.sessions
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> Result<SessionToken, SessionStoreError> {
        let token = SessionToken(Uuid::new_v4().to_string());
        self.lock()?.insert(token.clone(), SessionState::default());
        Ok(token)
    }

    fn fetch(&self, token: &SessionToken) -> Result<Option<SessionState>, SessionStoreError> {
        Ok(self.lock()?.get(token).cloned())
    }

    fn update(&self, token: &SessionToken, state: SessionState) -> Result<(), SessionStoreError> {
        self.lock()?.insert(token.clone(), state);
        Ok(())
    }

    fn clear(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.lock()?.remove(token);
        Ok(())
    }
}
