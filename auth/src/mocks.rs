//! In-memory session store for tests.

use crate::error::{Result, SessionError};
use crate::store::SessionStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Session store that keeps the token in memory and counts terminations.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    token: Arc<Mutex<Option<String>>>,
    terminations: Arc<AtomicUsize>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.token.lock() {
            *slot = Some(token.into());
        }
        store
    }

    /// How many times [`SessionStore::terminate`] was called.
    #[must_use]
    pub fn termination_count(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .lock()
            .map_err(|_| SessionError::Storage("Mutex lock failed".to_string()))?
            .clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self
            .token
            .lock()
            .map_err(|_| SessionError::Storage("Mutex lock failed".to_string()))? =
            Some(token.to_string());
        Ok(())
    }

    fn terminate(&self) -> Result<()> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        *self
            .token
            .lock()
            .map_err(|_| SessionError::Storage("Mutex lock failed".to_string()))? = None;
        Ok(())
    }
}
