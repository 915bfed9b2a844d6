// store.rs

use std::collections::HashMap;

use crate::error::out_of_memory;
use crate::history::{HistorySession, SessionKey};

/// Every live history session, keyed by (pid, tty).
#[derive(Debug, Default)]
pub struct HistoryStore {
    sessions: HashMap<SessionKey, HistorySession>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_or_create(&mut self, key: SessionKey) -> &mut HistorySession {
        if !self.sessions.contains_key(&key) {
            if self.sessions.try_reserve(1).is_err() {
                out_of_memory("history session");
            }
            tracing::debug!(pid = key.pid, dev = key.dev, "new history session");
        }
        self.sessions
            .entry(key)
            .or_insert_with(|| HistorySession::new(key))
    }

    pub fn get(&self, key: &SessionKey) -> Option<&HistorySession> {
        self.sessions.get(key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&SessionKey, &mut HistorySession) -> bool,
    {
        self.sessions.retain(keep);
    }
}
