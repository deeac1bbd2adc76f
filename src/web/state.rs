//! Shared state for the web UI.

use crate::session::{ExtractionSession, ScanContext};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One browser's extraction session.
pub type SharedSession = Arc<Mutex<ExtractionSession>>;

/// Browser sessions keyed by cookie value, least recently used dropped first.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<LruCache<String, SharedSession>>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Fetch the session for `id`, creating it if unknown.
    pub fn get_or_create(&self, id: &str) -> SharedSession {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        let session: SharedSession = Arc::new(Mutex::new(ExtractionSession::new()));
        if let Some((evicted, _)) = sessions.push(id.to_string(), Arc::clone(&session)) {
            if evicted != id {
                debug!("Session store full; dropped session {}", evicted);
            }
        }
        session
    }

    /// Fetch an existing session without creating one.
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    context: Arc<ScanContext>,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(context: Arc<ScanContext>) -> Self {
        let sessions = SessionStore::new(context.config().max_sessions);
        Self {
            inner: Arc::new(AppStateInner { context, sessions }),
        }
    }

    /// The process-wide scan context.
    pub fn context(&self) -> Arc<ScanContext> {
        Arc::clone(&self.inner.context)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
