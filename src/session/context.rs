use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::tprintln;

use super::record::SessionRecord;
use super::store::{MemoryStore, SessionStore};

/// Session lifecycle notifications. Neither variant carries a payload;
/// subscribers re-read the context when they need the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Established,
    Invalidated,
}

/// Handle to the single source of truth for session state.
///
/// Cloned into the API client and the navigation guard at construction time.
/// Owns the store and the broadcast channel other components subscribe to,
/// e.g. a menu that shows role-dependent entries.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { inner: Arc::new(Inner { store, events: broadcast::channel(16).0 }) }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn snapshot(&self) -> SessionRecord {
        self.inner.store.load()
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().token().map(str::to_string)
    }

    pub fn role(&self) -> Option<String> {
        self.snapshot().role
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Replace the stored record after a successful login.
    pub fn establish(&self, record: SessionRecord) -> AppResult<()> {
        self.inner.store.save(&record)?;
        info!(
            target: "blogdesk::session",
            "session established for user={}",
            record.username.as_deref().unwrap_or("<unknown>")
        );
        tprintln!("session.establish user={:?} role={:?}", record.username, record.role);
        self.emit(SessionEvent::Established);
        Ok(())
    }

    /// Cache a resolved role. Ignored when there is no credential any more,
    /// so a late lookup cannot resurrect a cleared session.
    pub fn cache_role(&self, role: &str) -> AppResult<()> {
        let mut record = self.snapshot();
        if !record.is_authenticated() {
            return Ok(());
        }
        record.role = Some(role.to_string());
        self.inner.store.save(&record)
    }

    /// Clear every field and notify subscribers exactly once.
    /// The notification goes out even when the store fails to clear.
    pub fn invalidate(&self) -> AppResult<()> {
        let res = self.inner.store.clear();
        if let Err(e) = &res {
            warn!(target: "blogdesk::session", "failed to clear session store: {}", e);
        }
        info!(target: "blogdesk::session", "session invalidated");
        tprintln!("session.invalidate");
        self.emit(SessionEvent::Invalidated);
        res
    }

    fn emit(&self, ev: SessionEvent) {
        if self.inner.events.receiver_count() > 0 {
            self.inner.events.send(ev).ok();
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .field("subscribers", &self.inner.events.receiver_count())
            .finish()
    }
}
