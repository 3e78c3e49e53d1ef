use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, AUTH_HEADER_KEY};

/// The persisted session credential.
///
/// There is no cached "logged in" flag. Every query reads the
/// store, so the stored credential is the single source of truth.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored `Authorization` header value, if any.
    ///
    /// An unreadable store counts as no credential.
    pub fn credential(&self) -> Option<String> {
        match self.store.get(AUTH_HEADER_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to read session credential");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    /// Replace the stored credential.
    pub fn store(&self, authorization_header: &str) -> Result<()> {
        self.store.set(AUTH_HEADER_KEY, authorization_header)?;
        debug!("Session credential stored");
        Ok(())
    }

    /// Remove the stored credential. Failures are logged, not returned:
    /// there is nothing a caller could do differently.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(AUTH_HEADER_KEY) {
            warn!(error = %e, "Failed to clear session credential");
        } else {
            debug!("Session credential cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_is_authenticated_follows_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        assert!(!session.is_authenticated());

        session.store("Basic abc").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.credential().as_deref(), Some("Basic abc"));

        // Another handle over the same store sees the same state.
        let other = Session::new(store.clone());
        other.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_store_replaces_previous_credential() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.store("Basic one").unwrap();
        session.store("Basic two").unwrap();
        assert_eq!(session.credential().as_deref(), Some("Basic two"));
    }
}
