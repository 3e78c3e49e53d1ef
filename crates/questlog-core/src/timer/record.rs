use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, ACTIVE_QUEST_KEY};

/// The persisted timer record: which quest is running and when it started
/// (epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuestRecord {
    pub id: i64,
    pub start: i64,
}

impl ActiveQuestRecord {
    pub fn new(id: i64, start: i64) -> Self {
        Self { id, start }
    }

    /// Read the record. Unreadable or malformed values mean "no timer"; a
    /// malformed value is removed so it is not re-read on every load.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let raw = match store.get(ACTIVE_QUEST_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Could not read active quest record");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Discarding malformed active quest record");
                if let Err(e) = store.remove(ACTIVE_QUEST_KEY) {
                    warn!(error = %e, "Could not remove malformed active quest record");
                }
                None
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to encode active quest record")?;
        store
            .set(ACTIVE_QUEST_KEY, &json)
            .context("Failed to persist active quest record")
    }

    pub fn clear(store: &dyn KeyValueStore) -> Result<()> {
        store
            .remove(ACTIVE_QUEST_KEY)
            .context("Failed to remove active quest record")
    }
}
