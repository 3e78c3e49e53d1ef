//! Local persistent key-value storage.
//!
//! The client keeps exactly two values between runs: the session credential
//! and the active quest timer record. Both live behind `KeyValueStore` so the
//! backing medium (files, OS keychain, memory) can be chosen per deployment
//! and swapped out in tests.

pub mod file;
pub mod keychain;
pub mod memory;

use anyhow::Result;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

/// Key holding the `Authorization` header value of the current session.
pub const AUTH_HEADER_KEY: &str = "authHeader";

/// Key holding the JSON record of the quest whose timer is running.
pub const ACTIVE_QUEST_KEY: &str = "activeQuest";

/// A string-valued persistent cell store.
///
/// An absent key and an empty value are the same thing to callers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
