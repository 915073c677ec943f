//! # Durable Slot
//!
//! Key-value persistence collaborator. The engine stores whole collections
//! under a handful of fixed keys and never interprets the bytes itself
//! beyond JSON encoding.

pub mod checksum;
pub mod errors;
pub mod file;
pub mod memory;

pub use errors::{SlotError, SlotResult};
pub use file::FileSlot;
pub use memory::MemorySlot;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key holding the request collection
pub const REQUESTS_KEY: &str = "requests";

/// Key holding the notification collection
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Key holding the session principal
pub const PRINCIPAL_KEY: &str = "principal";

/// Durable key-value slot
pub trait DurableSlot: Send + Sync + std::fmt::Debug {
    /// Load the bytes stored under `key`, or `None` if never written
    fn load(&self, key: &str) -> SlotResult<Option<Vec<u8>>>;

    /// Replace the bytes stored under `key`
    fn save(&self, key: &str, payload: &[u8]) -> SlotResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> SlotResult<()>;
}

/// Load and decode a JSON value stored under `key`
pub fn load_json<T: DeserializeOwned>(slot: &dyn DurableSlot, key: &str) -> SlotResult<Option<T>> {
    match slot.load(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`
pub fn save_json<T: Serialize + ?Sized>(slot: &dyn DurableSlot, key: &str, value: &T) -> SlotResult<()> {
    let bytes = serde_json::to_vec(value)?;
    slot.save(key, &bytes)
}

pub(crate) fn validate_key(key: &str) -> SlotResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SlotError::InvalidKey(key.to_string()))
    }
}
