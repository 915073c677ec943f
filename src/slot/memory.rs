//! # In-memory durable slot
//!
//! Used by tests and by callers that do not need durability. Supports
//! failure injection so callers can prove they leave state untouched when
//! a write is refused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::errors::{SlotError, SlotResult};
use super::{validate_key, DurableSlot};

#[derive(Debug, Default)]
pub struct MemorySlot {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save`/`remove` fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `load` fail until reset
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

impl DurableSlot for MemorySlot {
    fn load(&self, key: &str) -> SlotResult<Option<Vec<u8>>> {
        validate_key(key)?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SlotError::Unavailable("injected read failure".to_string()));
        }

        let entries = self
            .entries
            .read()
            .map_err(|_| SlotError::Unavailable("Lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, payload: &[u8]) -> SlotResult<()> {
        validate_key(key)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SlotError::Unavailable("injected write failure".to_string()));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| SlotError::Unavailable("Lock poisoned".to_string()))?;
        entries.insert(key.to_string(), payload.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> SlotResult<()> {
        validate_key(key)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SlotError::Unavailable("injected write failure".to_string()));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| SlotError::Unavailable("Lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let slot = MemorySlot::new();
        slot.save("notifications", b"[]").unwrap();

        assert_eq!(slot.load("notifications").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn test_injected_write_failure_keeps_previous_value() {
        let slot = MemorySlot::new();
        slot.save("requests", b"old").unwrap();

        slot.set_fail_writes(true);
        assert!(slot.save("requests", b"new").is_err());
        assert!(slot.remove("requests").is_err());

        slot.set_fail_writes(false);
        assert_eq!(slot.load("requests").unwrap(), Some(b"old".to_vec()));
    }

    #[test]
    fn test_injected_read_failure() {
        let slot = MemorySlot::new();
        slot.set_fail_reads(true);

        assert!(matches!(slot.load("requests"), Err(SlotError::Unavailable(_))));
    }
}
