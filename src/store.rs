use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Largest accepted value, in bytes
pub const MAX_VALUE_LEN: usize = 50;

/// Maximum number of entries the store will hold
pub const MAX_ENTRIES: usize = 1000;

/// Longest accepted key: one leading character plus up to 15 more
pub const MAX_KEY_LEN: usize = 16;

/// Errors returned by store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("data must not be empty")]
    DataEmpty,
    #[error("data length exceeds limit")]
    DataExceedsLimit,
    #[error("invalid key")]
    KeyFormatInvalid,
    #[error("store is full")]
    StoreFull,
    #[error("key already exists")]
    KeyExists,
    #[error("key does not exist")]
    KeyNotExist,
}

/// Key-value store operations used by the router
pub trait Store: Send + Sync {
    /// Get the value for a key, `None` if absent
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Insert a new entry. Existing keys are never overwritten.
    fn set(&self, key: String, value: Bytes) -> Result<(), StoreError>;

    /// Delete an existing entry
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Check a key against `^[a-z_][a-z0-9_-]{1,15}$`
pub fn is_valid_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    if bytes.len() < 2 || bytes.len() > MAX_KEY_LEN {
        return false;
    }

    let head = bytes[0];
    if !(head.is_ascii_lowercase() || head == b'_') {
        return false;
    }

    bytes[1..]
        .iter()
        .all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// In-memory key-value store
pub struct MemoryStore {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// Every critical section is a single map call, so a poisoned lock still
// guards a consistent map and is recovered rather than propagated.
impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    fn set(&self, key: String, value: Bytes) -> Result<(), StoreError> {
        if value.is_empty() {
            return Err(StoreError::DataEmpty);
        }
        if value.len() > MAX_VALUE_LEN {
            return Err(StoreError::DataExceedsLimit);
        }
        if !is_valid_key(&key) {
            return Err(StoreError::KeyFormatInvalid);
        }

        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if data.len() >= MAX_ENTRIES {
            return Err(StoreError::StoreFull);
        }
        if data.contains_key(&key) {
            return Err(StoreError::KeyExists);
        }
        data.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        match data.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::KeyNotExist),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use std::sync::Arc;

    fn data() -> Bytes {
        Bytes::from_static(b"data")
    }

    #[test]
    fn test_set_then_get() {
        let store = MemoryStore::new();
        assert_eq!(store.set("key".to_string(), data()), Ok(()));
        assert_eq!(store.get("key"), Some(data()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("doesnotexist"), None);
    }

    #[test]
    fn test_remove_key() {
        let store = MemoryStore::new();
        store.set("key".to_string(), data()).unwrap();
        assert_eq!(store.remove("key"), Ok(()));
        assert_eq!(store.get("key"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_keeps_size() {
        let store = MemoryStore::new();
        store.set("key".to_string(), data()).unwrap();
        assert_eq!(store.remove("other"), Err(StoreError::KeyNotExist));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_keys() {
        let store = MemoryStore::new();
        let invalids = [
            "",
            "a",
            "thiskeyiswaytoolongtobevalid",
            "inval!dch@rs",
            "1numberatstart",
            "Upper",
            "-dash",
        ];
        for key in invalids {
            assert_eq!(
                store.set(key.to_string(), data()),
                Err(StoreError::KeyFormatInvalid),
                "{:?} should not be accepted",
                key
            );
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_accepts_boundary_keys() {
        let store = MemoryStore::new();
        for key in ["ab", "_1", "a-b_c", "abcdefghijklmnop"] {
            assert_eq!(store.set(key.to_string(), data()), Ok(()), "{:?}", key);
        }
        assert!(!is_valid_key("abcdefghijklmnopq"));
    }

    #[test]
    fn test_rejects_duplicate_key() {
        let store = MemoryStore::new();
        store.set("test".to_string(), data()).unwrap();
        assert_eq!(
            store.set("test".to_string(), Bytes::from_static(b"other")),
            Err(StoreError::KeyExists)
        );
        assert_eq!(store.get("test"), Some(data()));
    }

    #[test]
    fn test_value_bounds() {
        let store = MemoryStore::new();
        assert_eq!(
            store.set("empty".to_string(), Bytes::new()),
            Err(StoreError::DataEmpty)
        );

        let mut over = vec![0u8; MAX_VALUE_LEN + 1];
        rand::rng().fill_bytes(&mut over);
        assert_eq!(
            store.set("over".to_string(), Bytes::from(over)),
            Err(StoreError::DataExceedsLimit)
        );

        let exact = Bytes::from(vec![7u8; MAX_VALUE_LEN]);
        assert_eq!(store.set("exact".to_string(), exact.clone()), Ok(()));
        assert_eq!(store.get("exact"), Some(exact));
    }

    #[test]
    fn test_value_checked_before_key() {
        let store = MemoryStore::new();
        assert_eq!(
            store.set("1bad".to_string(), Bytes::new()),
            Err(StoreError::DataEmpty)
        );
        assert_eq!(
            store.set("1bad".to_string(), Bytes::from(vec![0u8; 51])),
            Err(StoreError::DataExceedsLimit)
        );
    }

    #[test]
    fn test_rejects_all_when_at_capacity() {
        let store = MemoryStore::new();
        for i in 1..=MAX_ENTRIES {
            assert_eq!(store.set(format!("_{}", i), data()), Ok(()));
        }
        assert_eq!(store.len(), MAX_ENTRIES);

        assert_eq!(store.set("key".to_string(), data()), Err(StoreError::StoreFull));
        // capacity is checked before duplication
        assert_eq!(store.set("_1".to_string(), data()), Err(StoreError::StoreFull));

        store.remove("_1").unwrap();
        assert_eq!(store.set("key".to_string(), data()), Ok(()));
    }

    #[test]
    fn test_concurrent_distinct_sets() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.set(format!("t{}_{}", t, i), data()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }

    #[test]
    fn test_concurrent_same_key_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.set("shared".to_string(), Bytes::from(format!("v{}", t)))
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
