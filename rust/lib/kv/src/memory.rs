use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::KVError;
use crate::traits::KVStore;

/// In-memory KVStore. Nothing survives the process; used for tests and
/// for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize, KVError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok(before - entries.len())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KVStoreExt;

    #[test]
    fn basic_ops() {
        let store = MemoryStore::new();
        store.set("a", b"1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        store.delete("a").unwrap();
        assert!(!store.contains("a").unwrap());
    }

    #[test]
    fn scan_prefix() {
        let store = MemoryStore::new();
        store.set("x:1", b"").unwrap();
        store.set("x:2", b"").unwrap();
        store.set("y:1", b"").unwrap();
        assert_eq!(store.scan("x:").unwrap().len(), 2);
        assert_eq!(store.delete_prefix("x:").unwrap(), 2);
        assert_eq!(store.scan("").unwrap().len(), 1);
    }

    #[test]
    fn json_helpers() {
        let store = MemoryStore::new();
        store.set_json("k", &("a".to_string(), 7u8)).unwrap();
        assert_eq!(
            store.get_json::<(String, u8)>("k").unwrap(),
            Some(("a".to_string(), 7))
        );

        store.set("bad", b"not json").unwrap();
        assert!(matches!(
            store.get_json::<u32>("bad"),
            Err(KVError::Serialization(_))
        ));
    }
}
