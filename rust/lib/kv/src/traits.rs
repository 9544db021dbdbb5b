use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::KVError;

/// KVStore provides a flat key-value storage interface.
///
/// Keys follow a namespaced convention: `blacklist:user:10086`,
/// `cache:topic:42`, etc. so that `scan` by prefix lists one namespace.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Delete every key under a prefix in one transaction.
    /// Returns the number of keys removed.
    fn delete_prefix(&self, prefix: &str) -> Result<usize, KVError>;

    /// Scan all keys matching a prefix. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Check whether a key exists.
    fn contains(&self, key: &str) -> Result<bool, KVError> {
        Ok(self.get(key)?.is_some())
    }
}

/// JSON helpers layered over any `KVStore`.
pub trait KVStoreExt: KVStore {
    /// Read and decode a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KVError> {
        match self.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KVError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON value.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KVError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| KVError::Serialization(e.to_string()))?;
        self.set(key, &bytes)
    }
}

impl<S: KVStore + ?Sized> KVStoreExt for S {}
