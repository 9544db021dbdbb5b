use std::sync::Arc;

use async_trait::async_trait;
use coolfeed_kv::{KVStore, KVStoreExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FeedError;
use crate::repository::BlackListRepo;

const PREFIX: &str = "blacklist:user:";

/// One blocked user as stored in the KV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedUser {
    pub uid: String,
    /// Block time in ms.
    pub time: i64,
}

/// Block list on a [`KVStore`], one key per uid.
pub struct KvBlackList {
    kv: Arc<dyn KVStore>,
}

impl KvBlackList {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    fn key(uid: &str) -> String {
        format!("{PREFIX}{uid}")
    }

    /// Blocked users, ordered by uid.
    pub fn list(&self) -> Result<Vec<BlockedUser>, FeedError> {
        self.kv
            .scan(PREFIX)?
            .into_iter()
            .map(|(_, raw)| serde_json::from_slice(&raw).map_err(FeedError::from))
            .collect()
    }

    /// Unblock everyone. Returns how many entries were dropped.
    pub fn clear(&self) -> Result<usize, FeedError> {
        Ok(self.kv.delete_prefix(PREFIX)?)
    }
}

#[async_trait]
impl BlackListRepo for KvBlackList {
    async fn check_uid(&self, uid: &str) -> Result<bool, FeedError> {
        Ok(self.kv.contains(&Self::key(uid))?)
    }

    async fn save_uid(&self, uid: &str) -> Result<(), FeedError> {
        let entry = BlockedUser {
            uid: uid.to_string(),
            time: coolfeed_core::now_millis(),
        };
        self.kv.set_json(&Self::key(uid), &entry)?;
        info!(uid, "user blocked");
        Ok(())
    }

    async fn delete_uid(&self, uid: &str) -> Result<(), FeedError> {
        self.kv.delete(&Self::key(uid))?;
        info!(uid, "user unblocked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolfeed_kv::{MemoryStore, RedbStore};

    #[tokio::test]
    async fn save_check_delete() {
        let list = KvBlackList::new(Arc::new(MemoryStore::new()));
        assert!(!list.check_uid("7").await.unwrap());

        list.save_uid("7").await.unwrap();
        list.save_uid("3").await.unwrap();
        assert!(list.check_uid("7").await.unwrap());

        let uids: Vec<String> = list.list().unwrap().into_iter().map(|u| u.uid).collect();
        assert_eq!(uids, vec!["3", "7"]);

        list.delete_uid("7").await.unwrap();
        assert!(!list.check_uid("7").await.unwrap());
        assert_eq!(list.clear().unwrap(), 1);
        assert!(list.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn persists_in_redb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.redb");
        {
            let list = KvBlackList::new(Arc::new(RedbStore::open(&path).unwrap()));
            list.save_uid("42").await.unwrap();
        }
        let list = KvBlackList::new(Arc::new(RedbStore::open(&path).unwrap()));
        assert!(list.check_uid("42").await.unwrap());
    }

    #[tokio::test]
    async fn uid_prefix_does_not_collide() {
        let list = KvBlackList::new(Arc::new(MemoryStore::new()));
        list.save_uid("12").await.unwrap();
        assert!(!list.check_uid("1").await.unwrap());
    }
}
