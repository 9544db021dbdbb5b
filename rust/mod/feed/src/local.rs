use std::sync::Arc;

use async_trait::async_trait;
use coolfeed_sql::SQLStore;

use crate::dao::HistoryFavoriteDao;
use crate::error::FeedError;
use crate::model::FeedEntity;
use crate::repository::HistoryFavoriteRepo;

/// History and favorites on the local SQL store.
pub struct LocalHistoryFavorite {
    history: HistoryFavoriteDao,
    favorite: HistoryFavoriteDao,
}

impl LocalHistoryFavorite {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, FeedError> {
        Ok(Self {
            history: HistoryFavoriteDao::history(db.clone())?,
            favorite: HistoryFavoriteDao::favorite(db)?,
        })
    }

    pub fn history(&self) -> &HistoryFavoriteDao {
        &self.history
    }

    pub fn favorite(&self) -> &HistoryFavoriteDao {
        &self.favorite
    }
}

#[async_trait]
impl HistoryFavoriteRepo for LocalHistoryFavorite {
    async fn insert_history(&self, entity: FeedEntity) -> Result<(), FeedError> {
        self.history.insert(&entity)
    }

    async fn insert_favorite(&self, entity: FeedEntity) -> Result<(), FeedError> {
        self.favorite.insert(&entity)
    }

    async fn check_history(&self, id: &str) -> Result<bool, FeedError> {
        self.history.is_exist(id)
    }

    async fn check_favorite(&self, id: &str) -> Result<bool, FeedError> {
        self.favorite.is_exist(id)
    }

    async fn delete_history(&self, id: &str) -> Result<(), FeedError> {
        self.history.delete(id).map(|_| ())
    }

    async fn delete_favorite(&self, id: &str) -> Result<(), FeedError> {
        self.favorite.delete(id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolfeed_sql::SqliteStore;

    #[tokio::test]
    async fn history_and_favorite_are_separate() {
        let dir = tempfile::tempdir().unwrap();
        let db: Arc<dyn SQLStore> =
            Arc::new(SqliteStore::open(&dir.path().join("data.sqlite")).unwrap());
        let repo = LocalHistoryFavorite::new(db).unwrap();

        let entity = FeedEntity::new("100", "7", "alice", "", "Pixel", "hello", "1700000000");
        repo.insert_history(entity.clone()).await.unwrap();
        assert!(repo.check_history("100").await.unwrap());
        assert!(!repo.check_favorite("100").await.unwrap());

        repo.insert_favorite(entity).await.unwrap();
        repo.delete_history("100").await.unwrap();
        assert!(!repo.check_history("100").await.unwrap());
        assert!(repo.check_favorite("100").await.unwrap());

        repo.delete_favorite("100").await.unwrap();
        assert!(repo.favorite().load_all().unwrap().is_empty());
    }
}
