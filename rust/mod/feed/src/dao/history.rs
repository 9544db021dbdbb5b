use std::sync::Arc;

use coolfeed_sql::{Row, SQLStore, Value, check_identifier};
use tracing::debug;

use crate::error::FeedError;
use crate::model::FeedEntity;

pub const HISTORY_TABLE: &str = "history";
pub const FAVORITE_TABLE: &str = "favorite";

/// History or favorite rows, one table per list, newest first.
pub struct HistoryFavoriteDao {
    db: Arc<dyn SQLStore>,
    table: String,
}

impl HistoryFavoriteDao {
    /// Open the DAO on `table`, creating the table if needed.
    pub fn new(db: Arc<dyn SQLStore>, table: &str) -> Result<Self, FeedError> {
        let table = check_identifier(table)?.to_string();
        db.exec_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id        TEXT PRIMARY KEY,
                uid       TEXT NOT NULL,
                username  TEXT NOT NULL,
                avatar    TEXT NOT NULL,
                device    TEXT NOT NULL,
                message   TEXT NOT NULL,
                pub_date  TEXT NOT NULL,
                time      INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_time ON {table}(time);
            CREATE INDEX IF NOT EXISTS idx_{table}_uid ON {table}(uid);"
        ))?;
        Ok(Self { db, table })
    }

    pub fn history(db: Arc<dyn SQLStore>) -> Result<Self, FeedError> {
        Self::new(db, HISTORY_TABLE)
    }

    pub fn favorite(db: Arc<dyn SQLStore>) -> Result<Self, FeedError> {
        Self::new(db, FAVORITE_TABLE)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert or replace the row with the same id.
    pub fn insert(&self, entity: &FeedEntity) -> Result<(), FeedError> {
        self.db.exec(
            &format!(
                "INSERT OR REPLACE INTO {} (id, uid, username, avatar, device, message, pub_date, time) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                self.table
            ),
            &[
                Value::from(entity.id.as_str()),
                Value::from(entity.uid.as_str()),
                Value::from(entity.username.as_str()),
                Value::from(entity.avatar.as_str()),
                Value::from(entity.device.as_str()),
                Value::from(entity.message.as_str()),
                Value::from(entity.pub_date.as_str()),
                Value::from(entity.time),
            ],
        )?;
        debug!(table = %self.table, id = %entity.id, "row saved");
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<FeedEntity>, FeedError> {
        let rows = self.db.query(
            &format!("SELECT * FROM {} ORDER BY time DESC", self.table),
            &[],
        )?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    pub fn is_exist(&self, id: &str) -> Result<bool, FeedError> {
        let rows = self.db.query(
            &format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", self.table),
            &[Value::from(id)],
        )?;
        Ok(!rows.is_empty())
    }

    pub fn delete(&self, id: &str) -> Result<u64, FeedError> {
        Ok(self.db.exec(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            &[Value::from(id)],
        )?)
    }

    pub fn delete_all(&self) -> Result<u64, FeedError> {
        Ok(self.db.exec(&format!("DELETE FROM {}", self.table), &[])?)
    }

    /// Drop every row of one author, e.g. after blocking them.
    pub fn delete_by_uid(&self, uid: &str) -> Result<u64, FeedError> {
        Ok(self.db.exec(
            &format!("DELETE FROM {} WHERE uid = ?1", self.table),
            &[Value::from(uid)],
        )?)
    }
}

fn row_to_entity(row: &Row) -> FeedEntity {
    FeedEntity {
        id: row.get_string("id"),
        uid: row.get_string("uid"),
        username: row.get_string("username"),
        avatar: row.get_string("avatar"),
        device: row.get_string("device"),
        message: row.get_string("message"),
        pub_date: row.get_string("pub_date"),
        time: row.get_i64("time").unwrap_or_default(),
    }
}
