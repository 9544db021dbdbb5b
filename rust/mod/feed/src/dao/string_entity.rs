use std::sync::Arc;

use coolfeed_sql::{SQLStore, Value, check_identifier};

use crate::error::FeedError;
use crate::model::StringEntity;

/// Named string caches kept by the client.
pub mod table {
    pub const SEARCH_HISTORY: &str = "search_history";
    pub const RECENT_EMOJI: &str = "recent_emoji";
    pub const KEYWORD_BLOCK: &str = "keyword_block";
    pub const TOPIC_BLOCK: &str = "topic_block";

    pub const ALL: [&str; 4] = [SEARCH_HISTORY, RECENT_EMOJI, KEYWORD_BLOCK, TOPIC_BLOCK];
}

/// A list of unique strings ordered by a bumpable id, newest first.
pub struct StringEntityDao {
    db: Arc<dyn SQLStore>,
    table: String,
}

impl StringEntityDao {
    pub fn new(db: Arc<dyn SQLStore>, table: &str) -> Result<Self, FeedError> {
        let table = check_identifier(table)?.to_string();
        db.exec_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                data  TEXT PRIMARY KEY,
                id    INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_id ON {table}(id);"
        ))?;
        Ok(Self { db, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn insert(&self, entity: &StringEntity) -> Result<(), FeedError> {
        self.db.exec(
            &format!("INSERT OR REPLACE INTO {} (data, id) VALUES (?1, ?2)", self.table),
            &[Value::from(entity.data.as_str()), Value::from(entity.id)],
        )?;
        Ok(())
    }

    /// Insert all rows in one transaction.
    pub fn insert_list(&self, entities: &[StringEntity]) -> Result<u64, FeedError> {
        let params: Vec<Vec<Value>> = entities
            .iter()
            .map(|e| vec![Value::from(e.data.as_str()), Value::from(e.id)])
            .collect();
        Ok(self.db.exec_many(
            &format!("INSERT OR REPLACE INTO {} (data, id) VALUES (?1, ?2)", self.table),
            &params,
        )?)
    }

    pub fn load_all(&self) -> Result<Vec<StringEntity>, FeedError> {
        let rows = self.db.query(
            &format!("SELECT data, id FROM {} ORDER BY id DESC", self.table),
            &[],
        )?;
        Ok(rows
            .iter()
            .map(|row| StringEntity {
                data: row.get_string("data"),
                id: row.get_i64("id").unwrap_or_default(),
            })
            .collect())
    }

    pub fn is_exist(&self, data: &str) -> Result<bool, FeedError> {
        let rows = self.db.query(
            &format!("SELECT 1 FROM {} WHERE data = ?1 LIMIT 1", self.table),
            &[Value::from(data)],
        )?;
        Ok(!rows.is_empty())
    }

    /// Whether `text` contains any stored string. Used for keyword blocking.
    pub fn is_contain(&self, text: &str) -> Result<bool, FeedError> {
        let rows = self.db.query(
            &format!(
                "SELECT 1 FROM {} WHERE ?1 LIKE '%' || data || '%' LIMIT 1",
                self.table
            ),
            &[Value::from(text)],
        )?;
        Ok(!rows.is_empty())
    }

    pub fn delete(&self, data: &str) -> Result<u64, FeedError> {
        Ok(self.db.exec(
            &format!("DELETE FROM {} WHERE data = ?1", self.table),
            &[Value::from(data)],
        )?)
    }

    pub fn delete_all(&self) -> Result<u64, FeedError> {
        Ok(self.db.exec(&format!("DELETE FROM {}", self.table), &[])?)
    }

    /// Move an existing entry to the front.
    pub fn update_history(&self, data: &str, new_id: i64) -> Result<u64, FeedError> {
        Ok(self.db.exec(
            &format!("UPDATE {} SET id = ?1 WHERE data = ?2", self.table),
            &[Value::from(new_id), Value::from(data)],
        )?)
    }

    /// Replace an entry's text and move it to the front.
    pub fn update_emoji(&self, old_data: &str, new_data: &str, new_id: i64) -> Result<u64, FeedError> {
        Ok(self.db.exec(
            &format!("UPDATE {} SET id = ?1, data = ?2 WHERE data = ?3", self.table),
            &[Value::from(new_id), Value::from(new_data), Value::from(old_data)],
        )?)
    }

    /// Bump `data` to the front, inserting it if new.
    pub fn touch(&self, data: &str) -> Result<(), FeedError> {
        let entity = StringEntity::new(data);
        if self.is_exist(data)? {
            self.update_history(data, entity.id)?;
        } else {
            self.insert(&entity)?;
        }
        Ok(())
    }
}
