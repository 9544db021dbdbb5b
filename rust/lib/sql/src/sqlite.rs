use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::debug;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SQLError::Connection(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL keeps readers from blocking the single writer.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        debug!("SqliteStore: opened {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), column_value(row.get_ref(i)?)));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SQLError::Query(e.to_string()))
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.lock();
        let affected = conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| SQLError::Execution(e.to_string()))?;
        Ok(affected as u64)
    }

    fn exec_many(&self, sql: &str, param_sets: &[Vec<Value>]) -> Result<u64, SQLError> {
        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(|e| SQLError::Execution(e.to_string()))?;
        let mut total = 0u64;
        {
            let mut stmt = tx
                .prepare(sql)
                .map_err(|e| SQLError::Execution(e.to_string()))?;
            for params in param_sets {
                total += stmt
                    .execute(params_from_iter(params.iter()))
                    .map_err(|e| SQLError::Execution(e.to_string()))?
                    as u64;
            }
        }
        tx.commit()
            .map_err(|e| SQLError::Execution(e.to_string()))?;
        Ok(total)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        self.lock()
            .execute_batch(sql)
            .map_err(|e| SQLError::Execution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL, raw BLOB);")
            .unwrap();
        store
    }

    #[test]
    fn exec_and_query_roundtrip_types() {
        let store = store();
        let n = store
            .exec(
                "INSERT INTO t (id, name, score, raw) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Integer(1),
                    Value::Text("a".into()),
                    Value::Real(1.5),
                    Value::Blob(vec![1, 2]),
                ],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = store.query("SELECT * FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_str("name"), Some("a"));
        assert_eq!(rows[0].get("score"), Some(&Value::Real(1.5)));
        assert_eq!(rows[0].get("raw"), Some(&Value::Blob(vec![1, 2])));
    }

    #[test]
    fn null_column() {
        let store = store();
        store
            .exec("INSERT INTO t (id, name) VALUES (?1, ?2)", &[Value::Integer(1), Value::Null])
            .unwrap();
        let rows = store.query("SELECT name FROM t", &[]).unwrap();
        assert_eq!(rows[0].get("name"), Some(&Value::Null));
    }

    #[test]
    fn exec_many_is_atomic() {
        let store = store();
        let ok = store
            .exec_many(
                "INSERT INTO t (id, name) VALUES (?1, ?2)",
                &[
                    vec![Value::Integer(1), "a".into()],
                    vec![Value::Integer(2), "b".into()],
                ],
            )
            .unwrap();
        assert_eq!(ok, 2);

        // Second row collides on the primary key; the first must not land.
        let err = store.exec_many(
            "INSERT INTO t (id, name) VALUES (?1, ?2)",
            &[
                vec![Value::Integer(3), "c".into()],
                vec![Value::Integer(1), "dup".into()],
            ],
        );
        assert!(err.is_err());
        let rows = store.query("SELECT id FROM t ORDER BY id", &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn bad_sql_is_query_error() {
        let store = store();
        assert!(matches!(
            store.query("SELECT nope FROM t", &[]),
            Err(SQLError::Query(_))
        ));
    }

    #[test]
    fn open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("db.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.exec_batch("CREATE TABLE k (v TEXT);").unwrap();
            store.exec("INSERT INTO k VALUES (?1)", &["x".into()]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.query("SELECT v FROM k", &[]).unwrap().len(), 1);
    }
}
