use crate::error::SQLError;

/// A dynamically-typed SQL parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// A row returned from a SQL query: column name to value, in select order.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get a text column, treating NULL/missing as empty.
    pub fn get_string(&self, name: &str) -> String {
        self.get_str(name).unwrap_or_default().to_string()
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
pub trait SQLStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Execute one statement once per parameter set, atomically.
    /// Returns the total affected row count.
    fn exec_many(&self, sql: &str, param_sets: &[Vec<Value>]) -> Result<u64, SQLError>;

    /// Execute a batch of parameterless statements (schema setup).
    fn exec_batch(&self, sql: &str) -> Result<(), SQLError>;
}

/// Reject anything but `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Table names cannot be bound as parameters, so callers that build DDL or
/// queries from a table name check it here first.
pub fn check_identifier(name: &str) -> Result<&str, SQLError> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(SQLError::Identifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(check_identifier("search_history").is_ok());
        assert!(check_identifier("_t1").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("1abc").is_err());
        assert!(check_identifier("a; DROP TABLE x").is_err());
    }

    #[test]
    fn row_accessors() {
        let row = Row {
            columns: vec![
                ("id".into(), Value::Text("1".into())),
                ("time".into(), Value::Integer(5)),
                ("pic".into(), Value::Null),
            ],
        };
        assert_eq!(row.get_str("id"), Some("1"));
        assert_eq!(row.get_i64("time"), Some(5));
        assert_eq!(row.get_string("pic"), "");
        assert_eq!(row.get_string("missing"), "");
        assert_eq!(row.get_i64("id"), None);
    }
}
