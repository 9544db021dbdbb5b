use coolfeed_core::ClientError;
use coolfeed_kv::KVError;
use coolfeed_sql::SQLError;
use thiserror::Error;

/// Errors raised by the feed repositories and DAOs.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("kv: {0}")]
    Kv(#[from] KVError),

    #[error("sql: {0}")]
    Sql(#[from] SQLError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("decode: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Decode(e.to_string())
    }
}

impl FeedError {
    /// Stable code for the platform shell, following [`ClientError::error_code`].
    pub fn error_code(&self) -> &'static str {
        match self {
            FeedError::Kv(_) | FeedError::Sql(_) => coolfeed_core::error::error_code::STORAGE_ERROR,
            FeedError::Client(e) => e.error_code(),
            FeedError::Decode(_) => coolfeed_core::error::error_code::PARSE,
        }
    }
}
