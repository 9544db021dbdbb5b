pub mod config;
pub mod error;
pub mod types;

pub use config::ClientConfig;
pub use error::ClientError;
pub use types::{now_millis, truncate_chars};
