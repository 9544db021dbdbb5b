pub mod block;
pub mod cache;
pub mod config;
pub mod context;
pub mod inspect;
pub mod local;

/// `yyyy-mm-dd hh:mm` in UTC for a ms timestamp.
pub fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}
