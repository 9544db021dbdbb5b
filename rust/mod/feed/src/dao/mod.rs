//! SQL-backed local lists.

pub mod history;
pub mod string_entity;

pub use history::{FAVORITE_TABLE, HISTORY_TABLE, HistoryFavoriteDao};
pub use string_entity::StringEntityDao;
