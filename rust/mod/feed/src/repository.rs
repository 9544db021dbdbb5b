//! Seams to the backend and the local stores.
//!
//! The view-model only sees these traits. The vendor HTTP client lives
//! outside this workspace; tests drive the view-model with in-memory fakes.

use async_trait::async_trait;
use coolfeed_core::ClientError;

use crate::error::FeedError;
use crate::model::{ActionResponse, FeedDetail, FeedEntity, FeedItem, ReplyQuery, ReplyResponse};

/// Feed endpoints of the backend.
#[async_trait]
pub trait FeedApi: Send + Sync + 'static {
    /// `/v6/feed/detail?id={id}`.
    async fn feed_detail(&self, id: &str) -> Result<FeedDetail, ClientError>;

    /// One page of replies. An empty vec means the stream is exhausted.
    async fn feed_replies(&self, query: &ReplyQuery) -> Result<Vec<FeedItem>, ClientError>;

    /// Like, unlike or delete: `path` is one of the `/v6/feed/*` actions.
    async fn post_action(&self, path: &str, id: &str) -> Result<ActionResponse, ClientError>;

    async fn post_reply(
        &self,
        message: &str,
        captcha: &str,
        reply_id: &str,
        reply_type: &str,
    ) -> Result<ReplyResponse, ClientError>;
}

/// Users whose content is hidden.
#[async_trait]
pub trait BlackListRepo: Send + Sync + 'static {
    async fn check_uid(&self, uid: &str) -> Result<bool, FeedError>;
    async fn save_uid(&self, uid: &str) -> Result<(), FeedError>;
    async fn delete_uid(&self, uid: &str) -> Result<(), FeedError>;
}

/// Browsing history and favorites.
#[async_trait]
pub trait HistoryFavoriteRepo: Send + Sync + 'static {
    async fn insert_history(&self, entity: FeedEntity) -> Result<(), FeedError>;
    async fn insert_favorite(&self, entity: FeedEntity) -> Result<(), FeedError>;
    async fn check_history(&self, id: &str) -> Result<bool, FeedError>;
    async fn check_favorite(&self, id: &str) -> Result<bool, FeedError>;
    async fn delete_history(&self, id: &str) -> Result<(), FeedError>;
    async fn delete_favorite(&self, id: &str) -> Result<(), FeedError>;
}
