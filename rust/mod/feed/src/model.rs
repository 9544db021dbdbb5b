//! Wire and storage records for the feed screen.
//!
//! API payloads are camelCase JSON with most fields optional; every string
//! field defaults to empty so callers never juggle `Option<String>`.

use serde::{Deserialize, Serialize};

/// Like state of the current user on a feed or reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAction {
    /// 1 when liked.
    pub like: i32,
}

impl UserAction {
    pub fn liked(liked: bool) -> Self {
        Self { like: i32::from(liked) }
    }
}

/// One reply (or nested reply) in the reply tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedItem {
    /// Dedup key. Unique within any list shown to the user.
    pub entity_id: String,
    /// Domain key used by replies, likes and deletes.
    pub id: String,
    pub entity_type: String,
    pub feed_uid: String,
    pub uid: String,
    pub username: String,
    pub avatar: String,
    pub message: String,
    /// Replied-to user. `"0"` when the reply answers the root itself.
    pub ruid: String,
    pub rusername: String,
    pub pic: String,
    pub pic_arr: Vec<String>,
    pub likenum: String,
    pub replynum: String,
    pub dateline: i64,
    pub device_title: String,
    pub user_action: Option<UserAction>,
    pub reply_rows: Vec<FeedItem>,
    /// Nested replies not yet loaded.
    pub reply_rows_more: u32,
}

impl FeedItem {
    pub fn is_liked(&self) -> bool {
        self.user_action.as_ref().is_some_and(|a| a.like == 1)
    }
}

/// Feed header returned by `/v6/feed/detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedDetail {
    pub id: String,
    pub entity_id: String,
    pub uid: String,
    pub username: String,
    pub user_avatar: String,
    pub device_title: String,
    pub message: String,
    pub title: String,
    pub message_cover: String,
    /// JSON array of article blocks, or the literal `"null"` for plain feeds.
    pub message_raw_output: String,
    pub feed_type: String,
    pub feed_type_name: String,
    pub replynum: String,
    pub likenum: String,
    pub dateline: i64,
    pub target_row: Option<serde_json::Value>,
    pub relation_rows: Vec<serde_json::Value>,
    pub top_reply_rows: Vec<FeedItem>,
    pub reply_me_rows: Vec<FeedItem>,
    pub user_action: Option<UserAction>,
}

impl FeedDetail {
    pub fn has_article(&self) -> bool {
        !self.message_raw_output.is_empty() && self.message_raw_output != "null"
    }
}

/// Block kinds an article body may carry.
pub const ARTICLE_BLOCK_KINDS: [&str; 3] = ["text", "image", "shareUrl"];

/// One block of a long-form article body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub url: String,
    pub description: String,
    pub title: String,
    pub sub_title: String,
    pub logo_url: String,
}

/// Parse an article body, keeping only the block kinds the reader renders.
pub fn parse_article(raw: &str) -> Result<Vec<ArticleBlock>, serde_json::Error> {
    // Arrays from the backend may contain nulls.
    let blocks: Vec<Option<ArticleBlock>> = serde_json::from_str(raw)?;
    Ok(blocks
        .into_iter()
        .flatten()
        .filter(|b| ARTICLE_BLOCK_KINDS.contains(&b.kind.as_str()))
        .collect())
}

/// A history or favorite row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntity {
    pub id: String,
    pub uid: String,
    pub username: String,
    pub avatar: String,
    pub device: String,
    pub message: String,
    pub pub_date: String,
    /// Insert time in ms, the sort key.
    pub time: i64,
}

impl FeedEntity {
    pub fn new(
        id: impl Into<String>,
        uid: impl Into<String>,
        username: impl Into<String>,
        avatar: impl Into<String>,
        device: impl Into<String>,
        message: impl Into<String>,
        pub_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            uid: uid.into(),
            username: username.into(),
            avatar: avatar.into(),
            device: device.into(),
            message: message.into(),
            pub_date: pub_date.into(),
            time: coolfeed_core::now_millis(),
        }
    }
}

/// A string-cache row (search history, recent emoji, keyword blocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEntity {
    pub data: String,
    /// Ordering key, newest first. Usually a ms timestamp.
    pub id: i64,
}

impl StringEntity {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            id: coolfeed_core::now_millis(),
        }
    }
}

/// Reply stream query, one page at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyQuery {
    pub feed_id: String,
    pub list_type: String,
    pub page: u32,
    pub first_item: Option<String>,
    pub last_item: Option<String>,
    pub discuss_mode: i32,
    pub feed_type: String,
    pub block_status: i32,
    pub from_author: i32,
}

/// Response to like/unlike/delete posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionResponse {
    /// Non-empty when the backend refused the action.
    pub message: String,
    pub data: Option<ActionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionData {
    /// New like count, or a status text such as `删除成功` for deletes.
    pub count: String,
}

/// Response to posting a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplyResponse {
    pub message: String,
    pub message_status: String,
    /// The created reply on success.
    pub data: Option<FeedItem>,
}

/// Backend status asking the client to solve a captcha and resend.
pub const STATUS_CAPTCHA: &str = "err_request_captcha";

/// Text the backend returns in `data.count` for a successful delete.
pub const DELETE_OK: &str = "删除成功";

/// What a like or delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeType {
    Feed,
    Reply,
}

impl LikeType {
    /// API path toggling the like state. `like` is the current state.
    pub fn like_path(self, like: i32) -> &'static str {
        match (self, like == 1) {
            (LikeType::Feed, true) => "/v6/feed/unlike",
            (LikeType::Feed, false) => "/v6/feed/like",
            (LikeType::Reply, true) => "/v6/feed/unLikeReply",
            (LikeType::Reply, false) => "/v6/feed/likeReply",
        }
    }

    pub fn delete_path(self) -> &'static str {
        match self {
            LikeType::Feed => "/v6/feed/deleteFeed",
            LikeType::Reply => "/v6/feed/deleteReply",
        }
    }
}
