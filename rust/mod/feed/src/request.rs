//! Requests the shell sends to the feed screen.

use crate::model::LikeType;
use crate::viewmodel::ReplyTarget;

/// Load the header and first reply page.
#[derive(Debug, Clone)]
pub struct LoadFeedReq;

impl LoadFeedReq {
    pub const PATH: &'static str = "feed/load";
}

/// Pull-to-refresh.
#[derive(Debug, Clone)]
pub struct RefreshReq;

impl RefreshReq {
    pub const PATH: &'static str = "feed/refresh";
}

#[derive(Debug, Clone)]
pub struct LoadMoreReq;

impl LoadMoreReq {
    pub const PATH: &'static str = "feed/load-more";
}

/// Switch to another feed.
#[derive(Debug, Clone)]
pub struct ReloadReq {
    pub id: String,
    pub is_view_reply: bool,
}

impl ReloadReq {
    pub const PATH: &'static str = "feed/reload";
}

/// Change sort mode or author filter, then refresh.
#[derive(Debug, Clone)]
pub struct SetListTypeReq {
    pub list_type: String,
    pub from_feed_author: bool,
}

impl SetListTypeReq {
    pub const PATH: &'static str = "feed/list-type";
}

/// Open the reply sheet on one reply.
#[derive(Debug, Clone)]
pub struct OpenReplySheetReq {
    pub reply_id: String,
    pub reply_uid: String,
    pub frid: Option<String>,
}

impl OpenReplySheetReq {
    pub const PATH: &'static str = "feed/sheet/open";
}

#[derive(Debug, Clone)]
pub struct LoadMoreReplyReq;

impl LoadMoreReplyReq {
    pub const PATH: &'static str = "feed/sheet/load-more";
}

#[derive(Debug, Clone)]
pub struct CloseReplySheetReq;

impl CloseReplySheetReq {
    pub const PATH: &'static str = "feed/sheet/close";
}

/// Toggle a like. `like` is the current state.
#[derive(Debug, Clone)]
pub struct LikeReq {
    pub id: String,
    pub like: i32,
    pub kind: LikeType,
}

impl LikeReq {
    pub const PATH: &'static str = "feed/like";
}

#[derive(Debug, Clone)]
pub struct DeleteReq {
    pub id: String,
    pub kind: LikeType,
}

impl DeleteReq {
    pub const PATH: &'static str = "feed/delete";
}

/// Block a user from inside the reply sheet.
#[derive(Debug, Clone)]
pub struct BlockReplyUserReq {
    pub uid: String,
}

impl BlockReplyUserReq {
    pub const PATH: &'static str = "feed/sheet/block";
}

#[derive(Debug, Clone)]
pub struct BlockUserReq {
    pub uid: String,
}

impl BlockUserReq {
    pub const PATH: &'static str = "feed/block";
}

#[derive(Debug, Clone)]
pub struct ToggleBlockOwnerReq;

impl ToggleBlockOwnerReq {
    pub const PATH: &'static str = "feed/owner/block";
}

#[derive(Debug, Clone)]
pub struct ToggleFavReq;

impl ToggleFavReq {
    pub const PATH: &'static str = "feed/fav";
}

/// Open the composer on a target.
#[derive(Debug, Clone)]
pub struct SetReplyTargetReq(pub ReplyTarget);

impl SetReplyTargetReq {
    pub const PATH: &'static str = "feed/reply/target";
}

#[derive(Debug, Clone)]
pub struct PostReplyReq {
    pub message: String,
    pub captcha: String,
}

impl PostReplyReq {
    pub const PATH: &'static str = "feed/reply/post";
}
