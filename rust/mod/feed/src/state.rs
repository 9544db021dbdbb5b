//! UI state published to the flux store.
//!
//! Each value lives at a well-known path under `feed/`. The platform shell
//! subscribes to `feed/#` and re-renders whatever changed.

use crate::model::{ArticleBlock, FeedDetail, FeedItem};

/// Store paths written by the feed view-model.
pub mod path {
    pub const DETAIL: &str = "feed/detail";
    pub const ARTICLE: &str = "feed/article";
    pub const REPLIES: &str = "feed/replies";
    pub const FOOTER: &str = "feed/footer";
    pub const SHEET_REPLIES: &str = "feed/sheet/replies";
    pub const SHEET_FOOTER: &str = "feed/sheet/footer";
    pub const FLAGS: &str = "feed/flags";
    pub const TOAST: &str = "feed/toast";
}

/// Result of a load as the UI sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState<T> {
    Loading,
    Success(T),
    Error(String),
    Empty,
}

impl<T> LoadingState<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadingState::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadingState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadingState<U> {
        match self {
            LoadingState::Loading => LoadingState::Loading,
            LoadingState::Success(data) => LoadingState::Success(f(data)),
            LoadingState::Error(msg) => LoadingState::Error(msg),
            LoadingState::Empty => LoadingState::Empty,
        }
    }
}

/// Pagination footer under a list that already shows data.
///
/// `Error` is tappable; the shell answers it with a load-more request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FooterState {
    #[default]
    Success,
    Loading,
    End,
    Error(String),
}

/// Feed header plus the parsed article, stored at [`path::DETAIL`].
pub type DetailState = LoadingState<FeedDetail>;

/// A reply list, stored at [`path::REPLIES`] and [`path::SHEET_REPLIES`].
pub type RepliesState = LoadingState<Vec<FeedItem>>;

/// Parsed article body, stored at [`path::ARTICLE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleState {
    pub blocks: Option<Vec<ArticleBlock>>,
    /// Rows the detail header occupies before the first reply.
    pub item_size: usize,
}

/// Scalar screen flags, stored at [`path::FLAGS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFlags {
    pub is_refreshing: bool,
    pub is_load_more: bool,
    pub is_end: bool,
    pub is_load_more_reply: bool,
    pub is_end_reply: bool,
    pub is_fav: bool,
    pub is_blocked: bool,
    pub reply_count: String,
    pub feed_type_name: String,
    /// Reply composer is open.
    pub on_reply: bool,
    /// Last post was refused until a captcha is solved.
    pub need_captcha: bool,
}

impl Default for FeedFlags {
    fn default() -> Self {
        Self {
            is_refreshing: false,
            is_load_more: false,
            is_end: false,
            is_load_more_reply: false,
            is_end_reply: false,
            is_fav: false,
            is_blocked: false,
            reply_count: "0".into(),
            feed_type_name: String::new(),
            on_reply: false,
            need_captcha: false,
        }
    }
}

/// One-shot message, stored at [`path::TOAST`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_state_helpers() {
        let s: LoadingState<Vec<u8>> = LoadingState::Success(vec![1]);
        assert!(s.is_success());
        assert_eq!(s.data(), Some(&vec![1]));
        assert_eq!(s.map(|v| v.len()), LoadingState::Success(1));

        let e: LoadingState<u8> = LoadingState::Error("boom".into());
        assert_eq!(e.data(), None);
        assert_eq!(e.map(|v| v + 1), LoadingState::Error("boom".into()));
    }

    #[test]
    fn flags_default() {
        let f = FeedFlags::default();
        assert_eq!(f.reply_count, "0");
        assert!(!f.is_refreshing);
    }
}
