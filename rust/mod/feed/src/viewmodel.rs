//! The feed detail screen: header, pinned replies, reply stream, reply sheet.
//!
//! `FeedViewModel` is the single owner of the screen state. Every operation
//! mutates it under a short lock (never held across `.await`) and then
//! publishes a snapshot to the flux store under `feed/*`.
//!
//! Two streams paginate independently, each behind its own [`Pager`]:
//! the main reply list and the reply sheet opened on one reply.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coolfeed_core::{ClientConfig, ClientError, truncate_chars};
use coolfeed_flux::StateStore;
use tracing::{debug, info, warn};

use crate::decorate::generate_name;
use crate::error::FeedError;
use crate::model::{
    DELETE_OK, FeedDetail, FeedEntity, FeedItem, LikeType, ReplyQuery, STATUS_CAPTCHA,
    UserAction, parse_article,
};
use crate::paging::{Cursor, Fetch, Pager};
use crate::reconcile::{
    self, LIST_TYPE_DEFAULT, PageContext, ReplyParent, ReplyTree, distinct_by_entity,
};
use crate::repository::{BlackListRepo, FeedApi, HistoryFavoriteRepo};
use crate::state::{
    ArticleState, DetailState, FeedFlags, FooterState, LoadingState, RepliesState, Toast, path,
};

/// Reply type of a reply posted to the feed itself.
pub const REPLY_TYPE_FEED: &str = "feed";

/// Entity type of rows the reply sheet shows.
const ENTITY_FEED_REPLY: &str = "feed_reply";

/// Backends the view-model talks to.
#[derive(Clone)]
pub struct FeedDeps {
    pub api: Arc<dyn FeedApi>,
    pub blacklist: Arc<dyn BlackListRepo>,
    pub history: Arc<dyn HistoryFavoriteRepo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub record_history: bool,
    pub history_message_limit: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            record_history: true,
            history_message_limit: 150,
        }
    }
}

impl From<&ClientConfig> for FeedOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            record_history: config.record_history,
            history_message_limit: config.history_message_limit,
        }
    }
}

/// What the reply composer answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Reply (or feed) being answered.
    pub reply_id: String,
    pub reply_uid: String,
    pub reply_name: String,
    /// `"feed"` for the feed itself, otherwise `"reply"`.
    pub reply_type: String,
    /// Root reply when answering a nested reply.
    pub frid: Option<String>,
    /// The composer was opened from the reply sheet.
    pub is_sheet: bool,
}

impl ReplyTarget {
    fn root_id(&self) -> &str {
        root_of(&self.reply_id, self.frid.as_deref())
    }
}

/// The reply the sheet is open on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SheetRoot {
    reply_id: String,
    reply_uid: String,
    frid: Option<String>,
}

impl SheetRoot {
    fn root_id(&self) -> &str {
        root_of(&self.reply_id, self.frid.as_deref())
    }

    fn nested_under(&self) -> Option<&str> {
        self.frid.as_deref().filter(|f| !f.is_empty())
    }
}

/// Top-level reply owning `reply_id`: `frid` when set, else the reply itself.
fn root_of<'a>(reply_id: &'a str, frid: Option<&'a str>) -> &'a str {
    frid.filter(|f| !f.is_empty()).unwrap_or(reply_id)
}

struct Inner {
    id: String,
    is_view_reply: bool,
    /// Bumped by `reload`; stale responses are dropped.
    generation: u64,
    sheet_generation: u64,

    feed_uid: String,
    feed_username: String,
    feed_type: String,
    list_type: String,
    discuss_mode: i32,
    block_status: i32,
    from_feed_author: i32,

    detail: LoadingState<FeedDetail>,
    article: ArticleState,
    tree: ReplyTree,
    /// Load status of `tree.page`.
    replies: LoadingState<()>,
    footer: FooterState,

    target: ReplyTarget,
    sheet: SheetRoot,
    sheet_replies: RepliesState,
    sheet_footer: FooterState,

    flags: FeedFlags,
}

impl Inner {
    fn new(id: String, is_view_reply: bool) -> Self {
        Self {
            id,
            is_view_reply,
            generation: 0,
            sheet_generation: 0,
            feed_uid: String::new(),
            feed_username: String::new(),
            feed_type: REPLY_TYPE_FEED.into(),
            list_type: LIST_TYPE_DEFAULT.into(),
            discuss_mode: 1,
            block_status: 0,
            from_feed_author: 0,
            detail: LoadingState::Loading,
            article: ArticleState {
                blocks: None,
                item_size: 2,
            },
            tree: ReplyTree::default(),
            replies: LoadingState::Loading,
            footer: FooterState::Success,
            target: ReplyTarget::default(),
            sheet: SheetRoot::default(),
            sheet_replies: LoadingState::Loading,
            sheet_footer: FooterState::Success,
            flags: FeedFlags::default(),
        }
    }

    fn page_context(&self) -> PageContext<'_> {
        PageContext {
            feed_uid: &self.feed_uid,
            list_type: &self.list_type,
            top_id: self.tree.top_id.as_deref(),
            me_id: self.tree.me_id.as_deref(),
        }
    }

    fn with_tree(&mut self, f: impl FnOnce(ReplyTree) -> ReplyTree) {
        let tree = std::mem::take(&mut self.tree);
        self.tree = f(tree);
    }

    fn detail_view(&self) -> DetailState {
        self.detail.clone().map(|mut detail| {
            detail.top_reply_rows = self.tree.top.iter().cloned().collect();
            detail.reply_me_rows = self.tree.me.iter().cloned().collect();
            detail
        })
    }

    fn replies_view(&self) -> RepliesState {
        self.replies.clone().map(|()| self.tree.page.clone())
    }

    /// Sheet root: the reply the sheet was opened on.
    fn reply_top(&self) -> Option<FeedItem> {
        let root = self.tree.find(self.sheet.root_id())?;
        match self.sheet.nested_under() {
            Some(_) => root
                .reply_rows
                .iter()
                .find(|r| r.id == self.sheet.reply_id)
                .cloned(),
            None => Some(root.clone()),
        }
    }

    fn apply_like(&mut self, id: &str, likenum: &str, liked: bool) {
        if id == self.id {
            if let Some(detail) = self.detail.data_mut() {
                detail.likenum = likenum.to_string();
                detail.user_action = Some(UserAction::liked(liked));
            }
        }
        let tree = std::mem::take(&mut self.tree);
        let (tree, found) = reconcile::apply_like(tree, id, likenum, liked);
        self.tree = tree;
        if !found {
            debug!(id, "liked reply not in the main tree");
        }
        if let Some(list) = self.sheet_replies.data_mut() {
            for item in list.iter_mut().filter(|i| i.id == id) {
                reconcile::set_like(item, likenum, liked);
            }
        }
    }

    fn remove_reply(&mut self, id: &str) {
        if let Some(list) = self.sheet_replies.data_mut() {
            list.retain(|i| i.id != id);
        }
        match self.sheet.nested_under().map(str::to_string) {
            Some(frid) => self.with_tree(|t| reconcile::delete_nested(t, &frid, id)),
            None => self.with_tree(|t| reconcile::delete_reply(t, id)),
        }
    }

    fn update_reply(&mut self, data: FeedItem) {
        if self.target.is_sheet {
            self.target.is_sheet = false;
            let reply = FeedItem {
                username: generate_name(&data, &self.feed_uid, &self.sheet.reply_uid),
                ..data
            };
            let mut list = self.sheet_replies.data().cloned().unwrap_or_default();
            let at = list
                .iter()
                .position(|i| i.id == self.target.reply_id)
                .map_or(0, |p| p + 1);
            list.insert(at, reply);
            self.sheet_replies = LoadingState::Success(distinct_by_entity(list));
            return;
        }

        let root_id = self.target.root_id().to_string();
        if !self.tree.is_pinned(&root_id) && self.target.reply_type == REPLY_TYPE_FEED {
            self.with_tree(|t| reconcile::insert_reply(t, ReplyParent::Feed, data));
            self.replies = LoadingState::Success(());
        } else {
            let root_uid = match self.tree.find(&root_id) {
                Some(root) => root.uid.clone(),
                None => self.target.reply_uid.clone(),
            };
            let reply = reconcile::decorate_posted(data, &self.feed_uid, &root_uid);
            self.with_tree(|t| reconcile::insert_reply(t, ReplyParent::Reply(&root_id), reply));
        }
    }

    fn history_entity(&self, limit: usize) -> Option<FeedEntity> {
        let detail = self.detail.data()?;
        Some(FeedEntity::new(
            self.id.clone(),
            self.feed_uid.clone(),
            detail.username.clone(),
            detail.user_avatar.clone(),
            detail.device_title.clone(),
            truncate_chars(&detail.message, limit),
            detail.dateline.to_string(),
        ))
    }
}

/// Everything published to the store, taken under one lock.
struct Snapshot {
    detail: DetailState,
    article: ArticleState,
    replies: RepliesState,
    footer: FooterState,
    sheet_replies: RepliesState,
    sheet_footer: FooterState,
    flags: FeedFlags,
}

/// Header layout: parsed article blocks and the header row count.
///
/// Plain feeds (`message_raw_output == "null"`) keep the two base rows.
pub fn article_layout(detail: &FeedDetail) -> ArticleState {
    let mut layout = ArticleState {
        blocks: None,
        item_size: 2,
    };
    if !detail.has_article() {
        return layout;
    }
    let blocks = match parse_article(&detail.message_raw_output) {
        Ok(blocks) => blocks,
        Err(e) => {
            warn!(id = %detail.id, "article body unreadable: {}", e);
            return layout;
        }
    };
    if !detail.message_cover.is_empty() {
        layout.item_size += 1;
    }
    if !detail.title.is_empty() {
        layout.item_size += 1;
    }
    if detail.target_row.is_some() || !detail.relation_rows.is_empty() {
        layout.item_size += 1;
    }
    layout.item_size += blocks.len();
    layout.blocks = Some(blocks);
    layout
}

/// View-model of one feed detail screen.
pub struct FeedViewModel {
    deps: FeedDeps,
    options: FeedOptions,
    store: Arc<StateStore>,
    inner: Mutex<Inner>,
    replies: Pager,
    sheet: Pager,
}

impl FeedViewModel {
    pub fn new(
        id: impl Into<String>,
        is_view_reply: bool,
        deps: FeedDeps,
        options: FeedOptions,
        store: Arc<StateStore>,
    ) -> Arc<Self> {
        let vm = Arc::new(Self {
            deps,
            options,
            store,
            inner: Mutex::new(Inner::new(id.into(), is_view_reply)),
            replies: Pager::new("replies"),
            sheet: Pager::new("sheet"),
        });
        vm.publish();
        vm
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let out = f(&mut self.lock());
        self.publish();
        out
    }

    fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        let mut flags = inner.flags.clone();
        flags.is_refreshing = self.replies.is_refreshing();
        flags.is_load_more = self.replies.is_load_more();
        flags.is_end = self.replies.is_end();
        flags.is_load_more_reply = self.sheet.is_load_more();
        flags.is_end_reply = self.sheet.is_end();
        Snapshot {
            detail: inner.detail_view(),
            article: inner.article.clone(),
            replies: inner.replies_view(),
            footer: inner.footer.clone(),
            sheet_replies: inner.sheet_replies.clone(),
            sheet_footer: inner.sheet_footer.clone(),
            flags,
        }
    }

    /// Push the current state to the store. Unchanged paths stay quiet.
    fn publish(&self) {
        let snap = self.snapshot();
        self.store.set_if_changed(path::DETAIL, snap.detail);
        self.store.set_if_changed(path::ARTICLE, snap.article);
        self.store.set_if_changed(path::REPLIES, snap.replies);
        self.store.set_if_changed(path::FOOTER, snap.footer);
        self.store.set_if_changed(path::SHEET_REPLIES, snap.sheet_replies);
        self.store.set_if_changed(path::SHEET_FOOTER, snap.sheet_footer);
        self.store.set_if_changed(path::FLAGS, snap.flags);
    }

    fn toast(&self, message: impl Into<String>) {
        self.store.set(path::TOAST, Toast(message.into()));
    }

    // ====================================================================
    // Read access
    // ====================================================================

    pub fn id(&self) -> String {
        self.lock().id.clone()
    }

    pub fn is_view_reply(&self) -> bool {
        self.lock().is_view_reply
    }

    pub fn feed_uid(&self) -> String {
        self.lock().feed_uid.clone()
    }

    pub fn feed_username(&self) -> String {
        self.lock().feed_username.clone()
    }

    pub fn tree(&self) -> ReplyTree {
        self.lock().tree.clone()
    }

    pub fn reply_target(&self) -> ReplyTarget {
        self.lock().target.clone()
    }

    pub fn cursor(&self) -> Cursor {
        self.replies.cursor()
    }

    pub fn sheet_cursor(&self) -> Cursor {
        self.sheet.cursor()
    }

    /// Change the sort mode. Takes effect on the next refresh.
    pub fn set_list_type(&self, list_type: &str) {
        self.lock().list_type = list_type.to_string();
    }

    /// Only show replies by the feed author. Takes effect on the next refresh.
    pub fn set_from_feed_author(&self, only_author: bool) {
        self.lock().from_feed_author = i32::from(only_author);
    }

    // ====================================================================
    // Feed header
    // ====================================================================

    /// Load the feed header, then the first reply page.
    pub async fn fetch_feed_data(&self) {
        let Some(guard) = self.replies.try_begin(Fetch::Refresh) else {
            return;
        };
        self.publish();
        self.load_detail().await;
        drop(guard);
        self.publish();
    }

    async fn load_detail(&self) {
        let (id, generation) = {
            let inner = self.lock();
            (inner.id.clone(), inner.generation)
        };
        let result = self.deps.api.feed_detail(&id).await;
        if self.lock().generation != generation {
            debug!(id = %id, "stale detail dropped");
            return;
        }
        match result {
            Ok(detail) => self.on_detail(detail, generation).await,
            Err(e) => {
                warn!(id = %id, code = e.error_code(), "feed detail failed: {}", e);
                self.update(|inner| inner.detail = LoadingState::Error(e.to_string()));
            }
        }
    }

    async fn on_detail(&self, detail: FeedDetail, generation: u64) {
        let layout = article_layout(&detail);
        let tree = reconcile::pin_slots(&detail);
        let (id, feed_uid) = self.update(|inner| {
            inner.feed_uid = detail.uid.clone();
            inner.feed_username = detail.username.clone();
            inner.feed_type = detail.feed_type.clone();
            inner.flags.reply_count = detail.replynum.clone();
            inner.flags.feed_type_name = detail.feed_type_name.clone();
            inner.article = layout;
            inner.tree = ReplyTree {
                page: std::mem::take(&mut inner.tree.page),
                ..tree
            };
            inner.detail = LoadingState::Success(detail);
            (inner.id.clone(), inner.feed_uid.clone())
        });
        info!(id = %id, feed_uid = %feed_uid, "feed loaded");

        self.replies.reset();
        self.fetch_replies(Fetch::Refresh).await;
        if self.lock().generation != generation {
            return;
        }

        if self.options.record_history {
            if let Err(e) = self.record_history(&id).await {
                warn!(id = %id, "history not recorded: {}", e);
            }
        }
        let is_fav = self.deps.history.check_favorite(&id).await.unwrap_or_else(|e| {
            warn!(id = %id, "favorite lookup failed: {}", e);
            false
        });
        let is_blocked = self
            .deps
            .blacklist
            .check_uid(&feed_uid)
            .await
            .unwrap_or_else(|e| {
                warn!(feed_uid = %feed_uid, "block lookup failed: {}", e);
                false
            });
        self.update(|inner| {
            inner.flags.is_fav = is_fav;
            inner.flags.is_blocked = is_blocked;
        });
    }

    async fn record_history(&self, id: &str) -> Result<(), FeedError> {
        if self.deps.history.check_history(id).await? {
            return Ok(());
        }
        let entity = self.lock().history_entity(self.options.history_message_limit);
        if let Some(entity) = entity {
            self.deps.history.insert_history(entity).await?;
            debug!(id, "history recorded");
        }
        Ok(())
    }

    // ====================================================================
    // Main reply stream
    // ====================================================================

    /// Fetch the page at the current cursor, replacing what is shown.
    pub async fn fetch_data(&self) {
        let Some(guard) = self.replies.try_begin(Fetch::Refresh) else {
            return;
        };
        self.fetch_replies(guard.kind()).await;
        drop(guard);
        self.publish();
    }

    /// Append the next page. Dropped while another fetch is in flight.
    pub async fn load_more(&self) {
        let Some(guard) = self.replies.try_begin(Fetch::LoadMore) else {
            return;
        };
        self.replies.set_end(false);
        self.fetch_replies(guard.kind()).await;
        drop(guard);
        self.publish();
    }

    /// Pull-to-refresh. Re-fetches the header instead when it never loaded.
    pub async fn refresh(&self) {
        let Some(guard) = self.replies.try_begin(Fetch::Refresh) else {
            return;
        };
        let loaded = self.lock().detail.is_success();
        if loaded {
            self.replies.reset();
            self.publish();
            self.fetch_replies(guard.kind()).await;
        } else {
            self.update(|inner| inner.detail = LoadingState::Loading);
            self.load_detail().await;
        }
        drop(guard);
        self.publish();
    }

    /// Switch the screen to another feed and load it from scratch.
    pub async fn reload(&self, id: &str, is_view_reply: bool) {
        self.replies.abandon();
        self.sheet.abandon();
        self.replies.reset();
        self.sheet.reset();
        {
            let mut inner = self.lock();
            let generation = inner.generation + 1;
            let sheet_generation = inner.sheet_generation + 1;
            *inner = Inner::new(id.to_string(), is_view_reply);
            inner.generation = generation;
            inner.sheet_generation = sheet_generation;
        }
        info!(id, "feed reload");
        self.refresh().await;
    }

    async fn fetch_replies(&self, kind: Fetch) {
        let is_load_more = kind == Fetch::LoadMore;
        let (query, generation) = {
            let mut inner = self.lock();
            if is_load_more && inner.replies.is_success() {
                inner.footer = FooterState::Loading;
            }
            let cursor = self.replies.cursor();
            let query = ReplyQuery {
                feed_id: inner.id.clone(),
                list_type: inner.list_type.clone(),
                page: cursor.page,
                first_item: cursor.first_item,
                last_item: cursor.last_item,
                discuss_mode: inner.discuss_mode,
                feed_type: inner.feed_type.clone(),
                block_status: inner.block_status,
                from_author: inner.from_feed_author,
            };
            (query, inner.generation)
        };
        self.publish();

        let result = match self.deps.api.feed_replies(&query).await {
            Ok(items) => Ok(self.drop_blocked(items).await),
            Err(e) => Err(e),
        };
        if self.lock().generation != generation {
            debug!(page = query.page, "stale reply page dropped");
            return;
        }

        match result {
            Ok(None) => {
                self.replies.set_end(true);
                self.update(|inner| {
                    if !(is_load_more && inner.replies.is_success()) {
                        inner.tree.page.clear();
                        inner.replies = LoadingState::Empty;
                    }
                    inner.footer = FooterState::End;
                });
            }
            Ok(Some((raw, kept))) => {
                self.replies.advance(&raw);
                self.update(|inner| {
                    let page = reconcile::prepare_page(kept, &inner.page_context());
                    let existing = std::mem::take(&mut inner.tree.page);
                    let existing = if inner.replies.is_success() {
                        existing
                    } else {
                        Vec::new()
                    };
                    inner.tree.page = reconcile::merge_page(existing, page, is_load_more);
                    inner.replies = if inner.tree.page.is_empty() {
                        LoadingState::Empty
                    } else {
                        LoadingState::Success(())
                    };
                    inner.footer = FooterState::Success;
                });
            }
            Err(e) => {
                warn!(page = query.page, code = e.error_code(), "reply page failed: {}", e);
                self.replies.set_end(true);
                self.update(|inner| {
                    if inner.replies.is_success() {
                        inner.footer = FooterState::Error(e.to_string());
                    } else {
                        inner.replies = LoadingState::Error(e.to_string());
                    }
                });
            }
        }
    }

    /// Split a fetched page into the raw rows (kept for the cursor) and the
    /// rows not written by blocked users. `None` when the backend sent nothing.
    async fn drop_blocked(&self, items: Vec<FeedItem>) -> Option<(Vec<FeedItem>, Vec<FeedItem>)> {
        if items.is_empty() {
            return None;
        }
        let mut kept = Vec::with_capacity(items.len());
        for item in &items {
            if !self.is_blocked(&item.uid).await {
                kept.push(item.clone());
            }
        }
        Some((items, kept))
    }

    /// Like [`Self::drop_blocked`], but the sheet also keeps only
    /// `feed_reply` rows.
    async fn sheet_rows(&self, items: Vec<FeedItem>) -> Option<(Vec<FeedItem>, Vec<FeedItem>)> {
        if items.is_empty() {
            return None;
        }
        let mut kept = Vec::with_capacity(items.len());
        for item in &items {
            if item.entity_type == ENTITY_FEED_REPLY && !self.is_blocked(&item.uid).await {
                kept.push(item.clone());
            }
        }
        Some((items, kept))
    }

    async fn is_blocked(&self, uid: &str) -> bool {
        self.deps.blacklist.check_uid(uid).await.unwrap_or_else(|e| {
            warn!(uid, "block lookup failed: {}", e);
            false
        })
    }

    // ====================================================================
    // Reply sheet
    // ====================================================================

    /// Open the sheet on one reply and load its first page.
    pub async fn open_reply_sheet(&self, reply_id: &str, reply_uid: &str, frid: Option<&str>) {
        self.reset_reply_state();
        self.update(|inner| {
            inner.sheet = SheetRoot {
                reply_id: reply_id.to_string(),
                reply_uid: reply_uid.to_string(),
                frid: frid.map(str::to_string),
            };
        });
        self.fetch_total_reply().await;
    }

    /// Fetch the sheet page at the current cursor.
    pub async fn fetch_total_reply(&self) {
        let Some(guard) = self.sheet.try_begin(Fetch::Refresh) else {
            return;
        };
        self.fetch_sheet(guard.kind()).await;
        drop(guard);
        self.publish();
    }

    pub async fn load_more_reply(&self) {
        let Some(guard) = self.sheet.try_begin(Fetch::LoadMore) else {
            return;
        };
        self.sheet.set_end(false);
        self.fetch_sheet(guard.kind()).await;
        drop(guard);
        self.publish();
    }

    /// Close the sheet: back to page 1, nothing shown.
    pub fn reset_reply_state(&self) {
        self.sheet.abandon();
        self.sheet.reset();
        self.update(|inner| {
            inner.sheet_generation += 1;
            inner.sheet.frid = None;
            inner.sheet_replies = LoadingState::Loading;
            inner.sheet_footer = FooterState::Success;
        });
    }

    async fn fetch_sheet(&self, kind: Fetch) {
        let is_load_more = kind == Fetch::LoadMore;
        let (query, generation, reply_uid) = {
            let mut inner = self.lock();
            if inner.sheet_replies.is_success() {
                inner.sheet_footer = FooterState::Loading;
            } else {
                inner.sheet_replies = LoadingState::Loading;
            }
            let cursor = self.sheet.cursor();
            let query = ReplyQuery {
                feed_id: inner.sheet.reply_id.clone(),
                list_type: String::new(),
                page: cursor.page,
                first_item: None,
                last_item: cursor.last_item,
                discuss_mode: 0,
                feed_type: ENTITY_FEED_REPLY.into(),
                block_status: 0,
                from_author: 0,
            };
            (query, inner.sheet_generation, inner.sheet.reply_uid.clone())
        };
        self.publish();

        let result = match self.deps.api.feed_replies(&query).await {
            Ok(items) => Ok(self.sheet_rows(items).await),
            Err(e) => Err(e),
        };
        if self.lock().sheet_generation != generation {
            debug!(reply_id = %query.feed_id, "stale sheet page dropped");
            return;
        }

        match result {
            Ok(None) => {
                self.sheet.set_end(true);
                self.update(|inner| {
                    if !(is_load_more && inner.sheet_replies.is_success()) {
                        inner.sheet_replies = match inner.reply_top() {
                            Some(top) => LoadingState::Success(vec![top]),
                            None => LoadingState::Empty,
                        };
                    }
                    inner.sheet_footer = FooterState::End;
                });
            }
            Ok(Some((raw, kept))) => {
                let page = self.sheet.advance(&raw);
                let mut list: Vec<FeedItem> = {
                    let inner = self.lock();
                    kept.into_iter()
                        .map(|reply| FeedItem {
                            username: generate_name(&reply, &inner.feed_uid, &reply_uid),
                            ..reply
                        })
                        .collect()
                };
                if page == 1 {
                    if let Some(top) = self.lock().reply_top() {
                        list.insert(0, top);
                    }
                }
                self.update(|inner| {
                    let shown = match inner.sheet_replies.data() {
                        Some(existing) if is_load_more => existing.clone(),
                        _ => Vec::new(),
                    };
                    let merged = reconcile::merge_page(shown, list, is_load_more);
                    inner.sheet_replies = if merged.is_empty() {
                        LoadingState::Empty
                    } else {
                        LoadingState::Success(merged)
                    };
                    inner.sheet_footer = FooterState::Success;
                });
            }
            Err(e) => {
                warn!(reply_id = %query.feed_id, code = e.error_code(), "sheet page failed: {}", e);
                self.sheet.set_end(true);
                self.update(|inner| {
                    if inner.sheet_replies.is_success() {
                        inner.sheet_footer = FooterState::Error(e.to_string());
                    } else {
                        inner.sheet_replies = LoadingState::Error(e.to_string());
                    }
                });
            }
        }
    }

    // ====================================================================
    // Actions
    // ====================================================================

    /// Toggle a like. `like` is the current state (1 = liked).
    pub async fn on_like_reply(&self, id: &str, like: i32, kind: LikeType) {
        let path = kind.like_path(like);
        match self.deps.api.post_action(path, id).await {
            Ok(resp) if !resp.message.is_empty() => self.toast(resp.message),
            Ok(resp) => match resp.data {
                Some(data) => self.update(|inner| inner.apply_like(id, &data.count, like != 1)),
                None => debug!(id, path, "like answered without data"),
            },
            Err(e) => {
                warn!(id, path, "like failed: {}", e);
                self.toast(e.to_string());
            }
        }
    }

    /// Delete a reply (or the feed). Local state changes only after the
    /// backend confirms.
    pub async fn on_delete_reply(&self, id: &str, kind: LikeType) {
        let path = kind.delete_path();
        match self.deps.api.post_action(path, id).await {
            Ok(resp) if !resp.message.is_empty() => self.toast(resp.message),
            Ok(resp) => match resp.data {
                Some(data) if data.count == DELETE_OK => {
                    info!(id, "reply deleted");
                    self.update(|inner| inner.remove_reply(id));
                    self.toast(data.count);
                }
                other => debug!(id, ?other, "delete not confirmed"),
            },
            Err(e) => {
                warn!(id, "delete failed: {}", e);
                self.toast(e.to_string());
            }
        }
    }

    /// Block a user from inside the reply sheet.
    pub async fn on_block_reply_user(&self, uid: &str) {
        if let Err(e) = self.deps.blacklist.save_uid(uid).await {
            self.toast(e.to_string());
            return;
        }
        self.update(|inner| {
            if let Some(list) = inner.sheet_replies.data_mut() {
                list.retain(|i| i.uid != uid);
            }
            let root = inner.sheet.root_id().to_string();
            if !root.is_empty() {
                inner.with_tree(|t| reconcile::block_nested(t, &root, uid));
            }
        });
    }

    /// Block a user and drop everything they wrote from the screen.
    pub async fn block_user(&self, uid: &str) {
        if let Err(e) = self.deps.blacklist.save_uid(uid).await {
            self.toast(e.to_string());
            return;
        }
        self.update(|inner| {
            inner.with_tree(|t| reconcile::block_user(t, uid));
            if let Some(list) = inner.sheet_replies.data_mut() {
                list.retain(|i| i.uid != uid);
            }
        });
    }

    /// Block or unblock the feed author.
    pub async fn toggle_block_owner(&self) {
        let (feed_uid, blocked) = {
            let inner = self.lock();
            (inner.feed_uid.clone(), inner.flags.is_blocked)
        };
        if feed_uid.is_empty() {
            return;
        }
        let result = if blocked {
            self.deps.blacklist.delete_uid(&feed_uid).await
        } else {
            self.deps.blacklist.save_uid(&feed_uid).await
        };
        match result {
            Ok(()) => self.update(|inner| inner.flags.is_blocked = !blocked),
            Err(e) => self.toast(e.to_string()),
        }
    }

    /// Add or remove the feed from favorites.
    pub async fn toggle_fav(&self) {
        let (id, is_fav, entity) = {
            let inner = self.lock();
            (
                inner.id.clone(),
                inner.flags.is_fav,
                inner.history_entity(self.options.history_message_limit),
            )
        };
        let result = if is_fav {
            self.deps.history.delete_favorite(&id).await
        } else {
            match entity {
                Some(entity) => self.deps.history.insert_favorite(entity).await,
                None => return,
            }
        };
        match result {
            Ok(()) => self.update(|inner| inner.flags.is_fav = !is_fav),
            Err(e) => self.toast(e.to_string()),
        }
    }

    /// Point the composer at a feed or reply and open it.
    pub fn set_reply_target(&self, target: ReplyTarget) {
        self.update(|inner| {
            inner.target = target;
            inner.flags.on_reply = true;
            inner.flags.need_captcha = false;
        });
    }

    /// Send the composed reply to the current target.
    pub async fn on_post_reply(&self, message: &str, captcha: &str) {
        let target = self.lock().target.clone();
        let result = self
            .deps
            .api
            .post_reply(message, captcha, &target.reply_id, &target.reply_type)
            .await;
        match result {
            Ok(resp) => match resp.data {
                Some(reply) => {
                    info!(reply_id = %target.reply_id, id = %reply.id, "reply posted");
                    self.update(|inner| {
                        inner.update_reply(reply);
                        inner.flags.on_reply = false;
                        inner.flags.need_captcha = false;
                    });
                }
                None => {
                    let captcha = resp.message_status == STATUS_CAPTCHA;
                    self.toast(resp.message);
                    if captcha {
                        self.update(|inner| inner.flags.need_captcha = true);
                    }
                }
            },
            Err(ClientError::CaptchaRequired(message)) => {
                self.toast(message);
                self.update(|inner| inner.flags.need_captcha = true);
            }
            Err(e) => {
                warn!(reply_id = %target.reply_id, "post reply failed: {}", e);
                self.toast(e.to_string());
            }
        }
    }
}
