//! In-memory backend for view-model tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use coolfeed_core::ClientError;
use coolfeed_flux::StateStore;
use coolfeed_kv::MemoryStore;
use coolfeed_sql::SqliteStore;

use crate::blacklist::KvBlackList;
use crate::local::LocalHistoryFavorite;
use crate::model::{ActionResponse, FeedDetail, FeedItem, ReplyQuery, ReplyResponse};
use crate::repository::FeedApi;
use crate::viewmodel::{FeedDeps, FeedOptions, FeedViewModel};

/// Queued answers, popped one per call. An empty queue answers with an
/// empty page or an empty action response.
#[derive(Default)]
pub(crate) struct FakeApi {
    details: Mutex<VecDeque<Result<FeedDetail, ClientError>>>,
    pages: Mutex<VecDeque<Result<Vec<FeedItem>, ClientError>>>,
    actions: Mutex<VecDeque<Result<ActionResponse, ClientError>>>,
    replies: Mutex<VecDeque<Result<ReplyResponse, ClientError>>>,
    queries: Mutex<Vec<ReplyQuery>>,
    hold: Mutex<Option<Arc<Notify>>>,
    pub actions_sent: Mutex<Vec<(String, String)>>,
    pub replies_sent: Mutex<Vec<(String, String, String)>>,
}

impl FakeApi {
    pub fn detail(&self, detail: Result<FeedDetail, ClientError>) -> &Self {
        self.details.lock().unwrap().push_back(detail);
        self
    }

    pub fn page(&self, page: Result<Vec<FeedItem>, ClientError>) -> &Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    pub fn action(&self, resp: Result<ActionResponse, ClientError>) -> &Self {
        self.actions.lock().unwrap().push_back(resp);
        self
    }

    pub fn reply(&self, resp: Result<ReplyResponse, ClientError>) -> &Self {
        self.replies.lock().unwrap().push_back(resp);
        self
    }

    /// Keep the next reply page in flight until the returned gate is
    /// notified. The page is taken from the queue before waiting.
    pub fn hold_next_page(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn queries(&self) -> Vec<ReplyQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedApi for FakeApi {
    async fn feed_detail(&self, _id: &str) -> Result<FeedDetail, ClientError> {
        let next = self.details.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ClientError::Network("no detail queued".into())))
    }

    async fn feed_replies(&self, query: &ReplyQuery) -> Result<Vec<FeedItem>, ClientError> {
        self.queries.lock().unwrap().push(query.clone());
        let next = self.pages.lock().unwrap().pop_front();
        // Let a concurrent caller run while this page is "in flight".
        let gate = self.hold.lock().unwrap().take();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn post_action(&self, path: &str, id: &str) -> Result<ActionResponse, ClientError> {
        self.actions_sent
            .lock()
            .unwrap()
            .push((path.to_string(), id.to_string()));
        let next = self.actions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ActionResponse::default()))
    }

    async fn post_reply(
        &self,
        message: &str,
        _captcha: &str,
        reply_id: &str,
        reply_type: &str,
    ) -> Result<ReplyResponse, ClientError> {
        self.replies_sent.lock().unwrap().push((
            message.to_string(),
            reply_id.to_string(),
            reply_type.to_string(),
        ));
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ReplyResponse::default()))
    }
}

pub(crate) struct Harness {
    pub vm: Arc<FeedViewModel>,
    pub api: Arc<FakeApi>,
    pub blacklist: Arc<KvBlackList>,
    pub local: Arc<LocalHistoryFavorite>,
    pub store: Arc<StateStore>,
}

pub(crate) fn harness(id: &str, api: FakeApi, options: FeedOptions) -> Harness {
    let api = Arc::new(api);
    let blacklist = Arc::new(KvBlackList::new(Arc::new(MemoryStore::new())));
    let local = Arc::new(
        LocalHistoryFavorite::new(Arc::new(SqliteStore::open_in_memory().unwrap())).unwrap(),
    );
    let store = Arc::new(StateStore::new());
    let deps = FeedDeps {
        api: api.clone(),
        blacklist: blacklist.clone(),
        history: local.clone(),
    };
    let vm = FeedViewModel::new(id, false, deps, options, store.clone());
    Harness {
        vm,
        api,
        blacklist,
        local,
        store,
    }
}

pub(crate) fn item(id: &str, uid: &str) -> FeedItem {
    FeedItem {
        entity_id: format!("e{id}"),
        id: id.into(),
        entity_type: "feed_reply".into(),
        uid: uid.into(),
        username: format!("user{uid}"),
        ruid: "0".into(),
        likenum: "0".into(),
        ..Default::default()
    }
}

pub(crate) fn detail(id: &str, uid: &str) -> FeedDetail {
    FeedDetail {
        id: id.into(),
        entity_id: format!("e{id}"),
        uid: uid.into(),
        username: format!("user{uid}"),
        message: "hello world".into(),
        message_raw_output: "null".into(),
        feed_type: "feed".into(),
        replynum: "3".into(),
        likenum: "0".into(),
        dateline: 1_700_000_000,
        ..Default::default()
    }
}
