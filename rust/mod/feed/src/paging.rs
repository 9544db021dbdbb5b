use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::model::FeedItem;

const IDLE: u64 = 0;
const TAG_BITS: u32 = 2;
const TAG_MASK: u64 = (1 << TAG_BITS) - 1;

/// Page counter and cursor markers of one reply stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub page: u32,
    pub first_item: Option<String>,
    pub last_item: Option<String>,
    pub is_end: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            page: 1,
            first_item: None,
            last_item: None,
            is_end: false,
        }
    }
}

/// Which kind of fetch holds the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Refresh,
    LoadMore,
}

impl Fetch {
    fn tag(self) -> u64 {
        match self {
            Fetch::Refresh => 1,
            Fetch::LoadMore => 2,
        }
    }
}

/// Pagination state of one stream (main replies or the reply sheet).
///
/// At most one fetch is in flight. The first caller claims the stream;
/// anyone arriving while it is held gets `None` and should drop the
/// request. Nothing is queued or cancelled.
///
/// Each claim carries a fresh ticket, so after [`Pager::abandon`] the old
/// guard's drop cannot release a newer claim.
#[derive(Debug)]
pub struct Pager {
    name: &'static str,
    in_flight: AtomicU64,
    next_ticket: AtomicU64,
    cursor: Mutex<Cursor>,
}

/// Claim on a [`Pager`]. Releases the stream on drop.
#[derive(Debug)]
pub struct FetchGuard<'a> {
    pager: &'a Pager,
    claim: u64,
    kind: Fetch,
}

impl FetchGuard<'_> {
    pub fn kind(&self) -> Fetch {
        self.kind
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        // Fails harmlessly when the claim was abandoned.
        let _ = self.pager.in_flight.compare_exchange(
            self.claim,
            IDLE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl Pager {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            in_flight: AtomicU64::new(IDLE),
            next_ticket: AtomicU64::new(1),
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Claim the stream, or `None` when another fetch already holds it.
    pub fn try_begin(&self, kind: Fetch) -> Option<FetchGuard<'_>> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let claim = (ticket << TAG_BITS) | kind.tag();
        match self
            .in_flight
            .compare_exchange(IDLE, claim, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(FetchGuard {
                pager: self,
                claim,
                kind,
            }),
            Err(held) => {
                debug!(stream = self.name, ?kind, held = held & TAG_MASK, "fetch dropped, stream busy");
                None
            }
        }
    }

    /// Forget the current claim. Its results should be discarded by the caller.
    pub fn abandon(&self) {
        self.in_flight.store(IDLE, Ordering::Release);
    }

    fn held(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire) & TAG_MASK
    }

    pub fn is_refreshing(&self) -> bool {
        self.held() == Fetch::Refresh.tag()
    }

    pub fn is_load_more(&self) -> bool {
        self.held() == Fetch::LoadMore.tag()
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cursor(&self) -> Cursor {
        self.lock().clone()
    }

    pub fn is_end(&self) -> bool {
        self.lock().is_end
    }

    pub fn set_end(&self, end: bool) {
        self.lock().is_end = end;
    }

    /// Back to page 1 with no markers.
    pub fn reset(&self) {
        *self.lock() = Cursor::default();
    }

    /// Advance after a page came back. Returns the page number just loaded.
    pub fn advance(&self, items: &[FeedItem]) -> u32 {
        let mut cursor = self.lock();
        let loaded = cursor.page;
        cursor.page += 1;
        if cursor.first_item.is_none() {
            cursor.first_item = items.first().map(|i| i.id.clone());
        }
        if let Some(last) = items.last() {
            cursor.last_item = Some(last.id.clone());
        }
        loaded
    }
}
