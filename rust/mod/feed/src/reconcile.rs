//! Reply-tree reconciliation.
//!
//! The tree is a value: every operation consumes a snapshot and returns the
//! next one. Invariants kept by every operation:
//! - no two items of a list shown to the user share an `entity_id`
//! - under the default sort, the pinned top/me replies are never also in the page
//! - a deleted or blocked item is gone from every level, nested rows included

use std::collections::HashSet;

use crate::decorate::{TAG_PINNED, decorate_nested, generate_mess, owner_username};
use crate::model::{FeedDetail, FeedItem, UserAction};

/// Default sort. Only this mode hides pinned replies from the page.
pub const LIST_TYPE_DEFAULT: &str = "lastupdate_desc";

/// Which pinned slot an id addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Top,
    Me,
}

/// Pinned slots plus the reply page of one feed.
///
/// `top_id`/`me_id` outlive their slot: once a pinned reply is deleted its
/// id still keeps a stale copy out of later pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyTree {
    pub top_id: Option<String>,
    pub me_id: Option<String>,
    pub top: Option<FeedItem>,
    pub me: Option<FeedItem>,
    pub page: Vec<FeedItem>,
}

impl ReplyTree {
    pub fn slot_of(&self, id: &str) -> Option<Slot> {
        if self.top_id.as_deref() == Some(id) {
            Some(Slot::Top)
        } else if self.me_id.as_deref() == Some(id) {
            Some(Slot::Me)
        } else {
            None
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<&FeedItem> {
        match slot {
            Slot::Top => self.top.as_ref(),
            Slot::Me => self.me.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<FeedItem> {
        match slot {
            Slot::Top => &mut self.top,
            Slot::Me => &mut self.me,
        }
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut FeedItem> {
        self.top.iter_mut().chain(self.me.iter_mut())
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.slot_of(id).is_some()
    }

    /// Find a top-level reply, pinned slots first.
    pub fn find(&self, id: &str) -> Option<&FeedItem> {
        match self.slot_of(id) {
            Some(slot) => self.slot(slot),
            None => self.page.iter().find(|item| item.id == id),
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut FeedItem> {
        match self.slot_of(id) {
            Some(slot) => self.slot_mut(slot).as_mut(),
            None => self.page.iter_mut().find(|item| item.id == id),
        }
    }
}

/// Drop later items whose `entity_id` was already seen.
pub fn distinct_by_entity(items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.entity_id.clone()))
        .collect()
}

/// Merge a fetched page into what is shown.
///
/// Load-more appends and dedups; anything else replaces.
pub fn merge_page(existing: Vec<FeedItem>, incoming: Vec<FeedItem>, is_load_more: bool) -> Vec<FeedItem> {
    if is_load_more {
        let mut merged = existing;
        merged.extend(incoming);
        distinct_by_entity(merged)
    } else {
        distinct_by_entity(incoming)
    }
}

/// Where a freshly posted reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyParent<'a> {
    /// A reply to the feed itself.
    Feed,
    /// A nested reply under the top-level reply with this id.
    Reply(&'a str),
}

/// Insert a reply the user just posted.
///
/// A reply to the feed is prepended to the page. A nested reply is appended
/// to its parent's rows, pinned slots checked first. An unknown parent
/// leaves the tree as it was.
pub fn insert_reply(mut tree: ReplyTree, parent: ReplyParent<'_>, item: FeedItem) -> ReplyTree {
    match parent {
        ReplyParent::Feed => {
            let mut page = Vec::with_capacity(tree.page.len() + 1);
            page.push(item);
            page.append(&mut tree.page);
            tree.page = distinct_by_entity(page);
        }
        ReplyParent::Reply(parent_id) => {
            if let Some(parent) = tree.find_mut(parent_id) {
                let mut rows = std::mem::take(&mut parent.reply_rows);
                rows.push(item);
                parent.reply_rows = distinct_by_entity(rows);
            }
        }
    }
    tree
}

/// Remove a reply by id.
///
/// A pinned id clears its slot. Every other copy, top-level or nested, is
/// removed as well so a stale nested row cannot bring it back.
pub fn delete_reply(mut tree: ReplyTree, target_id: &str) -> ReplyTree {
    if let Some(slot) = tree.slot_of(target_id) {
        *tree.slot_mut(slot) = None;
    }
    tree.page.retain(|item| item.id != target_id);
    for item in tree.slots_mut() {
        item.reply_rows.retain(|r| r.id != target_id);
    }
    for item in &mut tree.page {
        item.reply_rows.retain(|r| r.id != target_id);
    }
    tree
}

/// Remove a nested reply from one known parent.
pub fn delete_nested(mut tree: ReplyTree, parent_id: &str, target_id: &str) -> ReplyTree {
    if let Some(parent) = tree.find_mut(parent_id) {
        parent.reply_rows.retain(|r| r.id != target_id);
    }
    tree
}

/// Remove everything `uid` wrote, at every level.
pub fn block_user(mut tree: ReplyTree, uid: &str) -> ReplyTree {
    for slot in [Slot::Top, Slot::Me] {
        let entry = tree.slot_mut(slot);
        if entry.as_ref().is_some_and(|item| item.uid == uid) {
            *entry = None;
        }
    }
    tree.page.retain(|item| item.uid != uid);
    for item in tree.slots_mut() {
        item.reply_rows.retain(|r| r.uid != uid);
    }
    for item in &mut tree.page {
        item.reply_rows.retain(|r| r.uid != uid);
    }
    tree
}

/// Strip `uid` from the nested rows of one parent only.
pub fn block_nested(mut tree: ReplyTree, parent_id: &str, uid: &str) -> ReplyTree {
    if let Some(parent) = tree.find_mut(parent_id) {
        parent.reply_rows.retain(|r| r.uid != uid);
    }
    tree
}

/// Patch the like count and state of a top-level reply.
/// Returns whether a reply with that id was found.
pub fn apply_like(mut tree: ReplyTree, id: &str, likenum: &str, liked: bool) -> (ReplyTree, bool) {
    let found = match tree.find_mut(id) {
        Some(item) => {
            set_like(item, likenum, liked);
            true
        }
        None => false,
    };
    (tree, found)
}

pub(crate) fn set_like(item: &mut FeedItem, likenum: &str, liked: bool) {
    item.likenum = likenum.to_string();
    item.user_action = Some(UserAction::liked(liked));
}

/// Context for decorating a fetched page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub feed_uid: &'a str,
    pub list_type: &'a str,
    pub top_id: Option<&'a str>,
    pub me_id: Option<&'a str>,
}

/// Decorate and filter a freshly fetched reply page.
///
/// Tags the feed owner's usernames, renders nested messages, dedups, and
/// under the default sort drops the pinned replies.
pub fn prepare_page(items: Vec<FeedItem>, ctx: &PageContext<'_>) -> Vec<FeedItem> {
    let hide_pinned = ctx.list_type == LIST_TYPE_DEFAULT;
    let decorated = items
        .into_iter()
        .map(|mut item| {
            item.username = owner_username(&item.username, &item.uid, ctx.feed_uid);
            decorate_nested(&mut item, ctx.feed_uid);
            item
        })
        .collect();
    distinct_by_entity(decorated)
        .into_iter()
        .filter(|item| {
            !hide_pinned
                || (ctx.top_id != Some(item.id.as_str()) && ctx.me_id != Some(item.id.as_str()))
        })
        .collect()
}

/// Lift the pinned replies out of a feed header into a fresh tree.
///
/// The top reply gets the owner tag and ` [置顶]`; nested rows of both
/// slots are rendered against the feed owner.
pub fn pin_slots(detail: &FeedDetail) -> ReplyTree {
    let feed_uid = detail.uid.as_str();
    let mut tree = ReplyTree::default();

    if let Some(mut top) = detail.top_reply_rows.first().cloned() {
        top.username = format!(
            "{}{}",
            owner_username(&top.username, &top.uid, feed_uid),
            TAG_PINNED
        );
        decorate_nested(&mut top, feed_uid);
        tree.top_id = Some(top.id.clone());
        tree.top = Some(top);
    }
    if let Some(mut me) = detail.reply_me_rows.first().cloned() {
        decorate_nested(&mut me, feed_uid);
        tree.me_id = Some(me.id.clone());
        tree.me = Some(me);
    }
    tree
}

/// Render a reply the user posted under `root_uid`'s reply.
pub fn decorate_posted(item: FeedItem, feed_uid: &str, root_uid: &str) -> FeedItem {
    let message = generate_mess(&item, feed_uid, root_uid);
    FeedItem { message, ..item }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, uid: &str) -> FeedItem {
        FeedItem {
            entity_id: format!("e{id}"),
            id: id.into(),
            uid: uid.into(),
            username: format!("user{uid}"),
            ruid: "0".into(),
            ..Default::default()
        }
    }

    fn with_rows(mut parent: FeedItem, rows: Vec<FeedItem>) -> FeedItem {
        parent.reply_rows = rows;
        parent
    }

    fn ids(items: &[FeedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn assert_distinct(items: &[FeedItem]) {
        let mut seen = HashSet::new();
        for i in items {
            assert!(seen.insert(&i.entity_id), "duplicate entity {}", i.entity_id);
        }
    }

    fn pinned_tree() -> ReplyTree {
        ReplyTree {
            top_id: Some("10".into()),
            me_id: Some("20".into()),
            top: Some(with_rows(item("10", "a"), vec![item("11", "b")])),
            me: Some(with_rows(item("20", "c"), vec![item("21", "b")])),
            page: vec![
                with_rows(item("1", "a"), vec![item("2", "b"), item("3", "c")]),
                item("4", "b"),
                item("5", "c"),
            ],
        }
    }

    // ── merge ───────────────────────────────────────────────────────

    #[test]
    fn merge_load_more_appends_without_duplicates() {
        let existing = vec![item("1", "a"), item("2", "a")];
        let incoming = vec![item("2", "a"), item("3", "a"), item("3", "a")];
        let merged = merge_page(existing, incoming, true);
        assert_eq!(ids(&merged), vec!["1", "2", "3"]);
        assert_distinct(&merged);
    }

    #[test]
    fn merge_refresh_replaces() {
        let merged = merge_page(vec![item("1", "a")], vec![item("9", "a"), item("9", "a")], false);
        assert_eq!(ids(&merged), vec!["9"]);
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let mut stale = item("1", "a");
        stale.message = "old".into();
        let mut fresh = item("1", "a");
        fresh.message = "new".into();
        let merged = merge_page(vec![stale], vec![fresh], true);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].message, "old");
    }

    #[test]
    fn merge_never_yields_duplicates_over_many_pages() {
        let mut shown = Vec::new();
        for round in 0..6u32 {
            let page: Vec<FeedItem> = (0..5u32)
                .map(|k| item(&((round * 3 + k) % 11).to_string(), "u"))
                .collect();
            shown = merge_page(shown, page, round > 0);
            assert_distinct(&shown);
        }
        assert_eq!(shown.len(), 11);
    }

    // ── insert ──────────────────────────────────────────────────────

    #[test]
    fn insert_to_feed_prepends() {
        let tree = insert_reply(pinned_tree(), ReplyParent::Feed, item("9", "z"));
        assert_eq!(ids(&tree.page), vec!["9", "1", "4", "5"]);
    }

    #[test]
    fn insert_nested_checks_pinned_slot_first() {
        let tree = insert_reply(pinned_tree(), ReplyParent::Reply("10"), item("12", "z"));
        assert_eq!(ids(&tree.top.as_ref().unwrap().reply_rows), vec!["11", "12"]);
        assert_eq!(tree.page.len(), 3);
    }

    #[test]
    fn insert_nested_into_page_item() {
        let tree = insert_reply(pinned_tree(), ReplyParent::Reply("4"), item("41", "z"));
        assert_eq!(ids(&tree.page[1].reply_rows), vec!["41"]);
    }

    #[test]
    fn insert_under_unknown_parent_is_noop() {
        let before = pinned_tree();
        let after = insert_reply(before.clone(), ReplyParent::Reply("404"), item("x", "z"));
        assert_eq!(before, after);
    }

    // ── delete ──────────────────────────────────────────────────────

    #[test]
    fn delete_pinned_clears_slot_and_keeps_id() {
        let tree = delete_reply(pinned_tree(), "10");
        assert!(tree.top.is_none());
        assert_eq!(tree.top_id.as_deref(), Some("10"));
        assert!(tree.me.is_some());
    }

    #[test]
    fn delete_top_level_and_nested() {
        let tree = delete_reply(pinned_tree(), "4");
        assert_eq!(ids(&tree.page), vec!["1", "5"]);

        let tree = delete_reply(tree, "3");
        assert_eq!(ids(&tree.page[0].reply_rows), vec!["2"]);
    }

    #[test]
    fn deleted_reply_is_not_resurrected_by_refetch() {
        let tree = delete_reply(pinned_tree(), "2");
        assert!(tree.page.iter().all(|i| i.reply_rows.iter().all(|r| r.id != "2")));

        // Next page repeats page 1 content minus the deleted reply.
        let next = vec![
            with_rows(item("1", "a"), vec![item("3", "c")]),
            item("6", "a"),
        ];
        let page = merge_page(tree.page, next, true);
        assert!(page.iter().all(|i| i.id != "2"));
        assert!(page.iter().all(|i| i.reply_rows.iter().all(|r| r.id != "2")));
        assert_distinct(&page);
    }

    #[test]
    fn deleted_pinned_reply_stays_out_of_later_pages() {
        let tree = delete_reply(pinned_tree(), "10");
        let ctx = PageContext {
            feed_uid: "a",
            list_type: LIST_TYPE_DEFAULT,
            top_id: tree.top_id.as_deref(),
            me_id: tree.me_id.as_deref(),
        };
        let page = prepare_page(vec![item("10", "a"), item("7", "b")], &ctx);
        assert_eq!(ids(&page), vec!["7"]);
    }

    #[test]
    fn delete_nested_targets_one_parent() {
        let tree = delete_nested(pinned_tree(), "20", "21");
        assert!(tree.me.as_ref().unwrap().reply_rows.is_empty());
        let tree = delete_nested(tree, "1", "2");
        assert_eq!(ids(&tree.page[0].reply_rows), vec!["3"]);
    }

    // ── block ───────────────────────────────────────────────────────

    #[test]
    fn block_removes_user_everywhere() {
        let tree = block_user(pinned_tree(), "b");

        assert_eq!(ids(&tree.page), vec!["1", "5"]);
        for item in tree.page.iter().chain(tree.top.iter()).chain(tree.me.iter()) {
            assert!(item.uid != "b");
            assert!(item.reply_rows.iter().all(|r| r.uid != "b"));
        }
        assert!(tree.top.is_some());
        assert!(tree.me.is_some());
    }

    #[test]
    fn block_pinned_author_clears_slot() {
        let tree = block_user(pinned_tree(), "c");
        assert!(tree.me.is_none());
        assert_eq!(ids(&tree.page[0].reply_rows), vec!["2"]);
    }

    #[test]
    fn block_nested_is_local() {
        let tree = block_nested(pinned_tree(), "1", "b");
        assert_eq!(ids(&tree.page[0].reply_rows), vec!["3"]);
        assert_eq!(tree.top.as_ref().unwrap().reply_rows.len(), 1);
        assert_eq!(tree.page[1].uid, "b");
    }

    // ── like ────────────────────────────────────────────────────────

    #[test]
    fn like_patches_slot_or_page() {
        let (tree, found) = apply_like(pinned_tree(), "20", "5", true);
        assert!(found);
        assert_eq!(tree.me.as_ref().unwrap().likenum, "5");
        assert!(tree.me.as_ref().unwrap().is_liked());

        let (tree, found) = apply_like(tree, "4", "1", false);
        assert!(found);
        assert!(!tree.page[1].is_liked());

        let (_, found) = apply_like(tree, "404", "1", true);
        assert!(!found);
    }

    // ── page preparation ────────────────────────────────────────────

    #[test]
    fn prepare_page_hides_pinned_in_default_sort_only() {
        let page = vec![item("10", "a"), item("20", "b"), item("1", "c")];
        let mut ctx = PageContext {
            feed_uid: "a",
            list_type: LIST_TYPE_DEFAULT,
            top_id: Some("10"),
            me_id: Some("20"),
        };
        assert_eq!(ids(&prepare_page(page.clone(), &ctx)), vec!["1"]);

        ctx.list_type = "dateline_desc";
        assert_eq!(ids(&prepare_page(page, &ctx)), vec!["10", "20", "1"]);
    }

    #[test]
    fn prepare_page_decorates() {
        let root = with_rows(item("1", "a"), vec![{
            let mut r = item("2", "b");
            r.message = "hey".into();
            r.ruid = "a".into();
            r.rusername = "usera".into();
            r
        }]);
        let ctx = PageContext {
            feed_uid: "a",
            list_type: LIST_TYPE_DEFAULT,
            top_id: None,
            me_id: None,
        };
        let page = prepare_page(vec![root, item("1", "a")], &ctx);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].username, "usera [楼主]");
        // Replying to the root owner, so no target link.
        assert_eq!(
            page[0].reply_rows[0].message,
            r#"<a class="feed-link-uname" href="/u/b">userb</a>回复: hey"#
        );
    }

    #[test]
    fn pinned_items_never_appear_twice() {
        let detail = FeedDetail {
            uid: "a".into(),
            top_reply_rows: vec![item("10", "a")],
            reply_me_rows: vec![item("20", "c")],
            ..Default::default()
        };
        let mut tree = pin_slots(&detail);
        let ctx = PageContext {
            feed_uid: "a",
            list_type: LIST_TYPE_DEFAULT,
            top_id: tree.top_id.as_deref(),
            me_id: tree.me_id.as_deref(),
        };
        let first = prepare_page(vec![item("10", "a"), item("1", "b")], &ctx);
        let second = prepare_page(vec![item("20", "c"), item("2", "b")], &ctx);
        tree.page = merge_page(merge_page(Vec::new(), first, false), second, true);

        let mut all: Vec<&str> = ids(&tree.page);
        all.extend(tree.top.iter().chain(tree.me.iter()).map(|i| i.id.as_str()));
        all.sort();
        assert_eq!(all, vec!["1", "10", "2", "20"]);
    }

    #[test]
    fn pin_slots_tags_top_reply() {
        let detail = FeedDetail {
            uid: "a".into(),
            top_reply_rows: vec![with_rows(item("10", "a"), vec![item("11", "b")])],
            reply_me_rows: vec![item("20", "c")],
            ..Default::default()
        };
        let tree = pin_slots(&detail);
        let top = tree.top.unwrap();
        assert_eq!(top.username, "usera [楼主] [置顶]");
        assert!(top.reply_rows[0].message.contains("href=\"/u/b\""));
        assert_eq!(tree.me.unwrap().username, "userc");
        assert_eq!(tree.me_id.as_deref(), Some("20"));
    }
}
