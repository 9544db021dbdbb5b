//! Offline reply-tree rendering from saved API responses.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use coolfeed_feed::reconcile::{self, PageContext, ReplyTree};
use coolfeed_feed::{FeedDetail, FeedItem};

/// Read a response body: either the bare `data` value or the full
/// `{"data": ...}` envelope.
fn read_data<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not JSON", path.display()))?;
    if let Some(data) = value.get_mut("data") {
        value = data.take();
    }
    serde_json::from_value(value).with_context(|| format!("unexpected shape in {}", path.display()))
}

/// Pin the header replies, then fold each page in as the client would.
pub fn build(detail: &FeedDetail, pages: Vec<Vec<FeedItem>>, list_type: &str) -> ReplyTree {
    let mut tree = reconcile::pin_slots(detail);
    for (i, items) in pages.into_iter().enumerate() {
        let ctx = PageContext {
            feed_uid: &detail.uid,
            list_type,
            top_id: tree.top_id.as_deref(),
            me_id: tree.me_id.as_deref(),
        };
        let page = reconcile::prepare_page(items, &ctx);
        let existing = std::mem::take(&mut tree.page);
        tree.page = reconcile::merge_page(existing, page, i > 0);
    }
    tree
}

pub fn run(detail: &Path, pages: &[PathBuf], list_type: &str, output_json: bool) -> Result<()> {
    let detail: FeedDetail = read_data(detail)?;
    let pages = pages
        .iter()
        .map(|p| read_data::<Vec<FeedItem>>(p))
        .collect::<Result<Vec<_>>>()?;
    let tree = build(&detail, pages, list_type);

    if output_json {
        let out = serde_json::json!({
            "top": tree.top,
            "me": tree.me,
            "page": tree.page,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} by {} ({} replies)", detail.id, detail.username, detail.replynum);
    if let Some(top) = &tree.top {
        print_item("top", top);
    }
    if let Some(me) = &tree.me {
        print_item("me", me);
    }
    for item in &tree.page {
        print_item("", item);
    }
    Ok(())
}

fn print_item(label: &str, item: &FeedItem) {
    println!("{:5} {:12} {:24} {:>6}  {}", label, item.id, item.username, item.likenum, item.message);
    for row in &item.reply_rows {
        println!("{:5} {:12} {}", "", format!("  {}", row.id), row.message);
    }
    if item.reply_rows_more > 0 {
        println!("{:5} {:12} +{} more", "", "", item.reply_rows_more);
    }
}
