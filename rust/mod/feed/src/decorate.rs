//! Display decoration for reply usernames and messages.
//!
//! Everything here is a pure function of the reply and the two owner uids,
//! so it is recomputed on every fetched page and never stored as truth.

use crate::model::FeedItem;

/// Marks the feed owner.
pub const TAG_FEED_OWNER: &str = " [楼主] ";
/// Marks the owner of the reply a nested reply hangs under.
pub const TAG_ROOT_OWNER: &str = " [层主] ";
/// Suffix on the pinned top reply.
pub const TAG_PINNED: &str = " [置顶]";

/// Role tag for `uid`, feed owner first.
pub fn role_tag(uid: &str, feed_uid: &str, root_uid: &str) -> &'static str {
    if uid == feed_uid {
        TAG_FEED_OWNER
    } else if uid == root_uid {
        TAG_ROOT_OWNER
    } else {
        ""
    }
}

/// Username of a top-level reply, with ` [楼主]` when the feed owner wrote it.
pub fn owner_username(username: &str, uid: &str, feed_uid: &str) -> String {
    if uid == feed_uid {
        format!("{} [楼主]", username)
    } else {
        username.to_string()
    }
}

fn user_link(uid: &str, name: &str, tag: &str) -> String {
    format!(r#"<a class="feed-link-uname" href="/u/{uid}">{name}{tag}</a>"#)
}

/// Message of a nested reply, rendered inline under its root reply:
/// `<author>回复<target>: <message> <pic link>`.
///
/// The target link is dropped when the reply answers the root owner.
pub fn generate_mess(reply: &FeedItem, feed_uid: &str, root_uid: &str) -> String {
    let author = user_link(
        &reply.uid,
        &reply.username,
        role_tag(&reply.uid, feed_uid, root_uid),
    );
    let target = if reply.ruid == root_uid {
        String::new()
    } else {
        user_link(
            &reply.ruid,
            &reply.rusername,
            role_tag(&reply.ruid, feed_uid, root_uid),
        )
    };
    let pic = if reply.pic.is_empty() {
        String::new()
    } else {
        format!(
            r#" <a class=\"feed-forward-pic\" href={}>查看图片({})</a>"#,
            reply.pic,
            reply.pic_arr.len()
        )
    };
    format!("{author}回复{target}: {}{pic}", reply.message)
}

/// Username line of a reply in the reply sheet.
pub fn generate_name(reply: &FeedItem, feed_uid: &str, root_uid: &str) -> String {
    let author = user_link(
        &reply.uid,
        &reply.username,
        role_tag(&reply.uid, feed_uid, root_uid),
    );
    if reply.ruid == "0" {
        author
    } else {
        // The backend links replied-to users by name here.
        let target = user_link(
            &reply.rusername,
            &reply.rusername,
            role_tag(&reply.ruid, feed_uid, root_uid),
        );
        format!("{author}回复{target}")
    }
}

/// Rewrite every nested message of `root` with [`generate_mess`].
pub fn decorate_nested(root: &mut FeedItem, feed_uid: &str) {
    let root_uid = root.uid.clone();
    for reply in &mut root.reply_rows {
        reply.message = generate_mess(reply, feed_uid, &root_uid);
    }
}
