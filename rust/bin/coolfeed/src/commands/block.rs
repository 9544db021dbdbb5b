//! Block list commands.

use anyhow::Result;
use coolfeed_feed::{BlackListRepo, KvBlackList};

use super::context::Context;
use super::format_millis;

fn blacklist(ctx: &Context) -> KvBlackList {
    KvBlackList::new(ctx.kv.clone())
}

pub fn list(ctx: &Context, output_json: bool) -> Result<()> {
    let users = blacklist(ctx).list()?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }
    if users.is_empty() {
        println!("No blocked users.");
        return Ok(());
    }
    println!("{:16} {}", "UID", "BLOCKED");
    for user in &users {
        println!("{:16} {}", user.uid, format_millis(user.time));
    }
    Ok(())
}

pub async fn add(ctx: &Context, uid: &str) -> Result<()> {
    if !ctx.config.uid.is_empty() && uid == ctx.config.uid {
        anyhow::bail!("Cannot block yourself.");
    }
    blacklist(ctx).save_uid(uid).await?;
    println!("User {} blocked.", uid);
    Ok(())
}

pub async fn remove(ctx: &Context, uid: &str) -> Result<()> {
    blacklist(ctx).delete_uid(uid).await?;
    println!("User {} unblocked.", uid);
    Ok(())
}

pub async fn check(ctx: &Context, uid: &str) -> Result<bool> {
    let blocked = blacklist(ctx).check_uid(uid).await?;
    println!("{}", if blocked { "blocked" } else { "not blocked" });
    Ok(blocked)
}

pub fn clear(ctx: &Context) -> Result<()> {
    let n = blacklist(ctx).clear()?;
    println!("{} users unblocked.", n);
    Ok(())
}
