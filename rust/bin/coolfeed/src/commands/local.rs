//! History and favorite commands.

use anyhow::Result;
use coolfeed_feed::dao::HistoryFavoriteDao;

use super::context::Context;
use super::format_millis;

#[derive(Debug, Clone, Copy)]
pub enum Which {
    History,
    Favorite,
}

pub fn dao(ctx: &Context, which: Which) -> Result<HistoryFavoriteDao> {
    let dao = match which {
        Which::History => HistoryFavoriteDao::history(ctx.sql.clone())?,
        Which::Favorite => HistoryFavoriteDao::favorite(ctx.sql.clone())?,
    };
    Ok(dao)
}

pub fn list(dao: &HistoryFavoriteDao, output_json: bool) -> Result<()> {
    let rows = dao.load_all()?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No {} entries.", dao.table());
        return Ok(());
    }

    println!("{:12} {:10} {:16} {:16} {}", "ID", "UID", "USERNAME", "SAVED", "MESSAGE");
    for row in &rows {
        let message: String = row.message.chars().take(40).collect();
        println!(
            "{:12} {:10} {:16} {:16} {}",
            row.id,
            row.uid,
            row.username,
            format_millis(row.time),
            message.replace('\n', " ")
        );
    }
    Ok(())
}

pub fn remove(dao: &HistoryFavoriteDao, id: &str) -> Result<()> {
    match dao.delete(id)? {
        0 => println!("{} {} not found.", dao.table(), id),
        _ => println!("{} {} removed.", dao.table(), id),
    }
    Ok(())
}

pub fn remove_uid(dao: &HistoryFavoriteDao, uid: &str) -> Result<()> {
    let n = dao.delete_by_uid(uid)?;
    println!("{} {} entries by {} removed.", n, dao.table(), uid);
    Ok(())
}

pub fn clear(dao: &HistoryFavoriteDao) -> Result<()> {
    let n = dao.delete_all()?;
    println!("{} {} entries removed.", n, dao.table());
    Ok(())
}
