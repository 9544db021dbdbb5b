//! String cache commands.

use anyhow::Result;
use coolfeed_feed::dao::StringEntityDao;
use coolfeed_feed::dao::string_entity::table;

use super::context::Context;
use super::format_millis;

/// Open one of the known cache tables.
pub fn open(ctx: &Context, name: &str) -> Result<StringEntityDao> {
    let name = name.replace('-', "_");
    if !table::ALL.contains(&name.as_str()) {
        anyhow::bail!(
            "Unknown cache \"{}\". Known caches: {}.",
            name,
            table::ALL.join(", ")
        );
    }
    Ok(StringEntityDao::new(ctx.sql.clone(), &name)?)
}

pub fn list(dao: &StringEntityDao, output_json: bool) -> Result<()> {
    let rows = dao.load_all()?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("{} is empty.", dao.table());
        return Ok(());
    }
    println!("{:16} {}", "UPDATED", "DATA");
    for row in &rows {
        println!("{:16} {}", format_millis(row.id), row.data);
    }
    Ok(())
}

pub fn add(dao: &StringEntityDao, data: &str) -> Result<()> {
    dao.touch(data)?;
    println!("\"{}\" saved to {}.", data, dao.table());
    Ok(())
}

pub fn remove(dao: &StringEntityDao, data: &str) -> Result<()> {
    match dao.delete(data)? {
        0 => println!("\"{}\" not in {}.", data, dao.table()),
        _ => println!("\"{}\" removed from {}.", data, dao.table()),
    }
    Ok(())
}

pub fn contains(dao: &StringEntityDao, text: &str) -> Result<bool> {
    let hit = dao.is_contain(text)?;
    println!("{}", if hit { "match" } else { "no match" });
    Ok(hit)
}

pub fn clear(dao: &StringEntityDao) -> Result<()> {
    let n = dao.delete_all()?;
    println!("{} entries removed from {}.", n, dao.table());
    Ok(())
}
