//! Config commands.

use std::path::Path;

use anyhow::Result;
use coolfeed_core::ClientConfig;

/// Print the effective configuration with resolved paths.
pub fn show(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        format!("{} (not found, defaults)", config_path.display())
    };

    println!("{:24} {}", "config", source);
    println!("{:24} {}", "redb", config.resolve_db_path().display());
    println!("{:24} {}", "sqlite", config.resolve_sqlite_path().display());
    println!("{:24} {}", "record_history", config.record_history);
    println!("{:24} {}", "history_message_limit", config.history_message_limit);
    let uid = if config.uid.is_empty() { "-" } else { &config.uid };
    println!("{:24} {}", "uid", uid);
    Ok(())
}

/// Write the default config unless a file is already there.
pub fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Config already exists at {}.", config_path.display());
        return Ok(());
    }
    ClientConfig::default().save(config_path)?;
    println!("Config written to {}.", config_path.display());
    Ok(())
}
