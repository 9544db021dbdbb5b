//! Opening the local databases named by the client config.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use coolfeed_core::ClientConfig;
use coolfeed_kv::{KVStore, RedbStore};
use coolfeed_sql::{SQLStore, SqliteStore};
use tracing::debug;

/// Everything a command needs: the config and both stores.
pub struct Context {
    pub config: ClientConfig,
    pub kv: Arc<dyn KVStore>,
    pub sql: Arc<dyn SQLStore>,
}

/// Load the config and open (creating if needed) both databases.
pub fn open(config_path: &Path) -> Result<Context> {
    let config = ClientConfig::load(config_path)?;
    let db_path = config.resolve_db_path();
    let sqlite_path = config.resolve_sqlite_path();

    for path in [&db_path, &sqlite_path] {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
    }
    debug!(redb = %db_path.display(), sqlite = %sqlite_path.display(), "opening stores");

    let kv = RedbStore::open(&db_path)
        .with_context(|| format!("cannot open {}", db_path.display()))?;
    let sql = SqliteStore::open(&sqlite_path)
        .with_context(|| format!("cannot open {}", sqlite_path.display()))?;

    Ok(Context {
        config,
        kv: Arc::new(kv),
        sql: Arc::new(sql),
    })
}
