//! `coolfeed`: inspect and edit the local feed client data.
//!
//! Works on the same databases the client writes: browsing history,
//! favorites, the user block list and the string caches. `inspect` runs
//! the reply-tree pipeline over saved API responses.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coolfeed_core::ClientConfig;

/// Local data tool for the feed client.
#[derive(Parser, Debug)]
#[command(name = "coolfeed", about = "Feed client local data tool")]
struct Cli {
    /// Path to client config file (default: ~/.coolfeed/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Client configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Browsing history.
    History {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Favorite feeds.
    Favorite {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Blocked users.
    Block {
        #[command(subcommand)]
        action: BlockAction,
    },

    /// String caches: search_history, recent_emoji, keyword_block, topic_block.
    Cache {
        /// Cache table.
        table: String,
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Render a reply tree from saved detail and reply-page JSON.
    Inspect {
        /// `/v6/feed/detail` response data.
        #[arg(long)]
        detail: PathBuf,
        /// Reply page responses, in load order.
        #[arg(long = "page")]
        pages: Vec<PathBuf>,
        /// Sort mode the pages were fetched with.
        #[arg(long, default_value = "lastupdate_desc")]
        list_type: String,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Write a default config file if none exists.
    Init,
}

#[derive(Subcommand, Debug)]
enum EntityAction {
    /// List rows, newest first.
    List,
    /// Remove one feed.
    Remove { id: String },
    /// Remove every feed by one author.
    RemoveUid { uid: String },
    /// Remove everything.
    Clear,
}

#[derive(Subcommand, Debug)]
enum BlockAction {
    List,
    Add { uid: String },
    Remove { uid: String },
    /// Exit status 1 when the user is not blocked.
    Check { uid: String },
    Clear,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    List,
    /// Add an entry or move it to the front.
    Add { data: String },
    Remove { data: String },
    /// Whether any stored entry occurs in TEXT.
    Contains { text: String },
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.output == "json";

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_path)?,
            ConfigAction::Init => commands::config::init(&config_path)?,
        },

        Commands::History { action } => {
            let ctx = commands::context::open(&config_path)?;
            run_entity(&ctx, commands::local::Which::History, action, json_output)?;
        }

        Commands::Favorite { action } => {
            let ctx = commands::context::open(&config_path)?;
            run_entity(&ctx, commands::local::Which::Favorite, action, json_output)?;
        }

        Commands::Block { action } => {
            let ctx = commands::context::open(&config_path)?;
            match action {
                BlockAction::List => commands::block::list(&ctx, json_output)?,
                BlockAction::Add { uid } => commands::block::add(&ctx, &uid).await?,
                BlockAction::Remove { uid } => commands::block::remove(&ctx, &uid).await?,
                BlockAction::Check { uid } => {
                    if !commands::block::check(&ctx, &uid).await? {
                        std::process::exit(1);
                    }
                }
                BlockAction::Clear => commands::block::clear(&ctx)?,
            }
        }

        Commands::Cache { table, action } => {
            let ctx = commands::context::open(&config_path)?;
            let dao = commands::cache::open(&ctx, &table)?;
            match action {
                CacheAction::List => commands::cache::list(&dao, json_output)?,
                CacheAction::Add { data } => commands::cache::add(&dao, &data)?,
                CacheAction::Remove { data } => commands::cache::remove(&dao, &data)?,
                CacheAction::Contains { text } => {
                    if !commands::cache::contains(&dao, &text)? {
                        std::process::exit(1);
                    }
                }
                CacheAction::Clear => commands::cache::clear(&dao)?,
            }
        }

        Commands::Inspect {
            detail,
            pages,
            list_type,
        } => {
            commands::inspect::run(&detail, &pages, &list_type, json_output)?;
        }

        Commands::Version => {
            println!("coolfeed v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn run_entity(
    ctx: &commands::context::Context,
    which: commands::local::Which,
    action: EntityAction,
    json_output: bool,
) -> anyhow::Result<()> {
    let dao = commands::local::dao(ctx, which)?;
    match action {
        EntityAction::List => commands::local::list(&dao, json_output),
        EntityAction::Remove { id } => commands::local::remove(&dao, &id),
        EntityAction::RemoveUid { uid } => commands::local::remove_uid(&dao, &uid),
        EntityAction::Clear => commands::local::clear(&dao),
    }
}
