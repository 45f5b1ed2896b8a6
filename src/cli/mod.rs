//! Command-line surface: a thin `clap` front end over the same
//! [`crate::state::SharedState`] and [`crate::db::Store`] the web API uses.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::*;

#[derive(Parser)]
#[command(name = "mediarr", about = "Self-hosted media acquisition and library management")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Runs the scheduler and web API until interrupted.
    Daemon,
    /// Runs one library scan and one upgrade-search sweep, then exits.
    Check,
    /// Writes a default config.toml if none exists yet.
    Init,
    /// Runs the web API only, without the scheduler.
    Web,
    /// Scans libraries for new or missing media. Omit `library` to scan all four kinds.
    Scan {
        #[arg(value_name = "movies|tv|music|books")]
        library: Option<String>,
    },
    /// Searches every enabled indexer for a free-text query.
    Search { query: Vec<String> },
    /// Lists the movie catalog.
    Movies,
    /// Lists the TV show catalog.
    Shows,
    /// Lists the music artist catalog.
    Music,
    /// Lists the book catalog.
    Books,
    /// Lists active downloads.
    Downloads,
    /// Triggers a manual import for a download.
    Import { download_id: i32 },
    /// Lists configured quality presets.
    QualityPresets,
    /// Manages indexers.
    Indexer {
        #[command(subcommand)]
        command: IndexerCommands,
    },
    /// Pauses or resumes upgrade-search for a download.
    UpgradePause { id: i32, paused: bool },
    /// Resets the upgrade-search backoff for a download, forcing it to be re-checked.
    UpgradeReset { id: i32 },
}

#[derive(Subcommand)]
pub enum IndexerCommands {
    /// Registers a new indexer.
    Add {
        name: String,
        /// "torznab", "newznab", or "prowlarr".
        indexer_type: String,
        url: String,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        categories: Option<String>,
        #[arg(long, default_value_t = 0)]
        priority: i32,
    },
    /// Lists configured indexers.
    List,
    /// Removes an indexer.
    Remove { id: i32 },
    /// Enables or disables an indexer.
    Toggle { id: i32, enabled: bool },
    /// Tests connectivity and credentials against an indexer's capabilities endpoint.
    Test { id: i32 },
}
