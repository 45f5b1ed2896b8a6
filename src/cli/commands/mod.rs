mod downloads;
mod import;
mod indexer;
mod library;
mod quality;
mod scan;
mod search;

pub use downloads::{cmd_list_downloads, cmd_reset_upgrade, cmd_set_upgrade_paused};
pub use import::cmd_import;
pub use indexer::{
    cmd_indexer_add, cmd_indexer_list, cmd_indexer_remove, cmd_indexer_test, cmd_indexer_toggle,
};
pub use library::{cmd_list_books, cmd_list_movies, cmd_list_music, cmd_list_shows};
pub use quality::cmd_quality_list;
pub use scan::cmd_scan;
pub use search::cmd_search;
