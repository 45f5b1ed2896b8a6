//! Download tracking and upgrade-search control from the command line.

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_downloads(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let downloads = store.list_active_downloads().await?;
    if downloads.is_empty() {
        println!("No active downloads.");
        return Ok(());
    }
    for download in downloads {
        let paused = if download.upgrade_paused { " (upgrade-paused)" } else { "" };
        println!(
            "[{:>4}] {} - {}{}",
            download.id, download.title, download.status, paused
        );
    }
    Ok(())
}

pub async fn cmd_reset_upgrade(config: &Config, id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    store.reset_download_search(id).await?;
    println!("Upgrade search reset for download {id}");
    Ok(())
}

pub async fn cmd_set_upgrade_paused(config: &Config, id: i32, paused: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    store.set_download_upgrade_paused(id, paused).await?;
    let state = if paused { "paused" } else { "resumed" };
    println!("Upgrade search {state} for download {id}");
    Ok(())
}
