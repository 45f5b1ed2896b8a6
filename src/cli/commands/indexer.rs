//! Indexer management from the command line.

use std::time::Duration;

use crate::config::Config;
use crate::db::Store;
use crate::indexers::torznab::TorznabClient;

#[allow(clippy::too_many_arguments)]
pub async fn cmd_indexer_add(
    config: &Config,
    name: &str,
    indexer_type: &str,
    url: &str,
    api_key: Option<String>,
    categories: Option<String>,
    priority: i32,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let id = store
        .add_indexer(
            name,
            indexer_type,
            url,
            api_key.as_deref(),
            categories.as_deref(),
            priority,
            true,
        )
        .await?;
    println!("Added indexer [{id}] {name}");
    Ok(())
}

pub async fn cmd_indexer_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let indexers = store.list_indexers().await?;
    if indexers.is_empty() {
        println!("No indexers configured.");
        return Ok(());
    }
    for indexer in indexers {
        let state = if indexer.enabled { "enabled" } else { "disabled" };
        println!(
            "[{:>4}] {} ({}) - {} - priority {} - {state}",
            indexer.id, indexer.name, indexer.indexer_type, indexer.url, indexer.priority
        );
    }
    Ok(())
}

pub async fn cmd_indexer_remove(config: &Config, id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    if store.remove_indexer(id).await? {
        println!("Removed indexer {id}");
    } else {
        println!("No indexer with id {id}");
    }
    Ok(())
}

pub async fn cmd_indexer_toggle(config: &Config, id: i32, enabled: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    store.set_indexer_enabled(id, enabled).await?;
    let state = if enabled { "enabled" } else { "disabled" };
    println!("Indexer {id} {state}");
    Ok(())
}

pub async fn cmd_indexer_test(config: &Config, id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let Some(model) = store.get_indexer(id).await? else {
        println!("No indexer with id {id}");
        return Ok(());
    };

    let timeout = Duration::from_secs(u64::from(config.indexers.timeout_seconds.max(1)));
    let client = TorznabClient::from_model(&model, timeout);
    match client.test_connection().await {
        Ok(()) => println!("Indexer {id} ({}) OK", model.name),
        Err(e) => println!("Indexer {id} ({}) FAILED: {e}", model.name),
    }
    Ok(())
}
