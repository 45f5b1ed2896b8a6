use crate::config::Config;
use crate::indexers::{IndexerRegistry, SearchParams};

pub async fn cmd_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let store = crate::db::Store::new(&config.general.database_path).await?;
    let registry = IndexerRegistry::from_store(&store, config.indexers.timeout_seconds).await?;

    if registry.indexer_count() == 0 {
        println!("No enabled indexers configured.");
        return Ok(());
    }

    println!("Searching {} indexer(s) for: {query}", registry.indexer_count());
    let results = registry.search_all(&SearchParams::for_query(query)).await;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!();
    for result in results.iter().take(20) {
        let size_gb = result
            .size
            .map(|s| format!("{:.2} GB", s as f64 / 1_073_741_824.0))
            .unwrap_or_else(|| "? size".to_string());
        println!("• {}", result.title);
        println!(
            "  {} | seeders {} | {}",
            size_gb,
            result.seeders.unwrap_or(0),
            result.indexer_name
        );
    }

    Ok(())
}
