//! Quality preset inspection.

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_quality_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let presets = store.list_quality_presets().await?;
    if presets.is_empty() {
        println!("No quality presets configured.");
        return Ok(());
    }
    for preset in presets {
        println!("[{:>4}] {}", preset.id, preset.name);
    }
    Ok(())
}
