//! Manual import trigger for a single download.

use std::path::Path;

use crate::config::Config;
use crate::db::Store;
use crate::library::recycle::RecycleBin;
use crate::services::import_pipeline::ImportPipeline;

pub async fn cmd_import(config: &Config, download_id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let download = store
        .get_download(download_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no download with id {download_id}"))?;
    let source_path = download
        .download_path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("download {download_id} has no path to import from"))?;

    let recycle_bin = RecycleBin::new(format!("{}/.recycle", config.downloads.root_path), 30);
    let unmatched_root = format!("{}/_Unmatched", config.downloads.import_root_path);
    let pipeline = ImportPipeline::new(store, unmatched_root, recycle_bin);
    let outcome = pipeline.process_import(&download, Path::new(source_path)).await?;

    if outcome.imported {
        println!("Imported to {}", outcome.dest_path.unwrap_or_default());
    } else {
        println!(
            "Import failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
