use crate::config::Config;
use crate::state::SharedState;

/// Runs the library scanner once. `library` selects a single library type
/// (`movies`, `tv`, `music`, `books`); omitted runs all four in turn.
pub async fn cmd_scan(config: &Config, library: Option<String>) -> anyhow::Result<()> {
    let shared = SharedState::new(config.clone()).await?;

    match library {
        Some(library_type) => {
            let stats = shared.scanner.scan_library(&library_type).await?;
            println!("Scan complete for {library_type}:");
            println!("  Added:   {}", stats.added);
            println!("  Skipped: {}", stats.skipped);
            println!("  Errors:  {}", stats.errors);
        }
        None => {
            for library_type in ["movies", "tv", "music", "books"] {
                let stats = shared.scanner.scan_library(library_type).await?;
                println!(
                    "{library_type}: added {}, skipped {}, errors {}",
                    stats.added, stats.skipped, stats.errors
                );
            }
        }
    }

    Ok(())
}
