//! Read-only catalog listing commands, one per media kind.

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_movies(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let movies = store.list_all_movies().await?;
    if movies.is_empty() {
        println!("No movies in the catalog.");
        return Ok(());
    }
    for movie in movies {
        let status = if movie.missing_since.is_none() { "have" } else { "missing" };
        let year = movie.year.map_or_else(|| "?".to_string(), |y| y.to_string());
        println!("[{:>4}] {} ({year}) - {status}", movie.id, movie.title);
    }
    Ok(())
}

pub async fn cmd_list_shows(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let libraries = store.list_libraries_by_type("tv").await?;
    let mut printed = 0;
    for library in libraries {
        for show in store.list_shows(library.id).await? {
            println!("[{:>4}] {} ({})", show.id, show.title, library.name);
            printed += 1;
        }
    }
    if printed == 0 {
        println!("No shows in the catalog.");
    }
    Ok(())
}

pub async fn cmd_list_music(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let libraries = store.list_libraries_by_type("music").await?;
    let mut printed = 0;
    for library in libraries {
        for artist in store.list_artists(library.id).await? {
            println!("[{:>4}] {} ({})", artist.id, artist.name, library.name);
            printed += 1;
        }
    }
    if printed == 0 {
        println!("No artists in the catalog.");
    }
    Ok(())
}

pub async fn cmd_list_books(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let libraries = store.list_libraries_by_type("books").await?;
    let mut printed = 0;
    for library in libraries {
        for book in store.list_books(library.id).await? {
            let status = if book.missing_since.is_none() { "have" } else { "missing" };
            println!("[{:>4}] {} - {status} ({})", book.id, book.title, library.name);
            printed += 1;
        }
    }
    if printed == 0 {
        println!("No books in the catalog.");
    }
    Ok(())
}
