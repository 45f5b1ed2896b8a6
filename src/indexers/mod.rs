//! C5: fans a single search out to every enabled indexer concurrently, isolating
//! per-indexer failures and timeouts so one bad indexer never blocks the others.

pub mod error;
pub mod torznab;
pub mod types;

use std::time::Duration;

use tracing::warn;

use crate::db::Store;
pub use error::IndexerError;
pub use types::{MediaKind, SearchParams, SearchResult};

pub struct IndexerRegistry {
    clients: Vec<torznab::TorznabClient>,
    per_indexer_timeout: Duration,
}

impl IndexerRegistry {
    /// Builds a client per row in the `indexers` table that is currently enabled.
    pub async fn from_store(store: &Store, timeout_seconds: u32) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(u64::from(timeout_seconds.max(1)));
        let models = store.list_enabled_indexers().await?;
        let clients = models
            .iter()
            .map(|m| torznab::TorznabClient::from_model(m, timeout))
            .collect();

        Ok(Self {
            clients,
            per_indexer_timeout: timeout,
        })
    }

    #[must_use]
    pub fn indexer_count(&self) -> usize {
        self.clients.len()
    }

    /// Searches every configured indexer concurrently. A slow or failing indexer is
    /// logged and excluded from the merged result set rather than failing the search.
    pub async fn search_all(&self, params: &SearchParams) -> Vec<SearchResult> {
        let futures = self.clients.iter().map(|client| {
            let params = params.clone();
            async move {
                match tokio::time::timeout(self.per_indexer_timeout, client.search(&params)).await
                {
                    Ok(Ok(results)) => results,
                    Ok(Err(e)) => {
                        warn!(indexer = client.name(), error = %e, "indexer search failed");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(indexer = client.name(), "indexer search timed out");
                        Vec::new()
                    }
                }
            }
        });

        let mut merged: Vec<SearchResult> = futures::future::join_all(futures)
            .await
            .into_iter()
            .flatten()
            .collect();

        merged.sort_by(|a, b| {
            b.seeders
                .unwrap_or(0)
                .cmp(&a.seeders.unwrap_or(0))
                .then(b.size.unwrap_or(0).cmp(&a.size.unwrap_or(0)))
        });

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_for_query_defaults_rest() {
        let params = SearchParams::for_query("Some Movie 2024");
        assert_eq!(params.query, "Some Movie 2024");
        assert!(params.imdb_id.is_none());
        assert!(params.season.is_none());
    }
}
