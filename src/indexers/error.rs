use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("indexer request timed out")]
    Timeout,

    #[error("indexer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("indexer returned an unparsable response: {0}")]
    Parse(String),

    #[error("indexer rejected the request (unauthorized): {0}")]
    Unauthorized(String),

    #[error("indexer {0} is not configured for this search type")]
    Unsupported(String),
}
