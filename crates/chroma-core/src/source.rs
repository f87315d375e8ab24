use async_trait::async_trait;
use chroma_types::models::{Collection, OrderBy, RawRecord};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Source unreachable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for SourceError {
    fn from(e: anyhow::Error) -> Self {
        Self::Database(format!("{e:#}"))
    }
}

/// Collection-style reads against wherever the records live.
///
/// Implementations must return records of the requested collection only,
/// in the requested order.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// The first `limit` records (all of them when `None`).
    async fn list_records(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> Result<Vec<RawRecord>, SourceError>;

    /// Records at positions `from..=to`. An inverted range yields nothing.
    async fn list_records_range(
        &self,
        collection: Collection,
        order: OrderBy,
        from: usize,
        to: usize,
    ) -> Result<Vec<RawRecord>, SourceError>;

    async fn count_records(&self, collection: Collection) -> Result<u64, SourceError>;
}
