use chroma_types::models::Collection;

use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A raw record could not be normalized. Batch callers skip it.
    #[error("Malformed {collection} record {id}: {reason}")]
    MalformedRecord {
        collection: Collection,
        id: i64,
        reason: String,
    },

    /// A read against the record source failed.
    #[error("Record source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// A page read failed; the previously displayed page is kept.
    #[error("Fetch of page {page} failed: {source}")]
    FetchFailed {
        page: usize,
        #[source]
        source: SourceError,
    },

    /// Write-path input rejected before any remote call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
