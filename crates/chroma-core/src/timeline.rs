use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use chroma_types::activity::ActivityLog;
use chroma_types::models::{Collection, OrderBy};

use crate::error::CoreError;
use crate::normalize::{TimeFormat, normalize_batch};
use crate::source::RecordSource;
use crate::view::{FetchOutcome, ViewModel, ViewState};

/// Per-source cap of the activity timeline.
pub const DEFAULT_SOURCE_LIMIT: usize = 20;

/// Merge normalized lists into one newest-first timeline.
///
/// `sort_by` is stable: entries with equal timestamps keep the order they had
/// in the concatenation of `lists`.
pub fn merge_timeline<I>(lists: I) -> Vec<ActivityLog>
where
    I: IntoIterator<Item = Vec<ActivityLog>>,
{
    let mut merged: Vec<ActivityLog> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.original_timestamp.cmp(&a.original_timestamp));
    merged
}

/// Reads the newest scans and saved palettes and merges them into one
/// timeline. Both reads must succeed; a partial timeline is never returned.
pub struct TimelineAggregator {
    source: Arc<dyn RecordSource>,
    format: TimeFormat,
    scan_limit: usize,
    palette_limit: usize,
}

impl TimelineAggregator {
    pub fn new(source: Arc<dyn RecordSource>, format: TimeFormat) -> Self {
        Self {
            source,
            format,
            scan_limit: DEFAULT_SOURCE_LIMIT,
            palette_limit: DEFAULT_SOURCE_LIMIT,
        }
    }

    pub fn with_limits(mut self, scan_limit: usize, palette_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self.palette_limit = palette_limit;
        self
    }

    pub async fn fetch(&self) -> Result<Vec<ActivityLog>, CoreError> {
        let (mut scans, mut palettes) = tokio::try_join!(
            self.source.list_records(
                Collection::Scans,
                OrderBy::NEWEST_FIRST,
                Some(self.scan_limit)
            ),
            self.source.list_records(
                Collection::SavedPalettes,
                OrderBy::NEWEST_FIRST,
                Some(self.palette_limit)
            ),
        )
        .map_err(|e| {
            error!("Error fetching activity: {}", e);
            CoreError::SourceUnavailable(e)
        })?;

        scans.truncate(self.scan_limit);
        palettes.truncate(self.palette_limit);

        let timeline = merge_timeline([
            normalize_batch(&scans, &self.format),
            normalize_batch(&palettes, &self.format),
        ]);
        info!(
            "Activity timeline: {} entries ({} scans, {} palettes read)",
            timeline.len(),
            scans.len(),
            palettes.len()
        );
        Ok(timeline)
    }
}

/// The activity screen's view-model: the aggregator plus the displayed list.
pub struct TimelineView {
    aggregator: TimelineAggregator,
    view: ViewModel<Vec<ActivityLog>>,
}

impl TimelineView {
    pub fn new(aggregator: TimelineAggregator) -> Self {
        Self {
            aggregator,
            view: ViewModel::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<Vec<ActivityLog>>> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> ViewState<Vec<ActivityLog>> {
        self.view.snapshot()
    }

    /// Re-read both sources. On failure the previous timeline stays displayed.
    pub async fn refresh(&self) -> Result<FetchOutcome<Vec<ActivityLog>>, CoreError> {
        let ticket = self.view.begin();
        let result = self.aggregator.fetch().await;
        self.view.settle(ticket, result)
    }
}
