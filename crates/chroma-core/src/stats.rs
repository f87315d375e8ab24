use chroma_types::api::DashboardStats;
use chroma_types::models::{Collection, OrderBy, RawRecord, RawScanRecord};
use tracing::error;

use crate::error::CoreError;
use crate::source::RecordSource;

/// Scans shown in the dashboard's recent list.
pub const RECENT_SCAN_COUNT: usize = 5;

/// Mean confidence rounded to one decimal; 0 when there are no scans.
/// Non-finite values count as 0.
pub fn average_confidence(scans: &[RawScanRecord]) -> f64 {
    if scans.is_empty() {
        return 0.0;
    }
    let total: f64 = scans
        .iter()
        .map(|s| if s.confidence.is_finite() { s.confidence } else { 0.0 })
        .sum();
    let mean = total / scans.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub async fn load_dashboard_stats(source: &dyn RecordSource) -> Result<DashboardStats, CoreError> {
    let (total_scans, total_palettes, records) = tokio::try_join!(
        source.count_records(Collection::Scans),
        source.count_records(Collection::SavedPalettes),
        source.list_records(Collection::Scans, OrderBy::NEWEST_FIRST, None),
    )
    .map_err(|e| {
        error!("Dashboard error: {}", e);
        CoreError::SourceUnavailable(e)
    })?;

    let scans: Vec<RawScanRecord> = records
        .into_iter()
        .filter_map(|r| match r {
            RawRecord::Scan(scan) => Some(scan),
            RawRecord::Palette(_) => None,
        })
        .collect();

    Ok(DashboardStats {
        total_scans,
        total_palettes,
        avg_confidence: average_confidence(&scans),
        recent_scans: scans.into_iter().take(RECENT_SCAN_COUNT).collect(),
    })
}
