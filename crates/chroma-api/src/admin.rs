//! Back-office read views. All of them go through the record source so the
//! server and the CLI share one code path.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use chroma_core::pagination::load_page;
use chroma_core::stats::load_dashboard_stats;
use chroma_types::activity::ActivityLog;
use chroma_types::api::{DashboardStats, RecordPage};
use chroma_types::models::Collection;

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn activity(State(state): State<AppState>) -> ApiResult<Json<Vec<ActivityLog>>> {
    Ok(Json(state.timeline.fetch().await?))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: usize,
}

/// GET /admin/history?page=N — zero-based page of scans, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<RecordPage>> {
    let page = load_page(
        state.source.as_ref(),
        Collection::Scans,
        query.page,
        state.history_page_size,
    )
    .await?;
    Ok(Json(page))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(load_dashboard_stats(state.source.as_ref()).await?))
}
