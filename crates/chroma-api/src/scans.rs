use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use chroma_core::validate::validate_scan;
use chroma_types::api::{CreatedResponse, NewScanRequest};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::now_timestamp;

/// POST /scans — record one analyzer result.
pub async fn create_scan(
    State(state): State<AppState>,
    Json(req): Json<NewScanRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let scan = validate_scan(&req)?;

    let db = state.db.clone();
    let created_at = now_timestamp();
    let tone = scan.tone_result.clone();
    let id = tokio::task::spawn_blocking(move || {
        db.insert_scan(&scan.tone_result, scan.confidence, Some(scan.rgb_value.as_str()), &created_at)
    })
    .await??;

    info!("Scan {} recorded: {}", id, tone);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
