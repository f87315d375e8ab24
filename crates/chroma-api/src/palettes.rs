use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use chroma_core::validate::validate_palette;
use chroma_types::api::{CreatedResponse, SavePaletteRequest};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::now_timestamp;

pub async fn save_palette(
    State(state): State<AppState>,
    Json(req): Json<SavePaletteRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let palette = validate_palette(&req)?;

    let db = state.db.clone();
    let created_at = now_timestamp();
    let season = palette.season_name.clone();
    let id = tokio::task::spawn_blocking(move || {
        db.insert_palette(&palette.season_name, &palette.colors, &created_at)
    })
    .await??;

    info!("Palette {} saved for {}", id, season);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_palette(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let db = state.db.clone();
    let deleted = tokio::task::spawn_blocking(move || db.delete_palette(id)).await??;
    if !deleted {
        return Err(ApiError::NotFound(format!("palette {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
