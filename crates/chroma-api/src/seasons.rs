use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use chroma_core::session::Session;
use chroma_core::validate::normalize_palette;
use chroma_types::api::UpdateSeasonColorsRequest;
use chroma_types::models::Season;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

pub async fn list_seasons(State(state): State<AppState>) -> ApiResult<Json<Vec<Season>>> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.list_seasons()).await??;
    Ok(Json(rows.into_iter().map(Season::from).collect()))
}

/// PUT /admin/seasons/{id}/colors — replace a season's master colors.
/// An empty list is allowed and clears the season.
pub async fn update_colors(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSeasonColorsRequest>,
) -> ApiResult<StatusCode> {
    let colors = normalize_palette(&req.colors)?;
    let count = colors.len();

    let db = state.db.clone();
    let updated = tokio::task::spawn_blocking(move || db.update_season_colors(id, &colors)).await??;
    if !updated {
        return Err(ApiError::NotFound(format!("season {}", id)));
    }

    info!("{} set {} colors on season {}", session.email, count, id);
    Ok(StatusCode::NO_CONTENT)
}
