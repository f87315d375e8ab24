use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use chroma_core::normalize::parse_timestamp;
use chroma_core::session::Session;
use chroma_core::validate::validate_tip;
use chroma_types::api::{CreatedResponse, NewTipRequest};
use chroma_types::models::FashionTip;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::now_timestamp;

pub async fn list_tips(State(state): State<AppState>) -> ApiResult<Json<Vec<FashionTip>>> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.list_tips()).await??;

    let tips = rows
        .into_iter()
        .map(|row| {
            let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|| {
                warn!("Tip {} has unreadable created_at '{}'", row.id, row.created_at);
                DateTime::<Utc>::default()
            });
            FashionTip {
                id: row.id,
                title: row.title,
                category: row.category,
                description: row.description,
                created_at,
            }
        })
        .collect();

    Ok(Json(tips))
}

pub async fn create_tip(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewTipRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let tip = validate_tip(&req)?;

    let db = state.db.clone();
    let created_at = now_timestamp();
    let id = tokio::task::spawn_blocking(move || {
        db.insert_tip(&tip.title, &tip.category, &tip.description, &created_at)
    })
    .await??;

    info!("{} published tip {}", session.email, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_tip(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let db = state.db.clone();
    let deleted = tokio::task::spawn_blocking(move || db.delete_tip(id)).await??;
    if !deleted {
        return Err(ApiError::NotFound(format!("tip {}", id)));
    }
    info!("{} deleted tip {}", session.email, id);
    Ok(StatusCode::NO_CONTENT)
}
