use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use chroma_core::normalize::TimeFormat;
use chroma_core::session::{Session, SessionStore};
use chroma_core::sqlite::SqliteSource;
use chroma_core::timeline::TimelineAggregator;
use chroma_db::Database;
use chroma_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiResult;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub source: Arc<SqliteSource>,
    pub sessions: SessionStore,
    pub timeline: TimelineAggregator,
    pub history_page_size: usize,
}

impl AppStateInner {
    /// Wire the record source and timeline over one shared database handle.
    pub fn new(
        db: Arc<Database>,
        sessions: SessionStore,
        format: TimeFormat,
        activity_limit: usize,
        history_page_size: usize,
    ) -> Self {
        let source = Arc::new(SqliteSource::new(db.clone()));
        let timeline = TimelineAggregator::new(source.clone(), format)
            .with_limits(activity_limit, activity_limit);
        Self {
            timeline,
            db,
            source,
            sessions,
            history_page_size: history_page_size.max(1),
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state.sessions.login(&req.email, &req.password)?;

    Ok(Json(LoginResponse {
        token: session.token,
        email: session.email,
        expires_at: session.expires_at,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    if !state.sessions.logout(session.token) {
        info!("Session for {} was already closed", session.email);
    }
    StatusCode::NO_CONTENT
}
