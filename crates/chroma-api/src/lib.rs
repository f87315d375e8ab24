//! HTTP surface of the chroma service: a PostgREST-style read endpoint for
//! the activity collections, the public write paths used by the analyzer and
//! matcher, and the session-protected back-office routes.

pub mod admin;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod palettes;
pub mod records;
pub mod scans;
pub mod seasons;
pub mod tips;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use chrono::{SecondsFormat, Utc};

pub use auth::{AppState, AppStateInner};
pub use error::{ApiError, ApiResult};

/// Build every route. Cross-cutting layers (CORS, tracing) are added by the
/// binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/rest/v1/{table}", get(records::list_records))
        .route("/scans", post(scans::create_scan))
        .route("/palettes", post(palettes::save_palette))
        .route("/palettes/{id}", delete(palettes::delete_palette))
        .route("/seasons", get(seasons::list_seasons))
        .route("/tips", get(tips::list_tips))
        .route("/auth/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/admin/activity", get(admin::activity))
        .route("/admin/history", get(admin::history))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/seasons/{id}/colors", put(seasons::update_colors))
        .route("/admin/tips", post(tips::create_tip))
        .route("/admin/tips/{id}", delete(tips::delete_tip))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Timestamp stored with new rows.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
