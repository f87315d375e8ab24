use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// Resolve the bearer token to an open admin session and attach it to the
/// request as an `Extension<Session>`.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|v| v.trim().parse::<Uuid>().ok())
        .ok_or(ApiError::Unauthorized)?;

    let session = state.sessions.authorize(token)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
