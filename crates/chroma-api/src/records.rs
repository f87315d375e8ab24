use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use chroma_types::models::{Collection, OrderBy, RawPaletteRecord, RawScanRecord};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// Upper bound on rows returned by one read.
pub const MAX_ROWS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct RestQuery {
    /// Only `*` is meaningful; every column is always returned.
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

fn wants_exact_count(headers: &HeaderMap) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|pref| pref.trim().eq_ignore_ascii_case("count=exact"))
}

/// `from-to/total`, `*/total` for an empty slice, `/*` when not counted.
pub fn content_range(from: usize, returned: usize, total: Option<u64>) -> String {
    let last = returned
        .checked_sub(1)
        .and_then(|n| from.checked_add(n));
    let span = match last {
        Some(last) => format!("{}-{}", from, last),
        None => "*".to_string(),
    };
    match total {
        Some(total) => format!("{}/{}", span, total),
        None => format!("{}/*", span),
    }
}

/// GET /rest/v1/{table}?select=*&order=created_at.desc&limit=20&offset=0
pub async fn list_records(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<RestQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let collection: Collection = table
        .parse()
        .map_err(|e: chroma_types::models::UnknownCollection| ApiError::NotFound(e.to_string()))?;

    let order = match query.order.as_deref() {
        Some(raw) => OrderBy::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unsupported order '{}'", raw)))?,
        None => OrderBy::NEWEST_FIRST,
    };

    let limit = query.limit.unwrap_or(MAX_ROWS).min(MAX_ROWS);
    let from = query.offset.unwrap_or(0);
    if i64::try_from(from).is_err() {
        return Err(ApiError::BadRequest(format!("offset {} is out of range", from)));
    }
    let count = wants_exact_count(&headers);

    let db = state.db.clone();
    let (body, returned, total) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let total = if count { Some(db.count_records(collection)?) } else { None };

        if limit == 0 {
            return Ok((serde_json::Value::Array(Vec::new()), 0, total));
        }
        let to = from.saturating_add(limit - 1);

        let (body, returned) = match collection {
            Collection::Scans => {
                let rows: Vec<RawScanRecord> = db
                    .list_scans_range(order, from, to)?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                (serde_json::to_value(&rows)?, rows.len())
            }
            Collection::SavedPalettes => {
                let rows: Vec<RawPaletteRecord> = db
                    .list_palettes_range(order, from, to)?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                (serde_json::to_value(&rows)?, rows.len())
            }
        };
        Ok((body, returned, total))
    })
    .await??;

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&content_range(from, returned, total)) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    Ok(response)
}
