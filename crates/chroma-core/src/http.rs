use async_trait::async_trait;
use chroma_types::models::{
    Collection, OrderBy, RawPaletteRecord, RawRecord, RawScanRecord,
};
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE};
use tracing::{debug, warn};

use crate::source::{RecordSource, SourceError};

/// Record source speaking the PostgREST subset the hosted datastore exposes:
/// `GET {base}/rest/v1/{table}?select=*&order=..&limit=..&offset=..`, with
/// `Prefer: count=exact` answered through the `Content-Range` header.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    bearer: Option<String>,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: None,
            bearer: None,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table_name())
    }

    fn get(&self, collection: Collection) -> reqwest::RequestBuilder {
        let mut req = self.client.get(self.table_url(collection));
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }
        // A hosted PostgREST expects the anon key as bearer when no session is held
        if let Some(token) = self.bearer.as_ref().or(self.api_key.as_ref()) {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        req
    }

    async fn fetch(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", order.to_param()),
        ];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }

        debug!("GET {} {:?}", collection, params);
        let resp = check_status(self.get(collection).query(&params).send().await?).await?;
        let body = resp.bytes().await?;

        decode_records(collection, &body)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SourceError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON array of rows into records of the given collection. Rows
/// that do not fit the collection's shape are skipped with a warning; only a
/// body that is not an array fails.
pub fn decode_records(collection: Collection, body: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
    let rows: Vec<serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| SourceError::Decode(format!("{} rows: {}", collection, e)))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let decoded = match collection {
            Collection::Scans => serde_json::from_value::<RawScanRecord>(row).map(RawRecord::Scan),
            Collection::SavedPalettes => {
                serde_json::from_value::<RawPaletteRecord>(row).map(RawRecord::Palette)
            }
        };
        match decoded {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {} row {}: {}", collection, index, e),
        }
    }
    Ok(records)
}

/// Total from a `Content-Range` value such as `0-9/42` or `*/42`.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn list_records(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.fetch(collection, order, limit, 0).await
    }

    async fn list_records_range(
        &self,
        collection: Collection,
        order: OrderBy,
        from: usize,
        to: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        if to < from {
            return Ok(vec![]);
        }
        self.fetch(collection, order, Some(to - from + 1), from).await
    }

    async fn count_records(&self, collection: Collection) -> Result<u64, SourceError> {
        let resp = self
            .get(collection)
            .query(&[("select", "id"), ("limit", "0")])
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let header = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| SourceError::Decode("missing Content-Range header".into()))?;

        parse_content_range_total(header)
            .ok_or_else(|| SourceError::Decode(format!("bad Content-Range '{}'", header)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn decodes_rows_per_collection() {
        let body = br#"[{"id":1,"created_at":"2024-01-05T10:00:00+00:00","tone_result":"Warm Autumn","confidence":93.7,"rgb_value":null}]"#;
        let records = decode_records(Collection::Scans, body).unwrap();
        assert!(matches!(&records[0], RawRecord::Scan(s) if s.id == 1 && s.rgb_value.is_none()));

        let body = br##"[{"id":2,"created_at":null,"season_name":"Spring","colors":["#FFB347"]}]"##;
        let records = decode_records(Collection::SavedPalettes, body).unwrap();
        assert!(matches!(&records[0], RawRecord::Palette(p) if p.created_at.is_none()));

        assert!(matches!(
            decode_records(Collection::Scans, b"{}"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        let body = br#"[
            {"id":1,"created_at":"2024-01-05T10:00:00Z","tone_result":"Warm Autumn","confidence":93.7},
            {"id":2,"created_at":17,"tone_result":"Cool Winter","confidence":80},
            {"id":3,"created_at":"2024-01-05T11:00:00Z","tone_result":"Soft Summer","confidence":null},
            {"id":4,"created_at":"2024-01-05T12:00:00Z","tone_result":"Light Spring","confidence":71.2}
        ]"#;
        let records = decode_records(Collection::Scans, body).unwrap();
        assert_eq!(records.iter().map(RawRecord::id).collect::<Vec<_>>(), vec![1, 4]);

        let body = br##"[{"id":5,"season_name":"Autumn","colors":"#8B4513"},{"id":6,"season_name":"Winter"}]"##;
        let records = decode_records(Collection::SavedPalettes, body).unwrap();
        assert_eq!(records.iter().map(RawRecord::id).collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let source = HttpSource::new("http://localhost:3000/");
        assert_eq!(
            source.table_url(Collection::SavedPalettes),
            "http://localhost:3000/rest/v1/saved_palettes"
        );
    }
}
