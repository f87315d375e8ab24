use anyhow::{Context, Result, bail};
use serde::Deserialize;

use chroma_core::http::HttpSource;
use chroma_types::api::{LoginRequest, LoginResponse};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Talks to the chroma server's auth routes and hands out record sources
/// configured with the same credentials.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(base_url: &str, api_key: Option<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            token,
        }
    }

    pub fn record_source(&self) -> HttpSource {
        let mut source = HttpSource::with_client(self.http.clone(), &self.base_url);
        if let Some(key) = &self.api_key {
            source = source.api_key(key);
        }
        if let Some(token) = &self.token {
            source = source.bearer(token);
        }
        source
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .with_context(|| format!("cannot reach {}", self.base_url))?;

        Ok(check(resp).await?.json().await?)
    }

    pub async fn logout(&self) -> Result<()> {
        let Some(token) = &self.token else {
            bail!("no session token; pass --token or set CHROMA_TOKEN");
        };
        let resp = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("cannot reach {}", self.base_url))?;
        check(resp).await?;
        Ok(())
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => bail!("{} ({}): {}", status, body.code, body.error),
        Err(_) => bail!("{}: {}", status, text),
    }
}
