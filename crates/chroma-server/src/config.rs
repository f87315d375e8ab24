use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;

use chroma_core::normalize::parse_offset;
use chroma_core::pagination::DEFAULT_PAGE_SIZE;
use chroma_core::timeline::DEFAULT_SOURCE_LIMIT;

/// Values shipped in sample `.env` files. The server refuses to start with
/// any of them.
const PLACEHOLDER_PASSWORDS: &[&str] = &["change-me", "changeme", "admin", "password"];

/// Session lifetimes are whole hours within one year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
    pub display_offset: FixedOffset,
    pub activity_limit: usize,
    pub history_page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let admin_password = lookup("CHROMA_ADMIN_PASSWORD").unwrap_or_default();
        if admin_password.trim().is_empty()
            || PLACEHOLDER_PASSWORDS.contains(&admin_password.trim().to_ascii_lowercase().as_str())
        {
            bail!("CHROMA_ADMIN_PASSWORD is unset or still a placeholder");
        }

        let offset_raw = var("CHROMA_DISPLAY_OFFSET", "+07:00");
        let display_offset = parse_offset(&offset_raw)
            .with_context(|| format!("CHROMA_DISPLAY_OFFSET '{}' is not a UTC offset", offset_raw))?;

        let session_ttl_hours: i64 = var("CHROMA_SESSION_TTL_HOURS", "12")
            .parse()
            .context("CHROMA_SESSION_TTL_HOURS must be a whole number")?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            bail!(
                "CHROMA_SESSION_TTL_HOURS must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS,
                session_ttl_hours
            );
        }

        Ok(Self {
            host: var("CHROMA_HOST", "0.0.0.0"),
            port: var("CHROMA_PORT", "3000")
                .parse()
                .context("CHROMA_PORT must be a port number")?,
            db_path: PathBuf::from(var("CHROMA_DB_PATH", "chroma.db")),
            admin_email: var("CHROMA_ADMIN_EMAIL", "admin@chroma.local"),
            admin_password,
            session_ttl_hours,
            display_offset,
            activity_limit: var("CHROMA_ACTIVITY_LIMIT", &DEFAULT_SOURCE_LIMIT.to_string())
                .parse()
                .context("CHROMA_ACTIVITY_LIMIT must be a whole number")?,
            history_page_size: var("CHROMA_HISTORY_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
                .parse()
                .context("CHROMA_HISTORY_PAGE_SIZE must be a whole number")?,
        })
    }
}
