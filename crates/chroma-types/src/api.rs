use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RawRecord, RawScanRecord};

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

// -- Writes --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewScanRequest {
    pub tone_result: String,
    pub confidence: f64,
    #[serde(default)]
    pub rgb_value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavePaletteRequest {
    pub season_name: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSeasonColorsRequest {
    pub colors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTipRequest {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

// -- Views --

/// One offset-addressed slice of a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    pub page: usize,
    pub page_size: usize,
    pub records: Vec<RawRecord>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl RecordPage {
    /// Build a page from a fetched slice. A full slice is the only signal that
    /// another page may follow, so an exact multiple of `page_size` reports one
    /// trailing empty page.
    pub fn from_slice(page: usize, page_size: usize, records: Vec<RawRecord>) -> Self {
        let has_next = page_size > 0 && records.len() == page_size;
        Self {
            page,
            page_size,
            records,
            has_next,
            has_previous: page > 0,
        }
    }

    pub fn empty(page_size: usize) -> Self {
        Self::from_slice(0, page_size, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_scans: u64,
    pub total_palettes: u64,
    /// Mean scan confidence, rounded to one decimal.
    pub avg_confidence: f64,
    pub recent_scans: Vec<RawScanRecord>,
}
