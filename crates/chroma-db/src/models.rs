//! Database row types — these map directly to SQLite rows.
//! Distinct from chroma-types records to keep the DB layer independent.

use chroma_types::models::{RawPaletteRecord, RawScanRecord, Season};

pub struct ScanRow {
    pub id: i64,
    pub created_at: Option<String>,
    pub tone_result: String,
    pub confidence: f64,
    pub rgb_value: Option<String>,
}

pub struct PaletteRow {
    pub id: i64,
    pub created_at: Option<String>,
    pub season_name: String,
    pub colors: Vec<String>,
}

pub struct SeasonRow {
    pub id: i64,
    pub name: String,
    pub colors: Vec<String>,
}

pub struct TipRow {
    pub id: i64,
    pub created_at: String,
    pub title: String,
    pub category: String,
    pub description: String,
}

impl From<ScanRow> for RawScanRecord {
    fn from(row: ScanRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            tone_result: row.tone_result,
            confidence: row.confidence,
            rgb_value: row.rgb_value,
        }
    }
}

impl From<PaletteRow> for RawPaletteRecord {
    fn from(row: PaletteRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            season_name: row.season_name,
            colors: row.colors,
        }
    }
}

impl From<SeasonRow> for Season {
    fn from(row: SeasonRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            colors: row.colors,
        }
    }
}
