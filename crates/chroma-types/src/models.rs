use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Collections --

/// Record collections the activity views read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Scans,
    SavedPalettes,
}

impl Collection {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Scans => "scans",
            Self::SavedPalettes => "saved_palettes",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCollection(pub String);

impl fmt::Display for UnknownCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown collection '{}'", self.0)
    }
}

impl std::error::Error for UnknownCollection {}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scans" => Ok(Self::Scans),
            "saved_palettes" => Ok(Self::SavedPalettes),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}

// -- Ordering --

/// Columns a collection may be ordered by. Closed set so it can be spliced
/// into SQL without escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderColumn {
    CreatedAt,
    Id,
}

impl OrderColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: OrderColumn,
    pub direction: SortDirection,
}

impl OrderBy {
    /// Newest first: the order every activity view uses.
    pub const NEWEST_FIRST: OrderBy = OrderBy {
        column: OrderColumn::CreatedAt,
        direction: SortDirection::Descending,
    };

    /// Parse a PostgREST-style `column.asc|desc` order parameter.
    /// A bare column name orders ascending.
    pub fn parse(s: &str) -> Option<Self> {
        let (column, direction) = match s.split_once('.') {
            Some((column, dir)) => (column, dir),
            None => (s, "asc"),
        };

        let column = match column {
            "created_at" => OrderColumn::CreatedAt,
            "id" => OrderColumn::Id,
            _ => return None,
        };
        let direction = match direction {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            _ => return None,
        };

        Some(Self { column, direction })
    }

    pub fn to_param(self) -> String {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        format!("{}.{}", self.column.as_str(), dir)
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::NEWEST_FIRST
    }
}

// -- Raw records --

/// A scan event as stored by the analyzer. `created_at` is kept as the raw
/// text the source returned; parsing happens during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScanRecord {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub tone_result: String,
    pub confidence: f64,
    #[serde(default)]
    pub rgb_value: Option<String>,
}

/// A palette a user saved from the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPaletteRecord {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub season_name: String,
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Any record an activity collection can yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawRecord {
    Scan(RawScanRecord),
    Palette(RawPaletteRecord),
}

impl RawRecord {
    pub fn id(&self) -> i64 {
        match self {
            Self::Scan(s) => s.id,
            Self::Palette(p) => p.id,
        }
    }

    pub fn created_at(&self) -> Option<&str> {
        match self {
            Self::Scan(s) => s.created_at.as_deref(),
            Self::Palette(p) => p.created_at.as_deref(),
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Self::Scan(_) => Collection::Scans,
            Self::Palette(_) => Collection::SavedPalettes,
        }
    }
}

impl From<RawScanRecord> for RawRecord {
    fn from(r: RawScanRecord) -> Self {
        Self::Scan(r)
    }
}

impl From<RawPaletteRecord> for RawRecord {
    fn from(r: RawPaletteRecord) -> Self {
        Self::Palette(r)
    }
}

// -- Back-office content --

/// One season of the color master list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub name: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FashionTip {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
