use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor shown on every entry. There is no visitor identity system, so all
/// activity is attributed to the same placeholder.
pub const GUEST_ACTOR: &str = "Guest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Scan,
    Palette,
}

/// Outcome of the logged activity. Only successes are recorded today;
/// `Failed` is reserved for a failure record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Success,
    Failed,
}

/// One normalized timeline entry. Derived from a single raw record and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub kind: ActivityKind,
    pub actor: String,
    pub description: String,
    pub display_time: String,
    pub original_timestamp: DateTime<Utc>,
    pub status: ActivityStatus,
}
