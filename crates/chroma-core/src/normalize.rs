use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use tracing::warn;

use chroma_types::activity::{ActivityKind, ActivityLog, ActivityStatus, GUEST_ACTOR};
use chroma_types::models::RawRecord;

use crate::error::CoreError;

/// Renders `ActivityLog::display_time`: a fixed offset and a strftime
/// pattern, so the same timestamp always renders the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    offset: FixedOffset,
    pattern: String,
}

impl TimeFormat {
    /// Day, short month, hour:minute. e.g. `5 Jan 17:00`
    pub const DEFAULT_PATTERN: &'static str = "%-d %b %H:%M";

    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            pattern: Self::DEFAULT_PATTERN.to_string(),
        }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Replace the pattern. Rejects patterns chrono cannot render, since a bad
    /// pattern would otherwise fail at format time.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, CoreError> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(CoreError::Validation(format!(
                "invalid time pattern '{}'",
                pattern
            )));
        }
        self.pattern = pattern.to_string();
        Ok(self)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn render(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset).format(&self.pattern).to_string()
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self::utc()
    }
}

/// Parse a `+HH:MM` / `-HHMM` / `Z` offset.
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a record timestamp. Accepts RFC 3339 and the zone-less forms SQLite
/// and `timestamp` columns produce (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ndt| ndt.and_utc())
}

/// Round a percentage the way the analyzer displays it: halves round up.
pub fn round_percent(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Map one raw record into a timeline entry.
pub fn normalize(record: &RawRecord, format: &TimeFormat) -> Result<ActivityLog, CoreError> {
    let malformed = |reason: String| CoreError::MalformedRecord {
        collection: record.collection(),
        id: record.id(),
        reason,
    };

    let raw_ts = record
        .created_at()
        .ok_or_else(|| malformed("missing created_at".to_string()))?;
    let original_timestamp = parse_timestamp(raw_ts)
        .ok_or_else(|| malformed(format!("unparseable created_at '{}'", raw_ts)))?;

    let (kind, description) = match record {
        RawRecord::Scan(scan) => (
            ActivityKind::Scan,
            format!(
                "Detected: {} ({}%)",
                scan.tone_result,
                round_percent(scan.confidence)
            ),
        ),
        RawRecord::Palette(palette) => (
            ActivityKind::Palette,
            format!("Saved Palette: {}", palette.season_name),
        ),
    };

    Ok(ActivityLog {
        id: record.id(),
        kind,
        actor: GUEST_ACTOR.to_string(),
        description,
        display_time: format.render(&original_timestamp),
        original_timestamp,
        status: ActivityStatus::Success,
    })
}

/// Normalize a batch, skipping (and logging) records that fail. Order of the
/// surviving records is preserved.
pub fn normalize_batch(records: &[RawRecord], format: &TimeFormat) -> Vec<ActivityLog> {
    records
        .iter()
        .filter_map(|record| match normalize(record, format) {
            Ok(log) => Some(log),
            Err(e) => {
                warn!("Skipping record: {}", e);
                None
            }
        })
        .collect()
}
