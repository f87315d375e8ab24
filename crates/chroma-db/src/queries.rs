use anyhow::Result;
use chroma_types::models::{Collection, OrderBy};
use rusqlite::Connection;
use tracing::warn;

use crate::Database;
use crate::models::{PaletteRow, ScanRow, SeasonRow, TipRow};

/// LIMIT/OFFSET pair. SQLite treats a negative LIMIT as "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    limit: i64,
    offset: i64,
}

impl Window {
    fn first(limit: Option<usize>) -> Self {
        Self {
            // A limit past i64::MAX cannot cut anything off
            limit: limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1),
            offset: 0,
        }
    }

    /// Inclusive `[from, to]` range; `None` when the range is empty or starts
    /// beyond any position SQLite can address.
    fn range(from: usize, to: usize) -> Option<Self> {
        if to < from {
            return None;
        }
        let offset = i64::try_from(from).ok()?;
        let limit = (to - from)
            .checked_add(1)
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(-1);
        Some(Self { limit, offset })
    }
}

impl Database {
    // -- Scans --

    pub fn insert_scan(
        &self,
        tone_result: &str,
        confidence: f64,
        rgb_value: Option<&str>,
        created_at: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO scans (created_at, tone_result, confidence, rgb_value) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![created_at, tone_result, confidence, rgb_value],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_scans(&self, order: OrderBy, limit: Option<usize>) -> Result<Vec<ScanRow>> {
        self.with_conn(|conn| query_scans(conn, order, Window::first(limit)))
    }

    pub fn list_scans_range(&self, order: OrderBy, from: usize, to: usize) -> Result<Vec<ScanRow>> {
        match Window::range(from, to) {
            Some(window) => self.with_conn(|conn| query_scans(conn, order, window)),
            None => Ok(vec![]),
        }
    }

    // -- Saved palettes --

    pub fn insert_palette(&self, season_name: &str, colors: &[String], created_at: &str) -> Result<i64> {
        let colors = serde_json::to_string(colors)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO saved_palettes (created_at, season_name, colors) VALUES (?1, ?2, ?3)",
                rusqlite::params![created_at, season_name, colors],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_palettes(&self, order: OrderBy, limit: Option<usize>) -> Result<Vec<PaletteRow>> {
        self.with_conn(|conn| query_palettes(conn, order, Window::first(limit)))
    }

    pub fn list_palettes_range(&self, order: OrderBy, from: usize, to: usize) -> Result<Vec<PaletteRow>> {
        match Window::range(from, to) {
            Some(window) => self.with_conn(|conn| query_palettes(conn, order, window)),
            None => Ok(vec![]),
        }
    }

    /// Returns false when no palette had that id.
    pub fn delete_palette(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM saved_palettes WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Counts --

    pub fn count_records(&self, collection: Collection) -> Result<u64> {
        self.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", collection.table_name());
            let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(n as u64)
        })
    }

    // -- Color master --

    pub fn list_seasons(&self) -> Result<Vec<SeasonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, colors FROM master_seasons ORDER BY name ASC")?;
            let rows = stmt
                .query_map([], |row| {
                    let id: i64 = row.get(0)?;
                    let colors: String = row.get(2)?;
                    Ok(SeasonRow {
                        id,
                        name: row.get(1)?,
                        colors: decode_colors(&colors, "master_seasons", id),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_season_colors(&self, id: i64, colors: &[String]) -> Result<bool> {
        let colors = serde_json::to_string(colors)?;
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE master_seasons SET colors = ?1 WHERE id = ?2",
                rusqlite::params![colors, id],
            )?;
            Ok(n > 0)
        })
    }

    // -- Fashion tips --

    pub fn list_tips(&self) -> Result<Vec<TipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, created_at, title, category, description
                 FROM fashion_tips
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TipRow {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        title: row.get(2)?,
                        category: row.get(3)?,
                        description: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_tip(&self, title: &str, category: &str, description: &str, created_at: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO fashion_tips (created_at, title, category, description) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![created_at, title, category, description],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn delete_tip(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM fashion_tips WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

/// ORDER BY clause with `id` as tie-breaker in the same direction, so two
/// reads without intervening writes come back identical.
fn order_clause(order: OrderBy) -> String {
    let dir = order.direction.as_sql();
    format!("ORDER BY {} {dir}, id {dir}", order.column.as_str())
}

fn query_scans(conn: &Connection, order: OrderBy, window: Window) -> Result<Vec<ScanRow>> {
    let sql = format!(
        "SELECT id, created_at, tone_result, confidence, rgb_value
         FROM scans
         {}
         LIMIT ?1 OFFSET ?2",
        order_clause(order)
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(rusqlite::params![window.limit, window.offset], |row| {
            Ok(ScanRow {
                id: row.get(0)?,
                created_at: row.get(1)?,
                tone_result: row.get(2)?,
                confidence: row.get(3)?,
                rgb_value: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_palettes(conn: &Connection, order: OrderBy, window: Window) -> Result<Vec<PaletteRow>> {
    let sql = format!(
        "SELECT id, created_at, season_name, colors
         FROM saved_palettes
         {}
         LIMIT ?1 OFFSET ?2",
        order_clause(order)
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(rusqlite::params![window.limit, window.offset], |row| {
            let id: i64 = row.get(0)?;
            let colors: String = row.get(3)?;
            Ok(PaletteRow {
                id,
                created_at: row.get(1)?,
                season_name: row.get(2)?,
                colors: decode_colors(&colors, "saved_palettes", id),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn decode_colors(raw: &str, table: &str, id: i64) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt colors '{}' on {} row {}: {}", raw, table, id, e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_types::models::{OrderColumn, SortDirection};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (i, tone) in ["Warm Autumn", "Cool Winter", "Light Spring"].iter().enumerate() {
            let ts = format!("2024-01-0{}T10:00:00Z", i + 1);
            db.insert_scan(tone, 90.0, Some("rgb(1,2,3)"), &ts).unwrap();
        }
        db
    }

    #[test]
    fn scans_newest_first() {
        let db = seeded();
        let rows = db.list_scans(OrderBy::NEWEST_FIRST, None).unwrap();
        let tones: Vec<_> = rows.iter().map(|r| r.tone_result.as_str()).collect();
        assert_eq!(tones, vec!["Light Spring", "Cool Winter", "Warm Autumn"]);

        let rows = db.list_scans(OrderBy::NEWEST_FIRST, Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn range_is_inclusive_and_offset() {
        let db = seeded();
        let rows = db.list_scans_range(OrderBy::NEWEST_FIRST, 1, 2).unwrap();
        let tones: Vec<_> = rows.iter().map(|r| r.tone_result.as_str()).collect();
        assert_eq!(tones, vec!["Cool Winter", "Warm Autumn"]);

        assert!(db.list_scans_range(OrderBy::NEWEST_FIRST, 3, 5).unwrap().is_empty());
        assert!(db.list_scans_range(OrderBy::NEWEST_FIRST, 2, 1).unwrap().is_empty());
    }

    #[test]
    fn positions_past_i64_are_empty_not_wrapped() {
        let db = seeded();
        let from = i64::MAX as usize + 1;
        assert!(db.list_scans_range(OrderBy::NEWEST_FIRST, from, from + 9).unwrap().is_empty());
        assert!(db.list_scans_range(OrderBy::NEWEST_FIRST, usize::MAX, usize::MAX).unwrap().is_empty());
        assert!(db.list_palettes_range(OrderBy::NEWEST_FIRST, usize::MAX - 9, usize::MAX).unwrap().is_empty());

        // Whole-range windows read everything instead of overflowing
        assert_eq!(db.list_scans_range(OrderBy::NEWEST_FIRST, 0, usize::MAX).unwrap().len(), 3);
        assert_eq!(db.list_scans(OrderBy::NEWEST_FIRST, Some(usize::MAX)).unwrap().len(), 3);
    }

    #[test]
    fn tied_timestamps_break_on_id() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_scan("A", 50.0, None, "2024-01-01T00:00:00Z").unwrap();
        let b = db.insert_scan("B", 50.0, None, "2024-01-01T00:00:00Z").unwrap();

        let rows = db.list_scans(OrderBy::NEWEST_FIRST, None).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b, a]);

        let asc = OrderBy { column: OrderColumn::CreatedAt, direction: SortDirection::Ascending };
        let rows = db.list_scans(asc, None).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn palettes_store_colors_as_json() {
        let db = Database::open_in_memory().unwrap();
        let colors = vec!["#8B4513".to_string(), "#DAA520".to_string()];
        let id = db.insert_palette("Autumn", &colors, "2024-02-01T08:30:00Z").unwrap();

        let rows = db.list_palettes(OrderBy::NEWEST_FIRST, Some(20)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].colors, colors);
        assert_eq!(db.count_records(Collection::SavedPalettes).unwrap(), 1);

        assert!(db.delete_palette(id).unwrap());
        assert!(!db.delete_palette(id).unwrap());
        assert_eq!(db.count_records(Collection::SavedPalettes).unwrap(), 0);
    }

    #[test]
    fn seasons_are_seeded_and_editable() {
        let db = Database::open_in_memory().unwrap();
        let seasons = db.list_seasons().unwrap();
        let names: Vec<_> = seasons.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Autumn", "Spring", "Summer", "Winter"]);
        assert_eq!(seasons[0].colors.len(), 4);

        let colors = vec!["#112233".to_string()];
        assert!(db.update_season_colors(seasons[0].id, &colors).unwrap());
        assert_eq!(db.list_seasons().unwrap()[0].colors, colors);
        assert!(!db.update_season_colors(9999, &colors).unwrap());
    }

    #[test]
    fn tips_crud() {
        let db = Database::open_in_memory().unwrap();
        db.insert_tip("Old", "Basic Theory", "first", "2024-01-01T00:00:00Z").unwrap();
        let newer = db.insert_tip("New", "Styling", "second", "2024-03-01T00:00:00Z").unwrap();

        let tips = db.list_tips().unwrap();
        assert_eq!(tips[0].title, "New");
        assert_eq!(tips[1].title, "Old");

        assert!(db.delete_tip(newer).unwrap());
        assert_eq!(db.list_tips().unwrap().len(), 1);
    }

    #[test]
    fn null_timestamp_round_trips_as_none() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO scans (created_at, tone_result, confidence) VALUES (NULL, 'X', 10.0)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let rows = db.list_scans(OrderBy::NEWEST_FIRST, None).unwrap();
        assert_eq!(rows[0].created_at, None);
    }
}
