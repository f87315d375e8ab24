use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS scans (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            tone_result TEXT NOT NULL,
            confidence  REAL NOT NULL,
            rgb_value   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_scans_created
            ON scans(created_at);

        CREATE TABLE IF NOT EXISTS saved_palettes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            season_name TEXT NOT NULL,
            colors      TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_saved_palettes_created
            ON saved_palettes(created_at);

        CREATE TABLE IF NOT EXISTS master_seasons (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            colors      TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS fashion_tips (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            title       TEXT NOT NULL,
            category    TEXT NOT NULL,
            description TEXT NOT NULL
        );

        -- Seed the four seasons of the color master list
        INSERT OR IGNORE INTO master_seasons (name, colors) VALUES
            ('Spring', '[\"#FFB347\",\"#FF6F61\",\"#F7E7CE\",\"#98FB98\"]'),
            ('Summer', '[\"#B0C4DE\",\"#E6E6FA\",\"#D8BFD8\",\"#87CEEB\"]'),
            ('Autumn', '[\"#8B4513\",\"#D2691E\",\"#556B2F\",\"#DAA520\"]'),
            ('Winter', '[\"#000000\",\"#FFFFFF\",\"#000080\",\"#DC143C\"]');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
