use std::sync::Arc;

use async_trait::async_trait;
use chroma_db::Database;
use chroma_types::models::{Collection, OrderBy, RawPaletteRecord, RawRecord, RawScanRecord};

use crate::source::{RecordSource, SourceError};

/// Record source backed by the embedded database. Every query runs on the
/// blocking pool so the async runtime is never held by SQLite.
#[derive(Clone)]
pub struct SqliteSource {
    db: Arc<Database>,
}

impl SqliteSource {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, SourceError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let value = tokio::task::spawn_blocking(move || f(&db)).await??;
        Ok(value)
    }
}

fn scan_records(rows: Vec<chroma_db::models::ScanRow>) -> Vec<RawRecord> {
    rows.into_iter()
        .map(|row| RawRecord::Scan(RawScanRecord::from(row)))
        .collect()
}

fn palette_records(rows: Vec<chroma_db::models::PaletteRow>) -> Vec<RawRecord> {
    rows.into_iter()
        .map(|row| RawRecord::Palette(RawPaletteRecord::from(row)))
        .collect()
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn list_records(
        &self,
        collection: Collection,
        order: OrderBy,
        limit: Option<usize>,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.blocking(move |db| {
            Ok(match collection {
                Collection::Scans => scan_records(db.list_scans(order, limit)?),
                Collection::SavedPalettes => palette_records(db.list_palettes(order, limit)?),
            })
        })
        .await
    }

    async fn list_records_range(
        &self,
        collection: Collection,
        order: OrderBy,
        from: usize,
        to: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.blocking(move |db| {
            Ok(match collection {
                Collection::Scans => scan_records(db.list_scans_range(order, from, to)?),
                Collection::SavedPalettes => {
                    palette_records(db.list_palettes_range(order, from, to)?)
                }
            })
        })
        .await
    }

    async fn count_records(&self, collection: Collection) -> Result<u64, SourceError> {
        self.blocking(move |db| db.count_records(collection)).await
    }
}
