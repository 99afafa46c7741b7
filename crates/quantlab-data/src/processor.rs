//! Historical archive ingestion.

use std::path::{Path, PathBuf};

use quantlab_core::error::{DataError, StorageError};
use quantlab_core::types::{DataKind, Kline, Trade};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::archive;
use crate::store::KlineStore;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub klines_parsed: usize,
    pub trades_parsed: usize,
    pub klines_inserted: usize,
    pub trades_inserted: usize,
}

impl IngestSummary {
    pub fn rows_parsed(&self) -> usize {
        self.klines_parsed + self.trades_parsed
    }

    pub fn rows_inserted(&self) -> usize {
        self.klines_inserted + self.trades_inserted
    }
}

/// Parses downloaded archives and stores their rows.
pub struct HistoricalDataProcessor {
    db_path: PathBuf,
}

impl HistoricalDataProcessor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Parse every archive and insert the rows.
    ///
    /// Missing, unclassifiable and unparsable files are skipped. The database
    /// is only opened when at least one row was parsed.
    pub fn process_and_store(&self, paths: &[PathBuf]) -> Result<IngestSummary, StorageError> {
        let mut summary = IngestSummary::default();
        let mut klines: Vec<Kline> = Vec::new();
        let mut trades: Vec<Trade> = Vec::new();

        for path in paths {
            if !path.exists() {
                warn!(path = %path.display(), "Archive not found, skipping");
                summary.files_skipped += 1;
                continue;
            }

            let parsed = match archive::classify(path) {
                Some(DataKind::Klines) => archive::parse_klines_zip(path).map(|rows| {
                    summary.klines_parsed += rows.len();
                    klines.extend(rows);
                }),
                Some(DataKind::Trades) => archive::parse_trades_zip(path).map(|rows| {
                    summary.trades_parsed += rows.len();
                    trades.extend(rows);
                }),
                None => {
                    warn!(path = %path.display(), "Unrecognised archive type, skipping");
                    summary.files_skipped += 1;
                    continue;
                }
            };

            match parsed {
                Ok(()) => summary.files_processed += 1,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to parse archive");
                    summary.files_skipped += 1;
                }
            }
        }

        if klines.is_empty() && trades.is_empty() {
            info!("No new data to store");
            return Ok(summary);
        }

        let mut store = KlineStore::open(&self.db_path)?;
        if !klines.is_empty() {
            summary.klines_inserted = store.insert_klines(&klines)?;
        }
        if !trades.is_empty() {
            summary.trades_inserted = store.insert_trades(&trades)?;
        }

        info!(
            files = summary.files_processed,
            skipped = summary.files_skipped,
            parsed = summary.rows_parsed(),
            inserted = summary.rows_inserted(),
            db = %self.db_path.display(),
            "Ingestion complete"
        );

        Ok(summary)
    }
}

/// All `.zip` files under `dir`, sorted by path.
pub fn find_archives(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let root = glob::Pattern::escape(&dir.display().to_string());
    let pattern = format!("{}/**/*.zip", root);
    let entries = glob::glob(&pattern).map_err(|e| DataError::Parse {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut found = entries
        .map(|entry| entry.map_err(|e| DataError::Io(e.into_error())))
        .collect::<Result<Vec<_>, _>>()?;
    found.retain(|p| p.is_file());
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{write_zip, KLINES_CSV};
    use quantlab_core::types::Interval;

    #[test]
    fn test_ingest_klines_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir
            .path()
            .join("downloads/klines/BTCUSDT/1d/BTCUSDT-1d-2023-01-02.zip");
        write_zip(&archive, "BTCUSDT-1d-2023-01-02.csv", KLINES_CSV);
        let db_path = dir.path().join("db/lab.db");
        let processor = HistoricalDataProcessor::new(&db_path);

        let first = processor.process_and_store(&[archive.clone()]).unwrap();
        assert_eq!(first.files_processed, 1);
        assert_eq!(first.klines_parsed, 2);
        assert_eq!(first.klines_inserted, 2);

        let store = KlineStore::open_existing(&db_path).unwrap();
        let rows = store.load_klines("BTCUSDT", Interval::Daily).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|k| k.symbol == "BTCUSDT" && k.interval == Interval::Daily));

        let second = processor.process_and_store(&[archive]).unwrap();
        assert_eq!(second.klines_parsed, 2);
        assert_eq!(second.klines_inserted, 0);
    }

    #[test]
    fn test_nothing_parsed_leaves_no_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lab.db");
        let corrupt = dir.path().join("klines/BTCUSDT/1d/corrupt.zip");
        std::fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
        std::fs::write(&corrupt, b"garbage").unwrap();
        let unknown = dir.path().join("depth/BTCUSDT/x.zip");
        std::fs::create_dir_all(unknown.parent().unwrap()).unwrap();
        std::fs::write(&unknown, b"garbage").unwrap();

        let processor = HistoricalDataProcessor::new(&db_path);
        let summary = processor
            .process_and_store(&[corrupt, unknown, dir.path().join("missing.zip")])
            .unwrap();

        assert_eq!(summary.files_processed, 0);
        assert_eq!(summary.files_skipped, 3);
        assert!(!db_path.exists());
    }

    #[test]
    fn test_find_archives() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(&dir.path().join("klines/A/1d/b.zip"), "b.csv", KLINES_CSV);
        write_zip(&dir.path().join("klines/A/1d/a.zip"), "a.csv", KLINES_CSV);
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let found = find_archives(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a.zip"));
    }

    #[test]
    fn test_find_archives_nested_and_special_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mirror [spot]");
        write_zip(&root.join("trades/ETHUSDT/ETHUSDT-trades-2024-01-01.zip"), "t.csv", "");
        write_zip(&root.join("klines/BTCUSDT/1h/BTCUSDT-1h-2024-01-01.zip"), "k.csv", KLINES_CSV);
        write_zip(&root.join("top.zip"), "k.csv", KLINES_CSV);

        let found = find_archives(&root).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found[0].ends_with("klines/BTCUSDT/1h/BTCUSDT-1h-2024-01-01.zip"));
        assert!(found[1].ends_with("top.zip"));
        assert!(found[2].ends_with("trades/ETHUSDT/ETHUSDT-trades-2024-01-01.zip"));

        assert!(find_archives(&dir.path().join("absent")).unwrap().is_empty());
    }
}
