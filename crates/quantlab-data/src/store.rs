//! SQLite store for klines and trades.

use std::path::{Path, PathBuf};

use quantlab_core::error::StorageError;
use quantlab_core::types::{BarSeries, Interval, Kline, Trade};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS klines (
    symbol TEXT NOT NULL,
    interval TEXT NOT NULL,
    open_time INTEGER NOT NULL,
    open REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    close REAL NOT NULL,
    volume REAL NOT NULL,
    close_time INTEGER NOT NULL,
    quote_asset_volume REAL NOT NULL,
    number_of_trades INTEGER NOT NULL,
    taker_buy_base_asset_volume REAL NOT NULL,
    taker_buy_quote_asset_volume REAL NOT NULL,
    PRIMARY KEY (symbol, interval, open_time)
);

CREATE TABLE IF NOT EXISTS trades (
    symbol TEXT NOT NULL,
    trade_id INTEGER NOT NULL,
    price REAL NOT NULL,
    qty REAL NOT NULL,
    quote_qty REAL NOT NULL,
    trade_time INTEGER NOT NULL,
    is_buyer_maker INTEGER NOT NULL,
    is_best_match INTEGER NOT NULL,
    PRIMARY KEY (symbol, trade_id)
);
";

fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

/// Relational store for archive rows.
pub struct KlineStore {
    conn: Connection,
    path: PathBuf,
}

impl KlineStore {
    /// Open or create a database, creating parent directories and tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let existed = path.exists();
        let store = Self::connect(path)?;
        if existed {
            debug!(path = %path.display(), "Opened existing database");
        } else {
            info!(path = %path.display(), "Created new database");
        }
        Ok(store)
    }

    /// Open a database that must already exist.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        Self::connect(path)
    }

    fn connect(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert klines, ignoring rows already stored. Returns rows added.
    pub fn insert_klines(&mut self, klines: &[Kline]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction().map_err(db_err)?;
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO klines (
                        symbol, interval, open_time, open, high, low, close, volume,
                        close_time, quote_asset_volume, number_of_trades,
                        taker_buy_base_asset_volume, taker_buy_quote_asset_volume
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                )
                .map_err(db_err)?;

            for k in klines {
                inserted += stmt
                    .execute(params![
                        k.symbol,
                        k.interval.as_str(),
                        k.open_time,
                        k.open,
                        k.high,
                        k.low,
                        k.close,
                        k.volume,
                        k.close_time,
                        k.quote_asset_volume,
                        k.number_of_trades,
                        k.taker_buy_base_asset_volume,
                        k.taker_buy_quote_asset_volume,
                    ])
                    .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;

        debug!(parsed = klines.len(), inserted, "Inserted klines");
        Ok(inserted)
    }

    /// Insert trades, ignoring rows already stored. Returns rows added.
    pub fn insert_trades(&mut self, trades: &[Trade]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction().map_err(db_err)?;
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO trades (
                        symbol, trade_id, price, qty, quote_qty, trade_time,
                        is_buyer_maker, is_best_match
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(db_err)?;

            for t in trades {
                inserted += stmt
                    .execute(params![
                        t.symbol,
                        t.trade_id,
                        t.price,
                        t.qty,
                        t.quote_qty,
                        t.trade_time,
                        t.is_buyer_maker,
                        t.is_best_match,
                    ])
                    .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;

        debug!(parsed = trades.len(), inserted, "Inserted trades");
        Ok(inserted)
    }

    /// All klines for a symbol and interval, oldest first.
    pub fn load_klines(&self, symbol: &str, interval: Interval) -> Result<Vec<Kline>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT symbol, open_time, open, high, low, close, volume, close_time,
                        quote_asset_volume, number_of_trades,
                        taker_buy_base_asset_volume, taker_buy_quote_asset_volume
                 FROM klines
                 WHERE symbol = ?1 AND interval = ?2
                 ORDER BY open_time",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![symbol, interval.as_str()], |row| {
                Ok(Kline {
                    symbol: row.get(0)?,
                    interval,
                    open_time: row.get(1)?,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                    close_time: row.get(7)?,
                    quote_asset_volume: row.get(8)?,
                    number_of_trades: row.get(9)?,
                    taker_buy_base_asset_volume: row.get(10)?,
                    taker_buy_quote_asset_volume: row.get(11)?,
                })
            })
            .map_err(db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Klines projected onto a bar series.
    pub fn load_series(&self, symbol: &str, interval: Interval) -> Result<BarSeries, StorageError> {
        let bars = self
            .load_klines(symbol, interval)?
            .iter()
            .map(Kline::to_bar)
            .collect();
        Ok(BarSeries::from_bars(symbol, interval, bars))
    }

    /// Open price of the kline starting exactly at `open_time` (ms).
    pub fn open_price_at(
        &self,
        symbol: &str,
        interval: Interval,
        open_time: i64,
    ) -> Result<Option<f64>, StorageError> {
        self.conn
            .query_row(
                "SELECT open FROM klines WHERE symbol = ?1 AND interval = ?2 AND open_time = ?3",
                params![symbol, interval.as_str(), open_time],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)
    }

    pub fn count_klines(&self) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM klines")
    }

    pub fn count_trades(&self) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM trades")
    }

    fn count(&self, sql: &str) -> Result<usize, StorageError> {
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0)).map_err(db_err)?;
        Ok(n as usize)
    }
}
