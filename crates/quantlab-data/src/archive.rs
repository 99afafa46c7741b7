//! Parsing of daily ZIP archives.
//!
//! Each archive holds a single headerless CSV. Symbol and interval are not in
//! the rows; they are recovered from the archive's location, which mirrors the
//! remote layout (`klines/{SYMBOL}/{INTERVAL}/...` or `trades/{SYMBOL}/...`).

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use quantlab_core::error::DataError;
use quantlab_core::types::{DataKind, Interval, Kline, Trade};

/// Timestamps above this are microseconds.
const MICROS_THRESHOLD: i64 = 100_000_000_000_000;

/// Kind of archive at `path`, judged by its `klines`/`trades` directory.
pub fn classify(path: &Path) -> Option<DataKind> {
    let components = components(path);
    let position = components
        .iter()
        .rposition(|c| c == "klines" || c == "trades")?;
    match components[position].as_str() {
        "klines" => Some(DataKind::Klines),
        _ => Some(DataKind::Trades),
    }
}

/// Parse a klines archive.
pub fn parse_klines_zip(path: &Path) -> Result<Vec<Kline>, DataError> {
    let components = components(path);
    let position = components
        .iter()
        .rposition(|c| c == "klines")
        .filter(|&p| p + 3 < components.len())
        .ok_or_else(|| DataError::UnrecognisedPath(path.to_path_buf()))?;
    let symbol = components[position + 1].clone();
    let interval = Interval::from_str(&components[position + 2])
        .map_err(|_| DataError::UnrecognisedPath(path.to_path_buf()))?;

    let csv = read_first_entry(path)?;
    let mut klines = Vec::new();

    for (row, record) in records(path, &csv)?.into_iter().enumerate() {
        let fields = Fields {
            path,
            row,
            record: &record,
        };
        if record.len() < 12 {
            return Err(fields.error(format!("expected 12 columns, found {}", record.len())));
        }
        klines.push(Kline {
            symbol: symbol.clone(),
            interval,
            open_time: to_millis(fields.parse(0)?),
            open: fields.parse(1)?,
            high: fields.parse(2)?,
            low: fields.parse(3)?,
            close: fields.parse(4)?,
            volume: fields.parse(5)?,
            close_time: to_millis(fields.parse(6)?),
            quote_asset_volume: fields.parse(7)?,
            number_of_trades: fields.parse(8)?,
            taker_buy_base_asset_volume: fields.parse(9)?,
            taker_buy_quote_asset_volume: fields.parse(10)?,
        });
    }

    Ok(klines)
}

/// Parse a trades archive.
pub fn parse_trades_zip(path: &Path) -> Result<Vec<Trade>, DataError> {
    let components = components(path);
    let position = components
        .iter()
        .rposition(|c| c == "trades")
        .filter(|&p| p + 2 < components.len())
        .ok_or_else(|| DataError::UnrecognisedPath(path.to_path_buf()))?;
    let symbol = components[position + 1].clone();

    let csv = read_first_entry(path)?;
    let mut trades = Vec::new();

    for (row, record) in records(path, &csv)?.into_iter().enumerate() {
        let fields = Fields {
            path,
            row,
            record: &record,
        };
        if record.len() < 7 {
            return Err(fields.error(format!("expected 7 columns, found {}", record.len())));
        }
        trades.push(Trade {
            symbol: symbol.clone(),
            trade_id: fields.parse(0)?,
            price: fields.parse(1)?,
            qty: fields.parse(2)?,
            quote_qty: fields.parse(3)?,
            trade_time: to_millis(fields.parse(4)?),
            is_buyer_maker: fields.flag(5)?,
            is_best_match: fields.flag(6)?,
        });
    }

    Ok(trades)
}

/// Normalise a microsecond timestamp to milliseconds.
pub fn to_millis(timestamp: i64) -> i64 {
    if timestamp > MICROS_THRESHOLD {
        timestamp / 1000
    } else {
        timestamp
    }
}

fn components(path: &Path) -> Vec<String> {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

fn parse_error(path: &Path, reason: impl Into<String>) -> DataError {
    DataError::Parse {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

fn read_first_entry(path: &Path) -> Result<String, DataError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| parse_error(path, e.to_string()))?;
    if archive.is_empty() {
        return Err(parse_error(path, "archive is empty"));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| parse_error(path, e.to_string()))?;
    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .map_err(|e| parse_error(path, e.to_string()))?;
    Ok(contents)
}

/// CSV records with a leading header row removed.
fn records(path: &Path, csv: &str) -> Result<Vec<StringRecord>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv.as_bytes());

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_error(path, e.to_string()))?;
        let is_header = row == 0
            && record
                .get(0)
                .map(|first| first.parse::<i64>().is_err())
                .unwrap_or(false);
        if !is_header {
            records.push(record);
        }
    }
    Ok(records)
}

struct Fields<'a> {
    path: &'a Path,
    row: usize,
    record: &'a StringRecord,
}

impl Fields<'_> {
    fn error(&self, reason: String) -> DataError {
        parse_error(self.path, format!("row {}: {}", self.row + 1, reason))
    }

    fn raw(&self, index: usize) -> Result<&str, DataError> {
        self.record
            .get(index)
            .ok_or_else(|| self.error(format!("missing column {}", index)))
    }

    fn parse<T: FromStr>(&self, index: usize) -> Result<T, DataError> {
        let raw = self.raw(index)?;
        raw.parse()
            .map_err(|_| self.error(format!("invalid value '{}' in column {}", raw, index)))
    }

    fn flag(&self, index: usize) -> Result<bool, DataError> {
        let raw = self.raw(index)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(self.error(format!("invalid boolean '{}' in column {}", raw, index))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    pub(crate) const KLINES_CSV: &str = "\
1672617600000,16600.0,16700.0,16500.0,16650.0,1000,1672703999999,16650000,500,500,8325000,0
1672704000000,16650.0,16800.0,16600.0,16750.0,1200,1672790399999,20100000,600,600,10050000,0
";

    pub(crate) fn write_zip(path: &Path, entry: &str, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file(entry, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_parse_klines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klines/BTCUSDT/1d/BTCUSDT-1d-2023-01-02.zip");
        write_zip(&path, "BTCUSDT-1d-2023-01-02.csv", KLINES_CSV);

        let klines = parse_klines_zip(&path).unwrap();
        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].symbol, "BTCUSDT");
        assert_eq!(klines[0].interval, Interval::Daily);
        assert_eq!(klines[0].open_time, 1672617600000);
        assert_eq!(klines[1].close, 16750.0);
        assert_eq!(klines[1].number_of_trades, 600);
    }

    #[test]
    fn test_header_and_microseconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klines/ETHUSDT/1h/ETHUSDT-1h-2025-01-01.zip");
        let csv = "open_time,open,high,low,close,volume,close_time,quote_volume,count,taker_buy_volume,taker_buy_quote_volume,ignore\n\
                   1735689600000000,1.0,2.0,0.5,1.5,10,1735693199999999,15,3,5,7.5,0\n";
        write_zip(&path, "data.csv", csv);

        let klines = parse_klines_zip(&path).unwrap();
        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].open_time, 1735689600000);
        assert_eq!(klines[0].close_time, 1735693199999);
        assert_eq!(klines[0].interval, Interval::Hour1);
    }

    #[test]
    fn test_parse_trades_booleans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades/ETHUSDT/ETHUSDT-trades-2023-03-01.zip");
        let csv = "1,1600.5,0.1,160.05,1677628800000,True,true\n2,1600.0,0.2,320.0,1677628800100,false,False\n";
        write_zip(&path, "trades.csv", csv);

        let trades = parse_trades_zip(&path).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].symbol, "ETHUSDT");
        assert!(trades[0].is_buyer_maker);
        assert!(!trades[1].is_best_match);
        assert_eq!(trades[1].trade_time, 1677628800100);
    }

    #[test]
    fn test_malformed_row_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klines/BTCUSDT/1d/bad.zip");
        write_zip(&path, "bad.csv", "1672617600000,abc,1,1,1,1,1,1,1,1,1,0\n");

        assert!(matches!(
            parse_klines_zip(&path),
            Err(DataError::Parse { .. })
        ));
    }

    #[test]
    fn test_short_kline_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klines/BTCUSDT/1d/short.zip");
        write_zip(&path, "short.csv", "1672617600000,1,2,0.5,1.5,10,1672703999999,15,3,5,7.5\n");

        match parse_klines_zip(&path) {
            Err(DataError::Parse { reason, .. }) => assert!(reason.contains("expected 12 columns, found 11")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klines/BTCUSDT/1d/corrupt.zip");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(
            parse_klines_zip(&path),
            Err(DataError::Parse { .. })
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(Path::new("data/klines/BTCUSDT/1d/x.zip")),
            Some(DataKind::Klines)
        );
        assert_eq!(
            classify(Path::new("data/trades/BTCUSDT/x.zip")),
            Some(DataKind::Trades)
        );
        assert_eq!(classify(Path::new("data/other/x.zip")), None);
    }

    #[test]
    fn test_to_millis() {
        assert_eq!(to_millis(1672617600000), 1672617600000);
        assert_eq!(to_millis(1672617600000123), 1672617600000);
    }
}
