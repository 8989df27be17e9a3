//! CSV file price data adapter.
//!
//! One file per symbol, `{SYMBOL}.csv`, with header
//! `date,open,high,low,close,volume`.

use crate::domain::error::StockcastError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Parse a price file into rows for `symbol`, sorted by date.
    pub fn read_file(path: &Path, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
        let content = fs::read_to_string(path).map_err(|e| StockcastError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        parse_rows(&content, symbol)
    }
}

fn field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, StockcastError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| StockcastError::Database {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| StockcastError::Database {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_rows(content: &str, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| StockcastError::Database {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(0).ok_or_else(|| StockcastError::Database {
            reason: "missing date column".into(),
        })?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
            StockcastError::Database {
                reason: format!("invalid date format: {}", e),
            }
        })?;

        rows.push(PricePoint {
            symbol: symbol.to_string(),
            date,
            open: field(&record, 1, "open")?,
            high: field(&record, 2, "high")?,
            low: field(&record, 3, "low")?,
            close: field(&record, 4, "close")?,
            volume: field(&record, 5, "volume")?,
        });
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            log::warn!("no price file at {}", path.display());
            return Ok(Vec::new());
        }
        Self::read_file(&path, symbol)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcastError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StockcastError::Database {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StockcastError::Database {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcastError> {
        let rows = self.fetch_prices(symbol)?;
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, rows.len()))),
            _ => Ok(None),
        }
    }
}
