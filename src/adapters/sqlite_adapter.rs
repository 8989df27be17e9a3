//! SQLite storage adapter for price rows and predictions.

use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;
use crate::domain::price::PricePoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::prediction_port::PredictionStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> StockcastError {
    StockcastError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> StockcastError {
    StockcastError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_stored_date(value: &str) -> Result<NaiveDate, StockcastError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| StockcastError::Database {
        reason: format!("invalid stored date {}: {}", value, e),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockcastError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| StockcastError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StockcastError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StockcastError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StockcastError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stock_price (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            CREATE TABLE IF NOT EXISTS stock_prediction (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                predicted_price REAL NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            CREATE INDEX IF NOT EXISTS idx_stock_price_date ON stock_price(date);",
        )
        .map_err(query_error)?;

        Ok(())
    }

    /// Bulk insert rows, ignoring any (symbol, date) already stored.
    ///
    /// Returns the number of rows actually inserted.
    pub fn insert_prices(&self, rows: &[PricePoint]) -> Result<usize, StockcastError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        let mut inserted = 0;
        for row in rows {
            inserted += tx
                .execute(
                    "INSERT OR IGNORE INTO stock_price (symbol, date, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        row.symbol,
                        row.date.format("%Y-%m-%d").to_string(),
                        row.open,
                        row.high,
                        row.low,
                        row.close,
                        row.volume
                    ],
                )
                .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        Ok(inserted)
    }

    pub fn fetch_predictions(&self, symbol: &str) -> Result<Vec<PredictionPoint>, StockcastError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, predicted_price FROM stock_prediction
                 WHERE symbol = ?1 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(query_error)?;

        let mut predictions = Vec::new();
        for row in rows {
            let (date_str, predicted_price) = row.map_err(query_error)?;
            predictions.push(PredictionPoint {
                date: parse_stored_date(&date_str)?,
                predicted_price,
            });
        }
        Ok(predictions)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
        let conn = self.conn()?;

        let query = "SELECT symbol, date, open, high, low, close, volume
                     FROM stock_price
                     WHERE symbol = ?1
                     ORDER BY date ASC";

        let mut stmt = conn.prepare(query).map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                let date_str: String = row.get(1)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        date_str.len(),
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(PricePoint {
                    symbol: row.get(0)?,
                    date,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })
            .map_err(query_error)?;

        let mut prices = Vec::new();
        for row in rows {
            prices.push(row.map_err(query_error)?);
        }

        Ok(prices)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcastError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM stock_price ORDER BY symbol")
            .map_err(query_error)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }

        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcastError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM stock_price WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_stored_date(&min_str)?,
                parse_stored_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}

impl PredictionStore for SqliteAdapter {
    fn upsert_predictions(
        &self,
        symbol: &str,
        predictions: &[PredictionPoint],
    ) -> Result<(), StockcastError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for p in predictions {
            tx.execute(
                "INSERT INTO stock_prediction (symbol, date, predicted_price)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(symbol, date) DO UPDATE SET predicted_price = excluded.predicted_price",
                params![symbol, p.date.format("%Y-%m-%d").to_string(), p.predicted_price],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        Ok(())
    }
}
