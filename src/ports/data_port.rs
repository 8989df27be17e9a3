//! Stored price data access port.
//!
//! Rows returned are already deduplicated per (symbol, date).

use crate::domain::error::StockcastError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// All stored rows for `symbol`, ordered by date. Empty when none exist.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcastError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockcastError>;

    /// First date, last date and row count, or `None` when nothing is stored.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcastError>;
}
