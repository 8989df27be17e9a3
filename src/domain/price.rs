//! Daily price rows and the per-symbol price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StockcastError;

/// One stored daily row for a symbol. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Ordered price history for exactly one symbol, strictly increasing by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

/// Build a series from stored rows.
///
/// Rows are sorted by date; a repeated date keeps the first row seen, the way
/// the storage layer ignores conflicting inserts. Fails with `DataNotFound`
/// when `rows` is empty.
pub fn build_series(symbol: &str, rows: Vec<PricePoint>) -> Result<PriceSeries, StockcastError> {
    if rows.is_empty() {
        return Err(StockcastError::DataNotFound {
            symbol: symbol.to_string(),
        });
    }

    for row in &rows {
        if row.symbol != symbol {
            return Err(StockcastError::validation(
                "symbol",
                format!("row for {} on {} in series for {}", row.symbol, row.date, symbol),
            ));
        }
        if !row.close.is_finite() || row.close <= 0.0 {
            return Err(StockcastError::validation(
                "close",
                format!("{} on {} has non-positive close {}", symbol, row.date, row.close),
            ));
        }
    }

    let mut points = rows;
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    Ok(PriceSeries {
        symbol: symbol.to_string(),
        points,
    })
}

impl PriceSeries {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(symbol: &str, date: &str, close: f64) -> PricePoint {
        PricePoint {
            symbol: symbol.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn empty_rows_are_data_not_found() {
        let err = build_series("AAPL", vec![]).unwrap_err();
        assert!(matches!(err, StockcastError::DataNotFound { ref symbol } if symbol == "AAPL"));
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let series = build_series(
            "AAPL",
            vec![
                point("AAPL", "2023-01-03", 103.0),
                point("AAPL", "2023-01-01", 105.0),
                point("AAPL", "2023-01-02", 108.0),
            ],
        )
        .unwrap();

        assert_eq!(series.closes(), vec![105.0, 108.0, 103.0]);
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2023, 1, 3));
    }

    #[test]
    fn duplicate_dates_keep_first_row() {
        let series = build_series(
            "AAPL",
            vec![
                point("AAPL", "2023-01-01", 105.0),
                point("AAPL", "2023-01-01", 999.0),
                point("AAPL", "2023-01-02", 108.0),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![105.0, 108.0]);
    }

    #[test]
    fn foreign_symbol_rejected() {
        let err = build_series(
            "AAPL",
            vec![
                point("AAPL", "2023-01-01", 105.0),
                point("MSFT", "2023-01-02", 250.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, StockcastError::Validation { ref field, .. } if field == "symbol"));
    }

    #[test]
    fn non_positive_close_rejected() {
        let err = build_series("AAPL", vec![point("AAPL", "2023-01-01", 0.0)]).unwrap_err();
        assert!(matches!(err, StockcastError::Validation { ref field, .. } if field == "close"));
    }

    #[test]
    fn accessors() {
        let series = build_series("AAPL", vec![point("AAPL", "2023-01-01", 105.0)]).unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert!(!series.is_empty());
        assert_eq!(series.points()[0].volume, 1000);
        assert_eq!(series.dates().len(), 1);
    }
}
