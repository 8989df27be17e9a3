#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use stockcast::domain::error::StockcastError;
use stockcast::domain::forecast::{PredictionPoint, TrendModel};
pub use stockcast::domain::price::PricePoint;
use stockcast::domain::price::{PriceSeries, build_series};
use stockcast::ports::data_port::DataPort;
use stockcast::ports::model_port::ModelPort;
use stockcast::ports::prediction_port::PredictionStore;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockcastError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockcastError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcastError> {
        match self.data.get(symbol) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

/// Model returning `start + step * index`.
pub struct LineModel {
    pub start: f64,
    pub step: f64,
}

impl TrendModel for LineModel {
    fn predict(&self, indices: &[usize]) -> Vec<f64> {
        indices
            .iter()
            .map(|&i| self.start + self.step * i as f64)
            .collect()
    }
}

/// Hands out a [`LineModel`] for every symbol and counts the requests.
pub struct MockModels {
    pub model: (f64, f64),
    pub loads: Cell<usize>,
}

impl MockModels {
    pub fn new(start: f64, step: f64) -> Self {
        Self {
            model: (start, step),
            loads: Cell::new(0),
        }
    }
}

impl ModelPort for MockModels {
    fn load_model(&self, _symbol: &str) -> Result<Box<dyn TrendModel>, StockcastError> {
        self.loads.set(self.loads.get() + 1);
        Ok(Box::new(LineModel {
            start: self.model.0,
            step: self.model.1,
        }))
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub saved: RefCell<Vec<(String, Vec<PredictionPoint>)>>,
}

impl PredictionStore for RecordingStore {
    fn upsert_predictions(
        &self,
        symbol: &str,
        predictions: &[PredictionPoint],
    ) -> Result<(), StockcastError> {
        self.saved
            .borrow_mut()
            .push((symbol.to_string(), predictions.to_vec()));
        Ok(())
    }
}

pub fn make_point(symbol: &str, date: &str, close: f64) -> PricePoint {
    PricePoint {
        symbol: symbol.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive daily points starting at `start_date`.
pub fn make_points(symbol: &str, start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            symbol: symbol.to_string(),
            date: start + chrono::Days::new(i as u64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    build_series(symbol, make_points(symbol, "2023-01-01", closes)).unwrap()
}

/// The four-day AAPL history used across the scenario tests.
pub fn aapl_points() -> Vec<PricePoint> {
    vec![
        make_point("AAPL", "2023-01-01", 105.0),
        make_point("AAPL", "2023-01-02", 108.0),
        make_point("AAPL", "2023-01-03", 103.0),
        make_point("AAPL", "2023-01-04", 107.0),
    ]
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
