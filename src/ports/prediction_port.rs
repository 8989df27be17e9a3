//! Prediction persistence port.

use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;

pub trait PredictionStore {
    /// Insert or replace one prediction per (symbol, date).
    fn upsert_predictions(
        &self,
        symbol: &str,
        predictions: &[PredictionPoint],
    ) -> Result<(), StockcastError>;
}
