//! Report rendering port.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;
use crate::domain::price::PriceSeries;
use crate::domain::report::{BacktestReport, PredictionReport};

/// Port for writing rendered reports.
pub trait ReportPort {
    fn render_backtest(
        &self,
        report: &BacktestReport,
        result: &BacktestResult,
    ) -> Result<String, StockcastError>;

    fn render_prediction(
        &self,
        report: &PredictionReport,
        history: &PriceSeries,
        predictions: &[PredictionPoint],
    ) -> Result<String, StockcastError>;

    /// Default implementation: write the rendered text as-is.
    fn write(&self, content: &str, output_path: &Path) -> Result<(), StockcastError> {
        std::fs::write(output_path, content)?;
        Ok(())
    }
}
