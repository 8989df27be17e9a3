//! Presentation-neutral report shapes for backtests and forecasts.
//!
//! Pure reshaping: the only transformation is the two-decimal percentage
//! strings for return and drawdown.

use serde::Serialize;

use super::backtest::{BacktestResult, Trade};
use super::forecast::PredictionPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub initial_investment: f64,
    pub final_portfolio_value: f64,
    pub total_return: String,
    pub max_drawdown: String,
    pub number_of_trades: usize,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub predictions: Vec<PredictionPoint>,
}

pub fn format_pct(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn backtest_report(result: &BacktestResult) -> BacktestReport {
    BacktestReport {
        symbol: result.symbol.clone(),
        initial_investment: result.initial_investment,
        final_portfolio_value: result.final_portfolio_value,
        total_return: format_pct(result.total_return_pct),
        max_drawdown: format_pct(result.max_drawdown_pct),
        number_of_trades: result.trades.len(),
        trades: result.trades.clone(),
    }
}

pub fn prediction_report(symbol: &str, predictions: &[PredictionPoint]) -> PredictionReport {
    PredictionReport {
        symbol: symbol.to_string(),
        predictions: predictions.to_vec(),
    }
}
