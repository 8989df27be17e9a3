//! Plain-text console summaries.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;
use crate::domain::price::PriceSeries;
use crate::domain::report::{BacktestReport, PredictionReport};
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn render_backtest(
        &self,
        report: &BacktestReport,
        _result: &BacktestResult,
    ) -> Result<String, StockcastError> {
        Ok(format_backtest_summary(report))
    }

    fn render_prediction(
        &self,
        report: &PredictionReport,
        _history: &PriceSeries,
        _predictions: &[PredictionPoint],
    ) -> Result<String, StockcastError> {
        Ok(format_prediction_summary(report))
    }
}

pub fn format_backtest_summary(report: &BacktestReport) -> String {
    let mut out = format!("\n=== Backtest: {} ===\n", report.symbol);
    out.push_str(&format!(
        "Initial Investment:  {:.2}\n",
        report.initial_investment
    ));
    out.push_str(&format!(
        "Final Value:         {:.2}\n",
        report.final_portfolio_value
    ));
    out.push_str(&format!("Total Return:        {}\n", report.total_return));
    out.push_str(&format!("Max Drawdown:        {}\n", report.max_drawdown));
    out.push_str(&format!("Trades:              {}\n", report.number_of_trades));
    for trade in &report.trades {
        out.push_str(&format!(
            "  {}  {:<4}  {} @ {:.2}\n",
            trade.date, trade.trade_type, trade.shares, trade.price
        ));
    }
    out
}

pub fn format_prediction_summary(report: &PredictionReport) -> String {
    let mut out = format!("\n=== Predictions: {} ===\n", report.symbol);
    for p in &report.predictions {
        out.push_str(&format!("  {}  {:.2}\n", p.date, p.predicted_price));
    }
    out
}
