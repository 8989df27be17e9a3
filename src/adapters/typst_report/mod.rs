//! Typst report generation.
//!
//! Renders backtest and prediction reports as Typst markup: a field/value
//! summary, the trade log or prediction table, and a line chart. Compiling
//! the markup to PDF is left to the `typst` toolchain.

pub mod chart;
pub mod tables;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;
use crate::domain::price::PriceSeries;
use crate::domain::report::{BacktestReport, PredictionReport};
use crate::ports::report_port::ReportPort;

use chart::{ChartLine, format_line_chart};

pub struct TypstReportAdapter;

fn render_header(title: &str) -> String {
    format!("#set page(paper: \"us-letter\")\n#set text(size: 11pt)\n\n= {}\n\n", title)
}

impl ReportPort for TypstReportAdapter {
    fn render_backtest(
        &self,
        report: &BacktestReport,
        result: &BacktestResult,
    ) -> Result<String, StockcastError> {
        let mut out = render_header(&format!("Backtest Report: {}", report.symbol));

        out.push_str(&tables::format_summary_table(&[
            ("Symbol", report.symbol.clone()),
            ("Initial Investment", format!("{:.2}", report.initial_investment)),
            (
                "Final Portfolio Value",
                format!("{:.2}", report.final_portfolio_value),
            ),
            ("Total Return", report.total_return.clone()),
            ("Max Drawdown", report.max_drawdown.clone()),
            ("Number of Trades", report.number_of_trades.to_string()),
        ]));

        out.push_str("== Trades\n\n");
        out.push_str(&tables::format_trade_log(&report.trades));

        let values: Vec<f64> = result.value_curve.iter().map(|p| p.value).collect();
        out.push_str("== Portfolio Value\n\n");
        out.push_str(&format_line_chart(
            &[ChartLine {
                label: "final position marked to historical closes",
                values: &values,
                offset: 0,
                color: "blue",
                dashed: false,
            }],
            "Portfolio Value",
        ));

        Ok(out)
    }

    fn render_prediction(
        &self,
        report: &PredictionReport,
        history: &PriceSeries,
        predictions: &[PredictionPoint],
    ) -> Result<String, StockcastError> {
        let mut out = render_header(&format!("Prediction Report: {}", report.symbol));

        let horizon = match (predictions.first(), predictions.last()) {
            (Some(first), Some(last)) => format!("{} to {}", first.date, last.date),
            _ => "none".to_string(),
        };
        out.push_str(&tables::format_summary_table(&[
            ("Symbol", report.symbol.clone()),
            ("Historical Points", history.len().to_string()),
            ("Forecast Days", predictions.len().to_string()),
            ("Horizon", horizon),
        ]));

        let actual = history.closes();
        let predicted: Vec<f64> = predictions.iter().map(|p| p.predicted_price).collect();
        out.push_str("== Stock Price Predictions\n\n");
        out.push_str(&format_line_chart(
            &[
                ChartLine {
                    label: "actual prices",
                    values: &actual,
                    offset: 0,
                    color: "blue",
                    dashed: false,
                },
                ChartLine {
                    label: "predicted prices",
                    values: &predicted,
                    offset: actual.len(),
                    color: "green",
                    dashed: true,
                },
            ],
            "Actual and Predicted Prices",
        ));

        out.push_str("== Predictions\n\n");
        out.push_str(&tables::format_prediction_table(&report.predictions));

        Ok(out)
    }
}
