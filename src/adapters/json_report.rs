//! JSON report rendering.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockcastError;
use crate::domain::forecast::PredictionPoint;
use crate::domain::price::PriceSeries;
use crate::domain::report::{BacktestReport, PredictionReport};
use crate::ports::report_port::ReportPort;

/// Pretty-printed JSON of the report structures. Prediction reports also
/// carry a `price_chart` with the actual and predicted series; the backtest
/// value curve is not serialized.
pub struct JsonReportAdapter;

#[derive(Serialize)]
struct PredictionDocument<'a> {
    #[serde(flatten)]
    report: &'a PredictionReport,
    price_chart: PriceChart,
}

#[derive(Serialize)]
struct PriceChart {
    title: &'static str,
    actual: Vec<ChartPoint>,
    predicted: Vec<ChartPoint>,
}

#[derive(Serialize)]
struct ChartPoint {
    date: NaiveDate,
    price: f64,
}

impl ReportPort for JsonReportAdapter {
    fn render_backtest(
        &self,
        report: &BacktestReport,
        _result: &BacktestResult,
    ) -> Result<String, StockcastError> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn render_prediction(
        &self,
        report: &PredictionReport,
        history: &PriceSeries,
        predictions: &[PredictionPoint],
    ) -> Result<String, StockcastError> {
        let document = PredictionDocument {
            report,
            price_chart: PriceChart {
                title: "Actual and Predicted Prices",
                actual: history
                    .points()
                    .iter()
                    .map(|p| ChartPoint {
                        date: p.date,
                        price: p.close,
                    })
                    .collect(),
                predicted: predictions
                    .iter()
                    .map(|p| ChartPoint {
                        date: p.date,
                        price: p.predicted_price,
                    })
                    .collect(),
            },
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{Trade, TradeType};
    use crate::domain::price::{PricePoint, build_series};
    use crate::domain::report::{backtest_report, prediction_report};
    use chrono::NaiveDate;
    use serde_json::Value;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn backtest_json_fields() {
        let result = BacktestResult {
            symbol: "AAPL".into(),
            initial_investment: 10_000.0,
            final_portfolio_value: 10_523.0,
            total_return_pct: 5.23,
            max_drawdown_pct: 1.5,
            trades: vec![Trade {
                date: date(3),
                trade_type: TradeType::Buy,
                price: 103.0,
                shares: 97,
            }],
            final_cash: 9.0,
            final_holdings: 97,
            value_curve: Vec::new(),
        };
        let json = JsonReportAdapter
            .render_backtest(&backtest_report(&result), &result)
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["total_return"], "5.23%");
        assert_eq!(value["max_drawdown"], "1.50%");
        assert_eq!(value["number_of_trades"], 1);
        assert_eq!(value["trades"][0]["type"], "buy");
        assert_eq!(value["trades"][0]["date"], "2023-01-03");
        assert_eq!(value["trades"][0]["shares"], 97);
        assert!(value.get("value_curve").is_none());
    }

    #[test]
    fn prediction_json_fields() {
        let history = build_series(
            "AAPL",
            vec![PricePoint {
                symbol: "AAPL".into(),
                date: date(1),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 10,
            }],
        )
        .unwrap();
        let predictions = vec![PredictionPoint {
            date: date(2),
            predicted_price: 101.5,
        }];
        let json = JsonReportAdapter
            .render_prediction(&prediction_report("AAPL", &predictions), &history, &predictions)
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["predictions"][0]["date"], "2023-01-02");
        assert_eq!(value["predictions"][0]["predicted_price"], 101.5);

        let chart = &value["price_chart"];
        assert_eq!(chart["actual"][0]["date"], "2023-01-01");
        assert_eq!(chart["actual"][0]["price"], 100.0);
        assert_eq!(chart["predicted"].as_array().unwrap().len(), 1);
        assert_eq!(chart["predicted"][0]["date"], "2023-01-02");
        assert_eq!(chart["predicted"][0]["price"], 101.5);
    }
}
