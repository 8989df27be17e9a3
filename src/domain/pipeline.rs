//! Port-driven orchestration: symbol → stored rows → series → engine.

use crate::domain::backtest::{BacktestConfig, BacktestResult, run_backtest};
use crate::domain::error::StockcastError;
use crate::domain::forecast::{PredictionPoint, predict};
use crate::domain::price::{PriceSeries, build_series};
use crate::domain::validation::{validate_days, validate_initial_investment, validate_windows};
use crate::ports::data_port::DataPort;
use crate::ports::model_port::ModelPort;
use crate::ports::prediction_port::PredictionStore;

/// Load the stored history for `symbol`. No rows is `DataNotFound`.
pub fn load_series(data_port: &dyn DataPort, symbol: &str) -> Result<PriceSeries, StockcastError> {
    let rows = data_port.fetch_prices(symbol)?;
    log::debug!("fetched {} rows for {}", rows.len(), symbol);
    build_series(symbol, rows)
}

pub fn backtest_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockcastError> {
    validate_initial_investment(config.initial_investment)?;
    validate_windows(config.short_window, config.long_window)?;

    let series = load_series(data_port, symbol)?;
    log::info!(
        "backtesting {} over {} points (windows {}/{})",
        symbol,
        series.len(),
        config.short_window,
        config.long_window
    );
    let result = run_backtest(&series, config)?;
    log::info!(
        "{}: {} trades, final value {:.2}",
        symbol,
        result.trades.len(),
        result.final_portfolio_value
    );
    Ok(result)
}

/// Output of a forecast run: the history it extends and the predictions.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub series: PriceSeries,
    pub predictions: Vec<PredictionPoint>,
}

/// Forecast `days` ahead for `symbol`.
///
/// `days` is validated before storage or the model are touched. Predictions
/// are upserted through `store` when one is supplied.
pub fn forecast_symbol(
    data_port: &dyn DataPort,
    models: &dyn ModelPort,
    store: Option<&dyn PredictionStore>,
    symbol: &str,
    days: i64,
) -> Result<Forecast, StockcastError> {
    validate_days(days)?;

    let series = load_series(data_port, symbol)?;
    let model = models.load_model(symbol)?;
    log::info!(
        "forecasting {} for {} days with {} model",
        symbol,
        days,
        model.name()
    );

    let predictions = predict(&series, model.as_ref(), days)?;

    if let Some(store) = store {
        store.upsert_predictions(symbol, &predictions)?;
        log::debug!("stored {} predictions for {}", predictions.len(), symbol);
    }

    Ok(Forecast {
        series,
        predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::TrendModel;
    use crate::domain::price::PricePoint;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct FixedPort(Vec<PricePoint>);

    impl DataPort for FixedPort {
        fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StockcastError> {
            Ok(self.0.iter().filter(|p| p.symbol == symbol).cloned().collect())
        }
        fn list_symbols(&self) -> Result<Vec<String>, StockcastError> {
            Ok(vec![])
        }
        fn get_data_range(
            &self,
            _symbol: &str,
        ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockcastError> {
            Ok(None)
        }
    }

    struct Flat;

    impl TrendModel for Flat {
        fn predict(&self, indices: &[usize]) -> Vec<f64> {
            vec![100.0; indices.len()]
        }
    }

    struct FlatModels;

    impl ModelPort for FlatModels {
        fn load_model(&self, _symbol: &str) -> Result<Box<dyn TrendModel>, StockcastError> {
            Ok(Box::new(Flat))
        }
    }

    struct NoModels;

    impl ModelPort for NoModels {
        fn load_model(&self, symbol: &str) -> Result<Box<dyn TrendModel>, StockcastError> {
            Err(StockcastError::ModelUnavailable {
                symbol: symbol.to_string(),
                reason: "not trained".into(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingStore(RefCell<Vec<(String, usize)>>);

    impl PredictionStore for RecordingStore {
        fn upsert_predictions(
            &self,
            symbol: &str,
            predictions: &[PredictionPoint],
        ) -> Result<(), StockcastError> {
            self.0
                .borrow_mut()
                .push((symbol.to_string(), predictions.len()));
            Ok(())
        }
    }

    fn port() -> FixedPort {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        FixedPort(
            [105.0, 108.0, 103.0, 107.0]
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    symbol: "AAPL".into(),
                    date: start + chrono::Days::new(i as u64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000,
                })
                .collect(),
        )
    }

    #[test]
    fn backtest_unknown_symbol_is_data_not_found() {
        let err = backtest_symbol(&port(), "MSFT", &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, StockcastError::DataNotFound { ref symbol } if symbol == "MSFT"));
    }

    #[test]
    fn backtest_rejects_bad_investment_first() {
        let err = backtest_symbol(&port(), "MSFT", &BacktestConfig::new(0.0)).unwrap_err();
        assert!(matches!(err, StockcastError::Validation { .. }));
    }

    #[test]
    fn backtest_known_symbol() {
        let result = backtest_symbol(&port(), "AAPL", &BacktestConfig::new(10_000.0)).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.symbol, "AAPL");
    }

    #[test]
    fn forecast_persists_through_store() {
        let store = RecordingStore::default();
        let forecast = forecast_symbol(&port(), &FlatModels, Some(&store), "AAPL", 30).unwrap();
        assert_eq!(forecast.predictions.len(), 30);
        assert_eq!(forecast.series.len(), 4);
        assert_eq!(*store.0.borrow(), vec![("AAPL".to_string(), 30)]);
    }

    #[test]
    fn forecast_without_model() {
        let err = forecast_symbol(&port(), &NoModels, None, "AAPL", 5).unwrap_err();
        assert!(matches!(err, StockcastError::ModelUnavailable { .. }));
    }

    #[test]
    fn forecast_invalid_days_before_lookup() {
        let err = forecast_symbol(&port(), &NoModels, None, "NOPE", -10).unwrap_err();
        assert!(matches!(err, StockcastError::Validation { ref field, .. } if field == "days"));
    }

    #[test]
    fn forecast_unknown_symbol() {
        let err = forecast_symbol(&port(), &FlatModels, None, "NOPE", 5).unwrap_err();
        assert!(err.is_data_not_found());
    }
}
