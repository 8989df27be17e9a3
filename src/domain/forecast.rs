//! Trend-model extrapolation into dated predictions.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::StockcastError;
use super::price::PriceSeries;

pub const DEFAULT_FORECAST_DAYS: i64 = 30;

/// A fitted model mapping a time index to a price.
///
/// Indices continue the space the model was fit on: the first historical
/// close is index 0.
pub trait TrendModel {
    fn predict(&self, indices: &[usize]) -> Vec<f64>;

    fn name(&self) -> &str {
        "trend"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

/// Predict `days` consecutive calendar days after the last date in `series`.
///
/// `days` is checked before the model is consulted.
pub fn predict(
    series: &PriceSeries,
    model: &dyn TrendModel,
    days: i64,
) -> Result<Vec<PredictionPoint>, StockcastError> {
    if days <= 0 {
        return Err(StockcastError::validation(
            "days",
            format!("must be a positive integer, got {days}"),
        ));
    }
    let last_date = series
        .last_date()
        .ok_or_else(|| StockcastError::DataNotFound {
            symbol: series.symbol().to_string(),
        })?;

    let days = days as usize;
    let n = series.len();

    let future_dates = (1..=days as u64)
        .map(|offset| {
            last_date
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| StockcastError::validation("days", "horizon exceeds calendar range"))
        })
        .collect::<Result<Vec<NaiveDate>, StockcastError>>()?;

    let future_indices: Vec<usize> = (n..n + days).collect();
    let prices = model.predict(&future_indices);

    if prices.len() != days {
        return Err(StockcastError::ModelUnavailable {
            symbol: series.symbol().to_string(),
            reason: format!(
                "{} returned {} values for {} indices",
                model.name(),
                prices.len(),
                days
            ),
        });
    }

    Ok(future_dates
        .into_iter()
        .zip(prices)
        .map(|(date, predicted_price)| PredictionPoint {
            date,
            predicted_price,
        })
        .collect())
}
