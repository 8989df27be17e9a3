//! Core analytics: price series, moving averages, backtest, forecast, reports.

pub mod price;
pub mod moving_average;
pub mod portfolio;
pub mod metrics;
pub mod backtest;
pub mod forecast;
pub mod report;
pub mod validation;
pub mod pipeline;
pub mod error;
