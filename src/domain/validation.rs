//! Boundary parameter checks and configuration validation.
//!
//! Request parameters are rejected here with a descriptive error before any
//! analytics run.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Trim and upper-case a symbol; empty symbols are rejected.
pub fn normalize_symbol(raw: &str) -> Result<String, StockcastError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(StockcastError::validation("symbol", "symbol must not be empty"));
    }
    Ok(symbol)
}

/// Parse a forecast horizon supplied as text. Only positive integers pass.
pub fn parse_days(raw: &str) -> Result<i64, StockcastError> {
    let trimmed = raw.trim();
    let days: i64 = trimmed.parse().map_err(|_| {
        StockcastError::validation(
            "days",
            format!("'{trimmed}' is not a positive integer"),
        )
    })?;
    validate_days(days)?;
    Ok(days)
}

pub fn validate_days(days: i64) -> Result<(), StockcastError> {
    if days <= 0 {
        return Err(StockcastError::validation(
            "days",
            format!("must be a positive integer, got {days}"),
        ));
    }
    Ok(())
}

pub fn parse_initial_investment(raw: &str) -> Result<f64, StockcastError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        StockcastError::validation(
            "initial_investment",
            format!("'{trimmed}' is not a number"),
        )
    })?;
    validate_initial_investment(value)?;
    Ok(value)
}

pub fn validate_initial_investment(value: f64) -> Result<(), StockcastError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StockcastError::validation(
            "initial_investment",
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

pub fn validate_windows(short_window: usize, long_window: usize) -> Result<(), StockcastError> {
    if short_window == 0 {
        return Err(StockcastError::validation("short_window", "must be at least 1"));
    }
    if long_window == 0 {
        return Err(StockcastError::validation("long_window", "must be at least 1"));
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    validate_config_investment(config)?;
    validate_config_window(config, "short_window")?;
    validate_config_window(config, "long_window")?;
    Ok(())
}

pub fn validate_forecast_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    if let Some(raw) = config.get_string("forecast", "days") {
        parse_days(&raw).map_err(|e| StockcastError::ConfigInvalid {
            section: "forecast".to_string(),
            key: "days".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn validate_config_investment(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    if let Some(raw) = config.get_string("backtest", "initial_investment") {
        parse_initial_investment(&raw).map_err(|e| StockcastError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_investment".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn validate_config_window(config: &dyn ConfigPort, key: &str) -> Result<(), StockcastError> {
    let Some(raw) = config.get_string("backtest", key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 1 => Ok(()),
        _ => Err(StockcastError::ConfigInvalid {
            section: "backtest".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be a positive integer"),
        }),
    }
}
