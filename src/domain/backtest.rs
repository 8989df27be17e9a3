//! Moving-average crossover backtest.
//!
//! Walks indices 1..n, comparing the averages at i-1 with those at i. A
//! bullish crossover spends all cash on whole shares at the close; a bearish
//! crossover liquidates every share held. Repeated bullish signals keep
//! converting leftover cash; there is no "already long" guard.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::error::StockcastError;
use super::metrics::{max_drawdown_pct, total_return_pct, value_curve};
use super::moving_average::{
    DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, MovingAverageSeries, moving_averages,
};
use super::portfolio::{EquityPoint, Portfolio};
use super::price::PriceSeries;

/// Fewest points for which a crossover can be evaluated.
pub const MIN_BACKTEST_POINTS: usize = 2;

pub const DEFAULT_INITIAL_INVESTMENT: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_investment: f64,
    pub short_window: usize,
    pub long_window: usize,
}

impl BacktestConfig {
    pub fn new(initial_investment: f64) -> Self {
        BacktestConfig {
            initial_investment,
            ..Default::default()
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => f.pad("buy"),
            TradeType::Sell => f.pad("sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub price: f64,
    pub shares: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub initial_investment: f64,
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub trades: Vec<Trade>,
    pub final_cash: f64,
    pub final_holdings: i64,
    /// Final position marked to every historical close; drawdown is measured on it.
    pub value_curve: Vec<EquityPoint>,
}

/// Crossover detected between index `i - 1` and `i`. Always `None` at index 0.
pub fn crossover_signal(mas: &MovingAverageSeries, i: usize) -> Option<TradeType> {
    if i == 0 || i >= mas.len() {
        return None;
    }
    let short_prev = mas.short_mavg[i - 1];
    let long_prev = mas.long_mavg[i - 1];
    let short_curr = mas.short_mavg[i];
    let long_curr = mas.long_mavg[i];

    if short_prev <= long_prev && short_curr > long_curr {
        Some(TradeType::Buy)
    } else if short_prev >= long_prev && short_curr < long_curr {
        Some(TradeType::Sell)
    } else {
        None
    }
}

pub fn run_backtest(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockcastError> {
    if series.is_empty() {
        return Err(StockcastError::DataNotFound {
            symbol: series.symbol().to_string(),
        });
    }
    if series.len() < MIN_BACKTEST_POINTS {
        return Err(StockcastError::InsufficientData {
            symbol: series.symbol().to_string(),
            points: series.len(),
            minimum: MIN_BACKTEST_POINTS,
        });
    }

    let mas = moving_averages(series, config.short_window, config.long_window)?;
    let points = series.points();

    let mut portfolio = Portfolio::new(config.initial_investment);
    let mut portfolio_value = config.initial_investment;
    let mut trades = Vec::new();

    for (i, point) in points.iter().enumerate().skip(1) {
        let price = point.close;

        match crossover_signal(&mas, i) {
            Some(TradeType::Buy) => {
                let shares = portfolio.buy_all(price);
                log::debug!(
                    "{} {}: buy {} @ {:.2}",
                    series.symbol(),
                    point.date,
                    shares,
                    price
                );
                trades.push(Trade {
                    date: point.date,
                    trade_type: TradeType::Buy,
                    price,
                    shares,
                });
            }
            Some(TradeType::Sell) => {
                let shares = portfolio.sell_all(price);
                log::debug!(
                    "{} {}: sell {} @ {:.2}",
                    series.symbol(),
                    point.date,
                    shares,
                    price
                );
                trades.push(Trade {
                    date: point.date,
                    trade_type: TradeType::Sell,
                    price,
                    shares,
                });
            }
            None => {}
        }

        portfolio_value = portfolio.value(price);
    }

    let curve = value_curve(series, portfolio.holdings, portfolio.cash);

    Ok(BacktestResult {
        symbol: series.symbol().to_string(),
        initial_investment: config.initial_investment,
        final_portfolio_value: portfolio_value,
        total_return_pct: total_return_pct(config.initial_investment, portfolio_value),
        max_drawdown_pct: max_drawdown_pct(&curve),
        trades,
        final_cash: portfolio.cash,
        final_holdings: portfolio.holdings,
        value_curve: curve,
    })
}
