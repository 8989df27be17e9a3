//! Cash/holdings accumulator for a single-symbol, all-in/all-out simulation.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings: i64,
}

impl Portfolio {
    pub fn new(initial_investment: f64) -> Self {
        Portfolio {
            cash: initial_investment,
            holdings: 0,
        }
    }

    /// Convert all available cash into whole shares at `price`.
    ///
    /// Returns the number of shares bought, which may be zero when cash is
    /// below one share's price.
    pub fn buy_all(&mut self, price: f64) -> i64 {
        let shares = (self.cash / price).floor() as i64;
        self.cash -= shares as f64 * price;
        self.holdings += shares;
        shares
    }

    /// Liquidate every share held at `price`. Returns the shares sold.
    pub fn sell_all(&mut self, price: f64) -> i64 {
        let shares = self.holdings;
        self.cash += shares as f64 * price;
        self.holdings = 0;
        shares
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.holdings as f64 * price
    }
}
