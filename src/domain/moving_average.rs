//! Short/long simple moving averages over closing prices.
//!
//! O(n) sliding window with a compensated running sum. Element i is the mean of the trailing `window` closes
//! ending at i; while fewer than `window` closes exist the mean is taken over
//! all of them (minimum periods = 1), so no index is ever without a value.

use super::error::StockcastError;
use super::price::PriceSeries;

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

/// Parallel averages aligned index-for-index with a `PriceSeries`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageSeries {
    pub short_window: usize,
    pub long_window: usize,
    pub short_mavg: Vec<f64>,
    pub long_mavg: Vec<f64>,
}

impl MovingAverageSeries {
    pub fn len(&self) -> usize {
        self.short_mavg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short_mavg.is_empty()
    }
}

pub fn moving_averages(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<MovingAverageSeries, StockcastError> {
    if short_window == 0 {
        return Err(StockcastError::validation(
            "short_window",
            "window must be at least 1",
        ));
    }
    if long_window == 0 {
        return Err(StockcastError::validation(
            "long_window",
            "window must be at least 1",
        ));
    }

    let closes = series.closes();
    Ok(MovingAverageSeries {
        short_window,
        long_window,
        short_mavg: rolling_mean(&closes, short_window),
        long_mavg: rolling_mean(&closes, long_window),
    })
}

/// Trailing mean with a shrinking window at the start of `values`.
///
/// The window sum is Kahan-compensated on both the add and the remove side.
/// When the trailing run of identical values covers the whole window the
/// mean is that value exactly, so flat stretches give equal averages for
/// every window length.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = KahanSum::default();
    let mut run = 0usize;

    for (i, &value) in values.iter().enumerate() {
        sum.add(value);
        if i >= window {
            sum.add(-values[i - window]);
        }
        run = if i > 0 && values[i - 1] == value { run + 1 } else { 1 };

        let count = (i + 1).min(window);
        if run >= count {
            out.push(value);
        } else {
            out.push(sum.value() / count as f64);
        }
    }

    out
}

#[derive(Debug, Default, Clone, Copy)]
struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum
    }
}
