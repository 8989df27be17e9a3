//! Return and drawdown statistics.

use super::portfolio::EquityPoint;
use super::price::PriceSeries;

/// Percentage gain of `final_value` over `initial`. Zero when `initial` is not positive.
pub fn total_return_pct(initial: f64, final_value: f64) -> f64 {
    if initial > 0.0 {
        (final_value - initial) / initial * 100.0
    } else {
        0.0
    }
}

/// Value curve of a fixed position (`holdings` shares plus `cash`) marked to
/// every close in the series.
///
/// Used with the final position of a backtest: the curve does not replay the
/// holdings that were actually held at each historical date.
pub fn value_curve(series: &PriceSeries, holdings: i64, cash: f64) -> Vec<EquityPoint> {
    series
        .points()
        .iter()
        .map(|p| EquityPoint {
            date: p.date,
            value: p.close * holdings as f64 + cash,
        })
        .collect()
}

/// Largest peak-to-trough decline of `curve`, in percent of the running peak.
pub fn max_drawdown_pct(curve: &[EquityPoint]) -> f64 {
    let Some(first) = curve.first() else {
        return 0.0;
    };

    let mut peak = first.value;
    let mut max_dd = 0.0_f64;

    for point in curve {
        if point.value > peak {
            peak = point.value;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd * 100.0
}
