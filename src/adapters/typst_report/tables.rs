//! Typst tables for report summaries, trade logs and predictions.

use crate::domain::backtest::{Trade, TradeType};
use crate::domain::forecast::PredictionPoint;

/// Two-column field/value table.
pub fn format_summary_table(rows: &[(&str, String)]) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Field*], [*Value*],\n");
    for (field, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", field, escape(value)));
    }
    out.push_str(")\n\n");
    out
}

pub fn format_trade_log(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "_No trades executed._\n\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 5,\n  align: (right, left, left, right, right),\n");
    out.push_str("  [*#*], [*Date*], [*Type*], [*Price*], [*Shares*],\n");

    for (i, trade) in trades.iter().enumerate() {
        let color = match trade.trade_type {
            TradeType::Buy => "green",
            TradeType::Sell => "red",
        };
        out.push_str(&format!(
            "  [{}], [{}], text(fill: {}, [{}]), [{:.2}], [{}],\n",
            i + 1,
            trade.date.format("%Y-%m-%d"),
            color,
            trade.trade_type,
            trade.price,
            trade.shares
        ));
    }

    out.push_str(")\n\n");
    out
}

pub fn format_prediction_table(predictions: &[PredictionPoint]) -> String {
    if predictions.is_empty() {
        return "_No predictions._\n\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Date*], [*Predicted Price*],\n");
    for p in predictions {
        out.push_str(&format!(
            "  [{}], [{:.2}],\n",
            p.date.format("%Y-%m-%d"),
            p.predicted_price
        ));
    }
    out.push_str(")\n\n");
    out
}

/// Escape characters with markup meaning inside Typst content blocks.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '#' | '[' | ']' | '$' | '*' | '_' | '\\' | '@' | '<') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
