//! CSV export of the trade tape held in stored records.
//!
//! One row per (day, session, trade spec) with a simulated outcome. Days and
//! sessions without a breakout produce no row.

use std::io::Write;

use thiserror::Error;

use crate::record::DailyFeatureRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write: {0}")]
    Csv(#[from] csv::Error),

    #[error("flush: {0}")]
    Io(#[from] std::io::Error),
}

const HEADER: [&str; 17] = [
    "trading_day",
    "session",
    "trade_spec",
    "direction",
    "breakout_ts",
    "breakout_close",
    "range_high",
    "range_low",
    "entry",
    "stop",
    "target",
    "outcome",
    "r_multiple",
    "exit_ts",
    "tie_break",
    "net_r",
    "cost_flip",
];

fn fmt_price(v: f64) -> String {
    format!("{v:.6}")
}

/// Write the trade tape of `records` as CSV. Returns the number of rows.
pub fn write_trades_csv<W: Write>(records: &[DailyFeatureRecord], writer: W) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    let mut rows = 0;
    for record in records {
        for row in record.trades() {
            let (Some(breakout), Some(outcome)) = (row.trade.breakout, row.trade.outcome) else {
                continue;
            };
            let (range_high, range_low) = row
                .features
                .range
                .map(|r| (fmt_price(r.high), fmt_price(r.low)))
                .unwrap_or_default();
            let (net_r, cost_flip) = row
                .trade
                .net
                .map(|n| (format!("{:.6}", n.r_multiple), n.cost_flip.to_string()))
                .unwrap_or_default();
            wtr.write_record([
                row.trading_day.to_string(),
                row.session.to_string(),
                row.trade_spec.to_string(),
                format!("{:?}", breakout.direction).to_uppercase(),
                breakout.ts.to_rfc3339(),
                fmt_price(breakout.close),
                range_high,
                range_low,
                fmt_price(outcome.entry),
                fmt_price(outcome.stop),
                fmt_price(outcome.target),
                format!("{:?}", outcome.kind).to_uppercase(),
                format!("{:.6}", outcome.r_multiple),
                outcome.exit_ts.map(|t| t.to_rfc3339()).unwrap_or_default(),
                outcome.tie_break.to_string(),
                net_r,
                cost_flip,
            ])?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}
