//! Fixed-horizon exit evaluation for triggered entry events.
//!
//! A position is assumed entered at the close of each bar whose entry signal
//! fires, and exited at the close exactly H bars later. Entries without H
//! future bars remain open at series end and are reported separately, never
//! force-exited.

use crate::domain::bar::Bar;
use crate::domain::features::FeatureTable;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct ClosedTrade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_close: f64,
    pub exit_close: f64,
}

impl ClosedTrade {
    pub fn pnl(&self) -> f64 {
        self.exit_close - self.entry_close
    }

    pub fn return_pct(&self) -> f64 {
        (self.exit_close - self.entry_close) / self.entry_close
    }

    pub fn is_win(&self) -> bool {
        self.pnl() > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct OpenTrade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_close: f64,
    /// Bars elapsed since entry at series end, all short of the horizon.
    pub bars_held: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TradeSummary {
    pub closed: Vec<ClosedTrade>,
    pub open: Vec<OpenTrade>,
    pub horizon: usize,
}

impl TradeSummary {
    /// Fraction of closed trades with positive P&L. `None` (not zero) when
    /// there are no closed trades.
    pub fn win_ratio(&self) -> Option<f64> {
        if self.closed.is_empty() {
            return None;
        }
        let wins = self.closed.iter().filter(|t| t.is_win()).count();
        Some(wins as f64 / self.closed.len() as f64)
    }

    pub fn total_pnl(&self) -> f64 {
        self.closed.iter().map(ClosedTrade::pnl).sum()
    }
}

/// Evaluate every bar whose configured entry signal fired.
pub fn evaluate_trades(bars: &[Bar], table: &FeatureTable, horizon: usize) -> TradeSummary {
    let mut summary = TradeSummary {
        horizon,
        ..TradeSummary::default()
    };
    if horizon == 0 {
        return summary;
    }

    for row in &table.rows {
        if !row.entry_signal {
            continue;
        }
        let entry = &bars[row.index];
        match bars.get(row.index + horizon) {
            Some(exit) => summary.closed.push(ClosedTrade {
                ticker: entry.ticker.clone(),
                entry_date: entry.date,
                exit_date: exit.date,
                entry_close: entry.close,
                exit_close: exit.close,
            }),
            None => summary.open.push(OpenTrade {
                ticker: entry.ticker.clone(),
                entry_date: entry.date,
                entry_close: entry.close,
                bars_held: bars.len() - 1 - row.index,
            }),
        }
    }

    summary
}
