// Ranking and tier grouping for a finished scan.
use crate::model::{Category, TickerSnapshot};
use tracing::info;

/// Sorts by relative volume, highest first.
pub fn rank(mut snapshots: Vec<TickerSnapshot>) -> Vec<TickerSnapshot> {
    snapshots.sort_by(|a, b| b.relative_volume.total_cmp(&a.relative_volume));
    snapshots
}

/// Snapshots grouped by alert tier, each group keeping rank order.
#[derive(Debug, Default)]
pub struct Tiers {
    pub surge: Vec<TickerSnapshot>,
    pub momentum: Vec<TickerSnapshot>,
    pub quiet: Vec<TickerSnapshot>,
}

impl Tiers {
    pub fn split(ranked: Vec<TickerSnapshot>) -> Self {
        let mut tiers = Self::default();
        for snapshot in ranked {
            match snapshot.category {
                Category::Surge => tiers.surge.push(snapshot),
                Category::Momentum => tiers.momentum.push(snapshot),
                Category::Quiet => tiers.quiet.push(snapshot),
            }
        }
        tiers
    }

    pub fn has_surge(&self) -> bool {
        !self.surge.is_empty()
    }

    pub fn len(&self) -> usize {
        self.surge.len() + self.momentum.len() + self.quiet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn flag(on: bool) -> char {
    if on { '+' } else { '-' }
}

/// One aligned line per snapshot: symbol, price, %chg, rvol, rsi, ema/macd/200/vwap flags, earnings.
pub fn format_row(s: &TickerSnapshot) -> String {
    format!(
        "{:<6} {:>10.2} {:>+7.2}% {:>6.2}x rsi {:>5.1} ema{} macd{} 200{} vwap{} earn {}",
        s.symbol,
        s.price,
        s.pct_change,
        s.relative_volume,
        s.rsi,
        flag(s.ema_cross_up),
        flag(s.macd_cross_up),
        flag(s.above_ema200),
        flag(s.above_vwap),
        s.earnings_label
    )
}

pub fn log_report(tiers: &Tiers) {
    let groups = [
        ("Surge", &tiers.surge),
        ("Momentum", &tiers.momentum),
        ("Quiet", &tiers.quiet),
    ];
    for (title, rows) in groups {
        info!("── {} ({}) ──", title, rows.len());
        for row in rows.iter() {
            info!("{}", format_row(row));
        }
    }
}
