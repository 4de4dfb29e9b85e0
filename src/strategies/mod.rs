pub mod baselines;
pub mod random;

pub use baselines::{bollinger_breakout, buy_and_hold, ma_crossover, macd_crossover};
pub use random::random_strategy;

use crate::history::EpisodeHistory;

/// Result of replaying one rule strategy over a feature table.
#[derive(Debug)]
pub struct StrategyOutcome {
    pub name: &'static str,
    pub initial_balance: f64,
    pub final_net_worth: f64,
    pub profit: f64,
    pub transaction_count: u32,
    pub history: EpisodeHistory,
}

/// Shares purchasable with `fraction` of the balance at the given price,
/// with the cost-adjusted total. None when nothing is affordable.
pub(crate) fn affordable_shares(
    balance: f64,
    price: f64,
    fraction: f64,
    transaction_cost: f64,
) -> Option<(u32, f64)> {
    if price <= 0.0 {
        return None;
    }
    let shares = (balance * fraction / price).floor() as u32;
    if shares == 0 {
        return None;
    }
    let total_cost = shares as f64 * price * (1.0 + transaction_cost);
    if total_cost > balance {
        return None;
    }
    Some((shares, total_cost))
}

/// Cost-adjusted proceeds of selling `shares` at `price`.
pub(crate) fn sale_proceeds(shares: u32, price: f64, transaction_cost: f64) -> f64 {
    shares as f64 * price * (1.0 - transaction_cost)
}
