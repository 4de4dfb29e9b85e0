//! Deterministic rule strategies evaluated for comparison with the simulator.
//!
//! Each replays the same cost-adjusted bookkeeping as the trade executor.
//! Buys commit a fixed fraction of cash rounded down to whole shares, sells
//! release the entire holding. Any position left at the end of the data is
//! liquidated at the final price.

use crate::history::{EpisodeHistory, StepRecord};
use crate::types::{Feature, FeatureRow};

use super::{affordable_shares, sale_proceeds, StrategyOutcome};

struct Book {
    balance: f64,
    holdings: u32,
    transaction_cost: f64,
    transactions: u32,
    initial_balance: f64,
    last_buy_price: f64,
    history: EpisodeHistory,
}

impl Book {
    fn new(initial_balance: f64, transaction_cost: f64) -> Self {
        Book {
            balance: initial_balance,
            holdings: 0,
            transaction_cost,
            transactions: 0,
            initial_balance,
            last_buy_price: 0.0,
            history: EpisodeHistory::new(),
        }
    }

    fn buy(&mut self, index: usize, row: &FeatureRow, fraction: f64) {
        let Some((shares, total_cost)) =
            affordable_shares(self.balance, row.close, fraction, self.transaction_cost)
        else {
            return;
        };

        self.balance -= total_cost;
        self.holdings += shares;
        self.transactions += 1;
        self.last_buy_price = row.close;
        self.history.mark_buy(index, row.close, shares);

        let mut record = StepRecord::blank(row.date, row.close);
        record.action = Some(1.0);
        record.shares_traded = shares;
        record.buy_signal_price = Some(row.close);
        record.trade_cost = shares as f64 * row.close * self.transaction_cost;
        record.net_worth = self.balance + self.holdings as f64 * row.close;
        record.balance = self.balance;
        record.position = self.holdings;
        self.history.push(record);
    }

    fn sell_all(&mut self, index: usize, row: &FeatureRow) {
        if self.holdings == 0 {
            return;
        }
        let shares = self.holdings;
        let proceeds = sale_proceeds(shares, row.close, self.transaction_cost);
        self.balance += proceeds;
        self.holdings = 0;
        self.transactions += 1;
        self.history.mark_sell(index, row.close, shares);

        let profit = (row.close - self.last_buy_price) * shares as f64;
        let mut record = StepRecord::blank(row.date, row.close);
        record.action = Some(-1.0);
        record.shares_traded = shares;
        record.sell_signal_price = Some(row.close);
        record.trade_cost = shares as f64 * row.close * self.transaction_cost;
        record.net_worth = self.balance;
        record.balance = self.balance;
        record.reward = profit / self.initial_balance;
        self.history.push(record);
    }

    fn finish(mut self, name: &'static str, rows: &[FeatureRow]) -> StrategyOutcome {
        if let Some(last) = rows.last() {
            self.sell_all(rows.len() - 1, last);
        }
        StrategyOutcome {
            name,
            initial_balance: self.initial_balance,
            final_net_worth: self.balance,
            profit: self.balance - self.initial_balance,
            transaction_count: self.transactions,
            history: self.history,
        }
    }
}

pub fn buy_and_hold(
    rows: &[FeatureRow],
    initial_balance: f64,
    transaction_cost: f64,
) -> StrategyOutcome {
    let mut book = Book::new(initial_balance, transaction_cost);
    if let Some(first) = rows.first() {
        book.buy(0, first, 1.0);
    }
    book.finish("Buy and Hold", rows)
}

/// Buy when SMA10 crosses above SMA50, flatten when it crosses back below.
pub fn ma_crossover(
    rows: &[FeatureRow],
    initial_balance: f64,
    transaction_cost: f64,
    max_position_size: f64,
) -> StrategyOutcome {
    let mut book = Book::new(initial_balance, transaction_cost);

    for (idx, pair) in rows.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let prev_fast = prev.unscaled[Feature::Sma10];
        let prev_slow = prev.unscaled[Feature::Sma50];
        let fast = current.unscaled[Feature::Sma10];
        let slow = current.unscaled[Feature::Sma50];

        if prev_fast < prev_slow && fast > slow {
            book.buy(idx + 1, current, max_position_size);
        } else if prev_fast > prev_slow && fast < slow {
            book.sell_all(idx + 1, current);
        }
    }
    book.finish("Moving Average Crossover", rows)
}

/// Buy when the MACD line crosses above zero, flatten when it crosses below.
pub fn macd_crossover(
    rows: &[FeatureRow],
    initial_balance: f64,
    transaction_cost: f64,
    max_position_size: f64,
) -> StrategyOutcome {
    let mut book = Book::new(initial_balance, transaction_cost);

    for (idx, pair) in rows.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let prev_macd = prev.unscaled[Feature::Macd];
        let macd = current.unscaled[Feature::Macd];

        if prev_macd < 0.0 && macd > 0.0 {
            book.buy(idx + 1, current, max_position_size);
        } else if prev_macd > 0.0 && macd < 0.0 {
            book.sell_all(idx + 1, current);
        }
    }
    book.finish("MACD Crossover", rows)
}

/// Mean-reversion on the Bollinger bands: buy a close crossing below the
/// lower band, flatten one crossing above the upper band.
pub fn bollinger_breakout(
    rows: &[FeatureRow],
    initial_balance: f64,
    transaction_cost: f64,
    max_position_size: f64,
) -> StrategyOutcome {
    let mut book = Book::new(initial_balance, transaction_cost);

    for (idx, pair) in rows.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let prev_lower = prev.unscaled[Feature::BbLower];
        let prev_upper = prev.unscaled[Feature::BbUpper];
        let lower = current.unscaled[Feature::BbLower];
        let upper = current.unscaled[Feature::BbUpper];

        if prev.close >= prev_lower && current.close < lower {
            book.buy(idx + 1, current, max_position_size);
        } else if prev.close <= prev_upper && current.close > upper {
            book.sell_all(idx + 1, current);
        }
    }
    book.finish("Bollinger Bands", rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use enum_map::enum_map;

    fn row(day: u64, close: f64) -> FeatureRow {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        FeatureRow {
            date: start + chrono::Days::new(day),
            close,
            scaled: enum_map! { _ => 0.0 },
            unscaled: enum_map! { Feature::Close => close, _ => 0.0 },
        }
    }

    #[test]
    fn buy_and_hold_captures_the_full_move() {
        let mut rows: Vec<FeatureRow> = (0..10).map(|i| row(i, 100.0)).collect();
        rows[9].close = 120.0;

        let outcome = buy_and_hold(&rows, 100_000.0, 0.0);

        // 1000 shares bought at 100, sold at 120
        assert!((outcome.final_net_worth - 120_000.0).abs() < 1e-9);
        assert!((outcome.profit - 20_000.0).abs() < 1e-9);
        assert_eq!(outcome.transaction_count, 2);
        assert_eq!(outcome.history.buys[&0], (100.0, 1000));
    }

    #[test]
    fn ma_crossover_trades_on_the_cross() {
        let mut rows: Vec<FeatureRow> = (0..6).map(|i| row(i, 100.0)).collect();
        // fast below slow, then above (buy at idx 2), then below (sell at idx 4)
        let fast = [90.0, 90.0, 110.0, 110.0, 90.0, 90.0];
        let slow = [100.0; 6];
        for (i, r) in rows.iter_mut().enumerate() {
            r.unscaled[Feature::Sma10] = fast[i];
            r.unscaled[Feature::Sma50] = slow[i];
        }
        rows[4].close = 110.0;

        let outcome = ma_crossover(&rows, 100_000.0, 0.0, 0.5);

        assert!(outcome.history.buys.contains_key(&2));
        assert!(outcome.history.sells.contains_key(&4));
        // 500 shares bought at 100, sold at 110
        assert!((outcome.profit - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn macd_crossover_waits_for_the_zero_line() {
        let mut rows: Vec<FeatureRow> = (0..6).map(|i| row(i, 50.0)).collect();
        let macd = [-1.0, -0.5, 0.5, 1.0, -0.2, -0.4];
        for (i, r) in rows.iter_mut().enumerate() {
            r.unscaled[Feature::Macd] = macd[i];
        }

        let outcome = macd_crossover(&rows, 10_000.0, 0.0, 1.0);

        assert!(outcome.history.buys.contains_key(&2));
        assert!(outcome.history.sells.contains_key(&4));
        assert_eq!(outcome.history.buys.len(), 1);
    }

    #[test]
    fn bollinger_buys_the_lower_band_break() {
        let mut rows: Vec<FeatureRow> = (0..5).map(|i| row(i, 100.0)).collect();
        for r in rows.iter_mut() {
            r.unscaled[Feature::BbLower] = 95.0;
            r.unscaled[Feature::BbUpper] = 105.0;
        }
        rows[2].close = 94.0; // crosses below the lower band
        rows[4].close = 106.0; // crosses above the upper band

        let outcome = bollinger_breakout(&rows, 100_000.0, 0.001, 0.5);

        assert!(outcome.history.buys.contains_key(&2));
        assert!(outcome.history.sells.contains_key(&4));
        assert!(outcome.profit > 0.0);
    }

    #[test]
    fn costs_reduce_the_round_trip() {
        let rows: Vec<FeatureRow> = (0..10).map(|i| row(i, 100.0)).collect();
        let free = buy_and_hold(&rows, 100_000.0, 0.0);
        let costly = buy_and_hold(&rows, 100_000.0, 0.001);
        assert!(costly.final_net_worth < free.final_net_worth);
    }
}
