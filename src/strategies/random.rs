use rand::rngs::StdRng;
use rand::Rng;

use crate::history::{EpisodeHistory, StepRecord};
use crate::types::FeatureRow;

use super::{affordable_shares, sale_proceeds, StrategyOutcome};

/// Coin-flip baseline: buy, sell everything, or hold with equal probability
/// at every row. Takes its RNG from the caller so runs are reproducible and
/// independent across threads.
pub fn random_strategy(
    rows: &[FeatureRow],
    initial_balance: f64,
    transaction_cost: f64,
    max_position_size: f64,
    rng: &mut StdRng,
) -> StrategyOutcome {
    let mut balance = initial_balance;
    let mut holdings: u32 = 0;
    let mut transactions = 0;
    let mut last_buy_price = 0.0;
    let mut history = EpisodeHistory::new();

    for (idx, row) in rows.iter().enumerate().skip(1) {
        let mut record = StepRecord::blank(row.date, row.close);

        match rng.gen_range(0..3u8) {
            0 => {
                let Some((shares, total_cost)) =
                    affordable_shares(balance, row.close, max_position_size, transaction_cost)
                else {
                    continue;
                };
                balance -= total_cost;
                holdings += shares;
                transactions += 1;
                last_buy_price = row.close;
                history.mark_buy(idx, row.close, shares);

                record.action = Some(1.0);
                record.shares_traded = shares;
                record.buy_signal_price = Some(row.close);
                record.trade_cost = shares as f64 * row.close * transaction_cost;
            }
            1 => {
                if holdings == 0 {
                    continue;
                }
                let shares = holdings;
                balance += sale_proceeds(shares, row.close, transaction_cost);
                holdings = 0;
                transactions += 1;
                history.mark_sell(idx, row.close, shares);

                record.action = Some(-1.0);
                record.shares_traded = shares;
                record.sell_signal_price = Some(row.close);
                record.trade_cost = shares as f64 * row.close * transaction_cost;
                record.reward = (row.close - last_buy_price) * shares as f64 / initial_balance;
            }
            _ => {
                record.action = Some(0.0);
            }
        }

        record.net_worth = balance + holdings as f64 * row.close;
        record.balance = balance;
        record.position = holdings;
        history.push(record);
    }

    // flatten whatever the coin left open
    if holdings > 0 {
        if let Some(last) = rows.last() {
            let shares = holdings;
            balance += sale_proceeds(shares, last.close, transaction_cost);
            transactions += 1;
            history.mark_sell(rows.len() - 1, last.close, shares);

            let mut record = StepRecord::blank(last.date, last.close);
            record.action = Some(-1.0);
            record.shares_traded = shares;
            record.sell_signal_price = Some(last.close);
            record.trade_cost = shares as f64 * last.close * transaction_cost;
            record.net_worth = balance;
            record.balance = balance;
            record.reward = (last.close - last_buy_price) * shares as f64 / initial_balance;
            history.push(record);
        }
    }

    StrategyOutcome {
        name: "Random",
        initial_balance,
        final_net_worth: balance,
        profit: balance - initial_balance,
        transaction_count: transactions,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Feature;
    use chrono::NaiveDate;
    use enum_map::enum_map;
    use rand::SeedableRng;

    fn rows(n: usize) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        (0..n)
            .map(|i| FeatureRow {
                date: start + chrono::Days::new(i as u64),
                close: 100.0 + (i as f64 * 0.3).sin() * 5.0,
                scaled: enum_map! { _ => 0.0 },
                unscaled: enum_map! { Feature::Close => 100.0, _ => 0.0 },
            })
            .collect()
    }

    #[test]
    fn same_seed_same_trades() {
        let rows = rows(120);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        let first = random_strategy(&rows, 100_000.0, 0.001, 0.5, &mut a);
        let second = random_strategy(&rows, 100_000.0, 0.001, 0.5, &mut b);

        assert_eq!(first.final_net_worth, second.final_net_worth);
        assert_eq!(first.transaction_count, second.transaction_count);
    }

    #[test]
    fn ends_flat_with_non_negative_balance() {
        let rows = rows(200);
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = random_strategy(&rows, 100_000.0, 0.001, 0.5, &mut rng);

        assert!(outcome.final_net_worth > 0.0);
        let last = outcome.history.records.last().unwrap();
        assert_eq!(last.position, 0);
    }
}
