pub mod report;

use std::error::Error;
use std::path::Path;

use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::Serialize;

use crate::history::report::{Report, ReportKind, TradePoint};

/// One step of the simulator's audit trace. Records are append-only and never
/// mutated once written.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub date: NaiveDate,
    pub price: f64,
    /// None on the overrun record, where no action was processed.
    pub action: Option<f64>,
    pub shares_traded: u32,
    pub buy_signal_price: Option<f64>,
    pub sell_signal_price: Option<f64>,
    pub net_worth: f64,
    pub balance: f64,
    pub position: u32,
    pub reward: f64,
    pub raw_reward: f64,
    pub trade_cost: f64,
    pub profit_reward: f64,
    pub sharpe_bonus: f64,
    pub forced_stop_penalty: f64,
    pub forced_tp_penalty: f64,
    pub drawdown_penalty: f64,
    pub transaction_penalty: f64,
    pub holding_bonus: f64,
    pub favorable_hold_factor: f64,
    pub invalid_action_penalty: f64,
}

impl StepRecord {
    /// A record with every reward component zeroed, for paths that never
    /// reach reward composition (overrun guard, baseline strategies).
    pub fn blank(date: NaiveDate, price: f64) -> Self {
        StepRecord {
            date,
            price,
            action: None,
            shares_traded: 0,
            buy_signal_price: None,
            sell_signal_price: None,
            net_worth: 0.0,
            balance: 0.0,
            position: 0,
            reward: 0.0,
            raw_reward: 0.0,
            trade_cost: 0.0,
            profit_reward: 0.0,
            sharpe_bonus: 0.0,
            forced_stop_penalty: 0.0,
            forced_tp_penalty: 0.0,
            drawdown_penalty: 0.0,
            transaction_penalty: 0.0,
            holding_bonus: 0.0,
            favorable_hold_factor: 0.0,
            invalid_action_penalty: 0.0,
        }
    }
}

/// Ordered trace of an episode plus the buy/sell markers keyed by data index.
#[derive(Debug, Default)]
pub struct EpisodeHistory {
    pub records: Vec<StepRecord>,
    pub buys: HashMap<usize, (f64, u32)>,
    pub sells: HashMap<usize, (f64, u32)>,
    pub total_trade_costs: f64,
}

impl EpisodeHistory {
    pub fn new() -> Self {
        EpisodeHistory::default()
    }

    pub fn push(&mut self, record: StepRecord) {
        self.total_trade_costs += record.trade_cost;
        self.records.push(record);
    }

    pub fn mark_buy(&mut self, step: usize, price: f64, shares: u32) {
        self.buys.insert(step, (price, shares));
    }

    pub fn mark_sell(&mut self, step: usize, price: f64, shares: u32) {
        self.sells.insert(step, (price, shares));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn net_worths(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.net_worth).collect()
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.records.iter().map(|r| r.reward).sum()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Compact binary reports for the chart viewer, one file per series kind.
    pub fn write_reports(&self, dir: impl AsRef<Path>) -> std::io::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let rewards = Report {
            title: "Reward".to_string(),
            x_label: Some("Step".to_string()),
            y_label: Some("Reward".to_string()),
            kind: ReportKind::Simple {
                values: self.records.iter().map(|r| r.reward as f32).collect(),
            },
        };
        report::write_report(&dir.join("rewards.report.bin"), &rewards)?;

        let positioned: Vec<f32> = self
            .records
            .iter()
            .map(|r| (r.position as f64 * r.price) as f32)
            .collect();
        let assets = Report {
            title: "Assets".to_string(),
            x_label: Some("Step".to_string()),
            y_label: Some("Value".to_string()),
            kind: ReportKind::Assets {
                total: self.records.iter().map(|r| r.net_worth as f32).collect(),
                cash: self.records.iter().map(|r| r.balance as f32).collect(),
                positioned,
            },
        };
        report::write_report(&dir.join("assets.report.bin"), &assets)?;

        let buy_sell = Report {
            title: "Buy Sell".to_string(),
            x_label: Some("Step".to_string()),
            y_label: Some("Price".to_string()),
            kind: ReportKind::BuySell {
                prices: self.records.iter().map(|r| r.price as f32).collect(),
                buys: trade_points(&self.buys),
                sells: trade_points(&self.sells),
            },
        };
        report::write_report(&dir.join("buy_sell.report.bin"), &buy_sell)
    }
}

fn trade_points(marks: &HashMap<usize, (f64, u32)>) -> Vec<TradePoint> {
    let mut points: Vec<TradePoint> = marks
        .iter()
        .map(|(&index, &(price, quantity))| TradePoint {
            index: index as u32,
            price: price as f32,
            quantity,
        })
        .collect();
    points.sort_by_key(|p| p.index);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn push_accumulates_costs_in_order() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let mut history = EpisodeHistory::new();

        let mut first = StepRecord::blank(date, 100.0);
        first.trade_cost = 5.0;
        first.net_worth = 100_000.0;
        history.push(first);

        let mut second = StepRecord::blank(date, 101.0);
        second.trade_cost = 2.5;
        second.net_worth = 100_500.0;
        history.push(second);

        assert_eq!(history.len(), 2);
        assert!((history.total_trade_costs - 7.5).abs() < 1e-12);
        assert_eq!(history.net_worths(), vec![100_000.0, 100_500.0]);
    }

    #[test]
    fn trade_marks_key_by_data_index() {
        let mut history = EpisodeHistory::new();
        history.mark_buy(3, 100.0, 10);
        history.mark_sell(7, 110.0, 10);
        assert_eq!(history.buys[&3], (100.0, 10));
        assert_eq!(history.sells[&7], (110.0, 10));
    }
}
