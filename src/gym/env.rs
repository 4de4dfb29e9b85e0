use std::collections::VecDeque;

use colored::Colorize;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::reward::{
    BANKRUPTCY_PENALTY, INVALID_ACTION_PENALTY, MIN_STEPS, OUT_OF_BOUNDS_PENALTY, OVERRUN_PENALTY,
    RETURNS_WINDOW,
};
use crate::gym::config::EnvConfig;
use crate::gym::reward::{RewardBreakdown, RewardNormalizer};
use crate::history::{EpisodeHistory, StepRecord};
use crate::types::{FeatureRow, MarketPhase};

/// What a single `step` call hands back to the policy.
#[derive(Debug)]
pub struct StepResult {
    pub observation: Vec<f32>,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    /// Auxiliary diagnostics; empty in this environment, reserved for wrappers.
    pub info: HashMap<String, f64>,
}

/// Single-asset trading environment over a pre-computed feature table.
///
/// A deterministic step-indexed state machine. Each step executes the agent's
/// continuous action in [-1, 1] against the portfolio, applies the drawdown
/// liquidation rules on top, and returns the shaped, EMA-normalized reward.
/// Each instance owns all of its state, including its RNG, so parallel
/// rollouts never share anything.
pub struct TradingEnv {
    pub(super) rows: Vec<FeatureRow>,
    pub(super) config: EnvConfig,

    pub balance: f64,
    pub position: u32,
    pub net_worth: f64,
    pub(super) prev_net_worth: f64,
    pub peak: f64,
    pub transaction_count: u32,
    pub current_step: usize,
    // Counts steps spent above the trailing-stop trigger; reset on forced
    // liquidation, read by nothing yet (see EnvConfig).
    pub(super) consecutive_drawdown_steps: u32,

    pub(super) returns_window: VecDeque<f64>,
    pub(super) normalizer: RewardNormalizer,
    pub history: EpisodeHistory,

    rng: StdRng,
}

impl TradingEnv {
    pub fn new(rows: Vec<FeatureRow>, config: EnvConfig, seed: u64) -> Result<Self, String> {
        config.validate()?;
        if rows.is_empty() {
            return Err("feature table is empty".to_string());
        }

        let mut env = TradingEnv {
            balance: config.initial_balance,
            position: 0,
            net_worth: config.initial_balance,
            prev_net_worth: config.initial_balance,
            peak: config.initial_balance,
            transaction_count: 0,
            current_step: 0,
            consecutive_drawdown_steps: 0,
            returns_window: VecDeque::with_capacity(RETURNS_WINDOW),
            normalizer: RewardNormalizer::new(&config.reward_weights),
            history: EpisodeHistory::new(),
            rng: StdRng::seed_from_u64(seed),
            rows,
            config,
        };
        env.reset();
        Ok(env)
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Fixed observation length: features, scaled account metrics, market
    /// phase one-hot, drawdown telemetry.
    pub fn observation_len(&self) -> usize {
        crate::types::Feature::COUNT + 3 + MarketPhase::ALL.len() + 2
    }

    /// Uniform action from the declared action space, drawn from this
    /// instance's own RNG.
    pub fn sample_action(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }

    /// Reinitialize the portfolio and statistics and return the initial
    /// observation. Must be called after a terminal step before stepping again.
    pub fn reset(&mut self) -> Vec<f32> {
        self.balance = self.config.initial_balance;
        self.position = 0;
        self.net_worth = self.config.initial_balance;
        self.prev_net_worth = self.config.initial_balance;
        self.peak = self.config.initial_balance;
        self.transaction_count = 0;
        self.current_step = 0;
        self.consecutive_drawdown_steps = 0;
        self.returns_window.clear();
        self.normalizer.reset();
        self.history = EpisodeHistory::new();
        self.next_observation()
    }

    pub fn step(&mut self, action: f64) -> StepResult {
        // An action outside the declared bounds breaks the environment
        // contract: terminal, nothing mutated.
        if !action.is_finite() || !(-1.0..=1.0).contains(&action) {
            let observation = self.next_observation();
            return StepResult {
                observation,
                reward: OUT_OF_BOUNDS_PENALTY,
                terminated: true,
                truncated: false,
                info: HashMap::new(),
            };
        }

        // Overrun guard: the step index should never pass the last row while
        // an episode is live. Log the last known state unchanged and bail.
        if self.current_step >= self.rows.len() {
            let observation = self.next_observation();
            let row = &self.rows[self.current_step];
            let mut record = StepRecord::blank(row.date, row.close);
            record.net_worth = self.net_worth;
            record.balance = self.balance;
            record.position = self.position;
            record.reward = OVERRUN_PENALTY;
            record.raw_reward = OVERRUN_PENALTY;
            self.history.push(record);
            eprintln!(
                "{}",
                format!("step index ran past the end of the data at {}", self.current_step).red()
            );
            return StepResult {
                observation,
                reward: OVERRUN_PENALTY,
                terminated: true,
                truncated: false,
                info: HashMap::new(),
            };
        }

        let row = self.rows[self.current_step];
        let price = row.close;

        let trade = self.execute_action(action, price);

        // Post-trade, pre-liquidation net worth anchors the profit delta, the
        // stop/take-profit penalties, and the Sharpe window.
        let net_worth = self.balance + self.position as f64 * price;
        let net_worth_change = net_worth - self.prev_net_worth;
        let step_return = net_worth_change / self.config.initial_balance;

        let weights = self.config.reward_weights;
        let profit_reward = step_return * weights.profit_weight;
        let forced_stop_penalty = if net_worth <= self.config.initial_balance * self.config.stop_loss
            && self.position > 0
        {
            crate::constants::reward::FORCED_STOP_PENALTY
        } else {
            0.0
        };
        let forced_tp_penalty = if net_worth
            >= self.config.initial_balance * self.config.take_profit
            && self.position > 0
        {
            crate::constants::reward::FORCED_TP_PENALTY
        } else {
            0.0
        };
        let sharpe_bonus = self.sharpe_bonus(step_return);

        let risk = self.apply_risk_controls(net_worth, price);

        // Liquidations may have moved cash/shares; everything downstream uses
        // the settled net worth.
        let net_worth = self.balance + self.position as f64 * price;
        self.net_worth = net_worth;

        let (holding_bonus, favorable_hold_factor) = self.holding_bonus(action, net_worth, &row);

        let trade_cost = trade.trade_cost + risk.liquidation_cost;
        let transaction_penalty =
            -(trade_cost / self.config.initial_balance) * weights.transaction_penalty_scale;
        let invalid_action_penalty = if trade.invalid { INVALID_ACTION_PENALTY } else { 0.0 };

        let breakdown = RewardBreakdown {
            profit_reward,
            sharpe_bonus,
            forced_stop_penalty,
            forced_tp_penalty,
            drawdown_penalty: risk.drawdown_penalty,
            transaction_penalty,
            holding_bonus,
            invalid_action_penalty,
        };
        let raw_reward = breakdown.total();
        let mut reward = self.normalizer.normalize(raw_reward);

        self.history.push(StepRecord {
            date: row.date,
            price,
            action: Some(action),
            shares_traded: trade.shares_traded + risk.shares_liquidated,
            buy_signal_price: (action > 0.0).then_some(price),
            sell_signal_price: (action < 0.0).then_some(price),
            net_worth,
            balance: self.balance,
            position: self.position,
            reward,
            raw_reward,
            trade_cost,
            profit_reward,
            sharpe_bonus,
            forced_stop_penalty,
            forced_tp_penalty,
            drawdown_penalty: risk.drawdown_penalty,
            transaction_penalty,
            holding_bonus,
            favorable_hold_factor,
            invalid_action_penalty,
        });

        let mut terminated = false;
        if self.current_step >= MIN_STEPS && net_worth <= 0.0 {
            terminated = true;
            reward += BANKRUPTCY_PENALTY;
            println!(
                "{}",
                format!("bankrupt at step {}, net worth {:.2}", self.current_step, net_worth)
                    .red()
                    .bold()
            );
        } else if self.current_step >= self.rows.len() - 1 {
            terminated = true;
        }

        if !terminated {
            self.prev_net_worth = net_worth;
            self.current_step += 1;
        }
        self.current_step = self.current_step.min(self.rows.len() - 1);

        let observation = self.next_observation();
        StepResult {
            observation,
            reward,
            terminated,
            truncated: false,
            info: HashMap::new(),
        }
    }

    /// Colored end-of-episode summary, printed by rollout drivers.
    pub fn print_episode_summary(&self, episode: usize) {
        let profit = self.net_worth - self.config.initial_balance;
        let pct = profit / self.config.initial_balance * 100.0;
        let profit_str = if profit >= 0.0 {
            format!("{pct:+.2}%").green()
        } else {
            format!("{pct:+.2}%").red()
        };
        println!(
            "{} {} - Net Worth: {} ({}) | cumulative reward {:.2} | trades {} | costs {}",
            "Episode".bright_blue(),
            episode.to_string().bright_blue().bold(),
            format!("${:.2}", self.net_worth).bright_white().bold(),
            profit_str,
            self.history.cumulative_reward(),
            self.transaction_count,
            format!("${:.2}", self.history.total_trade_costs).yellow(),
        );
    }
}
