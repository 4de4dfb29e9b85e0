use crate::constants::reward::{RETURNS_WINDOW, SHARPE_MIN_SAMPLES, WARMUP_STEPS};
use crate::gym::config::RewardWeights;
use crate::types::{Feature, FeatureRow};

use super::env::TradingEnv;

/// Per-step reward components before normalization.
#[derive(Debug, Default)]
pub(super) struct RewardBreakdown {
    pub profit_reward: f64,
    pub sharpe_bonus: f64,
    pub forced_stop_penalty: f64,
    pub forced_tp_penalty: f64,
    pub drawdown_penalty: f64,
    pub transaction_penalty: f64,
    pub holding_bonus: f64,
    pub invalid_action_penalty: f64,
}

impl RewardBreakdown {
    pub fn total(&self) -> f64 {
        self.profit_reward
            + self.sharpe_bonus
            + self.forced_stop_penalty
            + self.forced_tp_penalty
            + self.drawdown_penalty
            + self.transaction_penalty
            + self.holding_bonus
            + self.invalid_action_penalty
    }
}

impl TradingEnv {
    /// Push this step's return into the rolling window and, once the window
    /// is warm, pay a bonus proportional to the windowed Sharpe ratio.
    pub(super) fn sharpe_bonus(&mut self, step_return: f64) -> f64 {
        self.returns_window.push_back(step_return);
        if self.returns_window.len() > RETURNS_WINDOW {
            self.returns_window.pop_front();
        }
        if self.returns_window.len() < SHARPE_MIN_SAMPLES {
            return 0.0;
        }

        let n = self.returns_window.len() as f64;
        let mean: f64 = self.returns_window.iter().sum::<f64>() / n;
        let variance: f64 =
            self.returns_window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt() + 1e-9;

        (mean / std) * self.config.reward_weights.sharpe_bonus_weight
    }

    /// Reward staying flat when the action is small, volatility is low, and
    /// momentum sits inside the favorable RSI band. Returns the bonus and the
    /// combined favorability factor for the audit trace.
    pub(super) fn holding_bonus(
        &self,
        action: f64,
        net_worth: f64,
        row: &FeatureRow,
    ) -> (f64, f64) {
        let weights = &self.config.reward_weights;

        let hold_factor = (1.0 - action.abs() / self.config.hold_threshold).max(0.0);

        let raw_vol = self.unscaled_or_default(row, Feature::Volatility);
        let volatility_factor = 1.0 - (raw_vol / weights.volatility_threshold).clamp(0.0, 1.0);

        let band = weights.momentum_threshold_max - weights.momentum_threshold_min;
        let rsi_factor = if band > 0.0 {
            let raw_rsi = self.unscaled_or_default(row, Feature::Rsi);
            ((raw_rsi - weights.momentum_threshold_min) / band).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let favorable = hold_factor * volatility_factor * rsi_factor;
        (favorable * weights.holding_bonus_weight * net_worth, favorable)
    }
}

/// EMA-based reward normalizer with a cold start and a warm-up phase.
///
/// Raw reward magnitude drifts across training; normalizing against running
/// EMA statistics keeps the signal near unit scale, and the tanh bound stops
/// rare outliers from dominating updates.
#[derive(Debug, Clone)]
pub struct RewardNormalizer {
    mean: f64,
    variance: f64,
    alpha: f64,
    norm_factor: f64,
    scale: f64,
    count: u32,
}

impl RewardNormalizer {
    pub fn new(weights: &RewardWeights) -> Self {
        RewardNormalizer {
            mean: 0.0,
            variance: 0.0,
            alpha: weights.ema_alpha,
            norm_factor: weights.reward_norm_factor,
            scale: weights.reward_scale,
            count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.mean = 0.0;
        self.variance = 0.0;
        self.count = 0;
    }

    /// Three regimes keyed on the step counter. The first reward seeds the
    /// EMA, avoiding the cold-start shock of a zero mean. During warm-up the
    /// raw reward passes through while the EMAs settle. Afterward each reward
    /// is normalized against the previous EMA values before squashing.
    pub fn normalize(&mut self, raw: f64) -> f64 {
        if self.count == 0 {
            self.mean = raw;
            self.variance = 1e-6;
            self.count = 1;
            return raw;
        }

        if self.count < WARMUP_STEPS {
            self.update_ema(raw);
            self.count += 1;
            return raw;
        }

        let normalized = (raw - self.mean) / (self.variance.sqrt() + 1e-8);
        self.update_ema(raw);
        self.count += 1;

        (normalized / self.norm_factor).tanh() * self.scale
    }

    fn update_ema(&mut self, raw: f64) {
        let old_mean = self.mean;
        self.mean = self.alpha * raw + (1.0 - self.alpha) * old_mean;
        self.variance =
            self.alpha * (raw - old_mean).powi(2) + (1.0 - self.alpha) * self.variance;
    }
}
