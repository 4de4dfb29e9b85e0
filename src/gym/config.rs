/// Named reward-shaping coefficients. Every field has a default so a config
/// can be built by overriding only what an experiment tunes.
#[derive(Debug, Clone, Copy)]
pub struct RewardWeights {
    pub profit_weight: f64,
    pub sharpe_bonus_weight: f64,
    pub holding_bonus_weight: f64,
    pub transaction_penalty_scale: f64,
    /// ATR level at which the holding bonus' volatility factor reaches zero.
    pub volatility_threshold: f64,
    /// RSI band inside which holding is considered favorable.
    pub momentum_threshold_min: f64,
    pub momentum_threshold_max: f64,
    /// Smoothing factor for the reward mean/variance EMAs.
    pub ema_alpha: f64,
    /// Divides the normalized reward before tanh to avoid saturation.
    pub reward_norm_factor: f64,
    /// Final output scale after tanh.
    pub reward_scale: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        RewardWeights {
            profit_weight: 1.5,
            sharpe_bonus_weight: 0.05,
            holding_bonus_weight: 0.001,
            transaction_penalty_scale: 1.0,
            volatility_threshold: 1.0,
            momentum_threshold_min: 30.0,
            momentum_threshold_max: 70.0,
            ema_alpha: 0.01,
            reward_norm_factor: 1.0,
            reward_scale: 1.0,
        }
    }
}

/// Immutable episode configuration, validated once at construction.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub initial_balance: f64,
    /// Fraction of the initial balance below which the stop penalty accrues.
    pub stop_loss: f64,
    /// Multiple of the initial balance above which the take-profit penalty accrues.
    pub take_profit: f64,
    /// Fraction of balance/position a full-strength action may commit.
    pub max_position_size: f64,
    /// Drawdown limit reported to the agent as its remaining buffer.
    pub max_drawdown: f64,
    pub annual_trading_days: u32,
    pub transaction_cost: f64,
    /// Action magnitude below which the holding bonus starts paying.
    pub hold_threshold: f64,
    /// Scales the balance-proportional part of the drawdown penalty.
    pub drawdown_penalty_factor: f64,
    // Trailing-stop parameters: stored for a planned rule, not read by the
    // step logic. TODO(product): wire these up or remove once the trailing
    // stop design is settled.
    pub trailing_drawdown_trigger: f64,
    pub trailing_drawdown_grace: u32,
    pub forced_liquidation_penalty: f64,
    pub reward_weights: RewardWeights,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            initial_balance: 100_000.0,
            stop_loss: 0.90,
            take_profit: 1.10,
            max_position_size: 0.5,
            max_drawdown: 0.20,
            annual_trading_days: 252,
            transaction_cost: 0.0001,
            hold_threshold: 0.1,
            drawdown_penalty_factor: 0.01,
            trailing_drawdown_trigger: 0.20,
            trailing_drawdown_grace: 3,
            forced_liquidation_penalty: -5.0,
            reward_weights: RewardWeights::default(),
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_balance > 0.0) {
            return Err(format!("initial_balance must be positive, got {}", self.initial_balance));
        }
        if !(self.stop_loss > 0.0 && self.stop_loss <= 1.0) {
            return Err(format!("stop_loss must be in (0, 1], got {}", self.stop_loss));
        }
        if !(self.take_profit >= 1.0) {
            return Err(format!("take_profit must be >= 1, got {}", self.take_profit));
        }
        if !(self.max_position_size > 0.0 && self.max_position_size <= 1.0) {
            return Err(format!(
                "max_position_size must be in (0, 1], got {}",
                self.max_position_size
            ));
        }
        if !(self.max_drawdown > 0.0 && self.max_drawdown <= 1.0) {
            return Err(format!("max_drawdown must be in (0, 1], got {}", self.max_drawdown));
        }
        if !(self.transaction_cost >= 0.0 && self.transaction_cost < 1.0) {
            return Err(format!(
                "transaction_cost must be in [0, 1), got {}",
                self.transaction_cost
            ));
        }
        if !(self.hold_threshold > 0.0) {
            return Err(format!("hold_threshold must be positive, got {}", self.hold_threshold));
        }

        let w = &self.reward_weights;
        if !(w.ema_alpha > 0.0 && w.ema_alpha < 1.0) {
            return Err(format!("ema_alpha must be in (0, 1), got {}", w.ema_alpha));
        }
        if !(w.reward_norm_factor > 0.0) {
            return Err(format!(
                "reward_norm_factor must be positive, got {}",
                w.reward_norm_factor
            ));
        }
        if w.momentum_threshold_max <= w.momentum_threshold_min {
            return Err(format!(
                "momentum thresholds must satisfy min < max, got {} >= {}",
                w.momentum_threshold_min, w.momentum_threshold_max
            ));
        }
        Ok(())
    }
}
