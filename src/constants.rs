/// Indicators need warm-up room; shorter series produce mostly-empty feature
/// columns and meaningless episodes.
pub const MIN_DATA_ROWS: usize = 200;

pub mod reward {
    /// Penalty for an action outside the declared bounds. Ends the episode.
    pub const OUT_OF_BOUNDS_PENALTY: f64 = -1000.0;
    /// Penalty when the step index has already run past the end of the data.
    pub const OVERRUN_PENALTY: f64 = -1000.0;
    /// Penalty for a buy/sell that could not execute. Episode continues.
    pub const INVALID_ACTION_PENALTY: f64 = -0.01;
    /// Added on top of the step reward when net worth reaches zero.
    pub const BANKRUPTCY_PENALTY: f64 = -10.0;
    pub const FORCED_STOP_PENALTY: f64 = -3.0;
    pub const FORCED_TP_PENALTY: f64 = -1.0;

    /// Bankruptcy is only checked after this many elapsed steps.
    pub const MIN_STEPS: usize = 10;
    /// Rolling window of step returns feeding the Sharpe bonus.
    pub const RETURNS_WINDOW: usize = 30;
    /// The Sharpe bonus stays at zero until the window holds this many samples.
    pub const SHARPE_MIN_SAMPLES: usize = 10;
    /// Steps during which the normalizer passes raw rewards through unchanged.
    pub const WARMUP_STEPS: u32 = 10;
}

pub mod risk {
    /// Drawdown fraction past which the penalty starts accruing.
    pub const DRAWDOWN_SOFT: f64 = 0.05;
    /// Drawdown fraction past which the penalty is amplified.
    pub const DRAWDOWN_HARD: f64 = 0.10;
    /// Drawdown fraction that forces sale of half the position.
    pub const PARTIAL_LIQUIDATION: f64 = 0.15;
    /// Drawdown fraction that forces sale of the entire position.
    pub const FULL_LIQUIDATION: f64 = 0.20;
    pub const PENALTY_AMPLIFIER: f64 = 1.25;
}

pub mod phase {
    /// ADX above this reads as a trending market.
    pub const ADX_TREND_THRESHOLD: f64 = 25.0;
}
