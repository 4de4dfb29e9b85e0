use colored::Colorize;

use crate::constants::phase::ADX_TREND_THRESHOLD;
use crate::types::{Feature, FeatureRow, MarketPhase};

use super::env::TradingEnv;

impl TradingEnv {
    /// Assemble the externally visible state vector for the current step:
    /// scaled features in declared order, account metrics scaled by the
    /// initial balance, the market-phase one-hot, and drawdown telemetry.
    /// NaN/Inf never escape; they are scrubbed to zero.
    pub(super) fn next_observation(&mut self) -> Vec<f32> {
        if self.current_step >= self.rows.len() {
            self.current_step = self.rows.len() - 1;
        }
        let row = self.rows[self.current_step];

        let mut obs = Vec::with_capacity(self.observation_len());

        for (_, &value) in row.scaled.iter() {
            obs.push(value as f32);
        }

        let initial = self.config.initial_balance;
        obs.push((self.balance / initial) as f32);
        obs.push((self.net_worth / initial) as f32);
        obs.push((self.position as f64 / initial) as f32);

        let phase = self.classify_phase(&row);
        for p in MarketPhase::ALL {
            obs.push(if phase == p { 1.0 } else { 0.0 });
        }

        let drawdown = if self.peak > 0.0 {
            (self.peak - self.net_worth) / self.peak
        } else {
            0.0
        };
        obs.push(drawdown as f32);
        obs.push((self.config.max_drawdown - drawdown).max(0.0) as f32);

        for value in &mut obs {
            if !value.is_finite() {
                *value = 0.0;
            }
        }

        debug_assert_eq!(obs.len(), self.observation_len());
        debug_assert!(obs.iter().all(|v| !v.is_nan()));
        obs
    }

    /// Sideways unless trend strength clears the ADX threshold, then the
    /// fast/slow moving-average comparison picks the direction. Missing
    /// moving averages fall back to Sideways.
    pub(super) fn classify_phase(&self, row: &FeatureRow) -> MarketPhase {
        let adx = self.unscaled_or_default(row, Feature::Adx);
        if adx <= ADX_TREND_THRESHOLD {
            return MarketPhase::Sideways;
        }

        let sma10 = row.unscaled[Feature::Sma10];
        let sma50 = row.unscaled[Feature::Sma50];
        if !sma10.is_finite() || !sma50.is_finite() {
            eprintln!(
                "{}",
                format!("missing SMA values at step {}, phase falls back to Sideways", self.current_step)
                    .yellow()
            );
            return MarketPhase::Sideways;
        }

        if sma10 > sma50 {
            MarketPhase::Bull
        } else {
            MarketPhase::Bear
        }
    }

    /// Unscaled feature lookup with local recovery: a value the pipeline
    /// could not provide reads as 0.0 and the miss is surfaced on stderr,
    /// never to the agent.
    pub(super) fn unscaled_or_default(&self, row: &FeatureRow, feature: Feature) -> f64 {
        let value = row.unscaled[feature];
        if value.is_finite() {
            value
        } else {
            eprintln!(
                "{}",
                format!(
                    "missing {} value at step {}, substituting 0.0",
                    feature.column(),
                    self.current_step
                )
                .yellow()
            );
            0.0
        }
    }
}
