use colored::Colorize;

use crate::constants::risk::{
    DRAWDOWN_HARD, DRAWDOWN_SOFT, FULL_LIQUIDATION, PARTIAL_LIQUIDATION, PENALTY_AMPLIFIER,
};

use super::env::TradingEnv;

#[derive(Debug, Default)]
pub(super) struct RiskOutcome {
    pub drawdown_penalty: f64,
    /// Cost basis of any forced sales this step.
    pub liquidation_cost: f64,
    pub shares_liquidated: u32,
}

impl TradingEnv {
    /// Drawdown-driven risk controls, run after the agent's own trade.
    ///
    /// The drawdown fraction is measured once, against the post-trade net
    /// worth, and drives the penalty tiers and both liquidation thresholds,
    /// so a severe single-step drop can trigger the partial and the full
    /// sale in the same pass. The closing negate-and-amplify of the penalty
    /// runs unconditionally, compounding the earlier amplification for
    /// drawdowns past the hard tier.
    pub(super) fn apply_risk_controls(&mut self, net_worth: f64, price: f64) -> RiskOutcome {
        self.peak = self.peak.max(net_worth);
        let drawdown = if self.peak > 0.0 {
            (self.peak - net_worth) / self.peak
        } else {
            0.0
        };

        let mut penalty = 0.0;
        if drawdown > DRAWDOWN_SOFT {
            penalty -= 2.0 + self.config.initial_balance * self.config.drawdown_penalty_factor;
        }
        if drawdown > DRAWDOWN_HARD {
            penalty = -penalty.abs() * PENALTY_AMPLIFIER;
        }

        let mut outcome = RiskOutcome::default();

        if drawdown > PARTIAL_LIQUIDATION && self.position > 0 {
            let shares = self.position / 2;
            if shares > 0 {
                let proceeds = shares as f64 * price * (1.0 - self.config.transaction_cost);
                self.balance += proceeds;
                self.position -= shares;
                self.transaction_count += 1;
                outcome.shares_liquidated += shares;
                outcome.liquidation_cost += shares as f64 * price * self.config.transaction_cost;
                self.history.mark_sell(self.current_step, price, shares);

                // The surviving position is the new reference point.
                let settled = self.balance + self.position as f64 * price;
                self.peak = settled;
                self.prev_net_worth = settled;
                self.consecutive_drawdown_steps = 0;

                println!(
                    "{}",
                    format!(
                        "partial forced liquidation at {:.1}% drawdown, sold {shares} shares",
                        drawdown * 100.0
                    )
                    .yellow()
                );
            }
        }

        if drawdown > FULL_LIQUIDATION && self.position > 0 {
            let shares = self.position;
            let proceeds = shares as f64 * price * (1.0 - self.config.transaction_cost);
            self.balance += proceeds;
            self.position = 0;
            self.transaction_count += 1;
            outcome.shares_liquidated += shares;
            outcome.liquidation_cost += shares as f64 * price * self.config.transaction_cost;
            self.history.mark_sell(self.current_step, price, shares);

            self.peak = self.balance;
            self.prev_net_worth = self.balance;
            self.consecutive_drawdown_steps = 0;

            println!(
                "{}",
                format!(
                    "full forced liquidation at {:.1}% drawdown, sold {shares} shares",
                    drawdown * 100.0
                )
                .red()
            );
        }

        outcome.drawdown_penalty = -penalty.abs() * PENALTY_AMPLIFIER;
        outcome
    }
}
