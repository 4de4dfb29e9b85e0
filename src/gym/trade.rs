use super::env::TradingEnv;

/// Result of executing the agent's own order for one step.
#[derive(Debug, Default)]
pub(super) struct TradeOutcome {
    pub shares_traded: u32,
    /// Cost basis of the trade: shares * price * cost rate.
    pub trade_cost: f64,
    /// A buy/sell was requested but could not execute; state untouched.
    pub invalid: bool,
}

impl TradingEnv {
    /// Map the continuous action to a buy/sell/hold order and execute it
    /// against the ledger. Positive actions invest a fraction of the balance,
    /// negative actions release a fraction of the position, zero holds.
    pub(super) fn execute_action(&mut self, action: f64, price: f64) -> TradeOutcome {
        if action > 0.0 {
            self.execute_buy(action, price)
        } else if action < 0.0 {
            self.execute_sell(action, price)
        } else {
            TradeOutcome::default()
        }
    }

    fn execute_buy(&mut self, action: f64, price: f64) -> TradeOutcome {
        if price <= 0.0 {
            return TradeOutcome { invalid: true, ..TradeOutcome::default() };
        }

        let investment = self.balance * action * self.config.max_position_size;
        let mut shares = (investment / price).floor() as u32;
        if shares == 0 {
            // Tiny actions near the buy threshold would otherwise never be
            // able to act; one share is allowed when affordable.
            let one_share_cost = price * (1.0 + self.config.transaction_cost);
            if one_share_cost <= self.balance {
                shares = 1;
            }
        }

        let total_cost = shares as f64 * price * (1.0 + self.config.transaction_cost);
        if shares == 0 || total_cost > self.balance {
            return TradeOutcome { invalid: true, ..TradeOutcome::default() };
        }

        self.balance -= total_cost;
        self.position += shares;
        self.transaction_count += 1;
        self.history.mark_buy(self.current_step, price, shares);

        TradeOutcome {
            shares_traded: shares,
            trade_cost: shares as f64 * price * self.config.transaction_cost,
            invalid: false,
        }
    }

    fn execute_sell(&mut self, action: f64, price: f64) -> TradeOutcome {
        if price <= 0.0 {
            return TradeOutcome { invalid: true, ..TradeOutcome::default() };
        }

        let proportion = action.abs() * self.config.max_position_size;
        let mut shares = (self.position as f64 * proportion).floor() as u32;
        if shares == 0 && self.position > 0 {
            shares = 1;
        }

        if shares == 0 || shares > self.position {
            return TradeOutcome { invalid: true, ..TradeOutcome::default() };
        }

        let proceeds = shares as f64 * price * (1.0 - self.config.transaction_cost);
        self.position -= shares;
        self.balance += proceeds;
        self.transaction_count += 1;
        self.history.mark_sell(self.current_step, price, shares);

        TradeOutcome {
            shares_traded: shares,
            trade_cost: shares as f64 * price * self.config.transaction_cost,
            invalid: false,
        }
    }
}
