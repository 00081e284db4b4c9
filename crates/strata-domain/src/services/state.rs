#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Flat,
    Invested,
}

/// Mutable walk-forward accumulator for one simulation run. Owned by the
/// active simulator and advanced one bar at a time, forward only.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub cash: f64,
    pub shares: u64,
    pub position: Position,
    pub entry_price: Option<f64>,
}

impl SimulationState {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            shares: 0,
            position: Position::Flat,
            entry_price: None,
        }
    }

    pub fn is_invested(&self) -> bool {
        self.position == Position::Invested
    }

    /// Deploy all cash at `price`, paying a fee proportional to the cash
    /// about to be deployed. Returns the share count bought; zero means the
    /// entry could not afford a single share and the state is unchanged.
    pub fn enter(&mut self, price: f64, cost_pct: f64) -> u64 {
        let fee = self.cash * cost_pct;
        let shares = ((self.cash - fee) / price).floor() as u64;
        if shares == 0 {
            return 0;
        }

        let spend = shares as f64 * price;
        self.cash -= fee + spend;
        self.shares = shares;
        self.position = Position::Invested;
        self.entry_price = Some(price);
        shares
    }

    /// Liquidate the whole position at `price`, paying a fee proportional
    /// to the notional sold.
    pub fn exit(&mut self, price: f64, cost_pct: f64) {
        let proceeds = self.shares as f64 * price;
        let fee = proceeds * cost_pct;
        self.cash += proceeds - fee;
        self.shares = 0;
        self.position = Position::Flat;
        self.entry_price = None;
    }

    pub fn value_at(&self, price: f64) -> f64 {
        self.cash + self.shares as f64 * price
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, SimulationState};

    #[test]
    fn enter_spends_cash_net_of_fee() {
        let mut state = SimulationState::new(1000.0);
        let shares = state.enter(100.0, 0.01);
        // fee = 10, deployable = 990, shares = 9, spend = 900
        assert_eq!(shares, 9);
        assert_eq!(state.shares, 9);
        assert!((state.cash - 90.0).abs() < 1e-9);
        assert_eq!(state.position, Position::Invested);
        assert_eq!(state.entry_price, Some(100.0));
    }

    #[test]
    fn enter_with_too_little_cash_leaves_state_unchanged() {
        let mut state = SimulationState::new(5.0);
        let before = state.clone();
        assert_eq!(state.enter(100.0, 0.0), 0);
        assert_eq!(state, before);
    }

    #[test]
    fn exit_credits_proceeds_net_of_fee() {
        let mut state = SimulationState::new(1000.0);
        state.enter(100.0, 0.0);
        assert_eq!(state.shares, 10);
        state.exit(110.0, 0.01);
        // proceeds = 1100, fee = 11
        assert!((state.cash - 1089.0).abs() < 1e-9);
        assert_eq!(state.shares, 0);
        assert_eq!(state.position, Position::Flat);
        assert_eq!(state.entry_price, None);
    }

    #[test]
    fn exact_multiple_leaves_zero_cash() {
        let mut state = SimulationState::new(1000.0);
        let shares = state.enter(100.0, 0.0);
        assert_eq!(shares, 10);
        assert_eq!(state.cash, 0.0);
    }

    #[test]
    fn value_is_cash_plus_marked_position() {
        let mut state = SimulationState::new(1000.0);
        state.enter(100.0, 0.0);
        assert!((state.value_at(90.0) - 900.0).abs() < 1e-9);
    }
}
