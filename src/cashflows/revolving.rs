//! Revolving credit simulation over the regulatory horizon
//!
//! The borrower draws the full line at inception, pays only the minimum each
//! period, immediately re-draws whatever principal that payment retired, and
//! settles the whole remaining balance in the last period.

use log::debug;
use serde::{Deserialize, Serialize};

use super::series::{CashFlowSeries, SeriesBuilder};
use crate::error::CatResult;
use crate::products::{RevolvingPolicy, RevolvingTerms};

/// One simulated period of a revolving line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevolvingPeriod {
    /// Period index (1-based)
    pub period: u32,
    pub opening_balance: f64,
    pub interest: f64,
    pub minimum_payment: f64,
    /// Annual fee charged this period, if any
    pub fee: f64,
    /// Everything the borrower pays this period, payoff included
    pub payment: f64,
    pub redraw: f64,
    pub closing_balance: f64,
}

impl RevolvingPeriod {
    /// Net flow recorded in the series for this period
    pub fn net_flow(&self) -> f64 {
        self.redraw - self.payment
    }
}

/// Balance carried from one period to the next
#[derive(Debug, Clone)]
struct RevolvingState {
    period: u32,
    balance: f64,
}

impl RevolvingState {
    fn open(credit_line_amount: f64) -> Self {
        Self {
            period: 0,
            balance: credit_line_amount,
        }
    }

    /// Roll one period forward and return its record
    fn advance(&mut self, terms: &RevolvingTerms, policy: &RevolvingPolicy) -> RevolvingPeriod {
        self.period += 1;
        let opening_balance = self.balance;

        let interest = opening_balance * terms.monthly_rate();
        let minimum_payment =
            (opening_balance * terms.minimum_payment_fraction).max(policy.minimum_payment_floor);
        let fee = if self.period % policy.fee_interval_periods == 0 {
            terms.annual_fee
        } else {
            0.0
        };

        let mut payment = minimum_payment + terms.other_monthly_charges + fee;
        let carried = opening_balance + interest - minimum_payment;
        let mut redraw = (minimum_payment - interest).max(0.0);

        if self.period == policy.horizon_periods {
            payment += carried;
            redraw = 0.0;
            self.balance = 0.0;
        } else {
            self.balance = carried + redraw;
        }

        RevolvingPeriod {
            period: self.period,
            opening_balance,
            interest,
            minimum_payment,
            fee,
            payment,
            redraw,
            closing_balance: self.balance,
        }
    }
}

/// Result of a revolving simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevolvingSimulation {
    pub periods: Vec<RevolvingPeriod>,
    pub series: CashFlowSeries,
}

impl RevolvingSimulation {
    /// Balance left after the last period (zero by construction)
    pub fn final_balance(&self) -> f64 {
        self.periods.last().map(|p| p.closing_balance).unwrap_or(0.0)
    }

    pub fn total_paid(&self) -> f64 {
        self.periods.iter().map(|p| p.payment).sum()
    }

    pub fn total_redrawn(&self) -> f64 {
        self.periods.iter().map(|p| p.redraw).sum()
    }

    pub fn total_fees(&self) -> f64 {
        self.periods.iter().map(|p| p.fee).sum()
    }
}

/// Simulate a revolving line and produce its cash-flow series.
///
/// Payments and redraws of the same period share one slot, so the series has
/// exactly `horizon_periods + 1` entries.
pub fn simulate_revolving(
    terms: &RevolvingTerms,
    policy: &RevolvingPolicy,
) -> CatResult<RevolvingSimulation> {
    terms.validate()?;
    policy.validate()?;

    let horizon = policy.horizon_periods as usize;
    let mut builder = SeriesBuilder::with_periods(horizon + 1);
    let mut periods = Vec::with_capacity(horizon);
    let mut state = RevolvingState::open(terms.credit_line_amount);

    builder.record(0, terms.credit_line_amount);
    for _ in 0..horizon {
        let row = state.advance(terms, policy);
        let slot = row.period as usize;

        builder.record(slot, -row.payment);
        if row.redraw > 0.0 {
            builder.record(slot, row.redraw);
        }
        periods.push(row);
    }

    let simulation = RevolvingSimulation {
        periods,
        series: builder.build(),
    };

    debug!(
        "revolving series: line={:.2} periods={} paid={:.2} redrawn={:.2}",
        terms.credit_line_amount,
        horizon,
        simulation.total_paid(),
        simulation.total_redrawn()
    );

    Ok(simulation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn classic_card() -> RevolvingTerms {
        RevolvingTerms::new(22_500.0, 0.36).with_annual_fee(700.0)
    }

    #[test]
    fn test_series_has_one_slot_per_period() {
        let sim = simulate_revolving(&classic_card(), &RevolvingPolicy::default()).unwrap();
        assert_eq!(sim.series.len(), 37);
        assert_eq!(sim.periods.len(), 36);
        assert_eq!(sim.series.initial(), Some(22_500.0));
    }

    #[test]
    fn test_terminal_payoff_clears_balance() {
        let sim = simulate_revolving(&classic_card(), &RevolvingPolicy::default()).unwrap();
        let last = sim.periods.last().unwrap();

        assert_eq!(sim.final_balance(), 0.0);
        assert_eq!(last.redraw, 0.0);
        // 1125 minimum + 700 fee + (22500 + 675 - 1125) carried balance
        assert_abs_diff_eq!(last.payment, 23_875.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sim.series.get(36).unwrap(), -23_875.0, epsilon = 1e-6);
    }

    #[test]
    fn test_redraw_keeps_balance_level() {
        let sim = simulate_revolving(&classic_card(), &RevolvingPolicy::default()).unwrap();
        let first = &sim.periods[0];

        assert_abs_diff_eq!(first.interest, 675.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.minimum_payment, 1_125.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.redraw, 450.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.closing_balance, 22_500.0, epsilon = 1e-9);
        // Payment and redraw netted into the same slot
        assert_abs_diff_eq!(sim.series.get(1).unwrap(), -675.0, epsilon = 1e-9);
        for row in &sim.periods {
            assert_eq!(sim.series.get(row.period as usize), Some(row.net_flow()));
        }
    }

    #[test]
    fn test_annual_fee_every_twelfth_period() {
        let sim = simulate_revolving(&classic_card(), &RevolvingPolicy::default()).unwrap();
        let charged: Vec<u32> = sim
            .periods
            .iter()
            .filter(|p| p.fee > 0.0)
            .map(|p| p.period)
            .collect();

        assert_eq!(charged, vec![12, 24, 36]);
        assert_abs_diff_eq!(sim.total_fees(), 2_100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_minimum_payment_floor() {
        let terms = RevolvingTerms::new(1_000.0, 0.24);
        let sim = simulate_revolving(&terms, &RevolvingPolicy::default()).unwrap();

        // 5% of 1000 is 50, below the 100 floor
        assert_abs_diff_eq!(sim.periods[0].minimum_payment, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sim.periods[0].redraw, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_redraw_when_interest_exceeds_minimum() {
        let terms = RevolvingTerms::new(50_000.0, 0.60).with_minimum_payment_fraction(0.01);
        let sim = simulate_revolving(&terms, &RevolvingPolicy::default()).unwrap();

        let first = &sim.periods[0];
        assert_eq!(first.redraw, 0.0);
        assert!(first.closing_balance > first.opening_balance);
        assert!(sim.periods[..35].iter().all(|p| p.redraw == 0.0));
    }

    #[test]
    fn test_custom_horizon() {
        let policy = RevolvingPolicy {
            horizon_periods: 24,
            ..Default::default()
        };
        let sim = simulate_revolving(&classic_card(), &policy).unwrap();
        assert_eq!(sim.series.len(), 25);
        assert_eq!(sim.final_balance(), 0.0);
    }
}
