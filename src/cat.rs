//! Total Annual Cost (CAT) calculation
//!
//! Builds the cash-flow series of a product, solves for its monthly IRR and
//! annualizes it: `CAT = rate × 12 × 100`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cashflows::{
    build_installment_series, simulate_revolving, CashFlowSeries, InstallmentSchedule,
    RevolvingSimulation,
};
use crate::error::CatResult;
use crate::products::{
    AutoLoanTerms, CardTerms, CardTierTable, InstallmentTerms, RevolvingPolicy, RevolvingTerms,
};
use crate::solver::{IrrSolver, SolverConfig};

/// Periods per year; every product is simulated monthly
pub const PERIODS_PER_YEAR: u32 = 12;

/// Published percentage for a periodic (monthly) rate
pub fn annualize(periodic_rate: f64) -> f64 {
    periodic_rate * PERIODS_PER_YEAR as f64 * 100.0
}

/// CAT together with the solver diagnostics behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatCalculation {
    /// Annual percentage (33.2 = 33.2%)
    pub cat_pct: f64,

    /// Monthly IRR the percentage was derived from
    pub periodic_rate: f64,

    pub iterations: u32,

    /// False when the solver ran out of iterations
    pub converged: bool,

    /// NPV of the series at `periodic_rate`
    pub residual: f64,

    /// Length of the solved series (period 0 included)
    pub periods: usize,
}

/// Solve a series and annualize the result
pub fn compute_cat(series: &CashFlowSeries, config: &SolverConfig) -> CatResult<CatCalculation> {
    let solution = IrrSolver::new(*config).solve(series)?;
    if !solution.converged {
        warn!(
            "CAT based on a non-converged rate ({:.10}, residual {:.4e})",
            solution.rate, solution.residual
        );
    }

    Ok(CatCalculation {
        cat_pct: annualize(solution.rate),
        periodic_rate: solution.rate,
        iterations: solution.iterations,
        converged: solution.converged,
        residual: solution.residual,
        periods: series.len(),
    })
}

/// Calculator holding the solver settings and regulatory data for each product family
#[derive(Debug, Clone)]
pub struct CatCalculator {
    pub installment_solver: SolverConfig,
    pub revolving_solver: SolverConfig,
    pub revolving_policy: RevolvingPolicy,
    pub card_tiers: CardTierTable,
}

impl CatCalculator {
    pub fn new() -> Self {
        Self {
            installment_solver: SolverConfig::plain(),
            revolving_solver: SolverConfig::banded(),
            revolving_policy: RevolvingPolicy::default(),
            card_tiers: CardTierTable::default(),
        }
    }

    pub fn with_revolving_policy(mut self, policy: RevolvingPolicy) -> Self {
        self.revolving_policy = policy;
        self
    }

    pub fn with_card_tiers(mut self, table: CardTierTable) -> Self {
        self.card_tiers = table;
        self
    }

    /// Apply the same tolerance and iteration budget to both solver variants
    pub fn with_solver_limits(mut self, tolerance: f64, max_iterations: u32) -> Self {
        self.installment_solver = self
            .installment_solver
            .with_tolerance(tolerance)
            .with_max_iterations(max_iterations);
        self.revolving_solver = self
            .revolving_solver
            .with_tolerance(tolerance)
            .with_max_iterations(max_iterations);
        self
    }

    /// Personal (or any fixed-installment) loan
    pub fn installment(&self, terms: &InstallmentTerms) -> CatResult<CatCalculation> {
        self.installment_with_schedule(terms).map(|(_, result)| result)
    }

    /// Like [`installment`](Self::installment), also returning the built schedule
    pub fn installment_with_schedule(
        &self,
        terms: &InstallmentTerms,
    ) -> CatResult<(InstallmentSchedule, CatCalculation)> {
        let schedule = build_installment_series(terms)?;
        let result = compute_cat(&schedule.series, &self.installment_solver)?;
        debug!("installment CAT {:.4}% (payment {:.2})", result.cat_pct, schedule.payment);
        Ok((schedule, result))
    }

    /// Auto loan: only the financed amount enters the series
    pub fn auto_loan(&self, terms: &AutoLoanTerms) -> CatResult<CatCalculation> {
        self.installment(&terms.to_installment_terms()?)
    }

    /// Revolving line under the regulatory simulation
    pub fn revolving(&self, terms: &RevolvingTerms) -> CatResult<CatCalculation> {
        self.revolving_with_simulation(terms).map(|(_, result)| result)
    }

    /// Like [`revolving`](Self::revolving), also returning the simulated periods
    pub fn revolving_with_simulation(
        &self,
        terms: &RevolvingTerms,
    ) -> CatResult<(RevolvingSimulation, CatCalculation)> {
        let simulation = simulate_revolving(terms, &self.revolving_policy)?;
        let result = compute_cat(&simulation.series, &self.revolving_solver)?;
        debug!(
            "revolving CAT {:.4}% (line {:.2})",
            result.cat_pct, terms.credit_line_amount
        );
        Ok((simulation, result))
    }

    /// Credit card of a standard tier
    pub fn card(&self, terms: &CardTerms) -> CatResult<CatCalculation> {
        self.revolving(&terms.to_revolving_terms(&self.card_tiers))
    }
}

impl Default for CatCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// CAT percentage of a fixed-installment loan
pub fn compute_installment_cat(terms: &InstallmentTerms) -> CatResult<f64> {
    CatCalculator::new().installment(terms).map(|c| c.cat_pct)
}

/// CAT percentage of an auto loan with down payment
pub fn compute_auto_loan_cat(terms: &AutoLoanTerms) -> CatResult<f64> {
    CatCalculator::new().auto_loan(terms).map(|c| c.cat_pct)
}

/// CAT percentage of a revolving line under the default regulatory policy
pub fn compute_revolving_cat(terms: &RevolvingTerms) -> CatResult<f64> {
    CatCalculator::new().revolving(terms).map(|c| c.cat_pct)
}

/// CAT percentage of a standard-tier credit card
pub fn compute_card_cat(terms: &CardTerms) -> CatResult<f64> {
    CatCalculator::new().card(terms).map(|c| c.cat_pct)
}
