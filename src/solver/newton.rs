//! Newton-Raphson search for the periodic rate that zeroes a series' NPV

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::npv::{npv, npv_and_derivative};
use crate::cashflows::CashFlowSeries;
use crate::error::{CatError, CatResult};

/// Convergence tolerance on both |NPV| and the rate step
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Iteration budget before the solver gives up and returns its last estimate
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Starting periodic rate (10% per month)
pub const DEFAULT_INITIAL_GUESS: f64 = 0.1;

/// Multiplier applied to the rate when the derivative vanishes on the perturbing path
pub const DEFAULT_PERTURBATION_FACTOR: f64 = 1.1;

/// Plausible band for a monthly rate on the clamped path.
///
/// A step landing at or below `lower` restarts from `lower_reset`; a step
/// above `upper` restarts from `upper_reset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub lower: f64,
    pub lower_reset: f64,
    pub upper: f64,
    pub upper_reset: f64,
}

impl RateBand {
    fn apply(&self, rate: f64) -> f64 {
        if rate <= self.lower {
            self.lower_reset
        } else if rate > self.upper {
            self.upper_reset
        } else {
            rate
        }
    }
}

impl Default for RateBand {
    fn default() -> Self {
        Self {
            lower: 0.0,
            lower_reset: 0.001,
            upper: 1.0,
            upper_reset: 0.9,
        }
    }
}

/// Root finder configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: u32,
    pub initial_guess: f64,

    /// Pull every iterate back into [`RateBand`]
    pub clamp_to_band: bool,

    /// On a zero derivative scale the rate by `perturbation_factor` instead of failing
    pub perturb_on_zero_derivative: bool,

    pub band: RateBand,
    pub perturbation_factor: f64,
}

impl SolverConfig {
    /// Unbounded Newton iteration; a flat NPV curve is an error.
    /// Used for fixed-installment products.
    pub fn plain() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            initial_guess: DEFAULT_INITIAL_GUESS,
            clamp_to_band: false,
            perturb_on_zero_derivative: false,
            band: RateBand::default(),
            perturbation_factor: DEFAULT_PERTURBATION_FACTOR,
        }
    }

    /// Newton iteration kept inside the monthly-rate band, perturbing on a
    /// zero derivative. Used for revolving credit.
    pub fn banded() -> Self {
        Self {
            clamp_to_band: true,
            perturb_on_zero_derivative: true,
            ..Self::plain()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::plain()
    }
}

/// Outcome of a root search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic (monthly) rate
    pub rate: f64,

    /// Newton updates performed
    pub iterations: u32,

    /// NPV of the series at `rate`
    pub residual: f64,

    /// False when the iteration budget ran out; `rate` is then the last iterate
    pub converged: bool,
}

/// Newton-Raphson IRR solver
#[derive(Debug, Clone, Default)]
pub struct IrrSolver {
    config: SolverConfig,
}

impl IrrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find the periodic rate at which the series' NPV is zero.
    ///
    /// Exhausting the iteration budget is not an error: the last iterate is
    /// returned with `converged == false`.
    ///
    /// Every iterate stays above -1, where the discount base `1 + rate` is
    /// positive: a step may cover at most half the distance to -1.
    pub fn solve(&self, series: &CashFlowSeries) -> CatResult<IrrSolution> {
        series.ensure_solvable()?;

        let flows = series.as_slice();
        let cfg = &self.config;
        if cfg.initial_guess.is_nan() || cfg.initial_guess <= -1.0 {
            return Err(CatError::invalid(format!(
                "initial guess {} must be greater than -1",
                cfg.initial_guess
            )));
        }
        let mut rate = cfg.initial_guess;

        for iteration in 0..cfg.max_iterations {
            let (value, derivative) = npv_and_derivative(flows, rate);
            trace!("iter {iteration}: rate={rate:.12} npv={value:.6e} dnpv={derivative:.6e}");

            if value.abs() < cfg.tolerance {
                debug!("converged on NPV after {iteration} iterations, rate={rate:.10}");
                return Ok(IrrSolution {
                    rate,
                    iterations: iteration,
                    residual: value,
                    converged: true,
                });
            }

            let new_rate = if derivative == 0.0 {
                if !cfg.perturb_on_zero_derivative {
                    return Err(CatError::ZeroDerivative { rate, iteration });
                }
                warn!("zero NPV derivative at rate {rate}, perturbing");
                rate * cfg.perturbation_factor
            } else {
                rate - value / derivative
            };

            if !new_rate.is_finite() {
                return Err(CatError::NonFiniteRate { iteration });
            }

            let floor = (rate - 1.0) / 2.0;
            let new_rate = if new_rate < floor {
                trace!("step to {new_rate:.6e} pulled back to {floor:.12}");
                floor
            } else {
                new_rate
            };

            if (new_rate - rate).abs() < cfg.tolerance {
                debug!(
                    "converged on rate step after {} iterations, rate={new_rate:.10}",
                    iteration + 1
                );
                return Ok(IrrSolution {
                    rate: new_rate,
                    iterations: iteration + 1,
                    residual: npv(flows, new_rate),
                    converged: true,
                });
            }

            rate = if cfg.clamp_to_band {
                cfg.band.apply(new_rate)
            } else {
                new_rate
            };
        }

        let residual = npv(flows, rate);
        warn!(
            "IRR did not converge in {} iterations (rate={rate:.10}, npv={residual:.6e})",
            cfg.max_iterations
        );

        Ok(IrrSolution {
            rate,
            iterations: cfg.max_iterations,
            residual,
            converged: false,
        })
    }
}

/// Periodic IRR of a series with the plain solver, optionally overriding the
/// tolerance and iteration budget.
pub fn solve_irr(
    series: &CashFlowSeries,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
) -> CatResult<f64> {
    let mut config = SolverConfig::plain();
    if let Some(tolerance) = tolerance {
        config.tolerance = tolerance;
    }
    if let Some(max_iterations) = max_iterations {
        config.max_iterations = max_iterations;
    }

    solve_irr_with(series, &config).map(|solution| solution.rate)
}

/// Full solution of a series under an explicit configuration
pub fn solve_irr_with(series: &CashFlowSeries, config: &SolverConfig) -> CatResult<IrrSolution> {
    IrrSolver::new(*config).solve(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn series(flows: &[f64]) -> CashFlowSeries {
        CashFlowSeries::new(flows.to_vec())
    }

    /// 48,500 net disbursed, 24 installments of the 50,000 / 24% reference loan
    fn personal_loan_flows() -> Vec<f64> {
        let mut flows = vec![48_500.0];
        flows.extend(vec![-2_793.554_862_662_5; 24]);
        flows
    }

    /// Level 30-year loan of 300,000 at 0.5% per month
    fn mortgage_flows(opening_fee: f64) -> Vec<f64> {
        let growth = 1.005_f64.powi(360);
        let payment = 300_000.0 * 0.005 * growth / (growth - 1.0);
        let mut flows = vec![300_000.0 - opening_fee];
        flows.extend(vec![-payment; 360]);
        flows
    }

    #[test]
    fn test_bullet_repayment_rate() {
        // 10,000 drawn, settled with one month-12 payment at 1% per month
        let mut flows = vec![10_000.0];
        flows.extend(vec![0.0; 11]);
        flows.push(-10_000.0 * 1.01_f64.powi(12));

        let rate = solve_irr(&series(&flows), None, None).unwrap();
        assert_relative_eq!(rate, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_personal_loan_rate() {
        let flows = personal_loan_flows();
        let solution = IrrSolver::default().solve(&series(&flows)).unwrap();

        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate * 1200.0, 33.2495, epsilon = 1e-3);
        assert!(npv(&flows, solution.rate).abs() < 1e-6);
    }

    #[test]
    fn test_long_loan_stays_in_domain() {
        // From the 0.1 seed the first raw Newton step lands below -1
        let solution = IrrSolver::default().solve(&series(&mortgage_flows(0.0))).unwrap();

        assert!(solution.converged);
        assert!(solution.rate > -1.0);
        assert_abs_diff_eq!(solution.rate, 0.005, epsilon = 1e-9);
    }

    #[test]
    fn test_upfront_fee_raises_long_loan_rate() {
        let plain = solve_irr(&series(&mortgage_flows(0.0)), None, None).unwrap();
        let with_fee = solve_irr(&series(&mortgage_flows(3_000.0)), None, None).unwrap();

        assert!(with_fee > plain);
        assert_abs_diff_eq!(with_fee * 1200.0, 6.094, epsilon = 1e-2);
    }

    #[test]
    fn test_non_finite_step_is_an_error() {
        let solver = IrrSolver::default();
        assert_eq!(
            solver.solve(&series(&[1_000.0, f64::NAN, -1_100.0])),
            Err(CatError::NonFiniteRate { iteration: 0 })
        );

        // Slope of ~1e-308 against an NPV of 1e10 overflows the step
        let config = SolverConfig::plain().with_initial_guess(1e154);
        assert_eq!(
            IrrSolver::new(config).solve(&series(&[1e10, -1.0])),
            Err(CatError::NonFiniteRate { iteration: 0 })
        );
    }

    #[test]
    fn test_initial_guess_outside_domain_rejected() {
        let config = SolverConfig::plain().with_initial_guess(-1.0);
        assert!(matches!(
            solve_irr_with(&series(&personal_loan_flows()), &config),
            Err(CatError::InvalidTerms { .. })
        ));
    }

    #[test]
    fn test_solve_irr_with_reports_diagnostics() {
        let flows = personal_loan_flows();
        let config = SolverConfig::plain().with_tolerance(1e-12);
        let solver = IrrSolver::new(config);
        assert_eq!(solver.config().tolerance, 1e-12);

        let solution = solve_irr_with(&series(&flows), &config).unwrap();
        assert_eq!(solver.solve(&series(&flows)).unwrap(), solution);
        assert!(solution.converged && solution.iterations > 0);
        assert_relative_eq!(
            solution.rate,
            solve_irr(&series(&flows), Some(1e-12), None).unwrap()
        );
    }

    #[test]
    fn test_root_at_initial_guess_needs_no_iterations() {
        let solution = IrrSolver::default().solve(&series(&[1000.0, -1100.0])).unwrap();
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
        assert_relative_eq!(solution.rate, 0.1);
    }

    #[test]
    fn test_degenerate_series_rejected() {
        let solver = IrrSolver::default();
        assert_eq!(solver.solve(&series(&[])), Err(CatError::EmptySeries));
        assert_eq!(
            solver.solve(&series(&[100.0, 50.0])),
            Err(CatError::NoSignChange)
        );
    }

    #[test]
    fn test_zero_derivative_fails_on_plain_path() {
        // At rate 1.0 the slope of 0.2 - 1/(1+r) + 1/(1+r)^2 is exactly zero
        let config = SolverConfig::plain().with_initial_guess(1.0);
        let result = IrrSolver::new(config).solve(&series(&[0.2, -1.0, 1.0]));

        assert_eq!(
            result,
            Err(CatError::ZeroDerivative {
                rate: 1.0,
                iteration: 0
            })
        );
    }

    #[test]
    fn test_zero_derivative_perturbs_on_banded_path() {
        let config = SolverConfig::banded().with_initial_guess(1.0);
        let solution = IrrSolver::new(config).solve(&series(&[0.2, -1.0, 1.0])).unwrap();

        // Roots are (3 - √5)/2 and (3 + √5)/2; only the first lies in the band
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate, (3.0 - 5.0_f64.sqrt()) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_convergence_is_silent() {
        // No real root: 0.5 - x + x^2 > 0 for every discount factor x
        let config = SolverConfig::banded().with_initial_guess(1.0);
        let solution = IrrSolver::new(config).solve(&series(&[0.5, -1.0, 1.0])).unwrap();

        assert!(!solution.converged);
        assert_eq!(solution.iterations, DEFAULT_MAX_ITERATIONS);
        assert!(solution.rate > 0.0 && solution.rate <= 1.0);
    }

    #[test]
    fn test_band_resets() {
        let band = RateBand::default();
        assert_eq!(band.apply(-0.2), 0.001);
        assert_eq!(band.apply(0.0), 0.001);
        assert_eq!(band.apply(0.5), 0.5);
        assert_eq!(band.apply(1.0), 1.0);
        assert_eq!(band.apply(1.7), 0.9);
    }

    #[test]
    fn test_iteration_override_limits_work() {
        let flows = personal_loan_flows();
        let config = SolverConfig::plain().with_max_iterations(1);
        let solution = IrrSolver::new(config).solve(&series(&flows)).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_presets() {
        let plain = SolverConfig::plain();
        assert!(!plain.clamp_to_band && !plain.perturb_on_zero_derivative);
        assert_eq!(plain.initial_guess, 0.1);
        assert_eq!(plain.max_iterations, 1000);

        let banded = SolverConfig::banded();
        assert!(banded.clamp_to_band && banded.perturb_on_zero_derivative);
        assert_eq!(banded.tolerance, plain.tolerance);
    }
}
