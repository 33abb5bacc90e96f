//! Internal Rate of Return (IRR) solver
//!
//! Used to find the periodic rate behind a CAT from a cash-flow series

mod newton;
mod npv;

pub use newton::{
    solve_irr, solve_irr_with, IrrSolution, IrrSolver, RateBand, SolverConfig,
    DEFAULT_INITIAL_GUESS, DEFAULT_MAX_ITERATIONS, DEFAULT_PERTURBATION_FACTOR,
    DEFAULT_TOLERANCE,
};
pub use npv::{npv, npv_and_derivative, npv_derivative};
