//! Total Annual Cost - CAT engine for consumer credit disclosures
//!
//! This library provides:
//! - Cash-flow construction for fixed-installment loans (personal and auto)
//! - The regulatory 36-period revolving-credit simulation (credit cards)
//! - A configurable Newton-Raphson IRR solver over monthly cash flows
//! - Annualization of the monthly IRR into the published CAT percentage
//! - Batch evaluation of many products in parallel

pub mod cashflows;
pub mod cat;
pub mod error;
pub mod products;
pub mod scenario;
pub mod solver;

// Re-export commonly used types
pub use cashflows::CashFlowSeries;
pub use cat::{
    compute_auto_loan_cat, compute_card_cat, compute_installment_cat, compute_revolving_cat,
    CatCalculation, CatCalculator,
};
pub use error::{CatError, CatResult};
pub use products::{
    AutoLoanTerms, CardTerms, CardTier, CardTierTable, InstallmentTerms, RevolvingPolicy,
    RevolvingTerms,
};
pub use scenario::{CreditProduct, ScenarioRunner};
pub use solver::{solve_irr, solve_irr_with, IrrSolution, IrrSolver, SolverConfig};
