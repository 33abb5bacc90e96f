//! Scenario runner for batch CAT calculations
//!
//! Holds one configured calculator and evaluates many independent products,
//! in parallel when asked to.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cat::{CatCalculation, CatCalculator};
use crate::error::CatResult;
use crate::products::{AutoLoanTerms, CardTerms, InstallmentTerms, RevolvingTerms};

/// Any product the calculator can price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "product", rename_all = "snake_case")]
pub enum CreditProduct {
    Personal(InstallmentTerms),
    Auto(AutoLoanTerms),
    Revolving(RevolvingTerms),
    Card(CardTerms),
}

impl CreditProduct {
    pub fn kind(&self) -> &'static str {
        match self {
            CreditProduct::Personal(_) => "personal",
            CreditProduct::Auto(_) => "auto",
            CreditProduct::Revolving(_) => "revolving",
            CreditProduct::Card(_) => "card",
        }
    }
}

/// Outcome of one product in a batch
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub product: CreditProduct,
    #[serde(flatten)]
    pub calculation: Option<CatCalculation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    fn from_result(product: CreditProduct, result: CatResult<CatCalculation>) -> Self {
        match result {
            Ok(calculation) => Self {
                product,
                calculation: Some(calculation),
                error: None,
            },
            Err(err) => Self {
                product,
                calculation: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Pre-configured runner for batches of products
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let results = runner.run_batch(&products);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    calculator: CatCalculator,
}

impl ScenarioRunner {
    /// Runner with default solver settings and regulatory data
    pub fn new() -> Self {
        Self {
            calculator: CatCalculator::new(),
        }
    }

    pub fn with_calculator(calculator: CatCalculator) -> Self {
        Self { calculator }
    }

    /// Price a single product
    pub fn run(&self, product: &CreditProduct) -> CatResult<CatCalculation> {
        match product {
            CreditProduct::Personal(terms) => self.calculator.installment(terms),
            CreditProduct::Auto(terms) => self.calculator.auto_loan(terms),
            CreditProduct::Revolving(terms) => self.calculator.revolving(terms),
            CreditProduct::Card(terms) => self.calculator.card(terms),
        }
    }

    /// Price every product in parallel, keeping input order
    pub fn run_batch(&self, products: &[CreditProduct]) -> Vec<CatResult<CatCalculation>> {
        products.par_iter().map(|p| self.run(p)).collect()
    }

    /// Like [`run_batch`](Self::run_batch), pairing each result with its product
    pub fn run_outcomes(&self, products: Vec<CreditProduct>) -> Vec<ScenarioOutcome> {
        products
            .into_par_iter()
            .map(|product| {
                let result = self.run(&product);
                ScenarioOutcome::from_result(product, result)
            })
            .collect()
    }

    pub fn calculator(&self) -> &CatCalculator {
        &self.calculator
    }

    pub fn calculator_mut(&mut self) -> &mut CatCalculator {
        &mut self.calculator
    }
}
