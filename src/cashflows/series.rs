//! Period-indexed cash-flow series

use serde::{Deserialize, Serialize};

use crate::error::{CatError, CatResult};

/// Amounts below this magnitude count as zero when checking for a sign change
const SIGN_EPSILON: f64 = 1e-10;

/// Signed monetary amounts, one slot per monthly period, index 0 = "now".
///
/// Positive entries are money received by the borrower, negative entries are
/// money paid by the borrower. Several movements in the same period are summed
/// into that period's slot, since discounting only depends on the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashFlowSeries {
    flows: Vec<f64>,
}

impl CashFlowSeries {
    /// Wrap an already period-indexed vector of flows
    pub fn new(flows: Vec<f64>) -> Self {
        Self { flows }
    }

    /// Number of periods including period 0
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Net flow of a period, if the period exists
    pub fn get(&self, period: usize) -> Option<f64> {
        self.flows.get(period).copied()
    }

    /// Flow at period 0 (net funds disbursed)
    pub fn initial(&self) -> Option<f64> {
        self.get(0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.flows
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.flows.iter().copied()
    }

    /// Undiscounted sum of every flow
    pub fn total(&self) -> f64 {
        self.flows.iter().sum()
    }

    /// Reject series the root finder cannot work with
    pub fn ensure_solvable(&self) -> CatResult<()> {
        if self.flows.is_empty() {
            return Err(CatError::EmptySeries);
        }

        let has_positive = self.flows.iter().any(|&cf| cf > SIGN_EPSILON);
        let has_negative = self.flows.iter().any(|&cf| cf < -SIGN_EPSILON);
        if !has_positive || !has_negative {
            return Err(CatError::NoSignChange);
        }

        Ok(())
    }
}

impl From<Vec<f64>> for CashFlowSeries {
    fn from(flows: Vec<f64>) -> Self {
        Self::new(flows)
    }
}

impl AsRef<[f64]> for CashFlowSeries {
    fn as_ref(&self) -> &[f64] {
        &self.flows
    }
}

/// Accumulates movements into period slots before freezing them into a series
#[derive(Debug, Clone)]
pub(crate) struct SeriesBuilder {
    flows: Vec<f64>,
}

impl SeriesBuilder {
    /// Builder with `periods` zeroed slots (index 0 included)
    pub(crate) fn with_periods(periods: usize) -> Self {
        Self {
            flows: vec![0.0; periods],
        }
    }

    /// Add `amount` to the slot of `period`, growing the series if needed
    pub(crate) fn record(&mut self, period: usize, amount: f64) {
        if period >= self.flows.len() {
            self.flows.resize(period + 1, 0.0);
        }
        self.flows[period] += amount;
    }

    pub(crate) fn build(self) -> CashFlowSeries {
        CashFlowSeries::new(self.flows)
    }
}
