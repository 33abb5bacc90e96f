//! Cash flows of a fixed-installment amortizing loan

use log::debug;
use serde::{Deserialize, Serialize};

use super::series::{CashFlowSeries, SeriesBuilder};
use crate::error::CatResult;
use crate::products::InstallmentTerms;

/// Level payment that amortizes `principal` over `term_periods`.
///
/// `P · r(1+r)^n / ((1+r)^n - 1)`, falling back to straight-line repayment
/// when the rate is zero.
pub fn amortized_payment(principal: f64, monthly_rate: f64, term_periods: u32) -> f64 {
    if monthly_rate.abs() < 1e-10 {
        return principal / term_periods as f64;
    }

    let growth = (1.0 + monthly_rate).powi(term_periods as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Built installment loan: the payment breakdown plus its cash-flow series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    /// Amortizing part of each installment
    pub payment: f64,

    /// Fees and insurance paid alongside each installment
    pub monthly_charges: f64,

    /// Funds received by the borrower at period 0
    pub net_disbursement: f64,

    pub series: CashFlowSeries,
}

impl InstallmentSchedule {
    /// Total outflow per period
    pub fn installment(&self) -> f64 {
        self.payment + self.monthly_charges
    }

    /// Sum of every installment over the term
    pub fn total_paid(&self) -> f64 {
        self.installment() * (self.series.len().saturating_sub(1)) as f64
    }
}

/// Build the `term_periods + 1` flows of an installment loan.
///
/// Period 0 carries the disbursement net of upfront costs; every later period
/// carries the same negative installment.
pub fn build_installment_series(terms: &InstallmentTerms) -> CatResult<InstallmentSchedule> {
    terms.validate()?;

    let periods = terms.term_periods as usize;
    let payment = amortized_payment(terms.principal, terms.monthly_rate(), terms.term_periods);
    let monthly_charges = terms.monthly_charges();
    let net_disbursement = terms.net_disbursement();

    let mut builder = SeriesBuilder::with_periods(periods + 1);
    builder.record(0, net_disbursement);
    for period in 1..=periods {
        builder.record(period, -(payment + monthly_charges));
    }

    debug!(
        "installment series: principal={:.2} term={} payment={:.4} charges={:.2} net={:.2}",
        terms.principal, terms.term_periods, payment, monthly_charges, net_disbursement
    );

    Ok(InstallmentSchedule {
        payment,
        monthly_charges,
        net_disbursement,
        series: builder.build(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatError;
    use approx::assert_abs_diff_eq;

    fn reference_terms() -> InstallmentTerms {
        InstallmentTerms::new(50_000.0, 24, 0.24)
            .with_opening_fee(1_000.0)
            .with_monthly_fee(50.0)
            .with_insurance(100.0)
            .with_other_upfront_costs(500.0)
    }

    #[test]
    fn test_amortized_payment_reference() {
        // 50,000 over 24 months at 2% per month
        let payment = amortized_payment(50_000.0, 0.02, 24);
        assert_abs_diff_eq!(payment, 2_643.5549, epsilon = 1e-3);
    }

    #[test]
    fn test_amortized_payment_zero_rate() {
        assert_abs_diff_eq!(amortized_payment(12_000.0, 0.0, 12), 1_000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_series_shape() {
        let schedule = build_installment_series(&reference_terms()).unwrap();
        let series = &schedule.series;

        assert_eq!(series.len(), 25);
        assert_eq!(series.initial(), Some(48_500.0));
        let installment = -(schedule.payment + 150.0);
        for period in 1..=24 {
            assert_eq!(series.get(period), Some(installment));
        }
        assert_abs_diff_eq!(schedule.total_paid(), 24.0 * -installment, epsilon = 1e-6);
    }

    #[test]
    fn test_multiple_insurance_premiums_are_summed() {
        let terms = InstallmentTerms::new(10_000.0, 6, 0.12)
            .with_insurance(20.0)
            .with_insurance(15.0);
        let schedule = build_installment_series(&terms).unwrap();

        assert_eq!(schedule.monthly_charges, 35.0);
        assert_abs_diff_eq!(schedule.installment(), schedule.payment + 35.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_term_rejected() {
        let terms = InstallmentTerms::new(10_000.0, 0, 0.12);
        assert!(matches!(
            build_installment_series(&terms),
            Err(CatError::InvalidTerms { .. })
        ));
    }
}
