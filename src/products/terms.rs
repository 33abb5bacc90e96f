//! Credit terms for the supported products

use serde::{Deserialize, Serialize};

use super::regulatory::{CardTier, CardTierTable};
use crate::error::{CatError, CatResult};

/// Default share of the balance a revolving borrower must pay each month
pub const DEFAULT_MINIMUM_PAYMENT_FRACTION: f64 = 0.05;

fn check_amount(name: &str, value: f64) -> CatResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CatError::invalid(format!(
            "{name} must be a non-negative finite amount, got {value}"
        )));
    }
    Ok(())
}

fn check_term(term_periods: u32) -> CatResult<()> {
    if term_periods == 0 {
        return Err(CatError::invalid("term_periods must be at least 1"));
    }
    Ok(())
}

/// Fixed-installment loan (personal loan, or the financed part of an auto loan)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentTerms {
    /// Amount financed
    pub principal: f64,

    /// Number of monthly installments
    pub term_periods: u32,

    /// Nominal annual rate as a decimal (0.24 = 24%)
    pub annual_rate: f64,

    /// One-off fee withheld at disbursement
    #[serde(default)]
    pub opening_fee: f64,

    /// Fixed fee charged with every installment
    #[serde(default)]
    pub monthly_fee: f64,

    /// Monthly insurance premiums, all paid with every installment
    #[serde(default)]
    pub monthly_insurance: Vec<f64>,

    /// Other costs withheld at disbursement
    #[serde(default)]
    pub other_upfront_costs: f64,
}

impl InstallmentTerms {
    /// Loan without fees or insurance
    pub fn new(principal: f64, term_periods: u32, annual_rate: f64) -> Self {
        Self {
            principal,
            term_periods,
            annual_rate,
            opening_fee: 0.0,
            monthly_fee: 0.0,
            monthly_insurance: Vec::new(),
            other_upfront_costs: 0.0,
        }
    }

    pub fn with_opening_fee(mut self, fee: f64) -> Self {
        self.opening_fee = fee;
        self
    }

    pub fn with_monthly_fee(mut self, fee: f64) -> Self {
        self.monthly_fee = fee;
        self
    }

    /// Add one monthly insurance premium
    pub fn with_insurance(mut self, premium: f64) -> Self {
        self.monthly_insurance.push(premium);
        self
    }

    pub fn with_other_upfront_costs(mut self, costs: f64) -> Self {
        self.other_upfront_costs = costs;
        self
    }

    /// Monthly rate implied by the nominal annual rate
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    /// Everything paid each month on top of the amortizing installment
    pub fn monthly_charges(&self) -> f64 {
        self.monthly_fee + self.monthly_insurance.iter().sum::<f64>()
    }

    /// Funds the borrower actually receives at period 0
    pub fn net_disbursement(&self) -> f64 {
        self.principal - self.opening_fee - self.other_upfront_costs
    }

    pub fn validate(&self) -> CatResult<()> {
        check_term(self.term_periods)?;
        check_amount("principal", self.principal)?;
        check_amount("annual_rate", self.annual_rate)?;
        check_amount("opening_fee", self.opening_fee)?;
        check_amount("monthly_fee", self.monthly_fee)?;
        check_amount("other_upfront_costs", self.other_upfront_costs)?;
        for premium in &self.monthly_insurance {
            check_amount("monthly_insurance", *premium)?;
        }
        Ok(())
    }
}

/// Auto loan with a down payment.
///
/// Only `vehicle_price - down_payment` is financed; the down payment itself
/// never enters the cash-flow series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoLoanTerms {
    pub vehicle_price: f64,
    pub down_payment: f64,
    pub term_periods: u32,
    pub annual_rate: f64,
    #[serde(default)]
    pub opening_fee: f64,
    #[serde(default)]
    pub monthly_fee: f64,
    #[serde(default)]
    pub car_insurance: f64,
    #[serde(default)]
    pub life_insurance: f64,
    #[serde(default)]
    pub gps: f64,
    /// Plates, inspection and similar costs paid at disbursement
    #[serde(default)]
    pub other_upfront_costs: f64,
}

impl AutoLoanTerms {
    pub fn new(vehicle_price: f64, down_payment: f64, term_periods: u32, annual_rate: f64) -> Self {
        Self {
            vehicle_price,
            down_payment,
            term_periods,
            annual_rate,
            opening_fee: 0.0,
            monthly_fee: 0.0,
            car_insurance: 0.0,
            life_insurance: 0.0,
            gps: 0.0,
            other_upfront_costs: 0.0,
        }
    }

    /// Amount financed
    pub fn financed_amount(&self) -> f64 {
        self.vehicle_price - self.down_payment
    }

    /// Down payment as a share of the vehicle price
    pub fn down_payment_ratio(&self) -> f64 {
        if self.vehicle_price <= 0.0 {
            0.0
        } else {
            self.down_payment / self.vehicle_price
        }
    }

    /// Equivalent installment loan on the financed amount
    pub fn to_installment_terms(&self) -> CatResult<InstallmentTerms> {
        check_amount("vehicle_price", self.vehicle_price)?;
        check_amount("down_payment", self.down_payment)?;
        check_amount("car_insurance", self.car_insurance)?;
        check_amount("life_insurance", self.life_insurance)?;
        check_amount("gps", self.gps)?;
        if self.down_payment > self.vehicle_price {
            return Err(CatError::invalid(format!(
                "down_payment {} exceeds vehicle_price {}",
                self.down_payment, self.vehicle_price
            )));
        }

        let terms = InstallmentTerms {
            principal: self.financed_amount(),
            term_periods: self.term_periods,
            annual_rate: self.annual_rate,
            opening_fee: self.opening_fee,
            monthly_fee: self.monthly_fee,
            monthly_insurance: vec![self.car_insurance, self.life_insurance, self.gps],
            other_upfront_costs: self.other_upfront_costs,
        };
        terms.validate()?;
        Ok(terms)
    }
}

/// Revolving credit line (credit card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevolvingTerms {
    /// Full line, assumed drawn at inception
    pub credit_line_amount: f64,

    /// Nominal annual rate as a decimal
    pub annual_rate: f64,

    /// Fee charged every twelfth period
    #[serde(default)]
    pub annual_fee: f64,

    /// Share of the balance due each period, before the fixed floor
    #[serde(default = "default_minimum_payment_fraction")]
    pub minimum_payment_fraction: f64,

    #[serde(default)]
    pub other_monthly_charges: f64,
}

fn default_minimum_payment_fraction() -> f64 {
    DEFAULT_MINIMUM_PAYMENT_FRACTION
}

impl RevolvingTerms {
    pub fn new(credit_line_amount: f64, annual_rate: f64) -> Self {
        Self {
            credit_line_amount,
            annual_rate,
            annual_fee: 0.0,
            minimum_payment_fraction: DEFAULT_MINIMUM_PAYMENT_FRACTION,
            other_monthly_charges: 0.0,
        }
    }

    pub fn with_annual_fee(mut self, fee: f64) -> Self {
        self.annual_fee = fee;
        self
    }

    pub fn with_minimum_payment_fraction(mut self, fraction: f64) -> Self {
        self.minimum_payment_fraction = fraction;
        self
    }

    pub fn with_other_monthly_charges(mut self, charges: f64) -> Self {
        self.other_monthly_charges = charges;
        self
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    pub fn validate(&self) -> CatResult<()> {
        check_amount("credit_line_amount", self.credit_line_amount)?;
        check_amount("annual_rate", self.annual_rate)?;
        check_amount("annual_fee", self.annual_fee)?;
        check_amount("other_monthly_charges", self.other_monthly_charges)?;
        if !(0.0..=1.0).contains(&self.minimum_payment_fraction) {
            return Err(CatError::invalid(format!(
                "minimum_payment_fraction must be within [0, 1], got {}",
                self.minimum_payment_fraction
            )));
        }
        Ok(())
    }
}

/// Credit card of a standard tier; the line amount comes from the tier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTerms {
    pub tier: CardTier,
    pub annual_rate: f64,
    #[serde(default)]
    pub annual_fee: f64,
    #[serde(default = "default_minimum_payment_fraction")]
    pub minimum_payment_fraction: f64,
}

impl CardTerms {
    pub fn new(tier: CardTier, annual_rate: f64) -> Self {
        Self {
            tier,
            annual_rate,
            annual_fee: 0.0,
            minimum_payment_fraction: DEFAULT_MINIMUM_PAYMENT_FRACTION,
        }
    }

    pub fn with_annual_fee(mut self, fee: f64) -> Self {
        self.annual_fee = fee;
        self
    }

    pub fn with_minimum_payment_fraction(mut self, fraction: f64) -> Self {
        self.minimum_payment_fraction = fraction;
        self
    }

    /// Revolving terms with the tier's line converted to currency
    pub fn to_revolving_terms(&self, table: &CardTierTable) -> RevolvingTerms {
        RevolvingTerms {
            credit_line_amount: table.line_amount(self.tier),
            annual_rate: self.annual_rate,
            annual_fee: self.annual_fee,
            minimum_payment_fraction: self.minimum_payment_fraction,
            other_monthly_charges: 0.0,
        }
    }
}
