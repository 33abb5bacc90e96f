//! Credit product terms and the regulatory data that parameterizes them

mod regulatory;
mod terms;

pub use regulatory::{CardTier, CardTierTable, RevolvingPolicy};
pub use terms::{
    AutoLoanTerms, CardTerms, InstallmentTerms, RevolvingTerms, DEFAULT_MINIMUM_PAYMENT_FRACTION,
};
