//! Cash-flow construction for installment and revolving products

mod installment;
mod revolving;
mod series;

pub use installment::{amortized_payment, build_installment_series, InstallmentSchedule};
pub use revolving::{simulate_revolving, RevolvingPeriod, RevolvingSimulation};
pub use series::CashFlowSeries;
