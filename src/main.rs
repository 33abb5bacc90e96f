//! CAT CLI
//!
//! Command-line interface for computing the Total Annual Cost of credit products.
//! Accepts overrides via environment variables:
//!   CAT_UDI_VALUE, CAT_MIN_PAYMENT_FLOOR, CAT_SOLVER_TOLERANCE, CAT_SOLVER_MAX_ITERATIONS

use std::env;
use std::io::Read;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use total_annual_cost::cashflows::RevolvingPeriod;
use total_annual_cost::{
    AutoLoanTerms, CardTerms, CardTier, CatCalculation, CatCalculator, CreditProduct,
    InstallmentTerms, RevolvingTerms, ScenarioRunner,
};

/// Total Annual Cost (CAT) calculator
#[derive(Parser)]
#[command(name = "cat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-installment personal loan
    Personal(PersonalArgs),
    /// Auto loan with down payment
    Auto(AutoArgs),
    /// Revolving credit line under the 36-period simulation
    Revolving(RevolvingArgs),
    /// Credit card of a standard tier (classic, gold, platinum)
    Card(CardArgs),
    /// Price a JSON array of products read from stdin
    Batch,
    /// Run the reference scenarios
    Examples,
}

#[derive(Args)]
struct PersonalArgs {
    /// Loan amount
    #[arg(long)]
    principal: f64,
    /// Number of monthly installments
    #[arg(long)]
    term: u32,
    /// Nominal annual rate as a decimal (0.24 = 24%)
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    opening_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_fee: f64,
    /// Monthly insurance premium (repeatable)
    #[arg(long)]
    insurance: Vec<f64>,
    /// Other costs withheld at disbursement
    #[arg(long, default_value_t = 0.0)]
    other_costs: f64,
}

#[derive(Args)]
struct AutoArgs {
    #[arg(long)]
    price: f64,
    #[arg(long)]
    down_payment: f64,
    #[arg(long)]
    term: u32,
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    opening_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_fee: f64,
    #[arg(long, default_value_t = 0.0)]
    car_insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    life_insurance: f64,
    #[arg(long, default_value_t = 0.0)]
    gps: f64,
    #[arg(long, default_value_t = 0.0)]
    other_costs: f64,
}

#[derive(Args)]
struct RevolvingArgs {
    /// Credit line amount
    #[arg(long)]
    line: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_fee: f64,
    /// Minimum payment as a share of the balance
    #[arg(long, default_value_t = 0.05)]
    min_payment: f64,
    #[arg(long, default_value_t = 0.0)]
    other_charges: f64,
    /// Also print the simulated periods
    #[arg(long)]
    schedule: bool,
}

#[derive(Args)]
struct CardArgs {
    #[arg(long, default_value = "classic")]
    tier: CardTier,
    #[arg(long, default_value_t = 0.36)]
    rate: f64,
    #[arg(long, default_value_t = 0.0)]
    annual_fee: f64,
    #[arg(long, default_value_t = 0.05)]
    min_payment: f64,
}

#[derive(Serialize)]
struct Report {
    label: String,
    #[serde(flatten)]
    calculation: CatCalculation,
    #[serde(skip_serializing_if = "Option::is_none")]
    installment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<RevolvingPeriod>>,
}

impl Report {
    fn new(label: impl Into<String>, calculation: CatCalculation) -> Self {
        Self {
            label: label.into(),
            calculation,
            installment: None,
            schedule: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Default calculator with environment overrides applied
fn calculator_from_env() -> CatCalculator {
    let mut calculator = CatCalculator::new();

    if let Some(unit_value) = env_parse::<f64>("CAT_UDI_VALUE") {
        calculator.card_tiers.unit_value = unit_value;
    }
    if let Some(floor) = env_parse::<f64>("CAT_MIN_PAYMENT_FLOOR") {
        calculator.revolving_policy.minimum_payment_floor = floor;
    }

    let tolerance = env_parse::<f64>("CAT_SOLVER_TOLERANCE")
        .unwrap_or(calculator.installment_solver.tolerance);
    let max_iterations = env_parse::<u32>("CAT_SOLVER_MAX_ITERATIONS")
        .unwrap_or(calculator.installment_solver.max_iterations);

    calculator.with_solver_limits(tolerance, max_iterations)
}

fn personal_terms(args: &PersonalArgs) -> InstallmentTerms {
    InstallmentTerms {
        principal: args.principal,
        term_periods: args.term,
        annual_rate: args.rate,
        opening_fee: args.opening_fee,
        monthly_fee: args.monthly_fee,
        monthly_insurance: args.insurance.clone(),
        other_upfront_costs: args.other_costs,
    }
}

fn auto_terms(args: &AutoArgs) -> AutoLoanTerms {
    AutoLoanTerms {
        vehicle_price: args.price,
        down_payment: args.down_payment,
        term_periods: args.term,
        annual_rate: args.rate,
        opening_fee: args.opening_fee,
        monthly_fee: args.monthly_fee,
        car_insurance: args.car_insurance,
        life_insurance: args.life_insurance,
        gps: args.gps,
        other_upfront_costs: args.other_costs,
    }
}

fn installment_report(
    calculator: &CatCalculator,
    label: &str,
    terms: &InstallmentTerms,
) -> Result<Report> {
    let (schedule, calculation) = calculator.installment_with_schedule(terms)?;
    let mut report = Report::new(label, calculation);
    report.installment = Some(schedule.installment());
    Ok(report)
}

/// Reference scenarios for a personal loan, an auto loan and the three card tiers
fn example_reports(calculator: &CatCalculator) -> Result<Vec<Report>> {
    let personal = InstallmentTerms::new(50_000.0, 24, 0.24)
        .with_opening_fee(1_000.0)
        .with_monthly_fee(50.0)
        .with_insurance(100.0)
        .with_other_upfront_costs(500.0);

    let mut auto = AutoLoanTerms::new(350_000.0, 70_000.0, 48, 0.16);
    auto.opening_fee = 3_500.0;
    auto.car_insurance = 1_200.0;
    auto.life_insurance = 300.0;
    auto.gps = 150.0;
    auto.other_upfront_costs = 2_000.0;

    let mut reports = vec![
        installment_report(calculator, "personal loan", &personal)?,
        installment_report(calculator, "auto loan", &auto.to_installment_terms()?)?,
    ];

    let cards = [
        CardTerms::new(CardTier::Classic, 0.36)
            .with_annual_fee(700.0)
            .with_minimum_payment_fraction(0.05),
        CardTerms::new(CardTier::Gold, 0.30)
            .with_annual_fee(1_200.0)
            .with_minimum_payment_fraction(0.08),
        CardTerms::new(CardTier::Platinum, 0.25)
            .with_annual_fee(2_000.0)
            .with_minimum_payment_fraction(0.10),
    ];
    for card in &cards {
        let calculation = calculator.card(card)?;
        reports.push(Report::new(format!("{} card", card.tier), calculation));
    }

    Ok(reports)
}

fn print_reports(reports: &[Report], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<18} {:>10} {:>14} {:>6} {:>10} {:>14}",
                "Product", "CAT %", "Monthly IRR", "Iter", "Converged", "Installment"
            );
            println!("{}", "-".repeat(77));
            for report in reports {
                let c = &report.calculation;
                let installment = report
                    .installment
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_default();
                println!(
                    "{:<18} {:>10.2} {:>14.8} {:>6} {:>10} {:>14}",
                    report.label, c.cat_pct, c.periodic_rate, c.iterations, c.converged, installment
                );
            }

            for report in reports {
                if let Some(periods) = &report.schedule {
                    println!();
                    println!(
                        "{:>6} {:>14} {:>12} {:>12} {:>10} {:>14} {:>12} {:>14}",
                        "Period",
                        "Opening",
                        "Interest",
                        "Minimum",
                        "Fee",
                        "Payment",
                        "Redraw",
                        "Closing"
                    );
                    for p in periods {
                        println!(
                            "{:>6} {:>14.2} {:>12.2} {:>12.2} {:>10.2} {:>14.2} {:>12.2} {:>14.2}",
                            p.period,
                            p.opening_balance,
                            p.interest,
                            p.minimum_payment,
                            p.fee,
                            p.payment,
                            p.redraw,
                            p.closing_balance
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let calculator = calculator_from_env();

    let reports = match cli.command {
        Commands::Personal(args) => {
            vec![installment_report(&calculator, "personal loan", &personal_terms(&args))?]
        }
        Commands::Auto(args) => {
            let terms = auto_terms(&args).to_installment_terms()?;
            vec![installment_report(&calculator, "auto loan", &terms)?]
        }
        Commands::Revolving(args) => {
            let terms = RevolvingTerms::new(args.line, args.rate)
                .with_annual_fee(args.annual_fee)
                .with_minimum_payment_fraction(args.min_payment)
                .with_other_monthly_charges(args.other_charges);
            let (simulation, calculation) = calculator.revolving_with_simulation(&terms)?;
            let mut report = Report::new("revolving", calculation);
            if args.schedule {
                report.schedule = Some(simulation.periods);
            }
            vec![report]
        }
        Commands::Card(args) => {
            let terms = CardTerms::new(args.tier, args.rate)
                .with_annual_fee(args.annual_fee)
                .with_minimum_payment_fraction(args.min_payment);
            vec![Report::new(format!("{} card", args.tier), calculator.card(&terms)?)]
        }
        Commands::Batch => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read products from stdin")?;
            let products: Vec<CreditProduct> =
                serde_json::from_str(&input).context("invalid product JSON")?;

            let outcomes = ScenarioRunner::with_calculator(calculator).run_outcomes(products);
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            return Ok(());
        }
        Commands::Examples => example_reports(&calculator)?,
    };

    print_reports(&reports, cli.format)
}
