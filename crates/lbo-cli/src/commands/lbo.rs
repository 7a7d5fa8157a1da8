use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lbo_core::lbo::deal::DealParameters;
use lbo_core::lbo::debt_schedule::DebtSchedule;
use lbo_core::lbo::debt_structure::StandardTrancheAmounts;
use lbo_core::lbo::exit::{default_exit_multiples, ExitAssumptions, DEFAULT_EXIT_YEAR};
use lbo_core::lbo::model::{self, DebtInput, LboInput};
use lbo_core::lbo::operating::OperatingAssumptions;
use lbo_core::lbo::sensitivity::SensitivityRanges;

use crate::input;

/// Deal, financing and operating assumptions shared by every LBO command
#[derive(Args)]
pub struct DealArgs {
    /// Path to a JSON or YAML deal file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Target company name
    #[arg(long, default_value = "Target")]
    pub company: String,

    /// Total purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Equity contributed by the sponsor
    #[arg(long)]
    pub sponsor_equity: Option<Decimal>,

    /// Term Loan A principal
    #[arg(long, default_value = "0")]
    pub term_loan_a: Decimal,

    /// Term Loan B principal (receives the cash sweep)
    #[arg(long, default_value = "0")]
    pub term_loan_b: Decimal,

    /// Revolver drawn at close
    #[arg(long, default_value = "0")]
    pub revolver: Decimal,

    /// Subordinated debt principal
    #[arg(long, default_value = "0")]
    pub subordinated: Decimal,

    /// Year-1 revenue
    #[arg(long)]
    pub base_revenue: Option<Decimal>,

    /// Revenue growth rates for years 2-5 (comma-separated, e.g. "0.08,0.07,0.06,0.05")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub growth: Option<Vec<Decimal>>,

    /// EBITDA margin as a decimal
    #[arg(long)]
    pub ebitda_margin: Option<Decimal>,

    /// Capex as a fraction of revenue
    #[arg(long, default_value = "0.03")]
    pub capex_rate: Decimal,

    /// Working-capital investment as a fraction of the year-over-year revenue increase
    #[arg(long, default_value = "0.02")]
    pub nwc_rate: Decimal,

    /// Cash tax rate
    #[arg(long, default_value = "0.25")]
    pub tax_rate: Decimal,

    /// Exit EV/EBITDA multiples (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exit_multiples: Option<Vec<Decimal>>,

    /// Exit year (1-5)
    #[arg(long)]
    pub exit_year: Option<u32>,
}

/// Arguments for the sensitivity command
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub deal: DealArgs,

    /// Revenue shocks applied to exit EBITDA (comma-separated, e.g. "-0.1,0,0.1")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub revenue_adj: Option<Vec<Decimal>>,

    /// Margin shocks applied to exit EBITDA (comma-separated, e.g. "-0.02,0,0.02")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub ebitda_adj: Option<Vec<Decimal>>,
}

fn build_input(args: &DealArgs) -> Result<LboInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        input_from_flags(args)
    }
}

fn input_from_flags(args: &DealArgs) -> Result<LboInput, Box<dyn std::error::Error>> {
    let purchase_price = args
        .purchase_price
        .ok_or("--purchase-price is required (or provide --input)")?;
    let sponsor_equity = args
        .sponsor_equity
        .ok_or("--sponsor-equity is required (or provide --input)")?;
    let base_revenue = args
        .base_revenue
        .ok_or("--base-revenue is required (or provide --input)")?;
    let ebitda_margin = args
        .ebitda_margin
        .ok_or("--ebitda-margin is required (or provide --input)")?;
    let growth = args
        .growth
        .clone()
        .ok_or("--growth is required (or provide --input)")?;

    Ok(LboInput {
        deal: DealParameters {
            company: args.company.clone(),
            purchase_price,
            sponsor_equity,
        },
        debt: DebtInput::Standard(StandardTrancheAmounts {
            term_loan_a: args.term_loan_a,
            term_loan_b: args.term_loan_b,
            revolver: args.revolver,
            subordinated: args.subordinated,
        }),
        operating: OperatingAssumptions {
            base_revenue,
            revenue_growth: growth,
            ebitda_margin,
            capex_rate: args.capex_rate,
            nwc_rate: args.nwc_rate,
            tax_rate: args.tax_rate,
        },
        exit: ExitAssumptions {
            multiples: args
                .exit_multiples
                .clone()
                .unwrap_or_else(default_exit_multiples),
            exit_year: args.exit_year.unwrap_or(DEFAULT_EXIT_YEAR),
        },
        sensitivity: Some(SensitivityRanges::default()),
    })
}

pub fn run_analyze(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lbo_input = build_input(&args)?;
    let result = model::build_lbo(&lbo_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Debt schedule flattened to one row per year and tranche.
pub fn run_schedule(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut lbo_input = build_input(&args)?;
    lbo_input.sensitivity = None;
    let result = model::build_lbo(&lbo_input)?;

    Ok(json!({
        "results": schedule_rows(&result.result.debt_schedule),
        "remaining_debt": result
            .result
            .exit
            .remaining_debt
            .round_dp(2)
            .to_string(),
        "warnings": result.warnings,
    }))
}

fn schedule_rows(schedule: &DebtSchedule) -> Vec<Value> {
    schedule
        .years
        .iter()
        .flat_map(|year| {
            year.tranches.iter().map(move |t| {
                json!({
                    "year": year.year,
                    "tranche": t.tranche,
                    "beginning_balance": t.beginning_balance.round_dp(2).to_string(),
                    "mandatory_payment": t.mandatory_payment.round_dp(2).to_string(),
                    "optional_payment": t.optional_payment.round_dp(2).to_string(),
                    "total_payment": t.total_payment.round_dp(2).to_string(),
                    "interest_payment": t.interest_payment.round_dp(2).to_string(),
                    "ending_balance": t.ending_balance.round_dp(2).to_string(),
                })
            })
        })
        .collect()
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut lbo_input = build_input(&args.deal)?;

    let mut ranges = lbo_input.sensitivity.take().unwrap_or_default();
    if let Some(revenue_adj) = args.revenue_adj {
        ranges.revenue_adj = revenue_adj;
    }
    if let Some(ebitda_adj) = args.ebitda_adj {
        ranges.ebitda_adj = ebitda_adj;
    }
    lbo_input.sensitivity = Some(ranges);

    let result = model::build_lbo(&lbo_input)?;
    let points = result.result.sensitivity.unwrap_or_default();

    Ok(json!({
        "results": points,
        "warnings": result.warnings,
    }))
}
