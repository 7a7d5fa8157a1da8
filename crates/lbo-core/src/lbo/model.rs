use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::lbo::deal::{self, DealParameters, TransactionSummary};
use crate::lbo::debt_schedule::{self, DebtSchedule};
use crate::lbo::debt_structure::{DebtStructure, StandardTrancheAmounts, Tranche};
use crate::lbo::exit::{self, ExitAnalysis, ExitAssumptions};
use crate::lbo::operating::{self, OperatingAssumptions, OperatingProjection};
use crate::lbo::sensitivity::{self, ReturnsGrid, SensitivityPoint, SensitivityRanges};
use crate::types::*;
use crate::LboResult;

/// Financing package: either the standard four tranches by amount, or an
/// explicit ordered list of tranches.
///
/// Custom tranches are validated by `to_structure`, not during
/// deserialisation, so bad terms surface as `InvalidInput`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebtInput {
    Custom { tranches: Vec<Tranche> },
    Standard(StandardTrancheAmounts),
}

impl DebtInput {
    pub fn to_structure(&self) -> LboResult<DebtStructure> {
        match self {
            DebtInput::Custom { tranches } => DebtStructure::new(tranches.clone()),
            DebtInput::Standard(amounts) => DebtStructure::standard(amounts),
        }
    }
}

fn default_sensitivity() -> Option<SensitivityRanges> {
    Some(SensitivityRanges::default())
}

/// Input for a full LBO model run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboInput {
    pub deal: DealParameters,
    pub debt: DebtInput,
    pub operating: OperatingAssumptions,
    #[serde(default)]
    pub exit: ExitAssumptions,
    /// Shock ranges for the 10.0x sensitivity table; `null` skips it
    #[serde(default = "default_sensitivity")]
    pub sensitivity: Option<SensitivityRanges>,
}

/// Full LBO model output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboOutput {
    pub summary: TransactionSummary,
    pub debt_structure: DebtStructure,
    pub operating: OperatingProjection,
    pub debt_schedule: DebtSchedule,
    pub exit: ExitAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Vec<SensitivityPoint>>,
    pub returns_grid: ReturnsGrid,
}

/// Build a complete LBO model from entry through exit.
///
/// Each stage is a pure function of the outputs before it:
/// summary, operating projection, debt schedule, exit analysis, sensitivity
/// and the exit-year returns grid. Any stage error aborts the run.
pub fn build_lbo(input: &LboInput) -> LboResult<ComputationOutput<LboOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    tracing::info!(company = %input.deal.company, "building LBO model");

    // ─── Entry ───────────────────────────────────────────────────────
    let debt = input.debt.to_structure()?;
    let summary = deal::summarize_transaction(&input.deal, &debt)?;

    if !summary.balanced {
        warnings.push(format!(
            "Tranche total {} differs from deal debt {}; tranche total is used",
            summary.tranche_total_debt, summary.deal_total_debt
        ));
    }
    if input.deal.sponsor_equity > input.deal.purchase_price {
        warnings.push("Sponsor equity exceeds purchase price".into());
    }
    if input.deal.sponsor_equity.is_zero() {
        warnings.push("Sponsor equity is zero; MOIC is reported as 0".into());
    }

    // ─── Operating projection ────────────────────────────────────────
    let operating = operating::project_operations(&input.operating, &debt)?;
    for year in operating.years.iter().filter(|y| y.free_cash_flow < Decimal::ZERO) {
        warnings.push(format!(
            "Year {}: negative free cash flow of {}",
            year.year, year.free_cash_flow
        ));
    }

    // ─── Debt schedule ───────────────────────────────────────────────
    let debt_schedule = debt_schedule::build_debt_schedule(&debt, &operating)?;

    // ─── Exit & returns ──────────────────────────────────────────────
    let exit =
        exit::evaluate_exit(&input.exit, input.deal.sponsor_equity, &operating, &debt_schedule)?;
    for scenario in exit.scenarios.iter().filter(|s| s.equity_value.is_zero()) {
        warnings.push(format!(
            "{} exit: enterprise value does not cover remaining debt",
            scenario.label()
        ));
    }

    let sensitivity = input
        .sensitivity
        .as_ref()
        .map(|ranges| sensitivity::run_sensitivity(ranges, &exit, &operating))
        .transpose()?;

    let returns_grid =
        sensitivity::build_returns_grid(input.deal.sponsor_equity, &operating, &debt_schedule)?;

    for w in &warnings {
        tracing::warn!(company = %input.deal.company, "{w}");
    }

    let output = LboOutput {
        summary,
        debt_structure: debt,
        operating,
        debt_schedule,
        exit,
        sensitivity,
        returns_grid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Leveraged Buyout Model",
        &serde_json::json!({
            "company": input.deal.company,
            "purchase_price": input.deal.purchase_price.to_string(),
            "sponsor_equity": input.deal.sponsor_equity.to_string(),
            "exit_year": input.exit.exit_year,
            "num_tranches": output.debt_structure.len(),
            "cash_sweep": "Term Loan B only",
            "interest_expense": "weighted-average rate on entry debt, decayed 10% per year",
        }),
        warnings,
        elapsed,
        output,
    ))
}
