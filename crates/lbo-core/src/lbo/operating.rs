use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::lbo::debt_structure::DebtStructure;
use crate::lbo::PROJECTION_YEARS;
use crate::types::*;
use crate::LboResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Depreciation as a fraction of revenue
const DEPRECIATION_RATE: Rate = dec!(0.03);
/// Annual decay applied to entry interest cost to approximate debt paydown
const INTEREST_DECAY: Decimal = dec!(0.9);

fn default_capex_rate() -> Rate {
    dec!(0.03)
}

fn default_nwc_rate() -> Rate {
    dec!(0.02)
}

fn default_tax_rate() -> Rate {
    dec!(0.25)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Operating assumptions for the five-year projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingAssumptions {
    /// Year 1 revenue
    pub base_revenue: Money,
    /// Growth rate applied for each transition from year 2 onwards. The last
    /// value is reused when fewer rates than transitions are supplied.
    pub revenue_growth: Vec<Rate>,
    /// EBITDA as a fraction of revenue
    pub ebitda_margin: Rate,
    /// Capex as a fraction of revenue
    #[serde(default = "default_capex_rate")]
    pub capex_rate: Rate,
    /// Working capital build as a fraction of the revenue increase
    #[serde(default = "default_nwc_rate")]
    pub nwc_rate: Rate,
    /// Tax rate on positive EBT
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Rate,
}

impl OperatingAssumptions {
    /// Assumptions with the default capex, working capital and tax rates.
    pub fn new(base_revenue: Money, revenue_growth: Vec<Rate>, ebitda_margin: Rate) -> Self {
        Self {
            base_revenue,
            revenue_growth,
            ebitda_margin,
            capex_rate: default_capex_rate(),
            nwc_rate: default_nwc_rate(),
            tax_rate: default_tax_rate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Income statement and cash flow lines for a single projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingYear {
    pub year: u32,
    pub revenue: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub ebit: Money,
    pub interest_expense: Money,
    pub ebt: Money,
    pub taxes: Money,
    pub net_income: Money,
    pub operating_cash_flow: Money,
    pub capex: Money,
    pub nwc_change: Money,
    pub free_cash_flow: Money,
}

/// The full projection, one record per year in increasing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingProjection {
    pub years: Vec<OperatingYear>,
}

impl OperatingProjection {
    pub fn year(&self, year: u32) -> Option<&OperatingYear> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Get a growth rate by index, reusing the last value if the vector is
/// shorter than the requested index.
fn growth_rate(rates: &[Rate], index: usize) -> Option<Rate> {
    rates.get(index).or_else(|| rates.last()).copied()
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project five years of operating results.
///
/// Interest expense is an approximation taken from the debt structure alone:
/// entry principal times the weighted-average rate, decayed by 10% a year. The
/// tranche-level debt schedule is not consulted.
pub fn project_operations(
    assumptions: &OperatingAssumptions,
    debt: &DebtStructure,
) -> LboResult<OperatingProjection> {
    if assumptions.revenue_growth.is_empty() && PROJECTION_YEARS > 1 {
        return Err(LboError::Configuration(
            "revenue_growth must contain at least one rate for a multi-year projection".into(),
        ));
    }
    if debt.is_empty() {
        return Err(LboError::Configuration(
            "debt structure must be set before interest expense can be projected".into(),
        ));
    }

    let total_principal = debt.total_principal();
    let weighted_rate = debt.weighted_average_rate();

    let mut years: Vec<OperatingYear> = Vec::with_capacity(PROJECTION_YEARS as usize);
    let mut prev_revenue: Option<Money> = None;

    for year in 1..=PROJECTION_YEARS {
        let revenue = match prev_revenue {
            None => assumptions.base_revenue,
            Some(prev) => {
                let idx = (year - 2) as usize;
                let growth = growth_rate(&assumptions.revenue_growth, idx).ok_or_else(|| {
                    LboError::Configuration(format!("no growth rate available for year {year}"))
                })?;
                prev * (Decimal::ONE + growth)
            }
        };

        // P&L
        let ebitda = revenue * assumptions.ebitda_margin;
        let depreciation = revenue * DEPRECIATION_RATE;
        let ebit = ebitda - depreciation;

        let decay = INTEREST_DECAY.powu(u64::from(year - 1));
        let interest_expense = total_principal * weighted_rate * decay;

        let ebt = ebit - interest_expense;
        let taxes = (ebt * assumptions.tax_rate).max(Decimal::ZERO);
        let net_income = ebt - taxes;

        // Cash flow
        let operating_cash_flow = net_income + depreciation;
        let capex = revenue * assumptions.capex_rate;
        let nwc_change = match prev_revenue {
            None => Decimal::ZERO,
            Some(prev) => (revenue - prev) * assumptions.nwc_rate,
        };
        let free_cash_flow = operating_cash_flow - capex - nwc_change;

        years.push(OperatingYear {
            year,
            revenue,
            ebitda,
            depreciation,
            ebit,
            interest_expense,
            ebt,
            taxes,
            net_income,
            operating_cash_flow,
            capex,
            nwc_change,
            free_cash_flow,
        });

        prev_revenue = Some(revenue);
    }

    Ok(OperatingProjection { years })
}
