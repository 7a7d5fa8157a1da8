use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::lbo::debt_structure::{DebtStructure, Tranche};
use crate::lbo::operating::OperatingProjection;
use crate::lbo::PROJECTION_YEARS;
use crate::types::*;
use crate::LboResult;

/// A single tranche in a single year of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheYearState {
    pub tranche: String,
    pub beginning_balance: Money,
    pub mandatory_payment: Money,
    pub optional_payment: Money,
    pub total_payment: Money,
    pub interest_payment: Money,
    pub ending_balance: Money,
}

/// All tranches for one year, in structure order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleYear {
    pub year: u32,
    /// Free cash flow available for principal repayment
    pub cash_available: Money,
    /// Pool left after the waterfall (negative when mandatory payments exceed FCF)
    pub cash_remaining: Money,
    pub tranches: Vec<TrancheYearState>,
}

impl ScheduleYear {
    pub fn tranche(&self, name: &str) -> Option<&TrancheYearState> {
        self.tranches.iter().find(|t| t.tranche == name)
    }

    /// Sum of ending balances across all tranches.
    pub fn remaining_debt(&self) -> Money {
        self.tranches.iter().map(|t| t.ending_balance).sum()
    }

    pub fn total_interest(&self) -> Money {
        self.tranches.iter().map(|t| t.interest_payment).sum()
    }

    pub fn total_payment(&self) -> Money {
        self.tranches.iter().map(|t| t.total_payment).sum()
    }
}

/// Year-by-year, tranche-by-tranche amortisation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub years: Vec<ScheduleYear>,
}

impl DebtSchedule {
    pub fn year(&self, year: u32) -> Option<&ScheduleYear> {
        self.years.iter().find(|y| y.year == year)
    }

    /// Total debt outstanding at the end of `year`.
    pub fn remaining_debt(&self, year: u32) -> Option<Money> {
        self.year(year).map(ScheduleYear::remaining_debt)
    }

    pub fn total_interest(&self, year: u32) -> Option<Money> {
        self.year(year).map(ScheduleYear::total_interest)
    }

    /// Ending balance of one tranche for every year.
    pub fn balance_series(&self, tranche: &str) -> Option<Vec<Money>> {
        self.years
            .iter()
            .map(|y| y.tranche(tranche).map(|t| t.ending_balance))
            .collect()
    }
}

/// Apply one year of amortisation to a tranche against the shared cash pool.
fn amortize(tranche: &Tranche, beginning: Money, pool: Money) -> TrancheYearState {
    let mandatory = (beginning * tranche.amortization).min(beginning);

    let optional = if tranche.receives_sweep() && pool > mandatory {
        (pool - mandatory).min(beginning - mandatory)
    } else {
        Decimal::ZERO
    };

    let total = mandatory + optional;

    TrancheYearState {
        tranche: tranche.name.clone(),
        beginning_balance: beginning,
        mandatory_payment: mandatory,
        optional_payment: optional,
        total_payment: total,
        interest_payment: beginning * tranche.rate,
        ending_balance: (beginning - total).max(Decimal::ZERO),
    }
}

/// Build the debt schedule for the projection horizon.
///
/// Each year's free cash flow forms a pool. Tranches are visited in structure
/// order; each pays its mandatory amortisation and the pool is reduced by the
/// tranche's total payment. Only Term Loan B takes an optional prepayment from
/// what is left of the pool. Interest is reported per tranche and is not
/// deducted from the pool.
pub fn build_debt_schedule(
    debt: &DebtStructure,
    operating: &OperatingProjection,
) -> LboResult<DebtSchedule> {
    if debt.is_empty() {
        return Err(LboError::State("debt schedule requires a debt structure".into()));
    }
    if operating.len() < PROJECTION_YEARS as usize {
        return Err(LboError::State(format!(
            "debt schedule requires a {PROJECTION_YEARS}-year operating projection, got {} years",
            operating.len()
        )));
    }

    let mut balances: Vec<Money> = debt.tranches().iter().map(|t| t.principal).collect();
    let mut years: Vec<ScheduleYear> = Vec::with_capacity(PROJECTION_YEARS as usize);

    for year in 1..=PROJECTION_YEARS {
        let op_year = operating.year(year).ok_or_else(|| {
            LboError::State(format!("operating projection is missing year {year}"))
        })?;

        let cash_available = op_year.free_cash_flow;
        let mut pool = cash_available;
        let mut tranches = Vec::with_capacity(debt.len());

        for (tranche, balance) in debt.tranches().iter().zip(balances.iter_mut()) {
            let state = amortize(tranche, *balance, pool);
            pool -= state.total_payment;
            *balance = state.ending_balance;
            tranches.push(state);
        }

        let schedule_year = ScheduleYear {
            year,
            cash_available,
            cash_remaining: pool,
            tranches,
        };

        tracing::debug!(
            year,
            cash_available = %cash_available,
            total_payment = %schedule_year.total_payment(),
            remaining_debt = %schedule_year.remaining_debt(),
            "debt schedule year"
        );

        years.push(schedule_year);
    }

    Ok(DebtSchedule { years })
}
