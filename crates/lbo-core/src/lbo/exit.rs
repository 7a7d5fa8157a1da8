use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::lbo::debt_schedule::DebtSchedule;
use crate::lbo::operating::OperatingProjection;
use crate::lbo::PROJECTION_YEARS;
use crate::types::*;
use crate::LboResult;

/// Multiple that anchors the sensitivity analysis
pub const BASE_CASE_MULTIPLE: Multiple = dec!(10);

/// IRR reported when the sponsor's equity is wiped out
pub const TOTAL_LOSS_IRR: Rate = dec!(-1);

pub const DEFAULT_EXIT_YEAR: u32 = 5;

pub fn default_exit_multiples() -> Vec<Multiple> {
    vec![dec!(8.0), dec!(9.0), dec!(10.0), dec!(11.0), dec!(12.0)]
}

fn default_exit_year() -> u32 {
    DEFAULT_EXIT_YEAR
}

/// Exit timing and the EV/EBITDA multiples to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitAssumptions {
    #[serde(default = "default_exit_multiples")]
    pub multiples: Vec<Multiple>,
    #[serde(default = "default_exit_year")]
    pub exit_year: u32,
}

impl Default for ExitAssumptions {
    fn default() -> Self {
        Self {
            multiples: default_exit_multiples(),
            exit_year: DEFAULT_EXIT_YEAR,
        }
    }
}

/// Sponsor returns at one exit multiple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitScenario {
    pub multiple: Multiple,
    pub enterprise_value: Money,
    pub remaining_debt: Money,
    pub equity_value: Money,
    pub moic: Multiple,
    pub irr: Rate,
}

impl ExitScenario {
    /// Display key such as "10.0x".
    pub fn label(&self) -> String {
        format!("{:.1}x", self.multiple)
    }
}

/// Returns across all evaluated exit multiples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitAnalysis {
    pub exit_year: u32,
    pub exit_ebitda: Money,
    pub remaining_debt: Money,
    pub sponsor_equity: Money,
    pub scenarios: Vec<ExitScenario>,
}

impl ExitAnalysis {
    pub fn scenario(&self, multiple: Multiple) -> Option<&ExitScenario> {
        self.scenarios.iter().find(|s| s.multiple == multiple)
    }

    /// The 10.0x scenario. Sensitivity work is anchored on it.
    pub fn base_case(&self) -> LboResult<&ExitScenario> {
        self.scenario(BASE_CASE_MULTIPLE).ok_or_else(|| {
            LboError::State("exit analysis has no 10.0x base case scenario".into())
        })
    }
}

/// MOIC and annualised IRR for a single terminal equity value.
///
/// MOIC is zero when no equity was invested. IRR is `moic^(1/years) - 1`
/// for a positive MOIC and exactly -1 otherwise.
pub fn sponsor_returns(equity_value: Money, sponsor_equity: Money, years: u32) -> (Multiple, Rate) {
    let moic = if sponsor_equity.is_zero() {
        Decimal::ZERO
    } else {
        equity_value / sponsor_equity
    };

    let irr = if moic > Decimal::ZERO && years > 0 {
        moic.powd(Decimal::ONE / Decimal::from(years)) - Decimal::ONE
    } else {
        TOTAL_LOSS_IRR
    };

    (moic, irr)
}

/// Equity value, MOIC and IRR at one exit multiple.
pub(crate) fn exit_scenario(
    exit_ebitda: Money,
    multiple: Multiple,
    remaining_debt: Money,
    sponsor_equity: Money,
    years: u32,
) -> ExitScenario {
    let enterprise_value = exit_ebitda * multiple;
    let equity_value = (enterprise_value - remaining_debt).max(Decimal::ZERO);
    let (moic, irr) = sponsor_returns(equity_value, sponsor_equity, years);

    ExitScenario {
        multiple,
        enterprise_value,
        remaining_debt,
        equity_value,
        moic,
        irr,
    }
}

/// Evaluate sponsor returns at each exit multiple.
pub fn evaluate_exit(
    assumptions: &ExitAssumptions,
    sponsor_equity: Money,
    operating: &OperatingProjection,
    schedule: &DebtSchedule,
) -> LboResult<ExitAnalysis> {
    let exit_year = assumptions.exit_year;
    if exit_year == 0 || exit_year > PROJECTION_YEARS {
        return Err(LboError::InvalidInput {
            field: "exit_year".into(),
            reason: format!("Exit year must be between 1 and {PROJECTION_YEARS}"),
        });
    }
    if assumptions.multiples.is_empty() {
        return Err(LboError::InvalidInput {
            field: "multiples".into(),
            reason: "At least one exit multiple is required".into(),
        });
    }

    let exit_ebitda = operating
        .year(exit_year)
        .ok_or_else(|| {
            LboError::State(format!("operating projection has no year {exit_year}"))
        })?
        .ebitda;
    let remaining_debt = schedule.remaining_debt(exit_year).ok_or_else(|| {
        LboError::State(format!("debt schedule has no year {exit_year}"))
    })?;

    let scenarios = assumptions
        .multiples
        .iter()
        .map(|&m| exit_scenario(exit_ebitda, m, remaining_debt, sponsor_equity, exit_year))
        .collect();

    Ok(ExitAnalysis {
        exit_year,
        exit_ebitda,
        remaining_debt,
        sponsor_equity,
        scenarios,
    })
}
