use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::lbo::debt_schedule::DebtSchedule;
use crate::lbo::exit::{exit_scenario, ExitAnalysis, BASE_CASE_MULTIPLE};
use crate::lbo::operating::OperatingProjection;
use crate::lbo::PROJECTION_YEARS;
use crate::types::*;
use crate::LboResult;

// ---------------------------------------------------------------------------
// Two-factor sensitivity
// ---------------------------------------------------------------------------

fn default_revenue_adjustments() -> Vec<Rate> {
    vec![dec!(-0.1), dec!(0), dec!(0.1)]
}

fn default_ebitda_adjustments() -> Vec<Rate> {
    vec![dec!(-0.02), dec!(0), dec!(0.02)]
}

/// Multiplicative shocks applied to exit EBITDA
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRanges {
    #[serde(default = "default_revenue_adjustments")]
    pub revenue_adj: Vec<Rate>,
    #[serde(default = "default_ebitda_adjustments")]
    pub ebitda_adj: Vec<Rate>,
}

impl Default for SensitivityRanges {
    fn default() -> Self {
        Self {
            revenue_adj: default_revenue_adjustments(),
            ebitda_adj: default_ebitda_adjustments(),
        }
    }
}

/// Returns for one (revenue, EBITDA) shock pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub revenue_adj: Rate,
    pub ebitda_adj: Rate,
    pub adjusted_ebitda: Money,
    pub remaining_debt: Money,
    pub irr: Rate,
    pub moic: Multiple,
}

/// Shock final-year EBITDA across every (revenue, EBITDA) pair and re-price
/// the 10.0x exit. Debt is held at the base case's remaining balance.
///
/// Rows are ordered with revenue adjustments outermost.
pub fn run_sensitivity(
    ranges: &SensitivityRanges,
    exit: &ExitAnalysis,
    operating: &OperatingProjection,
) -> LboResult<Vec<SensitivityPoint>> {
    let base = exit.base_case()?;
    let base_ebitda = operating
        .year(PROJECTION_YEARS)
        .ok_or_else(|| {
            LboError::State(format!(
                "sensitivity requires year {PROJECTION_YEARS} of the operating projection"
            ))
        })?
        .ebitda;
    let remaining_debt = base.remaining_debt;

    let mut points = Vec::with_capacity(ranges.revenue_adj.len() * ranges.ebitda_adj.len());
    for &revenue_adj in &ranges.revenue_adj {
        for &ebitda_adj in &ranges.ebitda_adj {
            let adjusted_ebitda =
                base_ebitda * (Decimal::ONE + revenue_adj) * (Decimal::ONE + ebitda_adj);
            let scenario = exit_scenario(
                adjusted_ebitda,
                BASE_CASE_MULTIPLE,
                remaining_debt,
                exit.sponsor_equity,
                PROJECTION_YEARS,
            );
            points.push(SensitivityPoint {
                revenue_adj,
                ebitda_adj,
                adjusted_ebitda,
                remaining_debt,
                irr: scenario.irr,
                moic: scenario.moic,
            });
        }
    }

    Ok(points)
}

// ---------------------------------------------------------------------------
// Exit year x multiple returns grid
// ---------------------------------------------------------------------------

const GRID_EXIT_YEARS: std::ops::RangeInclusive<u32> = 3..=7;

fn grid_multiples() -> Vec<Multiple> {
    vec![dec!(8), dec!(9), dec!(10), dec!(11), dec!(12)]
}

/// IRRs for one exit year across the grid multiples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsGridRow {
    pub exit_year: u32,
    /// Projection year supplying EBITDA and debt (capped at the horizon)
    pub data_year: u32,
    pub irr: Vec<Rate>,
}

/// IRR heat map over exit years 3-7 and multiples 8x-12x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsGrid {
    pub multiples: Vec<Multiple>,
    pub rows: Vec<ReturnsGridRow>,
}

impl ReturnsGrid {
    pub fn irr(&self, exit_year: u32, multiple: Multiple) -> Option<Rate> {
        let col = self.multiples.iter().position(|m| *m == multiple)?;
        self.rows
            .iter()
            .find(|r| r.exit_year == exit_year)
            .and_then(|r| r.irr.get(col).copied())
    }
}

/// Build the exit-year by multiple IRR grid. Exit years beyond the projection
/// horizon reuse final-year EBITDA and debt but annualise over the longer hold.
pub fn build_returns_grid(
    sponsor_equity: Money,
    operating: &OperatingProjection,
    schedule: &DebtSchedule,
) -> LboResult<ReturnsGrid> {
    let multiples = grid_multiples();
    let mut rows = Vec::new();

    for exit_year in GRID_EXIT_YEARS {
        let data_year = exit_year.min(PROJECTION_YEARS);
        let ebitda = operating
            .year(data_year)
            .ok_or_else(|| {
                LboError::State(format!("operating projection has no year {data_year}"))
            })?
            .ebitda;
        let remaining_debt = schedule.remaining_debt(data_year).ok_or_else(|| {
            LboError::State(format!("debt schedule has no year {data_year}"))
        })?;

        let irr = multiples
            .iter()
            .map(|&m| exit_scenario(ebitda, m, remaining_debt, sponsor_equity, exit_year).irr)
            .collect();

        rows.push(ReturnsGridRow {
            exit_year,
            data_year,
            irr,
        });
    }

    Ok(ReturnsGrid { multiples, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbo::debt_schedule::build_debt_schedule;
    use crate::lbo::debt_structure::{DebtStructure, StandardTrancheAmounts};
    use crate::lbo::exit::{evaluate_exit, sponsor_returns, ExitAssumptions};
    use crate::lbo::operating::{project_operations, OperatingAssumptions};
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    fn techcorp() -> (OperatingProjection, DebtSchedule, ExitAnalysis) {
        let debt = DebtStructure::standard(&StandardTrancheAmounts {
            term_loan_a: dec!(100),
            term_loan_b: dec!(200),
            revolver: dec!(25),
            subordinated: dec!(25),
        })
        .unwrap();
        let assumptions = OperatingAssumptions::new(
            dec!(200),
            vec![dec!(0.08), dec!(0.07), dec!(0.06), dec!(0.05)],
            dec!(0.25),
        );
        let operating = project_operations(&assumptions, &debt).unwrap();
        let schedule = build_debt_schedule(&debt, &operating).unwrap();
        let exit = evaluate_exit(&ExitAssumptions::default(), dec!(150), &operating, &schedule)
            .unwrap();
        (operating, schedule, exit)
    }

    #[test]
    fn test_nine_points_in_nested_order() {
        let (op, _, exit) = techcorp();
        let points = run_sensitivity(&SensitivityRanges::default(), &exit, &op).unwrap();
        assert_eq!(points.len(), 9);

        let order: Vec<(Rate, Rate)> =
            points.iter().map(|p| (p.revenue_adj, p.ebitda_adj)).collect();
        assert_eq!(
            order,
            vec![
                (dec!(-0.1), dec!(-0.02)),
                (dec!(-0.1), dec!(0)),
                (dec!(-0.1), dec!(0.02)),
                (dec!(0), dec!(-0.02)),
                (dec!(0), dec!(0)),
                (dec!(0), dec!(0.02)),
                (dec!(0.1), dec!(-0.02)),
                (dec!(0.1), dec!(0)),
                (dec!(0.1), dec!(0.02)),
            ]
        );
    }

    #[test]
    fn test_debt_fixed_at_base_case() {
        let (op, _, exit) = techcorp();
        let base = exit.base_case().unwrap().clone();
        let points = run_sensitivity(&SensitivityRanges::default(), &exit, &op).unwrap();
        assert!(points.iter().all(|p| p.remaining_debt == base.remaining_debt));

        // The unshocked cell reproduces the base case
        let centre = &points[4];
        assert!((centre.moic - base.moic).abs() < dec!(0.0000000001));
        assert!((centre.irr - base.irr).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_point_returns_formula() {
        let (op, _, exit) = techcorp();
        let points = run_sensitivity(&SensitivityRanges::default(), &exit, &op).unwrap();
        let p = &points[0];
        let ebitda5 = op.year(5).unwrap().ebitda;
        let adjusted = ebitda5 * dec!(0.9) * dec!(0.98);
        assert_eq!(p.adjusted_ebitda, adjusted);

        let equity = (adjusted * dec!(10) - p.remaining_debt).max(Decimal::ZERO);
        assert_eq!(p.moic, equity / dec!(150));
        assert_eq!(p.irr, p.moic.powd(Decimal::ONE / dec!(5)) - Decimal::ONE);
    }

    #[test]
    fn test_requires_base_case() {
        let (op, sched, _) = techcorp();
        let assumptions = ExitAssumptions {
            multiples: vec![dec!(9)],
            exit_year: 5,
        };
        let exit = evaluate_exit(&assumptions, dec!(150), &op, &sched).unwrap();
        let err = run_sensitivity(&SensitivityRanges::default(), &exit, &op).unwrap_err();
        assert!(matches!(err, LboError::State(_)));
    }

    #[test]
    fn test_empty_range_gives_no_points() {
        let (op, _, exit) = techcorp();
        let ranges = SensitivityRanges {
            revenue_adj: vec![],
            ebitda_adj: vec![dec!(0)],
        };
        assert!(run_sensitivity(&ranges, &exit, &op).unwrap().is_empty());
    }

    #[test]
    fn test_zero_sponsor_equity_sensitivity_is_total_loss() {
        let (op, sched, _) = techcorp();
        let exit = evaluate_exit(&ExitAssumptions::default(), Decimal::ZERO, &op, &sched)
            .unwrap();
        let points = run_sensitivity(&SensitivityRanges::default(), &exit, &op).unwrap();

        assert_eq!(points.len(), 9);
        for p in &points {
            assert!(p.adjusted_ebitda * dec!(10) > p.remaining_debt);
            assert_eq!(p.moic, Decimal::ZERO);
            assert_eq!(p.irr, dec!(-1));
        }
    }

    #[test]
    fn test_zero_sponsor_equity_grid_is_total_loss() {
        let (op, sched, _) = techcorp();
        let grid = build_returns_grid(Decimal::ZERO, &op, &sched).unwrap();
        assert_eq!(grid.rows.len(), 5);
        for row in &grid.rows {
            assert!(row.irr.iter().all(|irr| *irr == dec!(-1)));
        }
    }

    #[test]
    fn test_returns_grid_shape() {
        let (op, sched, _) = techcorp();
        let grid = build_returns_grid(dec!(150), &op, &sched).unwrap();
        assert_eq!(grid.multiples.len(), 5);
        let years: Vec<u32> = grid.rows.iter().map(|r| r.exit_year).collect();
        assert_eq!(years, vec![3, 4, 5, 6, 7]);
        assert!(grid.rows.iter().all(|r| r.irr.len() == 5));
        assert_eq!(grid.rows[3].data_year, 5);
        assert_eq!(grid.rows[4].data_year, 5);
    }

    #[test]
    fn test_returns_grid_matches_exit_analysis_at_year_five() {
        let (op, sched, exit) = techcorp();
        let grid = build_returns_grid(dec!(150), &op, &sched).unwrap();
        let base = exit.base_case().unwrap();
        let irr = grid.irr(5, dec!(10)).unwrap();
        assert!((irr - base.irr).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_returns_grid_longer_hold_uses_final_year() {
        let (op, sched, _) = techcorp();
        let grid = build_returns_grid(dec!(150), &op, &sched).unwrap();

        let ebitda5 = op.year(5).unwrap().ebitda;
        let debt5 = sched.remaining_debt(5).unwrap();
        let equity = (ebitda5 * dec!(12) - debt5).max(Decimal::ZERO);
        let (_, expected) = sponsor_returns(equity, dec!(150), 7);
        assert_eq!(grid.irr(7, dec!(12)), Some(expected));
        // Same exit value spread over a longer hold lowers the IRR
        assert!(grid.irr(7, dec!(12)).unwrap() < grid.irr(5, dec!(12)).unwrap());
    }
}
