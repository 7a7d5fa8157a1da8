use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::types::*;
use crate::LboResult;

/// The only tranche that receives discretionary prepayments from excess cash.
pub const SWEEP_TRANCHE: &str = "Term Loan B";

pub const TERM_LOAN_A: &str = "Term Loan A";
pub const TERM_LOAN_B: &str = SWEEP_TRANCHE;
pub const REVOLVER: &str = "Revolver";
pub const SUBORDINATED_DEBT: &str = "Subordinated Debt";

/// Terms of a single debt tranche
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    pub name: String,
    /// Principal drawn at close
    pub principal: Money,
    /// All-in annual cash interest rate
    pub rate: Rate,
    /// Tenor in years (informational; the schedule runs the projection horizon)
    pub term_years: u32,
    /// Mandatory annual amortisation as a fraction of the beginning balance
    pub amortization: Rate,
    /// Lower = more senior
    pub seniority: u32,
}

impl Tranche {
    /// Whether excess cash is swept into this tranche.
    pub fn receives_sweep(&self) -> bool {
        self.name == SWEEP_TRANCHE
    }

    fn validate(&self) -> LboResult<()> {
        if self.name.trim().is_empty() {
            return Err(LboError::InvalidInput {
                field: "tranche.name".into(),
                reason: "Tranche name cannot be empty".into(),
            });
        }
        if self.principal < Decimal::ZERO {
            return Err(LboError::InvalidInput {
                field: format!("tranche:{}", self.name),
                reason: "Principal cannot be negative".into(),
            });
        }
        if self.rate < Decimal::ZERO || self.rate > Decimal::ONE {
            return Err(LboError::InvalidInput {
                field: format!("tranche:{}", self.name),
                reason: "Interest rate must be between 0 and 1".into(),
            });
        }
        if self.amortization < Decimal::ZERO || self.amortization > Decimal::ONE {
            return Err(LboError::InvalidInput {
                field: format!("tranche:{}", self.name),
                reason: "Amortisation rate must be between 0 and 1".into(),
            });
        }
        Ok(())
    }
}

/// Principal amounts for the standard four-tranche financing package.
/// Rates, tenors, amortisation and seniority are fixed by the package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StandardTrancheAmounts {
    pub term_loan_a: Money,
    pub term_loan_b: Money,
    pub revolver: Money,
    pub subordinated: Money,
}

/// Ordered set of tranches. Declaration order drives the cash waterfall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tranche>", into = "Vec<Tranche>")]
pub struct DebtStructure {
    tranches: Vec<Tranche>,
}

impl DebtStructure {
    /// Build a structure from an ordered list of tranches with unique names.
    pub fn new(tranches: Vec<Tranche>) -> LboResult<Self> {
        for (i, tranche) in tranches.iter().enumerate() {
            tranche.validate()?;
            if tranches[..i].iter().any(|t| t.name == tranche.name) {
                return Err(LboError::InvalidInput {
                    field: format!("tranche:{}", tranche.name),
                    reason: "Duplicate tranche name".into(),
                });
            }
        }
        Ok(Self { tranches })
    }

    /// Term Loan A, Term Loan B, Revolver and Subordinated Debt, in that order.
    pub fn standard(amounts: &StandardTrancheAmounts) -> LboResult<Self> {
        Self::new(vec![
            Tranche {
                name: TERM_LOAN_A.into(),
                principal: amounts.term_loan_a,
                rate: dec!(0.045),
                term_years: 7,
                amortization: dec!(0.15),
                seniority: 1,
            },
            Tranche {
                name: TERM_LOAN_B.into(),
                principal: amounts.term_loan_b,
                rate: dec!(0.065),
                term_years: 8,
                amortization: dec!(0.01),
                seniority: 2,
            },
            Tranche {
                name: REVOLVER.into(),
                principal: amounts.revolver,
                rate: dec!(0.035),
                term_years: 5,
                amortization: Decimal::ZERO,
                seniority: 1,
            },
            Tranche {
                name: SUBORDINATED_DEBT.into(),
                principal: amounts.subordinated,
                rate: dec!(0.085),
                term_years: 10,
                amortization: Decimal::ZERO,
                seniority: 3,
            },
        ])
    }

    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    pub fn get(&self, name: &str) -> Option<&Tranche> {
        self.tranches.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tranches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tranches.len()
    }

    /// Tranches actually drawn at close.
    pub fn active_tranches(&self) -> impl Iterator<Item = &Tranche> {
        self.tranches.iter().filter(|t| t.principal > Decimal::ZERO)
    }

    pub fn total_principal(&self) -> Money {
        self.tranches.iter().map(|t| t.principal).sum()
    }

    /// Principal-weighted average interest rate; zero for an undrawn structure.
    pub fn weighted_average_rate(&self) -> Rate {
        let total = self.total_principal();
        if total.is_zero() {
            return Decimal::ZERO;
        }
        let weighted: Money = self.tranches.iter().map(|t| t.principal * t.rate).sum();
        weighted / total
    }
}

impl TryFrom<Vec<Tranche>> for DebtStructure {
    type Error = LboError;

    fn try_from(tranches: Vec<Tranche>) -> Result<Self, Self::Error> {
        Self::new(tranches)
    }
}

impl From<DebtStructure> for Vec<Tranche> {
    fn from(structure: DebtStructure) -> Self {
        structure.tranches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard() -> DebtStructure {
        DebtStructure::standard(&StandardTrancheAmounts {
            term_loan_a: dec!(100),
            term_loan_b: dec!(200),
            revolver: dec!(25),
            subordinated: dec!(25),
        })
        .unwrap()
    }

    #[test]
    fn test_standard_order_and_terms() {
        let debt = standard();
        let names: Vec<&str> = debt.tranches().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Term Loan A", "Term Loan B", "Revolver", "Subordinated Debt"]
        );

        let tlb = debt.get("Term Loan B").unwrap();
        assert_eq!(tlb.rate, dec!(0.065));
        assert_eq!(tlb.amortization, dec!(0.01));
        assert!(tlb.receives_sweep());
        assert!(!debt.get("Term Loan A").unwrap().receives_sweep());
    }

    #[test]
    fn test_total_and_weighted_rate() {
        let debt = standard();
        assert_eq!(debt.total_principal(), dec!(350));
        // (4.5 + 13 + 0.875 + 2.125) / 350
        assert_eq!(debt.weighted_average_rate(), dec!(20.5) / dec!(350));
    }

    #[test]
    fn test_zero_principal_weighted_rate_is_zero() {
        let debt = DebtStructure::standard(&StandardTrancheAmounts::default()).unwrap();
        assert_eq!(debt.total_principal(), Decimal::ZERO);
        assert_eq!(debt.weighted_average_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_active_tranches_skip_undrawn() {
        let debt = DebtStructure::standard(&StandardTrancheAmounts {
            term_loan_b: dec!(200),
            subordinated: dec!(25),
            ..Default::default()
        })
        .unwrap();
        let active: Vec<&str> = debt.active_tranches().map(|t| t.name.as_str()).collect();
        assert_eq!(active, vec!["Term Loan B", "Subordinated Debt"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let tranche = standard().tranches()[0].clone();
        assert!(DebtStructure::new(vec![tranche.clone(), tranche]).is_err());
    }

    #[test]
    fn test_negative_principal_rejected() {
        let result = DebtStructure::standard(&StandardTrancheAmounts {
            revolver: dec!(-1),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let mut tranche = standard().tranches()[0].clone();
        tranche.rate = dec!(1.5);
        assert!(DebtStructure::new(vec![tranche]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!([
            { "name": "Senior", "principal": "100", "rate": "0.05",
              "term_years": 5, "amortization": "0.1", "seniority": 1 },
            { "name": "Senior", "principal": "50", "rate": "0.07",
              "term_years": 7, "amortization": "0", "seniority": 2 }
        ]);
        let parsed: Result<DebtStructure, _> = serde_json::from_value(json);
        assert!(parsed.is_err());
    }
}
