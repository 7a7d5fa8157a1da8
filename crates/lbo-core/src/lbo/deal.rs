use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::lbo::debt_structure::DebtStructure;
use crate::types::*;
use crate::LboResult;

/// Headline terms of the transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealParameters {
    /// Target company name (labelling only)
    pub company: String,
    /// Enterprise value paid at entry
    pub purchase_price: Money,
    /// Equity contributed by the sponsor
    pub sponsor_equity: Money,
}

impl DealParameters {
    /// Debt implied by the deal terms. Not necessarily equal to the sum of
    /// the tranches; the engine always uses the tranche sum for calculations.
    pub fn total_debt(&self) -> Money {
        self.purchase_price - self.sponsor_equity
    }

    pub fn validate(&self) -> LboResult<()> {
        if self.purchase_price <= Decimal::ZERO {
            return Err(LboError::InvalidInput {
                field: "purchase_price".into(),
                reason: "Purchase price must be positive".into(),
            });
        }
        if self.sponsor_equity < Decimal::ZERO {
            return Err(LboError::InvalidInput {
                field: "sponsor_equity".into(),
                reason: "Sponsor equity cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// Entry capitalisation as seen by the sponsor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub company: String,
    pub purchase_price: Money,
    pub sponsor_equity: Money,
    /// Purchase price less sponsor equity
    pub deal_total_debt: Money,
    /// Sum of tranche principals
    pub tranche_total_debt: Money,
    /// Deal-level debt over sponsor equity (zero when equity is zero)
    pub debt_to_equity: Multiple,
    /// Whether the tranches fully fund the deal-level debt
    pub balanced: bool,
}

/// Summarise entry capitalisation for a deal and its financing package.
pub fn summarize_transaction(
    deal: &DealParameters,
    debt: &DebtStructure,
) -> LboResult<TransactionSummary> {
    deal.validate()?;

    let deal_total_debt = deal.total_debt();
    let tranche_total_debt = debt.total_principal();
    let debt_to_equity = if deal.sponsor_equity.is_zero() {
        Decimal::ZERO
    } else {
        deal_total_debt / deal.sponsor_equity
    };

    Ok(TransactionSummary {
        company: deal.company.clone(),
        purchase_price: deal.purchase_price,
        sponsor_equity: deal.sponsor_equity,
        deal_total_debt,
        tranche_total_debt,
        debt_to_equity,
        balanced: deal_total_debt == tranche_total_debt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbo::debt_structure::StandardTrancheAmounts;
    use rust_decimal_macros::dec;

    fn techcorp() -> DealParameters {
        DealParameters {
            company: "TechCorp Industries".into(),
            purchase_price: dec!(500),
            sponsor_equity: dec!(150),
        }
    }

    #[test]
    fn test_total_debt_from_deal_terms() {
        assert_eq!(techcorp().total_debt(), dec!(350));
    }

    #[test]
    fn test_summary_balanced() {
        let debt = DebtStructure::standard(&StandardTrancheAmounts {
            term_loan_a: dec!(100),
            term_loan_b: dec!(200),
            revolver: dec!(25),
            subordinated: dec!(25),
        })
        .unwrap();
        let summary = summarize_transaction(&techcorp(), &debt).unwrap();

        assert!(summary.balanced);
        assert_eq!(summary.tranche_total_debt, dec!(350));
        // 350 / 150
        assert_eq!(summary.debt_to_equity, dec!(350) / dec!(150));
    }

    #[test]
    fn test_summary_mismatch_is_reported_not_rejected() {
        let debt = DebtStructure::standard(&StandardTrancheAmounts {
            term_loan_a: dec!(100),
            ..Default::default()
        })
        .unwrap();
        let summary = summarize_transaction(&techcorp(), &debt).unwrap();
        assert!(!summary.balanced);
        assert_eq!(summary.deal_total_debt, dec!(350));
        assert_eq!(summary.tranche_total_debt, dec!(100));
    }

    #[test]
    fn test_zero_equity_ratio_guarded() {
        let mut deal = techcorp();
        deal.sponsor_equity = Decimal::ZERO;
        let summary = summarize_transaction(&deal, &DebtStructure::default()).unwrap();
        assert_eq!(summary.debt_to_equity, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_purchase_price() {
        let mut deal = techcorp();
        deal.purchase_price = Decimal::ZERO;
        assert!(deal.validate().is_err());
    }
}
