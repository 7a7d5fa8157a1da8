use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balances, payments, cash flows and valuations. Never f64.
pub type Money = Decimal;

/// Growth, margin, interest and amortisation rates as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// EV/EBITDA exit multiples and MOIC
pub type Multiple = Decimal;

/// Envelope returned by every top-level model run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a result with its methodology, echoed assumptions, warnings and
/// timing.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    tracing::debug!(
        methodology,
        computation_time_us = elapsed_us,
        warnings = warnings.len(),
        "computation finished"
    );

    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_metadata() {
        let out = with_metadata(
            "Test",
            &serde_json::json!({ "exit_year": 5 }),
            vec!["note".into()],
            17,
            42u32,
        );
        assert_eq!(out.result, 42);
        assert_eq!(out.assumptions["exit_year"], 5);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.metadata.computation_time_us, 17);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.metadata.version, env!("CARGO_PKG_VERSION"));
    }
}
