use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML deal file and deserialise into a typed struct.
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
pub fn read_input<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let value: T = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lbo_core::lbo::model::{DebtInput, LboInput};
    use rust_decimal_macros::dec;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lbo-cli-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_yaml_deal_file() {
        let path = write_temp(
            "deal.yaml",
            r#"
deal:
  company: TechCorp Industries
  purchase_price: 500
  sponsor_equity: 150
debt:
  term_loan_a: 100
  term_loan_b: 200
  revolver: 25
  subordinated: 25
operating:
  base_revenue: 200
  revenue_growth: [0.08, 0.07, 0.06, 0.05]
  ebitda_margin: 0.25
"#,
        );
        let input: LboInput = read_input(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(input.deal.company, "TechCorp Industries");
        assert_eq!(input.operating.ebitda_margin, dec!(0.25));
        assert_eq!(input.exit.exit_year, 5);
        assert!(matches!(input.debt, DebtInput::Standard(_)));
    }

    #[test]
    fn test_json_deal_file() {
        let path = write_temp(
            "deal.json",
            r#"{
                "deal": { "company": "Widgets", "purchase_price": "300", "sponsor_equity": "100" },
                "debt": { "term_loan_b": "200" },
                "operating": {
                    "base_revenue": "120",
                    "revenue_growth": ["0.05"],
                    "ebitda_margin": "0.3"
                },
                "sensitivity": null
            }"#,
        );
        let input: LboInput = read_input(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(input.deal.purchase_price, dec!(300));
        assert!(input.sensitivity.is_none());
    }

    #[test]
    fn test_missing_file() {
        let result: Result<LboInput, _> = read_input("/nonexistent/deal.json");
        assert!(result.unwrap_err().to_string().contains("File not found"));
    }
}
