use rust_decimal::Decimal;
use serde_json::Value;

use lbo_core::lbo::exit::BASE_CASE_MULTIPLE;

/// Print just the key answer value from the output.
///
/// A full model run prints the 10.0x base-case IRR. Row sets print one
/// value per row. Anything else falls back to well-known fields in priority
/// order, then the first field.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

const PRIORITY_KEYS: [&str; 4] = ["irr", "moic", "equity_value", "remaining_debt"];

fn minimal_lines(value: &Value) -> Vec<String> {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(irr) = base_case_irr(result_obj) {
        return vec![format_minimal(irr)];
    }

    if let Some(Value::Array(rows)) = value.get("results") {
        if rows.iter().any(|r| priority_value(r).is_some()) {
            return rows
                .iter()
                .filter_map(priority_value)
                .map(format_minimal)
                .collect();
        }
    }

    if let Some(val) = priority_value(result_obj) {
        return vec![format_minimal(val)];
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            return vec![format!("{}: {}", key, format_minimal(val))];
        }
    }

    vec![format_minimal(result_obj)]
}

fn base_case_irr(result: &Value) -> Option<&Value> {
    result
        .get("exit")?
        .get("scenarios")?
        .as_array()?
        .iter()
        .find(|s| {
            s.get("multiple")
                .and_then(Value::as_str)
                .and_then(|m| m.parse::<Decimal>().ok())
                == Some(BASE_CASE_MULTIPLE)
        })?
        .get("irr")
}

fn priority_value(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    PRIORITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
