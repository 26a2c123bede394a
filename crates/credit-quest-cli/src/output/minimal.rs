use serde_json::{Map, Value};

use super::format_scalar;

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 8] = [
    "progress_percent",
    "payoff_date",
    "percentage",
    "checked",
    "remaining_principal",
    "final_balance",
    "id",
    "reset",
];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the result object, then one level down
/// (e.g. `stats.progress_percent`), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = find_priority(map) {
            return format_minimal(val);
        }
        for nested in map.values().filter_map(Value::as_object) {
            if let Some(val) = find_priority(nested) {
                return format_minimal(val);
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    if let Value::Array(arr) = result_obj {
        return arr.len().to_string();
    }

    // Not an object, just print directly
    format_minimal(result_obj)
}

fn find_priority(map: &Map<String, Value>) -> Option<&Value> {
    PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format_scalar(other),
    }
}
