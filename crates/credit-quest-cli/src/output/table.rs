use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, is_record_array};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => {
            println!("{}", render_records(arr));
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        other => println!("{}", format_value(other)),
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars go into one Field/Value table; nested objects and record
/// arrays (such as the payment schedule) get a titled table each.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalar_rows = 0;
    let mut sections: Vec<(&str, String)> = Vec::new();

    for (key, val) in map {
        match val {
            Value::Object(nested) => sections.push((key.as_str(), render_fields(nested))),
            v if is_record_array(v) => {
                if let Value::Array(arr) = v {
                    sections.push((key.as_str(), render_records(arr)));
                }
            }
            v => {
                builder.push_record([key.as_str(), &format_value(v)]);
                scalar_rows += 1;
            }
        }
    }

    if scalar_rows > 0 {
        println!("{}", Table::from(builder));
    }
    for (title, rendered) in sections {
        println!("\n{}:\n{}", title, rendered);
    }
}

fn render_fields(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    Table::from(builder).to_string()
}

fn render_records(arr: &[Value]) -> String {
    if arr.is_empty() {
        return "(empty)".to_string();
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        Table::from(builder).to_string()
    } else {
        // Simple array of values
        arr.iter().map(format_value).collect::<Vec<_>>().join("\n")
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        other => format_scalar(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_records_has_header_and_rows() {
        let rows = vec![
            json!({"id": "m-2024-0", "payment": "200"}),
            json!({"id": "m-2024-1", "payment": "200"}),
        ];
        let rendered = render_records(&rows);
        assert!(rendered.contains("id"));
        assert!(rendered.contains("m-2024-1"));
        assert_eq!(render_records(&[]), "(empty)");
    }

    #[test]
    fn test_format_value_null_and_list() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!(["a", "b"])), "a, b");
    }
}
