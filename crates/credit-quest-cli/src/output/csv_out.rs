use serde_json::{Map, Value};
use std::io::{self, Write};

use super::{format_scalar, is_record_array};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    write_csv(stdout.lock(), value);
}

/// Record arrays (the schedule, extra payments) become one row per record;
/// anything else becomes two-column `field,value` rows.
pub fn write_csv<W: Write>(out: W, value: &Value) {
    let mut wtr = csv::Writer::from_writer(out);

    let body = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };

    match body {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => {
            if let Some(Value::Array(records)) = map.values().find(|v| is_record_array(v)) {
                write_array_csv(&mut wtr, records);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                write_fields(&mut wtr, "", map);
            }
        }
        other => {
            let _ = wtr.write_record([&format_scalar(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(nested) => write_fields(wtr, &name, nested),
            v => {
                let _ = wtr.write_record([name.as_str(), &format_scalar(v)]);
            }
        }
    }
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
    }
}
