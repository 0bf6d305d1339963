use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, result_object, row_array};

/// Format output as tables: scalar fields first, then each array of rows.
pub fn print_table(value: &Value) {
    let Some(result) = result_object(value) else {
        println!("{}", value);
        return;
    };

    print_fields(result);

    let mut rest = result.clone();
    while let Some((key, rows)) = row_array(&rest).map(|(k, r)| (k.to_string(), r.clone())) {
        println!("\n{}:", key);
        print_rows(&rows);
        rest.remove(&key);
    }

    if let Some(envelope) = value.as_object() {
        print_notes(envelope);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Array(rows) if rows.first().map_or(false, Value::is_object) => continue,
            Value::Object(nested) => {
                for (sub_key, sub_val) in nested {
                    builder.push_record([format!("{key}.{sub_key}"), format_scalar(sub_val)]);
                }
            }
            _ => builder.push_record([key.clone(), format_scalar(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
