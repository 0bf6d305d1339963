use serde_json::{Map, Value};
use std::io;

use super::{format_scalar, result_object, row_array};

/// Write output as CSV to stdout.
///
/// The result's headline fields come first as a two-column field/value
/// block. Results carrying rows (schedule entries, buckets, debts) follow
/// with one record per row under their own header line, so records differ
/// in width between the two blocks.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    match result_object(value) {
        Some(result) => write_result(&mut wtr, result),
        None => {
            let _ = wtr.write_record([&format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Map<String, Value>) {
    let rows = row_array(result);
    write_fields(wtr, result, rows.map(|(key, _)| key));
    if let Some((_, rows)) = rows {
        write_rows(wtr, rows);
    }
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
    rows_key: Option<&str>,
) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        if Some(key.as_str()) == rows_key {
            continue;
        }
        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
