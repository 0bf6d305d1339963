use serde_json::Value;

use super::{format_scalar, result_object};

/// Headline field per command, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "installment_amount",
    "current_balance",
    "interest_saved",
    "total_projected",
    "total_current_balance",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let Some(map) = result_object(value) else {
        println!("{}", format_scalar(value));
        return;
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            println!("{}", format_scalar(val));
            return;
        }
    }

    if let Some((key, val)) = map.iter().next() {
        println!("{}: {}", key, format_scalar(val));
    }
}
