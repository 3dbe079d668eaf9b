use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Decimal places shown for numeric cells. JSON output keeps full precision.
const DISPLAY_DP: u32 = 8;

/// Render an envelope as a field/value table for the scalar result fields,
/// a second table for any `points` series, then warnings and methodology.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{value}");
        return;
    };
    let Some(result) = envelope.get("result") else {
        println!("{}", field_table(envelope));
        return;
    };

    match result {
        Value::Object(fields) => {
            let scalars: Map<String, Value> = fields
                .iter()
                .filter(|(k, _)| k.as_str() != "points")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            println!("{}", field_table(&scalars));
            if let Some(Value::Array(points)) = fields.get("points") {
                println!("\n{}", series_table(points));
            }
        }
        Value::Array(rows) => println!("{}", series_table(rows)),
        other => println!("{}", cell(other)),
    }

    let warnings: Vec<&str> = envelope
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {w}");
        }
    }
    if let Some(meth) = envelope.get("methodology").and_then(Value::as_str) {
        println!("\nMethodology: {meth}");
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut rows = Vec::new();
    flatten("", map, &mut rows);
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows {
        builder.push_record([field, value]);
    }
    builder.build()
}

/// Nested records become dotted field names (`contract.spot_rate`).
fn flatten(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten(&name, inner, out),
            other => out.push((name, cell(other))),
        }
    }
}

fn series_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    let headers: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => {
            builder.push_record(["value"]);
            for row in rows {
                builder.push_record([cell(row)]);
            }
            return builder.build();
        }
    };
    builder.push_record(headers.clone());
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(cell).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }
    builder.build()
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) => d.round_dp(DISPLAY_DP).normalize().to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}
