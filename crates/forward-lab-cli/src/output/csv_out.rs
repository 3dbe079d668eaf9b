use serde_json::{Map, Value};
use std::io::{self, Write};

/// Write the result as CSV on stdout.
///
/// Series results (`result.points`) become one row per point with a header
/// from the first point. Everything else becomes `field,value` rows, nested
/// records flattened to dotted names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value).and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::warn!(error = %e, "failed to write CSV output");
    }
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    match result {
        Value::Object(fields) => match fields.get("points") {
            Some(Value::Array(points)) => write_series(wtr, points),
            _ => write_fields(wtr, fields),
        },
        Value::Array(rows) => write_series(wtr, rows),
        other => wtr.write_record([csv_cell(other)]),
    }
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, fields: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    let mut stack: Vec<(String, &Map<String, Value>)> = vec![(String::new(), fields)];
    while let Some((prefix, map)) = stack.pop() {
        for (key, val) in map {
            let name = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match val {
                Value::Object(inner) => stack.push((name, inner)),
                other => wtr.write_record([name, csv_cell(other)])?,
            }
        }
    }
    Ok(())
}

fn write_series<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([csv_cell(row)])?;
        }
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(csv_cell).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }
    Ok(())
}

/// Full precision; undefined values are empty cells.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_series_one_row_per_point() {
        let out = render(&json!({
            "result": {
                "breakeven_mrr": "0.0525",
                "points": [
                    {"market_reference_rate": "0.01", "cash_settlement_pv": null},
                    {"market_reference_rate": "0.02", "cash_settlement_pv": "-8100"}
                ]
            }
        }));
        assert_eq!(
            out,
            "cash_settlement_pv,market_reference_rate\n,0.01\n-8100,0.02\n"
        );
    }

    #[test]
    fn test_scalar_fields_as_rows() {
        let out = render(&json!({"result": {"forward_rate": "1.0639", "position": "Long"}}));
        assert_eq!(out, "field,value\nforward_rate,1.0639\nposition,Long\n");
    }
}
