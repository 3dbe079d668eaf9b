use serde_json::Value;

/// Headline field per command family, checked in order.
const HEADLINE_FIELDS: [&str; 5] = [
    "position_value",
    "forward_price",
    "forward_rate",
    "cash_settlement_pv",
    "converted_apr",
];

/// Print only the headline number. Series print one comma-separated line
/// per point instead.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    for line in minimal_lines(result) {
        println!("{line}");
    }
}

fn minimal_lines(result: &Value) -> Vec<String> {
    let Value::Object(fields) = result else {
        return vec![bare(result)];
    };
    if let Some(Value::Array(points)) = fields.get("points") {
        return points
            .iter()
            .map(|p| match p {
                Value::Object(cols) => cols.values().map(bare).collect::<Vec<_>>().join(","),
                other => bare(other),
            })
            .collect();
    }
    let headline = HEADLINE_FIELDS
        .iter()
        .find_map(|k| fields.get(*k).filter(|v| !v.is_null()));
    match (headline, fields.iter().next()) {
        (Some(v), _) => vec![bare(v)],
        (None, Some((key, v))) => vec![format!("{key}: {}", bare(v))],
        (None, None) => Vec::new(),
    }
}

fn bare(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
