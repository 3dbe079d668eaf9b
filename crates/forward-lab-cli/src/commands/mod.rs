pub mod analysis;
pub mod forwards;
pub mod fra;
pub mod fx;
pub mod rates;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde_json::Value;

use forward_lab_core::cash_flows::{cash_flows_from_value, parse_cash_flows, CashFlow};
use forward_lab_core::{ComputationOutput, Position};

use crate::input;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PositionArg {
    Long,
    Short,
}

impl From<PositionArg> for Position {
    fn from(p: PositionArg) -> Self {
        match p {
            PositionArg::Long => Position::Long,
            PositionArg::Short => Position::Short,
        }
    }
}

/// Validate the cash-flow lists at `pointers` inside a JSON input.
///
/// Strict mode returns the first error. Lenient mode replaces a bad list with
/// `[]` and reports what was dropped.
pub fn check_cash_flows(
    value: &mut Value,
    pointers: &[&str],
    lenient: bool,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut warnings = Vec::new();
    for pointer in pointers {
        let Some(slot) = value.pointer_mut(pointer) else {
            continue;
        };
        if let Err(e) = cash_flows_from_value(slot) {
            if !lenient {
                return Err(e.into());
            }
            tracing::warn!(field = *pointer, error = %e, "invalid cash flows replaced with an empty set");
            warnings.push(format!("{pointer}: {e}; treated as no cash flows"));
            *slot = Value::Array(Vec::new());
        }
    }
    Ok(warnings)
}

/// Deserialise `--input`/stdin JSON after running [`check_cash_flows`] on it.
/// `None` means neither source was given and the caller falls back to flags.
pub fn load_with_cash_flows<T: DeserializeOwned>(
    path: Option<&str>,
    pointers: &[&str],
    lenient: bool,
    warnings: &mut Vec<String>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let Some(mut value) = input::json_source(path)? else {
        return Ok(None);
    };
    warnings.extend(check_cash_flows(&mut value, pointers, lenient)?);
    Ok(Some(serde_json::from_value(value)?))
}

/// Parse a cash-flow flag given as JSON text, with the same strict/lenient policy.
pub fn cash_flows_flag(
    name: &str,
    text: Option<&str>,
    lenient: bool,
    warnings: &mut Vec<String>,
) -> Result<Vec<CashFlow>, Box<dyn std::error::Error>> {
    let Some(text) = text else {
        return Ok(Vec::new());
    };
    match parse_cash_flows(text) {
        Ok(flows) => Ok(flows),
        Err(e) if lenient => {
            tracing::warn!(flag = name, error = %e, "invalid cash flows replaced with an empty set");
            warnings.push(format!("--{name}: {e}; treated as no cash flows"));
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Attach CLI-side warnings to a core result and serialise it.
pub fn finish<T: serde::Serialize>(
    mut output: ComputationOutput<T>,
    mut cli_warnings: Vec<String>,
) -> CommandResult {
    cli_warnings.append(&mut output.warnings);
    output.warnings = cli_warnings;
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_mode_rejects_bad_flows() {
        let mut value = json!({"dividends": [{"amount": "x", "time_from_t0": 1}]});
        assert!(check_cash_flows(&mut value, &["/dividends"], false).is_err());
    }

    #[test]
    fn test_lenient_mode_substitutes_empty_set() {
        let mut value = json!({
            "contract": {
                "dividends": {"amount": 1, "time_from_t0": 0.5},
                "costs": [{"amount": 1, "time_from_t0": 0.5}]
            }
        });
        let warnings =
            check_cash_flows(&mut value, &["/contract/dividends", "/contract/costs"], true).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(value["contract"]["dividends"], json!([]));
        assert_eq!(value["contract"]["costs"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_missing_pointer_is_skipped() {
        let mut value = json!({"spot_price": 100});
        assert!(check_cash_flows(&mut value, &["/costs"], false).unwrap().is_empty());
    }

    #[test]
    fn test_flag_parsing() {
        let mut warnings = Vec::new();
        let flows = cash_flows_flag(
            "dividends",
            Some(r#"[{"amount": 2, "time_from_t0": 0.5}]"#),
            false,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(flows.len(), 1);
        assert!(cash_flows_flag("costs", Some("[oops"), false, &mut warnings).is_err());
        let flows = cash_flows_flag("costs", Some("[oops"), true, &mut warnings).unwrap();
        assert!(flows.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
