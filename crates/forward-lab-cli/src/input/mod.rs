pub mod file;
pub mod stdin;

use serde_json::Value;

/// JSON from `--input <path>` if given, otherwise from piped stdin.
pub fn json_source(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => file::read_json_value(p).map(Some),
        None => stdin::read_stdin(),
    }
}
