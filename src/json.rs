//! JSON adapter over `serde_json`.
//!
//! Parsing goes straight into [`Value`] through its `Deserialize` impl, so
//! object key order is kept. Errors keep serde_json's line and column.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::{Error, Format, Options, Result, Value};

/// Parses a JSON document.
///
/// # Examples
///
/// ```rust
/// use datafmt::{json, Value};
///
/// let value = json::parse(r#"{"b": 1, "a": [true, null]}"#).unwrap();
/// assert_eq!(value["a"][0], Value::Bool(true));
/// assert!(value["a"][1].is_null());
/// ```
pub fn parse(input: &str) -> Result<Value> {
    tracing::debug!(bytes = input.len(), "parsing JSON");
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    serde_json::from_str(input).map_err(|e| syntax_error(&e, input))
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::from_value(parse(input)?)
}

/// Writes compact JSON.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    tracing::debug!("writing JSON");
    let value = crate::to_value(value)?;
    serde_json::to_string(&value).map_err(Error::custom)
}

/// Writes JSON indented by two spaces.
pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_string_with_options(value, &Options::default())
}

/// Writes JSON indented by `options.indent` spaces.
pub fn to_string_with_options<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    tracing::debug!(indent = options.indent, "writing JSON");
    let value = crate::to_value(value)?;
    let indent = " ".repeat(options.indent);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(Error::custom)?;
    String::from_utf8(out).map_err(Error::custom)
}

/// Reads `path` as UTF-8 and parses it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

fn syntax_error(err: &serde_json::Error, input: &str) -> Error {
    let line = err.line();
    if line == 0 {
        return Error::custom(err);
    }
    // serde_json appends its own position, which the error already carries
    let full = err.to_string();
    let suffix = format!(" at line {} column {}", line, err.column());
    let msg = full.strip_suffix(&suffix).unwrap_or(&full);
    let source_line = input.lines().nth(line - 1).unwrap_or_default();
    Error::syntax_with_context(Format::Json, line, err.column(), msg, source_line)
}
