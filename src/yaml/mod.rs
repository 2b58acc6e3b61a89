//! Block-style YAML reader and writer.
//!
//! Covers the subset configuration files use: nested mappings and
//! sequences driven by indentation, compact `- key: value` items, literal and
//! folded block scalars, quoted scalars and single-line flow collections.
//! Anchors, aliases, tags and multi-document streams are rejected or ignored.
//!
//! ```rust
//! use datafmt::{yaml, Value};
//!
//! let doc = yaml::parse("
//! name: demo
//! ports:
//!   - 80
//!   - 443
//! ").unwrap();
//!
//! assert_eq!(doc["ports"][1], Value::Integer(443));
//! ```

mod parser;
mod ser;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::{Options, Result, Value};

/// Parses a YAML document. An empty document is an empty table.
pub fn parse(input: &str) -> Result<Value> {
    tracing::debug!(bytes = input.len(), "parsing YAML");
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    parser::YamlParser::new(input).parse()
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::from_value(parse(input)?)
}

/// Serializes a value as block-style YAML with two-space indentation.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_string_with_options(value, &Options::default())
}

/// Serializes a value as block-style YAML using `options.indent`.
pub fn to_string_with_options<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    tracing::debug!(indent = options.indent, "writing YAML");
    Ok(ser::write_document(&crate::to_value(value)?, options))
}

/// Reads `path` as UTF-8 and parses it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}
