//! TOML 1.0 reader and writer.
//!
//! The parser is hand-written: a character cursor feeds a recursive-descent
//! value parser and a statement-level document parser that enforces TOML's
//! table rules (no duplicate keys, no table defined twice, inline tables
//! and literal arrays closed to later extension).
//!
//! ```rust
//! use datafmt::{toml, Value};
//!
//! let doc = toml::parse(r#"
//! title = "example"
//!
//! [owner]
//! name = "Tom"
//! dob = 1979-05-27T07:32:00-08:00
//!
//! [[products]]
//! sku = 738594937
//! "#).unwrap();
//!
//! assert_eq!(doc["owner"]["name"].as_str(), Some("Tom"));
//! assert_eq!(doc["products"][0]["sku"], Value::Integer(738594937));
//! ```

mod document;
mod key;
mod ser;
mod tree;
mod value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::{Result, Table, Value};

/// Parses a TOML document into a table.
pub fn parse(input: &str) -> Result<Table> {
    tracing::debug!(bytes = input.len(), "parsing TOML");
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    document::DocumentParser::new(input).parse()
}

/// Deserializes a typed value from TOML text.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Config { port: u16, hosts: Vec<String> }
///
/// let config: Config = datafmt::toml::from_str("port = 8080\nhosts = [\"a\", \"b\"]").unwrap();
/// assert_eq!(config.port, 8080);
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::from_value(Value::Table(parse(input)?))
}

/// Serializes a value as a TOML document. The value must map to a table.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    tracing::debug!("writing TOML");
    ser::write_document(&crate::to_value(value)?)
}

/// Reads `path` as UTF-8 and parses it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Table> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}
