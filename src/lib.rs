//! # datafmt
//!
//! Parse CSV, TOML, YAML, JSON and XML into one ordered value tree, and
//! write that tree back out in any of them.
//!
//! ## Key Features
//!
//! - **Hand-written TOML 1.0 parser**: every table-definition rule is
//!   enforced, and errors carry the line, column and offending source line
//! - **Indentation-driven YAML parser** for configuration-style documents
//! - **Format detection**: hand it text and it works out what it is
//! - **Serde bridge**: read any format into your own structs, or write them out
//! - **Insertion order preserved** in every table
//!
//! ## Quick Start
//!
//! ```rust
//! use datafmt::{Format, Value};
//!
//! let doc = datafmt::parse("[package]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
//! assert_eq!(doc.format(), Format::Toml);
//! assert_eq!(doc.data()["package"]["name"].as_str(), Some("demo"));
//!
//! let json = doc.convert(Format::Json).unwrap();
//! assert!(json.contains("\"version\": \"0.1.0\""));
//! ```
//!
//! ### Typed data
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let server: Server = datafmt::yaml::from_str("host: localhost\nport: 8080\n").unwrap();
//! assert_eq!(server.port, 8080);
//!
//! let toml = datafmt::toml::to_string(&server).unwrap();
//! assert_eq!(toml, "host = \"localhost\"\nport = 8080\n");
//! ```
//!
//! ### Dynamic values with the value! macro
//!
//! ```rust
//! use datafmt::{value, Value};
//!
//! let data = value!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert_eq!(data["tags"][0].as_str(), Some("rust"));
//! ```
//!
//! ## Errors
//!
//! Every syntax or semantic violation is an [`Error::Syntax`] naming the
//! format, a 1-based line and column, and the line it happened on. File
//! loading failures come back as [`Error::Io`].
//!
//! ## Demos
//!
//! The `demos/` directory holds runnable programs:
//!
//! - **`convert.rs`** - Convert a file between formats
//! - **`typed_config.rs`** - Load a typed configuration struct from any format
//!
//! Run one with: `cargo run --example <name>`

mod cursor;
mod scalar;

pub mod csv;
pub mod datetime;
pub mod de;
pub mod error;
pub mod format;
pub mod json;
pub mod macros;
pub mod options;
pub mod ser;
pub mod structured;
pub mod table;
pub mod toml;
pub mod value;
pub mod xml;
pub mod yaml;

pub use datetime::{Datetime, DatetimeError};
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use format::Format;
pub use options::{Delimiter, Options};
pub use ser::{to_value, ValueSerializer};
pub use structured::Structured;
pub use table::Table;
pub use value::Value;

use std::path::Path;

/// Parses `text`, detecting its format from the content.
///
/// # Examples
///
/// ```rust
/// use datafmt::Format;
///
/// let doc = datafmt::parse("name: demo\nitems:\n  - 1\n").unwrap();
/// assert_eq!(doc.format(), Format::Yaml);
/// ```
///
/// # Errors
///
/// Returns the last parse error when no format accepts the text.
pub fn parse(text: &str) -> Result<Structured> {
    Structured::detect(text)
}

/// Parses `text` as the given format.
///
/// # Examples
///
/// ```rust
/// use datafmt::{Format, Value};
///
/// let doc = datafmt::parse_as(Format::Json, "[1, 2]").unwrap();
/// assert_eq!(doc.data()[1], Value::Integer(2));
/// ```
pub fn parse_as(format: Format, text: &str) -> Result<Structured> {
    Structured::parse(format, text)
}

/// Reads and parses a file. The format comes from the file extension, or
/// from the content when the extension is not recognised.
///
/// # Errors
///
/// I/O failures are returned unchanged as [`Error::Io`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Structured> {
    Structured::load(path)
}
