//! A parsed tree tagged with the format it came from.

use std::path::Path;

use crate::{csv, json, toml, xml, yaml, Error, Format, Result, Value};

/// Data read from one of the supported formats.
///
/// # Examples
///
/// ```rust
/// use datafmt::{Format, Structured};
///
/// let doc = Structured::detect("[server]\nport = 8080\n").unwrap();
/// assert_eq!(doc.format(), Format::Toml);
///
/// let yaml = doc.convert(Format::Yaml).unwrap();
/// assert_eq!(yaml, "server:\n  port: 8080\n");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Structured {
    format: Format,
    data: Value,
}

impl Structured {
    /// Wraps an existing tree.
    pub fn new(format: Format, data: Value) -> Self {
        Structured { format, data }
    }

    /// Parses `text` as `format`.
    pub fn parse(format: Format, text: &str) -> Result<Self> {
        let data = match format {
            Format::Csv => csv::parse(text)?,
            Format::Json => json::parse(text)?,
            Format::Xml => Value::Table(xml::parse(text)?),
            Format::Yaml => yaml::parse(text)?,
            Format::Toml => Value::Table(toml::parse(text)?),
        };
        Ok(Structured { format, data })
    }

    /// Parses `text` in whatever format it looks like.
    ///
    /// The content heuristic is tried first. If it has no opinion, or its
    /// pick fails to parse, each format is tried in turn and the first
    /// success wins; when all fail the last error is returned.
    pub fn detect(text: &str) -> Result<Self> {
        let guess = Format::detect(text);
        let mut last_error = None;
        if let Some(format) = guess {
            tracing::debug!(%format, "detected format");
            match Self::parse(format, text) {
                Ok(parsed) => return Ok(parsed),
                Err(err) => last_error = Some(err),
            }
        }
        for format in Format::ALL.into_iter().filter(|f| Some(*f) != guess) {
            match Self::parse(format, text) {
                Ok(parsed) => {
                    tracing::debug!(%format, "parsed by fallback");
                    return Ok(parsed);
                }
                Err(err) => {
                    tracing::trace!(%format, error = %err, "format rejected input");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error::custom("unable to detect the data format")))
    }

    /// Reads a file, choosing the format from its extension and falling back
    /// to content detection.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match Format::from_path(path) {
            Some(format) => Self::parse(format, &text),
            None => Self::detect(&text),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Writes the data back in the format it was read from.
    pub fn serialize(&self) -> Result<String> {
        write(self.format, &self.data)
    }

    /// Writes the data in another format.
    pub fn convert(&self, format: Format) -> Result<String> {
        tracing::debug!(from = %self.format, to = %format, "converting");
        write(format, &self.data)
    }
}

fn write(format: Format, data: &Value) -> Result<String> {
    match format {
        Format::Csv => csv::to_string(data),
        Format::Json => json::to_string_pretty(data),
        Format::Xml => xml::to_string(data),
        Format::Yaml => yaml::to_string(data),
        Format::Toml => toml::to_string(data),
    }
}
