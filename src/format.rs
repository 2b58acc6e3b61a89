//! Supported text formats and content sniffing.
//!
//! [`Format`] names one of the five formats this crate reads and writes.
//! It can be chosen explicitly, derived from a file extension, or guessed
//! from the text itself with [`Format::detect`].
//!
//! ```rust
//! use datafmt::Format;
//!
//! assert_eq!(Format::from_extension("yml"), Some(Format::Yaml));
//! assert_eq!("toml".parse::<Format>().unwrap(), Format::Toml);
//! assert_eq!(Format::detect("[server]\nport = 80\n"), Some(Format::Toml));
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::Error;

/// One of the supported data formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Csv,
    Json,
    Xml,
    Yaml,
    Toml,
}

impl Format {
    /// Every format, in the order [`Structured::detect`](crate::Structured::detect)
    /// falls back through them.
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Xml,
        Format::Toml,
        Format::Yaml,
        Format::Csv,
    ];

    /// Lowercase name, also the canonical file extension.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// Maps a file extension (without the dot, any case) to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" => Some(Format::Csv),
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Maps a path to a format using its extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Guesses the format of `text` from its first meaningful line.
    ///
    /// This is a heuristic: it looks at leading punctuation and the shape of
    /// the first statement, never at the whole document. `None` means no
    /// format looked plausible.
    #[must_use]
    pub fn detect(text: &str) -> Option<Format> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('<') {
            return Some(Format::Xml);
        }
        if trimmed.starts_with('{') {
            return Some(Format::Json);
        }
        if trimmed.starts_with("---") {
            return Some(Format::Yaml);
        }

        let first = trimmed
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))?;

        if first.starts_with('[') {
            // `[table]` or `[[array]]` alone on a line is a TOML header, while
            // a JSON array keeps going after the bracket.
            let inner = first.trim_start_matches('[').trim_end_matches(']');
            if first.ends_with(']') && !inner.is_empty() && is_header_body(inner) {
                return Some(Format::Toml);
            }
            return Some(Format::Json);
        }
        if first.starts_with("- ") || first == "-" {
            return Some(Format::Yaml);
        }
        if let Some((key, _)) = first.split_once('=') {
            if is_header_body(key.trim()) {
                return Some(Format::Toml);
            }
        }
        if let Some((key, rest)) = first.split_once(':') {
            if !key.contains(',') && (rest.is_empty() || rest.starts_with(' ')) {
                return Some(Format::Yaml);
            }
        }
        if first.contains(',') || first.contains('\t') || first.contains(';') {
            return Some(Format::Csv);
        }
        None
    }
}

fn is_header_body(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '"' | '\'' | ' ')
        })
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Csv => "CSV",
            Format::Json => "JSON",
            Format::Xml => "XML",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::from_extension(s).ok_or_else(|| Error::custom(format!("unknown format `{s}`")))
    }
}
