//! Configuration for writers and the CSV reader.
//!
//! - [`Options`]: indentation width, CSV delimiter and header handling
//! - [`Delimiter`]: field separator for CSV
//!
//! ## Examples
//!
//! ```rust
//! use datafmt::{csv, Delimiter, Options};
//!
//! let options = Options::new().with_delimiter(Delimiter::Semicolon);
//! let rows = csv::parse_with_options("a;b\n1;2\n", &options).unwrap();
//! assert_eq!(rows[0]["b"].as_str(), Some("2"));
//! ```

/// Field separator for CSV input and output.
///
/// # Examples
///
/// ```rust
/// use datafmt::Delimiter;
///
/// assert_eq!(Delimiter::Comma.as_char(), ',');
/// assert_eq!(Delimiter::Tab.as_char(), '\t');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Semicolon,
    Pipe,
}

impl Delimiter {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
            Delimiter::Pipe => '|',
        }
    }
}

/// Formatting and reading options.
///
/// # Examples
///
/// ```rust
/// use datafmt::{Delimiter, Options};
///
/// let options = Options::new()
///     .with_indent(4)
///     .with_delimiter(Delimiter::Tab)
///     .with_headers(false);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Spaces per nesting level in YAML and pretty JSON/XML output.
    pub indent: usize,
    pub delimiter: Delimiter,
    /// Whether the first CSV row names the columns.
    pub has_headers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: 2,
            delimiter: Delimiter::default(),
            has_headers: true,
        }
    }
}

impl Options {
    /// Creates default options (2-space indent, comma delimiter, header row).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Values below 1 are raised to 1 so nesting stays visible.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}
