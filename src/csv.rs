//! CSV reader and writer.
//!
//! Fields follow RFC 4180 quoting: a quoted field may hold delimiters, line
//! breaks and doubled `""` quotes. With a header row (the default) each
//! record becomes a table keyed by column name; without one, each record
//! is an array. Fields are never type-converted and stay strings.
//!
//! ```rust
//! use datafmt::csv;
//!
//! let rows = csv::parse("name,quote\nAda,\"said \"\"hi\"\"\"\n").unwrap();
//! assert_eq!(rows[0]["quote"].as_str(), Some("said \"hi\""));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::cursor::Cursor;
use crate::{Error, Format, Options, Result, Table, Value};

struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Parses comma-separated text with a header row.
pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &Options::default())
}

/// Parses delimited text using `options.delimiter` and `options.has_headers`.
pub fn parse_with_options(input: &str, options: &Options) -> Result<Value> {
    tracing::debug!(bytes = input.len(), delimiter = ?options.delimiter, "parsing CSV");
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let records = read_records(input, options.delimiter.as_char())?;

    if !options.has_headers {
        let rows = records
            .into_iter()
            .map(|r| Value::Array(r.fields.into_iter().map(Value::String).collect()))
            .collect();
        return Ok(Value::Array(rows));
    }

    let mut records = records.into_iter();
    let Some(header) = records.next() else {
        return Ok(Value::Array(Vec::new()));
    };
    for (i, name) in header.fields.iter().enumerate() {
        if header.fields[..i].contains(name) {
            return Err(Error::syntax(
                Format::Csv,
                header.line,
                1,
                format!("duplicate column `{name}`"),
            ));
        }
    }
    let mut rows = Vec::new();
    for record in records {
        if record.fields.len() != header.fields.len() {
            return Err(Error::syntax(
                Format::Csv,
                record.line,
                1,
                format!(
                    "expected {} fields to match the header, found {}",
                    header.fields.len(),
                    record.fields.len()
                ),
            ));
        }
        let row: Table = header
            .fields
            .iter()
            .cloned()
            .zip(record.fields.into_iter().map(Value::String))
            .collect();
        rows.push(Value::Table(row));
    }
    Ok(Value::Array(rows))
}

fn read_records(input: &str, delimiter: char) -> Result<Vec<Record>> {
    let mut cur = Cursor::new(input, Format::Csv);
    let mut records = Vec::new();
    while !cur.is_eof() {
        let line = cur.mark().line;
        let mut fields = Vec::new();
        loop {
            fields.push(read_field(&mut cur, delimiter)?);
            if cur.eat(delimiter) {
                continue;
            }
            if cur.is_eof() || cur.eat('\n') || cur.eat_str("\r\n") {
                break;
            }
            return Err(cur.error("unexpected character after closing quote"));
        }
        // blank lines separate nothing
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        records.push(Record { line, fields });
    }
    Ok(records)
}

fn read_field(cur: &mut Cursor<'_>, delimiter: char) -> Result<String> {
    if cur.peek() != Some('"') {
        let raw = cur.take_while(|c| c != delimiter && c != '\n');
        return Ok(raw.strip_suffix('\r').unwrap_or(raw).to_string());
    }

    let start = cur.mark();
    cur.advance();
    let mut field = String::new();
    loop {
        match cur.advance() {
            None => return Err(cur.error_at(start, "unterminated quoted field")),
            Some('"') => {
                if cur.eat('"') {
                    field.push('"');
                } else {
                    return Ok(field);
                }
            }
            Some(c) => field.push(c),
        }
    }
}

/// Deserializes a typed value (usually a `Vec` of records) from CSV text.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::from_value(parse(input)?)
}

/// Writes records as comma-separated text with a header row.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_string_with_options(value, &Options::default())
}

/// Writes records using `options.delimiter`; a header row is emitted for
/// table records when `options.has_headers` is set.
///
/// Table records are laid out by the union of their keys in first-seen
/// order; a missing key leaves an empty field.
pub fn to_string_with_options<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    tracing::debug!(delimiter = ?options.delimiter, "writing CSV");
    let value = crate::to_value(value)?;
    let rows: Vec<Value> = match value {
        Value::Array(rows) => rows,
        table @ Value::Table(_) => vec![table],
        other => {
            return Err(Error::unsupported_type(&format!(
                "CSV output needs an array of records, found {}",
                other.type_name()
            )))
        }
    };
    let delimiter = options.delimiter.as_char();
    let mut out = String::new();

    if rows.iter().all(Value::is_table) {
        let mut columns: Vec<&str> = Vec::new();
        for row in rows.iter().filter_map(Value::as_table) {
            for key in row.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
        if options.has_headers && !columns.is_empty() {
            write_record(&mut out, columns.iter().map(|c| Field::Text(*c)), delimiter)?;
        }
        for row in rows.iter().filter_map(Value::as_table) {
            let fields = columns
                .iter()
                .map(|c| row.get(c).map_or(Field::Text(""), Field::Value));
            write_record(&mut out, fields, delimiter)?;
        }
        return Ok(out);
    }

    for row in &rows {
        match row {
            Value::Array(fields) => {
                write_record(&mut out, fields.iter().map(Field::Value), delimiter)?;
            }
            other => {
                return Err(Error::unsupported_type(&format!(
                    "CSV records must all be tables or all be arrays, found {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(out)
}

enum Field<'a> {
    Text(&'a str),
    Value(&'a Value),
}

fn write_record<'a>(
    out: &mut String,
    fields: impl Iterator<Item = Field<'a>>,
    delimiter: char,
) -> Result<()> {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        let text = match field {
            Field::Text(s) => s.to_string(),
            Field::Value(value) => field_text(value)?,
        };
        if text.contains([delimiter, '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&text.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&text);
        }
    }
    out.push('\n');
    Ok(())
}

fn field_text(value: &Value) -> Result<String> {
    let mut text = String::new();
    match value {
        Value::Null => {}
        Value::Bool(b) => text.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => {
            let _ = write!(text, "{i}");
        }
        Value::Float(f) => {
            let _ = write!(text, "{f}");
        }
        Value::String(s) => text.push_str(s),
        Value::Datetime(dt) => {
            let _ = write!(text, "{dt}");
        }
        Value::Array(_) | Value::Table(_) => {
            return Err(Error::unsupported_type(
                "nested arrays and tables cannot be written as CSV fields",
            ))
        }
    }
    Ok(text)
}

/// Reads `path` as UTF-8 and parses it with a header row.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}
