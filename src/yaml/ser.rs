//! Block-style YAML writer.

use std::fmt::Write;

use crate::scalar::classify_yaml;
use crate::{Options, Table, Value};

pub(crate) fn write_document(value: &Value, options: &Options) -> String {
    let mut out = String::new();
    let writer = Writer {
        indent: options.indent,
    };
    match value {
        Value::Table(table) if !table.is_empty() => writer.mapping(&mut out, table, 0, false),
        Value::Array(items) if !items.is_empty() => writer.sequence(&mut out, items, 0, false),
        scalar => {
            write_scalar(&mut out, scalar);
            out.push('\n');
        }
    }
    out
}

struct Writer {
    indent: usize,
}

impl Writer {
    /// Writes `table` with keys at `column`. With `inline_first` the first
    /// key continues a line that already holds `- `.
    fn mapping(&self, out: &mut String, table: &Table, column: usize, inline_first: bool) {
        for (i, (key, value)) in table.iter().enumerate() {
            if i > 0 || !inline_first {
                pad(out, column);
            }
            write_string(out, key);
            out.push(':');
            self.nested(out, value, column);
        }
    }

    fn sequence(&self, out: &mut String, items: &[Value], column: usize, inline_first: bool) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 || !inline_first {
                pad(out, column);
            }
            out.push_str("- ");
            match item {
                Value::Table(table) if !table.is_empty() => {
                    self.mapping(out, table, column + 2, true);
                }
                Value::Array(inner) if !inner.is_empty() => {
                    self.sequence(out, inner, column + 2, true);
                }
                scalar => {
                    write_scalar(out, scalar);
                    out.push('\n');
                }
            }
        }
    }

    /// Writes the value of a mapping entry whose key sits at `column`.
    fn nested(&self, out: &mut String, value: &Value, column: usize) {
        match value {
            Value::Table(table) if !table.is_empty() => {
                out.push('\n');
                self.mapping(out, table, column + self.indent, false);
            }
            Value::Array(items) if !items.is_empty() => {
                out.push('\n');
                self.sequence(out, items, column + self.indent, false);
            }
            Value::String(s) if s.contains('\n') && s.ends_with('\n') && is_block_safe(s) => {
                out.push_str(" |\n");
                for line in s[..s.len() - 1].split('\n') {
                    if !line.is_empty() {
                        pad(out, column + self.indent);
                        out.push_str(line);
                    }
                    out.push('\n');
                }
            }
            scalar => {
                out.push(' ');
                write_scalar(out, scalar);
                out.push('\n');
            }
        }
    }
}

fn pad(out: &mut String, column: usize) {
    out.extend(std::iter::repeat(' ').take(column));
}

/// A literal block keeps the text exactly when no line starts with a space
/// or is blank-but-not-empty, there are no trailing blank lines and nothing
/// needs escaping.
fn is_block_safe(s: &str) -> bool {
    let body = &s[..s.len() - 1];
    !body.ends_with('\n')
        && !body.is_empty()
        && body.split('\n').all(|line| {
            !line.starts_with(' ')
                && (line.is_empty() || !line.trim().is_empty())
                && !line.chars().any(|c| c.is_control() && c != '\t')
        })
}

fn write_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) if f.is_nan() => out.push_str(".nan"),
        Value::Float(f) if f.is_infinite() => out.push_str(if *f > 0.0 { ".inf" } else { "-.inf" }),
        Value::Float(f) => {
            let _ = write!(out, "{f:?}");
        }
        Value::String(s) => write_string(out, s),
        Value::Datetime(dt) => write_string(out, &dt.to_string()),
        Value::Array(_) => out.push_str("[]"),
        Value::Table(_) => out.push_str("{}"),
    }
}

fn write_string(out: &mut String, s: &str) {
    if needs_quotes(s) {
        write_double_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Whether a plain scalar would read back as something other than `s`.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    if !matches!(classify_yaml(s), Value::String(ref plain) if plain == s) {
        return true;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) || first.is_whitespace() {
        return true;
    }
    s.ends_with(char::is_whitespace)
        || s.ends_with(':')
        || s.contains(": ")
        || s.contains(" #")
        || s.chars().any(char::is_control)
        // a quote at the start of a token would be read as an opening quote
        || s.as_bytes().windows(2).any(|w| {
            matches!(w[0], b' ' | b'[' | b'{' | b',') && matches!(w[1], b'"' | b'\'')
        })
}

fn write_double_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
