//! TOML writer.
//!
//! Plain key/value pairs of a table come first, then its sub-tables as
//! `[a.b]` sections and finally its arrays of tables as `[[a.b]]` sections.
//! A section header is left out when the table only holds other sections;
//! the parser recreates it implicitly. Tables nested inside arrays are
//! written as inline tables.

use std::fmt::Write;

use super::key::is_bare_key_char;
use crate::{Error, Result, Table, Value};

pub(crate) fn write_document(value: &Value) -> Result<String> {
    let table = value
        .as_table()
        .ok_or_else(|| Error::unsupported_type("a TOML document must be a table"))?;
    let mut out = String::new();
    write_table(&mut out, &mut Vec::new(), table)?;
    Ok(out)
}

fn is_array_of_tables(value: &Value) -> bool {
    matches!(value, Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_table))
}

fn is_section(value: &Value) -> bool {
    value.is_table() || is_array_of_tables(value)
}

fn write_table(out: &mut String, path: &mut Vec<String>, table: &Table) -> Result<()> {
    for (key, value) in table.iter().filter(|(_, v)| !is_section(v)) {
        write_key(out, key);
        out.push_str(" = ");
        write_inline(out, value)?;
        out.push('\n');
    }

    for (key, value) in table {
        if let Value::Table(sub) = value {
            path.push(key.clone());
            if sub.is_empty() || sub.values().any(|v| !is_section(v)) {
                write_header(out, path, false);
            }
            write_table(out, path, sub)?;
            path.pop();
        }
    }

    for (key, value) in table {
        if let Value::Array(items) = value {
            if !is_array_of_tables(value) {
                continue;
            }
            path.push(key.clone());
            for item in items.iter().filter_map(Value::as_table) {
                write_header(out, path, true);
                write_table(out, path, item)?;
            }
            path.pop();
        }
    }
    Ok(())
}

fn write_header(out: &mut String, path: &[String], array: bool) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(if array { "[[" } else { "[" });
    for (i, key) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        write_key(out, key);
    }
    out.push_str(if array { "]]\n" } else { "]\n" });
}

fn write_key(out: &mut String, key: &str) {
    if !key.is_empty() && key.chars().all(is_bare_key_char) {
        out.push_str(key);
    } else {
        write_basic_string(out, key);
    }
}

fn write_basic_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c < '\u{20}' || c == '\u{7f}' => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "inf" } else { "-inf" });
    } else {
        // Debug output always keeps a `.` or an exponent
        let _ = write!(out, "{f:?}");
    }
}

fn write_inline(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => return Err(Error::unsupported_type("TOML has no null value")),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => write_float(out, *f),
        Value::String(s) => write_basic_string(out, s),
        Value::Datetime(dt) => {
            let _ = write!(out, "{dt}");
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item)?;
            }
            out.push(']');
        }
        Value::Table(table) => {
            if table.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push_str("{ ");
            for (i, (key, item)) in table.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_key(out, key);
                out.push_str(" = ");
                write_inline(out, item)?;
            }
            out.push_str(" }");
        }
    }
    Ok(())
}
