//! XML reader and writer built on `quick-xml`.
//!
//! The document element becomes a one-entry table `{ tag: content }`:
//!
//! - attributes are stored under `@name` keys
//! - child elements are stored under their tag; a repeated tag collects an array
//! - text next to attributes or children is stored under `#text`
//! - an element holding only text is that string, and an empty one is `Null`
//!
//! Comments, processing instructions and the declaration are skipped.
//!
//! ```rust
//! use datafmt::xml;
//!
//! let doc = xml::parse(r#"<shelf id="3"><book>Dune</book><book>Emma</book></shelf>"#).unwrap();
//! assert_eq!(doc["shelf"]["@id"].as_str(), Some("3"));
//! assert_eq!(doc["shelf"]["book"][1].as_str(), Some("Emma"));
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::{Error, Format, Options, Result, Table, Value};

const TEXT_KEY: &str = "#text";
const DEFAULT_ROOT: &str = "root";

struct Element {
    name: String,
    attributes: Table,
    children: Table,
    text: String,
}

impl Element {
    fn new(start: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Table::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attributes.insert(key, Value::String(value.into_owned()));
        }
        Ok(Element {
            name,
            attributes,
            children: Table::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn into_value(self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            return if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            };
        }
        let mut table = self.attributes;
        for (key, value) in self.children {
            table.insert(key, value);
        }
        if !self.text.is_empty() {
            table.insert(TEXT_KEY.to_string(), Value::String(self.text));
        }
        Value::Table(table)
    }
}

/// Parses an XML document into `{ root_tag: content }`.
pub fn parse(input: &str) -> Result<Table> {
    tracing::debug!(bytes = input.len(), "parsing XML");
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Table> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| position_error(input, reader.error_position(), e.to_string()))?;
        let here = reader.buffer_position();
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(position_error(input, here, "more than one root element"));
                }
                let element = Element::new(e).map_err(|msg| position_error(input, here, msg))?;
                if matches!(event, Event::Start(_)) {
                    stack.push(element);
                } else {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(position_error(input, here, "closing tag without an open element"));
                };
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| position_error(input, here, err.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        let msg = format!("element `{}` is never closed", open.name);
        return Err(position_error(input, input.len(), msg));
    }
    root.ok_or_else(|| position_error(input, 0usize, "document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Table>, element: Element) {
    let name = element.name.clone();
    let value = element.into_value();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => {
            let mut table = Table::new();
            table.insert(name, value);
            *root = Some(table);
        }
    }
}

fn position_error<P: TryInto<usize>>(input: &str, position: P, msg: impl Into<String>) -> Error {
    let offset = position.try_into().unwrap_or(input.len()).min(input.len());
    let offset = (0..=offset).rev().find(|&i| input.is_char_boundary(i)).unwrap_or(0);
    let before = &input[..offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count() + 1;
    let line_end = input[offset..].find('\n').map_or(input.len(), |i| offset + i);
    let source_line = input[line_start..line_end].trim_end_matches('\r');
    Error::syntax_with_context(Format::Xml, line, column, msg, source_line)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::from_value(Value::Table(parse(input)?))
}

/// Writes an XML document indented by two spaces.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_string_with_options(value, &Options::default())
}

/// Writes an XML document indented by `options.indent` spaces.
///
/// A table with a single non-array entry names the document element;
/// anything else is wrapped in `<root>`.
pub fn to_string_with_options<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    tracing::debug!(indent = options.indent, "writing XML");
    let value = crate::to_value(value)?;
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let writer = Writer {
        indent: options.indent,
    };
    match &value {
        Value::Table(table) if table.len() == 1 => {
            let (name, content) = table
                .iter()
                .next()
                .ok_or_else(|| Error::custom("empty document table"))?;
            if content.is_array() {
                writer.element(&mut out, DEFAULT_ROOT, &value, 0)?;
            } else {
                writer.element(&mut out, name, content, 0)?;
            }
        }
        other => writer.element(&mut out, DEFAULT_ROOT, other, 0)?,
    }
    Ok(out)
}

struct Writer {
    indent: usize,
}

impl Writer {
    fn element(&self, out: &mut String, name: &str, value: &Value, depth: usize) -> Result<()> {
        if let Value::Array(items) = value {
            for item in items {
                self.element(out, name, item, depth)?;
            }
            return Ok(());
        }
        check_name(name)?;
        pad(out, depth * self.indent);
        out.push('<');
        out.push_str(name);

        let Value::Table(table) = value else {
            match value {
                Value::Null => out.push_str("/>\n"),
                scalar => {
                    out.push('>');
                    escape_into(out, &scalar_text(scalar)?, false);
                    let _ = writeln!(out, "</{name}>");
                }
            }
            return Ok(());
        };

        let mut text = None;
        let mut children = Vec::new();
        for (key, item) in table {
            if let Some(attr) = key.strip_prefix('@') {
                check_name(attr)?;
                let _ = write!(out, " {attr}=\"");
                escape_into(out, &scalar_text(item)?, true);
                out.push('"');
            } else if key == TEXT_KEY {
                text = Some(scalar_text(item)?);
            } else {
                children.push((key, item));
            }
        }

        match (children.is_empty(), text) {
            (true, None) => out.push_str("/>\n"),
            (true, Some(text)) => {
                out.push('>');
                escape_into(out, &text, false);
                let _ = writeln!(out, "</{name}>");
            }
            (false, text) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    pad(out, (depth + 1) * self.indent);
                    escape_into(out, &text, false);
                    out.push('\n');
                }
                for (key, item) in children {
                    self.element(out, key, item, depth + 1)?;
                }
                pad(out, depth * self.indent);
                let _ = writeln!(out, "</{name}>");
            }
        }
        Ok(())
    }
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(Error::unsupported_type(&format!(
            "`{name}` is not a valid XML name"
        )))
    }
}

fn scalar_text(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(_) | Value::Table(_) => {
            return Err(Error::unsupported_type(
                "attributes and text content must be scalars",
            ))
        }
    })
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

/// Reads `path` as UTF-8 and parses it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Table> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_children_and_text() {
        let doc = parse(
            "<?xml version=\"1.0\"?>\n<!-- c -->\n<a x=\"1\" y=\"&lt;2&gt;\">\n  <b>t</b>\n  <b>u</b>\n  <c/>\n  <d k=\"v\">inner &amp; more</d>\n  <e><![CDATA[<raw>]]></e>\n</a>",
        )
        .unwrap();
        let a = &doc["a"];
        assert_eq!(a["@x"].as_str(), Some("1"));
        assert_eq!(a["@y"].as_str(), Some("<2>"));
        assert_eq!(a["b"].as_array().map(Vec::len), Some(2));
        assert!(a["c"].is_null());
        assert_eq!(a["d"]["#text"].as_str(), Some("inner & more"));
        assert_eq!(a["e"].as_str(), Some("<raw>"));
    }

    #[test]
    fn test_errors() {
        let err = parse("<a>\n  <b></c>\n</a>").unwrap_err();
        assert_eq!(err.format(), Some(Format::Xml));
        assert!(parse("<a>").is_err());
        assert!(parse("").is_err());
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_writer_round_trip() {
        let input = "<a x=\"1\"><b>t</b><b>u</b><c/><d k=\"v\">q &amp; r</d></a>";
        let doc = parse(input).unwrap();
        let text = to_string(&doc).unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a x=\"1\">\n  <b>t</b>\n  <b>u</b>\n  <c/>\n  <d k=\"v\">q &amp; r</d>\n</a>\n"
        );
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_wraps_non_element_values() {
        let value = crate::json::parse(r#"{"a": 1, "b": [true, false]}"#).unwrap();
        let text = to_string(&value).unwrap();
        assert!(text.contains("<root>\n  <a>1</a>\n  <b>true</b>\n  <b>false</b>\n</root>\n"));
        let bad = crate::json::parse(r#"{"not valid": 1}"#).unwrap();
        assert!(matches!(to_string(&bad), Err(Error::UnsupportedType(_))));
    }
}
