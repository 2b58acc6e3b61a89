//! Indentation-driven YAML parser.
//!
//! The document is processed line by line. A stack of open containers
//! records the indentation each one started at and whether it is waiting
//! for a nested value (a `key:` or `-` with nothing after it). A deeper line
//! is only legal under such a waiting entry; a shallower line closes every
//! container indented past it.

use crate::cursor::Cursor;
use crate::scalar::classify_yaml;
use crate::{Error, Format, Result, Table, Value};

struct Line<'a> {
    number: usize,
    raw: &'a str,
}

enum Container {
    Mapping(Table),
    Sequence(Vec<Value>),
}

/// What the next nested value will fill.
enum Pending {
    Key(String),
    Item,
}

struct Frame {
    indent: usize,
    container: Container,
    pending: Option<Pending>,
}

impl Frame {
    fn mapping(indent: usize) -> Self {
        tracing::trace!(indent, "open mapping");
        Frame {
            indent,
            container: Container::Mapping(Table::new()),
            pending: None,
        }
    }

    fn sequence(indent: usize) -> Self {
        tracing::trace!(indent, "open sequence");
        Frame {
            indent,
            container: Container::Sequence(Vec::new()),
            pending: None,
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self.container, Container::Sequence(_))
    }

    /// Stores `value` in the slot left open by the pending key or item.
    fn fill(&mut self, value: Value) {
        match (self.pending.take(), &mut self.container) {
            (Some(Pending::Key(key)), Container::Mapping(table)) => {
                table.insert(key, value);
            }
            (Some(Pending::Item), Container::Sequence(items)) => items.push(value),
            _ => {}
        }
    }

    fn into_value(mut self) -> Value {
        if self.pending.is_some() {
            self.fill(Value::Null);
        }
        match self.container {
            Container::Mapping(table) => Value::Table(table),
            Container::Sequence(items) => Value::Array(items),
        }
    }
}

/// How a structural line begins.
enum LineKind<'a> {
    /// `- rest` (rest may be empty)
    Item(&'a str),
    /// `key: rest`, with the key still in source form
    Entry { key: &'a str, rest: &'a str },
    Scalar(&'a str),
}

pub(crate) struct YamlParser<'a> {
    lines: Vec<Line<'a>>,
    next: usize,
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl<'a> YamlParser<'a> {
    pub fn new(input: &'a str) -> Self {
        let lines = input
            .split('\n')
            .enumerate()
            .map(|(i, raw)| Line {
                number: i + 1,
                raw: raw.strip_suffix('\r').unwrap_or(raw),
            })
            .collect();
        YamlParser {
            lines,
            next: 0,
            stack: Vec::new(),
            root: None,
        }
    }

    pub fn parse(mut self) -> Result<Value> {
        while self.next < self.lines.len() {
            let index = self.next;
            self.next += 1;
            self.parse_line(index)?;
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
        Ok(self.root.unwrap_or_else(|| Value::Table(Table::new())))
    }

    fn error(&self, index: usize, column: usize, msg: impl Into<String>) -> Error {
        let line = &self.lines[index];
        Error::syntax_with_context(Format::Yaml, line.number, column, msg, line.raw)
    }

    fn parse_line(&mut self, index: usize) -> Result<()> {
        let raw = self.lines[index].raw;
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let content = strip_comment(&raw[indent..]);
        if content.is_empty() || content == "---" || content == "..." || content.starts_with('%')
        {
            return Ok(());
        }
        if content.starts_with('\t') {
            return Err(self.error(index, indent + 1, "tabs are not allowed in indentation"));
        }

        let kind = classify_line(content);
        let is_entry = matches!(kind, LineKind::Entry { .. });

        // close containers indented past this line, plus a compact sequence
        // that sits at its parent key's indentation when the next key arrives
        while let Some(top) = self.stack.last() {
            let compact_done = top.indent == indent
                && top.is_sequence()
                && is_entry
                && self
                    .stack
                    .len()
                    .checked_sub(2)
                    .and_then(|i| self.stack.get(i))
                    .is_some_and(|parent| parent.indent == indent && !parent.is_sequence());
            if top.indent > indent || compact_done {
                self.close_top();
            } else {
                break;
            }
        }

        let Some(top) = self.stack.last_mut() else {
            return self.open_root(index, indent, kind);
        };

        if top.indent == indent {
            if matches!(kind, LineKind::Item(_))
                && matches!(top.pending, Some(Pending::Key(_)))
            {
                // `key:` followed by `- item` at the same indentation
                self.stack.push(Frame::sequence(indent));
                return self.add_entry(index, indent, kind);
            }
            if top.pending.is_some() {
                top.fill(Value::Null);
            }
            return self.add_entry(index, indent, kind);
        }

        // deeper than the innermost open container
        if top.pending.is_none() {
            return Err(self.error(index, indent + 1, "unexpected indentation"));
        }
        match kind {
            LineKind::Item(_) => {
                self.stack.push(Frame::sequence(indent));
                self.add_entry(index, indent, kind)
            }
            LineKind::Entry { .. } => {
                self.stack.push(Frame::mapping(indent));
                self.add_entry(index, indent, kind)
            }
            LineKind::Scalar(text) => {
                let parent = top.indent;
                let value = self.scalar_value(index, indent, text, parent)?;
                if let Some(top) = self.stack.last_mut() {
                    top.fill(value);
                }
                Ok(())
            }
        }
    }

    fn open_root(&mut self, index: usize, indent: usize, kind: LineKind<'a>) -> Result<()> {
        // the root closes early when a later line dedents past it
        if self.root.is_some() {
            return Err(self.error(index, indent + 1, "unexpected content after document"));
        }
        match kind {
            LineKind::Item(_) => {
                self.stack.push(Frame::sequence(indent));
                self.add_entry(index, indent, kind)
            }
            LineKind::Entry { .. } => {
                self.stack.push(Frame::mapping(indent));
                self.add_entry(index, indent, kind)
            }
            LineKind::Scalar(text) => {
                let value = self.scalar_value(index, indent, text, indent)?;
                self.root = Some(value);
                Ok(())
            }
        }
    }

    /// Adds a key or item line to the container on top of the stack.
    fn add_entry(&mut self, index: usize, column: usize, kind: LineKind<'a>) -> Result<()> {
        let frame_indent = self.stack.last().map_or(0, |f| f.indent);
        match kind {
            LineKind::Scalar(_) => Err(self.error(
                index,
                column + 1,
                "expected a mapping key or a sequence item",
            )),
            LineKind::Entry { key, rest } => {
                let Some(Frame {
                    container: Container::Mapping(table),
                    ..
                }) = self.stack.last()
                else {
                    return Err(self.error(index, column + 1, "expected a sequence item"));
                };
                let name = self.parse_key(index, column, key)?;
                if table.contains_key(&name) {
                    return Err(self.error(index, column + 1, format!("duplicate key `{name}`")));
                }
                let rest_column = column + (rest.as_ptr() as usize - key.as_ptr() as usize);
                let value = if rest.is_empty() {
                    None
                } else {
                    Some(self.scalar_value(index, rest_column, rest, frame_indent)?)
                };
                if let Some(top) = self.stack.last_mut() {
                    top.pending = Some(Pending::Key(name));
                    if let Some(value) = value {
                        top.fill(value);
                    }
                }
                Ok(())
            }
            LineKind::Item(rest) => {
                if !self.stack.last().is_some_and(Frame::is_sequence) {
                    return Err(self.error(index, column + 1, "expected a mapping key"));
                }
                if let Some(top) = self.stack.last_mut() {
                    top.pending = Some(Pending::Item);
                }
                if rest.is_empty() {
                    return Ok(());
                }
                // content column of the item, just past `- `
                let line = self.lines[index].raw;
                let item_column = rest.as_ptr() as usize - line.as_ptr() as usize;
                match classify_line(rest) {
                    nested @ LineKind::Item(_) => {
                        self.stack.push(Frame::sequence(item_column));
                        self.add_entry(index, item_column, nested)
                    }
                    nested @ LineKind::Entry { .. } => {
                        self.stack.push(Frame::mapping(item_column));
                        self.add_entry(index, item_column, nested)
                    }
                    LineKind::Scalar(text) => {
                        let value = self.scalar_value(index, item_column, text, frame_indent)?;
                        if let Some(top) = self.stack.last_mut() {
                            top.fill(value);
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    fn parse_key(&self, index: usize, column: usize, key: &str) -> Result<String> {
        if key.starts_with('"') || key.starts_with('\'') {
            let mut cur = Cursor::with_origin(key, Format::Yaml, self.lines[index].number, column + 1);
            let name = parse_quoted(&mut cur)?;
            if !cur.rest().trim().is_empty() {
                return Err(cur.error("unexpected characters after quoted key"));
            }
            Ok(name)
        } else {
            Ok(key.to_string())
        }
    }

    /// Converts the text after `key:` or `- ` (or a scalar line) into a value.
    /// `parent_indent` bounds the lines a block scalar may take.
    fn scalar_value(
        &mut self,
        index: usize,
        column: usize,
        text: &str,
        parent_indent: usize,
    ) -> Result<Value> {
        let number = self.lines[index].number;
        match text.as_bytes().first() {
            Some(b'|' | b'>') => self.block_scalar(index, column, text, parent_indent),
            Some(b'[' | b'{' | b'"' | b'\'') => {
                let mut cur = Cursor::with_origin(text, Format::Yaml, number, column + 1);
                let value = parse_flow(&mut cur)?;
                cur.skip_blanks();
                if !cur.is_eof() {
                    return Err(cur.error("unexpected characters after value"));
                }
                Ok(value)
            }
            Some(b'&' | b'*' | b'!') => Err(self.error(
                index,
                column + 1,
                "anchors, aliases and tags are not supported",
            )),
            _ => Ok(classify_yaml(text)),
        }
    }

    fn block_scalar(
        &mut self,
        index: usize,
        column: usize,
        header: &str,
        parent_indent: usize,
    ) -> Result<Value> {
        let folded = header.starts_with('>');
        let mut chomp = Chomp::Clip;
        let mut explicit = None;
        for c in header[1..].chars() {
            match c {
                '-' => chomp = Chomp::Strip,
                '+' => chomp = Chomp::Keep,
                '1'..='9' => explicit = c.to_digit(10).map(|d| d as usize),
                _ => {
                    return Err(self.error(
                        index,
                        column + 1,
                        format!("invalid block scalar header `{header}`"),
                    ))
                }
            }
        }

        let mut block_indent = explicit.map(|d| parent_indent + d);
        let mut body: Vec<&str> = Vec::new();
        while let Some(line) = self.lines.get(self.next) {
            let raw = line.raw;
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            if raw.trim().is_empty() {
                body.push("");
                self.next += 1;
                continue;
            }
            if indent <= parent_indent {
                break;
            }
            let required = *block_indent.get_or_insert(indent);
            if indent < required {
                break;
            }
            body.push(&raw[required..]);
            self.next += 1;
        }

        // trailing blank lines are governed by the chomping indicator
        let trailing = body.iter().rev().take_while(|l| l.is_empty()).count();
        body.truncate(body.len() - trailing);

        let mut text = if folded {
            fold_lines(&body)
        } else {
            body.join("\n")
        };
        match chomp {
            Chomp::Strip => {}
            Chomp::Clip => {
                if !body.is_empty() {
                    text.push('\n');
                }
            }
            Chomp::Keep => {
                if !body.is_empty() {
                    text.push('\n');
                }
                text.extend(std::iter::repeat('\n').take(trailing));
            }
        }
        Ok(Value::String(text))
    }

    /// Pops the innermost container and stores it in its parent.
    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let value = frame.into_value();
        match self.stack.last_mut() {
            Some(parent) => parent.fill(value),
            None => {
                self.root.get_or_insert(value);
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Chomp {
    Clip,
    Strip,
    Keep,
}

fn fold_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            if line.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
            continue;
        }
        let prev = lines[i - 1];
        if line.is_empty() {
            out.push('\n');
        } else if prev.is_empty() {
            out.push_str(line);
        } else if line.starts_with(' ') || prev.starts_with(' ') {
            out.push('\n');
            out.push_str(line);
        } else {
            out.push(' ');
            out.push_str(line);
        }
    }
    out
}

fn classify_line(content: &str) -> LineKind<'_> {
    if content == "-" {
        return LineKind::Item("");
    }
    if let Some(rest) = content.strip_prefix("- ") {
        return LineKind::Item(rest.trim_start());
    }
    match find_mapping_colon(content) {
        Some(pos) => LineKind::Entry {
            key: content[..pos].trim_end(),
            rest: content[pos + 1..].trim_start(),
        },
        None => LineKind::Scalar(content),
    }
}

/// Finds the `:` that separates a key from its value: followed by a space or
/// the end of the line, outside any quoted key. Flow collections are never
/// keys.
fn find_mapping_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let search_from = match bytes.first()? {
        b'[' | b'{' => return None,
        q @ (b'"' | b'\'') => closing_quote(bytes, *q)? + 1,
        _ => 0,
    };
    (search_from..bytes.len()).find(|&i| {
        bytes[i] == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ')
    })
}

fn closing_quote(bytes: &[u8], quote: u8) -> Option<usize> {
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 1,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 1,
            c if c == quote => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Removes a trailing `# comment` and trailing blanks. A `#` only starts a
/// comment at the beginning of the content or after whitespace, and never
/// inside a quoted scalar.
fn strip_comment(content: &str) -> &str {
    let bytes = content.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let at_token_start = i == 0 || matches!(bytes[i - 1], b' ' | b'\t' | b'[' | b'{' | b',');
        match quote {
            Some(b'"') if c == b'\\' => i += 1,
            Some(b'\'') if c == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 1,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if (c == b'"' || c == b'\'') && at_token_start => quote = Some(c),
            None if c == b'#' && (i == 0 || matches!(bytes[i - 1], b' ' | b'\t')) => {
                return content[..i].trim_end();
            }
            None => {}
        }
        i += 1;
    }
    content.trim_end()
}

/// Parses a flow value: `[..]`, `{..}`, a quoted scalar or a plain scalar.
fn parse_flow(cur: &mut Cursor<'_>) -> Result<Value> {
    cur.skip_blanks();
    match cur.peek() {
        Some('[') => {
            let start = cur.mark();
            cur.advance();
            let mut items = Vec::new();
            loop {
                cur.skip_blanks();
                if cur.eat(']') {
                    return Ok(Value::Array(items));
                }
                if cur.is_eof() {
                    return Err(cur.error_at(start, "unterminated flow sequence"));
                }
                items.push(parse_flow(cur)?);
                cur.skip_blanks();
                if !cur.eat(',') && cur.peek() != Some(']') {
                    return Err(cur.error("expected `,` or `]` in flow sequence"));
                }
            }
        }
        Some('{') => {
            let start = cur.mark();
            cur.advance();
            let mut table = Table::new();
            loop {
                cur.skip_blanks();
                if cur.eat('}') {
                    return Ok(Value::Table(table));
                }
                if cur.is_eof() {
                    return Err(cur.error_at(start, "unterminated flow mapping"));
                }
                let key_mark = cur.mark();
                let key = match cur.peek() {
                    Some('"') | Some('\'') => parse_quoted(cur)?,
                    _ => cur
                        .take_while(|c| !matches!(c, ':' | ',' | '}'))
                        .trim()
                        .to_string(),
                };
                cur.skip_blanks();
                let value = if cur.eat(':') {
                    cur.skip_blanks();
                    if matches!(cur.peek(), Some(',') | Some('}')) {
                        Value::Null
                    } else {
                        parse_flow(cur)?
                    }
                } else {
                    Value::Null
                };
                if table.contains_key(&key) {
                    return Err(cur.error_at(key_mark, format!("duplicate key `{key}`")));
                }
                table.insert(key, value);
                cur.skip_blanks();
                if !cur.eat(',') && cur.peek() != Some('}') {
                    return Err(cur.error("expected `,` or `}` in flow mapping"));
                }
            }
        }
        Some('"') | Some('\'') => parse_quoted(cur).map(Value::String),
        _ => {
            let text = cur.take_while(|c| !matches!(c, ',' | ']' | '}'));
            Ok(classify_yaml(text.trim()))
        }
    }
}

/// Parses a single- or double-quoted scalar on one line.
fn parse_quoted(cur: &mut Cursor<'_>) -> Result<String> {
    let start = cur.mark();
    let Some(quote) = cur.advance() else {
        return Err(cur.error("expected a quoted scalar"));
    };
    let mut out = String::new();
    loop {
        match cur.advance() {
            None => return Err(cur.error_at(start, "unterminated quoted scalar")),
            Some('\'') if quote == '\'' => {
                if cur.eat('\'') {
                    out.push('\'');
                } else {
                    return Ok(out);
                }
            }
            Some('"') if quote == '"' => return Ok(out),
            Some('\\') if quote == '"' => {
                let mark = cur.mark();
                let escaped = match cur.advance() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('e') => '\u{1b}',
                    Some(' ') => ' ',
                    Some('"') => '"',
                    Some('/') => '/',
                    Some('\\') => '\\',
                    Some('x') => hex_escape(cur, 2)?,
                    Some('u') => hex_escape(cur, 4)?,
                    Some('U') => hex_escape(cur, 8)?,
                    Some(c) => {
                        return Err(cur.error_at(mark, format!("invalid escape sequence `\\{c}`")))
                    }
                    None => return Err(cur.error_at(start, "unterminated quoted scalar")),
                };
                out.push(escaped);
            }
            Some(c) => out.push(c),
        }
    }
}

fn hex_escape(cur: &mut Cursor<'_>, digits: usize) -> Result<char> {
    let mark = cur.mark();
    let rest = cur.rest();
    let hex = rest.get(..digits).filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
    let Some(hex) = hex else {
        return Err(cur.error_at(mark, format!("expected {digits} hex digits in escape")));
    };
    let ch = u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| cur.error_at(mark, format!("`{hex}` is not a valid unicode scalar value")))?;
    cur.advance_by(digits);
    Ok(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Value> {
        YamlParser::new(input).parse()
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("a: 1 # note"), "a: 1");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("a: \"x # y\""), "a: \"x # y\"");
        assert_eq!(strip_comment("a: it's # c"), "a: it's");
        assert_eq!(strip_comment("url: http://x#frag"), "url: http://x#frag");
    }

    #[test]
    fn test_classify_line() {
        assert!(matches!(classify_line("- a"), LineKind::Item("a")));
        assert!(matches!(classify_line("-"), LineKind::Item("")));
        assert!(matches!(classify_line("-1"), LineKind::Scalar("-1")));
        assert!(matches!(classify_line("a: b"), LineKind::Entry { key: "a", rest: "b" }));
        assert!(matches!(classify_line("a:"), LineKind::Entry { key: "a", rest: "" }));
        assert!(matches!(classify_line("http://x"), LineKind::Scalar(_)));
        assert!(matches!(classify_line("{a: 1}"), LineKind::Scalar(_)));
        assert!(matches!(
            classify_line("\"a: b\": c"),
            LineKind::Entry { key: "\"a: b\"", rest: "c" }
        ));
    }

    #[test]
    fn test_nested_mappings() {
        let doc = parse("server:\n  host: localhost\n  port: 8080\ndebug: true\n").unwrap();
        assert_eq!(doc["server"]["port"], Value::Integer(8080));
        assert_eq!(doc["debug"], Value::Bool(true));
    }

    #[test]
    fn test_sequences() {
        let doc = parse("items:\n  - 1\n  - two\n  -\n    nested: yes\ncompact:\n- a\n- b\nafter: ~\n").unwrap();
        assert_eq!(doc["items"][0], Value::Integer(1));
        assert_eq!(doc["items"][2]["nested"], Value::Bool(true));
        assert_eq!(doc["compact"].as_array().map(Vec::len), Some(2));
        assert!(doc["after"].is_null());
    }

    #[test]
    fn test_list_of_mappings() {
        let doc = parse("- name: a\n  tags:\n    - x\n- name: b\n- - 1\n  - 2\n").unwrap();
        assert_eq!(doc[0]["tags"][0].as_str(), Some("x"));
        assert_eq!(doc[1]["name"].as_str(), Some("b"));
        assert_eq!(doc[2][1], Value::Integer(2));
    }

    #[test]
    fn test_block_scalars() {
        let doc = parse("lit: |\n  line one\n  line two\n\nfold: >-\n  a\n  b\n\n  c\nnext: 1\n").unwrap();
        assert_eq!(doc["lit"].as_str(), Some("line one\nline two\n"));
        assert_eq!(doc["fold"].as_str(), Some("a b\nc"));
        assert_eq!(doc["next"], Value::Integer(1));
    }

    #[test]
    fn test_flow_and_quotes() {
        let doc = parse("a: [1, \"two\", {b: c}]\nd: 'it''s'\ne: \"tab\\tend\"\nf: {}\n").unwrap();
        assert_eq!(doc["a"][2]["b"].as_str(), Some("c"));
        assert_eq!(doc["d"].as_str(), Some("it's"));
        assert_eq!(doc["e"].as_str(), Some("tab\tend"));
        assert_eq!(doc["f"], Value::Table(Table::new()));
    }

    #[test]
    fn test_scalar_on_next_line() {
        let doc = parse("key:\n  value here\nother: 1").unwrap();
        assert_eq!(doc["key"].as_str(), Some("value here"));
    }

    #[test]
    fn test_indentation_errors() {
        let err = parse("name: John\n  invalid: indentation").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("unexpected indentation"));
        assert!(parse("a:\n    b: 1\n  c: 2").is_err());
        assert!(parse("a:\n\tb: 1").is_err());
        assert!(parse("- a\nb: 1").is_err());
        let err = parse("  a: 1\nb: 2").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("unexpected content after document"));
        assert!(parse("a: 1\na: 2").unwrap_err().to_string().contains("duplicate key"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse("").unwrap(), Value::Table(Table::new()));
        assert_eq!(parse("# only\n---\n").unwrap(), Value::Table(Table::new()));
    }
}
