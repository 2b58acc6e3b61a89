//! TOML value grammar: strings, numbers, booleans, date-times, arrays and
//! inline tables.
//!
//! Every function here works directly on the shared [`Cursor`] and keeps no
//! other state, so the document parser and the inline-table parser can call
//! into each other freely.

use super::key::parse_key_path;
use super::tree::{Origin, TableNode};
use crate::cursor::Cursor;
use crate::scalar::{parse_number, Grammar};
use crate::{Datetime, Result, Value};

/// Parses the value starting at the cursor.
pub(crate) fn parse_value(cur: &mut Cursor<'_>) -> Result<Value> {
    match cur.peek() {
        Some('"') | Some('\'') => parse_string(cur).map(Value::String),
        Some('t') | Some('f') => parse_bool(cur),
        Some('[') => parse_array(cur),
        Some('{') => parse_inline_table(cur),
        Some(c) if c.is_ascii_digit() => {
            if cur.peek_at(4) == Some('-') && cur.peek_at(7) == Some('-') {
                parse_datetime(cur)
            } else if cur.peek_at(2) == Some(':') {
                parse_local_time(cur)
            } else {
                parse_number_literal(cur)
            }
        }
        Some('+') | Some('-') | Some('i') | Some('n') => parse_number_literal(cur),
        Some('\n') | Some('\r') | Some('#') | None => Err(cur.error("expected a value")),
        Some(c) => Err(cur.error(format!("unexpected character `{c}`, expected a value"))),
    }
}

fn parse_bool(cur: &mut Cursor<'_>) -> Result<Value> {
    let mark = cur.mark();
    let word = cur.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    match word {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(cur.error_at(
            mark,
            format!("invalid value `{word}`, expected `true` or `false`"),
        )),
    }
}

fn parse_number_literal(cur: &mut Cursor<'_>) -> Result<Value> {
    let mark = cur.mark();
    let token =
        cur.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'));
    parse_number(token, Grammar::Toml)
        .map_err(|e| cur.error_at(mark, format!("invalid number `{token}`: {e}")))
}

#[inline]
fn is_datetime_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, 'T' | 't' | 'Z' | 'z' | '.' | ':' | '+' | '-')
}

fn parse_datetime(cur: &mut Cursor<'_>) -> Result<Value> {
    let mark = cur.mark();
    let mut token = cur.take_while(is_datetime_char).to_string();
    // `1979-05-27 07:32:00`: a single space may separate date and time
    if token.len() == 10
        && cur.peek() == Some(' ')
        && cur.peek_at(1).is_some_and(|c| c.is_ascii_digit())
    {
        cur.advance();
        token.push('T');
        token.push_str(cur.take_while(is_datetime_char));
    }
    token
        .parse::<Datetime>()
        .map(Value::Datetime)
        .map_err(|e| cur.error_at(mark, format!("invalid date-time `{token}`: {e}")))
}

fn parse_local_time(cur: &mut Cursor<'_>) -> Result<Value> {
    let mark = cur.mark();
    let token = cur.take_while(|c| c.is_ascii_digit() || c == ':' || c == '.');
    match token.parse::<Datetime>() {
        Ok(time @ Datetime::LocalTime(_)) => Ok(Value::Datetime(time)),
        Ok(_) => Err(cur.error_at(mark, format!("invalid local time `{token}`"))),
        Err(e) => Err(cur.error_at(mark, format!("invalid local time `{token}`: {e}"))),
    }
}

/// Parses any of the four string forms. Multi-line forms are detected by
/// their triple-quote opener.
pub(crate) fn parse_string(cur: &mut Cursor<'_>) -> Result<String> {
    if cur.matches("\"\"\"") {
        parse_multiline(cur, '"')
    } else if cur.matches("'''") {
        parse_multiline(cur, '\'')
    } else if cur.peek() == Some('"') {
        parse_basic(cur)
    } else {
        parse_literal(cur)
    }
}

fn check_control(cur: &Cursor<'_>, c: char) -> Result<()> {
    if (c < '\u{20}' && c != '\t') || c == '\u{7f}' {
        return Err(cur.error(format!(
            "control character U+{:04X} must be escaped",
            u32::from(c)
        )));
    }
    Ok(())
}

fn parse_basic(cur: &mut Cursor<'_>) -> Result<String> {
    let start = cur.mark();
    cur.advance();
    let mut out = String::new();
    loop {
        match cur.peek() {
            None | Some('\n') => return Err(cur.error_at(start, "unterminated string")),
            Some('"') => {
                cur.advance();
                return Ok(out);
            }
            Some('\\') => parse_escape(cur, &mut out, false)?,
            Some(c) => {
                check_control(cur, c)?;
                out.push(c);
                cur.advance();
            }
        }
    }
}

fn parse_literal(cur: &mut Cursor<'_>) -> Result<String> {
    let start = cur.mark();
    cur.advance();
    let mut out = String::new();
    loop {
        match cur.peek() {
            None | Some('\n') => return Err(cur.error_at(start, "unterminated string")),
            Some('\'') => {
                cur.advance();
                return Ok(out);
            }
            Some(c) => {
                check_control(cur, c)?;
                out.push(c);
                cur.advance();
            }
        }
    }
}

fn parse_multiline(cur: &mut Cursor<'_>, quote: char) -> Result<String> {
    let start = cur.mark();
    cur.advance_by(3);
    // a newline right after the opening delimiter is trimmed
    if !cur.eat('\n') {
        cur.eat_str("\r\n");
    }

    let mut out = String::new();
    loop {
        match cur.peek() {
            None => return Err(cur.error_at(start, "unterminated multi-line string")),
            Some(c) if c == quote => {
                let run = cur.rest().chars().take_while(|&q| q == quote).count();
                if run < 3 {
                    out.extend(std::iter::repeat(quote).take(run));
                    cur.advance_by(run);
                    continue;
                }
                // up to two quotes may sit directly before the closing three
                if run > 5 {
                    return Err(cur.error("too many quotes at the end of a multi-line string"));
                }
                out.extend(std::iter::repeat(quote).take(run - 3));
                cur.advance_by(run);
                return Ok(out);
            }
            Some('\\') if quote == '"' => parse_escape(cur, &mut out, true)?,
            Some('\n') => {
                out.push('\n');
                cur.advance();
            }
            Some('\r') if cur.peek_at(1) == Some('\n') => {
                out.push('\n');
                cur.advance_by(2);
            }
            Some(c) => {
                check_control(cur, c)?;
                out.push(c);
                cur.advance();
            }
        }
    }
}

fn parse_escape(cur: &mut Cursor<'_>, out: &mut String, multiline: bool) -> Result<()> {
    let mark = cur.mark();
    cur.advance();
    match cur.advance() {
        Some('b') => out.push('\u{8}'),
        Some('t') => out.push('\t'),
        Some('n') => out.push('\n'),
        Some('f') => out.push('\u{c}'),
        Some('r') => out.push('\r'),
        Some('"') => out.push('"'),
        Some('\\') => out.push('\\'),
        Some('x') => out.push(parse_hex_escape(cur, 2)?),
        Some('u') => out.push(parse_hex_escape(cur, 4)?),
        Some('U') => out.push(parse_hex_escape(cur, 8)?),
        Some(c) if multiline && matches!(c, ' ' | '\t' | '\n' | '\r') => {
            // line-ending backslash: trim through the next non-blank character
            let mut saw_newline = c == '\n';
            if c == '\r' {
                saw_newline = cur.eat('\n');
            }
            if !saw_newline {
                cur.skip_blanks();
                saw_newline = cur.eat('\n') || cur.eat_str("\r\n");
            }
            if !saw_newline {
                return Err(cur.error_at(mark, "only whitespace may follow a line-ending backslash"));
            }
            cur.take_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
        }
        Some(c) => {
            return Err(cur.error_at(mark, format!("invalid escape sequence `\\{c}`")));
        }
        None => return Err(cur.error_at(mark, "unterminated escape sequence")),
    }
    Ok(())
}

fn parse_hex_escape(cur: &mut Cursor<'_>, digits: usize) -> Result<char> {
    let mark = cur.mark();
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match cur.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(c);
                cur.advance();
            }
            _ => return Err(cur.error_at(mark, format!("expected {digits} hex digits in escape"))),
        }
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| cur.error_at(mark, format!("`{hex}` is not a valid unicode scalar value")))
}

/// Skips a `#` comment up to, not including, the line break.
pub(crate) fn skip_comment(cur: &mut Cursor<'_>) -> Result<()> {
    if !cur.eat('#') {
        return Ok(());
    }
    while let Some(c) = cur.peek() {
        if c == '\n' || (c == '\r' && cur.peek_at(1) == Some('\n')) {
            break;
        }
        check_control(cur, c)?;
        cur.advance();
    }
    Ok(())
}

/// Skips blanks, line breaks and comments.
pub(crate) fn skip_trivia(cur: &mut Cursor<'_>) -> Result<()> {
    loop {
        cur.skip_blanks();
        match cur.peek() {
            Some('#') => skip_comment(cur)?,
            Some('\n') => {
                cur.advance();
            }
            Some('\r') if cur.peek_at(1) == Some('\n') => cur.advance_by(2),
            Some('\r') => return Err(cur.error("carriage return must be followed by a newline")),
            _ => return Ok(()),
        }
    }
}

fn parse_array(cur: &mut Cursor<'_>) -> Result<Value> {
    let start = cur.mark();
    cur.advance();
    let mut items = Vec::new();
    loop {
        skip_trivia(cur)?;
        if cur.eat(']') {
            break;
        }
        if cur.is_eof() {
            return Err(cur.error_at(start, "unterminated array"));
        }
        items.push(parse_value(cur)?);
        skip_trivia(cur)?;
        if cur.eat(',') {
            continue;
        }
        if cur.eat(']') {
            break;
        }
        if cur.is_eof() {
            return Err(cur.error_at(start, "unterminated array"));
        }
        return Err(cur.error("expected `,` or `]` after array element"));
    }
    Ok(Value::Array(items))
}

fn parse_inline_table(cur: &mut Cursor<'_>) -> Result<Value> {
    let start = cur.mark();
    cur.advance();
    let mut table = TableNode::new(Origin::Header);
    loop {
        skip_trivia(cur)?;
        if cur.eat('}') {
            break;
        }
        if cur.is_eof() {
            return Err(cur.error_at(start, "unterminated inline table"));
        }
        let path = parse_key_path(cur)?;
        if !cur.eat('=') {
            return Err(cur.error("expected `=` after key"));
        }
        cur.skip_blanks();
        let value = parse_value(cur)?;
        table
            .insert_dotted(&path, value)
            .map_err(|(key, conflict)| cur.error_at(key.mark, conflict.message(&key.name)))?;
        skip_trivia(cur)?;
        if cur.eat(',') {
            continue;
        }
        if cur.eat('}') {
            break;
        }
        if cur.is_eof() {
            return Err(cur.error_at(start, "unterminated inline table"));
        }
        return Err(cur.error("expected `,` or `}` after inline table entry"));
    }
    Ok(Value::Table(table.into_table()))
}
