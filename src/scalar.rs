//! Scalar classification for unquoted tokens.
//!
//! Numbers are validated with explicit byte scanners before conversion, so a
//! token like `042` or `3.e+20` is rejected even though Rust's own numeric
//! parsers would accept a cleaned-up version of it. TOML treats a rejection
//! as a hard error; YAML falls back to a plain string.

use crate::Value;

/// Which literal grammar to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Grammar {
    /// Strict: `_` separators allowed, `inf`/`nan` spelled bare.
    Toml,
    /// Permissive: no separators, `.inf`/`.nan` spellings.
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum NumberError {
    #[error("empty number")]
    Empty,
    #[error("leading zeros are not allowed")]
    LeadingZero,
    #[error("prefixed integers cannot have a sign")]
    SignedPrefix,
    #[error("underscores must sit between digits")]
    MisplacedUnderscore,
    #[error("expected digits")]
    MissingDigits,
    #[error("expected digits after the decimal point")]
    MissingFraction,
    #[error("expected digits in the exponent")]
    MissingExponent,
    #[error("integer out of range for a 64-bit signed value")]
    OutOfRange,
    #[error("unexpected characters in number")]
    TrailingCharacters,
}

/// Parses `token` as an integer or float under `grammar`.
pub(crate) fn parse_number(token: &str, grammar: Grammar) -> Result<Value, NumberError> {
    if let Some(special) = special_float(token, grammar) {
        return Ok(Value::Float(special));
    }

    let b = token.as_bytes();
    if b.is_empty() {
        return Err(NumberError::Empty);
    }
    let underscores = grammar == Grammar::Toml;
    let signed = matches!(b[0], b'+' | b'-');
    let start = usize::from(signed);

    if b.len() > start + 1 && b[start] == b'0' {
        let radix = match b[start + 1] {
            b'x' => Some(16),
            b'o' => Some(8),
            b'b' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            if signed {
                return Err(NumberError::SignedPrefix);
            }
            let digits_start = start + 2;
            let end = scan_digits(b, digits_start, underscores, |c| {
                char::from(c).is_digit(radix)
            })?;
            if end == digits_start {
                return Err(NumberError::MissingDigits);
            }
            if end != b.len() {
                return Err(NumberError::TrailingCharacters);
            }
            let cleaned = strip_underscores(&token[digits_start..]);
            return i64::from_str_radix(&cleaned, radix)
                .map(Value::Integer)
                .map_err(|_| NumberError::OutOfRange);
        }
    }

    let int_end = scan_digits(b, start, underscores, |c| c.is_ascii_digit())?;
    if int_end == start {
        return Err(NumberError::MissingDigits);
    }
    if b[start] == b'0' && int_end - start > 1 {
        return Err(NumberError::LeadingZero);
    }

    let mut end = int_end;
    let mut is_float = false;
    if b.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        end = scan_digits(b, frac_start, underscores, |c| c.is_ascii_digit())?;
        if end == frac_start {
            return Err(NumberError::MissingFraction);
        }
        is_float = true;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        end += 1;
        if matches!(b.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let exp_start = end;
        end = scan_digits(b, exp_start, underscores, |c| c.is_ascii_digit())?;
        if end == exp_start {
            return Err(NumberError::MissingExponent);
        }
        is_float = true;
    }
    if end != b.len() {
        return Err(NumberError::TrailingCharacters);
    }

    let cleaned = strip_underscores(token);
    if is_float {
        cleaned
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| NumberError::TrailingCharacters)
    } else {
        cleaned
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| NumberError::OutOfRange)
    }
}

fn special_float(token: &str, grammar: Grammar) -> Option<f64> {
    match grammar {
        Grammar::Toml => match token {
            "inf" | "+inf" => Some(f64::INFINITY),
            "-inf" => Some(f64::NEG_INFINITY),
            "nan" | "+nan" | "-nan" => Some(f64::NAN),
            _ => None,
        },
        Grammar::Yaml => match token {
            ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
            "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
            ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
            _ => None,
        },
    }
}

/// Scans a run of digits starting at `i`, returning the index just past it.
/// An underscore is only accepted with a digit on both sides.
fn scan_digits(
    b: &[u8],
    mut i: usize,
    underscores: bool,
    is_digit: impl Fn(u8) -> bool,
) -> Result<usize, NumberError> {
    let mut after_digit = false;
    while let Some(&c) = b.get(i) {
        if is_digit(c) {
            after_digit = true;
        } else if c == b'_' && underscores {
            let before_digit = b.get(i + 1).is_some_and(|&n| is_digit(n));
            if !after_digit || !before_digit {
                return Err(NumberError::MisplacedUnderscore);
            }
            after_digit = false;
        } else {
            break;
        }
        i += 1;
    }
    Ok(i)
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|&c| c != '_').collect()
}

/// Classifies a plain (unquoted) YAML scalar.
///
/// Null, boolean and number spellings are lowercase only; anything that is
/// not one of them is returned as a string.
pub(crate) fn classify_yaml(token: &str) -> Value {
    match token {
        "" | "~" | "null" => return Value::Null,
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        _ => {}
    }
    let first = token.as_bytes()[0];
    if first.is_ascii_digit() || matches!(first, b'+' | b'-' | b'.') {
        if let Ok(number) = parse_number(token, Grammar::Yaml) {
            return number;
        }
    }
    Value::String(token.to_string())
}
