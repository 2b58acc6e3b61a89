use super::value::parse_string;
use crate::cursor::{Cursor, Mark};
use crate::Result;

/// One segment of a key path, with the position it was written at.
#[derive(Clone, Debug)]
pub(crate) struct Key {
    pub name: String,
    pub mark: Mark,
}

#[inline]
pub(crate) fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

pub(crate) fn parse_key(cur: &mut Cursor<'_>) -> Result<Key> {
    let mark = cur.mark();
    let name = match cur.peek() {
        Some('"') | Some('\'') => {
            if cur.matches("\"\"\"") || cur.matches("'''") {
                return Err(cur.error("multi-line strings cannot be used as keys"));
            }
            parse_string(cur)?
        }
        Some(c) if is_bare_key_char(c) => cur.take_while(is_bare_key_char).to_string(),
        Some(c) => return Err(cur.error(format!("unexpected character `{c}`, expected a key"))),
        None => return Err(cur.error("unexpected end of input, expected a key")),
    };
    Ok(Key { name, mark })
}

/// Parses `a.b."c d"`, allowing blanks around the dots. Trailing blanks
/// are consumed.
pub(crate) fn parse_key_path(cur: &mut Cursor<'_>) -> Result<Vec<Key>> {
    let mut path = vec![parse_key(cur)?];
    loop {
        cur.skip_blanks();
        if !cur.eat('.') {
            return Ok(path);
        }
        cur.skip_blanks();
        path.push(parse_key(cur)?);
    }
}

/// Joins a key path back into dotted form for messages.
pub(crate) fn display_path(path: &[Key]) -> String {
    path.iter()
        .map(|k| {
            if !k.name.is_empty() && k.name.chars().all(is_bare_key_char) {
                k.name.clone()
            } else {
                format!("{:?}", k.name)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    fn names(input: &str) -> Vec<String> {
        let mut cur = Cursor::new(input, Format::Toml);
        parse_key_path(&mut cur)
            .unwrap()
            .into_iter()
            .map(|k| k.name)
            .collect()
    }

    #[test]
    fn test_key_paths() {
        assert_eq!(names("a"), ["a"]);
        assert_eq!(names("a . b.c ="), ["a", "b", "c"]);
        assert_eq!(names("site.\"google.com\""), ["site", "google.com"]);
        assert_eq!(names("3.14159"), ["3", "14159"]);
        assert_eq!(names("'quoted \"x\"'"), ["quoted \"x\""]);
        assert_eq!(names("\"\""), [""]);
    }

    #[test]
    fn test_key_rejections() {
        let mut cur = Cursor::new("\"\"\"a\"\"\" = 1", Format::Toml);
        assert!(parse_key(&mut cur).is_err());
        let mut cur = Cursor::new("= 1", Format::Toml);
        assert!(parse_key(&mut cur).is_err());
        let mut cur = Cursor::new("a. = 1", Format::Toml);
        assert!(parse_key_path(&mut cur).is_err());
    }

    #[test]
    fn test_display_path() {
        let mut cur = Cursor::new("a.\"b c\".d", Format::Toml);
        let path = parse_key_path(&mut cur).unwrap();
        assert_eq!(display_path(&path), "a.\"b c\".d");
    }
}
