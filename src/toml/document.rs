use super::key::{display_path, parse_key_path, Key};
use super::tree::{Origin, TableNode};
use super::value::{parse_value, skip_comment, skip_trivia};
use crate::cursor::Cursor;
use crate::{Format, Result, Table};

/// Statement-level TOML parser.
///
/// Owns the cursor, the table tree under construction and the path of the
/// table that key/value lines currently write into.
pub(crate) struct DocumentParser<'a> {
    cur: Cursor<'a>,
    root: TableNode,
    current: Vec<String>,
}

impl<'a> DocumentParser<'a> {
    pub fn new(input: &'a str) -> Self {
        DocumentParser {
            cur: Cursor::new(input, Format::Toml),
            root: TableNode::new(Origin::Header),
            current: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Table> {
        loop {
            skip_trivia(&mut self.cur)?;
            match self.cur.peek() {
                None => break,
                Some('[') => self.parse_header()?,
                Some(_) => self.parse_key_value()?,
            }
            self.expect_line_end()?;
        }
        Ok(self.root.into_table())
    }

    /// Only blanks and a comment may follow a statement on its line.
    fn expect_line_end(&mut self) -> Result<()> {
        self.cur.skip_blanks();
        skip_comment(&mut self.cur)?;
        if self.cur.is_eof() || self.cur.eat('\n') || self.cur.eat_str("\r\n") {
            return Ok(());
        }
        let found = self.cur.peek().map_or_else(String::new, |c| format!(" `{c}`"));
        Err(self.cur.error(format!(
            "unexpected character{found}, expected a newline after the statement"
        )))
    }

    fn parse_header(&mut self) -> Result<()> {
        let cur = &mut self.cur;
        cur.advance();
        let is_array = cur.eat('[');
        cur.skip_blanks();
        let path = parse_key_path(cur)?;
        let closing = if is_array { "]]" } else { "]" };
        if !cur.eat_str(closing) {
            return Err(cur.error(format!("expected `{closing}` to close the table header")));
        }
        tracing::trace!(path = %display_path(&path), array = is_array, "table header");

        let Some((last, parents)) = path.split_last() else {
            return Err(cur.error("empty table header"));
        };
        let mut table = &mut self.root;
        for (depth, key) in parents.iter().enumerate() {
            table = table
                .descend_header(&key.name)
                .map_err(|c| cur.error_at(key.mark, c.message(&display_path(&path[..=depth]))))?;
        }
        let defined = if is_array {
            table.append_array_table(&last.name)
        } else {
            table.define_table(&last.name)
        };
        if let Err(conflict) = defined {
            return Err(cur.error_at(last.mark, conflict.message(&display_path(&path))));
        }

        self.current = path.into_iter().map(|k: Key| k.name).collect();
        Ok(())
    }

    fn parse_key_value(&mut self) -> Result<()> {
        let cur = &mut self.cur;
        let path = parse_key_path(cur)?;
        if !cur.eat('=') {
            return Err(cur.error("expected `=` after key"));
        }
        cur.skip_blanks();
        let value = parse_value(cur)?;

        let mut table = &mut self.root;
        for name in &self.current {
            table = table
                .descend_header(name)
                .map_err(|c| cur.error(c.message(name)))?;
        }
        table
            .insert_dotted(&path, value)
            .map_err(|(key, conflict)| cur.error_at(key.mark, conflict.message(&key.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn parse(input: &str) -> Result<Table> {
        DocumentParser::new(input).parse()
    }

    fn err(input: &str) -> String {
        parse(input).unwrap_err().to_string()
    }

    #[test]
    fn test_key_values_and_whitespace() {
        let a = parse("key = \"value\"").unwrap();
        let b = parse("   key   =   \"value\"   ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_order_tables_merge() {
        let doc = parse("[fruit.apple]\na = 1\n[animal]\n[fruit.orange]\nb = 2").unwrap();
        let fruit = doc["fruit"].as_table().unwrap();
        let keys: Vec<_> = fruit.keys().map(String::as_str).collect();
        assert_eq!(keys, ["apple", "orange"]);
        assert_eq!(doc["fruit"]["orange"]["b"], Value::Integer(2));
    }

    #[test]
    fn test_dotted_keys_in_sections() {
        let doc = parse("[fruit]\napple.color = \"red\"\napple.taste.sweet = true\n[fruit.apple.texture]\nsmooth = true").unwrap();
        assert_eq!(doc["fruit"]["apple"]["taste"]["sweet"], Value::Bool(true));
        assert_eq!(doc["fruit"]["apple"]["texture"]["smooth"], Value::Bool(true));
        assert!(err("[fruit]\napple.color = 1\n[fruit.apple]").contains("dotted keys"));
    }

    #[test]
    fn test_array_of_tables() {
        let doc = parse(
            "[[product]]\nname = \"Hammer\"\n\n[[product]]\n\n[[product]]\nname = \"Nail\"\n",
        )
        .unwrap();
        let items = doc["product"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[1].as_table().unwrap().is_empty());
        assert_eq!(items[2]["name"].as_str(), Some("Nail"));
    }

    #[test]
    fn test_nested_array_of_tables() {
        let doc = parse(
            "[[fruits]]\nname = \"apple\"\n[fruits.physical]\ncolor = \"red\"\n[[fruits.varieties]]\nname = \"red delicious\"\n[[fruits.varieties]]\nname = \"granny smith\"\n[[fruits]]\nname = \"banana\"\n[[fruits.varieties]]\nname = \"plantain\"",
        )
        .unwrap();
        let fruits = doc["fruits"].as_array().unwrap();
        assert_eq!(fruits.len(), 2);
        assert_eq!(fruits[0]["physical"]["color"].as_str(), Some("red"));
        assert_eq!(fruits[0]["varieties"].as_array().map(Vec::len), Some(2));
        assert_eq!(fruits[1]["varieties"][0]["name"].as_str(), Some("plantain"));
    }

    #[test]
    fn test_semantic_errors() {
        assert!(err("name = \"Tom\"\nname = \"Pradyun\"").contains("duplicate key `name`"));
        assert!(err("[fruit]\na=1\n[fruit]\nb=2").contains("table `fruit` is already defined"));
        assert!(err("a = {b = 1}\n[a]").contains("inline table"));
        assert!(err("a = {b = 1}\na.c = 2").contains("inline table"));
        assert!(err("a = [1]\n[[a]]").contains("statically defined array"));
        assert!(err("[a]\n[[a]]").contains("array of tables"));
        assert!(err("[[a]]\n[a]").contains("array of tables"));
        assert!(err("a = 1\n[a.b]").contains("not a table"));
        assert!(err("[a.b]\nc = 1\n[a]\nb.d = 2").contains("defined by a header"));
    }

    #[test]
    fn test_error_positions() {
        let e = parse("a = 1\nb = 2\na = 3").unwrap_err();
        assert_eq!((e.line(), e.column()), (Some(3), Some(1)));
        let e = parse("x = 1 y = 2").unwrap_err();
        assert_eq!((e.line(), e.column()), (Some(1), Some(7)));
    }

    #[test]
    fn test_trailing_garbage_and_headers() {
        assert!(parse("a = 1 # fine\n").is_ok());
        assert!(parse("[a] # fine\nb = 1").is_ok());
        assert!(parse("[a] b = 1").is_err());
        assert!(parse("[a").is_err());
        assert!(parse("[[a]").is_err());
        assert!(parse("[ a . b ]\nc = 1").is_ok());
        assert!(parse("a =").is_err());
        assert!(parse("a").is_err());
    }
}
