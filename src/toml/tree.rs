//! Parser-side table tree.
//!
//! While a document is being read, every table remembers how it came to
//! exist, and arrays created by `[[name]]` are kept apart from literal
//! arrays. Those markers decide which later statements may extend a table.
//! Once parsing finishes the tree is converted into a plain [`Table`] and
//! the markers are dropped.

use indexmap::IndexMap;

use super::key::Key;
use crate::{Table, Value};

/// How a table was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Intermediate segment of a header path; may still be defined once.
    Implicit,
    /// Created by a dotted key.
    Dotted,
    /// Defined by a `[header]` or as an `[[array]]` element.
    Header,
}

#[derive(Debug)]
pub(crate) enum Node {
    Table(TableNode),
    ArrayOfTables(Vec<TableNode>),
    /// Any finished value. Inline tables and literal arrays live here and
    /// are closed to further extension.
    Value(Value),
}

#[derive(Debug)]
pub(crate) struct TableNode {
    entries: IndexMap<String, Node>,
    origin: Origin,
}

/// Why a statement cannot be applied to the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Conflict {
    DuplicateKey,
    TableRedefined,
    DefinedByDottedKeys,
    DefinedByHeader,
    InlineTable,
    StaticArray,
    TableAsArray,
    ArrayAsTable,
    ArrayOfTablesDotted,
    NotATable(&'static str),
}

impl Conflict {
    pub fn message(&self, key: &str) -> String {
        match self {
            Conflict::DuplicateKey => format!("duplicate key `{key}`"),
            Conflict::TableRedefined => format!("table `{key}` is already defined"),
            Conflict::DefinedByDottedKeys => {
                format!("table `{key}` is already defined by dotted keys")
            }
            Conflict::DefinedByHeader => {
                format!("cannot add dotted keys to table `{key}` defined by a header")
            }
            Conflict::InlineTable => format!("cannot extend inline table `{key}`"),
            Conflict::StaticArray => {
                format!("cannot append to statically defined array `{key}`")
            }
            Conflict::TableAsArray => {
                format!("cannot redefine table `{key}` as an array of tables")
            }
            Conflict::ArrayAsTable => {
                format!("cannot redefine array of tables `{key}` as a table")
            }
            Conflict::ArrayOfTablesDotted => {
                format!("cannot add dotted keys to array of tables `{key}`")
            }
            Conflict::NotATable(kind) => format!("key `{key}` is not a table (found {kind})"),
        }
    }
}

fn occupied_kind(node: &Node) -> Conflict {
    match node {
        Node::Value(Value::Table(_)) => Conflict::InlineTable,
        Node::Value(Value::Array(_)) => Conflict::StaticArray,
        Node::Value(other) => Conflict::NotATable(other.type_name()),
        Node::ArrayOfTables(_) => Conflict::ArrayOfTablesDotted,
        Node::Table(_) => Conflict::DuplicateKey,
    }
}

impl TableNode {
    pub fn new(origin: Origin) -> Self {
        TableNode {
            entries: IndexMap::new(),
            origin,
        }
    }

    /// Steps into `key` for a dotted key such as the `a` in `a.b = 1`.
    pub fn descend_dotted(&mut self, key: &str) -> Result<&mut TableNode, Conflict> {
        let node = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Node::Table(TableNode::new(Origin::Dotted)));
        match node {
            Node::Table(table) if table.origin == Origin::Header => Err(Conflict::DefinedByHeader),
            Node::Table(table) => Ok(table),
            other => Err(occupied_kind(other)),
        }
    }

    /// Steps into `key` as a non-final segment of a table header, landing on
    /// the last element of an array of tables.
    pub fn descend_header(&mut self, key: &str) -> Result<&mut TableNode, Conflict> {
        let node = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Node::Table(TableNode::new(Origin::Implicit)));
        match node {
            Node::Table(table) => Ok(table),
            Node::ArrayOfTables(tables) => tables.last_mut().ok_or(Conflict::StaticArray),
            other => Err(occupied_kind(other)),
        }
    }

    /// Applies `[key]` as the final segment of a header.
    pub fn define_table(&mut self, key: &str) -> Result<&mut TableNode, Conflict> {
        let node = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Node::Table(TableNode::new(Origin::Implicit)));
        match node {
            Node::Table(table) => match table.origin {
                Origin::Implicit => {
                    table.origin = Origin::Header;
                    Ok(table)
                }
                Origin::Header => Err(Conflict::TableRedefined),
                Origin::Dotted => Err(Conflict::DefinedByDottedKeys),
            },
            Node::ArrayOfTables(_) => Err(Conflict::ArrayAsTable),
            Node::Value(Value::Table(_)) => Err(Conflict::InlineTable),
            Node::Value(_) => Err(Conflict::DuplicateKey),
        }
    }

    /// Applies `[[key]]`: appends a fresh table to the array of tables at
    /// `key`, creating the array if needed.
    pub fn append_array_table(&mut self, key: &str) -> Result<&mut TableNode, Conflict> {
        let node = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Node::ArrayOfTables(Vec::new()));
        match node {
            Node::ArrayOfTables(tables) => {
                tables.push(TableNode::new(Origin::Header));
                tables.last_mut().ok_or(Conflict::StaticArray)
            }
            Node::Value(Value::Array(_)) => Err(Conflict::StaticArray),
            Node::Table(_) | Node::Value(Value::Table(_)) => Err(Conflict::TableAsArray),
            Node::Value(_) => Err(Conflict::DuplicateKey),
        }
    }

    pub fn insert_value(&mut self, key: &str, value: Value) -> Result<(), Conflict> {
        if self.entries.contains_key(key) {
            return Err(Conflict::DuplicateKey);
        }
        self.entries.insert(key.to_string(), Node::Value(value));
        Ok(())
    }

    /// Assigns `value` at a possibly dotted key path, creating intermediate
    /// tables. On failure returns the offending key segment.
    pub fn insert_dotted<'k>(
        &mut self,
        path: &'k [Key],
        value: Value,
    ) -> Result<(), (&'k Key, Conflict)> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };
        let mut table = self;
        for key in parents {
            table = table.descend_dotted(&key.name).map_err(|c| (key, c))?;
        }
        table.insert_value(&last.name, value).map_err(|c| (last, c))
    }

    pub fn into_table(self) -> Table {
        self.entries
            .into_iter()
            .map(|(key, node)| (key, node.into_value()))
            .collect()
    }
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Table(table) => Value::Table(table.into_table()),
            Node::ArrayOfTables(tables) => Value::Array(
                tables
                    .into_iter()
                    .map(|t| Value::Table(t.into_table()))
                    .collect(),
            ),
            Node::Value(value) => value,
        }
    }
}
