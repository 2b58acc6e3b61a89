/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use datafmt::{value, Value};
///
/// let server = value!({
///     "host": "localhost",
///     "ports": [80, 443],
///     "tls": null
/// });
/// assert_eq!(server["ports"][1], Value::Integer(443));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Table(table)
    }};

    // any other expression goes through its `Serialize` impl
    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Table, Value};

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(42), Value::Integer(42));
        assert_eq!(value!(3.5), Value::Float(3.5));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
        let n = -7;
        assert_eq!(value!(n), Value::Integer(-7));
    }

    #[test]
    fn test_value_macro_nesting() {
        assert_eq!(value!([]), Value::Array(vec![]));
        assert_eq!(value!({}), Value::Table(Table::new()));

        let doc = value!({
            "name": "Alice",
            "tags": ["a", "b"],
            "owner": { "id": 1 }
        });
        let keys: Vec<_> = doc.as_table().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["name", "tags", "owner"]);
        assert_eq!(doc["tags"][1].as_str(), Some("b"));
        assert_eq!(doc["owner"]["id"], Value::Integer(1));
    }
}
