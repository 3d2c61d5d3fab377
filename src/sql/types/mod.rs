use std::fmt::Display;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::sql::parser::ast::{Consts, Expression};

/// Supported SQL data types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Boolean,
    Text,
}

/// Runtime value type - a tagged variant per supported type
///
/// Coercion rules apply only at the input boundary (INSERT and UPDATE SET
/// values); comparisons afterwards use `loosely_equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

/// Truthy-string rule for boolean input coercion
fn truthy(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

impl Value {
    /// Creates a Value from an AST expression
    pub fn from_expression(expr: Expression) -> Self {
        match expr {
            Expression::Consts(Consts::Boolean(b)) => Self::Boolean(b),
            Expression::Consts(Consts::Integer(i)) => Self::Integer(i),
            Expression::Consts(Consts::String(s)) => Self::Text(s),
        }
    }

    /// Coerces the value to the given column type
    ///
    /// Returns None only when nothing reasonable exists (a non-integer into
    /// an Integer column). Boolean coercion uses the truthy-string rule and
    /// never fails; Text accepts everything in its display form.
    pub fn coerce(self, datatype: &DataType) -> Option<Value> {
        match (self, datatype) {
            (value, DataType::Text) => Some(Value::Text(value.to_string())),
            (Value::Integer(i), DataType::Integer) => Some(Value::Integer(i)),
            (Value::Text(s), DataType::Integer) => s.parse().ok().map(Value::Integer),
            (Value::Boolean(_), DataType::Integer) => None,
            (Value::Boolean(b), DataType::Boolean) => Some(Value::Boolean(b)),
            (Value::Text(s), DataType::Boolean) => Some(Value::Boolean(truthy(&s))),
            (Value::Integer(i), DataType::Boolean) => Some(Value::Boolean(i == 1)),
        }
    }

    /// Loose equality across types
    ///
    /// Integer-vs-text compares numerically when the text parses; text pairs
    /// that both parse as integers also compare numerically. Boolean-vs-text
    /// casts the text as non-empty-and-not-"0", a wider net than the
    /// truthy-string input rule.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(x), Ok(y)) => x == y,
                _ => a == b,
            },
            (Value::Integer(i), Value::Text(s)) | (Value::Text(s), Value::Integer(i)) => {
                s.parse::<i64>().map_or(false, |x| x == *i)
            }
            (Value::Boolean(b), Value::Text(s)) | (Value::Text(s), Value::Boolean(b)) => {
                *b == (!s.is_empty() && s != "0")
            }
            (Value::Boolean(b), Value::Integer(i)) | (Value::Integer(i), Value::Boolean(b)) => {
                *b == (*i != 0)
            }
        }
    }
}

/// Canonical display form: also the index document key for a value
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A row is an insertion-ordered mapping from column name to value
///
/// Persisted as a JSON object whose member order is the order columns were
/// set, so row documents on disk read like the table definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the value stored under the column, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Sets a column, overwriting in place or appending at the end
    pub fn set(&mut self, column: &str, value: Value) {
        match self.entries.iter_mut().find(|(name, _)| name == column) {
            Some((_, stored)) => *stored = value,
            None => self.entries.push((column.to_string(), value)),
        }
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Merges another row into a copy of this one
    ///
    /// Columns present on both sides take the other row's value but keep this
    /// row's position; columns only in the other row append at the end. The
    /// merge is lossy: same-named columns are silently overwritten.
    pub fn merge(&self, other: &Row) -> Row {
        let mut merged = self.clone();
        for (name, value) in &other.entries {
            merged.set(name, value.clone());
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(&name.into(), value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of column names to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    row.set(&name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{DataType, Row, Value};
    use crate::error::Result;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(
            Value::Text("42".to_string()).coerce(&DataType::Integer),
            Some(Value::Integer(42))
        );
        assert_eq!(Value::Text("abc".to_string()).coerce(&DataType::Integer), None);
        assert_eq!(Value::Text("1.5".to_string()).coerce(&DataType::Integer), None);
        assert_eq!(Value::Boolean(true).coerce(&DataType::Integer), None);
        assert_eq!(
            Value::Integer(-3).coerce(&DataType::Integer),
            Some(Value::Integer(-3))
        );
    }

    #[test]
    fn test_coerce_boolean() {
        for s in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(
                Value::Text(s.to_string()).coerce(&DataType::Boolean),
                Some(Value::Boolean(true)),
                "for input {:?}",
                s
            );
        }
        for s in ["false", "0", "no", "off", "anything"] {
            assert_eq!(
                Value::Text(s.to_string()).coerce(&DataType::Boolean),
                Some(Value::Boolean(false)),
                "for input {:?}",
                s
            );
        }
        assert_eq!(
            Value::Integer(1).coerce(&DataType::Boolean),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            Value::Integer(5).coerce(&DataType::Boolean),
            Some(Value::Boolean(false))
        );
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(
            Value::Integer(7).coerce(&DataType::Text),
            Some(Value::Text("7".to_string()))
        );
        assert_eq!(
            Value::Boolean(true).coerce(&DataType::Text),
            Some(Value::Text("true".to_string()))
        );
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Integer(1).loosely_equals(&Value::Text("1".to_string())));
        assert!(Value::Integer(1).loosely_equals(&Value::Text("01".to_string())));
        assert!(!Value::Integer(1).loosely_equals(&Value::Text("1.5".to_string())));
        assert!(Value::Text("1".to_string()).loosely_equals(&Value::Text("01".to_string())));
        assert!(!Value::Text("a".to_string()).loosely_equals(&Value::Text("A".to_string())));

        // Text casts as a boolean by emptiness, not by the truthy-string rule
        assert!(Value::Boolean(true).loosely_equals(&Value::Text("no".to_string())));
        assert!(Value::Boolean(false).loosely_equals(&Value::Text("".to_string())));
        assert!(Value::Boolean(false).loosely_equals(&Value::Text("0".to_string())));

        assert!(Value::Boolean(true).loosely_equals(&Value::Integer(5)));
        assert!(Value::Boolean(false).loosely_equals(&Value::Integer(0)));
    }

    #[test]
    fn test_row_set_and_merge() {
        let left: Row = [
            ("id", Value::Integer(1)),
            ("name", Value::Text("Alice".to_string())),
        ]
        .into_iter()
        .collect();
        let right: Row = [
            ("name", Value::Text("Overwritten".to_string())),
            ("total", Value::Integer(9)),
        ]
        .into_iter()
        .collect();

        let merged = left.merge(&right);
        // Overwritten column keeps its left-side position; new column appends
        assert_eq!(merged.columns().collect::<Vec<_>>(), vec!["id", "name", "total"]);
        assert_eq!(merged.get("name"), Some(&Value::Text("Overwritten".to_string())));
        assert_eq!(merged.get("total"), Some(&Value::Integer(9)));
        assert_eq!(left.get("name"), Some(&Value::Text("Alice".to_string())));
    }

    #[test]
    fn test_row_serde_preserves_order() -> Result<()> {
        let row: Row = [
            ("b", Value::Integer(2)),
            ("a", Value::Text("x".to_string())),
            ("c", Value::Boolean(false)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&row)?;
        assert_eq!(json, r#"{"b":2,"a":"x","c":false}"#);

        let back: Row = serde_json::from_str(&json)?;
        assert_eq!(back, row);
        Ok(())
    }
}
