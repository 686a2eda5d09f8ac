//! One-row table model for a parsed JSON record.
//!
//! Each top-level key of the source object becomes a column and the object
//! itself is the single row. Column order follows the key order of the
//! source document.

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// A single cell, tagged with the type it will be encoded as.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    /// Integer that fits in `i64`.
    Int64(i64),
    /// Integer above `i64::MAX`.
    UInt64(u64),
    /// Any other JSON number.
    Float64(f64),
    Utf8(String),
    /// Array or object, carried through as-is.
    Nested(Value),
}

impl CellValue {
    fn from_number(number: &Number) -> Self {
        if let Some(v) = number.as_i64() {
            Self::Int64(v)
        } else if let Some(v) = number.as_u64() {
            Self::UInt64(v)
        } else {
            // serde_json without arbitrary_precision always yields an f64 here.
            Self::Float64(number.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::from_number(&n),
            Value::String(s) => Self::Utf8(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Nested(nested),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub value: CellValue,
}

/// A table with exactly one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Parses `text` as a single JSON object and lifts it into a table.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the text is not valid JSON or the value is
    /// not an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::parse(format!("invalid JSON: {e}")))?;
        match value {
            Value::Object(object) => Ok(Self::from_object(object)),
            other => Err(Error::parse(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn from_object(object: Map<String, Value>) -> Self {
        let columns = object
            .into_iter()
            .map(|(name, value)| Column {
                name,
                value: CellValue::from(value),
            })
            .collect();
        Self { columns }
    }

    pub fn num_rows(&self) -> usize {
        1
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Removes every column whose name is in `names`.
    ///
    /// Names with no matching column are ignored. Returns the removed column
    /// names in table order.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut removed = Vec::new();
        self.columns.retain(|column| {
            let excluded = names.iter().any(|n| n.as_ref() == column.name);
            if excluded {
                removed.push(column.name.clone());
            }
            !excluded
        });
        removed
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_become_columns_in_document_order() {
        let table =
            Table::from_json_str(r#"{"zeta": 1, "alpha": "a", "mid": true}"#).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn values_are_tagged_by_type() {
        let table = Table::from_json_str(
            r#"{"n": null, "b": false, "i": -3, "u": 18446744073709551615,
                "f": 1.5, "s": "x", "arr": [1, 2], "obj": {"k": "v"}}"#,
        )
        .unwrap();
        let value = |name: &str| {
            table
                .columns()
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.value.clone())
                .unwrap()
        };
        assert_eq!(value("n"), CellValue::Null);
        assert_eq!(value("b"), CellValue::Boolean(false));
        assert_eq!(value("i"), CellValue::Int64(-3));
        assert_eq!(value("u"), CellValue::UInt64(u64::MAX));
        assert_eq!(value("f"), CellValue::Float64(1.5));
        assert_eq!(value("s"), CellValue::Utf8("x".into()));
        assert_eq!(value("arr"), CellValue::Nested(json!([1, 2])));
        assert_eq!(value("obj"), CellValue::Nested(json!({"k": "v"})));
    }

    #[test]
    fn non_objects_are_rejected() {
        for text in [r#"[{"a": 1}]"#, "42", r#""text""#, "null"] {
            let err = Table::from_json_str(text).unwrap_err();
            assert!(matches!(err, Error::Parse { .. }), "{text}");
        }
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = Table::from_json_str("not json at all").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        // Newline-delimited records are more than one value.
        let err = Table::from_json_str("{\"a\": 1}\n{\"a\": 2}").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn drop_columns_ignores_missing_names() {
        let mut table =
            Table::from_json_str(r#"{"id": 1, "unwanted_field": "x", "name": "n"}"#).unwrap();

        let removed = table.drop_columns(&["unwanted_field", "not_there"]);
        assert_eq!(removed, vec!["unwanted_field"]);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);

        let removed = table.drop_columns(&["unwanted_field"]);
        assert!(removed.is_empty());
        assert_eq!(table.columns().len(), 2);
    }
}
