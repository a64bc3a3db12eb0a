//! Flattening of JSON documents into table rows.
//!
//! Nested objects become dotted column names (`{"location": {"lat": 1}}`
//! yields `location.lat`). Arrays are kept as values. A top-level array gives
//! one row per element; a top-level object gives a single row.

use crate::domain::model::Table;
use crate::utils::error::{EtlError, Result};
use serde_json::{Map, Value};

pub const SEPARATOR: &str = ".";

pub fn normalize(document: Value) -> Result<Table> {
    let rows = match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(object) => Ok(flatten_object(object)),
                other => Err(EtlError::ProcessingError {
                    message: format!(
                        "Array element {} is a {}, expected an object",
                        index,
                        type_name(&other)
                    ),
                }),
            })
            .collect::<Result<Vec<_>>>()?,
        Value::Object(object) => vec![flatten_object(object)],
        other => {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Response body is a {}, expected an object or an array of objects",
                    type_name(&other)
                ),
            })
        }
    };

    Ok(Table::from_rows(rows))
}

pub fn flatten_object(object: Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, None, object);
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, object: Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, key),
            None => key,
        };
        match value {
            Value::Object(nested) => flatten_into(flat, Some(name.as_str()), nested),
            scalar => {
                flat.insert(name, scalar);
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
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
    fn test_nested_objects_become_dotted_columns() {
        let table = normalize(json!([
            {"id": 1, "location": {"latitude": 40.7, "longitude": -73.9, "human_address": {"zip": "10001"}}},
            {"id": 2, "location": {"latitude": 40.6}}
        ]))
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.columns(),
            &[
                "id",
                "location.latitude",
                "location.longitude",
                "location.human_address.zip"
            ]
        );
        assert_eq!(table.get(0, "location.human_address.zip"), Some(&json!("10001")));
        assert_eq!(table.get(1, "location.longitude"), Some(&Value::Null));
    }

    #[test]
    fn test_arrays_are_kept_as_values() {
        let table = normalize(json!({"id": 7, "tags": ["a", "b"]})).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "tags"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_empty_nested_object_adds_no_column() {
        let table = normalize(json!([{"id": 1, "meta": {}}])).unwrap();
        assert_eq!(table.columns(), &["id"]);
    }

    #[test]
    fn test_empty_array_gives_empty_table() {
        let table = normalize(json!([])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_scalar_documents_are_rejected() {
        assert!(normalize(json!(42)).is_err());
        assert!(normalize(json!("text")).is_err());
        assert!(normalize(json!([1, 2])).is_err());
    }
}
