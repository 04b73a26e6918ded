// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned row-oriented dataset.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use thiserror::Error;

use crate::field::Field;
use crate::predicate::{ParamLookup, Predicate};
use crate::value::Value;

/// Errors returned when building, filtering or aggregating a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// A predicate or aggregate referenced a column that does not exist.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// A predicate referenced a parameter that is not defined.
    #[error("unknown parameter `{0}`")]
    UnknownParam(String),
    /// A row does not have one value per field.
    #[error("row has {got} values but the dataset has {expected} fields")]
    ArityMismatch {
        /// Number of fields in the dataset.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
    /// A JSON record is not an object.
    #[error("record {0} is not a JSON object")]
    InvalidRecord(usize),
    /// The JSON input could not be parsed.
    #[error("invalid JSON data: {0}")]
    Json(String),
}

/// One dataset row.
///
/// `values` are aligned to [`Dataset::fields`]. `key` is a stable identity that survives
/// filtering and reordering, so downstream primitives can refer back to their source rows.
#[derive(Clone, Debug, PartialEq)]
pub struct DataRow {
    /// Stable row identity.
    pub key: u64,
    /// Cell values, one per field.
    pub values: Vec<Value>,
}

/// An ordered sequence of rows sharing one field set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Column schema.
    pub fields: Vec<Field>,
    /// Rows in dataset order.
    pub rows: Vec<DataRow>,
    next_key: u64,
}

impl Dataset {
    /// Creates an empty dataset with the given schema.
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
            next_key: 0,
        }
    }

    /// Appends a row, returning its key.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<u64, DatasetError> {
        if values.len() != self.fields.len() {
            return Err(DatasetError::ArityMismatch {
                expected: self.fields.len(),
                got: values.len(),
            });
        }
        let key = self.next_key;
        self.next_key += 1;
        self.rows.push(DataRow { key, values });
        Ok(key)
    }

    /// Builder-style variant of [`Dataset::push_row`].
    pub fn with_row(mut self, values: Vec<Value>) -> Result<Self, DatasetError> {
        self.push_row(values)?;
        Ok(self)
    }

    /// Parses a JSON array of objects.
    pub fn from_json_str(s: &str) -> Result<Self, DatasetError> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| DatasetError::Json(alloc::format!("{e}")))?;
        match value {
            serde_json::Value::Array(records) => Self::from_json_values(&records),
            _ => Err(DatasetError::Json("expected an array of records".into())),
        }
    }

    /// Builds a dataset from JSON objects.
    ///
    /// The schema is the union of all keys in first-seen order; missing keys become
    /// [`Value::Null`]. Fields are untyped; types are classified later.
    pub fn from_json_values(records: &[serde_json::Value]) -> Result<Self, DatasetError> {
        let mut names: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let Some(object) = record.as_object() else {
                return Err(DatasetError::InvalidRecord(i));
            };
            for name in object.keys() {
                if !index.contains_key(name) {
                    index.insert(name.clone(), names.len());
                    names.push(name.clone());
                }
            }
        }

        let fields = names.iter().map(Field::new).collect();
        let mut out = Self::new(fields);
        for record in records {
            let mut values = alloc::vec![Value::Null; names.len()];
            if let Some(object) = record.as_object() {
                for (name, v) in object {
                    if let Some(&ci) = index.get(name) {
                        values[ci] = Value::from(v);
                    }
                }
            }
            out.push_row(values)?;
        }
        Ok(out)
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a column index for a field name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the schema entry for a field name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns a mutable schema entry (e.g. to declare a type after loading JSON).
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Gets the value of `name` in row `row`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let ci = self.column_index(name)?;
        self.value(row, ci)
    }

    /// Gets a value by row and column index.
    pub fn value(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row)?.values.get(col)
    }

    /// Iterates over the values of `name` in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().filter_map(move |r| r.values.get(col)))
    }

    /// Returns row keys in dataset order.
    pub fn row_keys(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.key).collect()
    }

    /// Returns a dataset with the selected rows (by index), preserving their keys.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            fields: self.fields.clone(),
            rows: rows
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            next_key: self.next_key,
        }
    }

    /// Returns the rows satisfying `predicate`, preserving order and keys.
    pub fn filter(
        &self,
        predicate: &Predicate,
        params: &dyn ParamLookup,
    ) -> Result<Self, DatasetError> {
        let mut keep = Vec::with_capacity(self.rows.len());
        for row in 0..self.rows.len() {
            if predicate.eval(self, row, params)? {
                keep.push(row);
            }
        }
        Ok(self.select(&keep))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use serde_json::json;

    use super::*;
    use crate::predicate::CompareOp;

    #[test]
    fn json_schema_is_union_of_keys_in_first_seen_order() {
        let records = json!([
            {"a": 1, "b": "x"},
            {"c": true, "a": 2}
        ]);
        let data = Dataset::from_json_values(records.as_array().unwrap()).unwrap();
        let names: Vec<&str> = data.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(data.get(1, "b"), Some(&Value::Null));
        assert_eq!(data.get(1, "c"), Some(&Value::from("true")));
        assert_eq!(data.row_keys(), vec![0, 1]);
    }

    #[test]
    fn non_object_record_is_rejected() {
        let records = json!([{"a": 1}, 3]);
        assert_eq!(
            Dataset::from_json_values(records.as_array().unwrap()),
            Err(DatasetError::InvalidRecord(1))
        );
    }

    #[test]
    fn push_row_checks_arity() {
        let mut data = Dataset::new(vec![Field::new("a"), Field::new("b")]);
        assert_eq!(
            data.push_row(vec![Value::Number(1.0)]),
            Err(DatasetError::ArityMismatch {
                expected: 2,
                got: 1,
            })
        );
    }

    #[test]
    fn filter_preserves_keys_and_order() {
        let data = Dataset::from_json_str(r#"[{"v": 3}, {"v": 1}, {"v": 5}, {"v": 2}]"#).unwrap();
        let pred = Predicate::compare("v", CompareOp::Ge, 2.0);
        let out = data.filter(&pred, &()).unwrap();
        assert_eq!(out.row_keys(), vec![0, 2, 3]);
    }
}
