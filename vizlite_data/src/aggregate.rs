// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group-by aggregation.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::field::{DataType, Field, QuantitativeKind};
use crate::table::{Dataset, DatasetError};
use crate::value::{Value, ValueKey};

/// Aggregation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Count rows.
    Count,
    /// Sum values (skips non-numeric).
    Sum,
    /// Mean value (skips non-numeric).
    Mean,
    /// Minimum value (skips non-numeric).
    Min,
    /// Maximum value (skips non-numeric).
    Max,
}

impl AggregateOp {
    /// Returns the lowercase operation name (`"sum"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Parses an operation name. `"average"` is accepted for [`AggregateOp::Mean`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "mean" | "average" => Some(Self::Mean),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// A single aggregated output field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateField {
    /// Operation to apply.
    pub op: AggregateOp,
    /// Input column; unused by [`AggregateOp::Count`].
    pub input: Option<String>,
    /// Output column name.
    pub output: String,
}

impl AggregateField {
    /// Creates an aggregate over `input`, named `{op}_{input}`.
    pub fn new(op: AggregateOp, input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            output: alloc::format!("{}_{}", op.name(), input),
            op,
            input: Some(input),
        }
    }

    /// Creates a row count named `count`.
    pub fn count() -> Self {
        Self {
            op: AggregateOp::Count,
            input: None,
            output: "count".into(),
        }
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    numeric: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn push(&mut self, v: Option<f64>) {
        self.count += 1;
        let Some(v) = v.filter(|v| v.is_finite()) else {
            return;
        };
        if self.numeric == 0 {
            self.min = v;
            self.max = v;
        } else {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
        self.numeric += 1;
        self.sum += v;
    }

    #[allow(clippy::cast_precision_loss, reason = "row counts are small")]
    fn finish(&self, op: AggregateOp) -> Value {
        if op == AggregateOp::Count {
            return Value::Number(self.count as f64);
        }
        if self.numeric == 0 {
            return Value::Null;
        }
        Value::Number(match op {
            AggregateOp::Count => self.count as f64,
            AggregateOp::Sum => self.sum,
            AggregateOp::Mean => self.sum / self.numeric as f64,
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
        })
    }
}

/// Groups rows by the distinct tuples of `group_by` (first-seen order) and computes
/// `fields` per group.
///
/// Output fields are `group_by` (schema preserved) followed by the aggregate outputs,
/// declared quantitative ratio. Output rows get fresh keys.
pub fn aggregate(
    data: &Dataset,
    group_by: &[String],
    fields: &[AggregateField],
) -> Result<Dataset, DatasetError> {
    let mut key_cols = Vec::with_capacity(group_by.len());
    for name in group_by {
        key_cols.push(
            data.column_index(name)
                .ok_or_else(|| DatasetError::UnknownField(name.clone()))?,
        );
    }
    let mut input_cols = Vec::with_capacity(fields.len());
    for f in fields {
        let col = match (&f.input, f.op) {
            (_, AggregateOp::Count) => None,
            (Some(name), _) => Some(
                data.column_index(name)
                    .ok_or_else(|| DatasetError::UnknownField(name.clone()))?,
            ),
            (None, _) => return Err(DatasetError::UnknownField(f.output.clone())),
        };
        input_cols.push(col);
    }

    let mut index: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<Value>, Vec<Accumulator>)> = Vec::new();
    for row in &data.rows {
        let key: Vec<ValueKey> = key_cols.iter().map(|&c| row.values[c].key()).collect();
        let gi = *index.entry(key).or_insert_with(|| {
            let values = key_cols.iter().map(|&c| row.values[c].clone()).collect();
            let accs = fields.iter().map(|_| Accumulator::default()).collect();
            groups.push((values, accs));
            groups.len() - 1
        });
        for (acc, col) in groups[gi].1.iter_mut().zip(&input_cols) {
            acc.push(col.and_then(|c| row.values[c].as_f64()));
        }
    }

    let mut schema: Vec<Field> = key_cols.iter().map(|&c| data.fields[c].clone()).collect();
    schema.extend(fields.iter().map(|f| {
        Field::typed(f.output.clone(), DataType::Quantitative)
            .with_quantitative_kind(QuantitativeKind::Ratio)
    }));
    let mut out = Dataset::new(schema);
    for (mut values, accs) in groups {
        values.extend(accs.iter().zip(fields).map(|(a, f)| a.finish(f.op)));
        out.push_row(values)?;
    }
    Ok(out)
}
