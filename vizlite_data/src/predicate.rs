// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row predicates.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;

use crate::table::{Dataset, DatasetError};
use crate::value::Value;

/// Resolves named parameters referenced by predicates.
pub trait ParamLookup {
    /// Returns the current value of `name`, if defined.
    fn param(&self, name: &str) -> Option<&Value>;
}

impl ParamLookup for () {
    fn param(&self, _name: &str) -> Option<&Value> {
        None
    }
}

impl ParamLookup for HashMap<String, Value> {
    fn param(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CompareOp {
    /// Parses an operator token (`"<"`, `"lte"`, `"=="`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" | "lt" => Some(Self::Lt),
            "<=" | "lte" => Some(Self::Le),
            ">" | "gt" => Some(Self::Gt),
            ">=" | "gte" => Some(Self::Ge),
            "==" | "=" | "eq" | "equal" => Some(Self::Eq),
            "!=" | "ne" => Some(Self::Ne),
            _ => None,
        }
    }

    fn holds(self, ord: Option<Ordering>) -> bool {
        match (self, ord) {
            // Values that cannot be compared are never equal.
            (Self::Ne, None) => true,
            (_, None) => false,
            (Self::Lt, Some(o)) => o == Ordering::Less,
            (Self::Le, Some(o)) => o != Ordering::Greater,
            (Self::Gt, Some(o)) => o == Ordering::Greater,
            (Self::Ge, Some(o)) => o != Ordering::Less,
            (Self::Eq, Some(o)) => o == Ordering::Equal,
            (Self::Ne, Some(o)) => o != Ordering::Equal,
        }
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal value.
    Value(Value),
    /// The current value of a named parameter.
    Param(String),
}

impl Operand {
    fn resolve<'a>(&'a self, params: &'a dyn ParamLookup) -> Result<&'a Value, DatasetError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Param(name) => params
                .param(name)
                .ok_or_else(|| DatasetError::UnknownParam(name.clone())),
        }
    }

    /// Collects parameter names referenced by this operand.
    fn params<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Self::Param(name) = self {
            out.push(name);
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

/// A boolean test over one dataset row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field op rhs`.
    Compare {
        /// Column to read.
        field: String,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        rhs: Operand,
    },
    /// `field` equals one of `values`.
    OneOf {
        /// Column to read.
        field: String,
        /// Accepted values.
        values: Vec<Operand>,
    },
    /// `min <= field <= max`.
    Range {
        /// Column to read.
        field: String,
        /// Inclusive lower bound.
        min: Operand,
        /// Inclusive upper bound.
        max: Operand,
    },
    /// Negation.
    Not(Box<Self>),
    /// Conjunction; an empty list is `true`.
    And(Vec<Self>),
}

impl Predicate {
    /// Shorthand for [`Predicate::Compare`].
    pub fn compare(field: impl Into<String>, op: CompareOp, rhs: impl Into<Operand>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            rhs: rhs.into(),
        }
    }

    /// Shorthand for [`Predicate::Range`].
    pub fn range(
        field: impl Into<String>,
        min: impl Into<Operand>,
        max: impl Into<Operand>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// Evaluates the predicate against row `row` of `data`.
    pub fn eval(
        &self,
        data: &Dataset,
        row: usize,
        params: &dyn ParamLookup,
    ) -> Result<bool, DatasetError> {
        match self {
            Self::Compare { field, op, rhs } => {
                let v = lookup(data, row, field)?;
                let rhs = rhs.resolve(params)?;
                Ok(op.holds(v.compare(rhs)))
            }
            Self::OneOf { field, values } => {
                let v = lookup(data, row, field)?;
                for candidate in values {
                    let candidate = candidate.resolve(params)?;
                    if v.compare(candidate) == Some(Ordering::Equal) || v == candidate {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Range { field, min, max } => {
                let v = lookup(data, row, field)?;
                let lo = min.resolve(params)?;
                let hi = max.resolve(params)?;
                Ok(CompareOp::Ge.holds(v.compare(lo)) && CompareOp::Le.holds(v.compare(hi)))
            }
            Self::Not(inner) => Ok(!inner.eval(data, row, params)?),
            Self::And(all) => {
                for p in all {
                    if !p.eval(data, row, params)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Returns the parameter names this predicate reads.
    pub fn params(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare { rhs, .. } => rhs.params(out),
            Self::OneOf { values, .. } => values.iter().for_each(|v| v.params(out)),
            Self::Range { min, max, .. } => {
                min.params(out);
                max.params(out);
            }
            Self::Not(inner) => inner.collect_params(out),
            Self::And(all) => all.iter().for_each(|p| p.collect_params(out)),
        }
    }
}

fn lookup<'a>(data: &'a Dataset, row: usize, field: &str) -> Result<&'a Value, DatasetError> {
    let col = data
        .column_index(field)
        .ok_or_else(|| DatasetError::UnknownField(field.into()))?;
    Ok(data.value(row, col).unwrap_or(&Value::Null))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::field::Field;

    fn data() -> Dataset {
        let mut d = Dataset::new(vec![Field::new("n"), Field::new("c"), Field::new("t")]);
        d.push_row(vec![1.0.into(), "a".into(), "2020-01-01".into()])
            .unwrap();
        d.push_row(vec![5.0.into(), "b".into(), "2021-06-01".into()])
            .unwrap();
        d.push_row(vec![Value::Null, "c".into(), "2022-01-01".into()])
            .unwrap();
        d
    }

    fn keys(d: &Dataset, p: &Predicate, params: &dyn ParamLookup) -> Vec<u64> {
        d.filter(p, params).unwrap().row_keys()
    }

    #[test]
    fn compare_skips_nulls() {
        let d = data();
        assert_eq!(
            keys(&d, &Predicate::compare("n", CompareOp::Lt, 10.0), &()),
            vec![0, 1]
        );
        assert_eq!(
            keys(&d, &Predicate::compare("n", CompareOp::Ne, 1.0), &()),
            vec![1, 2]
        );
    }

    #[test]
    fn range_is_inclusive_and_reads_dates() {
        let d = data();
        let p = Predicate::range("t", "2020-01-01", "2021-06-01");
        assert_eq!(keys(&d, &p, &()), vec![0, 1]);
    }

    #[test]
    fn one_of_not_and() {
        let d = data();
        let one_of = Predicate::OneOf {
            field: "c".into(),
            values: vec!["a".into(), "c".into()],
        };
        assert_eq!(keys(&d, &one_of, &()), vec![0, 2]);
        let not = Predicate::Not(Box::new(one_of.clone()));
        assert_eq!(keys(&d, &not, &()), vec![1]);
        let and = Predicate::And(vec![one_of, Predicate::compare("n", CompareOp::Ge, 0.0)]);
        assert_eq!(keys(&d, &and, &()), vec![0]);
    }

    #[test]
    fn params_resolve_through_lookup() {
        let d = data();
        let p = Predicate::compare("n", CompareOp::Ge, Operand::Param("cut".into()));
        assert_eq!(p.params(), vec!["cut"]);
        let mut params: HashMap<String, Value> = HashMap::new();
        params.insert("cut".into(), Value::Number(2.0));
        assert_eq!(keys(&d, &p, &params), vec![1]);
        assert_eq!(
            d.filter(&p, &()),
            Err(DatasetError::UnknownParam("cut".into()))
        );
    }

    #[test]
    fn unknown_field_is_an_error() {
        let d = data();
        let p = Predicate::compare("missing", CompareOp::Eq, 1.0);
        assert_eq!(
            d.filter(&p, &()),
            Err(DatasetError::UnknownField("missing".into()))
        );
    }
}
