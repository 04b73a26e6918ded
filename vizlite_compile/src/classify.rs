// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type classification and channel compatibility.

use vizlite_data::{DataType, Field, Value, parse_timestamp};

use crate::channel::Channel;
use crate::error::CompileError;

/// Picks the data type of a bound field.
///
/// A type declared on the binding wins, then the type declared on the field. Otherwise the
/// type is inferred from the non-null values: all numeric (numbers or numeric strings) is
/// quantitative, all times (or parseable date strings) is temporal, anything else is nominal.
/// A column with no non-null values is nominal.
pub fn classify<'a>(
    field: &Field,
    values: impl IntoIterator<Item = &'a Value>,
    declared: Option<DataType>,
) -> DataType {
    if let Some(t) = declared.or(field.declared_type) {
        return t;
    }
    infer(values)
}

/// Infers a data type from values alone.
pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> DataType {
    let mut seen = false;
    let mut numeric = true;
    let mut temporal = true;
    for v in values {
        let (is_num, is_time) = match v {
            Value::Null => continue,
            Value::Number(n) => (n.is_finite(), false),
            Value::Time(_) => (false, true),
            Value::String(s) => (
                s.trim().parse::<f64>().is_ok_and(f64::is_finite),
                parse_timestamp(s).is_some(),
            ),
        };
        seen = true;
        numeric &= is_num;
        temporal &= is_time;
        if !numeric && !temporal {
            return DataType::Nominal;
        }
    }
    if !seen {
        DataType::Nominal
    } else if numeric {
        DataType::Quantitative
    } else {
        DataType::Temporal
    }
}

/// Fails when `channel` cannot encode a field of type `data_type`.
pub fn check_compatible(channel: Channel, data_type: DataType) -> Result<(), CompileError> {
    if channel.accepts(data_type) {
        Ok(())
    } else {
        Err(CompileError::IncompatibleType { channel, data_type })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn values(v: &[Value]) -> Vec<Value> {
        v.to_vec()
    }

    #[test]
    fn infers_from_values() {
        let nums = values(&[Value::Number(1.0), Value::Null, Value::Number(2.5)]);
        assert_eq!(infer(&nums), DataType::Quantitative);

        let numeric_strings = values(&["1".into(), "2.5".into(), Value::Number(3.0)]);
        assert_eq!(infer(&numeric_strings), DataType::Quantitative);

        let dates = values(&["2020-01-01".into(), Value::Time(0)]);
        assert_eq!(infer(&dates), DataType::Temporal);

        let mixed = values(&["a".into(), Value::Number(1.0)]);
        assert_eq!(infer(&mixed), DataType::Nominal);

        assert_eq!(infer(&values(&[Value::Null])), DataType::Nominal);
        assert_eq!(infer(&vec![]), DataType::Nominal);
    }

    #[test]
    fn declared_types_win() {
        let nums = values(&[Value::Number(1.0)]);
        let field = Field::typed("f", DataType::Ordinal);
        assert_eq!(classify(&field, &nums, None), DataType::Ordinal);
        assert_eq!(
            classify(&field, &nums, Some(DataType::Nominal)),
            DataType::Nominal
        );
        assert_eq!(
            classify(&Field::new("f"), &nums, None),
            DataType::Quantitative
        );
    }

    #[test]
    fn shape_rejects_quantitative_but_color_accepts_it() {
        assert_eq!(
            check_compatible(Channel::Shape, DataType::Quantitative),
            Err(CompileError::IncompatibleType {
                channel: Channel::Shape,
                data_type: DataType::Quantitative,
            })
        );
        assert_eq!(check_compatible(Channel::Color, DataType::Quantitative), Ok(()));
    }
}
