// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar cell values.

extern crate alloc;

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;

use crate::time;

/// A single dataset cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// A number.
    Number(f64),
    /// A string (category label, or an unparsed date/number).
    String(String),
    /// A point in time, in milliseconds since the Unix epoch (UTC).
    Time(i64),
}

/// A hashable identity for a [`Value`], used for distinct-value detection.
///
/// `-0.0` and `0.0` share a key, as do all NaNs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKey {
    /// Key for [`Value::Null`].
    Null,
    /// Key for [`Value::Number`] (normalized bit pattern).
    Number(u64),
    /// Key for [`Value::String`].
    String(String),
    /// Key for [`Value::Time`].
    Time(i64),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric reading of this value.
    ///
    /// Numbers map to themselves, numeric strings are parsed, and times map to epoch
    /// milliseconds.
    #[allow(clippy::cast_precision_loss, reason = "epoch milliseconds fit in 53 bits")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            Self::Time(t) => Some(*t as f64),
        }
    }

    /// Chronological reading of this value in epoch milliseconds.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "saturating conversion of a finite timestamp"
    )]
    pub fn as_time_ms(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Time(t) => Some(*t),
            Self::Number(n) if n.is_finite() => Some(*n as i64),
            Self::Number(_) => None,
            Self::String(s) => time::parse_timestamp(s),
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a hashable key for this value.
    pub fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            Self::Number(n) => {
                let n = if *n == 0.0 {
                    0.0
                } else if n.is_nan() {
                    f64::NAN
                } else {
                    *n
                };
                ValueKey::Number(n.to_bits())
            }
            Self::String(s) => ValueKey::String(s.clone()),
            Self::Time(t) => ValueKey::Time(*t),
        }
    }

    /// Natural ordering: numbers numerically, times chronologically, strings
    /// lexicographically.
    ///
    /// Mixed kinds order as number < time < string < null.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Null, Self::Null) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Compares two values for filtering.
    ///
    /// Times compare chronologically, numbers (and numeric strings) numerically, and plain
    /// strings lexicographically. Returns `None` when the values are not comparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if matches!(self, Self::Time(_)) || matches!(other, Self::Time(_)) {
            return Some(self.as_time_ms()?.cmp(&other.as_time_ms()?));
        }
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Time(_) => 1,
            Self::String(_) => 2,
            Self::Null => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Number(n) => format_number(f, *n),
            Self::String(s) => f.write_str(s),
            Self::Time(t) => f.write_str(&time::format_timestamp(*t)),
        }
    }
}

fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "only used to detect integral values below 2^53"
    )]
    let integral = n.is_finite() && n.abs() < 9.0e15 && (n as i64) as f64 == n;
    if integral {
        #[allow(clippy::cast_possible_truncation, reason = "checked integral above")]
        let i = n as i64;
        write!(f, "{i}")
    } else {
        write!(f, "{n}")
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::String(b.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s.clone()),
            // Nested values are kept as their JSON text.
            other => Self::String(other.to_string()),
        }
    }
}
