// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field schema types.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Measurement level of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Category labels; equality only.
    Nominal,
    /// Ranked categories.
    Ordinal,
    /// Numeric values.
    Quantitative,
    /// Points in time.
    Temporal,
}

impl DataType {
    /// Returns the lowercase name used in specs (`"nominal"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Ordinal => "ordinal",
            Self::Quantitative => "quantitative",
            Self::Temporal => "temporal",
        }
    }

    /// Parses a spec type name. Single-letter shorthands (`"n"`, `"o"`, `"q"`, `"t"`) are
    /// accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nominal" | "n" => Some(Self::Nominal),
            "ordinal" | "o" => Some(Self::Ordinal),
            "quantitative" | "q" => Some(Self::Quantitative),
            "temporal" | "t" => Some(Self::Temporal),
            _ => None,
        }
    }

    /// Whether values of this type are read as a continuous range.
    pub fn is_continuous(self) -> bool {
        matches!(self, Self::Quantitative | Self::Temporal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-kind of a quantitative field.
///
/// Only affects whether a zero baseline is included by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuantitativeKind {
    /// Differences are meaningful, ratios are not (e.g. temperatures in Celsius).
    Interval,
    /// Has a true zero (counts, lengths, populations).
    Ratio,
}

/// A named column of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Declared type; inferred from values when absent.
    pub declared_type: Option<DataType>,
    /// Quantitative sub-kind, if known.
    pub quantitative_kind: Option<QuantitativeKind>,
}

impl Field {
    /// Creates an untyped field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            quantitative_kind: None,
        }
    }

    /// Creates a field with a declared type.
    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name).with_type(data_type)
    }

    /// Sets the declared type.
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.declared_type = Some(data_type);
        self
    }

    /// Sets the quantitative sub-kind.
    pub fn with_quantitative_kind(mut self, kind: QuantitativeKind) -> Self {
        self.quantitative_kind = Some(kind);
        self
    }
}
