// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data model for the vizlite encoding compiler.
//!
//! This crate provides:
//! - scalar [`Value`]s and typed [`Field`] schemas,
//! - an owned row-oriented [`Dataset`] with stable row keys (which survive filtering, so
//!   compiled marks can point back at their source rows),
//! - parameter-aware row [`Predicate`]s, and
//! - group-by [`aggregate`]s.
//!
//! Everything here is `no_std` + `alloc`.

#![no_std]

extern crate alloc;

mod aggregate;
mod field;
mod predicate;
mod table;
mod time;
mod value;

pub use aggregate::{AggregateField, AggregateOp, aggregate};
pub use field::{DataType, Field, QuantitativeKind};
pub use predicate::{CompareOp, Operand, ParamLookup, Predicate};
pub use table::{DataRow, Dataset, DatasetError};
pub use time::{format_timestamp, parse_timestamp};
pub use value::{Value, ValueKey};
