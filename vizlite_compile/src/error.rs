// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compilation errors.

extern crate alloc;

use alloc::string::String;

use thiserror::Error;
use vizlite_data::{DataType, DatasetError};

use crate::channel::Channel;
use crate::spec::MarkKind;

/// Errors raised while compiling a chart.
///
/// Every error aborts compilation; nothing is retried or silently dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A field's type cannot drive the channel it is bound to.
    #[error("channel `{channel}` cannot encode a {data_type} field")]
    IncompatibleType {
        /// The offending channel.
        channel: Channel,
        /// The field's resolved type.
        data_type: DataType,
    },
    /// The mark needs channels that are not bound.
    #[error("`{mark}` mark requires {channels}")]
    MissingRequiredChannel {
        /// The mark kind.
        mark: MarkKind,
        /// Human-readable requirement (e.g. `"x and y"`).
        channels: &'static str,
    },
    /// A range override has `min > max`.
    #[error("range of `{channel}` is inverted: {min} > {max}")]
    InvalidRange {
        /// The scale's channel.
        channel: Channel,
        /// Range start.
        min: f64,
        /// Range end.
        max: f64,
    },
    /// A range override does not fit the scale (e.g. colours on a size scale).
    #[error("range override does not fit the `{channel}` scale")]
    IncompatibleRange {
        /// The scale's channel.
        channel: Channel,
    },
    /// No usable values to build a domain from.
    #[error("field `{field}` has no values usable by the `{channel}` scale")]
    EmptyDomain {
        /// The scale's channel.
        channel: Channel,
        /// The bound field.
        field: String,
    },
    /// An explicit domain cannot be read as the scale needs.
    #[error("explicit domain of `{channel}` is not usable")]
    InvalidDomain {
        /// The scale's channel.
        channel: Channel,
    },
    /// A binding names a field that is not in the dataset.
    #[error("channel `{channel}` references unknown field `{field}`")]
    UnknownField {
        /// The binding's channel.
        channel: Channel,
        /// The missing field.
        field: String,
    },
    /// A channel other than `tooltip` is bound more than once.
    #[error("channel `{0}` is bound more than once")]
    DuplicateChannel(Channel),
    /// A constant cannot be used on its channel.
    #[error("`{value}` is not a valid constant for channel `{channel}`")]
    InvalidConstant {
        /// The binding's channel.
        channel: Channel,
        /// The rejected value, as text.
        value: String,
    },
    /// A parameter name is not declared.
    #[error("unknown parameter `{0}`")]
    UnknownParam(String),
    /// A parameter value violates its binding.
    #[error("invalid value for parameter `{name}`: {reason}")]
    InvalidParamValue {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Filtering or aggregation failed.
    #[error(transparent)]
    Data(#[from] DatasetError),
}
