// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoding resolution.
//!
//! Resolution turns the bindings of a [`ViewSpec`] into typed, scaled encodings: field
//! bindings are looked up, classified, checked against their channel and (for channels with
//! scales) given a synthesized [`Scale`]; constants are parsed into visual values.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use vizlite_data::{DataType, Dataset, QuantitativeKind, Value};

use crate::channel::Channel;
use crate::classify::{check_compatible, classify};
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::layout::Size;
use crate::scale::{Scale, ScaleRequest, synthesize};
use crate::spec::{EncodingBinding, FieldBinding, MarkKind, ViewSpec};
use crate::symbol::Shape;

/// A parsed constant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    /// Pixels (position), square pixels (size), opacity or an order key.
    Number(f64),
    /// A colour.
    Color(Color),
    /// A shape.
    Shape(Shape),
    /// Label or tooltip text.
    Text(String),
}

/// A resolved field binding.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedField {
    /// The binding as written.
    pub binding: FieldBinding,
    /// Column of the bound field in the resolved dataset.
    pub column: usize,
    /// Classified data type.
    pub data_type: DataType,
    /// Quantitative sub-kind declared on the field, if any.
    pub quantitative_kind: Option<QuantitativeKind>,
    /// Scale, for channels that have one.
    pub scale: Option<Scale>,
}

impl ResolvedField {
    /// Channel of the binding.
    pub fn channel(&self) -> Channel {
        self.binding.channel
    }

    /// Reads the bound value of `row`.
    pub fn value<'a>(&self, data: &'a Dataset, row: usize) -> Option<&'a Value> {
        data.value(row, self.column)
    }
}

/// A resolved binding.
#[derive(Clone, Debug, PartialEq)]
#[allow(
    clippy::large_enum_variant,
    reason = "bindings are few per view and field variants dominate"
)]
pub enum ResolvedEncoding {
    /// A field binding.
    Field(ResolvedField),
    /// A constant binding.
    Constant {
        /// Target channel.
        channel: Channel,
        /// Parsed value.
        value: ConstantValue,
    },
}

impl ResolvedEncoding {
    /// Channel of the binding.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Field(f) => f.channel(),
            Self::Constant { channel, .. } => *channel,
        }
    }
}

/// Resolved bindings of a view, in binding order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedEncodings {
    entries: Vec<ResolvedEncoding>,
}

impl ResolvedEncodings {
    /// Returns the binding for `channel` (the first one for tooltips).
    pub fn get(&self, channel: Channel) -> Option<&ResolvedEncoding> {
        self.entries.iter().find(|e| e.channel() == channel)
    }

    /// Returns the field binding for `channel`.
    pub fn field(&self, channel: Channel) -> Option<&ResolvedField> {
        match self.get(channel)? {
            ResolvedEncoding::Field(f) => Some(f),
            ResolvedEncoding::Constant { .. } => None,
        }
    }

    /// Returns the constant for `channel`.
    pub fn constant(&self, channel: Channel) -> Option<&ConstantValue> {
        match self.get(channel)? {
            ResolvedEncoding::Constant { value, .. } => Some(value),
            ResolvedEncoding::Field(_) => None,
        }
    }

    /// Returns the scale of the field bound to `channel`.
    pub fn scale(&self, channel: Channel) -> Option<&Scale> {
        self.field(channel)?.scale.as_ref()
    }

    /// Whether anything is bound to `channel`.
    pub fn has(&self, channel: Channel) -> bool {
        self.get(channel).is_some()
    }

    /// Tooltip bindings in order.
    pub fn tooltips(&self) -> impl Iterator<Item = &ResolvedEncoding> + '_ {
        self.entries
            .iter()
            .filter(|e| e.channel() == Channel::Tooltip)
    }

    /// All bindings in order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedEncoding> + '_ {
        self.entries.iter()
    }

    /// Field bindings in order.
    pub fn fields(&self) -> impl Iterator<Item = &ResolvedField> + '_ {
        self.entries.iter().filter_map(|e| match e {
            ResolvedEncoding::Field(f) => Some(f),
            ResolvedEncoding::Constant { .. } => None,
        })
    }
}

/// Fails on a second binding of any channel but `tooltip`.
pub fn check_duplicates(view: &ViewSpec) -> Result<(), CompileError> {
    let mut seen: Vec<Channel> = Vec::new();
    for b in &view.encodings {
        let channel = b.channel();
        if channel == Channel::Tooltip {
            continue;
        }
        if seen.contains(&channel) {
            return Err(CompileError::DuplicateChannel(channel));
        }
        seen.push(channel);
    }
    Ok(())
}

/// Resolves every binding of `view` against `rows` of `data`.
///
/// `extent` is the pixel size position scales map into.
pub fn resolve(
    view: &ViewSpec,
    data: &Dataset,
    rows: &[usize],
    extent: Size,
    config: &CompileConfig,
) -> Result<ResolvedEncodings, CompileError> {
    check_duplicates(view)?;
    let mut entries = Vec::with_capacity(view.encodings.len());
    for binding in &view.encodings {
        entries.push(match binding {
            EncodingBinding::Constant(c) => ResolvedEncoding::Constant {
                channel: c.channel,
                value: parse_constant(c.channel, &c.value)?,
            },
            EncodingBinding::Field(f) => ResolvedEncoding::Field(resolve_field(
                f,
                view.mark.kind,
                data,
                rows,
                extent,
                config,
            )?),
        });
    }
    Ok(ResolvedEncodings { entries })
}

fn resolve_field(
    binding: &FieldBinding,
    mark: MarkKind,
    data: &Dataset,
    rows: &[usize],
    extent: Size,
    config: &CompileConfig,
) -> Result<ResolvedField, CompileError> {
    let channel = binding.channel;
    let unknown = || CompileError::UnknownField {
        channel,
        field: binding.field.clone(),
    };
    let column = data.column_index(&binding.field).ok_or_else(unknown)?;
    let field = &data.fields[column];
    let values: Vec<&Value> = rows.iter().filter_map(|&r| data.value(r, column)).collect();
    let data_type = classify(field, values.iter().copied(), binding.data_type);
    check_compatible(channel, data_type)?;

    let scale = if channel.has_scale() {
        let request = ScaleRequest {
            channel,
            field: &binding.field,
            data_type,
            quantitative_kind: field.quantitative_kind,
            mark,
            extent,
        };
        Some(synthesize(
            &request,
            &values,
            &binding.scale,
            binding.sort.as_ref(),
            config,
        )?)
    } else {
        None
    };
    Ok(ResolvedField {
        binding: binding.clone(),
        column,
        data_type,
        quantitative_kind: field.quantitative_kind,
        scale,
    })
}

/// Parses a constant for `channel`.
pub fn parse_constant(channel: Channel, value: &Value) -> Result<ConstantValue, CompileError> {
    let invalid = || CompileError::InvalidConstant {
        channel,
        value: alloc::format!("{value}"),
    };
    let number = || value.as_f64().filter(|v| v.is_finite());
    match channel {
        Channel::X | Channel::Y | Channel::Order => {
            number().map(ConstantValue::Number).ok_or_else(invalid)
        }
        Channel::Size => number()
            .filter(|v| *v >= 0.0)
            .map(ConstantValue::Number)
            .ok_or_else(invalid),
        Channel::Opacity => number()
            .filter(|v| (0.0..=1.0).contains(v))
            .map(ConstantValue::Number)
            .ok_or_else(invalid),
        Channel::Color => value
            .as_str()
            .and_then(|s| parse_color(s.trim()).ok())
            .map(|c| ConstantValue::Color(c.to_alpha_color::<Srgb>()))
            .ok_or_else(invalid),
        Channel::Shape => value
            .as_str()
            .and_then(Shape::from_name)
            .map(ConstantValue::Shape)
            .ok_or_else(invalid),
        Channel::Tooltip | Channel::Text => Ok(ConstantValue::Text(alloc::format!("{value}"))),
        // Partitions need a field to group by.
        Channel::Column | Channel::Row => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use serde_json::json;

    use super::*;
    use crate::spec::ScaleConfig;

    fn data() -> Dataset {
        Dataset::from_json_values(
            json!([
                {"a": "x", "n": 1.0},
                {"a": "y", "n": 5.0},
                {"a": "x", "n": 3.0}
            ])
            .as_array()
            .unwrap(),
        )
        .unwrap()
    }

    fn all_rows(data: &Dataset) -> Vec<usize> {
        (0..data.row_count()).collect()
    }

    fn run(view: &ViewSpec) -> Result<ResolvedEncodings, CompileError> {
        let data = data();
        resolve(
            view,
            &data,
            &all_rows(&data),
            Size::new(100.0, 100.0),
            &CompileConfig::default(),
        )
    }

    #[test]
    fn fields_are_classified_and_scaled() {
        let view = ViewSpec::new(MarkKind::Point)
            .with_encoding(EncodingBinding::field(Channel::X, "a"))
            .with_encoding(EncodingBinding::field(Channel::Y, "n"))
            .with_encoding(EncodingBinding::field(Channel::Tooltip, "a"))
            .with_encoding(EncodingBinding::field(Channel::Tooltip, "n"));
        let enc = run(&view).unwrap();
        assert_eq!(enc.field(Channel::X).unwrap().data_type, DataType::Nominal);
        assert_eq!(
            enc.field(Channel::Y).unwrap().data_type,
            DataType::Quantitative
        );
        assert!(enc.scale(Channel::Y).is_some());
        assert_eq!(enc.tooltips().count(), 2);
        assert!(enc.field(Channel::Tooltip).unwrap().scale.is_none());
    }

    #[test]
    fn duplicate_channels_are_rejected() {
        let view = ViewSpec::new(MarkKind::Point)
            .with_encoding(EncodingBinding::field(Channel::X, "a"))
            .with_encoding(EncodingBinding::field(Channel::X, "n"));
        assert_eq!(run(&view), Err(CompileError::DuplicateChannel(Channel::X)));
    }

    #[test]
    fn unknown_fields_name_the_channel() {
        let view = ViewSpec::new(MarkKind::Point)
            .with_encoding(EncodingBinding::field(Channel::Color, "zz"));
        assert_eq!(
            run(&view),
            Err(CompileError::UnknownField {
                channel: Channel::Color,
                field: "zz".into(),
            })
        );
    }

    #[test]
    fn shape_cannot_encode_numbers() {
        let view = ViewSpec::new(MarkKind::Point)
            .with_encoding(EncodingBinding::field(Channel::Shape, "n"));
        assert_eq!(
            run(&view),
            Err(CompileError::IncompatibleType {
                channel: Channel::Shape,
                data_type: DataType::Quantitative,
            })
        );
    }

    #[test]
    fn constants_are_parsed_per_channel() {
        assert_eq!(
            parse_constant(Channel::Color, &Value::from("#ff0000")),
            Ok(ConstantValue::Color(Color::from_rgb8(255, 0, 0)))
        );
        assert_eq!(
            parse_constant(Channel::Shape, &Value::from("diamond")),
            Ok(ConstantValue::Shape(Shape::Diamond))
        );
        assert_eq!(
            parse_constant(Channel::Opacity, &Value::Number(0.5)),
            Ok(ConstantValue::Number(0.5))
        );
        assert!(matches!(
            parse_constant(Channel::Opacity, &Value::Number(2.0)),
            Err(CompileError::InvalidConstant { .. })
        ));
        assert!(matches!(
            parse_constant(Channel::Size, &Value::Number(-1.0)),
            Err(CompileError::InvalidConstant { .. })
        ));
        assert!(matches!(
            parse_constant(Channel::Color, &Value::from("not a colour")),
            Err(CompileError::InvalidConstant { .. })
        ));
    }

    #[test]
    fn declared_binding_type_overrides_inference() {
        let view = ViewSpec::new(MarkKind::Bar).with_encoding(
            FieldBinding::new(Channel::X, "n")
                .with_type(DataType::Ordinal)
                .with_scale(ScaleConfig::default()),
        );
        let enc = run(&view).unwrap();
        let x = enc.field(Channel::X).unwrap();
        assert_eq!(x.data_type, DataType::Ordinal);
        assert_eq!(
            x.scale.as_ref().unwrap().domain,
            crate::scale::ScaleDomain::Discrete(vec![
                Value::Number(1.0),
                Value::Number(3.0),
                Value::Number(5.0),
            ])
        );
    }
}
