// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The JSON chart grammar.
//!
//! ```json
//! {
//!   "data": {"values": [{"a": "A", "b": 28}]},
//!   "mark": "bar",
//!   "encodings": [
//!     {"channel": "x", "field": "a", "type": "nominal"},
//!     {"channel": "y", "field": "b", "aggregate": "sum"}
//!   ]
//! }
//! ```
//!
//! `encoding` may also be given as an object keyed by channel (tooltip takes an array).
//! `legend: null` hides a legend. Facet definitions lower to `column`/`row` bindings.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use vizlite_data::{
    AggregateOp, CompareOp, DataType, Dataset, DatasetError, Operand, Predicate, Value,
};

use crate::channel::Channel;
use crate::layout::LegendOrient;
use crate::legend::TitleOrient;
use crate::params::{ParamBind, ParamSpec};
use crate::spec::{
    ChartSpec, ConstantBinding, DomainOverride, EncodingBinding, FacetConfig, FieldBinding,
    LegendConfig, LegendSetting, MarkKind, MarkSpec, RangeOverride, ScaleConfig, ScaleKind,
    SortSpec, ViewSpec,
};
use crate::symbol::Shape;

/// Errors raised while reading a JSON chart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("invalid chart JSON: {0}")]
    Json(String),
    /// An unknown mark kind.
    #[error("unknown mark `{0}`")]
    UnknownMark(String),
    /// An unknown channel name.
    #[error("unknown channel `{0}`")]
    UnknownChannel(String),
    /// An unknown data type name.
    #[error("unknown data type `{0}`")]
    UnknownType(String),
    /// An unknown aggregate operation.
    #[error("unknown aggregate `{0}`")]
    UnknownAggregate(String),
    /// A binding with neither `field` nor `value`.
    #[error("binding for `{0}` needs a field or a value")]
    EmptyBinding(String),
    /// A malformed scale, sort or legend definition.
    #[error("invalid `{what}` definition: {reason}")]
    Invalid {
        /// Which definition.
        what: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Inline data could not be read.
    #[error(transparent)]
    Data(#[from] DatasetError),
}

impl From<serde_json::Error> for SpecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

fn invalid(what: &'static str, reason: impl Into<String>) -> SpecError {
    SpecError::Invalid {
        what,
        reason: reason.into(),
    }
}

/// A chart spec plus its inline data.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartDocument {
    /// The chart.
    pub spec: ChartSpec,
    /// Inline `data.values` (empty when absent).
    pub data: Dataset,
}

impl ChartDocument {
    /// Parses a JSON chart document.
    pub fn from_json_str(s: &str) -> Result<Self, SpecError> {
        let raw: RawChart = serde_json::from_str(s)?;
        raw.lower()
    }

    /// Reads a parsed JSON chart document.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, SpecError> {
        let raw: RawChart = serde_json::from_value(value)?;
        raw.lower()
    }
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChart {
    #[serde(default)]
    data: Option<RawData>,
    mark: RawMark,
    #[serde(default)]
    encodings: Vec<RawEncoding>,
    #[serde(default)]
    encoding: Option<serde_json::Map<String, serde_json::Value>>,
    width: Option<f64>,
    height: Option<f64>,
    #[serde(default)]
    facet: Option<RawFacet>,
    #[serde(default)]
    params: Vec<RawParam>,
    #[serde(default)]
    transform: Vec<RawTransform>,
}

#[derive(Deserialize)]
struct RawData {
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMark {
    Name(String),
    Def {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        filled: Option<bool>,
    },
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawEncoding {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    data_type: Option<String>,
    #[serde(default)]
    aggregate: Option<String>,
    #[serde(default)]
    sort: Option<serde_json::Value>,
    #[serde(default)]
    scale: Option<RawScale>,
    #[serde(default, deserialize_with = "present")]
    legend: Option<Option<RawLegend>>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawScale {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    domain: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    range: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    zero: Option<bool>,
    #[serde(default)]
    nice: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawLegend {
    #[serde(default)]
    orient: Option<String>,
    #[serde(default)]
    title_orient: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawFacet {
    #[serde(default)]
    column: Option<RawEncoding>,
    #[serde(default)]
    row: Option<RawEncoding>,
    #[serde(default)]
    independent_scales: bool,
    #[serde(default)]
    cell_width: Option<f64>,
    #[serde(default)]
    cell_height: Option<f64>,
}

#[derive(Deserialize)]
struct RawParam {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    bind: Option<RawBind>,
}

#[derive(Deserialize)]
struct RawBind {
    input: String,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    step: Option<f64>,
    #[serde(default)]
    options: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawTransform {
    filter: serde_json::Value,
}

impl RawChart {
    fn lower(self) -> Result<ChartDocument, SpecError> {
        let data = match self.data {
            Some(d) => Dataset::from_json_values(&d.values)?,
            None => Dataset::default(),
        };

        let mark = match self.mark {
            RawMark::Name(name) => MarkSpec::new(mark_kind(&name)?),
            RawMark::Def { kind, filled } => {
                let mut m = MarkSpec::new(mark_kind(&kind)?);
                m.filled = filled;
                m
            }
        };

        let mut view = ViewSpec::new(mark);
        view.width = self.width;
        view.height = self.height;
        for raw in self.encodings {
            let channel = raw
                .channel
                .clone()
                .ok_or_else(|| invalid("encoding", "missing `channel`"))?;
            view.encodings.push(raw.lower(&channel)?);
        }
        if let Some(map) = self.encoding {
            for (channel, def) in map {
                // Tooltips may list several definitions.
                let defs = match def {
                    serde_json::Value::Array(items) => items,
                    other => alloc::vec![other],
                };
                for def in defs {
                    let raw: RawEncoding = serde_json::from_value(def)?;
                    view.encodings.push(raw.lower(&channel)?);
                }
            }
        }

        let mut facet = FacetConfig::default();
        if let Some(f) = self.facet {
            if let Some(column) = f.column {
                view.encodings.push(column.lower("column")?);
            }
            if let Some(row) = f.row {
                view.encodings.push(row.lower("row")?);
            }
            facet.independent_scales = f.independent_scales;
            facet.cell_width = f.cell_width;
            facet.cell_height = f.cell_height;
        }

        let mut spec = ChartSpec::new(view).with_facet(facet);
        for p in self.params {
            spec.params.push(p.lower()?);
        }
        for t in self.transform {
            spec.filters.push(predicate(&t.filter)?);
        }
        Ok(ChartDocument { spec, data })
    }
}

fn mark_kind(name: &str) -> Result<MarkKind, SpecError> {
    MarkKind::from_name(name).ok_or_else(|| SpecError::UnknownMark(name.to_string()))
}

impl RawEncoding {
    fn lower(self, channel_name: &str) -> Result<EncodingBinding, SpecError> {
        let channel = Channel::from_name(channel_name)
            .ok_or_else(|| SpecError::UnknownChannel(channel_name.to_string()))?;
        let aggregate = self
            .aggregate
            .as_deref()
            .map(|a| AggregateOp::from_name(a).ok_or_else(|| SpecError::UnknownAggregate(a.into())))
            .transpose()?;

        let field = match (self.field, aggregate) {
            (Some(f), _) => f,
            // Counting needs no input field.
            (None, Some(AggregateOp::Count)) => "*".into(),
            (None, _) => {
                return match self.value {
                    Some(v) => Ok(EncodingBinding::Constant(ConstantBinding {
                        channel,
                        value: Value::from(&v),
                    })),
                    None => Err(SpecError::EmptyBinding(channel_name.to_string())),
                };
            }
        };

        let mut binding = FieldBinding::new(channel, field);
        binding.aggregate = aggregate;
        binding.title = self.title;
        if let Some(t) = self.data_type {
            binding.data_type = Some(
                DataType::from_name(&t.to_ascii_lowercase()).ok_or(SpecError::UnknownType(t))?,
            );
        }
        if let Some(sort) = &self.sort {
            binding.sort = sort_spec(sort)?;
        }
        if let Some(scale) = self.scale {
            binding.scale = scale.lower()?;
        }
        binding.legend = match self.legend {
            None => LegendSetting::Auto,
            Some(None) => LegendSetting::Hidden,
            Some(Some(l)) => LegendSetting::Custom(l.lower()?),
        };
        Ok(EncodingBinding::Field(binding))
    }
}

fn sort_spec(sort: &serde_json::Value) -> Result<Option<SortSpec>, SpecError> {
    match sort {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => match s.as_str() {
            "ascending" => Ok(Some(SortSpec::Ascending)),
            "descending" => Ok(Some(SortSpec::Descending)),
            other => Err(invalid("sort", alloc::format!("unknown order `{other}`"))),
        },
        serde_json::Value::Array(values) => Ok(Some(SortSpec::Explicit(
            values.iter().map(Value::from).collect(),
        ))),
        _ => Err(invalid("sort", "expected a string or an array")),
    }
}

impl RawScale {
    fn lower(self) -> Result<ScaleConfig, SpecError> {
        let mut out = ScaleConfig {
            zero: self.zero,
            nice: self.nice,
            ..ScaleConfig::default()
        };
        if let Some(kind) = &self.kind {
            out.kind = Some(
                ScaleKind::from_name(kind)
                    .ok_or_else(|| invalid("scale", alloc::format!("unknown type `{kind}`")))?,
            );
        }
        if let Some(domain) = &self.domain {
            out.domain = Some(DomainOverride::Values(domain.iter().map(Value::from).collect()));
        }
        if let Some(range) = &self.range {
            out.range = Some(range_override(range)?);
        }
        Ok(out)
    }
}

fn range_override(range: &[serde_json::Value]) -> Result<RangeOverride, SpecError> {
    if let Some(numbers) = range
        .iter()
        .map(serde_json::Value::as_f64)
        .collect::<Option<Vec<f64>>>()
    {
        return Ok(RangeOverride::Numbers(numbers));
    }
    let names: Vec<&str> = range
        .iter()
        .map(serde_json::Value::as_str)
        .collect::<Option<_>>()
        .ok_or_else(|| invalid("scale", "range mixes numbers and strings"))?;
    if let Some(shapes) = names.iter().map(|n| Shape::from_name(n)).collect::<Option<Vec<_>>>() {
        return Ok(RangeOverride::Shapes(shapes));
    }
    let colors = names
        .iter()
        .map(|n| parse_color(n).ok().map(|c| c.to_alpha_color::<Srgb>()))
        .collect::<Option<Vec<Color>>>()
        .ok_or_else(|| invalid("scale", "range entries are neither colours nor shapes"))?;
    Ok(RangeOverride::Colors(colors))
}

impl RawLegend {
    fn lower(self) -> Result<LegendConfig, SpecError> {
        let orient = self
            .orient
            .map(|o| {
                LegendOrient::from_name(&o)
                    .ok_or_else(|| invalid("legend", alloc::format!("unknown orient `{o}`")))
            })
            .transpose()?;
        let title_orient = self
            .title_orient
            .map(|o| {
                TitleOrient::from_name(&o)
                    .ok_or_else(|| invalid("legend", alloc::format!("unknown titleOrient `{o}`")))
            })
            .transpose()?;
        Ok(LegendConfig {
            orient,
            title_orient,
            title: self.title,
        })
    }
}

impl RawParam {
    fn lower(self) -> Result<ParamSpec, SpecError> {
        let mut spec = ParamSpec::new(self.name, Value::from(&self.value));
        if let Some(bind) = self.bind {
            spec.bind = Some(match bind.input.as_str() {
                "range" | "slider" => {
                    let (Some(min), Some(max)) = (bind.min, bind.max) else {
                        return Err(invalid("bind", "a range needs `min` and `max`"));
                    };
                    ParamBind::Slider {
                        min,
                        max,
                        step: bind.step,
                    }
                }
                "select" | "radio" => ParamBind::Select {
                    options: bind.options.iter().map(Value::from).collect(),
                },
                "checkbox" => ParamBind::Checkbox,
                other => return Err(invalid("bind", alloc::format!("unknown input `{other}`"))),
            });
        }
        Ok(spec)
    }
}

/// Reads an operand: a literal, or `{"param": name}`.
fn operand(v: &serde_json::Value) -> Operand {
    match v.get("param").and_then(serde_json::Value::as_str) {
        Some(name) => Operand::Param(name.to_string()),
        None => Operand::Value(Value::from(v)),
    }
}

/// Parses a filter predicate.
///
/// Field predicates take the form `{"field": f, "<op>": operand}` with `<op>` one of `equal`,
/// `lt`, `lte`, `gt`, `gte`, `ne`, `oneOf` or `range`. `and`, `or` and `not` combine
/// predicates.
pub fn predicate(v: &serde_json::Value) -> Result<Predicate, SpecError> {
    let obj = v
        .as_object()
        .ok_or_else(|| invalid("filter", "expected an object"))?;
    if let Some(all) = obj.get("and") {
        return Ok(Predicate::And(predicate_list(all)?));
    }
    if let Some(any) = obj.get("or") {
        // a or b == not (not a and not b)
        let negated = predicate_list(any)?
            .into_iter()
            .map(|p| Predicate::Not(Box::new(p)))
            .collect();
        return Ok(Predicate::Not(Box::new(Predicate::And(negated))));
    }
    if let Some(inner) = obj.get("not") {
        return Ok(Predicate::Not(Box::new(predicate(inner)?)));
    }

    let field = obj
        .get("field")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| invalid("filter", "missing `field`"))?
        .to_string();
    if let Some(values) = obj.get("oneOf") {
        let values = values
            .as_array()
            .ok_or_else(|| invalid("filter", "`oneOf` expects an array"))?;
        return Ok(Predicate::OneOf {
            field,
            values: values.iter().map(operand).collect(),
        });
    }
    if let Some(range) = obj.get("range") {
        let [min, max] = range.as_array().map(Vec::as_slice).unwrap_or_default() else {
            return Err(invalid("filter", "`range` expects two bounds"));
        };
        return Ok(Predicate::Range {
            field,
            min: operand(min),
            max: operand(max),
        });
    }
    for (key, rhs) in obj {
        if key == "field" {
            continue;
        }
        if let Some(op) = CompareOp::from_token(key) {
            return Ok(Predicate::Compare {
                field,
                op,
                rhs: operand(rhs),
            });
        }
    }
    Err(invalid("filter", alloc::format!("no operator for field `{field}`")))
}

fn predicate_list(v: &serde_json::Value) -> Result<Vec<Predicate>, SpecError> {
    v.as_array()
        .ok_or_else(|| invalid("filter", "expected an array of predicates"))?
        .iter()
        .map(predicate)
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use serde_json::json;

    use super::*;

    #[test]
    fn parses_a_full_document() {
        let doc = ChartDocument::from_json_str(
            r#"{
                "data": {"values": [{"a": "A", "b": 28, "c": "x"}, {"a": "B", "b": 55, "c": "y"}]},
                "mark": {"type": "bar", "filled": false},
                "encodings": [
                    {"channel": "x", "field": "a", "type": "O", "sort": ["B", "A"]},
                    {"channel": "y", "field": "b", "aggregate": "sum", "title": "Total"},
                    {"channel": "color", "field": "c", "legend": null},
                    {"channel": "shape", "field": "c", "legend": {"orient": "bottom", "titleOrient": "left"}},
                    {"channel": "opacity", "value": 0.5},
                    {"channel": "size", "field": "b", "scale": {"type": "sqrt", "range": [0, 400], "zero": false}}
                ],
                "width": 300,
                "facet": {"row": {"field": "c"}, "independentScales": true},
                "params": [{"name": "lo", "value": 10, "bind": {"input": "range", "min": 0, "max": 100}}],
                "transform": [{"filter": {"field": "b", "gte": {"param": "lo"}}}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.data.row_count(), 2);
        let view = &doc.spec.view;
        assert_eq!(view.mark, MarkSpec::new(MarkKind::Bar).with_filled(false));
        assert_eq!(view.width, Some(300.0));
        assert_eq!(view.encodings.len(), 7);

        let x = view.binding(Channel::X).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(x.data_type, Some(DataType::Ordinal));
        assert_eq!(
            x.sort,
            Some(SortSpec::Explicit(vec![Value::from("B"), Value::from("A")]))
        );
        let y = view.binding(Channel::Y).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(y.aggregate, Some(AggregateOp::Sum));
        assert_eq!(y.title.as_deref(), Some("Total"));
        let color = view.binding(Channel::Color).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(color.legend, LegendSetting::Hidden);
        let shape = view.binding(Channel::Shape).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(
            shape.legend,
            LegendSetting::Custom(LegendConfig {
                orient: Some(LegendOrient::Bottom),
                title_orient: Some(TitleOrient::Left),
                title: None,
            })
        );
        let size = view.binding(Channel::Size).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(size.scale.kind, Some(ScaleKind::Sqrt));
        assert_eq!(size.scale.range, Some(RangeOverride::Numbers(vec![0.0, 400.0])));
        assert_eq!(size.scale.zero, Some(false));
        assert!(matches!(
            view.binding(Channel::Opacity),
            Some(EncodingBinding::Constant(_))
        ));
        assert!(view.is_faceted());
        assert!(doc.spec.facet.independent_scales);
        assert_eq!(
            doc.spec.params[0].bind,
            Some(ParamBind::Slider {
                min: 0.0,
                max: 100.0,
                step: None,
            })
        );
        assert_eq!(
            doc.spec.filters,
            vec![Predicate::compare("b", CompareOp::Ge, Operand::Param("lo".into()))]
        );
    }

    #[test]
    fn encoding_object_form() {
        let doc = ChartDocument::from_json_value(json!({
            "mark": "point",
            "encoding": {
                "x": {"field": "a"},
                "tooltip": [{"field": "a"}, {"field": "b"}],
                "y": {"aggregate": "count"}
            }
        }))
        .unwrap();
        let view = &doc.spec.view;
        assert_eq!(view.encodings.len(), 4);
        let y = view.binding(Channel::Y).and_then(EncodingBinding::as_field).unwrap();
        assert_eq!(y.aggregate, Some(AggregateOp::Count));
        assert!(doc.data.is_empty());
    }

    #[test]
    fn colour_and_shape_ranges() {
        assert_eq!(
            range_override(&[json!("circle"), json!("square")]),
            Ok(RangeOverride::Shapes(vec![Shape::Circle, Shape::Square]))
        );
        assert!(matches!(
            range_override(&[json!("#ff0000"), json!("steelblue")]),
            Ok(RangeOverride::Colors(c)) if c.len() == 2
        ));
        assert!(range_override(&[json!("nope")]).is_err());
        assert!(range_override(&[json!(1), json!("red")]).is_err());
    }

    #[test]
    fn predicates() {
        let p = predicate(&json!({"or": [
            {"field": "a", "equal": "x"},
            {"not": {"field": "b", "range": [1, {"param": "hi"}]}},
            {"field": "c", "oneOf": [1, 2]}
        ]}))
        .unwrap();
        assert_eq!(p.params(), vec!["hi"]);
        assert!(predicate(&json!({"field": "a"})).is_err());
        assert!(predicate(&json!({"field": "a", "range": [1]})).is_err());
    }

    #[test]
    fn errors_name_the_problem() {
        assert_eq!(
            ChartDocument::from_json_value(json!({"mark": "pie"})),
            Err(SpecError::UnknownMark("pie".into()))
        );
        let fill = json!({"mark": "bar", "encodings": [{"channel": "fill", "field": "a"}]});
        assert_eq!(
            ChartDocument::from_json_value(fill),
            Err(SpecError::UnknownChannel("fill".into()))
        );
        assert_eq!(
            ChartDocument::from_json_value(json!({"mark": "bar", "encodings": [{"channel": "x"}]})),
            Err(SpecError::EmptyBinding("x".into()))
        );
        assert!(matches!(ChartDocument::from_json_str("{"), Err(SpecError::Json(_))));
    }
}
