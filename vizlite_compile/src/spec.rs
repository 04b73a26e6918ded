// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative chart specifications.
//!
//! A [`ChartSpec`] says *what* to show: a mark, channel bindings, optional faceting, filters
//! and interactive parameters. The compiler turns it (plus a dataset) into a
//! [`SceneDescriptor`](crate::SceneDescriptor).

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use peniko::Color;
use vizlite_data::{AggregateOp, DataType, Predicate, Value};

use crate::channel::Channel;
use crate::layout::LegendOrient;
use crate::legend::TitleOrient;
use crate::params::ParamSpec;
use crate::symbol::Shape;

/// Graphical mark kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// Filled region between a line and a baseline.
    Area,
    /// Rectangle from a baseline to a value.
    Bar,
    /// Circle symbol.
    Circle,
    /// Polyline through a series.
    Line,
    /// Symbol whose shape can be encoded.
    Point,
    /// Rectangle spanning bands or cells.
    Rect,
    /// Line segment.
    Rule,
    /// Square symbol.
    Square,
    /// Text label.
    Text,
    /// Short line segment across a position.
    Tick,
}

impl MarkKind {
    /// All mark kinds.
    pub const ALL: [Self; 10] = [
        Self::Area,
        Self::Bar,
        Self::Circle,
        Self::Line,
        Self::Point,
        Self::Rect,
        Self::Rule,
        Self::Square,
        Self::Text,
        Self::Tick,
    ];

    /// Returns the lowercase mark name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Bar => "bar",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Point => "point",
            Self::Rect => "rect",
            Self::Rule => "rule",
            Self::Square => "square",
            Self::Text => "text",
            Self::Tick => "tick",
        }
    }

    /// Parses a mark name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Whether marks of this kind are filled unless told otherwise.
    pub fn filled_by_default(self) -> bool {
        match self {
            Self::Area | Self::Bar | Self::Circle | Self::Rect | Self::Square | Self::Text => true,
            Self::Line | Self::Point | Self::Rule | Self::Tick => false,
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mark plus its options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkSpec {
    /// Mark kind.
    pub kind: MarkKind,
    /// Fill override; see [`MarkKind::filled_by_default`].
    pub filled: Option<bool>,
}

impl MarkSpec {
    /// Creates a mark spec with default options.
    pub fn new(kind: MarkKind) -> Self {
        Self { kind, filled: None }
    }

    /// Overrides whether the mark is filled.
    pub fn with_filled(mut self, filled: bool) -> Self {
        self.filled = Some(filled);
        self
    }

    /// Resolved `filled` flag.
    pub fn is_filled(&self) -> bool {
        self.filled.unwrap_or_else(|| self.kind.filled_by_default())
    }
}

impl From<MarkKind> for MarkSpec {
    fn from(kind: MarkKind) -> Self {
        Self::new(kind)
    }
}

/// Scale kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    /// Continuous linear mapping.
    Linear,
    /// Continuous sign-preserving square-root mapping.
    Sqrt,
    /// Continuous mapping over epoch milliseconds.
    Time,
    /// Discrete domain onto evenly spaced bands of a pixel range.
    Band,
    /// Discrete domain onto a discrete range (palettes, steps).
    Ordinal,
}

impl ScaleKind {
    /// Returns the lowercase kind name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sqrt => "sqrt",
            Self::Time => "time",
            Self::Band => "band",
            Self::Ordinal => "ordinal",
        }
    }

    /// Parses a kind name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "sqrt" => Some(Self::Sqrt),
            "time" | "utc" => Some(Self::Time),
            "band" => Some(Self::Band),
            "ordinal" => Some(Self::Ordinal),
            _ => None,
        }
    }

    /// Whether the domain is an interval.
    pub fn is_continuous(self) -> bool {
        matches!(self, Self::Linear | Self::Sqrt | Self::Time)
    }
}

/// An explicit scale domain.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainOverride {
    /// `[min, max]` of a continuous scale.
    Interval(Value, Value),
    /// Discrete domain values, in order. Two values also read as an interval.
    Values(Vec<Value>),
}

/// An explicit scale range.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeOverride {
    /// Numeric `[min, max]`.
    Interval(f64, f64),
    /// Numeric steps for discrete scales.
    Numbers(Vec<f64>),
    /// A palette (discrete) or gradient stops (continuous).
    Colors(Vec<Color>),
    /// A shape palette.
    Shapes(Vec<Shape>),
}

/// Scale overrides; each present field replaces the synthesized default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleConfig {
    /// Scale kind.
    pub kind: Option<ScaleKind>,
    /// Domain.
    pub domain: Option<DomainOverride>,
    /// Range.
    pub range: Option<RangeOverride>,
    /// Whether to include zero in a continuous domain.
    pub zero: Option<bool>,
    /// Whether to extend a continuous domain to nice round values.
    pub nice: Option<bool>,
}

impl ScaleConfig {
    /// Sets the kind.
    pub fn with_kind(mut self, kind: ScaleKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the domain.
    pub fn with_domain(mut self, domain: DomainOverride) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets the range.
    pub fn with_range(mut self, range: RangeOverride) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets the zero flag.
    pub fn with_zero(mut self, zero: bool) -> Self {
        self.zero = Some(zero);
        self
    }

    /// Sets the nice flag.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = Some(nice);
        self
    }
}

/// Sort order of a discrete domain, facet or draw order.
#[derive(Clone, Debug, PartialEq)]
pub enum SortSpec {
    /// Natural ascending order.
    Ascending,
    /// Natural descending order.
    Descending,
    /// Listed values first, in the given order; other values follow in discovery order.
    Explicit(Vec<Value>),
}

/// Per-binding legend overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegendConfig {
    /// Legend orientation.
    pub orient: Option<LegendOrient>,
    /// Title orientation.
    pub title_orient: Option<TitleOrient>,
    /// Title text.
    pub title: Option<String>,
}

/// Legend behaviour of a binding.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LegendSetting {
    /// Generate a legend with defaults.
    #[default]
    Auto,
    /// Never generate a legend.
    Hidden,
    /// Generate a legend with overrides.
    Custom(LegendConfig),
}

/// A channel bound to a dataset field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBinding {
    /// Target channel.
    pub channel: Channel,
    /// Field name (the aggregate output name once aggregation has run).
    pub field: String,
    /// Declared type; wins over the field schema and inference.
    pub data_type: Option<DataType>,
    /// Aggregation applied before encoding.
    pub aggregate: Option<AggregateOp>,
    /// Scale overrides.
    pub scale: ScaleConfig,
    /// Sort order.
    pub sort: Option<SortSpec>,
    /// Legend behaviour.
    pub legend: LegendSetting,
    /// Axis/legend title.
    pub title: Option<String>,
}

impl FieldBinding {
    /// Binds `field` to `channel` with defaults.
    pub fn new(channel: Channel, field: impl Into<String>) -> Self {
        Self {
            channel,
            field: field.into(),
            data_type: None,
            aggregate: None,
            scale: ScaleConfig::default(),
            sort: None,
            legend: LegendSetting::Auto,
            title: None,
        }
    }

    /// Declares the field type.
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Aggregates the field.
    pub fn with_aggregate(mut self, op: AggregateOp) -> Self {
        self.aggregate = Some(op);
        self
    }

    /// Sets scale overrides.
    pub fn with_scale(mut self, scale: ScaleConfig) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets legend behaviour.
    pub fn with_legend(mut self, legend: LegendSetting) -> Self {
        self.legend = legend;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A channel bound to a fixed value.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantBinding {
    /// Target channel.
    pub channel: Channel,
    /// The value: a number for positions, size, opacity and order; a colour string for
    /// colour; a shape name for shape; anything for text and tooltip.
    pub value: Value,
}

/// A channel binding.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodingBinding {
    /// Data-driven.
    Field(FieldBinding),
    /// Fixed.
    Constant(ConstantBinding),
}

impl EncodingBinding {
    /// Binds `field` to `channel`.
    pub fn field(channel: Channel, field: impl Into<String>) -> Self {
        Self::Field(FieldBinding::new(channel, field))
    }

    /// Binds a constant to `channel`.
    pub fn constant(channel: Channel, value: impl Into<Value>) -> Self {
        Self::Constant(ConstantBinding {
            channel,
            value: value.into(),
        })
    }

    /// The bound channel.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Field(b) => b.channel,
            Self::Constant(b) => b.channel,
        }
    }

    /// The field binding, if data-driven.
    pub fn as_field(&self) -> Option<&FieldBinding> {
        match self {
            Self::Field(b) => Some(b),
            Self::Constant(_) => None,
        }
    }
}

impl From<FieldBinding> for EncodingBinding {
    fn from(b: FieldBinding) -> Self {
        Self::Field(b)
    }
}

impl From<ConstantBinding> for EncodingBinding {
    fn from(b: ConstantBinding) -> Self {
        Self::Constant(b)
    }
}

/// A single view: one mark with its bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSpec {
    /// The mark.
    pub mark: MarkSpec,
    /// Channel bindings, in authoring order.
    pub encodings: Vec<EncodingBinding>,
    /// View width; the config default applies when absent.
    pub width: Option<f64>,
    /// View height; the config default applies when absent.
    pub height: Option<f64>,
}

impl ViewSpec {
    /// Creates a view with no bindings.
    pub fn new(mark: impl Into<MarkSpec>) -> Self {
        Self {
            mark: mark.into(),
            encodings: Vec::new(),
            width: None,
            height: None,
        }
    }

    /// Adds a binding.
    pub fn with_encoding(mut self, binding: impl Into<EncodingBinding>) -> Self {
        self.encodings.push(binding.into());
        self
    }

    /// Sets the view size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Returns the first binding on `channel`.
    pub fn binding(&self, channel: Channel) -> Option<&EncodingBinding> {
        self.encodings.iter().find(|b| b.channel() == channel)
    }

    /// Whether the view has `column` or `row` bindings.
    pub fn is_faceted(&self) -> bool {
        self.encodings
            .iter()
            .any(|b| matches!(b.channel(), Channel::Column | Channel::Row))
    }
}

/// Facet options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FacetConfig {
    /// Resolve scales per cell instead of once for the whole dataset.
    pub independent_scales: bool,
    /// Explicit cell width.
    pub cell_width: Option<f64>,
    /// Explicit cell height.
    pub cell_height: Option<f64>,
}

/// A complete chart: a view plus faceting, filters and parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// The view.
    pub view: ViewSpec,
    /// Facet options (used when the view has `column`/`row` bindings).
    pub facet: FacetConfig,
    /// Interactive parameters.
    pub params: Vec<ParamSpec>,
    /// Row filters, applied in order before aggregation.
    pub filters: Vec<Predicate>,
}

impl ChartSpec {
    /// Creates a chart from a view.
    pub fn new(view: ViewSpec) -> Self {
        Self {
            view,
            facet: FacetConfig::default(),
            params: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Sets facet options.
    pub fn with_facet(mut self, facet: FacetConfig) -> Self {
        self.facet = facet;
        self
    }

    /// Adds a parameter.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Adds a filter.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filters.push(filter);
        self
    }
}
