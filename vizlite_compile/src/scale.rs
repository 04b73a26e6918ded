// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale synthesis.
//!
//! A [`Scale`] maps data values to visual values: pixels, areas, opacities, colours or shapes.
//! [`synthesize`] picks the scale kind, domain and range from the bound field's data type and
//! the channel, then applies any explicit overrides.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use peniko::Color;
use vizlite_data::{DataType, QuantitativeKind, Value, ValueKey};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::channel::{Channel, ChannelRole};
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::format::format_tick_with_step;
use crate::layout::Size;
use crate::palette;
use crate::spec::{DomainOverride, MarkKind, RangeOverride, ScaleConfig, ScaleKind, SortSpec};
use crate::symbol::Shape;
use crate::time;

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    ///
    /// A degenerate domain maps everything to the middle of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return 0.5 * (r0 + r1);
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }
}

/// A discrete band scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the start of the band at `index`.
    ///
    /// Bands run from the lower end of the range, so on a `[height, 0]` range the first band
    /// is at the top.
    pub fn start(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let start = if r1 >= r0 { r0 } else { r1 };
        start + bw * self.padding_outer + step * index as f64
    }
}

/// Domain of a synthesized scale.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleDomain {
    /// `[min, max]` in data units (epoch milliseconds for time).
    Continuous(f64, f64),
    /// Distinct values, in order.
    Discrete(Vec<Value>),
}

/// Range of a synthesized scale.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleRange {
    /// Numeric `[start, end]`.
    Interval(f64, f64),
    /// Numeric steps, cycled by domain index.
    Numbers(Vec<f64>),
    /// Palette, cycled by domain index.
    Colors(Vec<Color>),
    /// Gradient stops, interpolated.
    Gradient(Vec<Color>),
    /// Shape palette, cycled by domain index.
    Shapes(Vec<Shape>),
}

/// Output of [`Scale::map`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleValue {
    /// Pixels, square pixels or opacity.
    Number(f64),
    /// A colour.
    Color(Color),
    /// A shape.
    Shape(Shape),
}

impl ScaleValue {
    /// The number, if this is one.
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The colour, if this is one.
    pub fn as_color(self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }

    /// The shape, if this is one.
    pub fn as_shape(self) -> Option<Shape> {
        match self {
            Self::Shape(s) => Some(s),
            _ => None,
        }
    }
}

/// A tick: a domain value and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTick {
    /// Tick value.
    pub value: Value,
    /// Formatted label.
    pub label: String,
}

/// What a scale is being synthesized for.
#[derive(Clone, Copy, Debug)]
pub struct ScaleRequest<'a> {
    /// Target channel.
    pub channel: Channel,
    /// Bound field name.
    pub field: &'a str,
    /// Resolved data type.
    pub data_type: DataType,
    /// Quantitative sub-kind, if known.
    pub quantitative_kind: Option<QuantitativeKind>,
    /// The mark being drawn.
    pub mark: MarkKind,
    /// Pixel extent of the view (or facet cell).
    pub extent: Size,
}

/// A synthesized scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    /// Channel the scale feeds.
    pub channel: Channel,
    /// Data type of the bound field.
    pub data_type: DataType,
    /// Scale kind.
    pub kind: ScaleKind,
    /// Domain.
    pub domain: ScaleDomain,
    /// Range.
    pub range: ScaleRange,
    /// Whether zero was forced into the domain.
    pub zero: bool,
    /// Whether the domain was extended to nice values.
    pub nice: bool,
    /// Inner band padding (band scales).
    pub padding_inner: f64,
    /// Outer band padding (band scales).
    pub padding_outer: f64,
    index: HashMap<ValueKey, usize>,
}

impl Scale {
    fn new(
        channel: Channel,
        data_type: DataType,
        kind: ScaleKind,
        domain: ScaleDomain,
        range: ScaleRange,
    ) -> Self {
        let mut index = HashMap::new();
        if let ScaleDomain::Discrete(values) = &domain {
            for (i, v) in values.iter().enumerate() {
                index.entry(v.key()).or_insert(i);
            }
        }
        Self {
            channel,
            data_type,
            kind,
            domain,
            range,
            zero: false,
            nice: false,
            padding_inner: 0.0,
            padding_outer: 0.0,
            index,
        }
    }

    /// Whether the domain is an interval.
    pub fn is_continuous(&self) -> bool {
        matches!(self.domain, ScaleDomain::Continuous(..))
    }

    /// Returns `[min, max]` of a continuous domain.
    pub fn continuous_domain(&self) -> Option<(f64, f64)> {
        match self.domain {
            ScaleDomain::Continuous(a, b) => Some((a, b)),
            ScaleDomain::Discrete(_) => None,
        }
    }

    /// Returns the domain index of a discrete value.
    pub fn domain_index(&self, value: &Value) -> Option<usize> {
        self.index.get(&value.key()).copied()
    }

    /// Reads `value` on this scale's continuous axis (epoch milliseconds for temporal data).
    pub fn read(&self, value: &Value) -> Option<f64> {
        read_number(self.data_type, self.kind, value)
    }

    /// Maps a data value, or `None` if the value is missing or outside a discrete domain.
    pub fn map(&self, value: &Value) -> Option<ScaleValue> {
        match &self.domain {
            ScaleDomain::Continuous(d0, d1) => {
                let x = self.read(value)?;
                self.map_continuous(x, (*d0, *d1))
            }
            ScaleDomain::Discrete(values) => {
                let i = self.domain_index(value)?;
                self.map_index(i, values.len())
            }
        }
    }

    /// Maps a data value to a number (pixels, area, opacity).
    pub fn map_number(&self, value: &Value) -> Option<f64> {
        self.map(value)?.as_number()
    }

    /// Maps a number already in domain units (e.g. a baseline of zero).
    pub fn map_raw(&self, x: f64) -> Option<f64> {
        let (d0, d1) = self.continuous_domain()?;
        self.map_continuous(x, (d0, d1))?.as_number()
    }

    fn map_continuous(&self, x: f64, (d0, d1): (f64, f64)) -> Option<ScaleValue> {
        if !x.is_finite() {
            return None;
        }
        let (x, d0, d1) = if self.kind == ScaleKind::Sqrt {
            (signed_sqrt(x), signed_sqrt(d0), signed_sqrt(d1))
        } else {
            (x, d0, d1)
        };
        match &self.range {
            ScaleRange::Interval(r0, r1) => Some(ScaleValue::Number(
                ScaleLinear::new((d0, d1), (*r0, *r1)).map(x),
            )),
            ScaleRange::Gradient(stops) => {
                let t = ScaleLinear::new((d0, d1), (0.0, 1.0)).map(x);
                palette::interpolate(stops, t).map(ScaleValue::Color)
            }
            ScaleRange::Numbers(_) | ScaleRange::Colors(_) | ScaleRange::Shapes(_) => None,
        }
    }

    fn map_index(&self, i: usize, n: usize) -> Option<ScaleValue> {
        match &self.range {
            ScaleRange::Interval(r0, r1) => {
                if self.kind == ScaleKind::Band {
                    let band = self.band_scale(n, (*r0, *r1));
                    Some(ScaleValue::Number(band.start(i) + 0.5 * band.band_width()))
                } else {
                    let t = (i + 1) as f64 / n.max(1) as f64;
                    Some(ScaleValue::Number(r0 + t * (r1 - r0)))
                }
            }
            ScaleRange::Numbers(v) => palette::cycle(v, i).map(ScaleValue::Number),
            ScaleRange::Colors(v) => palette::cycle(v, i).map(ScaleValue::Color),
            ScaleRange::Shapes(v) => palette::cycle(v, i).map(ScaleValue::Shape),
            ScaleRange::Gradient(stops) => {
                let t = if n <= 1 {
                    1.0
                } else {
                    i as f64 / (n - 1) as f64
                };
                palette::interpolate(stops, t).map(ScaleValue::Color)
            }
        }
    }

    fn band_scale(&self, n: usize, range: (f64, f64)) -> ScaleBand {
        ScaleBand::new(range, n).with_padding(self.padding_inner, self.padding_outer)
    }

    /// Returns the `(start, width)` of the band holding `value`.
    pub fn band(&self, value: &Value) -> Option<(f64, f64)> {
        let (ScaleDomain::Discrete(values), ScaleRange::Interval(r0, r1)) =
            (&self.domain, &self.range)
        else {
            return None;
        };
        if self.kind != ScaleKind::Band {
            return None;
        }
        let i = self.domain_index(value)?;
        let band = self.band_scale(values.len(), (*r0, *r1));
        Some((band.start(i), band.band_width()))
    }

    /// Returns the band width of a band scale.
    pub fn band_width(&self) -> Option<f64> {
        match (&self.domain, &self.range) {
            (ScaleDomain::Discrete(values), ScaleRange::Interval(r0, r1))
                if self.kind == ScaleKind::Band =>
            {
                Some(self.band_scale(values.len(), (*r0, *r1)).band_width())
            }
            _ => None,
        }
    }

    /// Returns labelled ticks: about `count` round values for continuous scales, every domain
    /// value for discrete ones.
    pub fn ticks(&self, count: usize) -> Vec<ScaleTick> {
        match &self.domain {
            ScaleDomain::Discrete(values) => values
                .iter()
                .map(|v| ScaleTick {
                    value: v.clone(),
                    label: alloc::format!("{v}"),
                })
                .collect(),
            ScaleDomain::Continuous(d0, d1) if self.kind == ScaleKind::Time => {
                let (ticks, step) = time::time_ticks(*d0, *d1, count);
                ticks
                    .into_iter()
                    .map(|t| ScaleTick {
                        value: Value::Time(time_value(t)),
                        label: time::format_time(t, step),
                    })
                    .collect()
            }
            ScaleDomain::Continuous(d0, d1) => {
                let ticks = linear_ticks(*d0, *d1, count);
                let step = tick_step(&ticks);
                ticks
                    .into_iter()
                    .map(|t| ScaleTick {
                        value: Value::Number(t),
                        label: format_tick_with_step(t, step),
                    })
                    .collect()
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "tick values come from a finite millisecond domain"
)]
fn time_value(t: f64) -> i64 {
    t as i64
}

fn signed_sqrt(x: f64) -> f64 {
    if x < 0.0 { -(-x).sqrt() } else { x.sqrt() }
}

fn read_number(data_type: DataType, kind: ScaleKind, value: &Value) -> Option<f64> {
    let v = if data_type == DataType::Temporal || kind == ScaleKind::Time {
        value.as_time_ms().map(|t| t as f64)
    } else {
        value.as_f64()
    };
    v.filter(|v| v.is_finite())
}

/// Builds the scale for one field binding.
///
/// `values` are the field's values over the rows being drawn.
pub fn synthesize(
    request: &ScaleRequest<'_>,
    values: &[&Value],
    overrides: &ScaleConfig,
    sort: Option<&SortSpec>,
    config: &CompileConfig,
) -> Result<Scale, CompileError> {
    let channel = request.channel;
    let data_type = request.data_type;
    let kind = scale_kind(request, overrides)?;

    let scale = if kind.is_continuous() {
        continuous_scale(request, kind, values, overrides, config)?
    } else {
        discrete_scale(request, kind, values, overrides, sort, config)?
    };
    log::trace!(
        "scale {channel}: {:?} over {:?} ({data_type}) -> {:?}",
        scale.kind,
        scale.domain,
        scale.range
    );
    Ok(scale)
}

fn scale_kind(req: &ScaleRequest<'_>, overrides: &ScaleConfig) -> Result<ScaleKind, CompileError> {
    let position = req.channel.role() == ChannelRole::Position;
    let discrete = if position {
        ScaleKind::Band
    } else {
        ScaleKind::Ordinal
    };
    let kind = match overrides.kind {
        // Bands only exist along a pixel axis.
        Some(ScaleKind::Band) => discrete,
        Some(k) => k,
        None => match req.data_type {
            DataType::Nominal | DataType::Ordinal => discrete,
            DataType::Quantitative => ScaleKind::Linear,
            DataType::Temporal => ScaleKind::Time,
        },
    };
    if kind.is_continuous() && !req.data_type.is_continuous() {
        return Err(CompileError::IncompatibleType {
            channel: req.channel,
            data_type: req.data_type,
        });
    }
    Ok(kind)
}

fn continuous_scale(
    req: &ScaleRequest<'_>,
    kind: ScaleKind,
    values: &[&Value],
    overrides: &ScaleConfig,
    config: &CompileConfig,
) -> Result<Scale, CompileError> {
    let channel = req.channel;
    let read = |v: &Value| read_number(req.data_type, kind, v);

    let explicit = match &overrides.domain {
        None => None,
        Some(DomainOverride::Interval(a, b)) => Some((a, b)),
        Some(DomainOverride::Values(v)) => match v.as_slice() {
            [a, b] => Some((a, b)),
            _ => return Err(CompileError::InvalidDomain { channel }),
        },
    };
    let (mut min, mut max) = match explicit {
        Some((a, b)) => {
            let (Some(a), Some(b)) = (read(a), read(b)) else {
                return Err(CompileError::InvalidDomain { channel });
            };
            if a > b {
                return Err(CompileError::InvalidDomain { channel });
            }
            (a, b)
        }
        None => {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for v in values.iter().filter_map(|v| read(v)) {
                min = min.min(v);
                max = max.max(v);
            }
            if !(min.is_finite() && max.is_finite()) {
                return Err(CompileError::EmptyDomain {
                    channel,
                    field: req.field.into(),
                });
            }
            (min, max)
        }
    };

    let role = channel.role();
    let zero = if kind == ScaleKind::Time {
        false
    } else if explicit.is_some() {
        overrides.zero.unwrap_or(false)
    } else {
        overrides.zero.unwrap_or_else(|| {
            matches!(role, ChannelRole::Position | ChannelRole::Magnitude)
                && req.quantitative_kind != Some(QuantitativeKind::Interval)
        })
    };
    if zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }

    let nice = overrides
        .nice
        .unwrap_or(explicit.is_none() && (role == ChannelRole::Position || !zero));
    if nice {
        (min, max) = if kind == ScaleKind::Time {
            time::nice_time_domain(min, max, config.tick_count)
        } else {
            nice_domain(min, max, config.tick_count)
        };
    }

    let range = continuous_range(req, overrides.range.as_ref(), config)?;
    let mut scale = Scale::new(
        channel,
        req.data_type,
        kind,
        ScaleDomain::Continuous(min, max),
        range,
    );
    scale.zero = zero;
    scale.nice = nice;
    Ok(scale)
}

fn continuous_range(
    req: &ScaleRequest<'_>,
    over: Option<&RangeOverride>,
    config: &CompileConfig,
) -> Result<ScaleRange, CompileError> {
    let channel = req.channel;
    match channel {
        Channel::Color => match over {
            None => Ok(ScaleRange::Gradient(config.sequential.clone())),
            Some(RangeOverride::Colors(c)) if !c.is_empty() => Ok(ScaleRange::Gradient(c.clone())),
            Some(_) => Err(CompileError::IncompatibleRange { channel }),
        },
        _ => {
            let (a, b) = numeric_range(req, over, config)?;
            Ok(ScaleRange::Interval(a, b))
        }
    }
}

/// Default or overridden numeric range, oriented for the channel.
fn numeric_range(
    req: &ScaleRequest<'_>,
    over: Option<&RangeOverride>,
    config: &CompileConfig,
) -> Result<(f64, f64), CompileError> {
    let channel = req.channel;
    let default = match channel {
        Channel::X => (0.0, req.extent.width),
        Channel::Y => (0.0, req.extent.height),
        Channel::Size => config.size_range,
        Channel::Opacity => config.opacity_range,
        _ => return Err(CompileError::IncompatibleRange { channel }),
    };
    let (min, max) = match over {
        None => default,
        Some(RangeOverride::Interval(a, b)) => (*a, *b),
        Some(RangeOverride::Numbers(v)) if v.len() >= 2 => (v[0], v[v.len() - 1]),
        Some(_) => return Err(CompileError::IncompatibleRange { channel }),
    };
    if min > max || !min.is_finite() || !max.is_finite() {
        return Err(CompileError::InvalidRange { channel, min, max });
    }
    // Screen y grows downward; larger values go up.
    Ok(if channel == Channel::Y {
        (max, min)
    } else {
        (min, max)
    })
}

fn discrete_scale(
    req: &ScaleRequest<'_>,
    kind: ScaleKind,
    values: &[&Value],
    overrides: &ScaleConfig,
    sort: Option<&SortSpec>,
    config: &CompileConfig,
) -> Result<Scale, CompileError> {
    let channel = req.channel;
    let domain = match &overrides.domain {
        Some(DomainOverride::Values(v)) => v.clone(),
        Some(DomainOverride::Interval(a, b)) => alloc::vec![a.clone(), b.clone()],
        None => discrete_domain(req.data_type, values, sort),
    };
    if domain.is_empty() {
        return Err(CompileError::EmptyDomain {
            channel,
            field: req.field.into(),
        });
    }

    let n = domain.len();
    let over = overrides.range.as_ref();
    let range = match channel {
        Channel::X | Channel::Y => {
            let (a, b) = numeric_range(req, over, config)?;
            ScaleRange::Interval(a, b)
        }
        Channel::Size | Channel::Opacity => match over {
            Some(RangeOverride::Numbers(v)) if !v.is_empty() => ScaleRange::Numbers(v.clone()),
            _ => {
                let (a, b) = numeric_range(req, over, config)?;
                ScaleRange::Numbers(
                    (0..n)
                        .map(|i| a + (b - a) * (i + 1) as f64 / n as f64)
                        .collect(),
                )
            }
        },
        Channel::Color => match over {
            Some(RangeOverride::Colors(c)) if !c.is_empty() => ScaleRange::Colors(c.clone()),
            Some(_) => return Err(CompileError::IncompatibleRange { channel }),
            None if req.data_type == DataType::Nominal => {
                ScaleRange::Colors(config.categorical.clone())
            }
            None => ScaleRange::Colors(palette::sample(&config.sequential, n)),
        },
        Channel::Shape => match over {
            Some(RangeOverride::Shapes(s)) if !s.is_empty() => ScaleRange::Shapes(s.clone()),
            Some(_) => return Err(CompileError::IncompatibleRange { channel }),
            None => ScaleRange::Shapes(config.shapes.clone()),
        },
        _ => return Err(CompileError::IncompatibleRange { channel }),
    };

    let mut scale = Scale::new(
        channel,
        req.data_type,
        kind,
        ScaleDomain::Discrete(domain),
        range,
    );
    if kind == ScaleKind::Band {
        // Heatmap cells tile the plot.
        if req.mark == MarkKind::Rect {
            (scale.padding_inner, scale.padding_outer) = (0.0, 0.0);
        } else {
            scale.padding_inner = config.band_padding_inner;
            scale.padding_outer = config.band_padding_outer;
        }
    }
    Ok(scale)
}

/// Distinct non-null values ordered for a discrete domain.
///
/// Nominal fields keep first-seen order; ordinal (and discretized continuous) fields sort
/// naturally. A sort spec overrides both.
pub fn discrete_domain(
    data_type: DataType,
    values: &[&Value],
    sort: Option<&SortSpec>,
) -> Vec<Value> {
    let mut seen = hashbrown::HashSet::new();
    let mut out: Vec<Value> = Vec::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        if seen.insert(v.key()) {
            out.push((*v).clone());
        }
    }
    match sort {
        Some(SortSpec::Ascending) => out.sort_by(Value::natural_cmp),
        Some(SortSpec::Descending) => out.sort_by(|a, b| b.natural_cmp(a)),
        Some(SortSpec::Explicit(order)) => out = explicit_order(out, order),
        None if data_type != DataType::Nominal => out.sort_by(Value::natural_cmp),
        None => {}
    }
    out
}

/// Listed values (that were observed) first, in list order; the rest keep their order.
pub fn explicit_order(observed: Vec<Value>, order: &[Value]) -> Vec<Value> {
    let mut rest = observed;
    let mut out = Vec::with_capacity(rest.len());
    for want in order {
        if let Some(pos) = rest.iter().position(|v| v.key() == want.key()) {
            out.push(rest.remove(pos));
        }
    }
    out.extend(rest);
    out
}

/// Step of a nice interval: `mult × 10^power` with `mult ∈ {1, 2, 5, 10}`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct NiceStep {
    mult: f64,
    power: i32,
}

impl NiceStep {
    fn value(self) -> f64 {
        if self.power >= 0 {
            self.mult * 10_f64.powi(self.power)
        } else {
            self.mult / 10_f64.powi(-self.power)
        }
    }

    /// `k × step`, computed so that e.g. `3 × 0.1` comes out as `0.3`.
    fn times(self, k: f64) -> f64 {
        if self.power >= 0 {
            k * self.value()
        } else {
            k * self.mult / 10_f64.powi(-self.power)
        }
    }

    /// `x / step`, the inverse of [`NiceStep::times`].
    fn quotient(self, x: f64) -> f64 {
        if self.power >= 0 {
            x / self.value()
        } else {
            x * 10_f64.powi(-self.power) / self.mult
        }
    }

    fn floor(self, x: f64) -> f64 {
        self.times(snap(self.quotient(x), false))
    }

    fn ceil(self, x: f64) -> f64 {
        self.times(snap(self.quotient(x), true))
    }
}

/// Rounds `q` up or down, treating values within float noise of an integer as that integer.
fn snap(q: f64, up: bool) -> f64 {
    let r = q.round();
    if (q - r).abs() < 1e-9 {
        r
    } else if up {
        q.ceil()
    } else {
        q.floor()
    }
}

fn nice_step(step: f64) -> Option<NiceStep> {
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "log10 of a finite positive f64 is within ±400"
    )]
    let power = power as i32;
    let error = step / NiceStep { mult: 1.0, power }.value();
    let mult = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    Some(NiceStep { mult, power })
}

/// Extends `[min, max]` outward to multiples of a `{1, 2, 5} × 10^k` step chosen from
/// `span / count`, repeating until stable.
///
/// The result is a fixpoint: applying it again returns the same domain. It never shrinks the
/// input (beyond float noise).
pub fn nice_domain(min: f64, max: f64, count: usize) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return (min, max);
    }
    let (mut lo, mut hi) = (min, max);
    for _ in 0..10 {
        let Some(step) = nice_step((hi - lo) / count.max(1) as f64) else {
            break;
        };
        let (nlo, nhi) = (step.floor(lo), step.ceil(hi));
        if nlo == lo && nhi == hi {
            break;
        }
        (lo, hi) = (nlo, nhi);
    }
    (lo, hi)
}

/// Returns round tick values inside `[min, max]`.
pub fn linear_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    let Some(step) = nice_step((max - min) / count.max(1) as f64) else {
        return alloc::vec![min, max];
    };
    let k0 = snap(step.quotient(min), true);
    let k1 = snap(step.quotient(max), false);
    let n = (k1 - k0).clamp(0.0, 10_000.0);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "clamped to a small non-negative range"
    )]
    let n = n.round() as u64;
    (0..=n).map(|i| step.times(k0 + i as f64)).collect()
}

fn tick_step(ticks: &[f64]) -> f64 {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn request(channel: Channel, data_type: DataType) -> ScaleRequest<'static> {
        ScaleRequest {
            channel,
            field: "f",
            data_type,
            quantitative_kind: None,
            mark: MarkKind::Point,
            extent: Size {
                width: 200.0,
                height: 100.0,
            },
        }
    }

    fn nums(v: &[f64]) -> Vec<Value> {
        v.iter().copied().map(Value::Number).collect()
    }

    fn synth(
        req: &ScaleRequest<'_>,
        values: &[Value],
        overrides: &ScaleConfig,
    ) -> Result<Scale, CompileError> {
        let refs: Vec<&Value> = values.iter().collect();
        synthesize(req, &refs, overrides, None, &CompileConfig::default())
    }

    #[test]
    fn position_includes_zero_and_is_nice_by_default() {
        let s = synth(
            &request(Channel::Y, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(0.0, 8.0));
        assert_eq!(s.range, ScaleRange::Interval(100.0, 0.0));
        assert!(s.zero && s.nice);
    }

    #[test]
    fn zero_and_nice_off_keeps_the_data_extent() {
        let over = ScaleConfig::default().with_zero(false).with_nice(false);
        let s = synth(
            &request(Channel::X, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &over,
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(3.2, 7.8));

        let over = ScaleConfig::default().with_zero(false).with_nice(true);
        let s = synth(
            &request(Channel::X, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &over,
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(3.0, 8.0));
    }

    #[test]
    fn zero_is_included_for_negative_data() {
        let s = synth(
            &request(Channel::Size, DataType::Quantitative),
            &nums(&[-5.0, -2.0]),
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(-5.0, 0.0));
    }

    #[test]
    fn interval_fields_skip_zero() {
        let mut req = request(Channel::X, DataType::Quantitative);
        req.quantitative_kind = Some(QuantitativeKind::Interval);
        let over = ScaleConfig::default().with_nice(false);
        let s = synth(&req, &nums(&[10.0, 20.0]), &over).unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(10.0, 20.0));
    }

    #[test]
    fn colour_skips_zero_but_is_nice() {
        let s = synth(
            &request(Channel::Color, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(3.0, 8.0));
        assert!(!s.zero && s.nice);
        assert!(matches!(s.range, ScaleRange::Gradient(_)));
        assert_eq!(
            s.map(&Value::Number(3.0)),
            Some(ScaleValue::Color(palette::SEQUENTIAL[0]))
        );

        let exact = ScaleConfig::default().with_nice(false);
        let s = synth(
            &request(Channel::Color, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &exact,
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(3.2, 7.8));
    }

    #[test]
    fn interval_magnitudes_are_nice_without_zero() {
        let mut req = request(Channel::Size, DataType::Quantitative);
        req.quantitative_kind = Some(QuantitativeKind::Interval);
        let s = synth(&req, &nums(&[3.2, 7.8]), &ScaleConfig::default()).unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(3.0, 8.0));

        // Zero-anchored magnitudes keep the data maximum.
        let s = synth(
            &request(Channel::Size, DataType::Quantitative),
            &nums(&[3.2, 7.8]),
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(0.0, 7.8));
    }

    #[test]
    fn temporal_domains_are_chronological_and_skip_zero() {
        // 2024-03-01, 2024-01-01 and 2024-02-01, out of order.
        let (mar, jan, feb) = (1_709_251_200_000, 1_704_067_200_000, 1_706_745_600_000);
        let values = vec![Value::Time(mar), Value::Time(jan), Value::Time(feb)];
        let s = synth(
            &request(Channel::X, DataType::Temporal),
            &values,
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.kind, ScaleKind::Time);
        assert!(!s.zero);
        let Some((d0, d1)) = s.continuous_domain() else {
            panic!("expected a continuous domain");
        };
        assert!(d0 > 0.0, "domain starts at the epoch: {d0}");
        assert!(d0 <= jan as f64 && d1 >= mar as f64);

        let x = |t: i64| s.map_number(&Value::Time(t)).unwrap();
        assert!(x(jan) < x(feb) && x(feb) < x(mar));
        let ticks: Vec<i64> = s
            .ticks(5)
            .iter()
            .filter_map(|t| t.value.as_time_ms())
            .collect();
        assert!(ticks.len() >= 2);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ordinal_colour_samples_the_sequential_ramp() {
        let config = CompileConfig::default();
        let s = synth(
            &request(Channel::Color, DataType::Ordinal),
            &nums(&[3.0, 1.0, 4.0, 2.0]),
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(
            s.range,
            ScaleRange::Colors(palette::sample(&config.sequential, 4))
        );
        let colors: Vec<Color> = [1.0, 2.0, 3.0, 4.0]
            .into_iter()
            .filter_map(|v| s.map(&Value::Number(v)).and_then(ScaleValue::as_color))
            .collect();
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], palette::SEQUENTIAL[0]);
        assert_eq!(colors[3], palette::SEQUENTIAL[4]);
        assert!(colors.iter().all(|c| !palette::CATEGORICAL.contains(c)));
        // Light to dark.
        let lightness: Vec<f32> = colors
            .iter()
            .map(|c| c.components[..3].iter().sum())
            .collect();
        assert!(lightness.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn explicit_domain_is_used_as_given() {
        let over = ScaleConfig::default().with_domain(DomainOverride::Interval(
            Value::Number(2.5),
            Value::Number(9.5),
        ));
        let s = synth(
            &request(Channel::X, DataType::Quantitative),
            &nums(&[3.0]),
            &over,
        )
        .unwrap();
        assert_eq!(s.domain, ScaleDomain::Continuous(2.5, 9.5));

        let bad = ScaleConfig::default().with_domain(DomainOverride::Interval(
            Value::Number(9.0),
            Value::from("x"),
        ));
        assert_eq!(
            synth(&request(Channel::X, DataType::Quantitative), &nums(&[3.0]), &bad),
            Err(CompileError::InvalidDomain {
                channel: Channel::X,
            })
        );
    }

    #[test]
    fn inverted_range_override_is_rejected() {
        let over = ScaleConfig::default().with_range(RangeOverride::Interval(10.0, 1.0));
        assert_eq!(
            synth(
                &request(Channel::Size, DataType::Quantitative),
                &nums(&[1.0]),
                &over,
            ),
            Err(CompileError::InvalidRange {
                channel: Channel::Size,
                min: 10.0,
                max: 1.0,
            })
        );
    }

    #[test]
    fn empty_domain_is_an_error() {
        assert_eq!(
            synth(
                &request(Channel::X, DataType::Quantitative),
                &[Value::Null],
                &ScaleConfig::default(),
            ),
            Err(CompileError::EmptyDomain {
                channel: Channel::X,
                field: "f".into(),
            })
        );
        assert!(matches!(
            synth(
                &request(Channel::Color, DataType::Nominal),
                &[],
                &ScaleConfig::default(),
            ),
            Err(CompileError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn nominal_colour_cycles_the_palette() {
        let values: Vec<Value> = (0..12).map(|i| Value::from(alloc::format!("c{i}"))).collect();
        let s = synth(
            &request(Channel::Color, DataType::Nominal),
            &values,
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(
            s.map(&Value::from("c10")),
            Some(ScaleValue::Color(palette::CATEGORICAL[0]))
        );
        assert_eq!(
            s.map(&Value::from("c11")),
            Some(ScaleValue::Color(palette::CATEGORICAL[1]))
        );
        assert_eq!(s.map(&Value::from("other")), None);
    }

    #[test]
    fn ordinal_domains_sort_naturally_nominal_keep_discovery_order() {
        let values = vec![Value::from("b"), Value::from("c"), Value::from("a")];
        let nominal = synth(
            &request(Channel::X, DataType::Nominal),
            &values,
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(nominal.domain, ScaleDomain::Discrete(values.clone()));
        let ordinal = synth(
            &request(Channel::X, DataType::Ordinal),
            &values,
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(
            ordinal.domain,
            ScaleDomain::Discrete(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn band_positions() {
        let values = vec![Value::from("a"), Value::from("b")];
        let s = synth(
            &request(Channel::X, DataType::Nominal),
            &values,
            &ScaleConfig::default(),
        )
        .unwrap();
        assert_eq!(s.kind, ScaleKind::Band);
        // 2 bands + 0.1 inner + 2 * 0.1 outer = 2.3 band units over 200px.
        let bw = s.band_width().unwrap();
        assert!((bw - 200.0 / 2.3).abs() < 1e-9);
        let (start, width) = s.band(&Value::from("b")).unwrap();
        assert!((start - bw * 1.2).abs() < 1e-9);
        assert!((width - bw).abs() < 1e-9);
        let center = s.map_number(&Value::from("a")).unwrap();
        assert!((center - bw * 0.6).abs() < 1e-9);
    }

    #[test]
    fn ordinal_size_steps_across_the_range() {
        let values = vec![Value::from("s"), Value::from("m"), Value::from("l")];
        let s = synth(
            &request(Channel::Size, DataType::Ordinal),
            &values,
            &ScaleConfig::default().with_domain(DomainOverride::Values(values.clone())),
        )
        .unwrap();
        let sizes: Vec<f64> = values.iter().filter_map(|v| s.map_number(v)).collect();
        assert_eq!(sizes.len(), 3);
        assert!(sizes[0] < sizes[1] && sizes[1] < sizes[2]);
        assert!((sizes[2] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn sqrt_scale_preserves_sign() {
        let over = ScaleConfig::default()
            .with_kind(ScaleKind::Sqrt)
            .with_zero(false)
            .with_nice(false)
            .with_range(RangeOverride::Interval(0.0, 100.0));
        let s = synth(
            &request(Channel::X, DataType::Quantitative),
            &nums(&[-4.0, 4.0]),
            &over,
        )
        .unwrap();
        assert_eq!(s.map_number(&Value::Number(0.0)), Some(50.0));
        assert_eq!(s.map_number(&Value::Number(4.0)), Some(100.0));
        assert_eq!(s.map_number(&Value::Number(-1.0)), Some(25.0));
    }

    #[test]
    fn continuous_kind_on_nominal_is_incompatible() {
        let over = ScaleConfig::default().with_kind(ScaleKind::Linear);
        assert_eq!(
            synth(&request(Channel::X, DataType::Nominal), &[Value::from("a")], &over),
            Err(CompileError::IncompatibleType {
                channel: Channel::X,
                data_type: DataType::Nominal,
            })
        );
    }

    #[test]
    fn nice_domain_is_idempotent_and_never_shrinks() {
        let cases = [
            (3.2, 7.8),
            (0.13, 0.97),
            (-13.0, 1234.5),
            (0.001, 0.0173),
            (1e6, 3.3e7),
            (-0.7, -0.21),
        ];
        for (a, b) in cases {
            for count in [3, 5, 10] {
                let d = nice_domain(a, b, count);
                assert!(d.0 <= a + 1e-12 && d.1 >= b - 1e-12, "{a} {b} -> {d:?}");
                assert_eq!(nice_domain(d.0, d.1, count), d, "{a} {b} x{count}");
            }
        }
        assert_eq!(nice_domain(3.2, 7.8, 5), (3.0, 8.0));
    }

    #[test]
    fn ticks_are_round_and_inside_the_domain() {
        assert_eq!(linear_ticks(0.0, 8.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(linear_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(linear_ticks(3.2, 7.8, 5), vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn ticks_carry_labels() {
        let s = synth(
            &request(Channel::X, DataType::Quantitative),
            &nums(&[0.0, 1.0]),
            &ScaleConfig::default(),
        )
        .unwrap();
        let labels: Vec<String> = s.ticks(5).into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
    }
}
