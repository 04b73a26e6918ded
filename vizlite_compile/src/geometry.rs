// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark geometry.
//!
//! [`build`] turns resolved encodings and a set of rows into positioned primitives, in draw
//! order. Coordinates are local to the view (or facet cell): `x` grows right, `y` grows down.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;
use kurbo::{Line, Point, Rect};
use peniko::Color;
use smallvec::SmallVec;
use vizlite_data::{Dataset, Value, ValueKey};

use crate::channel::Channel;
use crate::config::CompileConfig;
use crate::encoding::{ConstantValue, ResolvedEncoding, ResolvedEncodings};
use crate::error::CompileError;
use crate::layout::Size;
use crate::scale::{Scale, ScaleValue};
use crate::spec::{MarkKind, MarkSpec, SortSpec};
use crate::symbol::Shape;

/// Shape of a positioned primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A symbol of `area` square pixels centred at `center`.
    Symbol {
        /// Symbol shape.
        shape: Shape,
        /// Centre.
        center: Point,
        /// Enclosed area.
        area: f64,
    },
    /// A bar or heatmap cell.
    Rect(Rect),
    /// A rule across the view.
    Rule(Line),
    /// A short tick.
    Tick(Line),
    /// A text label.
    Text {
        /// Anchor point (label centre).
        anchor: Point,
        /// Label text.
        text: String,
        /// Font size.
        font_size: f64,
    },
    /// A polyline through one series.
    Line {
        /// Vertices in draw order.
        points: Vec<Point>,
    },
    /// A filled band between one series and its baseline.
    Area {
        /// Top vertices in draw order.
        points: Vec<Point>,
        /// Baseline vertices, one below each top vertex.
        baseline: Vec<Point>,
    },
}

/// A drawable primitive with its style and provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedPrimitive {
    /// Keys of the source rows (one per row, several for a line or area series).
    pub rows: SmallVec<[u64; 1]>,
    /// Geometry.
    pub geometry: Geometry,
    /// Fill (or stroke, when not filled) colour.
    pub color: Color,
    /// Whether the shape is filled.
    pub filled: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Tooltip text, `field: value` pairs joined by `, `.
    pub tooltip: Option<String>,
    /// Raw value of the `order` binding.
    pub order: Option<Value>,
}

/// Where a row sits along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
enum AxisPos {
    Absent,
    At(f64),
    Band(f64, f64),
}

impl AxisPos {
    fn center(self, extent: f64) -> f64 {
        match self {
            Self::Absent => 0.5 * extent,
            Self::At(p) => p,
            Self::Band(start, width) => start + 0.5 * width,
        }
    }

    /// Band, or a `thickness` slab around a point, or the full extent.
    fn span(self, extent: f64, thickness: f64) -> (f64, f64) {
        match self {
            Self::Absent => (0.0, extent),
            Self::At(p) => (p - 0.5 * thickness, p + 0.5 * thickness),
            Self::Band(start, width) => (start, start + width),
        }
    }

    /// From a point to the baseline.
    fn to_baseline(self, extent: f64, baseline: f64) -> (f64, f64) {
        match self {
            Self::At(p) => (p.min(baseline), p.max(baseline)),
            Self::Absent | Self::Band(..) => self.span(extent, 0.0),
        }
    }
}

/// Channels a mark cannot draw without.
pub fn check_required(mark: MarkKind, enc: &ResolvedEncodings) -> Result<(), CompileError> {
    let (ok, channels) = match mark {
        MarkKind::Line | MarkKind::Area => (enc.has(Channel::X) && enc.has(Channel::Y), "x and y"),
        MarkKind::Bar | MarkKind::Rect | MarkKind::Rule => {
            (enc.has(Channel::X) || enc.has(Channel::Y), "x or y")
        }
        MarkKind::Text => (enc.has(Channel::Text), "text"),
        MarkKind::Circle | MarkKind::Point | MarkKind::Square | MarkKind::Tick => (true, ""),
    };
    if ok {
        Ok(())
    } else {
        Err(CompileError::MissingRequiredChannel { mark, channels })
    }
}

/// Builds primitives for `rows` of `data`, in draw order.
pub fn build(
    mark: &MarkSpec,
    enc: &ResolvedEncodings,
    data: &Dataset,
    rows: &[usize],
    extent: Size,
    config: &CompileConfig,
) -> Result<Vec<PositionedPrimitive>, CompileError> {
    check_required(mark.kind, enc)?;
    let ordered = draw_order(enc, data, rows);
    let builder = Builder {
        mark,
        enc,
        data,
        extent,
        config,
    };
    let out = match mark.kind {
        MarkKind::Line | MarkKind::Area => builder.series(&ordered),
        _ => ordered
            .iter()
            .filter_map(|&row| builder.row(row))
            .collect(),
    };
    log::debug!(
        "{} mark: {} primitives from {} rows",
        mark.kind,
        out.len(),
        rows.len()
    );
    Ok(out)
}

/// Sorts rows by the `order` binding, stably; dataset order otherwise.
///
/// Missing order values sort last in either direction.
pub fn draw_order(enc: &ResolvedEncodings, data: &Dataset, rows: &[usize]) -> Vec<usize> {
    let mut out = rows.to_vec();
    let Some(order) = enc.field(Channel::Order) else {
        return out;
    };
    let read = |row: usize| order.value(data, row).filter(|v| !v.is_null());
    let sort = order.binding.sort.as_ref();
    let descending = matches!(sort, Some(SortSpec::Descending));
    let rank = |v: &Value| match sort {
        Some(SortSpec::Explicit(list)) => list.iter().position(|w| w.key() == v.key()),
        _ => None,
    };
    out.sort_by(|&a, &b| match (read(a), read(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(va), Some(vb)) => {
            let o = match (rank(va), rank(vb)) {
                (Some(ra), Some(rb)) => ra.cmp(&rb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => va.natural_cmp(vb),
            };
            if descending { o.reverse() } else { o }
        }
    });
    out
}

struct RowStyle {
    color: Color,
    opacity: f64,
    tooltip: Option<String>,
    order: Option<Value>,
}

struct Builder<'a> {
    mark: &'a MarkSpec,
    enc: &'a ResolvedEncodings,
    data: &'a Dataset,
    extent: Size,
    config: &'a CompileConfig,
}

impl Builder<'_> {
    fn value(&self, channel: Channel, row: usize) -> Option<&Value> {
        self.enc.field(channel)?.value(self.data, row)
    }

    fn scaled(&self, channel: Channel, row: usize) -> Option<ScaleValue> {
        let scale = self.enc.scale(channel)?;
        scale.map(self.value(channel, row)?)
    }

    /// `None` when the channel is bound but the row has no usable value.
    fn axis(&self, channel: Channel, row: usize) -> Option<AxisPos> {
        match self.enc.get(channel) {
            None => Some(AxisPos::Absent),
            Some(ResolvedEncoding::Constant {
                value: ConstantValue::Number(p),
                ..
            }) => Some(AxisPos::At(*p)),
            Some(ResolvedEncoding::Constant { .. }) => Some(AxisPos::Absent),
            Some(ResolvedEncoding::Field(f)) => {
                let scale = f.scale.as_ref()?;
                let v = f.value(self.data, row)?;
                if let Some((start, width)) = scale.band(v) {
                    return Some(AxisPos::Band(start, width));
                }
                scale
                    .map_number(v)
                    .filter(|p| p.is_finite())
                    .map(AxisPos::At)
            }
        }
    }

    fn is_continuous(&self, channel: Channel) -> bool {
        self.enc.scale(channel).is_some_and(Scale::is_continuous)
    }

    /// Pixel position of zero (clamped into the domain), or `edge` without a continuous scale.
    fn baseline(&self, channel: Channel, edge: f64) -> f64 {
        self.enc
            .scale(channel)
            .and_then(|s| {
                let (d0, d1) = s.continuous_domain()?;
                s.map_raw(0.0_f64.max(d0).min(d1))
            })
            .unwrap_or(edge)
    }

    fn style(&self, row: usize) -> RowStyle {
        let color = match self.enc.get(Channel::Color) {
            Some(ResolvedEncoding::Constant {
                value: ConstantValue::Color(c),
                ..
            }) => Some(*c),
            Some(ResolvedEncoding::Field(_)) => {
                self.scaled(Channel::Color, row).and_then(ScaleValue::as_color)
            }
            _ => None,
        }
        .unwrap_or(self.config.default_color);

        let opacity = match self.enc.get(Channel::Opacity) {
            Some(ResolvedEncoding::Constant {
                value: ConstantValue::Number(o),
                ..
            }) => Some(*o),
            Some(ResolvedEncoding::Field(_)) => {
                self.scaled(Channel::Opacity, row).and_then(ScaleValue::as_number)
            }
            _ => None,
        };
        let opacity = match opacity {
            Some(o) => o.clamp(0.0, 1.0),
            None if !self.enc.has(Channel::Opacity) && self.mark.is_filled() => {
                self.config.filled_opacity
            }
            None => 1.0,
        };

        RowStyle {
            color,
            opacity,
            tooltip: self.tooltip(row),
            order: self.value(Channel::Order, row).cloned(),
        }
    }

    fn tooltip(&self, row: usize) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        for t in self.enc.tooltips() {
            match t {
                ResolvedEncoding::Field(f) => {
                    let v = f.value(self.data, row).cloned().unwrap_or_default();
                    parts.push(alloc::format!("{}: {v}", f.binding.field));
                }
                ResolvedEncoding::Constant {
                    value: ConstantValue::Text(s),
                    ..
                } => parts.push(s.clone()),
                ResolvedEncoding::Constant { .. } => {}
            }
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    fn shape(&self, row: usize) -> Shape {
        match self.mark.kind {
            MarkKind::Square => return Shape::Square,
            MarkKind::Point => {}
            _ => return Shape::Circle,
        }
        match self.enc.get(Channel::Shape) {
            Some(ResolvedEncoding::Constant {
                value: ConstantValue::Shape(s),
                ..
            }) => *s,
            Some(ResolvedEncoding::Field(_)) => self
                .scaled(Channel::Shape, row)
                .and_then(ScaleValue::as_shape)
                .unwrap_or(Shape::Circle),
            _ => Shape::Circle,
        }
    }

    fn area(&self, row: usize) -> f64 {
        let area = match self.enc.get(Channel::Size) {
            Some(ResolvedEncoding::Constant {
                value: ConstantValue::Number(a),
                ..
            }) => Some(*a),
            Some(ResolvedEncoding::Field(_)) => {
                self.scaled(Channel::Size, row).and_then(ScaleValue::as_number)
            }
            _ => None,
        };
        area.unwrap_or(self.config.default_point_area).max(0.0)
    }

    fn text(&self, row: usize) -> Option<String> {
        match self.enc.get(Channel::Text)? {
            ResolvedEncoding::Constant {
                value: ConstantValue::Text(s),
                ..
            } => Some(s.clone()),
            ResolvedEncoding::Constant { .. } => None,
            ResolvedEncoding::Field(f) => {
                let v = f.value(self.data, row)?;
                (!v.is_null()).then(|| alloc::format!("{v}"))
            }
        }
    }

    fn primitive(&self, row: usize, geometry: Geometry) -> PositionedPrimitive {
        let style = self.style(row);
        PositionedPrimitive {
            rows: smallvec::smallvec![self.data.rows[row].key],
            geometry,
            color: style.color,
            filled: self.mark.is_filled(),
            opacity: style.opacity,
            tooltip: style.tooltip,
            order: style.order,
        }
    }

    fn row(&self, row: usize) -> Option<PositionedPrimitive> {
        let (Some(x), Some(y)) = (self.axis(Channel::X, row), self.axis(Channel::Y, row)) else {
            log::debug!("skipping row {row}: missing position");
            return None;
        };
        let Size { width, height } = self.extent;
        let thickness = self.config.continuous_band_size;
        let center = Point::new(x.center(width), y.center(height));

        let geometry = match self.mark.kind {
            MarkKind::Point | MarkKind::Circle | MarkKind::Square => Geometry::Symbol {
                shape: self.shape(row),
                center,
                area: self.area(row),
            },
            MarkKind::Bar => {
                let vertical =
                    self.is_continuous(Channel::Y) || !self.is_continuous(Channel::X);
                let ((x0, x1), (y0, y1)) = if vertical {
                    (
                        x.span(width, thickness),
                        y.to_baseline(height, self.baseline(Channel::Y, height)),
                    )
                } else {
                    (
                        x.to_baseline(width, self.baseline(Channel::X, 0.0)),
                        y.span(height, thickness),
                    )
                };
                Geometry::Rect(Rect::new(x0, y0, x1, y1))
            }
            MarkKind::Rect => {
                let (x0, x1) = x.span(width, thickness);
                let (y0, y1) = y.span(height, thickness);
                Geometry::Rect(Rect::new(x0, y0, x1, y1))
            }
            MarkKind::Rule => match (x, y) {
                (_, AxisPos::Absent) => {
                    Geometry::Rule(Line::new((center.x, 0.0), (center.x, height)))
                }
                (AxisPos::Absent, _) => {
                    Geometry::Rule(Line::new((0.0, center.y), (width, center.y)))
                }
                _ => {
                    let base = self.baseline(Channel::Y, height);
                    Geometry::Rule(Line::new((center.x, base), (center.x, center.y)))
                }
            },
            MarkKind::Tick => {
                let vertical =
                    self.is_continuous(Channel::X) || !self.is_continuous(Channel::Y);
                let across = if vertical { y } else { x };
                let length = match across {
                    AxisPos::Band(_, w) => 0.75 * w,
                    AxisPos::Absent | AxisPos::At(_) => self.config.tick_length,
                };
                let h = 0.5 * length;
                let line = if vertical {
                    Line::new((center.x, center.y - h), (center.x, center.y + h))
                } else {
                    Line::new((center.x - h, center.y), (center.x + h, center.y))
                };
                Geometry::Tick(line)
            }
            MarkKind::Text => {
                let text = self.text(row)?;
                Geometry::Text {
                    anchor: center,
                    text,
                    font_size: self.config.text_font_size,
                }
            }
            MarkKind::Line | MarkKind::Area => return None,
        };
        Some(self.primitive(row, geometry))
    }

    /// Discrete bindings that split rows into series.
    fn series_key(&self, row: usize) -> Vec<ValueKey> {
        [Channel::Color, Channel::Shape, Channel::Size, Channel::Opacity]
            .into_iter()
            .filter(|&c| self.enc.scale(c).is_some_and(|s| !s.is_continuous()))
            .map(|c| self.value(c, row).map_or(ValueKey::Null, Value::key))
            .collect()
    }

    fn series(&self, ordered: &[usize]) -> Vec<PositionedPrimitive> {
        let mut index: HashMap<Vec<ValueKey>, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &row in ordered {
            let slot = *index.entry(self.series_key(row)).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(row);
        }

        let Size { width, height } = self.extent;
        let base = self.baseline(Channel::Y, height);
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let mut points = Vec::with_capacity(group.len());
            let mut keys = SmallVec::new();
            for &row in &group {
                let (Some(x), Some(y)) = (self.axis(Channel::X, row), self.axis(Channel::Y, row))
                else {
                    log::debug!("skipping row {row}: missing position");
                    continue;
                };
                points.push(Point::new(x.center(width), y.center(height)));
                keys.push(self.data.rows[row].key);
            }
            let Some(&first) = group.first() else {
                continue;
            };
            if points.is_empty() {
                continue;
            }
            let geometry = if self.mark.kind == MarkKind::Area {
                let baseline = points.iter().map(|p| Point::new(p.x, base)).collect();
                Geometry::Area { points, baseline }
            } else {
                Geometry::Line { points }
            };
            let mut p = self.primitive(first, geometry);
            p.rows = keys;
            out.push(p);
        }
        out
    }
}
