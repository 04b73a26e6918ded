// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis descriptors.
//!
//! Vega models axes as a single axis spec with an `orient` of `top`, `bottom`, `left`, or
//! `right`. This module mirrors that shape: an [`AxisDescriptor`] carries the scale summary
//! and labelled ticks of one position channel, can be measured (for layout), and records where
//! layout placed it.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use vizlite_data::Value;

use crate::channel::Channel;
use crate::measure::TextMeasurer;
use crate::scale::{Scale, ScaleDomain, ScaleRange};
use crate::spec::ScaleKind;

/// Axis metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisStyle {
    /// Font size for tick labels.
    pub label_font_size: f64,
    /// Font size for the axis title.
    pub title_font_size: f64,
    /// Length of tick marks.
    pub tick_size: f64,
    /// Gap between tick marks and labels.
    pub tick_padding: f64,
    /// Gap between labels and the title.
    pub title_offset: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            label_font_size: 10.0,
            title_font_size: 11.0,
            tick_size: 5.0,
            tick_padding: 2.0,
            title_offset: 4.0,
        }
    }
}

/// Axis orientation, matching Vega’s axis `orient` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis placed above the plot area.
    Top,
    /// A horizontal axis placed below the plot area.
    Bottom,
    /// A vertical axis placed to the left of the plot area.
    Left,
    /// A vertical axis placed to the right of the plot area.
    Right,
}

impl AxisOrient {
    /// Whether the axis runs horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// One axis tick.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    /// Data value at the tick.
    pub value: Value,
    /// Position along the axis, in cell-local pixels.
    pub position: f64,
    /// Formatted label.
    pub label: String,
}

/// A positioned axis for one position channel.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisDescriptor {
    /// `X` or `Y`.
    pub channel: Channel,
    /// Where the axis sits relative to its cell.
    pub orient: AxisOrient,
    /// Kind of the underlying scale.
    pub kind: ScaleKind,
    /// Domain of the underlying scale.
    pub domain: ScaleDomain,
    /// Pixel range `(start, end)` of the underlying scale.
    pub range: (f64, f64),
    /// Ticks, in domain order.
    pub ticks: Vec<AxisTick>,
    /// Axis title.
    pub title: String,
    /// Axis strips the axis is drawn in, in scene coordinates.
    ///
    /// A hoisted axis is drawn once per grid row (y) or column (x); a per-cell axis has one
    /// placement. Tick positions are offsets from the strip's start (left edge for horizontal
    /// axes, top edge for vertical ones).
    pub placements: Vec<Rect>,
}

impl AxisDescriptor {
    /// Builds the axis for a position scale, or `None` for channels without axes.
    pub fn from_scale(scale: &Scale, title: impl Into<String>, tick_count: usize) -> Option<Self> {
        let orient = match scale.channel {
            Channel::X => AxisOrient::Bottom,
            Channel::Y => AxisOrient::Left,
            _ => return None,
        };
        let ScaleRange::Interval(r0, r1) = scale.range else {
            return None;
        };
        let ticks = scale
            .ticks(tick_count)
            .into_iter()
            .filter_map(|t| {
                let position = scale.map_number(&t.value)?;
                Some(AxisTick {
                    value: t.value,
                    position,
                    label: t.label,
                })
            })
            .collect();
        Some(Self {
            channel: scale.channel,
            orient,
            kind: scale.kind,
            domain: scale.domain.clone(),
            range: (r0, r1),
            ticks,
            title: title.into(),
            placements: Vec::new(),
        })
    }

    /// Measures the thickness this axis needs along its normal direction.
    ///
    /// This is intended for a measure/arrange layout pass.
    pub fn measure(&self, style: &AxisStyle, measurer: &impl TextMeasurer) -> f64 {
        let tick_extent = style.tick_size.abs() + style.tick_padding.max(0.0);
        let labels = self.ticks.iter().map(|t| t.label.as_str());
        let label_extent = if self.orient.is_horizontal() {
            self.ticks
                .iter()
                .map(|t| measurer.measure(&t.label, style.label_font_size).1)
                .fold(0.0, f64::max)
        } else {
            measurer.max_width(labels, style.label_font_size)
        };
        let title_extent = if self.title.is_empty() {
            0.0
        } else {
            // Vertical axes rotate their title, so height maps to width.
            let (_, h) = measurer.measure(&self.title, style.title_font_size);
            style.title_offset.max(0.0) + h
        };
        tick_extent + label_extent + title_extent
    }

    /// Compares everything but placements.
    pub fn same_guide(&self, other: &Self) -> bool {
        self.channel == other.channel
            && self.orient == other.orient
            && self.kind == other.kind
            && self.domain == other.domain
            && self.range == other.range
            && self.ticks == other.ticks
            && self.title == other.title
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::config::CompileConfig;
    use crate::layout::Size;
    use crate::measure::HeuristicTextMeasurer;
    use crate::scale::{ScaleRequest, synthesize};
    use crate::spec::{MarkKind, ScaleConfig};
    use vizlite_data::DataType;

    fn scale(channel: Channel, data_type: DataType, values: &[Value]) -> Scale {
        let refs: Vec<&Value> = values.iter().collect();
        synthesize(
            &ScaleRequest {
                channel,
                field: "f",
                data_type,
                quantitative_kind: None,
                mark: MarkKind::Bar,
                extent: Size::new(200.0, 100.0),
            },
            &refs,
            &ScaleConfig::default(),
            None,
            &CompileConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn y_axis_ticks_run_up_the_cell() {
        let s = scale(Channel::Y, DataType::Quantitative, &[Value::Number(8.0)]);
        let axis = AxisDescriptor::from_scale(&s, "f", 5).unwrap();
        assert_eq!(axis.orient, AxisOrient::Left);
        let positions: Vec<f64> = axis.ticks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![100.0, 75.0, 50.0, 25.0, 0.0]);
        assert_eq!(axis.ticks[4].label, "8");
    }

    #[test]
    fn band_axis_ticks_sit_at_band_centres() {
        let s = scale(
            Channel::X,
            DataType::Nominal,
            &[Value::from("a"), Value::from("b")],
        );
        let axis = AxisDescriptor::from_scale(&s, "f", 5).unwrap();
        let bw = s.band_width().unwrap();
        assert_eq!(axis.ticks.len(), 2);
        assert!((axis.ticks[0].position - 0.6 * bw).abs() < 1e-9);
        assert_eq!(axis.ticks[1].label, "b");
    }

    #[test]
    fn measure_grows_with_label_width() {
        let m = HeuristicTextMeasurer;
        let style = AxisStyle::default();
        let narrow = scale(Channel::Y, DataType::Quantitative, &[Value::Number(8.0)]);
        let wide = scale(Channel::Y, DataType::Quantitative, &[Value::Number(80_000.0)]);
        let a = AxisDescriptor::from_scale(&narrow, "f", 5).unwrap();
        let b = AxisDescriptor::from_scale(&wide, "f", 5).unwrap();
        assert!(b.measure(&style, &m) > a.measure(&style, &m));

        let x = scale(Channel::X, DataType::Quantitative, &[Value::Number(8.0)]);
        let x = AxisDescriptor::from_scale(&x, "", 5).unwrap();
        assert_eq!(x.measure(&style, &m), 5.0 + 2.0 + 10.0);
    }
}
