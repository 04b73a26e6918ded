// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend descriptors.
//!
//! In Vega, legends are guides that compile into mark groups. Here a legend is a descriptor:
//! a list of entries (symbol legends) or gradient stops, plus the metrics needed to measure
//! and place it. Drawing is left to the renderer.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Shape as _};
use peniko::Color;
use smallvec::SmallVec;
use vizlite_data::{DataType, Value};

use crate::channel::Channel;
use crate::layout::{LegendOrient, Size};
use crate::measure::TextMeasurer;
use crate::symbol::Shape;

/// Where a legend's title sits relative to its body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TitleOrient {
    /// Above the entries.
    #[default]
    Top,
    /// Below the entries.
    Bottom,
    /// Left of the entries.
    Left,
    /// Right of the entries.
    Right,
}

impl TitleOrient {
    /// Parses `"top"`, `"bottom"`, `"left"` or `"right"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => return None,
        })
    }
}

/// Legend metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendStyle {
    /// Swatch square size (and minimum symbol extent).
    pub swatch_size: f64,
    /// Vertical gap between rows.
    pub row_gap: f64,
    /// Horizontal gap between swatch and label.
    pub label_dx: f64,
    /// Label font size.
    pub font_size: f64,
    /// Title font size.
    pub title_font_size: f64,
    /// Gap between title and body.
    pub title_padding: f64,
    /// Length of a gradient ramp.
    pub gradient_length: f64,
    /// Thickness of a gradient ramp.
    pub gradient_thickness: f64,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            swatch_size: 10.0,
            row_gap: 6.0,
            label_dx: 6.0,
            font_size: 10.0,
            title_font_size: 11.0,
            title_padding: 4.0,
            gradient_length: 100.0,
            gradient_thickness: 12.0,
        }
    }
}

/// How a legend draws its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendKind {
    /// One symbol and label per entry.
    Symbol,
    /// A continuous colour ramp with labelled stops.
    Gradient,
}

/// One legend row, or one gradient stop.
///
/// Each visual field is set when the legend includes that channel.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Domain value.
    pub value: Value,
    /// Formatted label.
    pub label: String,
    /// Colour output.
    pub color: Option<Color>,
    /// Size output (area in square pixels).
    pub size: Option<f64>,
    /// Shape output.
    pub shape: Option<Shape>,
    /// Opacity output.
    pub opacity: Option<f64>,
}

impl LegendEntry {
    /// An entry with no channel outputs yet.
    pub fn new(value: Value, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            color: None,
            size: None,
            shape: None,
            opacity: None,
        }
    }
}

/// A legend for one field, possibly shared by several channels.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendDescriptor {
    /// Channels the legend explains, in legend order.
    pub channels: SmallVec<[Channel; 2]>,
    /// Field the channels are bound to.
    pub field: String,
    /// Data type of the field.
    pub data_type: DataType,
    /// Legend title.
    pub title: String,
    /// Symbol or gradient.
    pub kind: LegendKind,
    /// Entries (or gradient stops) in domain order.
    pub entries: Vec<LegendEntry>,
    /// Placement relative to the plot.
    pub orient: LegendOrient,
    /// Placement of the title.
    pub title_orient: TitleOrient,
    /// Position in scene coordinates, filled in by layout.
    pub bounds: Rect,
}

impl LegendDescriptor {
    /// Whether the legend explains `channel`.
    pub fn includes(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    /// Extent of the largest entry symbol.
    pub fn symbol_extent(&self, style: &LegendStyle) -> f64 {
        self.entries
            .iter()
            .filter_map(|e| {
                let area = e.size?;
                let bbox = e.shape.unwrap_or(Shape::Circle).path(Point::ZERO, area).bounding_box();
                Some(bbox.width().max(bbox.height()))
            })
            .fold(style.swatch_size, f64::max)
    }

    /// Measures the desired legend size (width/height).
    pub fn measure(&self, style: &LegendStyle, measurer: &impl TextMeasurer) -> Size {
        let label_w = measurer.max_width(
            self.entries.iter().map(|e| e.label.as_str()),
            style.font_size,
        );
        let (body_w, body_h) = match self.kind {
            LegendKind::Symbol => {
                let n = self.entries.len() as f64;
                let row = self.symbol_extent(style).max(style.font_size);
                let h = if n > 0.0 {
                    n * row + (n - 1.0) * style.row_gap
                } else {
                    0.0
                };
                (self.symbol_extent(style) + style.label_dx + label_w, h)
            }
            LegendKind::Gradient => (
                style.gradient_thickness + style.label_dx + label_w,
                style.gradient_length,
            ),
        };
        if self.title.is_empty() {
            return Size::new(body_w, body_h);
        }
        let (tw, th) = measurer.measure(&self.title, style.title_font_size);
        let pad = style.title_padding.max(0.0);
        match self.title_orient {
            TitleOrient::Top | TitleOrient::Bottom => {
                Size::new(body_w.max(tw), body_h + pad + th)
            }
            TitleOrient::Left | TitleOrient::Right => {
                Size::new(body_w + pad + tw, body_h.max(th))
            }
        }
    }

    /// Compares everything but bounds.
    pub fn same_guide(&self, other: &Self) -> bool {
        self.channels == other.channels
            && self.field == other.field
            && self.data_type == other.data_type
            && self.title == other.title
            && self.kind == other.kind
            && self.entries == other.entries
            && self.orient == other.orient
            && self.title_orient == other.title_orient
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::measure::HeuristicTextMeasurer;

    fn legend(labels: &[&str], kind: LegendKind) -> LegendDescriptor {
        LegendDescriptor {
            channels: smallvec::smallvec![Channel::Color],
            field: "f".into(),
            data_type: DataType::Nominal,
            title: "f".into(),
            kind,
            entries: labels
                .iter()
                .map(|l| LegendEntry::new(Value::from(*l), *l))
                .collect(),
            orient: LegendOrient::Right,
            title_orient: TitleOrient::Top,
            bounds: Rect::ZERO,
        }
    }

    #[test]
    fn symbol_legend_measures_rows_and_widest_label() {
        let style = LegendStyle::default();
        let size =
            legend(&["a", "bbbb"], LegendKind::Symbol).measure(&style, &HeuristicTextMeasurer);
        // Swatch + gap + 4 glyphs at 6px.
        assert_eq!(size.width, 10.0 + 6.0 + 24.0);
        // Two 10px rows, one gap, title padding and an 11px title.
        assert_eq!(size.height, 10.0 + 6.0 + 10.0 + 4.0 + 11.0);
    }

    #[test]
    fn side_titles_widen_the_legend() {
        let style = LegendStyle::default();
        let mut l = legend(&["a"], LegendKind::Gradient);
        let top = l.measure(&style, &HeuristicTextMeasurer);
        l.title_orient = TitleOrient::Left;
        let left = l.measure(&style, &HeuristicTextMeasurer);
        assert!(left.width > top.width);
        assert_eq!(left.height, style.gradient_length);
    }

    #[test]
    fn larger_symbols_grow_rows() {
        let style = LegendStyle::default();
        let mut l = legend(&["a"], LegendKind::Symbol);
        l.entries[0].size = Some(400.0);
        l.entries[0].shape = Some(Shape::Square);
        assert!((l.symbol_extent(&style) - 20.0).abs() < 1e-9);
        assert!(l.same_guide(&l.clone()));
        let moved = LegendDescriptor {
            bounds: Rect::new(1.0, 1.0, 2.0, 2.0),
            ..l.clone()
        };
        assert!(moved.same_guide(&l));
    }
}
