// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiler defaults.

extern crate alloc;

use alloc::vec::Vec;

use peniko::Color;

use crate::axis::AxisStyle;
use crate::layout::LegendOrient;
use crate::legend::{LegendStyle, TitleOrient};
use crate::palette;
use crate::symbol::Shape;

/// Every default the compiler applies, passed explicitly to each stage.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileConfig {
    /// View width used when a view does not set one.
    pub width: f64,
    /// View height used when a view does not set one.
    pub height: f64,
    /// Approximate tick count, also used to pick nice domain steps.
    pub tick_count: usize,
    /// Inner padding of band scales, in band units.
    pub band_padding_inner: f64,
    /// Outer padding of band scales, in band units.
    pub band_padding_outer: f64,
    /// Default size range, in square pixels.
    pub size_range: (f64, f64),
    /// Default opacity range.
    pub opacity_range: (f64, f64),
    /// Symbol area used without a size binding.
    pub default_point_area: f64,
    /// Opacity of filled marks without an opacity binding.
    pub filled_opacity: f64,
    /// Mark colour used without a colour binding.
    pub default_color: Color,
    /// Qualitative palette for nominal colour scales.
    pub categorical: Vec<Color>,
    /// Gradient stops for ordinal and continuous colour scales.
    pub sequential: Vec<Color>,
    /// Shape palette.
    pub shapes: Vec<Shape>,
    /// Thickness of bars and rect cells positioned on a continuous axis.
    pub continuous_band_size: f64,
    /// Length of tick marks that are not on a band.
    pub tick_length: f64,
    /// Font size of text marks.
    pub text_font_size: f64,
    /// Gap between facet cells.
    pub facet_spacing: f64,
    /// Font size of facet headers.
    pub header_font_size: f64,
    /// Default legend orientation.
    pub legend_orient: LegendOrient,
    /// Default legend title orientation.
    pub legend_title_orient: TitleOrient,
    /// Distance between the plot (and its axes) and legends.
    pub legend_offset: f64,
    /// Gap between stacked legends.
    pub legend_spacing: f64,
    /// Padding around the whole scene.
    pub outer_padding: f64,
    /// Axis metrics.
    pub axis: AxisStyle,
    /// Legend metrics.
    pub legend: LegendStyle,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            tick_count: 5,
            band_padding_inner: 0.1,
            band_padding_outer: 0.1,
            size_range: (0.0, 1000.0),
            opacity_range: (0.0, 1.0),
            default_point_area: 30.0,
            filled_opacity: 0.7,
            default_color: palette::CATEGORICAL[0],
            categorical: palette::CATEGORICAL.to_vec(),
            sequential: palette::SEQUENTIAL.to_vec(),
            shapes: Shape::PALETTE.to_vec(),
            continuous_band_size: 5.0,
            tick_length: 14.0,
            text_font_size: 11.0,
            facet_spacing: 20.0,
            header_font_size: 11.0,
            legend_orient: LegendOrient::Right,
            legend_title_orient: TitleOrient::Top,
            legend_offset: 18.0,
            legend_spacing: 12.0,
            outer_padding: 5.0,
            axis: AxisStyle::default(),
            legend: LegendStyle::default(),
        }
    }
}

impl CompileConfig {
    /// Creates a config with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default view size.
    pub fn with_view_size(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self
    }

    /// Sets the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count.max(1);
        self
    }

    /// Sets band padding (inner, outer) in band units.
    pub fn with_band_padding(mut self, inner: f64, outer: f64) -> Self {
        self.band_padding_inner = inner.max(0.0);
        self.band_padding_outer = outer.max(0.0);
        self
    }

    /// Sets the default size range (square pixels).
    pub fn with_size_range(mut self, min: f64, max: f64) -> Self {
        self.size_range = (min, max);
        self
    }

    /// Sets the default opacity range.
    pub fn with_opacity_range(mut self, min: f64, max: f64) -> Self {
        self.opacity_range = (min, max);
        self
    }

    /// Sets the symbol area used without a size binding.
    pub fn with_default_point_area(mut self, area: f64) -> Self {
        self.default_point_area = area.max(0.0);
        self
    }

    /// Sets the opacity of filled marks without an opacity binding.
    pub fn with_filled_opacity(mut self, opacity: f64) -> Self {
        self.filled_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Sets the mark colour used without a colour binding.
    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Replaces the qualitative palette.
    pub fn with_categorical(mut self, colors: Vec<Color>) -> Self {
        self.categorical = colors;
        self
    }

    /// Replaces the sequential gradient stops.
    pub fn with_sequential(mut self, colors: Vec<Color>) -> Self {
        self.sequential = colors;
        self
    }

    /// Replaces the shape palette.
    pub fn with_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.shapes = shapes;
        self
    }

    /// Sets the thickness of bars/cells on continuous axes.
    pub fn with_continuous_band_size(mut self, size: f64) -> Self {
        self.continuous_band_size = size.max(0.0);
        self
    }

    /// Sets the default tick mark length.
    pub fn with_tick_length(mut self, length: f64) -> Self {
        self.tick_length = length.max(0.0);
        self
    }

    /// Sets the font size of text marks.
    pub fn with_text_font_size(mut self, font_size: f64) -> Self {
        self.text_font_size = font_size;
        self
    }

    /// Sets the gap between facet cells.
    pub fn with_facet_spacing(mut self, spacing: f64) -> Self {
        self.facet_spacing = spacing.max(0.0);
        self
    }

    /// Sets the default legend orientation.
    pub fn with_legend_orient(mut self, orient: LegendOrient) -> Self {
        self.legend_orient = orient;
        self
    }

    /// Sets the default legend title orientation.
    pub fn with_legend_title_orient(mut self, orient: TitleOrient) -> Self {
        self.legend_title_orient = orient;
        self
    }

    /// Sets the padding around the whole scene.
    pub fn with_outer_padding(mut self, padding: f64) -> Self {
        self.outer_padding = padding.max(0.0);
        self
    }

    /// Sets axis metrics.
    pub fn with_axis_style(mut self, style: AxisStyle) -> Self {
        self.axis = style;
        self
    }

    /// Sets legend metrics.
    pub fn with_legend_style(mut self, style: LegendStyle) -> Self {
        self.legend = style;
        self
    }
}
