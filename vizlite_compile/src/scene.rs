// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiled scene descriptions.
//!
//! A [`SceneDescriptor`] is plain data owned by the caller. Renderers walk the cells, offset
//! each cell's marks by the cell origin, and draw axes and legends where layout put them.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use vizlite_data::Value;

use crate::axis::AxisDescriptor;
use crate::channel::Channel;
use crate::geometry::PositionedPrimitive;
use crate::legend::LegendDescriptor;

/// A facet header label.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetHeader {
    /// Header text (the facet value).
    pub text: String,
    /// Header rectangle in scene coordinates.
    pub bounds: Rect,
}

/// One view, or one cell of a facet grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneCell {
    /// Column facet value.
    pub column: Option<Value>,
    /// Row facet value.
    pub row: Option<Value>,
    /// Cell rectangle in scene coordinates. Mark coordinates are relative to its origin.
    pub bounds: Rect,
    /// Marks in draw order.
    pub marks: Vec<PositionedPrimitive>,
    /// Axes specific to this cell.
    pub axes: Vec<AxisDescriptor>,
    /// Legends specific to this cell.
    pub legends: Vec<LegendDescriptor>,
}

/// A compiled, positioned scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescriptor {
    /// Outer bounds of the whole scene.
    pub view: Rect,
    /// Union of the cell rectangles.
    pub plot: Rect,
    /// Cells, row-major.
    pub cells: Vec<SceneCell>,
    /// Axes shared by every cell.
    pub axes: Vec<AxisDescriptor>,
    /// Legends shared by every cell.
    pub legends: Vec<LegendDescriptor>,
    /// Facet headers, columns first.
    pub headers: Vec<FacetHeader>,
}

impl SceneDescriptor {
    /// Iterates over every mark of every cell.
    pub fn marks(&self) -> impl Iterator<Item = &PositionedPrimitive> + '_ {
        self.cells.iter().flat_map(|c| c.marks.iter())
    }

    /// Total number of marks.
    pub fn mark_count(&self) -> usize {
        self.cells.iter().map(|c| c.marks.len()).sum()
    }

    /// Iterates over shared and per-cell axes.
    pub fn all_axes(&self) -> impl Iterator<Item = &AxisDescriptor> + '_ {
        self.axes
            .iter()
            .chain(self.cells.iter().flat_map(|c| c.axes.iter()))
    }

    /// Iterates over shared and per-cell legends.
    pub fn all_legends(&self) -> impl Iterator<Item = &LegendDescriptor> + '_ {
        self.legends
            .iter()
            .chain(self.cells.iter().flat_map(|c| c.legends.iter()))
    }

    /// The shared axis for `channel`.
    pub fn axis(&self, channel: Channel) -> Option<&AxisDescriptor> {
        self.axes.iter().find(|a| a.channel == channel)
    }

    /// The shared legend that includes `channel`.
    pub fn legend(&self, channel: Channel) -> Option<&LegendDescriptor> {
        self.legends.iter().find(|l| l.includes(channel))
    }
}
