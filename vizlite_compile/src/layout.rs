// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny measure/arrange layout helper for scenes.
//!
//! This follows the same basic shape as WPF-style layout:
//! - **Measure**: guides (axes, legends, facet headers) report their desired extents.
//! - **Arrange**: cells are placed on a grid and guides around it based on orientation.
//!
//! A single view is a 1×1 grid.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;

/// A width/height pair used by scene layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in scene units.
    pub width: f64,
    /// Height in scene units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Legend orientation settings, matching Vega’s core options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LegendOrient {
    /// Place the legend to the left of the chart.
    Left,
    /// Place the legend to the right of the chart.
    #[default]
    Right,
    /// Place the legend above the chart.
    Top,
    /// Place the legend below the chart.
    Bottom,
    /// Place the legend inside the upper-left corner of the plot.
    TopLeft,
    /// Place the legend inside the upper-right corner of the plot.
    TopRight,
    /// Place the legend inside the lower-left corner of the plot.
    BottomLeft,
    /// Place the legend inside the lower-right corner of the plot.
    BottomRight,
}

impl LegendOrient {
    /// Returns the grammar name (`"top-left"` etc.).
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Parses a grammar name. Vega's camel-case spellings are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "left" => Self::Left,
            "right" => Self::Right,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "top-left" | "topLeft" => Self::TopLeft,
            "top-right" | "topRight" => Self::TopRight,
            "bottom-left" | "bottomLeft" => Self::BottomLeft,
            "bottom-right" | "bottomRight" => Self::BottomRight,
            _ => return None,
        })
    }
}

/// Legend placement options (orientation + offset).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendPlacement {
    /// Legend orientation.
    pub orient: LegendOrient,
    /// Offset away from the plot and axes (or inward for corners).
    pub offset: f64,
}

impl Default for LegendPlacement {
    fn default() -> Self {
        Self {
            orient: LegendOrient::Right,
            offset: 18.0,
        }
    }
}

/// An axis strip reserved beside cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisStrip {
    /// Thickness of the strip.
    pub thickness: f64,
    /// Whether every cell gets its own strip, or only the outer column/row.
    pub per_cell: bool,
}

/// Layout inputs for a scene: a grid of equally sized cells plus guides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLayoutSpec {
    /// Number of grid columns (at least one).
    pub columns: usize,
    /// Number of grid rows (at least one).
    pub rows: usize,
    /// Size of every cell.
    pub cell_size: Size,
    /// Gap between neighbouring cells (after their axis strips).
    pub spacing: f64,
    /// Extra padding around the whole scene (applied on all sides).
    pub outer_padding: f64,
    /// Strip for left (y) axes.
    pub axis_left: Option<AxisStrip>,
    /// Strip for bottom (x) axes.
    pub axis_bottom: Option<AxisStrip>,
    /// Height of the column header band above the grid (0 for none).
    pub column_header: f64,
    /// Width of the row header band left of the grid (0 for none).
    pub row_header: f64,
    /// Legends, in stacking order, given by their desired size and placement.
    pub legends: Vec<(Size, LegendPlacement)>,
    /// Gap between legends stacked on the same side.
    pub legend_spacing: f64,
}

/// Output of the arrange pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayout {
    /// Outer scene bounds.
    pub view: Rect,
    /// Union of all cell rectangles.
    pub plot: Rect,
    /// The plot plus its axis strips and headers.
    pub frame: Rect,
    /// Cell rectangles, row-major.
    pub cells: Vec<Rect>,
    /// Left axis strip of each cell (row-major), if it has one.
    pub axis_left: Vec<Option<Rect>>,
    /// Bottom axis strip of each cell (row-major), if it has one.
    pub axis_bottom: Vec<Option<Rect>>,
    /// One header rectangle per column (empty without column headers).
    pub column_headers: Vec<Rect>,
    /// One header rectangle per row (empty without row headers).
    pub row_headers: Vec<Rect>,
    /// Legend rectangles, in input order.
    pub legends: Vec<Rect>,
}

impl SceneLayout {
    /// Computes a layout from the provided specification.
    pub fn arrange(spec: &SceneLayoutSpec) -> Self {
        let columns = spec.columns.max(1);
        let rows = spec.rows.max(1);
        let outer = spec.outer_padding.max(0.0);
        let spacing = spec.spacing.max(0.0);
        let cell_w = spec.cell_size.width.max(0.0);
        let cell_h = spec.cell_size.height.max(0.0);
        let column_header = spec.column_header.max(0.0);
        let row_header = spec.row_header.max(0.0);

        let side = |orient: LegendOrient, horizontal: bool| -> f64 {
            spec.legends
                .iter()
                .filter(|(_, p)| p.orient == orient)
                .map(|(s, p)| {
                    let extent = if horizontal { s.width } else { s.height };
                    extent.max(0.0) + p.offset.max(0.0)
                })
                .fold(0.0, f64::max)
        };
        let margin_left = outer + side(LegendOrient::Left, true);
        let margin_right = outer + side(LegendOrient::Right, true);
        let margin_top = outer + side(LegendOrient::Top, false);
        let margin_bottom = outer + side(LegendOrient::Bottom, false);

        let strip = |s: Option<AxisStrip>, index: usize, outer_index: usize| -> f64 {
            match s {
                Some(s) if s.per_cell || index == outer_index => s.thickness.max(0.0),
                _ => 0.0,
            }
        };

        let mut col_x = Vec::with_capacity(columns);
        let mut x = margin_left + row_header;
        for c in 0..columns {
            x += strip(spec.axis_left, c, 0);
            col_x.push(x);
            x += cell_w;
            if c + 1 < columns {
                x += spacing;
            }
        }
        let frame_x1 = x;

        let mut row_y = Vec::with_capacity(rows);
        let mut y = margin_top + column_header;
        for r in 0..rows {
            row_y.push(y);
            y += cell_h + strip(spec.axis_bottom, r, rows - 1);
            if r + 1 < rows {
                y += spacing;
            }
        }
        let frame_y1 = y;

        let mut cells = Vec::with_capacity(columns * rows);
        let mut axis_left = Vec::with_capacity(columns * rows);
        let mut axis_bottom = Vec::with_capacity(columns * rows);
        for (r, &y0) in row_y.iter().enumerate() {
            for (c, &x0) in col_x.iter().enumerate() {
                let cell = Rect::new(x0, y0, x0 + cell_w, y0 + cell_h);
                cells.push(cell);
                let left = strip(spec.axis_left, c, 0);
                axis_left.push(
                    (spec.axis_left.is_some() && left > 0.0)
                        .then(|| Rect::new(cell.x0 - left, cell.y0, cell.x0, cell.y1)),
                );
                let bottom = strip(spec.axis_bottom, r, rows - 1);
                axis_bottom.push(
                    (spec.axis_bottom.is_some() && bottom > 0.0)
                        .then(|| Rect::new(cell.x0, cell.y1, cell.x1, cell.y1 + bottom)),
                );
            }
        }

        let plot = Rect::new(
            col_x[0],
            row_y[0],
            col_x[columns - 1] + cell_w,
            row_y[rows - 1] + cell_h,
        );
        let frame = Rect::new(margin_left, margin_top, frame_x1, frame_y1);

        let column_headers = if column_header > 0.0 {
            col_x
                .iter()
                .map(|&x0| Rect::new(x0, plot.y0 - column_header, x0 + cell_w, plot.y0))
                .collect()
        } else {
            Vec::new()
        };
        let row_headers = if row_header > 0.0 {
            row_y
                .iter()
                .map(|&y0| Rect::new(margin_left, y0, margin_left + row_header, y0 + cell_h))
                .collect()
        } else {
            Vec::new()
        };

        let legends = stack_legends(frame, plot, &spec.legends, spec.legend_spacing.max(0.0));

        let view = Rect::new(0.0, 0.0, frame.x1 + margin_right, frame.y1 + margin_bottom);

        Self {
            view,
            plot,
            frame,
            cells,
            axis_left,
            axis_bottom,
            column_headers,
            row_headers,
            legends,
        }
    }

    /// Returns the rectangle of the cell at `(column, row)`.
    pub fn cell(&self, column: usize, row: usize) -> Option<Rect> {
        let columns = self.column_count();
        if column >= columns {
            return None;
        }
        self.cells.get(row * columns + column).copied()
    }

    fn column_count(&self) -> usize {
        let first_row = self.cells.first().map(|c| c.y0);
        self.cells
            .iter()
            .take_while(|c| Some(c.y0) == first_row)
            .count()
            .max(1)
    }
}

/// Places legends beside `frame` (or inside `plot` for corners), stacking legends that share
/// an orientation.
fn stack_legends(
    frame: Rect,
    plot: Rect,
    legends: &[(Size, LegendPlacement)],
    gap: f64,
) -> Vec<Rect> {
    // One cursor per orientation: the next free coordinate along the stacking direction.
    let mut cursors: Vec<(LegendOrient, f64)> = Vec::new();
    let mut out = Vec::with_capacity(legends.len());
    for &(size, placement) in legends {
        let w = size.width.max(0.0);
        let h = size.height.max(0.0);
        let offset = placement.offset.max(0.0);
        let start = match placement.orient {
            LegendOrient::Right | LegendOrient::Left => plot.y0,
            LegendOrient::Top | LegendOrient::Bottom => plot.x0,
            LegendOrient::TopLeft | LegendOrient::TopRight => plot.y0 + offset,
            LegendOrient::BottomLeft | LegendOrient::BottomRight => plot.y1 - offset,
        };
        let slot = match cursors.iter().position(|(o, _)| *o == placement.orient) {
            Some(i) => i,
            None => {
                cursors.push((placement.orient, start));
                cursors.len() - 1
            }
        };
        let cursor = &mut cursors[slot].1;
        let at = *cursor;
        let rect = match placement.orient {
            LegendOrient::Right => {
                *cursor += h + gap;
                Rect::new(frame.x1 + offset, at, frame.x1 + offset + w, at + h)
            }
            LegendOrient::Left => {
                *cursor += h + gap;
                Rect::new(frame.x0 - offset - w, at, frame.x0 - offset, at + h)
            }
            LegendOrient::Top => {
                *cursor += w + gap;
                Rect::new(at, frame.y0 - offset - h, at + w, frame.y0 - offset)
            }
            LegendOrient::Bottom => {
                *cursor += w + gap;
                Rect::new(at, frame.y1 + offset, at + w, frame.y1 + offset + h)
            }
            LegendOrient::TopLeft => {
                *cursor += h + gap;
                Rect::new(plot.x0 + offset, at, plot.x0 + offset + w, at + h)
            }
            LegendOrient::TopRight => {
                *cursor += h + gap;
                Rect::new(plot.x1 - offset - w, at, plot.x1 - offset, at + h)
            }
            LegendOrient::BottomLeft => {
                *cursor -= h + gap;
                Rect::new(plot.x0 + offset, at - h, plot.x0 + offset + w, at)
            }
            LegendOrient::BottomRight => {
                *cursor -= h + gap;
                Rect::new(plot.x1 - offset - w, at - h, plot.x1 - offset, at)
            }
        };
        out.push(rect);
    }
    out
}
