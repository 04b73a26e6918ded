// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compile pipeline.
//!
//! filters → aggregation → facet partition → encoding resolution (scales) → geometry →
//! guides → guide hoisting → layout.

extern crate alloc;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use vizlite_data::{AggregateField, AggregateOp, Dataset, ParamLookup, ValueKey, aggregate};

use crate::axis::AxisDescriptor;
use crate::channel::Channel;
use crate::config::CompileConfig;
use crate::encoding::{check_duplicates, resolve};
use crate::error::CompileError;
use crate::facet::partition;
use crate::geometry::{PositionedPrimitive, build};
use crate::guides::{Guides, default_title, generate};
use crate::layout::{AxisStrip, LegendPlacement, SceneLayout, SceneLayoutSpec, Size};
use crate::legend::LegendDescriptor;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::params::ParamStore;
use crate::scene::{FacetHeader, SceneCell, SceneDescriptor};
use crate::spec::{ChartSpec, EncodingBinding, ViewSpec};

/// Padding around facet header text.
const HEADER_PADDING: f64 = 4.0;

/// Compiles `spec` over `data` with parameters at their initial values.
pub fn compile(
    spec: &ChartSpec,
    data: &Dataset,
    config: &CompileConfig,
) -> Result<SceneDescriptor, CompileError> {
    compile_with(spec, data, config, &HeuristicTextMeasurer)
}

/// Like [`compile`], measuring guide text with `measurer`.
pub fn compile_with<M: TextMeasurer>(
    spec: &ChartSpec,
    data: &Dataset,
    config: &CompileConfig,
    measurer: &M,
) -> Result<SceneDescriptor, CompileError> {
    let params = ParamStore::new(&spec.params)?;
    let filtered = apply_filters(spec, data, &params)?;
    compile_filtered(spec, &filtered, config, measurer)
}

/// Applies the chart's filters in order. Row keys are preserved.
pub fn apply_filters(
    spec: &ChartSpec,
    data: &Dataset,
    params: &dyn ParamLookup,
) -> Result<Dataset, CompileError> {
    let mut out = data.clone();
    for filter in &spec.filters {
        out = out.filter(filter, params)?;
    }
    log::debug!(
        "filters: kept {} of {} rows",
        out.row_count(),
        data.row_count()
    );
    Ok(out)
}

/// A view over (possibly) aggregated data.
struct Prepared<'a> {
    view: ViewSpec,
    data: Cow<'a, Dataset>,
    /// Source row keys behind each aggregated row key.
    sources: Option<HashMap<u64, Vec<u64>>>,
}

/// Aggregates `data` when any binding asks for it.
///
/// Rows are grouped by every non-aggregated bound field. Aggregated bindings are rewritten to
/// read the aggregate output, keeping their default title.
fn prepare<'a>(view: &ViewSpec, data: &'a Dataset) -> Result<Prepared<'a>, CompileError> {
    let aggregated = view
        .encodings
        .iter()
        .any(|b| b.as_field().is_some_and(|f| f.aggregate.is_some()));
    if !aggregated {
        return Ok(Prepared {
            view: view.clone(),
            data: Cow::Borrowed(data),
            sources: None,
        });
    }

    let mut rewritten = view.clone();
    let mut group_by: Vec<String> = Vec::new();
    let mut fields: Vec<AggregateField> = Vec::new();
    for binding in &mut rewritten.encodings {
        let EncodingBinding::Field(f) = binding else {
            continue;
        };
        let known = data.column_index(&f.field).is_some();
        let unknown = CompileError::UnknownField {
            channel: f.channel,
            field: f.field.clone(),
        };
        match f.aggregate {
            None => {
                if !known {
                    return Err(unknown);
                }
                if !group_by.contains(&f.field) {
                    group_by.push(f.field.clone());
                }
            }
            Some(op) => {
                let out = if op == AggregateOp::Count {
                    AggregateField::count()
                } else if known {
                    AggregateField::new(op, f.field.clone())
                } else {
                    return Err(unknown);
                };
                if f.title.is_none() {
                    f.title = Some(default_title(f));
                }
                f.field = out.output.clone();
                f.aggregate = None;
                if !fields.iter().any(|g| g.output == out.output) {
                    fields.push(out);
                }
            }
        }
    }

    let out = aggregate(data, &group_by, &fields)?;

    // Regroup the input the same way to recover each group's source rows.
    let cols: Vec<usize> = group_by
        .iter()
        .filter_map(|name| data.column_index(name))
        .collect();
    let mut index: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    let mut members: Vec<Vec<u64>> = Vec::new();
    for row in &data.rows {
        let key: Vec<ValueKey> = cols.iter().map(|&c| row.values[c].key()).collect();
        let slot = *index.entry(key).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        members[slot].push(row.key);
    }
    let sources = out.rows.iter().map(|r| r.key).zip(members).collect();
    log::debug!(
        "aggregate: {} rows into {} groups by {group_by:?}",
        data.row_count(),
        out.row_count()
    );
    Ok(Prepared {
        view: rewritten,
        data: Cow::Owned(out),
        sources: Some(sources),
    })
}

/// Splits `total` among `n` cells separated by `spacing`.
fn share(total: f64, n: usize, spacing: f64) -> f64 {
    let n = n.max(1) as f64;
    ((total - spacing * (n - 1.0)) / n).max(1.0)
}

/// Compiles `spec` over an already filtered dataset.
pub fn compile_filtered<M: TextMeasurer>(
    spec: &ChartSpec,
    data: &Dataset,
    config: &CompileConfig,
    measurer: &M,
) -> Result<SceneDescriptor, CompileError> {
    check_duplicates(&spec.view)?;
    let prepared = prepare(&spec.view, data)?;
    let view = &prepared.view;
    let data = prepared.data.as_ref();
    let all: Vec<usize> = (0..data.row_count()).collect();

    let column_binding = view.binding(Channel::Column).and_then(EncodingBinding::as_field);
    let row_binding = view.binding(Channel::Row).and_then(EncodingBinding::as_field);
    let facets = partition(data, &all, column_binding, row_binding)?;
    let columns = facets.iter().map(|c| c.column_index + 1).max().unwrap_or(1);
    let rows = facets.iter().map(|c| c.row_index + 1).max().unwrap_or(1);

    let spacing = config.facet_spacing.max(0.0);
    let cell = Size::new(
        spec.facet
            .cell_width
            .unwrap_or_else(|| share(view.width.unwrap_or(config.width), columns, spacing)),
        spec.facet
            .cell_height
            .unwrap_or_else(|| share(view.height.unwrap_or(config.height), rows, spacing)),
    );

    let shared = if spec.facet.independent_scales {
        None
    } else {
        Some(resolve(view, data, &all, cell, config)?)
    };
    let shared_guides = shared.as_ref().map(|enc| generate(enc, config));

    let mut marks: Vec<Vec<PositionedPrimitive>> = Vec::with_capacity(facets.len());
    let mut guides: Vec<Option<Guides>> = Vec::with_capacity(facets.len());
    for facet in &facets {
        let (m, g) = match &shared {
            Some(enc) => (
                build(&view.mark, enc, data, &facet.rows, cell, config)?,
                shared_guides.clone(),
            ),
            // Empty cells have nothing to resolve scales from.
            None if facet.rows.is_empty() => (Vec::new(), None),
            None => {
                let enc = resolve(view, data, &facet.rows, cell, config)?;
                (
                    build(&view.mark, &enc, data, &facet.rows, cell, config)?,
                    Some(generate(&enc, config)),
                )
            }
        };
        marks.push(m);
        guides.push(g);
    }

    if let Some(sources) = &prepared.sources {
        for p in marks.iter_mut().flatten() {
            p.rows = p
                .rows
                .iter()
                .flat_map(|k| sources.get(k).into_iter().flatten().copied())
                .collect();
        }
    }

    // Hoist guides that every populated cell agrees on.
    let present: Vec<&Guides> = guides.iter().flatten().collect();
    let mut shared_axes: Vec<AxisDescriptor> = Vec::new();
    for channel in [Channel::X, Channel::Y] {
        let mut found = present
            .iter()
            .map(|g| g.axes.iter().find(|a| a.channel == channel));
        let Some(Some(first)) = found.next() else {
            continue;
        };
        if found.all(|a| a.is_some_and(|a| a.same_guide(first))) {
            shared_axes.push(first.clone());
        }
    }
    let mut shared_legends: Vec<LegendDescriptor> = Vec::new();
    if let Some((first, rest)) = present.split_first() {
        for legend in &first.legends {
            if rest
                .iter()
                .all(|g| g.legends.iter().any(|l| l.same_guide(legend)))
            {
                shared_legends.push(legend.clone());
            }
        }
    }
    let mut cell_axes: Vec<Vec<AxisDescriptor>> = Vec::with_capacity(guides.len());
    let mut cell_legends: Vec<Vec<LegendDescriptor>> = Vec::with_capacity(guides.len());
    for g in guides {
        let g = g.unwrap_or_default();
        cell_axes.push(
            g.axes
                .into_iter()
                .filter(|a| !shared_axes.iter().any(|s| s.channel == a.channel))
                .collect(),
        );
        cell_legends.push(
            g.legends
                .into_iter()
                .filter(|l| !shared_legends.iter().any(|s| s.same_guide(l)))
                .collect(),
        );
    }

    // Measure.
    let axis_strip = |channel: Channel| -> Option<AxisStrip> {
        let thickness = shared_axes
            .iter()
            .chain(cell_axes.iter().flatten())
            .filter(|a| a.channel == channel)
            .map(|a| a.measure(&config.axis, measurer))
            .reduce(f64::max)?;
        Some(AxisStrip {
            thickness,
            per_cell: !shared_axes.iter().any(|a| a.channel == channel),
        })
    };
    let column_values: Vec<String> = (0..columns)
        .filter_map(|ci| {
            let f = facets.iter().find(|f| f.row_index == 0 && f.column_index == ci)?;
            Some(alloc::format!("{}", f.column.as_ref()?))
        })
        .collect();
    let row_values: Vec<String> = (0..rows)
        .filter_map(|ri| {
            let f = facets.iter().find(|f| f.column_index == 0 && f.row_index == ri)?;
            Some(alloc::format!("{}", f.row.as_ref()?))
        })
        .collect();
    let column_header = if column_values.is_empty() {
        0.0
    } else {
        column_values
            .iter()
            .map(|t| measurer.measure(t, config.header_font_size).1)
            .fold(0.0, f64::max)
            + 2.0 * HEADER_PADDING
    };
    let row_header = if row_values.is_empty() {
        0.0
    } else {
        measurer.max_width(row_values.iter().map(String::as_str), config.header_font_size)
            + 2.0 * HEADER_PADDING
    };
    let legend_boxes = shared_legends
        .iter()
        .chain(cell_legends.iter().flatten())
        .map(|l| {
            (
                l.measure(&config.legend, measurer),
                LegendPlacement {
                    orient: l.orient,
                    offset: config.legend_offset,
                },
            )
        })
        .collect();

    // Arrange.
    let layout = SceneLayout::arrange(&SceneLayoutSpec {
        columns,
        rows,
        cell_size: cell,
        spacing,
        outer_padding: config.outer_padding,
        axis_left: axis_strip(Channel::Y),
        axis_bottom: axis_strip(Channel::X),
        column_header,
        row_header,
        legends: legend_boxes,
        legend_spacing: config.legend_spacing,
    });

    for axis in &mut shared_axes {
        axis.placements = match axis.channel {
            Channel::Y => (0..rows)
                .filter_map(|r| layout.axis_left[r * columns])
                .collect(),
            _ => (0..columns)
                .filter_map(|c| layout.axis_bottom[(rows - 1) * columns + c])
                .collect(),
        };
    }
    let mut legend_rects = layout.legends.iter().copied();
    for legend in shared_legends.iter_mut().chain(cell_legends.iter_mut().flatten()) {
        legend.bounds = legend_rects.next().unwrap_or_default();
    }

    let mut cells = Vec::with_capacity(facets.len());
    for (i, ((facet, marks), (mut axes, legends))) in facets
        .into_iter()
        .zip(marks)
        .zip(cell_axes.into_iter().zip(cell_legends))
        .enumerate()
    {
        for axis in &mut axes {
            let strip = match axis.channel {
                Channel::Y => layout.axis_left[i],
                _ => layout.axis_bottom[i],
            };
            axis.placements = strip.into_iter().collect();
        }
        cells.push(SceneCell {
            column: facet.column,
            row: facet.row,
            bounds: layout.cells[i],
            marks,
            axes,
            legends,
        });
    }

    let headers = column_values
        .into_iter()
        .zip(&layout.column_headers)
        .chain(row_values.into_iter().zip(&layout.row_headers))
        .map(|(text, &bounds)| FacetHeader { text, bounds })
        .collect();

    let scene = SceneDescriptor {
        view: layout.view,
        plot: layout.plot,
        cells,
        axes: shared_axes,
        legends: shared_legends,
        headers,
    };
    log::debug!(
        "scene: {}x{} cells, {} marks, {} legends",
        columns,
        rows,
        scene.mark_count(),
        scene.all_legends().count()
    );
    Ok(scene)
}
