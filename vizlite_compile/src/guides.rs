// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis and legend generation from resolved encodings.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use vizlite_data::{AggregateOp, Value};

use crate::axis::AxisDescriptor;
use crate::channel::Channel;
use crate::config::CompileConfig;
use crate::encoding::{ResolvedEncodings, ResolvedField};
use crate::legend::{LegendDescriptor, LegendEntry, LegendKind};
use crate::scale::{Scale, ScaleDomain, ScaleTick};
use crate::spec::{FieldBinding, LegendSetting};

/// Legend channels, in legend order.
const LEGEND_CHANNELS: [Channel; 4] = [
    Channel::Color,
    Channel::Size,
    Channel::Shape,
    Channel::Opacity,
];

/// Guides of one view (or facet cell).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Guides {
    /// Axes, x before y.
    pub axes: Vec<AxisDescriptor>,
    /// Legends, in legend order.
    pub legends: Vec<LegendDescriptor>,
}

/// Default title of a binding: the field name, or `"Sum of f"` style text when aggregated.
pub fn default_title(binding: &FieldBinding) -> String {
    match binding.aggregate {
        None => binding.field.clone(),
        Some(AggregateOp::Count) => "Count of Records".into(),
        Some(op) => {
            let name = op.name();
            let mut chars = name.chars();
            let head: String = chars.next().map(|c| c.to_ascii_uppercase()).into_iter().collect();
            format!("{head}{} of {}", chars.as_str(), binding.field)
        }
    }
}

fn title(binding: &FieldBinding) -> String {
    binding.title.clone().unwrap_or_else(|| default_title(binding))
}

/// Builds axes for position scales and legends for magnitude and identity scales.
pub fn generate(enc: &ResolvedEncodings, config: &CompileConfig) -> Guides {
    let axes: Vec<AxisDescriptor> = [Channel::X, Channel::Y]
        .into_iter()
        .filter_map(|c| {
            let f = enc.field(c)?;
            AxisDescriptor::from_scale(f.scale.as_ref()?, title(&f.binding), config.tick_count)
        })
        .collect();

    let mut legends: Vec<LegendDescriptor> = Vec::new();
    for channel in LEGEND_CHANNELS {
        let Some(f) = enc.field(channel) else {
            continue;
        };
        if f.scale.is_none() || f.binding.legend == LegendSetting::Hidden {
            continue;
        }
        let existing = legends
            .iter()
            .position(|l| l.field == f.binding.field && l.data_type == f.data_type);
        match existing {
            Some(i) => legends[i].channels.push(channel),
            None => legends.push(new_legend(f, config)),
        }
    }
    for legend in &mut legends {
        fill_entries(legend, enc, config);
    }
    log::debug!("guides: {} axes, {} legends", axes.len(), legends.len());
    Guides { axes, legends }
}

fn new_legend(f: &ResolvedField, config: &CompileConfig) -> LegendDescriptor {
    let custom = match &f.binding.legend {
        LegendSetting::Custom(c) => Some(c),
        LegendSetting::Auto | LegendSetting::Hidden => None,
    };
    LegendDescriptor {
        channels: smallvec::smallvec![f.channel()],
        field: f.binding.field.clone(),
        data_type: f.data_type,
        title: custom
            .and_then(|c| c.title.clone())
            .unwrap_or_else(|| title(&f.binding)),
        kind: LegendKind::Symbol,
        entries: Vec::new(),
        orient: custom.and_then(|c| c.orient).unwrap_or(config.legend_orient),
        title_orient: custom
            .and_then(|c| c.title_orient)
            .unwrap_or(config.legend_title_orient),
        bounds: Rect::ZERO,
    }
}

fn fill_entries(legend: &mut LegendDescriptor, enc: &ResolvedEncodings, config: &CompileConfig) {
    let scales: Vec<&Scale> = legend.channels.iter().filter_map(|&c| enc.scale(c)).collect();
    let Some(first) = scales.first() else {
        return;
    };
    let stops: Vec<ScaleTick> = match &first.domain {
        ScaleDomain::Discrete(values) => values
            .iter()
            .map(|v| ScaleTick {
                value: v.clone(),
                label: format!("{v}"),
            })
            .collect(),
        ScaleDomain::Continuous(..) => first.ticks(config.tick_count),
    };
    if first.is_continuous() && legend.channels.as_slice() == [Channel::Color] {
        legend.kind = LegendKind::Gradient;
    }
    legend.entries = stops
        .into_iter()
        .map(|t| entry(t.value, t.label, &scales))
        .collect();
}

fn entry(value: Value, label: String, scales: &[&Scale]) -> LegendEntry {
    let mut e = LegendEntry::new(value, label);
    for scale in scales {
        let Some(out) = scale.map(&e.value) else {
            continue;
        };
        match scale.channel {
            Channel::Color => e.color = out.as_color(),
            Channel::Size => e.size = out.as_number(),
            Channel::Shape => e.shape = out.as_shape(),
            Channel::Opacity => e.opacity = out.as_number(),
            _ => {}
        }
    }
    e
}
