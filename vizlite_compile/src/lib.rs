// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A declarative visual-encoding compiler.
//!
//! Given a typed [`Dataset`](vizlite_data::Dataset), a mark and channel-to-field bindings, this
//! crate resolves a renderable [`SceneDescriptor`]:
//! - **Type classification** decides whether a field is nominal, ordinal, quantitative or
//!   temporal.
//! - **Scales** are synthesized per channel (domain, range, zero and nice rules).
//! - **Geometry** turns rows into positioned primitives in draw order.
//! - **Facets** split the data into a grid of cells sharing (or not) their scales.
//! - **Guides** (axes, legends) are generated, deduplicated and laid out.
//! - **Parameters** drive filters; [`InteractiveChart`] recompiles when they change.
//!
//! Drawing is out of scope: the scene is plain data for an external renderer. Text extents
//! come from a [`TextMeasurer`].
//!
//! ```
//! use vizlite_compile::{ChartDocument, CompileConfig, compile};
//!
//! let doc = ChartDocument::from_json_str(r#"{
//!     "data": {"values": [{"a": "A", "b": 28}, {"a": "B", "b": 55}]},
//!     "mark": "bar",
//!     "encodings": [
//!         {"channel": "x", "field": "a"},
//!         {"channel": "y", "field": "b"}
//!     ]
//! }"#).unwrap();
//! let scene = compile(&doc.spec, &doc.data, &CompileConfig::default()).unwrap();
//! assert_eq!(scene.mark_count(), 2);
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod axis;
mod channel;
mod classify;
mod compile;
mod config;
mod encoding;
mod error;
mod facet;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod geometry;
mod guides;
mod json;
mod layout;
mod legend;
mod measure;
mod palette;
mod params;
mod scale;
mod scene;
mod spec;
mod symbol;
mod time;

#[cfg(test)]
mod pipeline_tests;

pub use axis::{AxisDescriptor, AxisOrient, AxisStyle, AxisTick};
pub use channel::{Channel, ChannelRole};
pub use classify::{check_compatible, classify, infer};
pub use compile::{apply_filters, compile, compile_filtered, compile_with};
pub use config::CompileConfig;
pub use encoding::{
    ConstantValue, ResolvedEncoding, ResolvedEncodings, ResolvedField, check_duplicates,
    parse_constant, resolve,
};
pub use error::CompileError;
pub use facet::{FacetCell, partition};
pub use geometry::{Geometry, PositionedPrimitive, build, check_required, draw_order};
pub use guides::{Guides, default_title, generate};
pub use json::{ChartDocument, SpecError, predicate};
pub use layout::{
    AxisStrip, LegendOrient, LegendPlacement, SceneLayout, SceneLayoutSpec, Size,
};
pub use legend::{LegendDescriptor, LegendEntry, LegendKind, LegendStyle, TitleOrient};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use palette::{CATEGORICAL, SEQUENTIAL};
pub use params::{InteractiveChart, ParamBind, ParamSpec, ParamStore, SubscriptionId};
pub use scale::{
    Scale, ScaleBand, ScaleDomain, ScaleLinear, ScaleRange, ScaleRequest, ScaleTick,
    ScaleValue, discrete_domain, explicit_order, linear_ticks, nice_domain, synthesize,
};
pub use scene::{FacetHeader, SceneCell, SceneDescriptor};
pub use spec::{
    ChartSpec, ConstantBinding, DomainOverride, EncodingBinding, FacetConfig, FieldBinding,
    LegendConfig, LegendSetting, MarkKind, MarkSpec, RangeOverride, ScaleConfig, ScaleKind,
    SortSpec, ViewSpec,
};
pub use symbol::{Shape, circle_radius};
pub use vizlite_data;
