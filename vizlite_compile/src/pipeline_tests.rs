// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests: JSON document in, scene out.

extern crate std;

use alloc::vec;
use alloc::vec::Vec;

use serde_json::json;

use crate::{
    Channel, ChartDocument, CompileConfig, CompileError, Geometry, InteractiveChart, LegendKind,
    SceneDescriptor, ScaleDomain, Shape, circle_radius, compile, nice_domain,
};
use vizlite_data::{DataType, Value};

fn doc(value: serde_json::Value) -> ChartDocument {
    ChartDocument::from_json_value(value).unwrap()
}

fn run(value: serde_json::Value) -> Result<SceneDescriptor, CompileError> {
    let d = doc(value);
    compile(&d.spec, &d.data, &CompileConfig::default())
}

fn y_domain(scene: &SceneDescriptor) -> ScaleDomain {
    scene.axis(Channel::Y).unwrap().domain.clone()
}

#[test]
fn zero_is_included_for_positive_positions() {
    let scene = run(json!({
        "data": {"values": [{"k": "a", "v": 3.2}, {"k": "b", "v": 7.8}]},
        "mark": "bar",
        "encodings": [
            {"channel": "x", "field": "k"},
            {"channel": "y", "field": "v"}
        ]
    }))
    .unwrap();
    assert_eq!(y_domain(&scene), ScaleDomain::Continuous(0.0, 8.0));
}

#[test]
fn zero_and_nice_overrides() {
    let chart = |scale: serde_json::Value| {
        json!({
            "data": {"values": [{"v": 3.2}, {"v": 7.8}]},
            "mark": "point",
            "encodings": [{"channel": "y", "field": "v", "scale": scale}]
        })
    };
    let exact = run(chart(json!({"zero": false, "nice": false}))).unwrap();
    assert_eq!(y_domain(&exact), ScaleDomain::Continuous(3.2, 7.8));
    let nice = run(chart(json!({"zero": false, "nice": true}))).unwrap();
    assert_eq!(y_domain(&nice), ScaleDomain::Continuous(3.0, 8.0));
}

#[test]
fn nice_is_idempotent() {
    for (lo, hi) in [(3.2, 7.8), (-0.37, 12.9), (0.001, 0.0173), (-1234.5, -2.0), (5.0, 5.0)] {
        let once = nice_domain(lo, hi, 5);
        assert_eq!(nice_domain(once.0, once.1, 5), once, "nice({lo}, {hi})");
        assert!(once.0 <= lo && once.1 >= hi, "nice({lo}, {hi}) shrank to {once:?}");
    }
}

#[test]
fn facets_conserve_rows() {
    let values: Vec<serde_json::Value> = (0..23)
        .map(|i| {
            let g = ["p", "q", "r"][i % 3];
            let h = ["s", "t"][i % 2];
            json!({"i": i, "g": g, "h": h})
        })
        .collect();
    let scene = run(json!({
        "data": {"values": values},
        "mark": "point",
        "encodings": [{"channel": "x", "field": "i"}],
        "facet": {"column": {"field": "g"}, "row": {"field": "h"}}
    }))
    .unwrap();
    assert_eq!(scene.cells.len(), 6);
    assert_eq!(scene.mark_count(), 23);
    let mut keys: Vec<u64> = scene.marks().flat_map(|p| p.rows.iter().copied()).collect();
    keys.sort_unstable();
    assert_eq!(keys, (0..23).collect::<Vec<u64>>());
    // Three column headers, then two row headers.
    let headers: Vec<&str> = scene.headers.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(headers, vec!["p", "q", "r", "s", "t"]);
}

#[test]
fn size_encodes_area() {
    let scene = run(json!({
        "data": {"values": [{"v": 10}, {"v": 20}]},
        "mark": "circle",
        "encodings": [{"channel": "size", "field": "v"}]
    }))
    .unwrap();
    let radii: Vec<f64> = scene
        .marks()
        .map(|p| match p.geometry {
            Geometry::Symbol { area, .. } => circle_radius(area),
            _ => panic!("expected symbols"),
        })
        .collect();
    assert!((radii[1] / radii[0] - 2.0_f64.sqrt()).abs() < 1e-9);
    // Domain [0, 20] onto [0, 1000]: the second circle has area 1000.
    assert!((radii[1] - (1000.0 / core::f64::consts::PI).sqrt()).abs() < 1e-9);
}

#[test]
fn redundant_encodings_share_a_legend() {
    let scene = run(json!({
        "data": {"values": [
            {"x": 1, "y": 2, "origin": "USA"},
            {"x": 2, "y": 3, "origin": "Japan"}
        ]},
        "mark": "point",
        "encodings": [
            {"channel": "x", "field": "x"},
            {"channel": "y", "field": "y"},
            {"channel": "color", "field": "origin"},
            {"channel": "shape", "field": "origin"}
        ]
    }))
    .unwrap();
    assert_eq!(scene.legends.len(), 1);
    let legend = &scene.legends[0];
    assert!(legend.includes(Channel::Color) && legend.includes(Channel::Shape));
    assert_eq!(legend.entries[0].shape, Some(Shape::Circle));
    assert_eq!(legend.entries[1].shape, Some(Shape::Square));
    assert!(legend.bounds.x0 >= scene.plot.x1);
    // Marks pick up both encodings.
    let Geometry::Symbol { shape, .. } = scene.cells[0].marks[1].geometry else {
        panic!("expected a symbol");
    };
    assert_eq!(shape, Shape::Square);
}

#[test]
fn descending_order_is_stable() {
    let scene = run(json!({
        "data": {"values": [
            {"city": "a", "pop": 5},
            {"city": "b", "pop": 1},
            {"city": "c", "pop": 50},
            {"city": "d", "pop": 5}
        ]},
        "mark": "circle",
        "encodings": [
            {"channel": "x", "field": "city"},
            {"channel": "size", "field": "pop"},
            {"channel": "order", "field": "pop", "sort": "descending"}
        ]
    }))
    .unwrap();
    let order: Vec<Option<Value>> = scene.marks().map(|p| p.order.clone()).collect();
    assert_eq!(
        order,
        vec![
            Some(Value::Number(50.0)),
            Some(Value::Number(5.0)),
            Some(Value::Number(5.0)),
            Some(Value::Number(1.0)),
        ]
    );
    let keys: Vec<u64> = scene.marks().map(|p| p.rows[0]).collect();
    assert_eq!(keys, vec![2, 0, 3, 1]);
}

#[test]
fn shape_rejects_quantitative_but_color_accepts_it() {
    let chart = |channel: &str| {
        json!({
            "data": {"values": [{"v": 1}, {"v": 4}]},
            "mark": "point",
            "encodings": [{"channel": channel, "field": "v"}]
        })
    };
    assert_eq!(
        run(chart("shape")),
        Err(CompileError::IncompatibleType {
            channel: Channel::Shape,
            data_type: DataType::Quantitative,
        })
    );
    let scene = run(chart("color")).unwrap();
    let legend = scene.legend(Channel::Color).unwrap();
    assert_eq!(legend.kind, LegendKind::Gradient);
    let colors: Vec<_> = scene.marks().map(|p| p.color).collect();
    assert_ne!(colors[0], colors[1]);
}

#[test]
fn nominal_colors_cycle_past_the_palette() {
    let values: Vec<serde_json::Value> = (0..12)
        .map(|i| json!({"c": alloc::format!("c{i}")}))
        .collect();
    let scene = run(json!({
        "data": {"values": values},
        "mark": "point",
        "encodings": [{"channel": "color", "field": "c"}]
    }))
    .unwrap();
    let colors: Vec<_> = scene.marks().map(|p| p.color).collect();
    assert_eq!(colors[10], colors[0]);
    assert_eq!(colors[11], colors[1]);
    assert_ne!(colors[1], colors[0]);
}

#[test]
fn count_aggregate_with_temporal_axis() {
    let scene = run(json!({
        "data": {"values": [
            {"day": "2024-01-01", "kind": "a"},
            {"day": "2024-01-01", "kind": "b"},
            {"day": "2024-01-03", "kind": "a"}
        ]},
        "mark": "line",
        "encodings": [
            {"channel": "x", "field": "day", "type": "temporal"},
            {"channel": "y", "aggregate": "count"}
        ]
    }))
    .unwrap();
    assert_eq!(scene.mark_count(), 1);
    let line = scene.marks().next().unwrap();
    assert_eq!(line.rows.as_slice(), &[0, 1, 2]);
    let Geometry::Line { ref points } = line.geometry else {
        panic!("expected a line");
    };
    assert_eq!(points.len(), 2);
    assert_eq!(scene.axis(Channel::Y).unwrap().title, "Count of Records");
    assert!(
        scene
            .axis(Channel::X)
            .unwrap()
            .ticks
            .iter()
            .all(|t| matches!(t.value, Value::Time(_)))
    );
}

#[test]
fn missing_required_channel_is_reported() {
    let err = run(json!({
        "data": {"values": [{"v": 1}]},
        "mark": "area",
        "encodings": [{"channel": "y", "field": "v"}]
    }));
    assert!(matches!(err, Err(CompileError::MissingRequiredChannel { .. })));
}

#[test]
fn duplicate_channels_are_rejected_but_tooltips_stack() {
    let base = |encodings: serde_json::Value| {
        json!({"data": {"values": [{"a": 1, "b": 2}]}, "mark": "point", "encodings": encodings})
    };
    assert_eq!(
        run(base(json!([
            {"channel": "x", "field": "a"},
            {"channel": "x", "field": "b"}
        ]))),
        Err(CompileError::DuplicateChannel(Channel::X))
    );
    let scene = run(base(json!([
        {"channel": "tooltip", "field": "a"},
        {"channel": "tooltip", "field": "b"}
    ])))
    .unwrap();
    assert_eq!(scene.marks().next().unwrap().tooltip.as_deref(), Some("a: 1, b: 2"));
}

#[test]
fn interactive_chart_from_json() {
    let d = doc(json!({
        "data": {"values": [
            {"city": "a", "pop": 10, "region": "n"},
            {"city": "b", "pop": 50, "region": "s"},
            {"city": "c", "pop": 90, "region": "n"}
        ]},
        "mark": "bar",
        "encodings": [
            {"channel": "x", "field": "city"},
            {"channel": "y", "field": "pop"}
        ],
        "params": [
            {"name": "region", "value": "n", "bind": {"input": "select", "options": ["n", "s"]}}
        ],
        "transform": [{"filter": {"field": "region", "equal": {"param": "region"}}}]
    }));
    let mut chart = InteractiveChart::new(d.spec, d.data, CompileConfig::default()).unwrap();
    assert_eq!(chart.scene().mark_count(), 2);
    let scene = chart.set("region", "s").unwrap();
    assert_eq!(scene.mark_count(), 1);
    assert_eq!(scene.marks().next().unwrap().rows[0], 1);
    assert!(matches!(
        chart.set("region", "w"),
        Err(CompileError::InvalidParamValue { .. })
    ));
    assert_eq!(chart.get("region"), Some(&Value::from("s")));
}
