// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart demos for `vizlite_compile`.
//!
//! Compiles a set of JSON chart documents and writes them, rendered as SVG, to a single HTML
//! report. Set `RUST_LOG=debug` to see the compiler's decisions.

mod html;
mod svg;

use std::error::Error;

use serde_json::json;
use vizlite_compile::{
    ChartDocument, CompileConfig, InteractiveChart, LegendOrient, SceneDescriptor, compile,
};

type DemoResult = Result<html::HtmlSection, Box<dyn Error>>;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sections = vec![
        bar_demo()?,
        scatter_demo()?,
        time_series_demo()?,
        aggregate_demo()?,
        heatmap_demo()?,
        facet_demo()?,
        order_demo()?,
        params_demo()?,
        errors_demo(),
    ];

    let html = html::render_report("vizlite charts demo", &sections);
    std::fs::write("vizlite_demo.html", html)?;
    log::info!("wrote vizlite_demo.html ({} sections)", sections.len());
    Ok(())
}

fn chart(
    doc: serde_json::Value,
    config: &CompileConfig,
) -> Result<(SceneDescriptor, String), Box<dyn Error>> {
    let doc = ChartDocument::from_json_value(doc)?;
    let scene = compile(&doc.spec, &doc.data, config)?;
    log::info!(
        "compiled `{:?}` chart: {} marks in {} cells",
        doc.spec.view.mark.kind,
        scene.mark_count(),
        scene.cells.len()
    );
    let svg = svg::render(&scene, config);
    Ok((scene, svg))
}

fn bar_demo() -> DemoResult {
    let config = CompileConfig::default().with_view_size(300.0, 200.0);
    let (_, svg) = chart(
        json!({
            "data": {"values": [
                {"a": "A", "b": 28}, {"a": "B", "b": 55}, {"a": "C", "b": 43},
                {"a": "D", "b": 91}, {"a": "E", "b": 81}, {"a": "F", "b": 53},
                {"a": "G", "b": 19}, {"a": "H", "b": 87}, {"a": "I", "b": 52}
            ]},
            "mark": "bar",
            "encodings": [
                {"channel": "x", "field": "a"},
                {"channel": "y", "field": "b"},
                {"channel": "tooltip", "field": "b"}
            ]
        }),
        &config,
    )?;
    let (_, horizontal) = chart(
        json!({
            "data": {"values": [
                {"fruit": "apples", "n": 12}, {"fruit": "pears", "n": 7}, {"fruit": "figs", "n": 3}
            ]},
            "mark": "bar",
            "encoding": {
                "y": {"field": "fruit", "sort": "descending"},
                "x": {"field": "n"},
                "color": {"value": "#e45756"}
            }
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Bars")
        .note("Nominal x gets a band scale; quantitative y includes zero and is niced.")
        .svg(svg)
        .svg(horizontal))
}

fn scatter_demo() -> DemoResult {
    let config = CompileConfig::default().with_view_size(300.0, 220.0);
    let (scene, svg) = chart(
        json!({
            "data": {"values": [
                {"hp": 130, "mpg": 18, "origin": "USA", "weight": 3504},
                {"hp": 165, "mpg": 15, "origin": "USA", "weight": 3693},
                {"hp": 95, "mpg": 24, "origin": "Japan", "weight": 2372},
                {"hp": 88, "mpg": 27, "origin": "Japan", "weight": 2130},
                {"hp": 97, "mpg": 26, "origin": "Europe", "weight": 1835},
                {"hp": 46, "mpg": 26, "origin": "Europe", "weight": 1835},
                {"hp": 150, "mpg": 16, "origin": "USA", "weight": 4341},
                {"hp": 67, "mpg": 31, "origin": "Japan", "weight": 1950}
            ]},
            "mark": "point",
            "encodings": [
                {"channel": "x", "field": "hp", "title": "Horsepower"},
                {"channel": "y", "field": "mpg", "scale": {"zero": false}},
                {"channel": "color", "field": "origin"},
                {"channel": "shape", "field": "origin"},
                {"channel": "size", "field": "weight", "legend": {"title": "Weight (lbs)"}},
                {"channel": "tooltip", "field": "origin"},
                {"channel": "tooltip", "field": "hp"}
            ]
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Scatter with redundant encodings")
        .note(format!(
            "Color and shape bind the same field, so they share one legend ({} legends in total).",
            scene.legends.len()
        ))
        .svg(svg))
}

fn time_series_demo() -> DemoResult {
    let config = CompileConfig::default().with_view_size(360.0, 200.0);
    let mut values = Vec::new();
    for (i, day) in ["2024-03-01", "2024-03-08", "2024-03-15", "2024-03-22", "2024-03-29"]
        .iter()
        .enumerate()
    {
        let i = i as f64;
        values.push(json!({"date": day, "symbol": "AAA", "price": 40.0 + 3.0 * i}));
        values.push(json!({"date": day, "symbol": "BBB", "price": 55.0 - 2.5 * i}));
    }
    let (_, line) = chart(
        json!({
            "data": {"values": values},
            "mark": "line",
            "encodings": [
                {"channel": "x", "field": "date", "type": "temporal"},
                {"channel": "y", "field": "price"},
                {"channel": "color", "field": "symbol"}
            ]
        }),
        &config,
    )?;
    let (_, area) = chart(
        json!({
            "data": {"values": values},
            "mark": "area",
            "encodings": [
                {"channel": "x", "field": "date", "type": "temporal"},
                {"channel": "y", "field": "price"},
                {"channel": "color", "field": "symbol", "legend": {"orient": "bottom"}},
                {"channel": "opacity", "value": 0.5}
            ]
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Time series")
        .note("Rows split into one series per color; temporal ticks snap to calendar units.")
        .svg(line)
        .svg(area))
}

fn aggregate_demo() -> DemoResult {
    let config = CompileConfig::default().with_view_size(280.0, 200.0);
    let (_, svg) = chart(
        json!({
            "data": {"values": [
                {"team": "red", "score": 3}, {"team": "red", "score": 9},
                {"team": "blue", "score": 4}, {"team": "blue", "score": 6},
                {"team": "green", "score": 8}
            ]},
            "mark": "bar",
            "encodings": [
                {"channel": "x", "field": "team", "sort": ["red", "green", "blue"]},
                {"channel": "y", "field": "score", "aggregate": "mean"}
            ]
        }),
        &config,
    )?;
    let (_, count) = chart(
        json!({
            "data": {"values": [
                {"team": "red"}, {"team": "red"}, {"team": "blue"}, {"team": "green"}
            ]},
            "mark": "point",
            "encodings": [
                {"channel": "y", "field": "team"},
                {"channel": "x", "aggregate": "count"},
                {"channel": "size", "aggregate": "count", "legend": null}
            ]
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Aggregation")
        .note("Aggregated channels group by every other bound field; titles read \"Mean of score\".")
        .svg(svg)
        .svg(count))
}

fn heatmap_demo() -> DemoResult {
    let config = CompileConfig::default()
        .with_view_size(240.0, 200.0)
        .with_legend_orient(LegendOrient::Bottom);
    let mut values = Vec::new();
    for (i, x) in ["mon", "tue", "wed", "thu"].iter().enumerate() {
        for (j, y) in ["am", "pm", "night"].iter().enumerate() {
            values.push(json!({"day": x, "slot": y, "load": (i * 3 + j * 7) % 11}));
        }
    }
    let (_, rect) = chart(
        json!({
            "data": {"values": values},
            "mark": "rect",
            "encodings": [
                {"channel": "x", "field": "day", "type": "ordinal"},
                {"channel": "y", "field": "slot", "type": "ordinal"},
                {"channel": "color", "field": "load"}
            ]
        }),
        &config,
    )?;
    let (_, text) = chart(
        json!({
            "data": {"values": values},
            "mark": "text",
            "encodings": [
                {"channel": "x", "field": "day", "type": "ordinal"},
                {"channel": "y", "field": "slot", "type": "ordinal"},
                {"channel": "text", "field": "load"}
            ]
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Heatmap")
        .note("A quantitative color field gets a sequential scale and a gradient legend.")
        .svg(rect)
        .svg(text))
}

fn facet_demo() -> DemoResult {
    let sites = ["Crookston", "Morris", "Waseca"];
    let varieties = ["Manchuria", "Glabron", "Peatland"];
    let mut values = Vec::new();
    for (s, site) in sites.iter().enumerate() {
        for (v, variety) in varieties.iter().enumerate() {
            for year in ["early", "late"] {
                let yield_ = 20.0 + (s * 7 + v * 5) as f64 + if year == "late" { 4.0 } else { 0.0 };
                values.push(json!({
                    "site": site, "variety": variety, "year": year, "yield": yield_
                }));
            }
        }
    }
    let config = CompileConfig::default().with_facet_spacing(12.0);
    let doc = |independent: bool| {
        json!({
            "data": {"values": values},
            "mark": "bar",
            "encodings": [
                {"channel": "x", "field": "variety"},
                {"channel": "y", "field": "yield"},
                {"channel": "color", "field": "variety", "legend": null}
            ],
            "facet": {
                "column": {"field": "site"},
                "row": {"field": "year", "type": "ordinal", "sort": ["early", "late"]},
                "independentScales": independent,
                "cellWidth": 120,
                "cellHeight": 90
            }
        })
    };
    let (shared, shared_svg) = chart(doc(false), &config)?;
    let (_, independent_svg) = chart(doc(true), &config)?;
    Ok(html::HtmlSection::new("Facets")
        .note(format!(
            "A {}-cell grid. Shared scales hoist one axis per grid row and column; independent \
             scales give each cell its own.",
            shared.cells.len()
        ))
        .svg(shared_svg)
        .svg(independent_svg))
}

fn order_demo() -> DemoResult {
    let config = CompileConfig::default().with_view_size(300.0, 140.0);
    let (_, svg) = chart(
        json!({
            "data": {"values": [
                {"city": "Ames", "pop": 66, "x": 1}, {"city": "Boone", "pop": 12, "x": 1.4},
                {"city": "Des Moines", "pop": 214, "x": 1.8}, {"city": "Nevada", "pop": 7, "x": 1.2}
            ]},
            "mark": "circle",
            "encodings": [
                {"channel": "x", "field": "x", "scale": {"zero": false}},
                {"channel": "size", "field": "pop", "scale": {"range": [0, 4000]}},
                {"channel": "color", "field": "city"},
                {"channel": "order", "field": "pop", "sort": "descending"}
            ]
        }),
        &config,
    )?;
    Ok(html::HtmlSection::new("Draw order")
        .note("Large circles draw first so small ones stay visible.")
        .svg(svg))
}

fn params_demo() -> DemoResult {
    let doc = ChartDocument::from_json_value(json!({
        "data": {"values": [
            {"city": "Oslo", "pop": 700, "region": "north"},
            {"city": "Bergen", "pop": 285, "region": "west"},
            {"city": "Tromsø", "pop": 77, "region": "north"},
            {"city": "Stavanger", "pop": 145, "region": "west"},
            {"city": "Drammen", "pop": 102, "region": "east"}
        ]},
        "mark": "bar",
        "encodings": [
            {"channel": "x", "field": "city"},
            {"channel": "y", "field": "pop"}
        ],
        "params": [
            {"name": "min_pop", "value": 0, "bind": {"input": "range", "min": 0, "max": 1000, "step": 10}},
            {"name": "region", "value": "north", "bind": {"input": "select", "options": ["north", "west", "east"]}}
        ],
        "transform": [
            {"filter": {"field": "pop", "gte": {"param": "min_pop"}}},
            {"filter": {"or": [
                {"field": "region", "equal": {"param": "region"}},
                {"field": "region", "equal": "east"}
            ]}}
        ]
    }))?;
    let config = CompileConfig::default().with_view_size(260.0, 180.0);
    let mut chart = InteractiveChart::new(doc.spec, doc.data, config.clone())?;
    chart.subscribe(|scene| log::info!("params changed: {} bars", scene.mark_count()));

    let mut section = html::HtmlSection::new("Parameters");
    section = section.svg(svg::render(chart.scene(), &config));
    chart.set("region", "west")?;
    section = section.svg(svg::render(chart.scene(), &config));
    chart.set("min_pop", 120.0)?;
    section = section.svg(svg::render(chart.scene(), &config));
    if let Err(err) = chart.set("min_pop", 5000.0) {
        section = section.note(format!("Rejected out-of-range value: {err}"));
    }
    Ok(section.note("Each change recompiles the chart; the last good scene survives an error."))
}

fn errors_demo() -> html::HtmlSection {
    let cases = [
        json!({
            "data": {"values": [{"v": 1}, {"v": 2}]},
            "mark": "point",
            "encodings": [{"channel": "shape", "field": "v"}]
        }),
        json!({
            "data": {"values": [{"v": 1}]},
            "mark": "line",
            "encodings": [{"channel": "x", "field": "v"}]
        }),
        json!({
            "data": {"values": [{"v": 1}]},
            "mark": "point",
            "encodings": [{"channel": "x", "field": "w"}]
        }),
        json!({"mark": "pie", "encodings": []}),
    ];
    let mut section = html::HtmlSection::new("Errors");
    for case in cases {
        let message = match chart(case, &CompileConfig::default()) {
            Ok(_) => "compiled".to_string(),
            Err(err) => err.to_string(),
        };
        log::warn!("{message}");
        section = section.note(message);
    }
    section
}
