// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump of a compiled [`SceneDescriptor`].

use std::fmt::Write as _;

use kurbo::{Affine, BezPath, Point, Rect, Shape as _};
use peniko::Color;
use vizlite_compile::{
    AxisDescriptor, AxisOrient, CompileConfig, Geometry, LegendDescriptor, LegendKind,
    PositionedPrimitive, SceneDescriptor, Shape, TitleOrient,
};

const INK: &str = "#333333";
const GRID: &str = "#dddddd";

pub(crate) fn render(scene: &SceneDescriptor, config: &CompileConfig) -> String {
    let view = scene.view;
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        view.x0,
        view.y0,
        view.width(),
        view.height(),
        view.width(),
        view.height()
    );
    let _ = writeln!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="white"/>"#,
        view.x0,
        view.y0,
        view.width(),
        view.height()
    );

    for cell in &scene.cells {
        write_rect_outline(&mut out, cell.bounds, GRID);
        let origin = Affine::translate(cell.bounds.origin().to_vec2());
        for mark in &cell.marks {
            write_primitive(&mut out, mark, origin);
        }
    }
    for axis in scene.all_axes() {
        write_axis(&mut out, axis, config);
    }
    for legend in scene.all_legends() {
        write_legend(&mut out, legend, config);
    }
    for header in &scene.headers {
        let c = header.bounds.center();
        write_text(
            &mut out,
            c,
            config.header_font_size,
            "middle",
            &header.text,
            None,
        );
    }

    out.push_str("</svg>\n");
    out
}

fn write_primitive(out: &mut String, mark: &PositionedPrimitive, origin: Affine) {
    let (fill, stroke) = if mark.filled {
        (hex(mark.color), "none".to_string())
    } else {
        ("none".to_string(), hex(mark.color))
    };
    let paint = format!(
        r#" fill="{fill}" stroke="{stroke}" opacity="{}""#,
        mark.opacity
    );
    match &mark.geometry {
        Geometry::Symbol {
            shape,
            center,
            area,
        } => {
            let path = origin * shape.path(*center, *area);
            let _ = write!(out, r#"<path d="{}"{paint}"#, path.to_svg());
        }
        Geometry::Rect(r) => {
            let r = origin.transform_rect_bbox(*r);
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}"{paint}"#,
                r.x0,
                r.y0,
                r.width(),
                r.height()
            );
        }
        Geometry::Rule(line) | Geometry::Tick(line) => {
            let (p0, p1) = (origin * line.p0, origin * line.p1);
            let _ = write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" opacity="{}""#,
                p0.x,
                p0.y,
                p1.x,
                p1.y,
                hex(mark.color),
                mark.opacity
            );
        }
        Geometry::Text {
            anchor,
            text,
            font_size,
        } => {
            let p = origin * *anchor;
            write_text(out, p, *font_size, "middle", text, Some(mark.color));
            return;
        }
        Geometry::Line { points } => {
            let path = origin * polyline(points.iter().copied(), false);
            let _ = write!(
                out,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="2" opacity="{}""#,
                path.to_svg(),
                hex(mark.color),
                mark.opacity
            );
        }
        Geometry::Area { points, baseline } => {
            let ring = points.iter().chain(baseline.iter().rev()).copied();
            let path = origin * polyline(ring, true);
            let _ = write!(
                out,
                r#"<path d="{}" fill="{}" opacity="{}""#,
                path.to_svg(),
                hex(mark.color),
                mark.opacity
            );
        }
    }
    match &mark.tooltip {
        Some(tip) => {
            let _ = writeln!(out, "><title>{}</title></{}>", escape_xml(tip), tag(&mark.geometry));
        }
        None => out.push_str("/>\n"),
    }
}

fn tag(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Rect(_) => "rect",
        Geometry::Rule(_) | Geometry::Tick(_) => "line",
        Geometry::Text { .. } => "text",
        Geometry::Symbol { .. } | Geometry::Line { .. } | Geometry::Area { .. } => "path",
    }
}

fn polyline(points: impl Iterator<Item = Point>, close: bool) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    if close {
        path.close_path();
    }
    path
}

fn write_axis(out: &mut String, axis: &AxisDescriptor, config: &CompileConfig) {
    let style = &config.axis;
    for strip in &axis.placements {
        // Domain line on the edge facing the plot, ticks pointing away from it.
        let (edge, dir) = match axis.orient {
            AxisOrient::Bottom => (strip.y0, 1.0),
            AxisOrient::Top => (strip.y1, -1.0),
            AxisOrient::Left => (strip.x1, -1.0),
            AxisOrient::Right => (strip.x0, 1.0),
        };
        let horizontal = axis.orient.is_horizontal();
        let at = |along: f64, across: f64| {
            if horizontal {
                Point::new(strip.x0 + along, across)
            } else {
                Point::new(across, strip.y0 + along)
            }
        };
        write_line(out, at(axis.range.0, edge), at(axis.range.1, edge), INK);
        for tick in &axis.ticks {
            let outer = edge + dir * style.tick_size;
            write_line(out, at(tick.position, edge), at(tick.position, outer), INK);
            let label_at = outer + dir * (style.tick_padding + 0.5 * style.label_font_size);
            let anchor = match axis.orient {
                AxisOrient::Left => "end",
                AxisOrient::Right => "start",
                AxisOrient::Top | AxisOrient::Bottom => "middle",
            };
            let mut p = at(tick.position, label_at);
            if !horizontal {
                p.x = outer + dir * style.tick_padding;
            }
            write_text(out, p, style.label_font_size, anchor, &tick.label, None);
        }
        if axis.title.is_empty() {
            continue;
        }
        let mid = 0.5 * (axis.range.0 + axis.range.1);
        let (p, rotate) = match axis.orient {
            AxisOrient::Bottom => (at(mid, strip.y1 - 0.5 * style.title_font_size), false),
            AxisOrient::Top => (at(mid, strip.y0 + 0.5 * style.title_font_size), false),
            AxisOrient::Left => (at(mid, strip.x0 + 0.5 * style.title_font_size), true),
            AxisOrient::Right => (at(mid, strip.x1 - 0.5 * style.title_font_size), true),
        };
        if rotate {
            let _ = writeln!(
                out,
                r#"<g transform="rotate(-90 {} {})">"#,
                p.x, p.y
            );
            write_text(out, p, style.title_font_size, "middle", &axis.title, None);
            out.push_str("</g>\n");
        } else {
            write_text(out, p, style.title_font_size, "middle", &axis.title, None);
        }
    }
}

fn write_legend(out: &mut String, legend: &LegendDescriptor, config: &CompileConfig) {
    let style = &config.legend;
    let b = legend.bounds;
    let mut body = b;
    if !legend.title.is_empty() {
        let h = style.title_font_size + style.title_padding;
        let title_at = match legend.title_orient {
            TitleOrient::Top => {
                body.y0 += h;
                Point::new(b.x0, b.y0 + 0.5 * style.title_font_size)
            }
            TitleOrient::Bottom => {
                body.y1 -= h;
                Point::new(b.x0, b.y1 - 0.5 * style.title_font_size)
            }
            TitleOrient::Left | TitleOrient::Right => {
                Point::new(b.x0, b.y0 + 0.5 * style.title_font_size)
            }
        };
        write_text(out, title_at, style.title_font_size, "start", &legend.title, None);
        if matches!(legend.title_orient, TitleOrient::Left | TitleOrient::Right) {
            body.y0 += h;
        }
    }

    match legend.kind {
        LegendKind::Symbol => {
            let extent = legend.symbol_extent(style);
            let row = extent.max(style.font_size);
            for (i, entry) in legend.entries.iter().enumerate() {
                let y = body.y0 + i as f64 * (row + style.row_gap) + 0.5 * row;
                let center = Point::new(body.x0 + 0.5 * extent, y);
                let area = entry.size.unwrap_or(style.swatch_size * style.swatch_size * 0.6);
                let shape = entry.shape.unwrap_or(Shape::Circle);
                let color = entry.color.unwrap_or(config.default_color);
                let _ = writeln!(
                    out,
                    r#"<path d="{}" fill="{}" opacity="{}"/>"#,
                    shape.path(center, area).to_svg(),
                    hex(color),
                    entry.opacity.unwrap_or(1.0)
                );
                let p = Point::new(body.x0 + extent + style.label_dx, y);
                write_text(out, p, style.font_size, "start", &entry.label, None);
            }
        }
        LegendKind::Gradient => {
            let n = legend.entries.len().max(2) - 1;
            let step = style.gradient_length / n as f64;
            for (i, pair) in legend.entries.windows(2).enumerate() {
                let r = Rect::new(
                    body.x0,
                    body.y0 + i as f64 * step,
                    body.x0 + style.gradient_thickness,
                    body.y0 + (i + 1) as f64 * step,
                );
                let color = pair[0].color.unwrap_or(config.default_color);
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    r.x0,
                    r.y0,
                    r.width(),
                    r.height(),
                    hex(color)
                );
            }
            for (i, entry) in legend.entries.iter().enumerate() {
                let p = Point::new(
                    body.x0 + style.gradient_thickness + style.label_dx,
                    body.y0 + i as f64 * step,
                );
                write_text(out, p, style.font_size, "start", &entry.label, None);
            }
        }
    }
}

fn write_line(out: &mut String, p0: Point, p1: Point, stroke: &str) {
    let _ = writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}"/>"#,
        p0.x, p0.y, p1.x, p1.y
    );
}

fn write_rect_outline(out: &mut String, r: Rect, stroke: &str) {
    let _ = writeln!(
        out,
        r#"<path d="{}" fill="none" stroke="{stroke}"/>"#,
        r.to_path(0.1).to_svg()
    );
}

fn write_text(
    out: &mut String,
    p: Point,
    font_size: f64,
    anchor: &str,
    text: &str,
    fill: Option<Color>,
) {
    let fill = fill.map_or_else(|| INK.to_string(), hex);
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="{}" text-anchor="{anchor}" dominant-baseline="middle" fill="{fill}">{}</text>"#,
        p.x,
        p.y,
        font_size,
        escape_xml(text)
    );
}

fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use vizlite_compile::{ChartDocument, compile};

    #[test]
    fn renders_marks_axes_and_legends() {
        let doc = ChartDocument::from_json_str(
            r#"{
                "data": {"values": [{"a": "x", "b": 3, "c": "p"}, {"a": "y & z", "b": 5, "c": "q"}]},
                "mark": "bar",
                "encodings": [
                    {"channel": "x", "field": "a"},
                    {"channel": "y", "field": "b"},
                    {"channel": "color", "field": "c"}
                ]
            }"#,
        )
        .unwrap();
        let config = CompileConfig::default();
        let scene = compile(&doc.spec, &doc.data, &config).unwrap();
        let svg = render(&scene, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        // Two bars plus the background.
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("y &amp; z"));
        assert!(svg.contains(">c</text>"));
    }
}
