// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbol shapes for point-like marks.
//!
//! Symbol sizes are **areas** in square pixels, so a size scale that doubles its output grows
//! the glyph's linear extent by `√2`.

use core::f64::consts::PI;
use core::fmt;

use kurbo::{BezPath, Circle, Point, Shape as _};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// A symbol shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A circle.
    Circle,
    /// An axis-aligned square.
    Square,
    /// A plus sign.
    Cross,
    /// A square rotated by 45°.
    Diamond,
    /// An equilateral triangle pointing up.
    TriangleUp,
    /// An equilateral triangle pointing down.
    TriangleDown,
}

impl Shape {
    /// The default shape palette, in assignment order.
    pub const PALETTE: [Self; 6] = [
        Self::Circle,
        Self::Square,
        Self::Cross,
        Self::Diamond,
        Self::TriangleUp,
        Self::TriangleDown,
    ];

    /// Returns the shape name (`"circle"`, `"triangle-up"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Cross => "cross",
            Self::Diamond => "diamond",
            Self::TriangleUp => "triangle-up",
            Self::TriangleDown => "triangle-down",
        }
    }

    /// Parses a shape name. `"triangle"` is an alias for `"triangle-up"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "triangle" => Some(Self::TriangleUp),
            _ => Self::PALETTE.into_iter().find(|s| s.name() == name),
        }
    }

    /// Returns an outline of this shape centred at `center` enclosing `area` square pixels.
    pub fn path(self, center: Point, area: f64) -> BezPath {
        let area = area.max(0.0);
        let Point { x: cx, y: cy } = center;
        match self {
            Self::Circle => {
                // Tolerance is in scene units; fine for screen-sized glyphs.
                Circle::new(center, circle_radius(area))
                    .path_elements(0.1)
                    .collect()
            }
            Self::Square => {
                let h = 0.5 * area.sqrt();
                polygon(&[
                    (cx - h, cy - h),
                    (cx + h, cy - h),
                    (cx + h, cy + h),
                    (cx - h, cy + h),
                ])
            }
            Self::Diamond => {
                let r = (0.5 * area).sqrt();
                polygon(&[(cx, cy - r), (cx + r, cy), (cx, cy + r), (cx - r, cy)])
            }
            Self::Cross => {
                // Five unit squares of side `a`.
                let a = (area / 5.0).sqrt();
                let h = 0.5 * a;
                let o = 1.5 * a;
                polygon(&[
                    (cx - h, cy - o),
                    (cx + h, cy - o),
                    (cx + h, cy - h),
                    (cx + o, cy - h),
                    (cx + o, cy + h),
                    (cx + h, cy + h),
                    (cx + h, cy + o),
                    (cx - h, cy + o),
                    (cx - h, cy + h),
                    (cx - o, cy + h),
                    (cx - o, cy - h),
                    (cx - h, cy - h),
                ])
            }
            Self::TriangleUp | Self::TriangleDown => {
                let side = (4.0 * area / 3.0_f64.sqrt()).sqrt();
                let height = side * 3.0_f64.sqrt() * 0.5;
                // Centroid sits a third of the way up from the base.
                let dir = if self == Self::TriangleUp { 1.0 } else { -1.0 };
                let apex = cy - dir * height * (2.0 / 3.0);
                let base = cy + dir * height / 3.0;
                polygon(&[
                    (cx, apex),
                    (cx + 0.5 * side, base),
                    (cx - 0.5 * side, base),
                ])
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the radius of a circle with the given area.
pub fn circle_radius(area: f64) -> f64 {
    (area.max(0.0) / PI).sqrt()
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut p = BezPath::new();
    for (i, &pt) in points.iter().enumerate() {
        if i == 0 {
            p.move_to(pt);
        } else {
            p.line_to(pt);
        }
    }
    p.close_path();
    p
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn shapes_enclose_their_area() {
        let center = Point::new(10.0, 10.0);
        for shape in Shape::PALETTE {
            let path = shape.path(center, 100.0);
            let area = path.area().abs();
            let tol = if shape == Shape::Circle { 0.5 } else { 1e-9 };
            assert!((area - 100.0).abs() < tol, "{shape}: {area}");
        }
    }

    #[test]
    fn doubling_area_scales_radius_by_sqrt_two() {
        let r1 = circle_radius(50.0);
        let r2 = circle_radius(100.0);
        assert!((r2 / r1 - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((circle_radius(PI) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn names_parse() {
        assert_eq!(Shape::from_name("triangle"), Some(Shape::TriangleUp));
        assert_eq!(Shape::from_name("diamond"), Some(Shape::Diamond));
        assert_eq!(Shape::from_name("star"), None);
    }
}
