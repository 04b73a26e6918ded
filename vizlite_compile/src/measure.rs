// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for guide layout.
//!
//! The compiler does no shaping. Axes, legends and facet headers ask a measurer for rough
//! label bounds so the scene layout can reserve space before anything is drawn.

/// A minimal text measurement interface used by layout.
///
/// Callers can plug in a real text measurement backend (e.g. based on shaping), or use
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    /// Returns `(width, height)` in scene units.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);

    /// Returns the widest of `texts`.
    fn max_width<'a>(&self, texts: impl IntoIterator<Item = &'a str>, font_size: f64) -> f64
    where
        Self: Sized,
    {
        texts
            .into_iter()
            .map(|t| self.measure(t, font_size).0)
            .fold(0.0, f64::max)
    }
}

/// A tiny heuristic text measurer suitable for demos and tests.
///
/// It assumes an average glyph width of ~0.6em and height of 1em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let width = 0.6 * font_size * text.chars().count() as f64;
        (width, font_size)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn heuristic_widths_scale_with_length() {
        let m = HeuristicTextMeasurer;
        assert_eq!(m.measure("abcd", 10.0), (24.0, 10.0));
        assert_eq!(m.max_width(["a", "abc", ""], 10.0), 18.0);
    }
}
