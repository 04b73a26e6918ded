// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colour palettes.

extern crate alloc;

use alloc::vec::Vec;

use peniko::Color;

/// Tableau-10, the default qualitative palette.
pub const CATEGORICAL: [Color; 10] = [
    Color::from_rgb8(0x4c, 0x78, 0xa8),
    Color::from_rgb8(0xf5, 0x85, 0x18),
    Color::from_rgb8(0xe4, 0x57, 0x56),
    Color::from_rgb8(0x72, 0xb7, 0xb2),
    Color::from_rgb8(0x54, 0xa2, 0x4b),
    Color::from_rgb8(0xee, 0xca, 0x3b),
    Color::from_rgb8(0xb2, 0x79, 0xa2),
    Color::from_rgb8(0xff, 0x9d, 0xa6),
    Color::from_rgb8(0x9d, 0x75, 0x5d),
    Color::from_rgb8(0xba, 0xb0, 0xac),
];

/// Stops of the default sequential ("blues") palette, light to dark.
pub const SEQUENTIAL: [Color; 5] = [
    Color::from_rgb8(0xcf, 0xe1, 0xf2),
    Color::from_rgb8(0x93, 0xc3, 0xdf),
    Color::from_rgb8(0x4b, 0x97, 0xc9),
    Color::from_rgb8(0x18, 0x64, 0xaa),
    Color::from_rgb8(0x0a, 0x3a, 0x70),
];

/// Picks `palette[index]`, wrapping around when `index` is past the end.
pub(crate) fn cycle<T: Copy>(palette: &[T], index: usize) -> Option<T> {
    if palette.is_empty() {
        return None;
    }
    Some(palette[index % palette.len()])
}

/// Samples a piecewise-linear gradient through `stops` at `t` (clamped to `[0, 1]`).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "stop counts are tiny"
)]
pub(crate) fn interpolate(stops: &[Color], t: f64) -> Option<Color> {
    match stops {
        [] => None,
        [only] => Some(*only),
        _ => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let segments = stops.len() - 1;
            let pos = t * segments as f64;
            let i = (pos as usize).min(segments - 1);
            let local = (pos - i as f64) as f32;
            let a = stops[i].components;
            let b = stops[i + 1].components;
            let mut out = [0.0_f32; 4];
            for ((o, a), b) in out.iter_mut().zip(a).zip(b) {
                *o = a * (1.0 - local) + b * local;
            }
            Some(Color::new(out))
        }
    }
}

/// Samples `n` evenly spaced colours from a gradient, lightest first.
#[allow(clippy::cast_precision_loss, reason = "domain sizes are small")]
pub(crate) fn sample(stops: &[Color], n: usize) -> Vec<Color> {
    (0..n)
        .filter_map(|i| {
            let t = if n <= 1 {
                1.0
            } else {
                i as f64 / (n - 1) as f64
            };
            interpolate(stops, t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn cycle_wraps_modulo_length() {
        assert_eq!(cycle(&CATEGORICAL, 10), Some(CATEGORICAL[0]));
        assert_eq!(cycle(&CATEGORICAL, 13), Some(CATEGORICAL[3]));
        assert_eq!(cycle::<Color>(&[], 0), None);
    }

    #[test]
    fn interpolate_hits_stops() {
        assert_eq!(interpolate(&SEQUENTIAL, 0.0), Some(SEQUENTIAL[0]));
        assert_eq!(interpolate(&SEQUENTIAL, 1.0), Some(SEQUENTIAL[4]));
        assert_eq!(interpolate(&SEQUENTIAL, 0.5), Some(SEQUENTIAL[2]));
        assert_eq!(interpolate(&SEQUENTIAL, 7.0), Some(SEQUENTIAL[4]));
    }

    #[test]
    fn sample_spans_the_gradient() {
        let s = sample(&SEQUENTIAL, 3);
        assert_eq!(s.len(), 3);
        assert_eq!(s[0], SEQUENTIAL[0]);
        assert_eq!(s[2], SEQUENTIAL[4]);
    }
}
