// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric label formatting.

extern crate alloc;

use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Formats `v` with just enough decimals to tell ticks `step` apart.
pub(crate) fn format_tick_with_step(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }
    let decimals = decimals_for_step(step);
    // Avoid "-0".
    let v = if v.abs() < 0.5 * 10_f64.powi(-i32::from(decimals)) {
        0.0
    } else {
        v
    };
    let precision = usize::from(decimals);
    alloc::format!("{v:.precision$}")
}

fn decimals_for_step(step: f64) -> u8 {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 || step >= 1.0 {
        return 0;
    }
    // Strip float noise such as 0.30000000000000004 before measuring.
    let mut d = 0_u8;
    let mut s = step;
    while d < 12 && (s - s.round()).abs() > 1e-9 * s.max(1.0) {
        s *= 10.0;
        d += 1;
    }
    d
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn integer_steps_have_no_decimals() {
        assert_eq!(format_tick_with_step(20.0, 5.0), "20");
        assert_eq!(format_tick_with_step(-0.0, 1.0), "0");
        assert_eq!(format_tick_with_step(1500.0, 500.0), "1500");
    }

    #[test]
    fn fractional_steps_keep_needed_decimals() {
        assert_eq!(format_tick_with_step(0.5, 0.5), "0.5");
        assert_eq!(format_tick_with_step(0.30000000000000004, 0.1), "0.3");
        assert_eq!(format_tick_with_step(1.25, 0.25), "1.25");
        assert_eq!(format_tick_with_step(-0.0001, 0.1), "0.0");
    }
}
