// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Calendar-aware time ticks and nice time domains.
//!
//! Time is epoch milliseconds (UTC). Steps run from milliseconds through seconds, minutes,
//! hours, days and weeks (fixed durations) to months and years (calendar units of varying
//! length).

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Datelike, NaiveDate};

const SECOND: i64 = 1000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
// 1970-01-04 was the first Sunday after the epoch.
const SUNDAY_OFFSET: i64 = 3 * DAY;

/// A tick interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TimeStep {
    /// A fixed number of milliseconds (up to days), aligned to the epoch.
    Millis(i64),
    /// One week, aligned to Sundays.
    Week,
    /// A number of calendar months, aligned to the start of the year.
    Months(i32),
}

impl TimeStep {
    fn approx_ms(self) -> i64 {
        match self {
            Self::Millis(ms) => ms,
            Self::Week => WEEK,
            Self::Months(m) => i64::from(m) * 30 * DAY,
        }
    }

    /// Rounds `t` down to a step boundary.
    pub(crate) fn floor(self, t: i64) -> i64 {
        match self {
            Self::Millis(ms) => t.div_euclid(ms) * ms,
            Self::Week => (t - SUNDAY_OFFSET).div_euclid(WEEK) * WEEK + SUNDAY_OFFSET,
            Self::Months(n) => {
                let Some(index) = month_index(t) else {
                    return t;
                };
                from_month_index(index - index.rem_euclid(n)).unwrap_or(t)
            }
        }
    }

    /// Rounds `t` up to a step boundary.
    pub(crate) fn ceil(self, t: i64) -> i64 {
        let f = self.floor(t);
        if f == t { t } else { self.offset(f, 1) }
    }

    /// Advances `t` by `k` steps.
    pub(crate) fn offset(self, t: i64, k: i32) -> i64 {
        match self {
            Self::Millis(ms) => t.saturating_add(ms.saturating_mul(i64::from(k))),
            Self::Week => t.saturating_add(WEEK.saturating_mul(i64::from(k))),
            Self::Months(n) => month_index(t)
                .and_then(|i| from_month_index(i + n * k))
                .unwrap_or(t),
        }
    }
}

const FIXED_STEPS: &[TimeStep] = &[
    TimeStep::Millis(1),
    TimeStep::Millis(2),
    TimeStep::Millis(5),
    TimeStep::Millis(10),
    TimeStep::Millis(20),
    TimeStep::Millis(50),
    TimeStep::Millis(100),
    TimeStep::Millis(200),
    TimeStep::Millis(500),
    TimeStep::Millis(SECOND),
    TimeStep::Millis(5 * SECOND),
    TimeStep::Millis(15 * SECOND),
    TimeStep::Millis(30 * SECOND),
    TimeStep::Millis(MINUTE),
    TimeStep::Millis(5 * MINUTE),
    TimeStep::Millis(15 * MINUTE),
    TimeStep::Millis(30 * MINUTE),
    TimeStep::Millis(HOUR),
    TimeStep::Millis(3 * HOUR),
    TimeStep::Millis(6 * HOUR),
    TimeStep::Millis(12 * HOUR),
    TimeStep::Millis(DAY),
    TimeStep::Millis(2 * DAY),
    TimeStep::Week,
    TimeStep::Months(1),
    TimeStep::Months(3),
    TimeStep::Months(12),
];

/// Picks a step giving roughly `count` intervals over `span_ms`.
pub(crate) fn time_step(span_ms: f64, count: usize) -> TimeStep {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "saturating float-to-int conversion of a duration"
    )]
    let target = (span_ms / count.max(1) as f64) as i64;
    for &s in FIXED_STEPS {
        if s.approx_ms() >= target {
            return s;
        }
    }
    // Multi-year: 1, 2, 5 x 10^k years.
    let years = target / (365 * DAY);
    let mut base = 1_i32;
    loop {
        for m in [1, 2, 5] {
            let n = base.saturating_mul(m);
            if i64::from(n) >= years || n == i32::MAX {
                return TimeStep::Months(n.saturating_mul(12));
            }
        }
        base = base.saturating_mul(10);
    }
}

/// Extends `[min, max]` outward to step boundaries, repeating until the step is stable.
pub(crate) fn nice_time_domain(min: f64, max: f64, count: usize) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return (min, max);
    }
    let (mut lo, mut hi) = (to_ms(min), to_ms(max));
    for _ in 0..10 {
        let step = time_step((hi - lo) as f64, count);
        let (nlo, nhi) = (step.floor(lo), step.ceil(hi));
        if (nlo, nhi) == (lo, hi) {
            break;
        }
        (lo, hi) = (nlo, nhi);
    }
    (lo as f64, hi as f64)
}

/// Returns tick values within `[min, max]` and the step that produced them.
pub(crate) fn time_ticks(min: f64, max: f64, count: usize) -> (Vec<f64>, TimeStep) {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let step = time_step(max - min, count);
    if !min.is_finite() || !max.is_finite() || count == 0 {
        return (Vec::new(), step);
    }
    let hi = to_ms(max);
    let mut t = step.ceil(to_ms(min));
    let mut out = Vec::new();
    while t <= hi && out.len() < 10_000 {
        out.push(t as f64);
        let next = step.offset(t, 1);
        if next <= t {
            break;
        }
        t = next;
    }
    (out, step)
}

/// Formats a tick at `ms` at a precision suited to `step`.
pub(crate) fn format_time(ms: f64, step: TimeStep) -> String {
    let Some(dt) = DateTime::from_timestamp_millis(to_ms(ms)) else {
        return alloc::format!("{ms}");
    };
    let pattern = match step {
        TimeStep::Millis(s) if s < SECOND => "%H:%M:%S%.3f",
        TimeStep::Millis(s) if s < MINUTE => "%H:%M:%S",
        TimeStep::Millis(s) if s < DAY => "%H:%M",
        TimeStep::Millis(_) | TimeStep::Week => "%b %d",
        TimeStep::Months(n) if n < 12 => "%b %Y",
        TimeStep::Months(_) => "%Y",
    };
    alloc::format!("{}", dt.format(pattern))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "saturating float-to-int conversion of a timestamp"
)]
fn to_ms(v: f64) -> i64 {
    v as i64
}

fn month_index(t: i64) -> Option<i32> {
    let dt = DateTime::from_timestamp_millis(t)?;
    Some(dt.year() * 12 + i32::try_from(dt.month0()).ok()?)
}

fn from_month_index(index: i32) -> Option<i64> {
    let year = index.div_euclid(12);
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use vizlite_data::parse_timestamp;

    fn ms(s: &str) -> f64 {
        parse_timestamp(s).unwrap() as f64
    }

    #[test]
    fn steps_grow_with_span() {
        assert_eq!(time_step(5.0 * SECOND as f64, 5), TimeStep::Millis(SECOND));
        assert_eq!(time_step(3.0 * HOUR as f64, 5), TimeStep::Millis(HOUR));
        assert_eq!(time_step(5.0 * WEEK as f64, 5), TimeStep::Week);
        assert_eq!(time_step(300.0 * DAY as f64, 5), TimeStep::Months(3));
        assert_eq!(time_step(20.0 * 365.0 * DAY as f64, 5), TimeStep::Months(60));
    }

    #[test]
    fn month_ticks_land_on_first_of_month() {
        let (ticks, step) = time_ticks(ms("2020-01-15"), ms("2020-06-10"), 5);
        assert_eq!(step, TimeStep::Months(1));
        assert_eq!(ticks.first().copied(), Some(ms("2020-02-01")));
        assert_eq!(ticks.last().copied(), Some(ms("2020-06-01")));
        assert_eq!(format_time(ticks[0], step), "Feb 2020");
    }

    #[test]
    fn nice_time_domain_is_idempotent() {
        // Month steps widen the span enough to switch to quarters.
        let d = nice_time_domain(ms("2020-01-15"), ms("2020-06-10"), 5);
        assert_eq!(d, (ms("2020-01-01"), ms("2020-07-01")));
        assert_eq!(nice_time_domain(d.0, d.1, 5), d);
    }

    #[test]
    fn weeks_align_to_sunday() {
        // 2024-01-10 is a Wednesday.
        let t = parse_timestamp("2024-01-10").unwrap();
        assert_eq!(
            TimeStep::Week.floor(t),
            parse_timestamp("2024-01-07").unwrap()
        );
    }
}
