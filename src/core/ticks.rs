use serde::{Deserialize, Serialize};

use crate::core::ValueRange;

pub const VALUE_AXIS_TARGET_SPACING_PX: f64 = 60.0;
pub const VALUE_AXIS_MIN_TICKS: usize = 2;
pub const VALUE_AXIS_MAX_TICKS: usize = 20;
/// Upper bound on the major intervals `generate_value_ticks` will walk.
/// Wider spans produce no ticks at all.
pub const VALUE_AXIS_MAX_TICK_INTERVALS: usize = VALUE_AXIS_MAX_TICKS * 50;

// Largest tick index that still converts exactly between f64 and i64.
const MAX_TICK_INDEX: f64 = 9_007_199_254_740_992.0;

/// One tick position produced by an axis while drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
    pub major: bool,
}

impl Tick {
    #[must_use]
    pub fn major(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            major: true,
        }
    }

    #[must_use]
    pub fn minor(value: f64) -> Self {
        Self {
            value,
            label: String::new(),
            major: false,
        }
    }
}

/// How many ticks fit along `axis_span_px` at the requested spacing.
#[must_use]
pub fn tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Rounds a raw step up to the next 1, 2 or 5 times a power of ten.
#[must_use]
pub fn nice_tick_step(span: f64, target_count: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let intervals = target_count.saturating_sub(1).max(1) as f64;
    let raw = span / intervals;
    let magnitude = 10_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Major ticks at multiples of `step` inside `range`, with `minor_count`
/// minor ticks between neighbouring majors.
///
/// Returns no ticks when the range spans more than
/// [`VALUE_AXIS_MAX_TICK_INTERVALS`] steps, so at most
/// `VALUE_AXIS_MAX_TICK_INTERVALS + 1` majors are ever produced.
#[must_use]
pub fn generate_value_ticks(range: ValueRange, step: f64, minor_count: usize) -> Vec<Tick> {
    let mut ticks = Vec::new();
    let span = range.length();
    if !step.is_finite() || step <= 0.0 || !span.is_finite() || span <= 0.0 {
        return ticks;
    }
    let steps = span / step;
    if !steps.is_finite() || steps > VALUE_AXIS_MAX_TICK_INTERVALS as f64 {
        return ticks;
    }

    let tolerance = step * 1e-9;
    let first = (range.lower() / step).ceil();
    let last = ((range.upper() + tolerance) / step).floor();
    if !first.is_finite()
        || !last.is_finite()
        || first.abs() >= MAX_TICK_INDEX
        || last.abs() >= MAX_TICK_INDEX
    {
        return ticks;
    }
    let (first, last) = (first as i64, last as i64);
    let intervals = last.checked_sub(first).unwrap_or(-1);
    if intervals < 0 || intervals as usize > VALUE_AXIS_MAX_TICK_INTERVALS {
        return ticks;
    }

    let minor_step = step / minor_count.saturating_add(1) as f64;
    for index in first.saturating_sub(1)..=last {
        let value = index as f64 * step;
        if index >= first {
            ticks.push(Tick::major(normalize_zero(value), format_tick_value(value, step)));
        }
        for minor in 1..=minor_count {
            let minor_value = value + minor_step * minor as f64;
            if range.contains(minor_value) && minor_value < (index + 1) as f64 * step - tolerance {
                ticks.push(Tick::minor(minor_value));
            }
        }
    }
    ticks
}

/// Formats a tick value with as many decimals as the step needs.
#[must_use]
pub fn format_tick_value(value: f64, step: f64) -> String {
    let decimals = if step <= 0.0 || !step.is_finite() {
        0
    } else {
        (0..=10_i32)
            .find(|digits| {
                let scaled = step * 10_f64.powi(*digits);
                (scaled - scaled.round()).abs() <= 1e-9 * scaled.abs().max(1.0)
            })
            .unwrap_or(10) as usize
    };
    format!("{:.*}", decimals, normalize_zero(value))
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_count_is_clamped() {
        assert_eq!(tick_target_count(0.0, 60.0, 2, 10), 2);
        assert_eq!(tick_target_count(600.0, 60.0, 2, 8), 8);
        assert_eq!(tick_target_count(240.0, 60.0, 2, 10), 5);
    }

    #[test]
    fn nice_steps_are_one_two_five() {
        assert_eq!(nice_tick_step(10.0, 11), 1.0);
        assert_eq!(nice_tick_step(10.0, 6), 2.0);
        assert_eq!(nice_tick_step(100.0, 4), 50.0);
        assert_eq!(nice_tick_step(1000.0, 3), 500.0);
    }

    #[test]
    fn ticks_cover_range_inclusively() {
        let range = ValueRange::new(0.0, 10.0).expect("range");
        let ticks = generate_value_ticks(range, 2.5, 0);
        let values: Vec<f64> = ticks.iter().map(|tick| tick.value).collect();
        assert_eq!(values, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(ticks[1].label, "2.5");
    }

    #[test]
    fn minor_ticks_sit_between_majors() {
        let range = ValueRange::new(0.0, 2.0).expect("range");
        let ticks = generate_value_ticks(range, 1.0, 1);
        let minors: Vec<f64> = ticks
            .iter()
            .filter(|tick| !tick.major)
            .map(|tick| tick.value)
            .collect();
        assert_eq!(minors, vec![0.5, 1.5]);
    }

    #[test]
    fn extreme_range_with_a_small_step_yields_no_ticks() {
        let range = ValueRange::new(-1e19, 1e19).expect("range");
        assert!(generate_value_ticks(range, 1.0, 0).is_empty());
        assert!(generate_value_ticks(range, 1.0, 4).is_empty());
    }

    #[test]
    fn far_from_zero_range_beyond_exact_indices_yields_no_ticks() {
        let range = ValueRange::new(1e300, 2e300).expect("range");
        assert!(generate_value_ticks(range, 1e-10, 0).is_empty());
        assert!(generate_value_ticks(range, 1e299, 0).len() <= VALUE_AXIS_MAX_TICK_INTERVALS + 1);
    }
}
