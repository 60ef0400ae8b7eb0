use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Closed numeric interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    lower: f64,
    upper: f64,
}

impl ValueRange {
    pub fn new(lower: f64, upper: f64) -> PlotResult<Self> {
        if lower.is_nan() || upper.is_nan() {
            return Err(PlotError::InvalidArgument(
                "range bounds must not be NaN".to_owned(),
            ));
        }
        if lower > upper {
            return Err(PlotError::InvalidArgument(format!(
                "range lower bound {lower} must be <= upper bound {upper}"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// `[0, 1]`, the fallback when nothing contributes to an auto-range.
    #[must_use]
    pub const fn unit() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Range spanning exactly one value.
    #[must_use]
    pub fn point(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    #[must_use]
    pub fn lower(self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn central_value(self) -> f64 {
        self.lower / 2.0 + self.upper / 2.0
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamps `value` into the range.
    #[must_use]
    pub fn constrain(self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    /// Smallest range covering both inputs; absent inputs are ignored.
    ///
    /// Commutative and associative, so folding a set of ranges in any order
    /// yields the same result.
    #[must_use]
    pub fn combine(left: Option<Self>, right: Option<Self>) -> Option<Self> {
        match (left, right) {
            (None, None) => None,
            (Some(range), None) | (None, Some(range)) => Some(range),
            (Some(a), Some(b)) => Some(Self {
                lower: a.lower.min(b.lower),
                upper: a.upper.max(b.upper),
            }),
        }
    }

    /// Extends an optional range to include a finite value; non-finite values are skipped.
    #[must_use]
    pub fn expand_to_include(range: Option<Self>, value: f64) -> Option<Self> {
        if !value.is_finite() {
            return range;
        }
        Self::combine(range, Some(Self::point(value)))
    }

    /// Moves both bounds by `delta`.
    #[must_use]
    pub fn shift(self, delta: f64) -> Self {
        Self {
            lower: self.lower + delta,
            upper: self.upper + delta,
        }
    }
}
