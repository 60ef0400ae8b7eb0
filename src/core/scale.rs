use crate::core::{Rect, RectangleEdge, ValueRange};
use crate::error::{PlotError, PlotResult};

/// Linear mapping between a value interval and a device-coordinate span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> PlotResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(PlotError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn from_range(range: ValueRange) -> Option<Self> {
        Self::new(range.lower(), range.upper()).ok()
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    /// Maps `value` onto the device span `[device_start, device_end]`.
    #[must_use]
    pub fn value_to_device(self, value: f64, device_start: f64, device_end: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        device_start + normalized * (device_end - device_start)
    }

    /// Inverse of [`LinearScale::value_to_device`].
    #[must_use]
    pub fn device_to_value(self, device: f64, device_start: f64, device_end: f64) -> f64 {
        let device_span = device_end - device_start;
        if device_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (device - device_start) / device_span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }
}

/// Device span `(start, end)` an axis on `edge` maps its lower/upper bound onto.
///
/// Horizontal axes grow left to right; vertical axes grow bottom to top.
/// Inverted axes swap the ends.
#[must_use]
pub fn device_span_for_edge(area: Rect, edge: RectangleEdge, inverted: bool) -> (f64, f64) {
    let (start, end) = if edge.is_top_or_bottom() {
        (area.min_x(), area.max_x())
    } else {
        (area.max_y(), area.min_y())
    };
    if inverted { (end, start) } else { (start, end) }
}
