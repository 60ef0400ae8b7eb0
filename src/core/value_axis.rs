use crate::core::ticks::{
    VALUE_AXIS_MAX_TICKS, VALUE_AXIS_MIN_TICKS, VALUE_AXIS_TARGET_SPACING_PX,
    generate_value_ticks, nice_tick_step, tick_target_count,
};
use crate::core::{
    Axis, AxisSpace, AxisState, AxisStyle, LinearScale, Rect, RectangleEdge, Tick, ValueRange,
    device_span_for_edge,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{DrawingSurface, estimate_text_width};

pub const DEFAULT_AXIS_MARGIN: f64 = 0.05;
pub const DEFAULT_AUTO_RANGE_MINIMUM_SIZE: f64 = 1e-8;

/// Numeric axis with optional auto-ranging.
///
/// While auto-range is on, [`ValueAxis::configure`] recomputes the range from
/// the data range the owning plot reports; any explicit `set_range` turns it
/// off.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    label: Option<String>,
    style: AxisStyle,
    range: ValueRange,
    auto_range: bool,
    auto_range_includes_zero: bool,
    auto_range_sticky_zero: bool,
    auto_range_minimum_size: f64,
    default_auto_range: ValueRange,
    fixed_auto_range: f64,
    lower_margin: f64,
    upper_margin: f64,
    inverted: bool,
    minor_tick_count: usize,
    tick_spacing_px: f64,
    tick_unit: Option<f64>,
}

impl Default for ValueAxis {
    fn default() -> Self {
        let unit = ValueRange::unit();
        Self {
            label: None,
            style: AxisStyle::default(),
            range: unit,
            auto_range: true,
            auto_range_includes_zero: false,
            auto_range_sticky_zero: true,
            auto_range_minimum_size: DEFAULT_AUTO_RANGE_MINIMUM_SIZE,
            default_auto_range: unit,
            fixed_auto_range: 0.0,
            lower_margin: DEFAULT_AXIS_MARGIN,
            upper_margin: DEFAULT_AXIS_MARGIN,
            inverted: false,
            minor_tick_count: 0,
            tick_spacing_px: VALUE_AXIS_TARGET_SPACING_PX,
            tick_unit: None,
        }
    }
}

impl ValueAxis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    #[must_use]
    pub fn style(&self) -> &AxisStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: AxisStyle) -> PlotResult<()> {
        self.style = style.validate()?;
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.style.visible = visible;
    }

    #[must_use]
    pub fn range(&self) -> ValueRange {
        self.range
    }

    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.range.lower()
    }

    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.range.upper()
    }

    /// Fixes the range and turns auto-range off.
    pub fn set_range(&mut self, range: ValueRange) -> PlotResult<()> {
        if !(range.length() > 0.0) || !range.length().is_finite() {
            return Err(PlotError::InvalidArgument(
                "axis range must have a finite, positive length".to_owned(),
            ));
        }
        self.auto_range = false;
        self.range = range;
        Ok(())
    }

    pub fn set_range_bounds(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        self.set_range(ValueRange::new(lower, upper)?)
    }

    pub fn with_range(mut self, lower: f64, upper: f64) -> PlotResult<Self> {
        self.set_range_bounds(lower, upper)?;
        Ok(self)
    }

    #[must_use]
    pub fn is_auto_range(&self) -> bool {
        self.auto_range
    }

    /// Turning auto-range on takes effect at the next `configure`.
    pub fn set_auto_range(&mut self, auto_range: bool) {
        self.auto_range = auto_range;
    }

    #[must_use]
    pub fn auto_range_includes_zero(&self) -> bool {
        self.auto_range_includes_zero
    }

    pub fn set_auto_range_includes_zero(&mut self, include: bool) {
        self.auto_range_includes_zero = include;
    }

    pub fn set_auto_range_sticky_zero(&mut self, sticky: bool) {
        self.auto_range_sticky_zero = sticky;
    }

    #[must_use]
    pub fn auto_range_minimum_size(&self) -> f64 {
        self.auto_range_minimum_size
    }

    pub fn set_auto_range_minimum_size(&mut self, size: f64) -> PlotResult<()> {
        if !size.is_finite() || size <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "auto range minimum size must be finite and > 0".to_owned(),
            ));
        }
        self.auto_range_minimum_size = size;
        Ok(())
    }

    pub fn set_default_auto_range(&mut self, range: ValueRange) -> PlotResult<()> {
        if !(range.length() > 0.0) {
            return Err(PlotError::InvalidArgument(
                "default auto range must have a positive length".to_owned(),
            ));
        }
        self.default_auto_range = range;
        Ok(())
    }

    /// Keeps only the last `length` units of data visible; `0` disables.
    pub fn set_fixed_auto_range(&mut self, length: f64) -> PlotResult<()> {
        if !length.is_finite() || length < 0.0 {
            return Err(PlotError::InvalidArgument(
                "fixed auto range must be finite and >= 0".to_owned(),
            ));
        }
        self.fixed_auto_range = length;
        Ok(())
    }

    #[must_use]
    pub fn margins(&self) -> (f64, f64) {
        (self.lower_margin, self.upper_margin)
    }

    pub fn set_margins(&mut self, lower: f64, upper: f64) -> PlotResult<()> {
        for (name, value) in [("lower", lower), ("upper", upper)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidArgument(format!(
                    "{name} margin must be finite and >= 0"
                )));
            }
        }
        self.lower_margin = lower;
        self.upper_margin = upper;
        Ok(())
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    #[must_use]
    pub fn minor_tick_count(&self) -> usize {
        self.minor_tick_count
    }

    pub fn set_minor_tick_count(&mut self, count: usize) {
        self.minor_tick_count = count;
    }

    /// Forces a tick step instead of choosing one from the available space.
    pub fn set_tick_unit(&mut self, unit: Option<f64>) -> PlotResult<()> {
        if let Some(step) = unit {
            if !step.is_finite() || step <= 0.0 {
                return Err(PlotError::InvalidArgument(
                    "tick unit must be finite and > 0".to_owned(),
                ));
            }
        }
        self.tick_unit = unit;
        Ok(())
    }

    pub fn set_tick_spacing_px(&mut self, spacing: f64) -> PlotResult<()> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "tick spacing must be finite and > 0".to_owned(),
            ));
        }
        self.tick_spacing_px = spacing;
        Ok(())
    }

    /// Recomputes the range from `data_range` when auto-range is on.
    pub fn configure(&mut self, data_range: Option<ValueRange>) {
        if self.auto_range {
            self.auto_adjust_range(data_range);
        }
    }

    fn auto_adjust_range(&mut self, data_range: Option<ValueRange>) {
        let source = data_range.unwrap_or(self.default_auto_range);
        let mut lower = source.lower();
        let mut upper = source.upper();

        if self.auto_range_includes_zero {
            lower = lower.min(0.0);
            upper = upper.max(0.0);
        }
        let length = upper - lower;

        if self.fixed_auto_range > 0.0 {
            lower = upper - self.fixed_auto_range;
        } else {
            if length < self.auto_range_minimum_size {
                let expand = (self.auto_range_minimum_size - length) / 2.0;
                upper += expand;
                lower -= expand;
                if lower == upper {
                    let adjust = lower.abs() / 10.0;
                    lower -= adjust;
                    upper += adjust;
                }
            }

            if self.auto_range_sticky_zero {
                upper = if upper <= 0.0 {
                    (upper + self.upper_margin * length).min(0.0)
                } else {
                    upper + self.upper_margin * length
                };
                lower = if lower >= 0.0 {
                    (lower - self.lower_margin * length).max(0.0)
                } else {
                    lower - self.lower_margin * length
                };
            } else {
                upper += self.upper_margin * length;
                lower -= self.lower_margin * length;
            }
        }

        match ValueRange::new(lower, upper) {
            Ok(range) if range.length() > 0.0 => self.range = range,
            _ => {
                tracing::debug!(lower, upper, "auto range degenerate, keeping default");
                self.range = self.default_auto_range;
            }
        }
    }

    /// Maps a data value to a device coordinate along `edge` of `area`.
    #[must_use]
    pub fn value_to_device(&self, value: f64, area: Rect, edge: RectangleEdge) -> f64 {
        let (start, end) = device_span_for_edge(area, edge, self.inverted);
        match LinearScale::from_range(self.range) {
            Some(scale) => scale.value_to_device(value, start, end),
            None => start,
        }
    }

    #[must_use]
    pub fn device_to_value(&self, device: f64, area: Rect, edge: RectangleEdge) -> f64 {
        let (start, end) = device_span_for_edge(area, edge, self.inverted);
        match LinearScale::from_range(self.range) {
            Some(scale) => scale.device_to_value(device, start, end),
            None => self.range.lower(),
        }
    }

    /// Shifts the range by `percent` of its length.
    pub fn pan(&mut self, percent: f64) {
        let delta = self.range.length() * percent;
        self.apply_range(self.range.lower() + delta, self.range.upper() + delta);
    }

    /// Scales the range by `percent` around its centre; `percent <= 0` restores auto-range.
    pub fn resize_range(&mut self, percent: f64) {
        self.resize_range_around(percent, self.range.central_value());
    }

    /// Scales the range by `percent` centred on `anchor`.
    pub fn resize_range_around(&mut self, percent: f64, anchor: f64) {
        if percent > 0.0 {
            let half = self.range.length() * percent / 2.0;
            self.apply_range(anchor - half, anchor + half);
        } else {
            self.auto_range = true;
        }
    }

    /// Scales each side's distance from `anchor` by `percent`, keeping the
    /// anchor at the same relative position.
    pub fn resize_range_keep_anchor(&mut self, percent: f64, anchor: f64) {
        if percent > 0.0 {
            let left = anchor - self.range.lower();
            let right = self.range.upper() - anchor;
            self.apply_range(anchor - left * percent, anchor + right * percent);
        } else {
            self.auto_range = true;
        }
    }

    /// Zooms to the `[lower_percent, upper_percent]` window of the current range.
    pub fn zoom_range(&mut self, lower_percent: f64, upper_percent: f64) {
        let start = self.range.lower();
        let length = self.range.length();
        if self.inverted {
            self.apply_range(
                start + length * (1.0 - upper_percent),
                start + length * (1.0 - lower_percent),
            );
        } else {
            self.apply_range(start + length * lower_percent, start + length * upper_percent);
        }
    }

    fn apply_range(&mut self, lower: f64, upper: f64) {
        match ValueRange::new(lower, upper) {
            Ok(range) if range.length() > 0.0 && range.length().is_finite() => {
                self.auto_range = false;
                self.range = range;
            }
            _ => tracing::debug!(lower, upper, "ignoring degenerate axis range"),
        }
    }

    /// Ticks for the current range laid out along `edge` of `data_area`.
    #[must_use]
    pub fn refresh_ticks(&self, data_area: Rect, edge: RectangleEdge) -> Vec<Tick> {
        let step = self.tick_unit.unwrap_or_else(|| {
            let count = tick_target_count(
                data_area.extent_for_edge(edge),
                self.tick_spacing_px,
                VALUE_AXIS_MIN_TICKS,
                VALUE_AXIS_MAX_TICKS,
            );
            nice_tick_step(self.range.length(), count)
        });
        generate_value_ticks(self.range, step, self.minor_tick_count)
    }

    fn widest_tick_label(&self, ticks: &[Tick]) -> f64 {
        ticks
            .iter()
            .map(|tick| estimate_text_width(&tick.label, self.style.tick_label_font_size))
            .fold(0.0, f64::max)
    }
}

impl Axis for ValueAxis {
    fn is_visible(&self) -> bool {
        self.style.visible
    }

    fn value_to_device(&self, value: f64, area: Rect, edge: RectangleEdge) -> f64 {
        ValueAxis::value_to_device(self, value, area, edge)
    }

    fn reserve_space(&self, plot_area: Rect, edge: RectangleEdge, space: &mut AxisSpace) {
        if !self.style.visible {
            return;
        }
        let ticks = self.refresh_ticks(plot_area, edge);
        let widest = self.widest_tick_label(&ticks);
        space.add(
            self.style.band_thickness(edge, widest, self.label()),
            edge,
        );
    }

    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        cursor: f64,
        _plot_area: Rect,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<AxisState> {
        let mut state = AxisState::new(cursor, edge);
        let ticks = self.refresh_ticks(data_area, edge);
        if self.style.visible {
            let positions: Vec<(f64, &str)> = ticks
                .iter()
                .filter(|tick| tick.major)
                .map(|tick| {
                    (
                        self.value_to_device(tick.value, data_area, edge),
                        tick.label.as_str(),
                    )
                })
                .collect();
            self.style
                .draw_decorations(surface, &mut state, data_area, &positions, self.label())?;
        }
        state.ticks = ticks;
        Ok(state)
    }
}
