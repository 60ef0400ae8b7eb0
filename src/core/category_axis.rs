use serde::{Deserialize, Serialize};

use crate::core::{Axis, AxisSpace, AxisState, AxisStyle, Rect, RectangleEdge, Tick};
use crate::error::{PlotError, PlotResult};
use crate::render::{DrawingSurface, estimate_text_width};

/// Position inside a category slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// Axis that divides its extent into equal slots, one per category.
///
/// The lower and upper margins leave space at either end, and the category
/// margin is shared out as gaps between neighbouring slots.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxis {
    label: Option<String>,
    style: AxisStyle,
    lower_margin: f64,
    upper_margin: f64,
    category_margin: f64,
    categories: Vec<String>,
}

impl Default for CategoryAxis {
    fn default() -> Self {
        Self {
            label: None,
            style: AxisStyle::default(),
            lower_margin: 0.05,
            upper_margin: 0.05,
            category_margin: 0.20,
            categories: Vec::new(),
        }
    }
}

impl CategoryAxis {
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
    pub fn margins(&self) -> (f64, f64, f64) {
        (self.lower_margin, self.upper_margin, self.category_margin)
    }

    /// Sets lower, upper and between-category margins as fractions of the axis length.
    pub fn set_margins(&mut self, lower: f64, upper: f64, category: f64) -> PlotResult<()> {
        for (name, value) in [("lower", lower), ("upper", upper), ("category", category)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidArgument(format!(
                    "{name} margin must be finite and >= 0"
                )));
            }
        }
        if lower + upper + category >= 1.0 {
            return Err(PlotError::InvalidArgument(
                "category axis margins must sum to less than 1".to_owned(),
            ));
        }
        self.lower_margin = lower;
        self.upper_margin = upper;
        self.category_margin = category;
        Ok(())
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Replaces the category keys the axis labels; called when the plot configures its axes.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
    }

    #[must_use]
    pub fn category_size(&self, count: usize, area: Rect, edge: RectangleEdge) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let available = area.extent_for_edge(edge);
        let used = if count > 1 {
            available * (1.0 - self.lower_margin - self.upper_margin - self.category_margin)
        } else {
            available * (1.0 - self.lower_margin - self.upper_margin)
        };
        used / count as f64
    }

    #[must_use]
    pub fn category_gap(&self, count: usize, area: Rect, edge: RectangleEdge) -> f64 {
        if count > 1 {
            area.extent_for_edge(edge) * self.category_margin / (count - 1) as f64
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn category_start(
        &self,
        category: usize,
        count: usize,
        area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        let origin = if edge.is_top_or_bottom() {
            area.min_x()
        } else {
            area.min_y()
        };
        let size = self.category_size(count, area, edge);
        let gap = self.category_gap(count, area, edge);
        origin + area.extent_for_edge(edge) * self.lower_margin + category as f64 * (size + gap)
    }

    #[must_use]
    pub fn category_middle(
        &self,
        category: usize,
        count: usize,
        area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        self.category_start(category, count, area, edge)
            + self.category_size(count, area, edge) / 2.0
    }

    #[must_use]
    pub fn category_end(
        &self,
        category: usize,
        count: usize,
        area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        self.category_start(category, count, area, edge) + self.category_size(count, area, edge)
    }

    #[must_use]
    pub fn category_coordinate(
        &self,
        anchor: CategoryAnchor,
        category: usize,
        count: usize,
        area: Rect,
        edge: RectangleEdge,
    ) -> f64 {
        match anchor {
            CategoryAnchor::Start => self.category_start(category, count, area, edge),
            CategoryAnchor::Middle => self.category_middle(category, count, area, edge),
            CategoryAnchor::End => self.category_end(category, count, area, edge),
        }
    }

    /// Slot index containing device coordinate `device`, if any.
    #[must_use]
    pub fn category_at(
        &self,
        device: f64,
        count: usize,
        area: Rect,
        edge: RectangleEdge,
    ) -> Option<usize> {
        (0..count).find(|category| {
            let start = self.category_start(*category, count, area, edge);
            let end = self.category_end(*category, count, area, edge);
            device >= start && device <= end
        })
    }

    fn ticks(&self) -> Vec<Tick> {
        self.categories
            .iter()
            .enumerate()
            .map(|(index, key)| Tick::major(index as f64, key.clone()))
            .collect()
    }
}

impl Axis for CategoryAxis {
    fn is_visible(&self) -> bool {
        self.style.visible
    }

    fn value_to_device(&self, value: f64, area: Rect, edge: RectangleEdge) -> f64 {
        let count = self.categories.len().max(1);
        let category = value.round().clamp(0.0, (count - 1) as f64) as usize;
        self.category_middle(category, count, area, edge)
    }

    fn reserve_space(&self, _plot_area: Rect, edge: RectangleEdge, space: &mut AxisSpace) {
        if !self.style.visible {
            return;
        }
        let widest = self
            .categories
            .iter()
            .map(|key| estimate_text_width(key, self.style.tick_label_font_size))
            .fold(0.0, f64::max);
        space.add(self.style.band_thickness(edge, widest, self.label()), edge);
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
        let ticks = self.ticks();
        if self.style.visible {
            let count = ticks.len();
            let positions: Vec<(f64, &str)> = ticks
                .iter()
                .enumerate()
                .map(|(index, tick)| {
                    (
                        self.category_middle(index, count, data_area, edge),
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slots_follow_margins() {
        let axis = CategoryAxis::new();
        let area = Rect::new(0.0, 0.0, 1000.0, 100.0);
        // 1000 * (1 - 0.05 - 0.05 - 0.2) / 3
        let size = axis.category_size(3, area, RectangleEdge::Bottom);
        assert_relative_eq!(size, 700.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(axis.category_gap(3, area, RectangleEdge::Bottom), 100.0);
        assert_relative_eq!(axis.category_start(0, 3, area, RectangleEdge::Bottom), 50.0);
        assert_relative_eq!(
            axis.category_start(1, 3, area, RectangleEdge::Bottom),
            50.0 + 700.0 / 3.0 + 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn single_category_ignores_category_margin() {
        let axis = CategoryAxis::new();
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_relative_eq!(axis.category_size(1, area, RectangleEdge::Bottom), 90.0);
        assert_relative_eq!(axis.category_middle(0, 1, area, RectangleEdge::Bottom), 50.0);
    }

    #[test]
    fn vertical_edges_start_at_top() {
        let axis = CategoryAxis::new();
        let area = Rect::new(0.0, 20.0, 50.0, 100.0);
        assert_relative_eq!(axis.category_start(0, 2, area, RectangleEdge::Left), 25.0);
    }

    #[test]
    fn margins_must_leave_room() {
        let mut axis = CategoryAxis::new();
        assert!(axis.set_margins(0.5, 0.3, 0.2).is_err());
        assert!(axis.set_margins(0.1, 0.1, 0.1).is_ok());
    }
}
