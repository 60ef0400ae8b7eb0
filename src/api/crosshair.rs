use serde::{Deserialize, Serialize};

use crate::core::{PlotOrientation, Point};
use crate::render::{Color, Stroke};

/// Persistent crosshair settings of one axis family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairConfig {
    #[serde(default)]
    pub visible: bool,
    /// Snap to the data item closest to the anchor instead of the anchor itself.
    #[serde(default = "default_lock_on_data")]
    pub lock_on_data: bool,
    #[serde(default = "default_crosshair_stroke")]
    pub stroke: Stroke,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        Self {
            visible: false,
            lock_on_data: default_lock_on_data(),
            stroke: default_crosshair_stroke(),
        }
    }
}

impl CrosshairConfig {
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn locked_on_data(mut self, lock: bool) -> Self {
        self.lock_on_data = lock;
        self
    }
}

fn default_lock_on_data() -> bool {
    true
}

fn default_crosshair_stroke() -> Stroke {
    Stroke::dashed(0.5, Color::BLUE, 2.0, 2.0)
}

/// Per-draw crosshair tracking.
///
/// Created at the start of a draw from the anchor and the plot's current
/// crosshair values, fed candidate points by renderers, and read back once
/// the items are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CrosshairState {
    calculate_distance_in_data_space: bool,
    anchor: Option<Point>,
    anchor_x: f64,
    anchor_y: f64,
    crosshair_x: f64,
    crosshair_y: f64,
    row_key: Option<String>,
    column_key: Option<String>,
    dataset_index: usize,
    distance: f64,
}

impl Default for CrosshairState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CrosshairState {
    #[must_use]
    pub fn new(calculate_distance_in_data_space: bool) -> Self {
        Self {
            calculate_distance_in_data_space,
            anchor: None,
            anchor_x: f64::NAN,
            anchor_y: f64::NAN,
            crosshair_x: 0.0,
            crosshair_y: 0.0,
            row_key: None,
            column_key: None,
            dataset_index: 0,
            distance: f64::INFINITY,
        }
    }

    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<Point>) {
        self.anchor = anchor;
    }

    /// Anchor converted to a domain value; `NaN` when unknown.
    #[must_use]
    pub fn anchor_x(&self) -> f64 {
        self.anchor_x
    }

    pub fn set_anchor_x(&mut self, value: f64) {
        self.anchor_x = value;
    }

    /// Anchor converted to a range value; `NaN` when unknown.
    #[must_use]
    pub fn anchor_y(&self) -> f64 {
        self.anchor_y
    }

    pub fn set_anchor_y(&mut self, value: f64) {
        self.anchor_y = value;
    }

    #[must_use]
    pub fn crosshair_x(&self) -> f64 {
        self.crosshair_x
    }

    pub fn set_crosshair_x(&mut self, value: f64) {
        self.crosshair_x = value;
    }

    #[must_use]
    pub fn crosshair_y(&self) -> f64 {
        self.crosshair_y
    }

    pub fn set_crosshair_y(&mut self, value: f64) {
        self.crosshair_y = value;
    }

    #[must_use]
    pub fn row_key(&self) -> Option<&str> {
        self.row_key.as_deref()
    }

    #[must_use]
    pub fn column_key(&self) -> Option<&str> {
        self.column_key.as_deref()
    }

    pub fn set_category_keys(&mut self, row_key: Option<String>, column_key: Option<String>) {
        self.row_key = row_key;
        self.column_key = column_key;
    }

    #[must_use]
    pub fn dataset_index(&self) -> usize {
        self.dataset_index
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Squared distance from the anchor to a candidate, or `None` without anchor.
    ///
    /// `trans_x`/`trans_y` are the device coordinates along the domain and
    /// range axes, so the anchor is swapped for horizontal plots.
    fn candidate_distance(
        &self,
        x: f64,
        y: f64,
        trans_x: f64,
        trans_y: f64,
        orientation: PlotOrientation,
    ) -> Option<f64> {
        let anchor = self.anchor?;
        if self.calculate_distance_in_data_space {
            return Some((x - self.anchor_x).powi(2) + (y - self.anchor_y).powi(2));
        }
        let (ax, ay) = match orientation {
            PlotOrientation::Vertical => (anchor.x, anchor.y),
            PlotOrientation::Horizontal => (anchor.y, anchor.x),
        };
        Some((trans_x - ax).powi(2) + (trans_y - ay).powi(2))
    }

    /// Offers an XY item as the crosshair point; keeps it when it is the
    /// closest to the anchor so far.
    pub fn update_crosshair_point(
        &mut self,
        x: f64,
        y: f64,
        dataset_index: usize,
        trans_x: f64,
        trans_y: f64,
        orientation: PlotOrientation,
    ) {
        let Some(distance) = self.candidate_distance(x, y, trans_x, trans_y, orientation) else {
            return;
        };
        if distance < self.distance {
            self.crosshair_x = x;
            self.crosshair_y = y;
            self.dataset_index = dataset_index;
            self.distance = distance;
        }
    }

    /// Offers a category item; the domain value of a category is its column key.
    ///
    /// `trans` holds the item's device coordinates along the domain and range axes.
    pub fn update_category_point(
        &mut self,
        row_key: &str,
        column_key: &str,
        value: f64,
        dataset_index: usize,
        trans: (f64, f64),
        orientation: PlotOrientation,
    ) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let (ax, ay) = match orientation {
            PlotOrientation::Vertical => (anchor.x, anchor.y),
            PlotOrientation::Horizontal => (anchor.y, anchor.x),
        };
        let distance = (trans.0 - ax).powi(2) + (trans.1 - ay).powi(2);
        if distance < self.distance {
            self.row_key = Some(row_key.to_owned());
            self.column_key = Some(column_key.to_owned());
            self.crosshair_y = value;
            self.dataset_index = dataset_index;
            self.distance = distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_candidate_wins() {
        let mut state = CrosshairState::new(false);
        state.set_anchor(Some(Point::new(100.0, 50.0)));
        state.update_crosshair_point(1.0, 10.0, 0, 90.0, 50.0, PlotOrientation::Vertical);
        state.update_crosshair_point(2.0, 20.0, 1, 130.0, 50.0, PlotOrientation::Vertical);
        assert_eq!((state.crosshair_x(), state.crosshair_y()), (1.0, 10.0));
        assert_eq!(state.dataset_index(), 0);
        assert_eq!(state.distance(), 100.0);
    }

    #[test]
    fn no_anchor_means_no_update() {
        let mut state = CrosshairState::default();
        state.set_crosshair_x(7.0);
        state.update_crosshair_point(1.0, 1.0, 3, 0.0, 0.0, PlotOrientation::Vertical);
        assert_eq!(state.crosshair_x(), 7.0);
        assert_eq!(state.dataset_index(), 0);
    }

    #[test]
    fn horizontal_plots_swap_the_anchor() {
        let mut state = CrosshairState::new(false);
        // device x carries the range, device y the domain
        state.set_anchor(Some(Point::new(40.0, 10.0)));
        state.update_crosshair_point(1.0, 2.0, 0, 10.0, 40.0, PlotOrientation::Horizontal);
        assert_eq!(state.distance(), 0.0);
    }

    #[test]
    fn data_space_distance_uses_anchor_values() {
        let mut state = CrosshairState::new(true);
        state.set_anchor(Some(Point::new(0.0, 0.0)));
        state.set_anchor_x(1.0);
        state.set_anchor_y(1.0);
        state.update_crosshair_point(2.0, 1.0, 0, 500.0, 500.0, PlotOrientation::Vertical);
        assert_eq!(state.distance(), 1.0);
    }

    #[test]
    fn category_candidates_record_keys() {
        let mut state = CrosshairState::new(false);
        state.set_anchor(Some(Point::new(10.0, 10.0)));
        state.update_category_point("r", "c", 4.0, 2, (12.0, 10.0), PlotOrientation::Vertical);
        assert_eq!(state.row_key(), Some("r"));
        assert_eq!(state.column_key(), Some("c"));
        assert_eq!(state.crosshair_y(), 4.0);
        assert_eq!(state.dataset_index(), 2);
    }
}
