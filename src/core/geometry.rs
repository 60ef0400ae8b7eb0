use serde::{Deserialize, Serialize};

use crate::core::RectangleEdge;
use crate::error::{PlotError, PlotResult};

/// Point in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate of this point along the screen axis an edge's axis measures.
    #[must_use]
    pub fn coordinate_for_edge(self, edge: RectangleEdge) -> f64 {
        if edge.is_top_or_bottom() {
            self.x
        } else {
            self.y
        }
    }

    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle in device coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    #[must_use]
    pub fn min_x(self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn min_y(self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn max_y(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(self) -> f64 {
        self.y + self.height / 2.0
    }

    /// True when the rectangle has no drawable extent.
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Snaps the rectangle inward to whole device pixels.
    ///
    /// The min corner is rounded up and the max corner down so the result never
    /// grows beyond the input.
    #[must_use]
    pub fn integerised(self) -> Self {
        let x0 = self.min_x().ceil();
        let y0 = self.min_y().ceil();
        let x1 = self.max_x().floor();
        let y1 = self.max_y().floor();
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Extent along the screen axis measured by an axis on `edge`.
    #[must_use]
    pub fn extent_for_edge(self, edge: RectangleEdge) -> f64 {
        if edge.is_top_or_bottom() {
            self.width
        } else {
            self.height
        }
    }
}

/// Top/left/bottom/right margins in absolute device units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectangleInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl RectangleInsets {
    #[must_use]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn validate(self) -> PlotResult<Self> {
        for (name, value) in [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidArgument(format!(
                    "inset `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }

    /// Shrinks `area` by the insets on every side.
    #[must_use]
    pub fn trim(self, area: Rect) -> Rect {
        Rect::new(
            area.x + self.left,
            area.y + self.top,
            area.width - self.left - self.right,
            area.height - self.top - self.bottom,
        )
    }

    /// Outset on the side of the data area facing `edge`.
    #[must_use]
    pub fn outset(self, edge: RectangleEdge) -> f64 {
        match edge {
            RectangleEdge::Top => self.top,
            RectangleEdge::Bottom => self.bottom,
            RectangleEdge::Left => self.left,
            RectangleEdge::Right => self.right,
        }
    }
}

/// Border thickness reserved by axes on each side of the data area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisSpace {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl AxisSpace {
    #[must_use]
    pub const fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    #[must_use]
    pub fn get(self, edge: RectangleEdge) -> f64 {
        match edge {
            RectangleEdge::Top => self.top,
            RectangleEdge::Bottom => self.bottom,
            RectangleEdge::Left => self.left,
            RectangleEdge::Right => self.right,
        }
    }

    fn slot_mut(&mut self, edge: RectangleEdge) -> &mut f64 {
        match edge {
            RectangleEdge::Top => &mut self.top,
            RectangleEdge::Bottom => &mut self.bottom,
            RectangleEdge::Left => &mut self.left,
            RectangleEdge::Right => &mut self.right,
        }
    }

    /// Stacks `space` on `edge` (axes sharing a side do not overlap).
    pub fn add(&mut self, space: f64, edge: RectangleEdge) {
        *self.slot_mut(edge) += space;
    }

    /// Raises the reservation on `edge` to at least `space`.
    pub fn ensure_at_least(&mut self, space: f64, edge: RectangleEdge) {
        let slot = self.slot_mut(edge);
        if *slot < space {
            *slot = space;
        }
    }

    /// Removes the reserved borders from `area`.
    #[must_use]
    pub fn shrink(self, area: Rect) -> Rect {
        Rect::new(
            area.x + self.left,
            area.y + self.top,
            area.width - self.left - self.right,
            area.height - self.top - self.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integerised_rect_never_grows() {
        let rect = Rect::new(10.4, 20.6, 100.3, 50.2).integerised();
        assert_eq!(rect, Rect::new(11.0, 21.0, 99.0, 49.0));
    }

    #[test]
    fn axis_space_adds_and_ensures() {
        let mut space = AxisSpace::default();
        space.add(20.0, RectangleEdge::Left);
        space.add(15.0, RectangleEdge::Left);
        space.ensure_at_least(30.0, RectangleEdge::Left);
        space.ensure_at_least(12.0, RectangleEdge::Bottom);
        assert_eq!(space.left, 35.0);
        assert_eq!(space.bottom, 12.0);

        let area = space.shrink(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(area, Rect::new(35.0, 0.0, 165.0, 88.0));
    }

    #[test]
    fn insets_reject_negative_values() {
        assert!(RectangleInsets::new(1.0, -1.0, 0.0, 0.0).validate().is_err());
        assert!(RectangleInsets::zero().validate().is_ok());
    }
}
