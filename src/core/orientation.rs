use serde::{Deserialize, Serialize};

/// Which geometric role the domain axis plays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlotOrientation {
    /// Domain runs along the horizontal screen axis, range along the vertical one.
    #[default]
    Vertical,
    /// Domain runs along the vertical screen axis, range along the horizontal one.
    Horizontal,
}

/// Axis family selector used by registry, mapping and crosshair operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisFamily {
    Domain,
    Range,
}

/// Concrete side of the data area an axis is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RectangleEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl RectangleEdge {
    #[must_use]
    pub const fn is_top_or_bottom(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    #[must_use]
    pub const fn is_left_or_right(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Orientation-independent axis placement.
///
/// Each variant names the edge used for a horizontal axis first and the edge
/// used for a vertical axis second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisLocation {
    TopOrLeft,
    TopOrRight,
    BottomOrLeft,
    BottomOrRight,
}

impl AxisLocation {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopOrLeft => Self::BottomOrRight,
            Self::TopOrRight => Self::BottomOrLeft,
            Self::BottomOrLeft => Self::TopOrRight,
            Self::BottomOrRight => Self::TopOrLeft,
        }
    }

    pub const ALL: [Self; 4] = [
        Self::TopOrLeft,
        Self::TopOrRight,
        Self::BottomOrLeft,
        Self::BottomOrRight,
    ];
}

/// Resolves a domain-axis location to a screen edge.
#[must_use]
pub const fn resolve_domain_edge(
    location: AxisLocation,
    orientation: PlotOrientation,
) -> RectangleEdge {
    match (location, orientation) {
        (AxisLocation::TopOrLeft | AxisLocation::TopOrRight, PlotOrientation::Vertical) => {
            RectangleEdge::Top
        }
        (AxisLocation::BottomOrLeft | AxisLocation::BottomOrRight, PlotOrientation::Vertical) => {
            RectangleEdge::Bottom
        }
        (AxisLocation::TopOrLeft | AxisLocation::BottomOrLeft, PlotOrientation::Horizontal) => {
            RectangleEdge::Left
        }
        (AxisLocation::TopOrRight | AxisLocation::BottomOrRight, PlotOrientation::Horizontal) => {
            RectangleEdge::Right
        }
    }
}

/// Resolves a range-axis location to a screen edge.
#[must_use]
pub const fn resolve_range_edge(
    location: AxisLocation,
    orientation: PlotOrientation,
) -> RectangleEdge {
    match (location, orientation) {
        (AxisLocation::TopOrLeft | AxisLocation::BottomOrLeft, PlotOrientation::Vertical) => {
            RectangleEdge::Left
        }
        (AxisLocation::TopOrRight | AxisLocation::BottomOrRight, PlotOrientation::Vertical) => {
            RectangleEdge::Right
        }
        (AxisLocation::TopOrLeft | AxisLocation::TopOrRight, PlotOrientation::Horizontal) => {
            RectangleEdge::Top
        }
        (AxisLocation::BottomOrLeft | AxisLocation::BottomOrRight, PlotOrientation::Horizontal) => {
            RectangleEdge::Bottom
        }
    }
}

/// Iteration order over dataset/renderer indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DatasetRenderingOrder {
    Forward,
    /// Primary dataset (index 0) is drawn last so it overlays the others.
    #[default]
    Reverse,
}

/// Iteration order over the series of one XY dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SeriesRenderingOrder {
    Forward,
    /// Series 0 is drawn last so it sits on top.
    #[default]
    Reverse,
}

/// Row/column traversal order for category datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Decoration layer relative to the data items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Layer {
    #[default]
    Foreground,
    Background,
}

/// Ordering of x values inside an XY series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DomainOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_edges_follow_orientation() {
        assert_eq!(
            resolve_domain_edge(AxisLocation::BottomOrLeft, PlotOrientation::Vertical),
            RectangleEdge::Bottom
        );
        assert_eq!(
            resolve_domain_edge(AxisLocation::BottomOrLeft, PlotOrientation::Horizontal),
            RectangleEdge::Left
        );
        assert_eq!(
            resolve_domain_edge(AxisLocation::TopOrRight, PlotOrientation::Horizontal),
            RectangleEdge::Right
        );
    }

    #[test]
    fn range_edges_swap_with_domain_roles() {
        assert_eq!(
            resolve_range_edge(AxisLocation::BottomOrLeft, PlotOrientation::Vertical),
            RectangleEdge::Left
        );
        assert_eq!(
            resolve_range_edge(AxisLocation::BottomOrLeft, PlotOrientation::Horizontal),
            RectangleEdge::Bottom
        );
        assert_eq!(
            resolve_range_edge(AxisLocation::TopOrRight, PlotOrientation::Vertical),
            RectangleEdge::Right
        );
    }

    #[test]
    fn opposite_location_resolves_to_opposite_edge() {
        for orientation in [PlotOrientation::Vertical, PlotOrientation::Horizontal] {
            for location in AxisLocation::ALL {
                let edge = resolve_range_edge(location, orientation);
                let opposite = resolve_range_edge(location.opposite(), orientation);
                assert_eq!(edge.opposite(), opposite);
            }
        }
    }
}
