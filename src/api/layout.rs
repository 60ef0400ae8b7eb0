use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::axis_registry::AxisRegistry;
use crate::core::{
    Axis, AxisFamily, AxisKey, AxisSpace, AxisState, PlotOrientation, Rect, RectangleEdge,
    RectangleInsets,
};
use crate::error::PlotResult;
use crate::render::DrawingSurface;

/// Areas narrower or shorter than this are not drawn at all.
pub const MINIMUM_DRAW_EXTENT: f64 = 10.0;

/// Declarative inputs of the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default = "RectangleInsets::zero")]
    pub insets: RectangleInsets,
    /// Gap between the data area and the axes.
    #[serde(default = "RectangleInsets::zero")]
    pub axis_offset: RectangleInsets,
    /// Overrides the reserved space of the domain axes when set.
    #[serde(default)]
    pub fixed_domain_axis_space: Option<AxisSpace>,
    /// Overrides the reserved space of the range axes when set.
    #[serde(default)]
    pub fixed_range_axis_space: Option<AxisSpace>,
}

/// Outcome of the sizing pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    /// Area left after the outer insets.
    pub plot_area: Rect,
    pub axis_space: AxisSpace,
    pub data_area: Rect,
}

/// Computes axis bands and the data area, and draws axes around it.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine<'a> {
    settings: &'a LayoutSettings,
}

impl<'a> LayoutEngine<'a> {
    #[must_use]
    pub fn new(settings: &'a LayoutSettings) -> Self {
        Self { settings }
    }

    /// Sizes the plot inside `area`; `None` when nothing can be drawn.
    #[must_use]
    pub fn reserve_space<D: Axis, R: Axis>(
        &self,
        registry: &AxisRegistry<D, R>,
        area: Rect,
    ) -> Option<PlotLayout> {
        let plot_area = self.settings.insets.trim(area);
        if plot_area.width <= MINIMUM_DRAW_EXTENT || plot_area.height <= MINIMUM_DRAW_EXTENT {
            trace!(
                width = plot_area.width,
                height = plot_area.height,
                "plot area too small to draw"
            );
            return None;
        }
        let axis_space = self.calculate_axis_space(registry, plot_area);
        let data_area = self
            .settings
            .axis_offset
            .trim(axis_space.shrink(plot_area))
            .integerised();
        if data_area.is_empty() {
            trace!("data area collapsed after reserving axis space");
            return None;
        }
        Some(PlotLayout {
            plot_area,
            axis_space,
            data_area,
        })
    }

    /// Range axes reserve first against the full plot area; domain axes then
    /// reserve against what is left.
    #[must_use]
    pub fn calculate_axis_space<D: Axis, R: Axis>(
        &self,
        registry: &AxisRegistry<D, R>,
        plot_area: Rect,
    ) -> AxisSpace {
        let mut space = AxisSpace::default();
        self.calculate_range_axis_space(registry, plot_area, &mut space);
        let reduced = space.shrink(plot_area);
        self.calculate_domain_axis_space(registry, reduced, &mut space);
        space
    }

    fn calculate_domain_axis_space<D: Axis, R: Axis>(
        &self,
        registry: &AxisRegistry<D, R>,
        plot_area: Rect,
        space: &mut AxisSpace,
    ) {
        if let Some(fixed) = self.settings.fixed_domain_axis_space {
            apply_fixed_space(fixed, domain_edges(registry.orientation()), space);
            return;
        }
        for index in registry.domain_axis_indices() {
            if let Some(axis) = registry.domain_axis(index) {
                let edge = registry.edge_of(AxisFamily::Domain, index);
                axis.reserve_space(plot_area, edge, space);
            }
        }
    }

    fn calculate_range_axis_space<D: Axis, R: Axis>(
        &self,
        registry: &AxisRegistry<D, R>,
        plot_area: Rect,
        space: &mut AxisSpace,
    ) {
        if let Some(fixed) = self.settings.fixed_range_axis_space {
            let edges = domain_edges(registry.orientation());
            let range_edges = if edges[0].is_top_or_bottom() {
                [RectangleEdge::Left, RectangleEdge::Right]
            } else {
                [RectangleEdge::Top, RectangleEdge::Bottom]
            };
            apply_fixed_space(fixed, range_edges, space);
            return;
        }
        for index in registry.range_axis_indices() {
            if let Some(axis) = registry.range_axis(index) {
                let edge = registry.edge_of(AxisFamily::Range, index);
                axis.reserve_space(plot_area, edge, space);
            }
        }
    }

    /// Draws every local axis outward from the data area, stacking axes that
    /// share an edge in index order, domain axes first.
    pub fn draw_axes<D: Axis, R: Axis>(
        &self,
        registry: &AxisRegistry<D, R>,
        surface: &mut dyn DrawingSurface,
        plot_area: Rect,
        data_area: Rect,
    ) -> PlotResult<IndexMap<AxisKey, AxisState>> {
        let mut buckets: [Vec<AxisKey>; 4] = Default::default();
        for index in registry.domain_axis_indices() {
            let edge = registry.edge_of(AxisFamily::Domain, index);
            buckets[edge_slot(edge)].push(AxisKey::domain(index));
        }
        for index in registry.range_axis_indices() {
            let edge = registry.edge_of(AxisFamily::Range, index);
            buckets[edge_slot(edge)].push(AxisKey::range(index));
        }

        let offset = self.settings.axis_offset;
        let mut states = IndexMap::new();
        for edge in EDGE_ORDER {
            let mut cursor = match edge {
                RectangleEdge::Top => data_area.min_y() - offset.outset(edge),
                RectangleEdge::Bottom => data_area.max_y() + offset.outset(edge),
                RectangleEdge::Left => data_area.min_x() - offset.outset(edge),
                RectangleEdge::Right => data_area.max_x() + offset.outset(edge),
            };
            for key in &buckets[edge_slot(edge)] {
                let state = match key.family {
                    AxisFamily::Domain => match registry.domain_axis(key.index) {
                        Some(axis) => axis.draw(surface, cursor, plot_area, data_area, edge)?,
                        None => continue,
                    },
                    AxisFamily::Range => match registry.range_axis(key.index) {
                        Some(axis) => axis.draw(surface, cursor, plot_area, data_area, edge)?,
                        None => continue,
                    },
                };
                cursor = state.cursor;
                states.insert(*key, state);
            }
        }
        Ok(states)
    }
}

const EDGE_ORDER: [RectangleEdge; 4] = [
    RectangleEdge::Top,
    RectangleEdge::Bottom,
    RectangleEdge::Left,
    RectangleEdge::Right,
];

fn edge_slot(edge: RectangleEdge) -> usize {
    match edge {
        RectangleEdge::Top => 0,
        RectangleEdge::Bottom => 1,
        RectangleEdge::Left => 2,
        RectangleEdge::Right => 3,
    }
}

fn domain_edges(orientation: PlotOrientation) -> [RectangleEdge; 2] {
    match orientation {
        PlotOrientation::Vertical => [RectangleEdge::Top, RectangleEdge::Bottom],
        PlotOrientation::Horizontal => [RectangleEdge::Left, RectangleEdge::Right],
    }
}

fn apply_fixed_space(fixed: AxisSpace, edges: [RectangleEdge; 2], space: &mut AxisSpace) {
    for edge in edges {
        space.ensure_at_least(fixed.get(edge), edge);
    }
}
