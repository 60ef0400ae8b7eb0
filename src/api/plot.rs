//! Contract shared by XY and category plots plus the drawing steps both
//! run identically.

use crate::api::change::{PlotChangeEvent, PlotChangeListener, PlotLink};
use crate::api::config::{GridlineStyle, NoDataMessage, PlotStyle};
use crate::api::renderer::LegendItem;
use crate::api::snapshot::PlotSnapshot;
use crate::core::{
    Annotation, AxisFamily, PlotOrientation, Point, Rect, RectangleEdge, Tick, ValueAxis,
    ValueRange,
};
use crate::error::PlotResult;
use crate::interaction::PlotRenderingInfo;
use crate::render::{
    Color, DrawingSurface, LinePrimitive, Stroke, TextHAlign, TextPrimitive, TextVAlign,
};

/// Drawing, interaction and notification surface of a plot.
pub trait Plot {
    fn link(&self) -> &PlotLink;

    fn orientation(&self) -> PlotOrientation;

    fn set_orientation(&mut self, orientation: PlotOrientation) -> PlotResult<()>;

    /// Lays the plot out inside `area` and draws it.
    ///
    /// Returns `None` when the area is too small to draw anything. `anchor`
    /// is the last clicked point, used to resolve crosshairs.
    fn draw(
        &mut self,
        surface: &mut dyn DrawingSurface,
        area: Rect,
        anchor: Option<Point>,
    ) -> PlotResult<Option<PlotRenderingInfo>>;

    /// Info recorded by the last successful draw.
    fn rendering_info(&self) -> Option<&PlotRenderingInfo>;

    /// Moves the crosshairs to the clicked point; `false` when the point
    /// lies outside the last data area or nothing was drawn yet.
    fn handle_click(&mut self, point: Point) -> PlotResult<bool>;

    fn is_domain_zoomable(&self) -> bool;

    fn is_range_zoomable(&self) -> bool {
        true
    }

    fn is_domain_pannable(&self) -> bool;

    fn is_range_pannable(&self) -> bool;

    /// Scales every domain axis by `factor`, anchored at `anchor` when given.
    fn zoom_domain_axes(&mut self, factor: f64, anchor: Option<Point>) -> PlotResult<()>;

    fn zoom_domain_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()>;

    fn zoom_range_axes(&mut self, factor: f64, anchor: Option<Point>) -> PlotResult<()>;

    fn zoom_range_axes_window(&mut self, lower: f64, upper: f64) -> PlotResult<()>;

    fn pan_domain_axes(&mut self, percent: f64) -> PlotResult<()>;

    fn pan_range_axes(&mut self, percent: f64) -> PlotResult<()>;

    /// Legend entries of every series visible in the legend, in dataset
    /// rendering order.
    fn legend_items(&self) -> Vec<LegendItem>;

    fn snapshot(&self) -> PlotSnapshot;

    fn publish(&self, event: PlotChangeEvent) -> PlotResult<()> {
        self.link().publish(event)
    }

    fn add_change_listener(&self, listener: Box<dyn PlotChangeListener>) -> PlotResult<()> {
        self.link().add_listener(listener)
    }

    fn remove_change_listener(&self, id: &str) -> bool {
        self.link().remove_listener(id)
    }

    fn is_notify(&self) -> bool {
        self.link().is_notify()
    }

    /// Switches notification on or off; switching it back on announces a
    /// general change so listeners catch up.
    fn set_notify(&self, notify: bool) -> PlotResult<()> {
        self.link().set_notify(notify);
        if notify {
            self.link().publish(PlotChangeEvent::General)?;
        }
        Ok(())
    }
}

/// Widens `result` by the bounds of every annotation that asks to be included.
pub(crate) fn combine_annotation_bounds(
    result: Option<ValueRange>,
    annotations: &[Box<dyn Annotation>],
    family: AxisFamily,
) -> Option<ValueRange> {
    annotations
        .iter()
        .filter(|annotation| annotation.include_in_data_bounds())
        .filter_map(|annotation| annotation.bounds())
        .fold(result, |acc, (domain, range)| {
            let bounds = match family {
                AxisFamily::Domain => domain,
                AxisFamily::Range => range,
            };
            ValueRange::combine(acc, Some(bounds))
        })
}

/// Line across `data_area` at device `coordinate` of an axis on `edge`.
pub(crate) fn line_across(
    data_area: Rect,
    edge: RectangleEdge,
    coordinate: f64,
    stroke: Stroke,
) -> LinePrimitive {
    if edge.is_top_or_bottom() {
        LinePrimitive::new(coordinate, data_area.min_y(), coordinate, data_area.max_y(), stroke)
    } else {
        LinePrimitive::new(data_area.min_x(), coordinate, data_area.max_x(), coordinate, stroke)
    }
}

/// Draws a line at `value` of `axis` when the value is inside the axis range.
pub(crate) fn draw_value_line(
    surface: &mut dyn DrawingSurface,
    axis: &ValueAxis,
    data_area: Rect,
    edge: RectangleEdge,
    value: f64,
    stroke: Stroke,
) -> PlotResult<()> {
    if !axis.range().contains(value) {
        return Ok(());
    }
    let coordinate = axis.value_to_device(value, data_area, edge);
    surface.draw_line(line_across(data_area, edge, coordinate, stroke))
}

pub(crate) fn draw_tick_gridlines(
    surface: &mut dyn DrawingSurface,
    axis: &ValueAxis,
    ticks: &[Tick],
    data_area: Rect,
    edge: RectangleEdge,
    style: &GridlineStyle,
) -> PlotResult<()> {
    for tick in ticks {
        let stroke = match (tick.major, style.visible, style.minor_visible) {
            (true, true, _) => style.stroke,
            (false, _, true) => style.minor_stroke,
            _ => continue,
        };
        draw_value_line(surface, axis, data_area, edge, tick.value, stroke)?;
    }
    Ok(())
}

/// Fills every second interval between the major ticks of `axis`, starting
/// with the interval after the first tick.
pub(crate) fn fill_tick_bands(
    surface: &mut dyn DrawingSurface,
    axis: &ValueAxis,
    ticks: &[Tick],
    data_area: Rect,
    edge: RectangleEdge,
    paint: Color,
) -> PlotResult<()> {
    let bounds: Vec<f64> = ticks
        .iter()
        .filter(|tick| tick.major)
        .map(|tick| tick.value)
        .chain(std::iter::once(axis.upper_bound()))
        .collect();
    for band in bounds.windows(2).step_by(2) {
        let start = axis.value_to_device(band[0], data_area, edge);
        let end = axis.value_to_device(band[1], data_area, edge);
        let rect = if edge.is_top_or_bottom() {
            Rect::from_corners(start, data_area.min_y(), end, data_area.max_y())
        } else {
            Rect::from_corners(data_area.min_x(), start, data_area.max_x(), end)
        };
        if !rect.is_empty() {
            surface.fill_rect(rect, paint)?;
        }
    }
    Ok(())
}

pub(crate) fn fill_background(
    surface: &mut dyn DrawingSurface,
    data_area: Rect,
    style: &PlotStyle,
) -> PlotResult<()> {
    let Some(background) = style.background else {
        return Ok(());
    };
    let original = surface.composite_alpha();
    surface.set_composite_alpha(style.background_alpha)?;
    surface.fill_rect(data_area, background)?;
    surface.set_composite_alpha(original)
}

pub(crate) fn draw_no_data_message(
    surface: &mut dyn DrawingSurface,
    data_area: Rect,
    message: &NoDataMessage,
) -> PlotResult<()> {
    surface.draw_text(
        TextPrimitive::new(
            message.text.clone(),
            data_area.center_x(),
            data_area.center_y(),
            message.font_size_px,
            message.color,
            TextHAlign::Center,
        )
        .with_v_align(TextVAlign::Middle),
    )
}

pub(crate) fn draw_outline(
    surface: &mut dyn DrawingSurface,
    data_area: Rect,
    style: &PlotStyle,
) -> PlotResult<()> {
    if style.outline_visible {
        surface.stroke_rect(data_area, style.outline_stroke)?;
    }
    Ok(())
}
