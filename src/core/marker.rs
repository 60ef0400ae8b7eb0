use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{CategoryAxis, Layer, Rect, RectangleEdge, ValueAxis};
use crate::error::{PlotError, PlotResult};
use crate::render::{
    Color, DrawingSurface, LinePrimitive, Stroke, TextHAlign, TextPrimitive, TextVAlign,
};

/// What a marker highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// A single value, drawn as a line across the data area.
    Value(f64),
    /// A value interval, drawn as a band.
    Interval { start: f64, end: f64 },
    /// One category slot of a category axis, drawn as a band.
    Category(String),
}

/// Line or band decoration attached to one renderer index and layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub stroke: Stroke,
    pub paint: Color,
    pub alpha: f64,
    pub label: Option<String>,
    pub label_font_size: f64,
}

impl Marker {
    pub fn value(value: f64) -> PlotResult<Self> {
        if !value.is_finite() {
            return Err(PlotError::InvalidArgument(
                "marker value must be finite".to_owned(),
            ));
        }
        Ok(Self::with_kind(MarkerKind::Value(value)))
    }

    pub fn interval(start: f64, end: f64) -> PlotResult<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(PlotError::InvalidArgument(
                "marker interval must be finite with start <= end".to_owned(),
            ));
        }
        Ok(Self::with_kind(MarkerKind::Interval { start, end }))
    }

    #[must_use]
    pub fn category(key: impl Into<String>) -> Self {
        Self::with_kind(MarkerKind::Category(key.into()))
    }

    fn with_kind(kind: MarkerKind) -> Self {
        Self {
            kind,
            stroke: Stroke::solid(1.0, Color::GRAY),
            paint: Color::GRAY,
            alpha: 0.8,
            label: None,
            label_font_size: 9.0,
        }
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }

    #[must_use]
    pub fn with_paint(mut self, paint: Color) -> Self {
        self.paint = paint;
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        self.stroke.validate()?;
        self.paint.validate()?;
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(PlotError::InvalidArgument(
                "marker alpha must be finite and in [0, 1]".to_owned(),
            ));
        }
        if !self.label_font_size.is_finite() || self.label_font_size <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "marker label font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn band_paint(&self) -> Color {
        self.paint.with_alpha(self.paint.alpha * self.alpha)
    }

    /// Draws the marker against a value axis on `edge`.
    ///
    /// Markers outside the axis range draw nothing; category markers are ignored.
    pub fn draw_on_value_axis(
        &self,
        surface: &mut dyn DrawingSurface,
        axis: &ValueAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        let range = axis.range();
        match &self.kind {
            MarkerKind::Value(value) => {
                if !range.contains(*value) {
                    return Ok(());
                }
                let coordinate = axis.value_to_device(*value, data_area, edge);
                self.draw_line_at(surface, coordinate, data_area, edge)
            }
            MarkerKind::Interval { start, end } => {
                if *end < range.lower() || *start > range.upper() {
                    return Ok(());
                }
                let c0 = axis.value_to_device(range.constrain(*start), data_area, edge);
                let c1 = axis.value_to_device(range.constrain(*end), data_area, edge);
                self.draw_band(surface, c0, c1, data_area, edge)
            }
            MarkerKind::Category(_) => Ok(()),
        }
    }

    /// Draws a category marker as a band over its slot.
    pub fn draw_on_category_axis(
        &self,
        surface: &mut dyn DrawingSurface,
        axis: &CategoryAxis,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        let MarkerKind::Category(key) = &self.kind else {
            return Ok(());
        };
        let count = axis.categories().len();
        let Some(category) = axis.categories().iter().position(|existing| existing == key) else {
            return Ok(());
        };
        let c0 = axis.category_start(category, count, data_area, edge);
        let c1 = axis.category_end(category, count, data_area, edge);
        self.draw_band(surface, c0, c1, data_area, edge)
    }

    fn draw_line_at(
        &self,
        surface: &mut dyn DrawingSurface,
        coordinate: f64,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        let stroke = Stroke {
            color: self
                .stroke
                .color
                .with_alpha(self.stroke.color.alpha * self.alpha),
            ..self.stroke
        };
        let line = if edge.is_top_or_bottom() {
            LinePrimitive::new(
                coordinate,
                data_area.min_y(),
                coordinate,
                data_area.max_y(),
                stroke,
            )
        } else {
            LinePrimitive::new(
                data_area.min_x(),
                coordinate,
                data_area.max_x(),
                coordinate,
                stroke,
            )
        };
        surface.draw_line(line)?;
        self.draw_label(surface, line.x1, line.y1)
    }

    fn draw_band(
        &self,
        surface: &mut dyn DrawingSurface,
        c0: f64,
        c1: f64,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<()> {
        let band = if edge.is_top_or_bottom() {
            Rect::from_corners(c0, data_area.min_y(), c1, data_area.max_y())
        } else {
            Rect::from_corners(data_area.min_x(), c0, data_area.max_x(), c1)
        };
        surface.fill_rect(band, self.band_paint())?;
        self.draw_label(surface, band.min_x(), band.min_y())
    }

    fn draw_label(&self, surface: &mut dyn DrawingSurface, x: f64, y: f64) -> PlotResult<()> {
        let Some(text) = self.label.as_deref().filter(|text| !text.is_empty()) else {
            return Ok(());
        };
        surface.draw_text(
            TextPrimitive::new(
                text,
                x + 2.0,
                y + 2.0,
                self.label_font_size,
                self.stroke.color,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Top),
        )
    }
}

/// Markers of one axis family keyed by renderer index, split by layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    foreground: BTreeMap<usize, Vec<Marker>>,
    background: BTreeMap<usize, Vec<Marker>>,
}

impl MarkerSet {
    fn layer(&self, layer: Layer) -> &BTreeMap<usize, Vec<Marker>> {
        match layer {
            Layer::Foreground => &self.foreground,
            Layer::Background => &self.background,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut BTreeMap<usize, Vec<Marker>> {
        match layer {
            Layer::Foreground => &mut self.foreground,
            Layer::Background => &mut self.background,
        }
    }

    pub fn add(&mut self, index: usize, marker: Marker, layer: Layer) -> PlotResult<()> {
        marker.validate()?;
        self.layer_mut(layer).entry(index).or_default().push(marker);
        Ok(())
    }

    /// Removes the first marker equal to `marker`; returns whether one was found.
    pub fn remove(&mut self, index: usize, marker: &Marker, layer: Layer) -> bool {
        let markers = self.layer_mut(layer);
        let Some(list) = markers.get_mut(&index) else {
            return false;
        };
        let Some(position) = list.iter().position(|existing| existing == marker) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            markers.remove(&index);
        }
        true
    }

    /// Clears every marker registered for `index` in both layers.
    pub fn clear_index(&mut self, index: usize) {
        self.foreground.remove(&index);
        self.background.remove(&index);
    }

    pub fn clear(&mut self) {
        self.foreground.clear();
        self.background.clear();
    }

    #[must_use]
    pub fn markers(&self, index: usize, layer: Layer) -> &[Marker] {
        self.layer(layer).get(&index).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.foreground.is_empty() && self.background.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;
    use crate::render::{DrawCommand, RecordingSurface};

    #[test]
    fn marker_set_add_and_remove() {
        let mut set = MarkerSet::default();
        let marker = Marker::value(3.0).expect("marker");
        set.add(1, marker.clone(), Layer::Background).expect("add");
        assert_eq!(set.markers(1, Layer::Background).len(), 1);
        assert!(set.markers(1, Layer::Foreground).is_empty());
        assert!(set.remove(1, &marker, Layer::Background));
        assert!(!set.remove(1, &marker, Layer::Background));
        assert!(set.is_empty());
    }

    #[test]
    fn interval_rejects_reversed_bounds() {
        assert!(Marker::interval(5.0, 1.0).is_err());
        assert!(Marker::value(f64::NAN).is_err());
    }

    #[test]
    fn value_marker_on_bottom_axis_is_vertical_line() {
        let mut axis = ValueAxis::new();
        axis.set_range_bounds(0.0, 10.0).expect("range");
        let area = Rect::new(0.0, 0.0, 100.0, 50.0);
        let mut surface = RecordingSurface::new(Viewport::new(100, 50));
        Marker::value(5.0)
            .expect("marker")
            .draw_on_value_axis(&mut surface, &axis, area, RectangleEdge::Bottom)
            .expect("draw");
        let DrawCommand::Line(line) = &surface.commands()[0] else {
            panic!("expected line");
        };
        assert_eq!((line.x1, line.y1, line.x2, line.y2), (50.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn out_of_range_marker_draws_nothing() {
        let mut axis = ValueAxis::new();
        axis.set_range_bounds(0.0, 10.0).expect("range");
        let mut surface = RecordingSurface::new(Viewport::new(100, 50));
        Marker::value(50.0)
            .expect("marker")
            .draw_on_value_axis(
                &mut surface,
                &axis,
                Rect::new(0.0, 0.0, 100.0, 50.0),
                RectangleEdge::Left,
            )
            .expect("draw");
        assert!(surface.commands().is_empty());
    }
}
