use std::fmt::Debug;

use crate::core::{Axis, Layer, PlotOrientation, Point, Rect, RectangleEdge, ValueRange};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawingSurface, LinePrimitive, Stroke, TextHAlign, TextPrimitive};

/// Axes and geometry an annotation is drawn against.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationContext<'a> {
    pub data_area: Rect,
    pub orientation: PlotOrientation,
    pub domain_axis: &'a dyn Axis,
    pub domain_edge: RectangleEdge,
    pub range_axis: &'a dyn Axis,
    pub range_edge: RectangleEdge,
}

impl AnnotationContext<'_> {
    /// Converts a (domain, range) data point to device space.
    #[must_use]
    pub fn to_device(&self, domain: f64, range: f64) -> Point {
        let d = self
            .domain_axis
            .value_to_device(domain, self.data_area, self.domain_edge);
        let r = self
            .range_axis
            .value_to_device(range, self.data_area, self.range_edge);
        match self.orientation {
            PlotOrientation::Vertical => Point::new(d, r),
            PlotOrientation::Horizontal => Point::new(r, d),
        }
    }
}

/// Free-standing decoration positioned in data coordinates.
pub trait Annotation: Debug {
    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        context: &AnnotationContext<'_>,
    ) -> PlotResult<()>;

    fn layer(&self) -> Layer {
        Layer::Foreground
    }

    /// Domain and range extents, when known.
    fn bounds(&self) -> Option<(ValueRange, ValueRange)> {
        None
    }

    /// Whether [`Annotation::bounds`] should widen auto-ranged axes.
    fn include_in_data_bounds(&self) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn Annotation>;
}

impl Clone for Box<dyn Annotation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Text placed at a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
    pub layer: Layer,
    pub include_in_bounds: bool,
}

impl TextAnnotation {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> PlotResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(PlotError::InvalidArgument(
                "annotation text must not be empty".to_owned(),
            ));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(PlotError::InvalidArgument(
                "annotation position must be finite".to_owned(),
            ));
        }
        Ok(Self {
            text,
            x,
            y,
            font_size_px: 10.0,
            color: Color::BLACK,
            h_align: TextHAlign::Center,
            layer: Layer::Foreground,
            include_in_bounds: false,
        })
    }

    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    #[must_use]
    pub fn with_include_in_bounds(mut self, include: bool) -> Self {
        self.include_in_bounds = include;
        self
    }
}

impl Annotation for TextAnnotation {
    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        context: &AnnotationContext<'_>,
    ) -> PlotResult<()> {
        let anchor = context.to_device(self.x, self.y);
        surface.draw_text(TextPrimitive::new(
            self.text.clone(),
            anchor.x,
            anchor.y,
            self.font_size_px,
            self.color,
            self.h_align,
        ))
    }

    fn layer(&self) -> Layer {
        self.layer
    }

    fn bounds(&self) -> Option<(ValueRange, ValueRange)> {
        Some((ValueRange::point(self.x), ValueRange::point(self.y)))
    }

    fn include_in_data_bounds(&self) -> bool {
        self.include_in_bounds
    }

    fn clone_box(&self) -> Box<dyn Annotation> {
        Box::new(self.clone())
    }
}

/// Straight line between two data points.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAnnotation {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Stroke,
    pub layer: Layer,
    pub include_in_bounds: bool,
}

impl LineAnnotation {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> PlotResult<Self> {
        if [x1, y1, x2, y2].iter().any(|value| !value.is_finite()) {
            return Err(PlotError::InvalidArgument(
                "annotation line end points must be finite".to_owned(),
            ));
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            stroke: Stroke::solid(1.0, Color::BLACK),
            layer: Layer::Foreground,
            include_in_bounds: true,
        })
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    #[must_use]
    pub fn with_include_in_bounds(mut self, include: bool) -> Self {
        self.include_in_bounds = include;
        self
    }
}

impl Annotation for LineAnnotation {
    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        context: &AnnotationContext<'_>,
    ) -> PlotResult<()> {
        let start = context.to_device(self.x1, self.y1);
        let end = context.to_device(self.x2, self.y2);
        surface.draw_line(LinePrimitive::between(start, end, self.stroke))
    }

    fn layer(&self) -> Layer {
        self.layer
    }

    fn bounds(&self) -> Option<(ValueRange, ValueRange)> {
        let domain = ValueRange::new(self.x1.min(self.x2), self.x1.max(self.x2)).ok()?;
        let range = ValueRange::new(self.y1.min(self.y2), self.y1.max(self.y2)).ok()?;
        Some((domain, range))
    }

    fn include_in_data_bounds(&self) -> bool {
        self.include_in_bounds
    }

    fn clone_box(&self) -> Box<dyn Annotation> {
        Box::new(self.clone())
    }
}
