use crate::core::{Point, Rect};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawCommand, LayerImage, LinePrimitive, Stroke, TextPrimitive};

/// Rendering hints a caller may set on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderingHints {
    /// Draw plots without drop shadows even when a shadow generator is configured.
    pub suppress_shadow: bool,
    pub antialias: bool,
}

/// Immediate-mode 2D drawing context consumed by plots, axes and renderers.
///
/// Backends implement the command sink and layer capture; the convenience
/// drawing methods are expressed in terms of [`DrawingSurface::execute`].
pub trait DrawingSurface {
    /// Runs one command against the active target (the innermost open layer, if any).
    fn execute(&mut self, command: DrawCommand) -> PlotResult<()>;

    fn rendering_hints(&self) -> RenderingHints;

    fn composite_alpha(&self) -> f64;

    /// Starts capturing subsequent commands into an off-surface buffer.
    fn begin_layer(&mut self) -> PlotResult<()>;

    /// Stops the innermost capture and hands back its buffer.
    fn end_layer(&mut self) -> PlotResult<LayerImage>;

    fn set_composite_alpha(&mut self, alpha: f64) -> PlotResult<()> {
        self.execute(DrawCommand::SetAlpha(alpha))
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> PlotResult<()> {
        self.execute(DrawCommand::FillRect { rect, color })
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) -> PlotResult<()> {
        self.execute(DrawCommand::StrokeRect { rect, stroke })
    }

    fn draw_line(&mut self, line: LinePrimitive) -> PlotResult<()> {
        self.execute(DrawCommand::Line(line))
    }

    fn draw_polyline(&mut self, points: &[Point], stroke: Stroke) -> PlotResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        self.execute(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        })
    }

    fn draw_text(&mut self, text: TextPrimitive) -> PlotResult<()> {
        self.execute(DrawCommand::Text(text))
    }

    fn save_clip(&mut self, clip: Rect) -> PlotResult<()> {
        self.execute(DrawCommand::PushClip(clip))
    }

    fn restore_clip(&mut self) -> PlotResult<()> {
        self.execute(DrawCommand::PopClip)
    }

    /// Composites a captured layer at an offset.
    fn draw_image(&mut self, image: &LayerImage, dx: f64, dy: f64) -> PlotResult<()> {
        for command in &image.commands {
            self.execute(command.translated(dx, dy))?;
        }
        Ok(())
    }
}

/// Nested command capture shared by surface implementations.
#[derive(Debug, Default, Clone)]
pub(crate) struct LayerCapture {
    layers: Vec<Vec<DrawCommand>>,
}

impl LayerCapture {
    /// Keeps the command when a layer is open, otherwise hands it back.
    pub(crate) fn capture(&mut self, command: DrawCommand) -> Option<DrawCommand> {
        match self.layers.last_mut() {
            Some(layer) => {
                layer.push(command);
                None
            }
            None => Some(command),
        }
    }

    pub(crate) fn begin(&mut self) {
        self.layers.push(Vec::new());
    }

    pub(crate) fn end(&mut self) -> PlotResult<LayerImage> {
        self.layers
            .pop()
            .map(|commands| LayerImage { commands })
            .ok_or_else(|| PlotError::Backend("end_layer called without begin_layer".to_owned()))
    }

    pub(crate) fn depth(&self) -> usize {
        self.layers.len()
    }
}
