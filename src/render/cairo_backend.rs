use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{PlotError, PlotResult};
use crate::render::surface::LayerCapture;
use crate::render::{
    Color, DrawCommand, DrawingSurface, LayerImage, RenderFrame, Renderer, RenderingHints, Stroke,
    TextHAlign, TextPrimitive, TextVAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
}

/// Cairo + Pango + PangoCairo drawing surface.
///
/// Draws either into its own offscreen image surface or into an external
/// Cairo context (for example a GTK `DrawingArea` callback).
#[derive(Debug)]
pub struct CairoSurface {
    image: Option<ImageSurface>,
    context: Context,
    capture: LayerCapture,
    alpha: f64,
    hints: RenderingHints,
    stats: CairoRenderStats,
}

impl CairoSurface {
    pub fn new(width: i32, height: i32) -> PlotResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(PlotError::InvalidArgument(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let image = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        let context = Context::new(&image)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        Ok(Self {
            image: Some(image),
            context,
            capture: LayerCapture::default(),
            alpha: 1.0,
            hints: RenderingHints::default(),
            stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn for_context(context: Context) -> Self {
        Self {
            image: None,
            context,
            capture: LayerCapture::default(),
            alpha: 1.0,
            hints: RenderingHints::default(),
            stats: CairoRenderStats::default(),
        }
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn image_surface(&self) -> Option<&ImageSurface> {
        self.image.as_ref()
    }

    pub fn set_rendering_hints(&mut self, hints: RenderingHints) {
        self.hints = hints;
    }

    #[must_use]
    pub fn stats(&self) -> CairoRenderStats {
        self.stats
    }

    pub fn clear(&mut self, color: Color) -> PlotResult<()> {
        color.validate()?;
        self.context
            .set_source_rgba(color.red, color.green, color.blue, color.alpha);
        self.context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        self.stats = CairoRenderStats::default();
        Ok(())
    }

    fn apply_color(&self, color: Color) {
        self.context.set_source_rgba(
            color.red,
            color.green,
            color.blue,
            color.alpha * self.alpha,
        );
    }

    fn apply_stroke(&self, stroke: Stroke) {
        self.apply_color(stroke.color);
        self.context.set_line_width(stroke.width);
        match stroke.dash {
            Some((on, off)) => self.context.set_dash(&[on, off], 0.0),
            None => self.context.set_dash(&[], 0.0),
        }
    }

    fn paint(&mut self, command: DrawCommand) -> PlotResult<()> {
        let context = &self.context;
        match command {
            DrawCommand::FillRect { rect, color } => {
                self.apply_color(color);
                context.rectangle(rect.x, rect.y, rect.width, rect.height);
                context
                    .fill()
                    .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
                self.stats.rects_drawn += 1;
            }
            DrawCommand::StrokeRect { rect, stroke } => {
                self.apply_stroke(stroke);
                context.rectangle(rect.x, rect.y, rect.width, rect.height);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke rectangle", err))?;
                self.stats.rects_drawn += 1;
            }
            DrawCommand::Line(line) => {
                self.apply_stroke(line.stroke);
                context.move_to(line.x1, line.y1);
                context.line_to(line.x2, line.y2);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke line", err))?;
                self.stats.lines_drawn += 1;
            }
            DrawCommand::Polyline { points, stroke } => {
                self.apply_stroke(stroke);
                let mut points = points.iter();
                if let Some(first) = points.next() {
                    context.move_to(first.x, first.y);
                    for point in points {
                        context.line_to(point.x, point.y);
                    }
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke polyline", err))?;
                    self.stats.lines_drawn += 1;
                }
            }
            DrawCommand::Text(text) => {
                self.draw_pango_text(&text);
                self.stats.texts_drawn += 1;
            }
            DrawCommand::PushClip(rect) => {
                context
                    .save()
                    .map_err(|err| map_backend_error("failed to save cairo state", err))?;
                context.rectangle(rect.x, rect.y, rect.width, rect.height);
                context.clip();
            }
            DrawCommand::PopClip => {
                context
                    .restore()
                    .map_err(|err| map_backend_error("failed to restore cairo state", err))?;
            }
            DrawCommand::SetAlpha(_) => {}
        }
        Ok(())
    }

    fn draw_pango_text(&self, text: &TextPrimitive) {
        let layout = pangocairo::functions::create_layout(&self.context);
        let font_description = FontDescription::from_string(&format!("Sans {}", text.font_size_px));
        layout.set_font_description(Some(&font_description));
        layout.set_text(&text.text);

        let (text_width, text_height) = layout.pixel_size();
        let x = match text.h_align {
            TextHAlign::Left => text.x,
            TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
            TextHAlign::Right => text.x - f64::from(text_width),
        };
        let y = match text.v_align {
            TextVAlign::Top => text.y,
            TextVAlign::Middle => text.y - f64::from(text_height) / 2.0,
            TextVAlign::Bottom => text.y - f64::from(text_height),
        };

        self.apply_color(text.color);
        self.context.move_to(x, y);
        pangocairo::functions::show_layout(&self.context, &layout);
    }
}

impl DrawingSurface for CairoSurface {
    fn execute(&mut self, command: DrawCommand) -> PlotResult<()> {
        command.validate()?;
        if let DrawCommand::SetAlpha(alpha) = command {
            self.alpha = alpha;
        }
        match self.capture.capture(command) {
            Some(command) => self.paint(command),
            None => Ok(()),
        }
    }

    fn rendering_hints(&self) -> RenderingHints {
        self.hints
    }

    fn composite_alpha(&self) -> f64 {
        self.alpha
    }

    fn begin_layer(&mut self) -> PlotResult<()> {
        self.capture.begin();
        Ok(())
    }

    fn end_layer(&mut self) -> PlotResult<LayerImage> {
        self.capture.end()
    }
}

impl Renderer for CairoSurface {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        for command in &frame.commands {
            self.execute(command.clone())?;
        }
        Ok(())
    }
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> PlotError {
    PlotError::Backend(format!("{prefix}: {err}"))
}
