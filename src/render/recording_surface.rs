use crate::core::Viewport;
use crate::error::PlotResult;
use crate::render::surface::LayerCapture;
use crate::render::{DrawCommand, DrawingSurface, LayerImage, RenderFrame, RenderingHints};

/// Headless surface that records every command into a [`RenderFrame`].
///
/// Used by tests and by callers that hand the frame to a [`crate::render::Renderer`]
/// later. Commands are validated when recorded so invalid geometry surfaces
/// before any real backend sees it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    frame: RenderFrame,
    capture: LayerCapture,
    alpha: f64,
    hints: RenderingHints,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            frame: RenderFrame::new(viewport),
            capture: LayerCapture::default(),
            alpha: 1.0,
            hints: RenderingHints::default(),
        }
    }

    #[must_use]
    pub fn with_rendering_hints(mut self, hints: RenderingHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn set_rendering_hints(&mut self, hints: RenderingHints) {
        self.hints = hints;
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.frame.commands
    }

    #[must_use]
    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    #[must_use]
    pub fn open_layers(&self) -> usize {
        self.capture.depth()
    }

    /// Consumes the surface and returns everything drawn on it.
    #[must_use]
    pub fn finish(self) -> RenderFrame {
        self.frame
    }

    pub fn clear(&mut self) {
        self.frame.commands.clear();
        self.alpha = 1.0;
    }
}

impl DrawingSurface for RecordingSurface {
    fn execute(&mut self, command: DrawCommand) -> PlotResult<()> {
        command.validate()?;
        if let DrawCommand::SetAlpha(alpha) = command {
            self.alpha = alpha;
        }
        if let Some(command) = self.capture.capture(command) {
            self.frame.commands.push(command);
        }
        Ok(())
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
