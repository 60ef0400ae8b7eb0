mod frame;
mod primitives;
mod recording_surface;
mod shadow;
mod surface;

pub use frame::{DrawCommand, LayerImage, RenderFrame};
pub use primitives::{
    Color, LinePrimitive, Stroke, TextHAlign, TextPrimitive, TextVAlign, estimate_text_width,
};
pub use recording_surface::RecordingSurface;
pub use shadow::{DefaultShadowGenerator, ShadowGenerator};
pub use surface::{DrawingSurface, RenderingHints};

use crate::error::PlotResult;

/// Contract implemented by backends that replay a materialized frame.
///
/// Plots draw onto a [`DrawingSurface`]; a [`RecordingSurface`] turns that
/// into a deterministic `RenderFrame` any `Renderer` can replay later.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoSurface};
