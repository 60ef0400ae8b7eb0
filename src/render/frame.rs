use crate::core::{Point, Rect, Viewport};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, LinePrimitive, Stroke, TextPrimitive};

/// One immediate-mode drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line(LinePrimitive),
    Polyline { points: Vec<Point>, stroke: Stroke },
    Text(TextPrimitive),
    PushClip(Rect),
    PopClip,
    /// Composite alpha applied to every following paint operation.
    SetAlpha(f64),
}

impl DrawCommand {
    /// Same command moved by `(dx, dy)` device units.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift_rect = |rect: Rect| Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height);
        match self {
            Self::FillRect { rect, color } => Self::FillRect {
                rect: shift_rect(*rect),
                color: *color,
            },
            Self::StrokeRect { rect, stroke } => Self::StrokeRect {
                rect: shift_rect(*rect),
                stroke: *stroke,
            },
            Self::Line(line) => Self::Line(LinePrimitive::new(
                line.x1 + dx,
                line.y1 + dy,
                line.x2 + dx,
                line.y2 + dy,
                line.stroke,
            )),
            Self::Polyline { points, stroke } => Self::Polyline {
                points: points
                    .iter()
                    .map(|point| Point::new(point.x + dx, point.y + dy))
                    .collect(),
                stroke: *stroke,
            },
            Self::Text(text) => {
                let mut moved = text.clone();
                moved.x += dx;
                moved.y += dy;
                Self::Text(moved)
            }
            Self::PushClip(rect) => Self::PushClip(shift_rect(*rect)),
            Self::PopClip => Self::PopClip,
            Self::SetAlpha(alpha) => Self::SetAlpha(*alpha),
        }
    }

    /// Same geometry painted entirely with `color`.
    #[must_use]
    pub fn recolored(&self, color: Color) -> Self {
        match self {
            Self::FillRect { rect, .. } => Self::FillRect { rect: *rect, color },
            Self::StrokeRect { rect, stroke } => Self::StrokeRect {
                rect: *rect,
                stroke: Stroke { color, ..*stroke },
            },
            Self::Line(line) => Self::Line(LinePrimitive {
                stroke: Stroke {
                    color,
                    ..line.stroke
                },
                ..*line
            }),
            Self::Polyline { points, stroke } => Self::Polyline {
                points: points.clone(),
                stroke: Stroke { color, ..*stroke },
            },
            Self::Text(text) => {
                let mut painted = text.clone();
                painted.color = color;
                Self::Text(painted)
            }
            other => other.clone(),
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        match self {
            Self::FillRect { rect, color } => {
                validate_rect(*rect)?;
                color.validate().map(|_| ())
            }
            Self::StrokeRect { rect, stroke } => {
                validate_rect(*rect)?;
                stroke.validate().map(|_| ())
            }
            Self::Line(line) => line.validate(),
            Self::Polyline { points, stroke } => {
                if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                    return Err(PlotError::InvalidData(
                        "polyline points must be finite".to_owned(),
                    ));
                }
                stroke.validate().map(|_| ())
            }
            Self::Text(text) => text.validate(),
            Self::PushClip(rect) => validate_rect(*rect),
            Self::PopClip => Ok(()),
            Self::SetAlpha(alpha) => {
                if !alpha.is_finite() || !(0.0..=1.0).contains(alpha) {
                    return Err(PlotError::InvalidData(
                        "composite alpha must be finite and in [0, 1]".to_owned(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn validate_rect(rect: Rect) -> PlotResult<()> {
    if !rect.x.is_finite()
        || !rect.y.is_finite()
        || !rect.width.is_finite()
        || !rect.height.is_finite()
    {
        return Err(PlotError::InvalidData(
            "rectangle geometry must be finite".to_owned(),
        ));
    }
    if rect.width < 0.0 || rect.height < 0.0 {
        return Err(PlotError::InvalidData(
            "rectangle size must be >= 0".to_owned(),
        ));
    }
    Ok(())
}

/// Off-surface buffer captured between `begin_layer` and `end_layer`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerImage {
    pub commands: Vec<DrawCommand>,
}

impl LayerImage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Backend-agnostic scene for one plot draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: DrawCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        if !self.viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        let mut depth = 0_usize;
        for command in &self.commands {
            command.validate()?;
            match command {
                DrawCommand::PushClip(_) => depth += 1,
                DrawCommand::PopClip => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        PlotError::InvalidData("clip restored without matching save".to_owned())
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line(line) => Some(line),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn filled_rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
    }
}
