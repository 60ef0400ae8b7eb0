use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DrawCommand, LayerImage};

/// Derives a drop shadow from a captured data-area layer.
pub trait ShadowGenerator: Debug {
    fn create_drop_shadow(&self, source: &LayerImage) -> LayerImage;
    fn offset_x(&self) -> f64;
    fn offset_y(&self) -> f64;
}

/// Flat-colored shadow cast at `angle` (radians, clockwise from the +x axis
/// in device space) and `distance` device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultShadowGenerator {
    #[serde(default = "default_shadow_color")]
    pub color: Color,
    #[serde(default = "default_shadow_opacity")]
    pub opacity: f64,
    #[serde(default = "default_shadow_angle")]
    pub angle: f64,
    #[serde(default = "default_shadow_distance")]
    pub distance: f64,
}

impl Default for DefaultShadowGenerator {
    fn default() -> Self {
        Self {
            color: default_shadow_color(),
            opacity: default_shadow_opacity(),
            angle: default_shadow_angle(),
            distance: default_shadow_distance(),
        }
    }
}

impl DefaultShadowGenerator {
    pub fn validate(self) -> PlotResult<Self> {
        self.color.validate()?;
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(PlotError::InvalidArgument(
                "shadow opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        if !self.angle.is_finite() {
            return Err(PlotError::InvalidArgument(
                "shadow angle must be finite".to_owned(),
            ));
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(PlotError::InvalidArgument(
                "shadow distance must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

impl ShadowGenerator for DefaultShadowGenerator {
    fn create_drop_shadow(&self, source: &LayerImage) -> LayerImage {
        let paint = self.color.with_alpha(self.color.alpha * self.opacity);
        LayerImage {
            commands: source
                .commands
                .iter()
                .filter(|command| !matches!(command, DrawCommand::SetAlpha(_)))
                .map(|command| command.recolored(paint))
                .collect(),
        }
    }

    fn offset_x(&self) -> f64 {
        self.angle.cos() * self.distance
    }

    fn offset_y(&self) -> f64 {
        self.angle.sin() * self.distance
    }
}

fn default_shadow_color() -> Color {
    Color::BLACK
}

fn default_shadow_opacity() -> f64 {
    0.5
}

fn default_shadow_angle() -> f64 {
    std::f64::consts::FRAC_PI_4
}

fn default_shadow_distance() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rect;

    #[test]
    fn shadow_recolors_every_paint() {
        let source = LayerImage {
            commands: vec![DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 4.0, 4.0),
                color: Color::RED,
            }],
        };
        let shadow = DefaultShadowGenerator::default().create_drop_shadow(&source);
        let DrawCommand::FillRect { color, .. } = shadow.commands[0] else {
            panic!("expected rect");
        };
        assert_eq!(color, Color::BLACK.with_alpha(0.5));
    }

    #[test]
    fn default_offset_points_down_right() {
        let generator = DefaultShadowGenerator::default();
        assert!(generator.offset_x() > 0.0);
        assert!(generator.offset_y() > 0.0);
    }
}
