use serde::{Deserialize, Serialize};

use crate::api::crosshair::CrosshairConfig;
use crate::api::layout::LayoutSettings;
use crate::core::{
    CategoryAnchor, DatasetRenderingOrder, PlotOrientation, Point, SeriesRenderingOrder,
    SortOrder,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, DefaultShadowGenerator, Stroke};

/// Major and minor gridlines of one axis family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridlineStyle {
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_gridline_stroke")]
    pub stroke: Stroke,
    #[serde(default)]
    pub minor_visible: bool,
    #[serde(default = "default_minor_gridline_stroke")]
    pub minor_stroke: Stroke,
}

impl Default for GridlineStyle {
    fn default() -> Self {
        Self {
            visible: true,
            stroke: default_gridline_stroke(),
            minor_visible: false,
            minor_stroke: default_minor_gridline_stroke(),
        }
    }
}

impl GridlineStyle {
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    pub fn validate(self) -> PlotResult<Self> {
        self.stroke.validate()?;
        self.minor_stroke.validate()?;
        Ok(self)
    }
}

/// Line drawn across the data area where an axis passes through zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStyle {
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_baseline_stroke")]
    pub stroke: Stroke,
}

impl Default for BaselineStyle {
    fn default() -> Self {
        Self {
            visible: false,
            stroke: default_baseline_stroke(),
        }
    }
}

/// Placeholder drawn in the data area when no dataset has anything to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoDataMessage {
    pub text: String,
    #[serde(default = "default_no_data_font_size")]
    pub font_size_px: f64,
    #[serde(default = "default_no_data_color")]
    pub color: Color,
}

impl NoDataMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size_px: default_no_data_font_size(),
            color: default_no_data_color(),
        }
    }

    pub fn validate(self) -> PlotResult<Self> {
        if self.text.is_empty() {
            return Err(PlotError::InvalidArgument(
                "no-data message must not be empty".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(PlotError::InvalidArgument(
                "no-data message font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()?;
        Ok(self)
    }
}

/// Appearance settings shared by both plot kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    #[serde(default = "default_background")]
    pub background: Option<Color>,
    #[serde(default = "default_alpha")]
    pub background_alpha: f64,
    /// Alpha applied to everything drawn inside the data area.
    #[serde(default = "default_alpha")]
    pub foreground_alpha: f64,
    #[serde(default = "default_true")]
    pub outline_visible: bool,
    #[serde(default = "default_outline_stroke")]
    pub outline_stroke: Stroke,
    #[serde(default)]
    pub no_data_message: Option<NoDataMessage>,
    /// Drop shadow under the data-area content; off by default.
    #[serde(default)]
    pub shadow: Option<DefaultShadowGenerator>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            background: default_background(),
            background_alpha: default_alpha(),
            foreground_alpha: default_alpha(),
            outline_visible: true,
            outline_stroke: default_outline_stroke(),
            no_data_message: None,
            shadow: None,
        }
    }
}

impl PlotStyle {
    pub fn validate(self) -> PlotResult<Self> {
        if let Some(background) = self.background {
            background.validate()?;
        }
        validate_alpha("background alpha", self.background_alpha)?;
        validate_alpha("foreground alpha", self.foreground_alpha)?;
        self.outline_stroke.validate()?;
        let no_data_message = self.no_data_message.map(NoDataMessage::validate).transpose()?;
        let shadow = self.shadow.map(DefaultShadowGenerator::validate).transpose()?;
        Ok(Self {
            no_data_message,
            shadow,
            ..self
        })
    }
}

/// Declarative settings of an [`crate::api::XyPlot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XyPlotConfig {
    #[serde(default)]
    pub orientation: PlotOrientation,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub style: PlotStyle,
    #[serde(default)]
    pub domain_gridlines: GridlineStyle,
    #[serde(default)]
    pub range_gridlines: GridlineStyle,
    #[serde(default)]
    pub domain_zero_baseline: BaselineStyle,
    #[serde(default)]
    pub range_zero_baseline: BaselineStyle,
    /// Fill of alternate intervals between the primary domain axis ticks.
    #[serde(default)]
    pub domain_tick_band_paint: Option<Color>,
    #[serde(default)]
    pub range_tick_band_paint: Option<Color>,
    #[serde(default)]
    pub domain_crosshair: CrosshairConfig,
    #[serde(default)]
    pub range_crosshair: CrosshairConfig,
    #[serde(default)]
    pub dataset_rendering_order: DatasetRenderingOrder,
    #[serde(default)]
    pub series_rendering_order: SeriesRenderingOrder,
    /// Data-space point splitting the data area into four quadrants.
    #[serde(default)]
    pub quadrant_origin: Point,
    /// Quadrant fills: top-left, top-right, bottom-left, bottom-right.
    #[serde(default)]
    pub quadrant_paints: [Option<Color>; 4],
    #[serde(default)]
    pub domain_pannable: bool,
    #[serde(default)]
    pub range_pannable: bool,
    /// Share of space this plot gets when stacked with sibling plots.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Default for XyPlotConfig {
    fn default() -> Self {
        Self {
            orientation: PlotOrientation::Vertical,
            layout: LayoutSettings::default(),
            style: PlotStyle::default(),
            domain_gridlines: GridlineStyle::default(),
            range_gridlines: GridlineStyle::default(),
            domain_zero_baseline: BaselineStyle::default(),
            range_zero_baseline: BaselineStyle::default(),
            domain_tick_band_paint: None,
            range_tick_band_paint: None,
            domain_crosshair: CrosshairConfig::default(),
            range_crosshair: CrosshairConfig::default(),
            dataset_rendering_order: DatasetRenderingOrder::Reverse,
            series_rendering_order: SeriesRenderingOrder::Reverse,
            quadrant_origin: Point::default(),
            quadrant_paints: [None; 4],
            domain_pannable: false,
            range_pannable: false,
            weight: default_weight(),
        }
    }
}

impl XyPlotConfig {
    pub fn validate(self) -> PlotResult<Self> {
        validate_layout(&self.layout)?;
        validate_weight(self.weight)?;
        if !self.quadrant_origin.x.is_finite() || !self.quadrant_origin.y.is_finite() {
            return Err(PlotError::InvalidArgument(
                "quadrant origin must be finite".to_owned(),
            ));
        }
        for paint in self
            .quadrant_paints
            .iter()
            .chain([&self.domain_tick_band_paint, &self.range_tick_band_paint])
            .flatten()
        {
            paint.validate()?;
        }
        validate_crosshair(&self.domain_crosshair)?;
        validate_crosshair(&self.range_crosshair)?;
        self.domain_zero_baseline.stroke.validate()?;
        self.range_zero_baseline.stroke.validate()?;
        Ok(Self {
            style: self.style.validate()?,
            domain_gridlines: self.domain_gridlines.validate()?,
            range_gridlines: self.range_gridlines.validate()?,
            ..self
        })
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: PlotOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_dataset_rendering_order(mut self, order: DatasetRenderingOrder) -> Self {
        self.dataset_rendering_order = order;
        self
    }

    #[must_use]
    pub fn with_series_rendering_order(mut self, order: SeriesRenderingOrder) -> Self {
        self.series_rendering_order = order;
        self
    }

    #[must_use]
    pub fn with_crosshairs(mut self, domain: CrosshairConfig, range: CrosshairConfig) -> Self {
        self.domain_crosshair = domain;
        self.range_crosshair = range;
        self
    }

    #[must_use]
    pub fn with_pannable(mut self, domain: bool, range: bool) -> Self {
        self.domain_pannable = domain;
        self.range_pannable = range;
        self
    }

    #[must_use]
    pub fn with_tick_band_paints(mut self, domain: Option<Color>, range: Option<Color>) -> Self {
        self.domain_tick_band_paint = domain;
        self.range_tick_band_paint = range;
        self
    }

    #[must_use]
    pub fn with_quadrant_origin(mut self, origin: Point) -> Self {
        self.quadrant_origin = origin;
        self
    }

    /// Sets the fill of quadrant `index` (0 top-left .. 3 bottom-right).
    pub fn set_quadrant_paint(&mut self, index: usize, paint: Option<Color>) -> PlotResult<()> {
        let slot = self.quadrant_paints.get_mut(index).ok_or_else(|| {
            PlotError::InvalidArgument(format!(
                "quadrant index must be in 0..=3, got {index}"
            ))
        })?;
        *slot = paint.map(Color::validate).transpose()?;
        Ok(())
    }
}

/// Declarative settings of a [`crate::api::CategoryPlot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPlotConfig {
    #[serde(default)]
    pub orientation: PlotOrientation,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub style: PlotStyle,
    #[serde(default = "GridlineStyle::hidden")]
    pub domain_gridlines: GridlineStyle,
    /// Where inside each category slot domain gridlines are drawn.
    #[serde(default)]
    pub domain_gridline_position: CategoryAnchor,
    #[serde(default)]
    pub range_gridlines: GridlineStyle,
    #[serde(default)]
    pub range_zero_baseline: BaselineStyle,
    #[serde(default)]
    pub domain_crosshair: CrosshairConfig,
    #[serde(default)]
    pub range_crosshair: CrosshairConfig,
    #[serde(default)]
    pub dataset_rendering_order: DatasetRenderingOrder,
    #[serde(default)]
    pub column_rendering_order: SortOrder,
    #[serde(default)]
    pub row_rendering_order: SortOrder,
    #[serde(default)]
    pub range_pannable: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Default for CategoryPlotConfig {
    fn default() -> Self {
        Self {
            orientation: PlotOrientation::Vertical,
            layout: LayoutSettings::default(),
            style: PlotStyle::default(),
            domain_gridlines: GridlineStyle::hidden(),
            domain_gridline_position: CategoryAnchor::Middle,
            range_gridlines: GridlineStyle::default(),
            range_zero_baseline: BaselineStyle::default(),
            domain_crosshair: CrosshairConfig::default(),
            range_crosshair: CrosshairConfig::default(),
            dataset_rendering_order: DatasetRenderingOrder::Reverse,
            column_rendering_order: SortOrder::Ascending,
            row_rendering_order: SortOrder::Ascending,
            range_pannable: false,
            weight: default_weight(),
        }
    }
}

impl CategoryPlotConfig {
    pub fn validate(self) -> PlotResult<Self> {
        validate_layout(&self.layout)?;
        validate_weight(self.weight)?;
        validate_crosshair(&self.domain_crosshair)?;
        validate_crosshair(&self.range_crosshair)?;
        self.range_zero_baseline.stroke.validate()?;
        Ok(Self {
            style: self.style.validate()?,
            domain_gridlines: self.domain_gridlines.validate()?,
            range_gridlines: self.range_gridlines.validate()?,
            ..self
        })
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: PlotOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_dataset_rendering_order(mut self, order: DatasetRenderingOrder) -> Self {
        self.dataset_rendering_order = order;
        self
    }

    #[must_use]
    pub fn with_rendering_orders(mut self, columns: SortOrder, rows: SortOrder) -> Self {
        self.column_rendering_order = columns;
        self.row_rendering_order = rows;
        self
    }

    #[must_use]
    pub fn with_domain_gridlines(mut self, style: GridlineStyle, position: CategoryAnchor) -> Self {
        self.domain_gridlines = style;
        self.domain_gridline_position = position;
        self
    }

    #[must_use]
    pub fn with_crosshairs(mut self, domain: CrosshairConfig, range: CrosshairConfig) -> Self {
        self.domain_crosshair = domain;
        self.range_crosshair = range;
        self
    }

    #[must_use]
    pub fn with_range_pannable(mut self, pannable: bool) -> Self {
        self.range_pannable = pannable;
        self
    }
}

fn validate_layout(layout: &LayoutSettings) -> PlotResult<()> {
    layout.insets.validate()?;
    layout.axis_offset.validate()?;
    for space in [layout.fixed_domain_axis_space, layout.fixed_range_axis_space]
        .into_iter()
        .flatten()
    {
        let sides = [space.top, space.bottom, space.left, space.right];
        if sides.iter().any(|side| !side.is_finite() || *side < 0.0) {
            return Err(PlotError::InvalidArgument(
                "fixed axis space must be finite and >= 0".to_owned(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_weight(weight: u32) -> PlotResult<()> {
    if weight == 0 {
        return Err(PlotError::InvalidArgument("plot weight must be > 0".to_owned()));
    }
    Ok(())
}

fn validate_crosshair(crosshair: &CrosshairConfig) -> PlotResult<()> {
    crosshair.stroke.validate().map(|_| ())
}

fn validate_alpha(name: &str, alpha: f64) -> PlotResult<()> {
    if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
        return Err(PlotError::InvalidArgument(format!(
            "{name} must be finite and in [0, 1]"
        )));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_weight() -> u32 {
    1
}

fn default_alpha() -> f64 {
    1.0
}

fn default_background() -> Option<Color> {
    Some(Color::WHITE)
}

fn default_outline_stroke() -> Stroke {
    Stroke::solid(0.5, Color::GRAY)
}

fn default_gridline_stroke() -> Stroke {
    Stroke::dashed(0.5, Color::LIGHT_GRAY, 2.0, 2.0)
}

fn default_minor_gridline_stroke() -> Stroke {
    Stroke::solid(0.25, Color::LIGHT_GRAY)
}

fn default_baseline_stroke() -> Stroke {
    Stroke::solid(0.5, Color::BLACK)
}

fn default_no_data_font_size() -> f64 {
    12.0
}

fn default_no_data_color() -> Color {
    Color::BLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_json_fields_fall_back_to_defaults() {
        let config: XyPlotConfig = serde_json::from_str(r#"{"orientation":"Horizontal"}"#)
            .expect("parse");
        assert_eq!(config.orientation, PlotOrientation::Horizontal);
        assert_eq!(config.dataset_rendering_order, DatasetRenderingOrder::Reverse);
        assert!(config.style.outline_visible);
        assert!(config.domain_gridlines.visible);

        let category: CategoryPlotConfig = serde_json::from_str("{}").expect("parse");
        assert!(!category.domain_gridlines.visible);
        assert_eq!(category.domain_gridline_position, CategoryAnchor::Middle);
    }

    #[test]
    fn quadrant_index_is_bounded() {
        let mut config = XyPlotConfig::default();
        config
            .set_quadrant_paint(3, Some(Color::RED))
            .expect("last quadrant");
        assert_eq!(config.quadrant_paints[3], Some(Color::RED));
        assert!(matches!(
            config.set_quadrant_paint(4, Some(Color::RED)),
            Err(PlotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_alpha_and_empty_message() {
        let mut config = XyPlotConfig::default();
        config.style.foreground_alpha = 1.5;
        assert!(config.validate().is_err());

        let mut config = CategoryPlotConfig::default();
        config.style.no_data_message = Some(NoDataMessage::new(""));
        assert!(config.validate().is_err());
    }
}
