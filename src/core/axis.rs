use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::core::{AxisFamily, AxisSpace, Rect, RectangleEdge, Tick};
use crate::error::{PlotError, PlotResult};
use crate::render::{
    Color, DrawingSurface, LinePrimitive, Stroke, TextHAlign, TextPrimitive, TextVAlign,
    estimate_text_width,
};

/// Identity of one registered axis: its family and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxisKey {
    pub family: AxisFamily,
    pub index: usize,
}

impl AxisKey {
    #[must_use]
    pub const fn new(family: AxisFamily, index: usize) -> Self {
        Self { family, index }
    }

    #[must_use]
    pub const fn domain(index: usize) -> Self {
        Self::new(AxisFamily::Domain, index)
    }

    #[must_use]
    pub const fn range(index: usize) -> Self {
        Self::new(AxisFamily::Range, index)
    }
}

/// What an axis leaves behind after drawing: the advanced layout cursor and
/// the ticks gridlines are drawn against.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisState {
    pub cursor: f64,
    pub edge: RectangleEdge,
    pub ticks: Vec<Tick>,
}

impl AxisState {
    #[must_use]
    pub fn new(cursor: f64, edge: RectangleEdge) -> Self {
        Self {
            cursor,
            edge,
            ticks: Vec::new(),
        }
    }

    /// Moves the cursor away from the data area by `units`.
    pub fn move_cursor(&mut self, units: f64) {
        match self.edge {
            RectangleEdge::Top | RectangleEdge::Left => self.cursor -= units,
            RectangleEdge::Bottom | RectangleEdge::Right => self.cursor += units,
        }
    }
}

/// Contract every axis registered with a plot implements.
pub trait Axis: Debug {
    fn is_visible(&self) -> bool;

    /// Device coordinate of `value` along `edge` of `area`.
    ///
    /// Category axes read `value` as a category index and answer the slot middle.
    fn value_to_device(&self, value: f64, area: Rect, edge: RectangleEdge) -> f64;

    /// Adds the band this axis needs on `edge` to `space`.
    fn reserve_space(&self, plot_area: Rect, edge: RectangleEdge, space: &mut AxisSpace);

    /// Draws the axis outward from `cursor` and returns its state.
    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        cursor: f64,
        plot_area: Rect,
        data_area: Rect,
        edge: RectangleEdge,
    ) -> PlotResult<AxisState>;
}

/// Visual settings shared by value and category axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStyle {
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub axis_line_visible: bool,
    #[serde(default = "default_axis_line_stroke")]
    pub axis_line_stroke: Stroke,
    #[serde(default = "default_true")]
    pub tick_marks_visible: bool,
    #[serde(default = "default_tick_mark_outside_length")]
    pub tick_mark_outside_length: f64,
    #[serde(default = "default_true")]
    pub tick_labels_visible: bool,
    #[serde(default = "default_tick_label_font_size")]
    pub tick_label_font_size: f64,
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,
    #[serde(default = "default_label_color")]
    pub label_color: Color,
    #[serde(default = "default_label_gap")]
    pub label_gap: f64,
    /// Band thickness that replaces the estimated footprint when set.
    #[serde(default)]
    pub fixed_dimension: Option<f64>,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            visible: true,
            axis_line_visible: true,
            axis_line_stroke: default_axis_line_stroke(),
            tick_marks_visible: true,
            tick_mark_outside_length: default_tick_mark_outside_length(),
            tick_labels_visible: true,
            tick_label_font_size: default_tick_label_font_size(),
            label_font_size: default_label_font_size(),
            label_color: default_label_color(),
            label_gap: default_label_gap(),
            fixed_dimension: None,
        }
    }
}

impl AxisStyle {
    pub fn validate(self) -> PlotResult<Self> {
        self.axis_line_stroke.validate()?;
        self.label_color.validate()?;
        for (name, value) in [
            ("tick_mark_outside_length", self.tick_mark_outside_length),
            ("label_gap", self.label_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidArgument(format!(
                    "axis `{name}` must be finite and >= 0"
                )));
            }
        }
        for (name, value) in [
            ("tick_label_font_size", self.tick_label_font_size),
            ("label_font_size", self.label_font_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::InvalidArgument(format!(
                    "axis `{name}` must be finite and > 0"
                )));
            }
        }
        if let Some(dimension) = self.fixed_dimension {
            if !dimension.is_finite() || dimension < 0.0 {
                return Err(PlotError::InvalidArgument(
                    "axis fixed dimension must be finite and >= 0".to_owned(),
                ));
            }
        }
        Ok(self)
    }

    /// Thickness of the band the axis occupies outward from the data area.
    #[must_use]
    pub(crate) fn band_thickness(
        &self,
        edge: RectangleEdge,
        widest_tick_label: f64,
        label: Option<&str>,
    ) -> f64 {
        if let Some(fixed) = self.fixed_dimension {
            return fixed;
        }
        let mut thickness = 0.0;
        if self.tick_marks_visible {
            thickness += self.tick_mark_outside_length;
        }
        if self.tick_labels_visible {
            let across = if edge.is_top_or_bottom() {
                self.tick_label_font_size
            } else {
                widest_tick_label
            };
            thickness += across + 2.0 * self.label_gap;
        }
        if label.is_some_and(|text| !text.is_empty()) {
            thickness += self.label_font_size + 2.0 * self.label_gap;
        }
        thickness
    }

    /// Draws the axis line, tick marks, tick labels and axis label.
    ///
    /// `ticks` carries `(device coordinate along the axis, label)` pairs.
    pub(crate) fn draw_decorations(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut AxisState,
        data_area: Rect,
        ticks: &[(f64, &str)],
        label: Option<&str>,
    ) -> PlotResult<()> {
        let edge = state.edge;
        let cursor = state.cursor;
        let outward = match edge {
            RectangleEdge::Top | RectangleEdge::Left => -1.0,
            RectangleEdge::Bottom | RectangleEdge::Right => 1.0,
        };

        if self.axis_line_visible {
            let line = if edge.is_top_or_bottom() {
                LinePrimitive::new(
                    data_area.min_x(),
                    cursor,
                    data_area.max_x(),
                    cursor,
                    self.axis_line_stroke,
                )
            } else {
                LinePrimitive::new(
                    cursor,
                    data_area.min_y(),
                    cursor,
                    data_area.max_y(),
                    self.axis_line_stroke,
                )
            };
            surface.draw_line(line)?;
        }

        if self.tick_marks_visible && self.tick_mark_outside_length > 0.0 {
            let end = cursor + outward * self.tick_mark_outside_length;
            for (position, _) in ticks {
                let line = if edge.is_top_or_bottom() {
                    LinePrimitive::new(*position, cursor, *position, end, self.axis_line_stroke)
                } else {
                    LinePrimitive::new(cursor, *position, end, *position, self.axis_line_stroke)
                };
                surface.draw_line(line)?;
            }
            state.move_cursor(self.tick_mark_outside_length);
        }

        if self.tick_labels_visible {
            let anchor = state.cursor + outward * self.label_gap;
            let mut widest: f64 = 0.0;
            for (position, text) in ticks.iter().filter(|(_, text)| !text.is_empty()) {
                widest = widest.max(estimate_text_width(text, self.tick_label_font_size));
                let primitive = match edge {
                    RectangleEdge::Top => self
                        .tick_text(text, *position, anchor, TextHAlign::Center)
                        .with_v_align(TextVAlign::Bottom),
                    RectangleEdge::Bottom => {
                        self.tick_text(text, *position, anchor, TextHAlign::Center)
                    }
                    RectangleEdge::Left => self
                        .tick_text(text, anchor, *position, TextHAlign::Right)
                        .with_v_align(TextVAlign::Middle),
                    RectangleEdge::Right => self
                        .tick_text(text, anchor, *position, TextHAlign::Left)
                        .with_v_align(TextVAlign::Middle),
                };
                surface.draw_text(primitive)?;
            }
            let across = if edge.is_top_or_bottom() {
                self.tick_label_font_size
            } else {
                widest
            };
            state.move_cursor(across + 2.0 * self.label_gap);
        }

        if let Some(text) = label.filter(|text| !text.is_empty()) {
            let anchor = state.cursor + outward * self.label_gap;
            let primitive = if edge.is_top_or_bottom() {
                TextPrimitive::new(
                    text,
                    data_area.center_x(),
                    anchor,
                    self.label_font_size,
                    self.label_color,
                    TextHAlign::Center,
                )
                .with_v_align(if edge == RectangleEdge::Top {
                    TextVAlign::Bottom
                } else {
                    TextVAlign::Top
                })
            } else {
                TextPrimitive::new(
                    text,
                    anchor,
                    data_area.center_y(),
                    self.label_font_size,
                    self.label_color,
                    if edge == RectangleEdge::Left {
                        TextHAlign::Right
                    } else {
                        TextHAlign::Left
                    },
                )
                .with_v_align(TextVAlign::Middle)
            };
            surface.draw_text(primitive)?;
            state.move_cursor(self.label_font_size + 2.0 * self.label_gap);
        }

        Ok(())
    }

    fn tick_text(&self, text: &str, x: f64, y: f64, h_align: TextHAlign) -> TextPrimitive {
        TextPrimitive::new(
            text,
            x,
            y,
            self.tick_label_font_size,
            self.label_color,
            h_align,
        )
    }
}

fn default_true() -> bool {
    true
}

fn default_axis_line_stroke() -> Stroke {
    Stroke::solid(1.0, Color::GRAY)
}

fn default_tick_mark_outside_length() -> f64 {
    2.0
}

fn default_tick_label_font_size() -> f64 {
    10.0
}

fn default_label_font_size() -> f64 {
    12.0
}

fn default_label_color() -> Color {
    Color::DARK_GRAY
}

fn default_label_gap() -> f64 {
    2.0
}
