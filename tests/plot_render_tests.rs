use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_plot::api::{
    CategoryItemContext, CategoryItemRenderer, CategoryPlot, CategoryPlotConfig,
    CategoryRendererState, CrosshairState, GridlineStyle, Plot, PlotStyle, SharedDataset, XyLineRenderer, XyPlot,
    XyPlotConfig,
};
use chart_plot::core::{
    AxisFamily, CategoryAxis, DataPoint, DefaultCategoryDataset, Layer, Marker, Point, Rect,
    SortOrder, TextAnnotation, ValueAxis, Viewport, XySeries, XySeriesCollection,
};
use chart_plot::interaction::DrawPhase;
use chart_plot::render::{
    Color, DefaultShadowGenerator, DrawCommand, DrawingSurface, RecordingSurface, RenderingHints, ShadowGenerator,
    Stroke,
};
use chart_plot::PlotResult;

fn fixed_axis(lower: f64, upper: f64) -> ValueAxis {
    ValueAxis::new().with_range(lower, upper).expect("range")
}

fn line_plot(config: XyPlotConfig) -> XyPlot {
    let mut plot = XyPlot::with_config(config).expect("plot");
    plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(0.0, 10.0))).expect("domain");
    plot.set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 100.0))).expect("range");
    let series = XySeries::from_points(
        "temperature",
        vec![DataPoint::new(1.0, 10.0), DataPoint::new(5.0, 60.0), DataPoint::new(9.0, 40.0)],
    );
    plot.set_dataset(0, Some(SharedDataset::new(XySeriesCollection::new().with_series(series)).as_xy()))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(XyLineRenderer::new()))).expect("renderer");
    plot
}

const AREA: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

fn shadow_polylines(surface: &RecordingSurface) -> usize {
    let shadow_color = Color::BLACK.with_alpha(0.5);
    surface
        .commands()
        .iter()
        .filter(|command| matches!(
            command,
            DrawCommand::Polyline { stroke, .. } if stroke.color == shadow_color
        ))
        .count()
}

#[test]
fn shadow_is_composited_under_the_data_layer() {
    let style = PlotStyle {
        shadow: Some(DefaultShadowGenerator::default()),
        ..PlotStyle::default()
    };
    let mut plot = line_plot(XyPlotConfig::default().with_style(style));
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let info = plot.draw(&mut surface, AREA, None).expect("draw").expect("info");

    assert!(info.ran(DrawPhase::ShadowComposite));
    assert_eq!(surface.open_layers(), 0);
    assert_eq!(shadow_polylines(&surface), 1);

    let polylines: Vec<&Vec<Point>> = surface
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Polyline { points, .. } => Some(points),
            _ => None,
        })
        .collect();
    assert_eq!(polylines.len(), 2);
    let generator = DefaultShadowGenerator::default();
    // shadow first, shifted by the generator offset
    assert_relative_eq!(polylines[0][0].x, polylines[1][0].x + generator.offset_x(), epsilon = 1e-9);
    assert_relative_eq!(polylines[0][0].y, polylines[1][0].y + generator.offset_y(), epsilon = 1e-9);
}

#[test]
fn suppress_shadow_hint_skips_the_shadow_layer() {
    let style = PlotStyle {
        shadow: Some(DefaultShadowGenerator::default()),
        ..PlotStyle::default()
    };
    let mut plot = line_plot(XyPlotConfig::default().with_style(style));
    let mut surface = RecordingSurface::new(Viewport::new(400, 300)).with_rendering_hints(
        RenderingHints {
            suppress_shadow: true,
            ..RenderingHints::default()
        },
    );
    let info = plot.draw(&mut surface, AREA, None).expect("draw").expect("info");

    assert!(!info.ran(DrawPhase::ShadowComposite));
    assert_eq!(shadow_polylines(&surface), 0);
    assert_eq!(surface.open_layers(), 0);
}

#[test]
fn phases_run_in_layer_order() {
    let mut plot = line_plot(XyPlotConfig::default());
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let info = plot.draw(&mut surface, AREA, None).expect("draw").expect("info");
    assert_eq!(
        info.phases(),
        &[
            DrawPhase::Sizing,
            DrawPhase::Background,
            DrawPhase::Axes,
            DrawPhase::Gridlines,
            DrawPhase::BackgroundMarkers,
            DrawPhase::BackgroundAnnotations,
            DrawPhase::Items,
            DrawPhase::ForegroundAnnotations,
            DrawPhase::Crosshairs,
            DrawPhase::ForegroundMarkers,
            DrawPhase::Outline,
        ]
    );
    // every clip opened inside the draw is closed again
    let pushes = surface
        .commands()
        .iter()
        .filter(|command| matches!(command, DrawCommand::PushClip(_)))
        .count();
    let pops = surface
        .commands()
        .iter()
        .filter(|command| matches!(command, DrawCommand::PopClip))
        .count();
    assert_eq!(pushes, pops);
}

fn filled(surface: &RecordingSurface, paint: Color) -> Vec<Rect> {
    surface
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::FillRect { rect, color } if *color == paint => Some(*rect),
            _ => None,
        })
        .collect()
}

#[test]
fn quadrants_split_the_data_area_at_the_origin() {
    let mut config = XyPlotConfig::default().with_quadrant_origin(Point::new(5.0, 50.0));
    config.set_quadrant_paint(0, Some(Color::RED)).expect("paint");
    config.set_quadrant_paint(3, Some(Color::BLUE)).expect("paint");
    let mut plot = line_plot(config);
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let data_area = plot.draw(&mut surface, AREA, None).expect("draw").expect("info").data_area;

    let red = filled(&surface, Color::RED);
    assert_eq!(red.len(), 1);
    assert_relative_eq!(red[0].min_x(), data_area.min_x(), epsilon = 1e-9);
    assert_relative_eq!(red[0].min_y(), data_area.min_y(), epsilon = 1e-9);
    assert_relative_eq!(red[0].max_x(), data_area.center_x(), epsilon = 1e-9);
    assert_relative_eq!(red[0].max_y(), data_area.center_y(), epsilon = 1e-9);

    let blue = filled(&surface, Color::BLUE);
    assert_eq!(blue.len(), 1);
    assert_relative_eq!(blue[0].min_x(), data_area.center_x(), epsilon = 1e-9);
    assert_relative_eq!(blue[0].max_y(), data_area.max_y(), epsilon = 1e-9);
}

#[test]
fn quadrant_without_extent_is_not_filled() {
    let mut config = XyPlotConfig::default().with_quadrant_origin(Point::new(0.0, 0.0));
    config.set_quadrant_paint(0, Some(Color::RED)).expect("paint");
    config.set_quadrant_paint(1, Some(Color::BLUE)).expect("paint");
    let mut plot = line_plot(config);
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    plot.draw(&mut surface, AREA, None).expect("draw");

    assert!(filled(&surface, Color::RED).is_empty());
    assert_eq!(filled(&surface, Color::BLUE).len(), 1);
}

#[test]
fn domain_tick_bands_fill_alternate_intervals_under_the_gridlines() {
    let band = Color::rgb(0.9, 0.9, 1.0);
    let mut plot = line_plot(XyPlotConfig::default().with_tick_band_paints(Some(band), None));
    plot.update_axis(AxisFamily::Domain, 0, |axis| axis.set_tick_unit(Some(2.5)))
        .expect("update")
        .expect("domain axis")
        .expect("tick unit");
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let data_area = plot.draw(&mut surface, AREA, None).expect("draw").expect("info").data_area;

    // ticks 0, 2.5, 5, 7.5, 10: bands over [0, 2.5] and [5, 7.5]
    let bands = filled(&surface, band);
    assert_eq!(bands.len(), 2);
    let quarter = data_area.width / 4.0;
    assert_relative_eq!(bands[0].min_x(), data_area.min_x(), epsilon = 1e-9);
    assert_relative_eq!(bands[0].width, quarter, epsilon = 1e-9);
    assert_relative_eq!(bands[1].min_x(), data_area.min_x() + 2.0 * quarter, epsilon = 1e-9);
    assert_relative_eq!(bands[1].height, data_area.height, epsilon = 1e-9);

    let gridline = GridlineStyle::default().stroke;
    let commands = surface.commands();
    let last_band = commands
        .iter()
        .rposition(|command| matches!(command, DrawCommand::FillRect { color, .. } if *color == band))
        .expect("band");
    let first_gridline = commands
        .iter()
        .position(|command| matches!(command, DrawCommand::Line(line) if line.stroke == gridline))
        .expect("gridline");
    assert!(last_band < first_gridline);
}

#[test]
fn tick_bands_are_off_by_default() {
    let fill_count = |config: XyPlotConfig| {
        let mut plot = line_plot(config);
        plot.update_axis(AxisFamily::Range, 0, |axis| axis.set_tick_unit(Some(25.0)))
            .expect("update")
            .expect("range axis")
            .expect("tick unit");
        let mut surface = RecordingSurface::new(Viewport::new(400, 300));
        plot.draw(&mut surface, AREA, None).expect("draw");
        surface
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillRect { .. }))
            .count()
    };
    let plain = fill_count(XyPlotConfig::default());
    // range ticks 0, 25, 50, 75, 100: bands over [0, 25] and [50, 75]
    let banded = fill_count(XyPlotConfig::default().with_tick_band_paints(None, Some(Color::GRAY)));
    assert_eq!(banded, plain + 2);
}

#[test]
fn degenerate_area_draws_nothing_and_forgets_the_last_draw() {
    let mut plot = line_plot(XyPlotConfig::default());
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let info = plot.draw(&mut surface, AREA, None).expect("draw").expect("info");
    let inside = Point::new(info.data_area.center_x(), info.data_area.center_y());

    surface.clear();
    let tiny = Rect::new(0.0, 0.0, 8.0, 8.0);
    assert!(plot.draw(&mut surface, tiny, None).expect("draw").is_none());
    assert!(surface.commands().is_empty());
    assert!(plot.rendering_info().is_none());
    assert!(!plot.handle_click(inside).expect("click"));
}

#[test]
fn markers_and_annotations_land_in_their_layers() {
    let mut plot = line_plot(XyPlotConfig::default());
    let red_line = Stroke::solid(1.0, Color::RED);
    plot.add_marker(
        AxisFamily::Range,
        0,
        Marker::value(50.0).expect("marker").with_stroke(red_line).with_alpha(1.0),
        Layer::Foreground,
    )
    .expect("marker");
    plot.add_marker(
        AxisFamily::Range,
        0,
        Marker::value(500.0)
            .expect("marker")
            .with_stroke(Stroke::solid(1.0, Color::BLUE))
            .with_alpha(1.0),
        Layer::Background,
    )
    .expect("off-range marker");
    plot.add_annotation(Box::new(
        TextAnnotation::new("peak", 5.0, 60.0).expect("annotation").with_layer(Layer::Background),
    ))
    .expect("annotation");

    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let data_area = plot.draw(&mut surface, AREA, None).expect("draw").expect("info").data_area;

    let marker_lines: Vec<_> = surface
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Line(line) if line.stroke.color == Color::RED => Some(*line),
            _ => None,
        })
        .collect();
    assert_eq!(marker_lines.len(), 1);
    assert_relative_eq!(marker_lines[0].y1, data_area.center_y(), epsilon = 1e-9);
    assert_relative_eq!(marker_lines[0].x1, data_area.min_x(), epsilon = 1e-9);
    assert_relative_eq!(marker_lines[0].x2, data_area.max_x(), epsilon = 1e-9);

    assert!(!surface.commands().iter().any(|command| matches!(
        command,
        DrawCommand::Line(line) if line.stroke.color == Color::BLUE
    )));

    let texts: Vec<usize> = surface
        .commands()
        .iter()
        .enumerate()
        .filter_map(|(position, command)| match command {
            DrawCommand::Text(text) if text.text == "peak" => Some(position),
            _ => None,
        })
        .collect();
    let first_polyline = surface
        .commands()
        .iter()
        .position(|command| matches!(command, DrawCommand::Polyline { .. }))
        .expect("series line");
    assert_eq!(texts.len(), 1);
    assert!(texts[0] < first_polyline);
}

type CellLog = Rc<RefCell<Vec<(usize, usize)>>>;

#[derive(Debug, Clone)]
struct LoggingBars {
    log: CellLog,
}

impl CategoryItemRenderer for LoggingBars {
    fn draw_item(
        &self,
        _surface: &mut dyn DrawingSurface,
        _state: &mut CategoryRendererState,
        _context: &CategoryItemContext<'_>,
        row: usize,
        column: usize,
        _crosshair: &mut CrosshairState,
    ) -> PlotResult<()> {
        self.log.borrow_mut().push((row, column));
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn CategoryItemRenderer> {
        Box::new(self.clone())
    }
}

fn category_plot(config: CategoryPlotConfig, log: &CellLog) -> CategoryPlot {
    let mut plot = CategoryPlot::with_config(config).expect("plot");
    plot.set_domain_axis(0, Some(CategoryAxis::new())).expect("domain");
    plot.set_range_axis(0, Some(fixed_axis(0.0, 10.0))).expect("range");
    let data = DefaultCategoryDataset::new()
        .with_value(1.0, "north", "Q1")
        .with_value(2.0, "north", "Q2")
        .with_value(3.0, "north", "Q3")
        .with_value(4.0, "south", "Q1")
        .with_value(5.0, "south", "Q2")
        .with_value(6.0, "south", "Q3");
    plot.set_dataset(0, Some(SharedDataset::new(data).as_category()))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(LoggingBars { log: log.clone() })))
        .expect("renderer");
    plot
}

#[test]
fn category_items_follow_column_then_row_order() {
    let log = CellLog::default();
    let config = CategoryPlotConfig::default()
        .with_rendering_orders(SortOrder::Descending, SortOrder::Ascending);
    let mut plot = category_plot(config, &log);
    let mut surface = RecordingSurface::new(Viewport::new(300, 200));
    let info = plot
        .draw(&mut surface, Rect::new(0.0, 0.0, 300.0, 200.0), None)
        .expect("draw")
        .expect("info");

    assert_eq!(
        log.borrow().as_slice(),
        &[(0, 2), (1, 2), (0, 1), (1, 1), (0, 0), (1, 0)]
    );
    assert_eq!(info.items_drawn(0), 6);
    assert!(info.found_data());
}

#[test]
fn descending_rows_are_visited_last_to_first() {
    let log = CellLog::default();
    let config = CategoryPlotConfig::default()
        .with_rendering_orders(SortOrder::Ascending, SortOrder::Descending);
    let mut plot = category_plot(config, &log);
    let mut surface = RecordingSurface::new(Viewport::new(300, 200));
    plot.draw(&mut surface, Rect::new(0.0, 0.0, 300.0, 200.0), None)
        .expect("draw");

    let first_column: Vec<(usize, usize)> = log.borrow().iter().take(2).copied().collect();
    assert_eq!(first_column, vec![(1, 0), (0, 0)]);
}
