use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_plot::api::{
    CrosshairConfig, CrosshairState, LayoutEngine, LayoutSettings, NoDataMessage, Plot,
    PlotChangeEvent, PlotChangeListener, PlotStyle, SharedDataset, SharedXyDataset,
    XyItemContext, XyItemRenderer, XyLineRenderer, XyPlot, XyPlotConfig, XyRendererState,
};
use chart_plot::core::ticks::{VALUE_AXIS_MAX_TICK_INTERVALS, generate_value_ticks};
use chart_plot::core::{
    AxisFamily, AxisLocation, DataPoint, PlotOrientation, Point, Rect, RectangleEdge, ValueAxis,
    ValueRange, Viewport, XySeries, XySeriesCollection,
};
use chart_plot::interaction::DrawPhase;
use chart_plot::render::{DrawCommand, DrawingSurface, RecordingSurface};
use chart_plot::PlotResult;
use proptest::prelude::*;

struct Recorder {
    events: Rc<RefCell<Vec<PlotChangeEvent>>>,
}

impl PlotChangeListener for Recorder {
    fn id(&self) -> &str {
        "recorder"
    }

    fn plot_changed(&mut self, event: &PlotChangeEvent) {
        self.events.borrow_mut().push(*event);
    }
}

fn record(plot: &XyPlot) -> Rc<RefCell<Vec<PlotChangeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    plot.add_change_listener(Box::new(Recorder {
        events: events.clone(),
    }))
    .expect("listener");
    events
}

fn xy_dataset(points: &[(f64, f64)]) -> SharedXyDataset {
    let points = points.iter().map(|(x, y)| DataPoint::new(*x, *y)).collect();
    SharedDataset::new(XySeriesCollection::new().with_series(XySeries::from_points("s", points)))
        .as_xy()
}

fn tight_axis() -> ValueAxis {
    let mut axis = ValueAxis::new();
    axis.set_margins(0.0, 0.0).expect("margins");
    axis
}

fn fixed_axis(lower: f64, upper: f64) -> ValueAxis {
    ValueAxis::new().with_range(lower, upper).expect("range")
}

#[test]
fn replaced_axis_no_longer_notifies_the_plot() {
    let mut plot = XyPlot::new();
    plot.set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 1.0)))
        .expect("first axis");
    let events = record(&plot);

    let previous = plot
        .set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 2.0)))
        .expect("replace")
        .expect("previous axis");
    events.borrow_mut().clear();

    let mut detached = Rc::try_unwrap(previous).expect("plot released the old axis");
    detached.set_range_bounds(5.0, 6.0).expect("mutate old axis");
    assert!(events.borrow().is_empty());

    plot.update_axis(AxisFamily::Range, 0, |axis| axis.set_inverted(true))
        .expect("mutate new axis");
    assert_eq!(
        events.borrow().as_slice(),
        &[PlotChangeEvent::AxisChanged {
            family: AxisFamily::Range,
            index: 0
        }]
    );
}

#[test]
fn primary_axis_location_cannot_be_cleared() {
    let mut plot = XyPlot::new();
    assert!(plot.set_axis_location(AxisFamily::Domain, 0, None).is_err());
    assert!(plot.set_axis_location(AxisFamily::Domain, 1, None).is_ok());
}

proptest! {
    #[test]
    fn secondary_axes_default_to_the_opposite_side(
        location in prop::sample::select(AxisLocation::ALL.to_vec()),
        range_family in any::<bool>()
    ) {
        let family = if range_family { AxisFamily::Range } else { AxisFamily::Domain };
        let mut plot = XyPlot::new();
        plot.set_axis_location(family, 0, Some(location)).expect("location");
        prop_assert_eq!(plot.axis_location(family, 0), location);
        prop_assert_eq!(plot.axis_location(family, 1), location.opposite());
        prop_assert_eq!(plot.axis_location(family, 2), location.opposite());
    }

    #[test]
    fn first_mapped_axis_is_authoritative(
        indices in prop::collection::hash_set(0usize..16, 1..6),
        dataset_index in 0usize..8
    ) {
        let indices: Vec<usize> = indices.into_iter().collect();
        let mut plot = XyPlot::new();
        plot.map_dataset_to_axes(AxisFamily::Range, dataset_index, Some(&indices))
            .expect("mapping");
        prop_assert_eq!(plot.axis_index_for_dataset(AxisFamily::Range, dataset_index), indices[0]);

        prop_assert!(plot.map_dataset_to_axes(AxisFamily::Range, dataset_index, Some(&[])).is_err());
        let mut duplicated = indices.clone();
        duplicated.push(indices[0]);
        prop_assert!(plot.map_dataset_to_axes(AxisFamily::Domain, dataset_index, Some(&duplicated)).is_err());
        // a rejected mapping leaves the previous one in place
        prop_assert_eq!(plot.axis_index_for_dataset(AxisFamily::Range, dataset_index), indices[0]);
    }

    #[test]
    fn auto_range_ignores_dataset_order(
        spans in prop::collection::vec((-1_000.0f64..1_000.0, 0.0f64..500.0), 1..6)
            .prop_flat_map(|spans| (Just(spans.clone()), Just(spans).prop_shuffle()))
    ) {
        let (original, shuffled) = spans;
        let range_of = |spans: &[(f64, f64)]| {
            let mut plot = XyPlot::new();
            plot.set_axis(AxisFamily::Range, 0, Some(tight_axis())).expect("axis");
            for (index, (low, extent)) in spans.iter().enumerate() {
                plot.set_dataset(index, Some(xy_dataset(&[(0.0, *low), (1.0, low + extent)])))
                    .expect("dataset");
            }
            plot.data_range(AxisFamily::Range, 0)
        };
        prop_assert_eq!(range_of(&original), range_of(&shuffled));
    }

    #[test]
    fn reserving_space_twice_gives_identical_areas(
        width in 20.0f64..2_000.0,
        height in 20.0f64..2_000.0,
        secondary in any::<bool>()
    ) {
        let mut plot = XyPlot::new();
        plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(0.0, 10.0).with_label("x"))).expect("domain");
        plot.set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 100.0))).expect("range");
        if secondary {
            plot.set_axis(AxisFamily::Range, 1, Some(fixed_axis(-5.0, 5.0))).expect("secondary");
        }
        let settings = LayoutSettings::default();
        let engine = LayoutEngine::new(&settings);
        let area = Rect::new(0.0, 0.0, width, height);
        let first = engine.reserve_space(plot.axis_registry(), area);
        let second = engine.reserve_space(plot.axis_registry(), area);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn orientation_swaps_roles_but_not_values(
        value in 0.0f64..10.0,
        fraction in 0.05f64..0.95
    ) {
        let build = |orientation| {
            let config = XyPlotConfig::default().with_orientation(orientation);
            let mut plot = XyPlot::with_config(config).expect("plot");
            plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(0.0, 10.0))).expect("domain");
            plot.set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 100.0))).expect("range");
            plot.set_dataset(0, Some(xy_dataset(&[(1.0, 10.0), (9.0, 90.0)]))).expect("dataset");
            plot.set_renderer(0, Some(Box::new(XyLineRenderer::new()))).expect("renderer");
            let mut surface = RecordingSurface::new(Viewport::new(500, 500));
            let info = plot
                .draw(&mut surface, Rect::new(0.0, 0.0, 500.0, 500.0), None)
                .expect("draw")
                .expect("info");
            (plot, info.data_area)
        };
        let (vertical, v_area) = build(PlotOrientation::Vertical);
        let (horizontal, h_area) = build(PlotOrientation::Horizontal);

        prop_assert_eq!(vertical.axis_registry().edge_of(AxisFamily::Domain, 0), RectangleEdge::Bottom);
        prop_assert_eq!(horizontal.axis_registry().edge_of(AxisFamily::Domain, 0), RectangleEdge::Left);
        prop_assert_eq!(horizontal.axis_registry().edge_of(AxisFamily::Range, 0), RectangleEdge::Bottom);

        // same value, same relative position along whichever screen axis carries the domain
        let v_axis = vertical.domain_axis(0).expect("axis");
        let h_axis = horizontal.domain_axis(0).expect("axis");
        let v_device = v_axis.value_to_device(value, v_area, RectangleEdge::Bottom);
        let h_device = h_axis.value_to_device(value, h_area, RectangleEdge::Left);
        let v_fraction = (v_device - v_area.min_x()) / v_area.width;
        let h_fraction = (h_area.max_y() - h_device) / h_area.height;
        prop_assert!((v_fraction - h_fraction).abs() < 1e-9);

        // clicking the mirrored point yields the same crosshair values
        let mut vertical = vertical;
        let mut horizontal = horizontal;
        let v_point = Point::new(
            v_area.min_x() + v_area.width * fraction,
            v_area.max_y() - v_area.height * fraction,
        );
        let h_point = Point::new(
            h_area.min_x() + h_area.width * fraction,
            h_area.max_y() - h_area.height * fraction,
        );
        prop_assert!(vertical.handle_click(v_point).expect("click"));
        prop_assert!(horizontal.handle_click(h_point).expect("click"));
        for family in [AxisFamily::Domain, AxisFamily::Range] {
            prop_assert!(
                (vertical.crosshair_value(family) - horizontal.crosshair_value(family)).abs() < 1e-9
            );
        }
    }
}

fn crosshair_plot(locked: bool) -> XyPlot {
    let crosshair = CrosshairConfig::default().visible(true).locked_on_data(locked);
    let config = XyPlotConfig::default().with_crosshairs(crosshair, crosshair);
    let mut plot = XyPlot::with_config(config).expect("plot");
    plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(0.0, 10.0))).expect("domain");
    plot.set_axis(AxisFamily::Range, 0, Some(fixed_axis(0.0, 100.0))).expect("range");
    plot.set_dataset(0, Some(xy_dataset(&[(2.0, 20.0), (8.0, 80.0)]))).expect("dataset");
    plot.set_renderer(0, Some(Box::new(XyLineRenderer::new()))).expect("renderer");
    plot
}

/// Device point a few pixels off item (8, 80), and the values under it.
fn anchor_near_item(plot: &mut XyPlot, surface: &mut RecordingSurface, area: Rect) -> (Point, f64, f64) {
    let data_area = plot.draw(surface, area, None).expect("draw").expect("info").data_area;
    let domain = plot.domain_axis(0).expect("domain");
    let range = plot.range_axis(0).expect("range");
    let x = domain.value_to_device(8.0, data_area, RectangleEdge::Bottom) - 3.0;
    let y = range.value_to_device(80.0, data_area, RectangleEdge::Left) + 4.0;
    (
        Point::new(x, y),
        domain.device_to_value(x, data_area, RectangleEdge::Bottom),
        range.device_to_value(y, data_area, RectangleEdge::Left),
    )
}

#[test]
fn locked_crosshairs_snap_to_the_nearest_item() {
    let mut plot = crosshair_plot(true);
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let area = Rect::new(0.0, 0.0, 400.0, 300.0);
    let (anchor, _, _) = anchor_near_item(&mut plot, &mut surface, area);
    plot.draw(&mut surface, area, Some(anchor)).expect("draw");
    assert_relative_eq!(plot.crosshair_value(AxisFamily::Domain), 8.0, epsilon = 1e-9);
    assert_relative_eq!(plot.crosshair_value(AxisFamily::Range), 80.0, epsilon = 1e-9);
}

#[test]
fn unlocked_crosshairs_follow_the_anchor() {
    let mut plot = crosshair_plot(false);
    let mut surface = RecordingSurface::new(Viewport::new(400, 300));
    let area = Rect::new(0.0, 0.0, 400.0, 300.0);
    let (anchor, x, y) = anchor_near_item(&mut plot, &mut surface, area);
    plot.draw(&mut surface, area, Some(anchor)).expect("draw");
    assert_relative_eq!(plot.crosshair_value(AxisFamily::Domain), x, epsilon = 1e-9);
    assert_relative_eq!(plot.crosshair_value(AxisFamily::Range), y, epsilon = 1e-9);
    assert!((plot.crosshair_value(AxisFamily::Domain) - 8.0).abs() > 1e-6);
}

#[test]
fn secondary_range_axis_takes_over_a_remapped_dataset() {
    let mut plot = XyPlot::new();
    plot.set_axis(AxisFamily::Domain, 0, Some(tight_axis())).expect("domain");
    plot.set_axis(AxisFamily::Range, 0, Some(tight_axis())).expect("range");
    plot.set_dataset(0, Some(xy_dataset(&[(1.0, 10.0), (2.0, 20.0)]))).expect("d0");
    plot.set_dataset(1, Some(xy_dataset(&[(1.0, 5.0), (2.0, 25.0)]))).expect("d1");

    let primary = plot.range_axis(0).expect("primary");
    assert_eq!((primary.lower_bound(), primary.upper_bound()), (5.0, 25.0));

    plot.set_axis(AxisFamily::Range, 1, Some(tight_axis())).expect("secondary");
    plot.map_dataset_to_axes(AxisFamily::Range, 1, Some(&[1])).expect("remap");

    let primary = plot.range_axis(0).expect("primary");
    let secondary = plot.range_axis(1).expect("secondary");
    assert_eq!((primary.lower_bound(), primary.upper_bound()), (10.0, 20.0));
    assert_eq!((secondary.lower_bound(), secondary.upper_bound()), (5.0, 25.0));
    assert_eq!(plot.data_range(AxisFamily::Range, 1).map(|r| (r.lower(), r.upper())), Some((5.0, 25.0)));
}

#[test]
fn secondary_mapping_widens_without_taking_over_conversion() {
    let mut plot = XyPlot::new();
    plot.set_axis(AxisFamily::Range, 0, Some(tight_axis())).expect("range");
    plot.set_axis(AxisFamily::Range, 1, Some(tight_axis())).expect("secondary");
    plot.set_dataset(0, Some(xy_dataset(&[(1.0, 10.0), (2.0, 20.0)]))).expect("d0");
    plot.set_dataset(1, Some(xy_dataset(&[(1.0, 5.0), (2.0, 25.0)]))).expect("d1");
    plot.map_dataset_to_axes(AxisFamily::Range, 1, Some(&[1, 0])).expect("map");

    assert_eq!(plot.axis_index_for_dataset(AxisFamily::Range, 1), 1);
    let primary = plot.range_axis(0).expect("primary");
    assert_eq!((primary.lower_bound(), primary.upper_bound()), (5.0, 25.0));
}

/// (dataset, pass, series, item) of every `draw_item` call.
type CallLog = Rc<RefCell<Vec<(usize, usize, usize, usize)>>>;

#[derive(Debug, Clone)]
struct LoggingRenderer {
    passes: usize,
    log: CallLog,
}

impl XyItemRenderer for LoggingRenderer {
    fn pass_count(&self) -> usize {
        self.passes
    }

    fn draw_item(
        &self,
        _surface: &mut dyn DrawingSurface,
        state: &mut XyRendererState,
        context: &XyItemContext<'_>,
        series: usize,
        item: usize,
        _crosshair: &mut CrosshairState,
    ) -> PlotResult<()> {
        self.log
            .borrow_mut()
            .push((context.dataset_index, state.pass, series, item));
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn XyItemRenderer> {
        Box::new(self.clone())
    }
}

fn logging_plot(config: XyPlotConfig) -> XyPlot {
    let mut plot = XyPlot::with_config(config).expect("plot");
    plot.set_axis(AxisFamily::Domain, 0, Some(tight_axis())).expect("domain");
    plot.set_axis(AxisFamily::Range, 0, Some(tight_axis())).expect("range");
    plot
}

fn draw_once(plot: &mut XyPlot) -> (RecordingSurface, chart_plot::interaction::PlotRenderingInfo) {
    let mut surface = RecordingSurface::new(Viewport::new(320, 240));
    let info = plot
        .draw(&mut surface, Rect::new(0.0, 0.0, 320.0, 240.0), None)
        .expect("draw")
        .expect("info");
    (surface, info)
}

#[test]
fn empty_datasets_fall_back_to_the_no_data_message() {
    let style = PlotStyle {
        no_data_message: Some(NoDataMessage::new("Nothing to show")),
        ..PlotStyle::default()
    };
    let mut plot = logging_plot(XyPlotConfig::default().with_style(style));
    let log = CallLog::default();
    plot.set_dataset(0, Some(SharedDataset::new(XySeriesCollection::new()).as_xy()))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(LoggingRenderer { passes: 1, log: log.clone() })))
        .expect("renderer");

    let (surface, info) = draw_once(&mut plot);
    assert!(log.borrow().is_empty());
    assert!(!info.found_data());
    assert!(info.ran(DrawPhase::NoDataMessage));
    assert!(surface.commands().iter().any(|command| matches!(
        command,
        DrawCommand::Text(text) if text.text == "Nothing to show"
    )));
}

#[test]
fn segment_crossing_a_zoomed_window_counts_as_data() {
    let style = PlotStyle {
        no_data_message: Some(NoDataMessage::new("Nothing to show")),
        ..PlotStyle::default()
    };
    let mut plot = logging_plot(XyPlotConfig::default().with_style(style));
    plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(4.0, 6.0))).expect("domain");
    let log = CallLog::default();
    plot.set_dataset(0, Some(xy_dataset(&[(0.0, 0.0), (10.0, 10.0)])))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(LoggingRenderer { passes: 1, log: log.clone() })))
        .expect("renderer");

    let (_, info) = draw_once(&mut plot);
    assert!(info.found_data());
    assert!(!info.ran(DrawPhase::NoDataMessage));
    assert_eq!(log.borrow().len(), 2);

    plot.set_axis(AxisFamily::Domain, 0, Some(fixed_axis(20.0, 30.0))).expect("domain");
    let (_, info) = draw_once(&mut plot);
    assert!(!info.found_data());
    assert!(info.ran(DrawPhase::NoDataMessage));
}

#[test]
fn reverse_dataset_order_draws_the_primary_dataset_last() {
    let mut plot = logging_plot(XyPlotConfig::default());
    let log = CallLog::default();
    for index in 0..3 {
        let offset = index as f64;
        plot.set_dataset(index, Some(xy_dataset(&[(0.0, offset), (1.0, offset + 1.0)])))
            .expect("dataset");
        plot.set_renderer(index, Some(Box::new(LoggingRenderer { passes: 1, log: log.clone() })))
            .expect("renderer");
    }

    draw_once(&mut plot);
    let order: Vec<usize> = log.borrow().iter().map(|call| call.0).collect();
    assert_eq!(order, vec![2, 2, 1, 1, 0, 0]);
}

#[test]
fn every_pass_completes_before_the_next_starts() {
    let config = XyPlotConfig::default()
        .with_series_rendering_order(chart_plot::core::SeriesRenderingOrder::Forward);
    let mut plot = logging_plot(config);
    let log = CallLog::default();
    let data = XySeriesCollection::new()
        .with_series(XySeries::from_points(
            "a",
            vec![DataPoint::new(0.0, 1.0), DataPoint::new(1.0, 2.0)],
        ))
        .with_series(XySeries::from_points(
            "b",
            vec![DataPoint::new(0.0, 3.0), DataPoint::new(1.0, 4.0)],
        ));
    plot.set_dataset(0, Some(SharedDataset::new(data).as_xy())).expect("dataset");
    plot.set_renderer(0, Some(Box::new(LoggingRenderer { passes: 2, log: log.clone() })))
        .expect("renderer");

    let (_, info) = draw_once(&mut plot);
    let calls: Vec<(usize, usize, usize)> =
        log.borrow().iter().map(|(_, pass, series, item)| (*pass, *series, *item)).collect();
    assert_eq!(
        calls,
        vec![
            (0, 0, 0),
            (0, 0, 1),
            (0, 1, 0),
            (0, 1, 1),
            (1, 0, 0),
            (1, 0, 1),
            (1, 1, 0),
            (1, 1, 1),
        ]
    );
    assert_eq!(info.items_drawn(0), 8);
    assert!(info.found_data());
}

#[test]
fn huge_span_with_a_unit_tick_step_still_draws() {
    let mut plot = logging_plot(XyPlotConfig::default());
    let mut domain = fixed_axis(-1e19, 1e19);
    domain.set_tick_unit(Some(1.0)).expect("tick unit");
    domain.set_minor_tick_count(4);
    plot.set_axis(AxisFamily::Domain, 0, Some(domain)).expect("domain");
    plot.set_dataset(0, Some(xy_dataset(&[(-1e18, 1.0), (1e18, 2.0)])))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(XyLineRenderer::new()))).expect("renderer");

    let (_, info) = draw_once(&mut plot);
    assert!(info.ran(DrawPhase::Gridlines));
    let domain = plot.domain_axis(0).expect("domain axis");
    let ticks = domain.refresh_ticks(Rect::new(0.0, 0.0, 320.0, 240.0), RectangleEdge::Bottom);
    assert!(ticks.is_empty());
}

proptest! {
    #[test]
    fn tick_generation_stays_bounded(
        lower in -1e20f64..1e20,
        extent in 0.0f64..1e20,
        step in prop_oneof![1e-12f64..1e-6, 1e-3f64..1e3, 1e6f64..1e20],
        minor_count in 0usize..5
    ) {
        let range = ValueRange::new(lower, lower + extent).expect("range");
        let ticks = generate_value_ticks(range, step, minor_count);
        let majors = ticks.iter().filter(|tick| tick.major).count();
        prop_assert!(majors <= VALUE_AXIS_MAX_TICK_INTERVALS + 1);
        prop_assert!(ticks.len() <= (VALUE_AXIS_MAX_TICK_INTERVALS + 2) * (minor_count + 1));
    }
}
