use chart_plot::api::{LayoutEngine, LayoutSettings, Plot, SharedDataset, XyLineRenderer, XyPlot};
use chart_plot::core::{
    AxisFamily, DataPoint, Rect, RectangleEdge, ValueAxis, Viewport, XySeries, XySeriesCollection,
    visible_item_window,
};
use chart_plot::render::RecordingSurface;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn sine_series(count: usize) -> XySeriesCollection {
    let points = (0..count)
        .map(|i| {
            let x = i as f64;
            DataPoint::new(x, 100.0 + (x * 0.01).sin() * 25.0)
        })
        .collect();
    XySeriesCollection::new().with_series(XySeries::from_points("sine", points))
}

fn line_plot_10k() -> XyPlot {
    let mut plot = XyPlot::new();
    plot.set_axis(AxisFamily::Domain, 0, Some(ValueAxis::new()))
        .expect("domain axis");
    plot.set_axis(AxisFamily::Range, 0, Some(ValueAxis::new()))
        .expect("range axis");
    plot.set_dataset(0, Some(SharedDataset::new(sine_series(10_000)).as_xy()))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(XyLineRenderer::new())))
        .expect("renderer");
    plot
}

fn bench_xy_draw_10k(c: &mut Criterion) {
    let mut plot = line_plot_10k();
    let area = Rect::new(0.0, 0.0, 1600.0, 900.0);
    let mut surface = RecordingSurface::new(Viewport::new(1600, 900));

    c.bench_function("xy_draw_10k", |b| {
        b.iter(|| {
            surface.clear();
            let info = plot
                .draw(&mut surface, black_box(area), None)
                .expect("draw should succeed");
            black_box(info);
        })
    });
}

fn bench_value_axis_round_trip(c: &mut Criterion) {
    let axis = ValueAxis::new()
        .with_range(0.0, 10_000.0)
        .expect("valid range");
    let area = Rect::new(60.0, 20.0, 1800.0, 1000.0);

    c.bench_function("value_axis_round_trip", |b| {
        b.iter(|| {
            let px = axis.value_to_device(black_box(4_321.123), area, RectangleEdge::Bottom);
            let _ = axis.device_to_value(px, area, RectangleEdge::Bottom);
        })
    });
}

fn bench_visible_item_window_100k(c: &mut Criterion) {
    let data = sine_series(100_000);

    c.bench_function("visible_item_window_100k", |b| {
        b.iter(|| {
            let _ = visible_item_window(
                black_box(&data),
                black_box(0),
                black_box(40_000.5),
                black_box(41_000.5),
            );
        })
    });
}

fn bench_layout_reserve_space(c: &mut Criterion) {
    let mut plot = line_plot_10k();
    plot.set_axis(AxisFamily::Range, 1, Some(ValueAxis::new().with_label("secondary")))
        .expect("secondary axis");
    let settings = LayoutSettings::default();
    let engine = LayoutEngine::new(&settings);
    let area = Rect::new(0.0, 0.0, 1600.0, 900.0);

    c.bench_function("layout_reserve_space", |b| {
        b.iter(|| {
            let _ = engine.reserve_space(plot.axis_registry(), black_box(area));
        })
    });
}

criterion_group!(
    benches,
    bench_xy_draw_10k,
    bench_value_axis_round_trip,
    bench_visible_item_window_100k,
    bench_layout_reserve_space
);
criterion_main!(benches);
