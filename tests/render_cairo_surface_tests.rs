#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use chart_plot::PlotError;
use chart_plot::api::{Plot, SharedDataset, XyLineRenderer, XyPlot};
use chart_plot::core::{AxisFamily, DataPoint, Rect, ValueAxis, XySeries, XySeriesCollection};
use chart_plot::render::{CairoSurface, Color, DrawingSurface};

fn line_plot() -> XyPlot {
    let mut plot = XyPlot::new();
    plot.set_axis(AxisFamily::Domain, 0, Some(ValueAxis::new().with_label("time")))
        .expect("domain");
    plot.set_axis(AxisFamily::Range, 0, Some(ValueAxis::new().with_label("value")))
        .expect("range");
    let series = XySeries::from_points(
        "s",
        vec![
            DataPoint::new(10.0, 10.0),
            DataPoint::new(20.0, 20.0),
            DataPoint::new(40.0, 15.0),
        ],
    );
    plot.set_dataset(0, Some(SharedDataset::new(XySeriesCollection::new().with_series(series)).as_xy()))
        .expect("dataset");
    plot.set_renderer(0, Some(Box::new(XyLineRenderer::new())))
        .expect("renderer");
    plot
}

#[test]
fn cairo_surface_rejects_invalid_size() {
    let err = CairoSurface::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, PlotError::InvalidArgument(_)));
}

#[test]
fn cairo_surface_draws_axes_and_series() {
    let mut surface = CairoSurface::new(900, 500).expect("surface");
    surface.clear(Color::WHITE).expect("clear");
    let mut plot = line_plot();
    plot.draw(&mut surface, Rect::new(0.0, 0.0, 900.0, 500.0), None)
        .expect("draw")
        .expect("info");

    let stats = surface.stats();
    assert!(stats.lines_drawn > 2);
    assert!(stats.texts_drawn >= 2);
    assert!(stats.rects_drawn >= 1);
    assert!(surface.image_surface().is_some());
}

#[test]
fn cairo_surface_can_draw_on_external_context() {
    let image = ImageSurface::create(Format::ARgb32, 600, 320).expect("image");
    let context = Context::new(&image).expect("context");
    let mut surface = CairoSurface::for_context(context);
    let mut plot = line_plot();
    plot.draw(&mut surface, Rect::new(0.0, 0.0, 600.0, 320.0), None)
        .expect("draw");

    assert!(surface.image_surface().is_none());
    assert!(surface.stats().lines_drawn > 0);
    assert_eq!(surface.composite_alpha(), 1.0);
}
