pub mod annotation;
pub mod axis;
pub mod category_axis;
pub mod category_dataset;
pub mod dataset;
pub mod geometry;
pub mod marker;
pub mod orientation;
pub mod primitives;
pub mod range;
pub mod scale;
pub mod ticks;
pub mod types;
pub mod value_axis;
pub mod xy_series;

pub use annotation::{Annotation, AnnotationContext, LineAnnotation, TextAnnotation};
pub use axis::{Axis, AxisKey, AxisState, AxisStyle};
pub use category_axis::{CategoryAnchor, CategoryAxis};
pub use category_dataset::DefaultCategoryDataset;
pub use dataset::{
    CategoryDataset, ItemWindow, XyDataset, find_category_range_bounds, find_domain_bounds,
    find_range_bounds, is_empty_category, is_empty_xy, visible_item_window,
};
pub use geometry::{AxisSpace, Point, Rect, RectangleInsets};
pub use marker::{Marker, MarkerKind, MarkerSet};
pub use orientation::{
    AxisFamily, AxisLocation, DatasetRenderingOrder, DomainOrder, Layer, PlotOrientation,
    RectangleEdge, SeriesRenderingOrder, SortOrder, resolve_domain_edge, resolve_range_edge,
};
pub use primitives::{datetime_to_unix_millis, decimal_to_f64};
pub use range::ValueRange;
pub use scale::{LinearScale, device_span_for_edge};
pub use ticks::Tick;
pub use types::{DataPoint, Viewport};
pub use value_axis::ValueAxis;
pub use xy_series::{XySeries, XySeriesCollection};
