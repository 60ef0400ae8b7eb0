//! Plot orchestration: axis registries, dataset bindings, layout and the
//! XY and category plots built from them.

mod axis_registry;
mod bar_renderer;
mod category_plot;
mod category_plot_interaction;
mod category_plot_render;
mod change;
mod config;
mod crosshair;
mod dataset_binding;
mod json_contract;
mod layout;
mod line_renderer;
mod plot;
mod renderer;
mod shared_dataset;
mod snapshot;
mod xy_plot;
mod xy_plot_interaction;
mod xy_plot_render;

pub use axis_registry::AxisRegistry;
pub use bar_renderer::BarRenderer;
pub use category_plot::CategoryPlot;
pub use change::{PlotChangeEvent, PlotChangeListener, PlotLink};
pub use config::{
    BaselineStyle, CategoryPlotConfig, GridlineStyle, NoDataMessage, PlotStyle, XyPlotConfig,
};
pub use crosshair::{CrosshairConfig, CrosshairState};
pub use dataset_binding::{AxisIndexList, DatasetBinding, validate_axis_indices};
pub use json_contract::{
    PLOT_CONFIG_JSON_SCHEMA_V1, PLOT_SNAPSHOT_JSON_SCHEMA_V1, PlotConfigJsonContractV1,
    PlotSnapshotJsonContractV1,
};
pub use layout::{LayoutEngine, LayoutSettings, MINIMUM_DRAW_EXTENT, PlotLayout};
pub use line_renderer::XyLineRenderer;
pub use plot::Plot;
pub use renderer::{
    CategoryItemContext, CategoryItemRenderer, CategoryRendererState, DEFAULT_SERIES_PALETTE,
    LegendItem, XyItemContext, XyItemRenderer, XyRendererState, palette_color,
};
pub use shared_dataset::{SharedCategoryDataset, SharedDataset, SharedXyDataset};
pub use snapshot::{AxisSnapshot, CrosshairSnapshot, PlotSnapshot};
pub use xy_plot::XyPlot;
