//! chart-plot: plot layout and rendering orchestration.
//!
//! An `XyPlot` or `CategoryPlot` owns its axes, binds shared datasets to
//! renderers, reserves axis space around a data area and draws everything in
//! a fixed layer order onto any [`render::DrawingSurface`].

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{CategoryPlot, CategoryPlotConfig, Plot, XyPlot, XyPlotConfig};
pub use error::{PlotError, PlotResult};
