mod chart;
mod controller;
mod filter;

pub use chart::{BoxPlot, BoxSeries, BoxStats, UNKNOWN_RESPONSE};
pub use controller::{
    Chart, DashboardState, Event, LoadOutcome, NoDataReason, PREVIEW_LIMIT, ReadyView,
    RenderModel, compute_view,
};
pub use filter::{DEFAULT_SAMPLE_TYPE, FilterOptions, Selection};
