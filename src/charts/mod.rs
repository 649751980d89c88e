//! Charts module - Static chart rendering

mod renderer;

pub use renderer::{
    ChartError, StaticChartRenderer, CORRELATION_HEATMAP_FILE, DISTRIBUTION_FILE,
    MISSING_VALUES_FILE,
};
