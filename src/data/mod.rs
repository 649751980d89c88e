//! Data module - CSV loading and generic analysis

mod analyzer;
mod loader;

pub use analyzer::{
    Analysis, AnalyzerError, CorrelationMatrix, DataAnalyzer, MissingCount, NumericColumn,
    NumericTable,
};
pub use loader::{DataLoader, LoaderError};
