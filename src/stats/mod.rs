//! Stats module - descriptive statistics and density estimation

mod calculator;

pub use calculator::{DescriptiveStats, StatsCalculator};
