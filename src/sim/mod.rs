//! Day-cycle simulation over a 24-hour production curve.

pub mod day_cycle;
pub mod types;

pub use day_cycle::DayCycleSimulator;
pub use types::{DayCycleReport, DaySummary, HourlySummary, TickRecord};
