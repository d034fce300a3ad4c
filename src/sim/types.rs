//! Simulation trace records and aggregate summaries.

use std::fmt;

use serde::Serialize;

use crate::battery::state::SystemState;

/// One simulation tick of the day cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    /// Hour of day (0–23).
    pub hour: u32,
    /// Minute within the hour at which the tick starts.
    pub minute: u32,
    /// Whether the tick falls in the night window.
    pub is_nighttime: bool,
    /// Production allotted to this tick (Wh).
    pub power_production_wh: f64,
    /// Pack state after the tick.
    pub state: SystemState,
    /// SOC after the tick, percent with one decimal.
    pub soc_pct: f64,
    /// Cell voltage after the tick (V).
    pub voltage_v: f64,
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} {} | prod={:>8.1} Wh | {:<11} SoC={:>5.1}% V={:.2}",
            self.hour,
            self.minute,
            if self.is_nighttime { "night" } else { "day  " },
            self.power_production_wh,
            self.state,
            self.soc_pct,
            self.voltage_v,
        )
    }
}

/// Aggregate of one simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySummary {
    /// Hour of day (0–23).
    pub hour: u32,
    pub is_nighttime: bool,
    /// Total production across the hour's ticks (Wh).
    pub power_production_wh: f64,
    /// SOC after the hour's first tick (percent).
    pub start_soc_pct: f64,
    /// SOC after the hour's last tick (percent).
    pub end_soc_pct: f64,
    /// `end_soc_pct - start_soc_pct`.
    pub soc_change_pct: f64,
}

impl fmt::Display for HourlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>2} {} | prod={:>8.1} Wh | SoC {:>5.1}% -> {:>5.1}% ({:+.1}%)",
            self.hour,
            if self.is_nighttime { "night" } else { "day  " },
            self.power_production_wh,
            self.start_soc_pct,
            self.end_soc_pct,
            self.soc_change_pct,
        )
    }
}

/// Whole-day aggregate of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    /// SOC after the first tick (percent).
    pub initial_soc_pct: f64,
    /// SOC after the last tick (percent).
    pub final_soc_pct: f64,
    /// Completed or in-flight charge cycles (history length).
    pub total_charge_cycles: usize,
    /// Completed or in-flight discharge cycles (history length).
    pub total_discharge_cycles: usize,
    /// Per-hour aggregates, 24 entries.
    pub hourly_results: Vec<HourlySummary>,
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Day Cycle Summary ---")?;
        writeln!(f, "Initial SoC:        {:.1}%", self.initial_soc_pct)?;
        writeln!(f, "Final SoC:          {:.1}%", self.final_soc_pct)?;
        writeln!(f, "Charge cycles:      {}", self.total_charge_cycles)?;
        write!(f, "Discharge cycles:   {}", self.total_discharge_cycles)
    }
}

/// Full result of a day-cycle simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCycleReport {
    /// Whole-day and per-hour aggregates.
    pub summary: DaySummary,
    /// Tick-level trace.
    pub detailed_results: Vec<TickRecord>,
}
