//! Drives a battery controller across a synthetic or real 24-hour power
//! curve at fixed sub-hourly tick granularity.

use std::sync::Arc;

use crate::battery::BatteryController;
use crate::battery::electrical::round1;
use crate::clock::SimulatedClock;
use crate::error::EssError;

use super::types::{DayCycleReport, DaySummary, HourlySummary, TickRecord};

/// Hours in one simulated day.
pub const HOURS_PER_DAY: usize = 24;

/// Reference tick density: six ten-minute ticks per hour.
pub const DEFAULT_TICKS_PER_HOUR: u32 = 6;

/// Simulates one day of automatic control.
///
/// Each hour's production is divided evenly across its ticks; every tick
/// feeds `automatic_control` with the tick production and the day/night flag
/// derived from the `[start_hour, end_hour)` window, then advances the
/// simulated clock by the tick length so rest windows elapse in simulated
/// time rather than wall-clock time.
#[derive(Debug)]
pub struct DayCycleSimulator {
    controller: BatteryController,
    clock: Arc<SimulatedClock>,
    hourly_power_wh: Vec<f64>,
    start_hour: u32,
    end_hour: u32,
    ticks_per_hour: u32,
    month: Option<u32>,
}

impl DayCycleSimulator {
    /// Creates a simulator over the given hourly production curve.
    ///
    /// The controller must have been constructed with the same
    /// `SimulatedClock` handle, otherwise rest windows will not see the
    /// simulated time advance.
    ///
    /// # Errors
    ///
    /// `Validation` if the curve does not hold exactly 24 values, the day
    /// window is empty, or `ticks_per_hour` is zero.
    pub fn new(
        controller: BatteryController,
        clock: Arc<SimulatedClock>,
        hourly_power_wh: Vec<f64>,
        start_hour: u32,
        end_hour: u32,
        ticks_per_hour: u32,
        month: Option<u32>,
    ) -> Result<Self, EssError> {
        if hourly_power_wh.len() != HOURS_PER_DAY {
            return Err(EssError::validation(
                "hourly_power_wh",
                format!(
                    "must contain exactly {HOURS_PER_DAY} hourly values, got {}",
                    hourly_power_wh.len()
                ),
            ));
        }
        if start_hour >= end_hour {
            return Err(EssError::validation(
                "start_hour",
                format!("must be < end_hour ({start_hour} >= {end_hour})"),
            ));
        }
        if ticks_per_hour == 0 {
            return Err(EssError::validation("ticks_per_hour", "must be > 0"));
        }

        Ok(Self {
            controller,
            clock,
            hourly_power_wh,
            start_hour,
            end_hour,
            ticks_per_hour,
            month,
        })
    }

    /// Executes all ticks and returns the tick trace plus aggregates.
    ///
    /// # Errors
    ///
    /// Propagates controller errors; given the policy's own state checks
    /// only a `NumericBounds` defect can surface here, and it aborts the
    /// run without committing the offending tick.
    pub fn run(&mut self) -> Result<DayCycleReport, EssError> {
        let ticks = self.ticks_per_hour;
        let tick_secs = u64::from(3600 / ticks);
        let minutes_per_tick = 60 / ticks;

        let mut detailed = Vec::with_capacity(HOURS_PER_DAY * ticks as usize);

        for hour in 0..HOURS_PER_DAY as u32 {
            let is_nighttime = hour < self.start_hour || hour >= self.end_hour;
            let tick_power_wh = self.hourly_power_wh[hour as usize] / f64::from(ticks);

            for tick in 0..ticks {
                self.controller
                    .automatic_control(tick_power_wh, is_nighttime, self.month)?;
                detailed.push(TickRecord {
                    hour,
                    minute: tick * minutes_per_tick,
                    is_nighttime,
                    power_production_wh: tick_power_wh,
                    state: self.controller.system_state(),
                    soc_pct: round1(self.controller.soc() * 100.0),
                    voltage_v: self.controller.voltage_v(),
                });
                self.clock.advance(tick_secs);
            }
        }

        let hourly_results = (0..HOURS_PER_DAY)
            .map(|hour| {
                let chunk = &detailed[hour * ticks as usize..(hour + 1) * ticks as usize];
                let start = &chunk[0];
                let end = &chunk[chunk.len() - 1];
                HourlySummary {
                    hour: hour as u32,
                    is_nighttime: start.is_nighttime,
                    power_production_wh: chunk.iter().map(|r| r.power_production_wh).sum(),
                    start_soc_pct: start.soc_pct,
                    end_soc_pct: end.soc_pct,
                    soc_change_pct: end.soc_pct - start.soc_pct,
                }
            })
            .collect();

        let summary = DaySummary {
            initial_soc_pct: detailed.first().map_or(0.0, |r| r.soc_pct),
            final_soc_pct: detailed.last().map_or(0.0, |r| r.soc_pct),
            total_charge_cycles: self.controller.charge_history().len(),
            total_discharge_cycles: self.controller.discharge_history().len(),
            hourly_results,
        };

        Ok(DayCycleReport {
            summary,
            detailed_results: detailed,
        })
    }

    /// The driven controller, for post-run queries.
    pub fn controller(&self) -> &BatteryController {
        &self.controller
    }
}
