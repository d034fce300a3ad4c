//! Shared test fixtures for integration tests.

use std::sync::Arc;

use ess_sim::battery::{BatteryConfig, BatteryController};
use ess_sim::clock::SimulatedClock;
use ess_sim::sim::DayCycleSimulator;

/// Fresh controller and its simulated clock, pre-charged to `initial_soc`.
pub fn controller_at(initial_soc: f64) -> (BatteryController, Arc<SimulatedClock>) {
    let clock = Arc::new(SimulatedClock::new());
    let controller =
        BatteryController::with_initial_soc(BatteryConfig::default(), clock.clone(), initial_soc);
    (controller, clock)
}

/// A flat 24-hour production curve.
pub fn flat_day(wh_per_hour: f64) -> Vec<f64> {
    vec![wh_per_hour; 24]
}

/// Day-cycle simulator over a flat curve with the reference 6-18 day window.
pub fn flat_day_simulator(initial_soc: f64, wh_per_hour: f64) -> DayCycleSimulator {
    let (controller, clock) = controller_at(initial_soc);
    DayCycleSimulator::new(controller, clock, flat_day(wh_per_hour), 6, 18, 6, None)
        .expect("fixture simulator should build")
}
