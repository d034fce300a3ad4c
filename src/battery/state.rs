//! Mutable pack state and cycle history records.

use std::fmt;

use serde::Serialize;

/// Lifecycle state of the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemState {
    /// Neither charging nor discharging; ready for a new cycle.
    Idle,
    /// Constant-current charging.
    ChargingCc,
    /// Constant-voltage charging with decaying current.
    ChargingCv,
    /// Constant-current discharge.
    Discharging,
    /// Mandatory post-cycle rest window.
    Rest,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::ChargingCc => "CHARGING_CC",
            Self::ChargingCv => "CHARGING_CV",
            Self::Discharging => "DISCHARGING",
            Self::Rest => "REST",
        };
        f.write_str(name)
    }
}

/// Which half of the lifecycle a history record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleMode {
    /// Constant-current charge cycle (may finish in CV).
    ChargeCc,
    /// Constant-current discharge cycle.
    Discharge,
}

/// One completed or in-flight charge/discharge cycle.
///
/// Records are append-only and never read back by the control logic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    /// Clock reading when the cycle started (s).
    pub started_at_secs: u64,
    /// Charge or discharge.
    pub mode: CycleMode,
    /// Cell current at cycle start (A).
    pub current_a: f64,
    /// C-rate selected for the cycle.
    pub c_rate: f64,
    /// Power production supplied when the cycle started (Wh), if any.
    pub power_production_wh: Option<f64>,
    /// SOC when the cycle started.
    pub initial_soc: f64,
    /// Cell voltage when the cycle started (V).
    pub initial_voltage_v: f64,
    /// SOC when the cycle completed, once finalized.
    pub final_soc: Option<f64>,
    /// Cell voltage when the cycle completed (V), once finalized.
    pub final_voltage_v: Option<f64>,
    /// Clock reading when the cycle completed (s), once finalized.
    pub completed_at_secs: Option<u64>,
}

impl CycleRecord {
    /// Fills in the completion fields when the cycle hands off to REST.
    pub(crate) fn finalize(&mut self, soc: f64, voltage_v: f64, now_secs: u64) {
        self.final_soc = Some(soc);
        self.final_voltage_v = Some(voltage_v);
        self.completed_at_secs = Some(now_secs);
    }
}

/// Mutable state of one physical or simulated pack.
///
/// `soc` and `voltage_v` are co-derived through the OCV curve: whenever `soc`
/// changes, the voltage is recomputed from it, except in the CV branch where
/// the voltage is held at `V_full` by definition. `rest_started_at_secs` is
/// `Some` iff `system_state == Rest`.
#[derive(Debug, Clone)]
pub struct BatteryState {
    /// Fraction of capacity charged, in `[0, 1]`.
    pub soc: f64,
    /// Present cell voltage (V), in `[V_empty, V_full]`.
    pub voltage_v: f64,
    /// Present charge current magnitude (A).
    pub charge_current_a: f64,
    /// Present discharge current magnitude (A).
    pub discharge_current_a: f64,
    /// Lifecycle state.
    pub system_state: SystemState,
    /// Clock reading when REST was entered.
    pub rest_started_at_secs: Option<u64>,
    /// Currently selected seasonal discharge C-rate.
    pub discharge_rate_c: f64,
    /// Append-only charge cycle log.
    pub charge_history: Vec<CycleRecord>,
    /// Append-only discharge cycle log.
    pub discharge_history: Vec<CycleRecord>,
}

impl BatteryState {
    /// Fresh pack state: empty, idle, no history.
    pub fn new(initial_voltage_v: f64, discharge_rate_c: f64) -> Self {
        Self {
            soc: 0.0,
            voltage_v: initial_voltage_v,
            charge_current_a: 0.0,
            discharge_current_a: 0.0,
            system_state: SystemState::Idle,
            rest_started_at_secs: None,
            discharge_rate_c,
            charge_history: Vec::new(),
            discharge_history: Vec::new(),
        }
    }
}
