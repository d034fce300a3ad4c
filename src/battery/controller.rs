//! Battery controller: owns the pack state and the automatic control policy.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::EssError;

use super::config::{BatteryConfig, Season};
use super::electrical::{ocv, round1};
use super::state::{BatteryState, CycleRecord, SystemState};
use super::status::{BatterySnapshot, ControlStatus, HoldReason, HoldStatus, RestStatus};

/// Control integration length used by the automatic policy (s).
pub const CONTROL_TICK_SECS: f64 = 60.0;

/// Drives one battery pack through its charge/discharge/rest lifecycle.
///
/// The controller is the only mutator of its [`BatteryState`]: every
/// operation either fully applies its update or fails without touching
/// state. One instance serves one location; concurrent callers must
/// serialize access externally (one exclusive lock per instance).
#[derive(Debug)]
pub struct BatteryController {
    pub(super) config: BatteryConfig,
    pub(super) state: BatteryState,
    clock: Arc<dyn Clock>,
}

impl BatteryController {
    /// Creates a controller for an empty, idle pack.
    ///
    /// The seasonal discharge rate starts at the spring value until
    /// [`update_season`](Self::update_season) is called.
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is not positive or the voltage
    /// window is empty.
    pub fn new(config: BatteryConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_initial_soc(config, clock, 0.0)
    }

    /// Creates a controller with the pack pre-charged to `initial_soc`.
    ///
    /// # Panics
    ///
    /// Panics if `initial_soc` is outside `[0, 1]`, the capacity is not
    /// positive, or the voltage window is empty.
    pub fn with_initial_soc(config: BatteryConfig, clock: Arc<dyn Clock>, initial_soc: f64) -> Self {
        assert!(config.cell_capacity_mah > 0.0);
        assert!(config.cell_voltage_empty < config.cell_voltage_full);
        assert!(config.cells_in_series >= 1 && config.cells_in_parallel >= 1);
        assert!((0.0..=1.0).contains(&initial_soc));

        let voltage = ocv(&config, initial_soc);
        let rate = config.seasonal_discharge_rates.rate(Season::Spring);
        let mut state = BatteryState::new(voltage, rate);
        state.soc = initial_soc;

        Self {
            config,
            state,
            clock,
        }
    }

    /// Pack configuration.
    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    /// Read-only view of the pack state.
    pub fn state(&self) -> &BatteryState {
        &self.state
    }

    /// Current lifecycle state.
    pub fn system_state(&self) -> SystemState {
        self.state.system_state
    }

    /// Current state of charge, in `[0, 1]`.
    pub fn soc(&self) -> f64 {
        self.state.soc
    }

    /// Current cell voltage (V).
    pub fn voltage_v(&self) -> f64 {
        self.state.voltage_v
    }

    /// Copy of the charge cycle log.
    pub fn charge_history(&self) -> Vec<CycleRecord> {
        self.state.charge_history.clone()
    }

    /// Copy of the discharge cycle log.
    pub fn discharge_history(&self) -> Vec<CycleRecord> {
        self.state.discharge_history.clone()
    }

    /// Selects the discharge C-rate for the given calendar month.
    pub fn update_season(&mut self, month: u32) {
        let season = Season::from_month(month);
        self.state.discharge_rate_c = self.config.seasonal_discharge_rates.rate(season);
    }

    /// Point-in-time monitoring view of the pack.
    pub fn snapshot(&self) -> BatterySnapshot {
        BatterySnapshot {
            state: self.state.system_state,
            soc_pct: round1(self.state.soc * 100.0),
            voltage_v: self.state.voltage_v,
            charge_current_a: self.state.charge_current_a,
            discharge_current_a: self.state.discharge_current_a,
            discharge_rate_c: self.state.discharge_rate_c,
            temperature_k: self.config.temperature_k,
            cell_configuration: self.config.cell_configuration(),
            total_cells: self.config.total_cells(),
            pack_capacity_ah: self.config.pack_capacity_ah(),
            pack_voltage_v: self.state.voltage_v * f64::from(self.config.cells_in_series),
            rest: self.rest_info(),
        }
    }

    /// Evaluates one control tick against the external signals.
    ///
    /// Strict priority order: rest-exit is checked first (falling through to
    /// the regular dispatch in the same tick when the window has elapsed),
    /// nighttime discharge takes precedence over any charge logic, and
    /// daytime dispatches on the current state. Non-actionable combinations
    /// return a [`HoldStatus`] without mutating state.
    ///
    /// # Errors
    ///
    /// Propagates [`EssError::NumericBounds`] if an update would violate the
    /// SOC/voltage invariants; the tick is aborted uncommitted.
    pub fn automatic_control(
        &mut self,
        power_production_wh: f64,
        is_nighttime: bool,
        month: Option<u32>,
    ) -> Result<ControlStatus, EssError> {
        if let Some(m) = month {
            self.update_season(m);
        }

        if self.state.system_state == SystemState::Rest {
            match self.check_rest()? {
                status @ RestStatus::Resting { .. } => return Ok(ControlStatus::Rest(status)),
                // Window elapsed: continue into the regular dispatch below.
                RestStatus::Completed { .. } => {}
            }
        }

        if is_nighttime {
            let status = if self.state.system_state != SystemState::Discharging
                && self.state.soc > 0.0
            {
                ControlStatus::Discharge(self.start_discharge(Some(power_production_wh)))
            } else if self.state.system_state == SystemState::Discharging {
                ControlStatus::Discharge(self.continue_discharge(CONTROL_TICK_SECS)?)
            } else {
                ControlStatus::Hold(self.hold(HoldReason::BatteryEmpty))
            };
            return Ok(status);
        }

        if self.state.soc >= 1.0 {
            return Ok(ControlStatus::Hold(self.hold(HoldReason::FullyCharged)));
        }

        let status = match self.state.system_state {
            SystemState::Idle => self.start_cc_charge(power_production_wh),
            SystemState::ChargingCc => self.continue_cc_charge(CONTROL_TICK_SECS)?,
            SystemState::ChargingCv => self.continue_cv_charge(CONTROL_TICK_SECS)?,
            SystemState::Discharging | SystemState::Rest => {
                return Ok(ControlStatus::Hold(self.hold(HoldReason::StateHold)));
            }
        };
        Ok(ControlStatus::Charge(status))
    }

    /// Current clock reading (s).
    pub(crate) fn now_secs(&self) -> u64 {
        self.clock.now_secs()
    }

    /// Validates and applies a co-derived SOC/voltage pair.
    ///
    /// Both values are checked against their declared ranges before either
    /// is written, keeping the operation atomic with respect to state.
    pub(crate) fn commit_soc_voltage(&mut self, soc: f64, voltage_v: f64) -> Result<(), EssError> {
        if !(0.0..=1.0).contains(&soc) {
            return Err(EssError::NumericBounds {
                quantity: "soc",
                value: soc,
                min: 0.0,
                max: 1.0,
            });
        }
        let lo = self.config.cell_voltage_empty;
        let hi = self.config.cell_voltage_full;
        if !(lo..=hi).contains(&voltage_v) {
            return Err(EssError::NumericBounds {
                quantity: "voltage",
                value: voltage_v,
                min: lo,
                max: hi,
            });
        }
        self.state.soc = soc;
        self.state.voltage_v = voltage_v;
        Ok(())
    }

    /// Rejects negative or non-finite integration windows.
    pub(crate) fn validate_duration(duration_secs: f64) -> Result<(), EssError> {
        if !duration_secs.is_finite() || duration_secs < 0.0 {
            return Err(EssError::validation(
                "duration_secs",
                "must be a non-negative, finite number of seconds",
            ));
        }
        Ok(())
    }

    fn hold(&self, reason: HoldReason) -> HoldStatus {
        HoldStatus {
            state: self.state.system_state,
            reason,
            soc_pct: round1(self.state.soc * 100.0),
            voltage_v: self.state.voltage_v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::status::ChargeStatus;
    use crate::clock::SimulatedClock;

    fn controller_at(soc: f64) -> (BatteryController, Arc<SimulatedClock>) {
        let clock = Arc::new(SimulatedClock::new());
        let controller =
            BatteryController::with_initial_soc(BatteryConfig::default(), clock.clone(), soc);
        (controller, clock)
    }

    #[test]
    fn new_controller_is_empty_and_idle() {
        let (controller, _clock) = controller_at(0.0);
        assert_eq!(controller.soc(), 0.0);
        assert_eq!(controller.voltage_v(), 3.0);
        assert_eq!(controller.system_state(), SystemState::Idle);
    }

    #[test]
    #[should_panic]
    fn invalid_initial_soc_panics() {
        let clock = Arc::new(SimulatedClock::new());
        BatteryController::with_initial_soc(BatteryConfig::default(), clock, 1.5);
    }

    #[test]
    #[should_panic]
    fn empty_voltage_window_panics() {
        let clock = Arc::new(SimulatedClock::new());
        let config = BatteryConfig {
            cell_voltage_full: 3.0,
            cell_voltage_empty: 4.2,
            ..BatteryConfig::default()
        };
        BatteryController::new(config, clock);
    }

    #[test]
    fn update_season_selects_winter_rate() {
        let (mut controller, _clock) = controller_at(0.5);
        controller.update_season(1);
        assert_eq!(controller.state().discharge_rate_c, 0.0932);
        controller.update_season(7);
        assert_eq!(controller.state().discharge_rate_c, 0.0734);
    }

    #[test]
    fn nighttime_with_empty_pack_holds_without_mutation() {
        let (mut controller, _clock) = controller_at(0.0);
        let status = controller
            .automatic_control(0.0, true, None)
            .expect("control tick should succeed");
        match status {
            ControlStatus::Hold(h) => {
                assert_eq!(h.reason, HoldReason::BatteryEmpty);
                assert_eq!(h.soc_pct, 0.0);
            }
            other => panic!("expected hold, got {other:?}"),
        }
        assert_eq!(controller.soc(), 0.0);
        assert_eq!(controller.system_state(), SystemState::Idle);
    }

    #[test]
    fn daytime_with_full_pack_holds_without_mutation() {
        let (mut controller, _clock) = controller_at(1.0);
        let status = controller
            .automatic_control(1000.0, false, None)
            .expect("control tick should succeed");
        match status {
            ControlStatus::Hold(h) => assert_eq!(h.reason, HoldReason::FullyCharged),
            other => panic!("expected hold, got {other:?}"),
        }
        assert_eq!(controller.soc(), 1.0);
        assert_eq!(controller.system_state(), SystemState::Idle);
    }

    #[test]
    fn daytime_excess_production_starts_throttled_cc() {
        let (mut controller, _clock) = controller_at(0.3);
        let status = controller
            .automatic_control(30_000.0, false, None)
            .expect("control tick should succeed");
        assert_eq!(controller.system_state(), SystemState::ChargingCc);
        match status {
            ControlStatus::Charge(ChargeStatus::ConstantCurrent { c_rate, .. }) => {
                assert!(c_rate < 0.1, "30 kWh exceeds the threshold, rate {c_rate}");
            }
            other => panic!("expected CC start, got {other:?}"),
        }
    }

    #[test]
    fn nighttime_takes_precedence_over_charging() {
        let (mut controller, _clock) = controller_at(0.5);
        controller.start_cc_charge(1000.0);
        assert_eq!(controller.system_state(), SystemState::ChargingCc);

        // Night falls mid-charge: the policy switches to discharge.
        let status = controller
            .automatic_control(1000.0, true, None)
            .expect("control tick should succeed");
        assert_eq!(status.state(), SystemState::Discharging);
    }

    #[test]
    fn rest_exit_falls_through_to_dispatch_same_tick() {
        let (mut controller, clock) = controller_at(0.4);
        controller.start_discharge(None);
        // Drain to the floor so the pack enters REST.
        while controller.system_state() == SystemState::Discharging {
            controller
                .continue_discharge(3600.0)
                .expect("discharge should succeed");
        }
        assert_eq!(controller.system_state(), SystemState::Rest);

        // Mid-window tick stays resting.
        clock.advance(30 * 60);
        let status = controller
            .automatic_control(1000.0, false, None)
            .expect("control tick should succeed");
        assert_eq!(status.state(), SystemState::Rest);

        // Past the window the same tick proceeds straight into charging.
        clock.advance(100 * 60);
        let status = controller
            .automatic_control(1000.0, false, None)
            .expect("control tick should succeed");
        assert_eq!(status.state(), SystemState::ChargingCc);
    }

    #[test]
    fn daytime_while_discharging_holds() {
        let (mut controller, _clock) = controller_at(0.5);
        controller.start_discharge(None);
        let status = controller
            .automatic_control(1000.0, false, None)
            .expect("control tick should succeed");
        match status {
            ControlStatus::Hold(h) => assert_eq!(h.reason, HoldReason::StateHold),
            other => panic!("expected hold, got {other:?}"),
        }
        assert_eq!(controller.system_state(), SystemState::Discharging);
    }

    #[test]
    fn month_argument_updates_season_before_dispatch() {
        let (mut controller, _clock) = controller_at(0.5);
        controller
            .automatic_control(0.0, true, Some(12))
            .expect("control tick should succeed");
        assert_eq!(controller.state().discharge_rate_c, 0.0932);
    }

    #[test]
    fn commit_rejects_out_of_range_soc() {
        let (mut controller, _clock) = controller_at(0.5);
        let err = controller.commit_soc_voltage(1.2, 4.0).unwrap_err();
        assert!(matches!(err, EssError::NumericBounds { quantity: "soc", .. }));
        // Nothing was committed.
        assert_eq!(controller.soc(), 0.5);
    }

    #[test]
    fn commit_rejects_out_of_range_voltage() {
        let (mut controller, _clock) = controller_at(0.5);
        let err = controller.commit_soc_voltage(0.5, 4.5).unwrap_err();
        assert!(matches!(
            err,
            EssError::NumericBounds {
                quantity: "voltage",
                ..
            }
        ));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = BatteryController::validate_duration(-1.0).unwrap_err();
        assert!(matches!(err, EssError::Validation { .. }));
    }

    #[test]
    fn snapshot_reports_pack_level_values() {
        let (controller, _clock) = controller_at(0.5);
        let snap = controller.snapshot();
        assert_eq!(snap.state, SystemState::Idle);
        assert_eq!(snap.soc_pct, 50.0);
        assert_eq!(snap.cell_configuration, "7S4P");
        assert_eq!(snap.total_cells, 28);
        assert_eq!(snap.pack_capacity_ah, 12.0);
        assert!((snap.pack_voltage_v - 3.7 * 7.0).abs() < 1e-9);
        assert!(snap.rest.is_none());
    }

    #[test]
    fn history_accessors_return_copies() {
        let (mut controller, _clock) = controller_at(0.5);
        controller.start_cc_charge(1000.0);
        let mut copy = controller.charge_history();
        copy.clear();
        assert_eq!(controller.charge_history().len(), 1);
    }
}
