//! Constant-current discharge for the nighttime streetlight load.

use crate::error::EssError;

use super::config::BatteryConfig;
use super::controller::BatteryController;
use super::electrical::{ocv, round1};
use super::state::{CycleMode, CycleRecord, SystemState};
use super::status::{DischargeStatus, PackOutput};

/// C-rate for a discharge start, boosted under excess production.
///
/// The boost runs in the opposite direction of the charge throttle: surplus
/// production means the streetlights can draw harder, so the rate scales up
/// with the excess rather than down.
fn boosted_discharge_rate(
    config: &BatteryConfig,
    base: f64,
    power_production_wh: Option<f64>,
) -> f64 {
    match power_production_wh {
        Some(p) if p > config.threshold_power_wh => {
            let excess = p - config.threshold_power_wh;
            base + config.excess_gain_per_wh * excess
        }
        _ => base,
    }
}

impl BatteryController {
    /// Begins constant-current discharge at the seasonal (possibly boosted)
    /// C-rate.
    ///
    /// Sets the discharge current, transitions to `DISCHARGING`, and opens a
    /// discharge-history record. No state precondition: the automatic policy
    /// gates when a discharge may start.
    pub fn start_discharge(&mut self, power_production_wh: Option<f64>) -> DischargeStatus {
        let base = self.state.discharge_rate_c;
        let c_rate = boosted_discharge_rate(&self.config, base, power_production_wh);
        let discharge_current = c_rate * self.config.capacity_ah();

        self.state.discharge_current_a = discharge_current;
        self.state.system_state = SystemState::Discharging;
        self.state.discharge_history.push(CycleRecord {
            started_at_secs: self.now_secs(),
            mode: CycleMode::Discharge,
            current_a: discharge_current,
            c_rate,
            power_production_wh,
            initial_soc: self.state.soc,
            initial_voltage_v: self.state.voltage_v,
            final_soc: None,
            final_voltage_v: None,
            completed_at_secs: None,
        });

        DischargeStatus::Discharging {
            soc_pct: round1(self.state.soc * 100.0),
            voltage_v: self.state.voltage_v,
            discharge_current_a: discharge_current,
            c_rate,
            pack: None,
        }
    }

    /// Integrates one discharge window.
    ///
    /// When the SOC or the voltage bottoms out, both are clamped to their
    /// floors and the pack enters REST. Otherwise the pack-level outputs for
    /// the downstream DC-DC stage are derived and reported.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` outside `DISCHARGING`, `Validation` for a
    /// negative duration, `NumericBounds` on an invariant violation. State
    /// is untouched on error.
    pub fn continue_discharge(&mut self, duration_secs: f64) -> Result<DischargeStatus, EssError> {
        Self::validate_duration(duration_secs)?;
        if self.state.system_state != SystemState::Discharging {
            return Err(EssError::InvalidStateTransition {
                expected: SystemState::Discharging,
                actual: self.state.system_state,
            });
        }

        let capacity_ah = self.config.capacity_ah();
        let discharge_amount_ah = self.state.discharge_current_a * duration_secs / 3600.0;
        let soc = (self.state.soc - discharge_amount_ah / capacity_ah).max(0.0);
        let voltage = ocv(&self.config, soc);

        if soc <= 0.0 || voltage <= self.config.cell_voltage_empty {
            self.commit_soc_voltage(0.0, self.config.cell_voltage_empty)?;
            let now = self.now_secs();
            self.state.system_state = SystemState::Rest;
            self.state.rest_started_at_secs = Some(now);
            if let Some(record) = self.state.discharge_history.last_mut() {
                record.finalize(0.0, self.config.cell_voltage_empty, now);
            }
            return Ok(DischargeStatus::RestEntered {
                soc_pct: 0.0,
                voltage_v: self.config.cell_voltage_empty,
                rest_duration_min: self.config.rest_duration_min,
            });
        }

        self.commit_soc_voltage(soc, voltage)?;

        let pack_voltage_v = voltage * f64::from(self.config.cells_in_series);
        let pack = PackOutput {
            pack_voltage_v,
            pack_current_a: self.state.discharge_current_a
                * f64::from(self.config.cells_in_parallel),
            converted_output_voltage_v: pack_voltage_v * self.config.voltage_conversion_factor,
        };

        Ok(DischargeStatus::Discharging {
            soc_pct: round1(soc * 100.0),
            voltage_v: voltage,
            discharge_current_a: self.state.discharge_current_a,
            c_rate: self.state.discharge_current_a / capacity_ah,
            pack: Some(pack),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::SimulatedClock;

    fn controller_at(soc: f64) -> BatteryController {
        let clock = Arc::new(SimulatedClock::new());
        BatteryController::with_initial_soc(BatteryConfig::default(), clock, soc)
    }

    #[test]
    fn base_rate_without_production_signal() {
        let cfg = BatteryConfig::default();
        assert_eq!(boosted_discharge_rate(&cfg, 0.0833, None), 0.0833);
        assert_eq!(boosted_discharge_rate(&cfg, 0.0833, Some(1000.0)), 0.0833);
    }

    #[test]
    fn excess_production_boosts_rate_upward() {
        // Opposite direction of the charge throttle; the asymmetry is
        // intentional.
        let cfg = BatteryConfig::default();
        let boosted = boosted_discharge_rate(&cfg, 0.0833, Some(30_000.0));
        assert!(boosted > 0.0833);
    }

    #[test]
    fn start_uses_seasonal_rate() {
        let mut controller = controller_at(0.5);
        controller.update_season(12);
        let status = controller.start_discharge(None);
        assert_eq!(controller.system_state(), SystemState::Discharging);
        assert!((controller.state().discharge_current_a - 0.0932 * 3.0).abs() < 1e-12);
        match status {
            DischargeStatus::Discharging { c_rate, pack, .. } => {
                assert_eq!(c_rate, 0.0932);
                assert!(pack.is_none());
            }
            other => panic!("expected discharging status, got {other:?}"),
        }
    }

    #[test]
    fn start_opens_history_record() {
        let mut controller = controller_at(0.5);
        controller.start_discharge(Some(1000.0));
        let history = controller.discharge_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].mode, CycleMode::Discharge);
        assert_eq!(history[0].initial_soc, 0.5);
        assert_eq!(history[0].power_production_wh, Some(1000.0));
    }

    #[test]
    fn continue_requires_discharging_state() {
        let mut controller = controller_at(0.5);
        let err = controller.continue_discharge(60.0).unwrap_err();
        assert_eq!(
            err,
            EssError::InvalidStateTransition {
                expected: SystemState::Discharging,
                actual: SystemState::Idle,
            }
        );
    }

    #[test]
    fn continue_integrates_and_reports_pack_outputs() {
        let mut controller = controller_at(0.5);
        controller.start_discharge(None);
        // 0.2499 A for one hour out of 3 Ah: SOC drops by 0.0833.
        let status = controller
            .continue_discharge(3600.0)
            .expect("discharge should succeed");

        assert!((controller.soc() - (0.5 - 0.0833)).abs() < 1e-9);
        let voltage = controller.voltage_v();
        assert_eq!(voltage, ocv(controller.config(), controller.soc()));

        match status {
            DischargeStatus::Discharging { pack: Some(p), .. } => {
                assert!((p.pack_voltage_v - voltage * 7.0).abs() < 1e-9);
                assert!((p.pack_current_a - controller.state().discharge_current_a * 4.0).abs()
                    < 1e-9);
                assert!(
                    (p.converted_output_voltage_v - voltage * 7.0 * 2.749).abs() < 1e-9
                );
            }
            other => panic!("expected pack outputs, got {other:?}"),
        }
    }

    #[test]
    fn bottoming_out_clamps_and_enters_rest() {
        let mut controller = controller_at(0.05);
        controller.start_discharge(None);
        let status = controller
            .continue_discharge(3600.0)
            .expect("discharge should succeed");

        assert_eq!(controller.soc(), 0.0);
        assert_eq!(controller.voltage_v(), 3.0);
        assert_eq!(controller.system_state(), SystemState::Rest);
        assert!(controller.state().rest_started_at_secs.is_some());
        assert!(matches!(status, DischargeStatus::RestEntered { .. }));

        let history = controller.discharge_history();
        assert_eq!(history[0].final_soc, Some(0.0));
        assert_eq!(history[0].final_voltage_v, Some(3.0));
    }

    #[test]
    fn soc_never_goes_negative() {
        let mut controller = controller_at(0.3);
        controller.start_discharge(None);
        for _ in 0..10 {
            if controller.system_state() != SystemState::Discharging {
                break;
            }
            controller
                .continue_discharge(3600.0)
                .expect("discharge should succeed");
            assert!(controller.soc() >= 0.0);
        }
        assert_eq!(controller.system_state(), SystemState::Rest);
    }

    #[test]
    fn negative_duration_leaves_state_untouched() {
        let mut controller = controller_at(0.5);
        controller.start_discharge(None);
        let before = controller.soc();
        let err = controller.continue_discharge(-60.0).unwrap_err();
        assert!(matches!(err, EssError::Validation { .. }));
        assert_eq!(controller.soc(), before);
    }
}
