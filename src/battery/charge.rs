//! Constant-current / constant-voltage charging.
//!
//! Charging runs in two phases: CC holds the current fixed while the voltage
//! climbs to the ceiling, then CV holds the voltage at `V_full` while the
//! current decays exponentially toward the cutoff, after which the pack
//! enters its mandatory rest window.

use crate::error::EssError;

use super::config::BatteryConfig;
use super::controller::BatteryController;
use super::electrical::{ocv, round1};
use super::state::{CycleMode, CycleRecord, SystemState};
use super::status::ChargeStatus;

/// C-rate for a CC charge start, throttled under excess production.
///
/// Above the threshold the rate is pulled down so high production does not
/// overcharge the pack: `adjusted = base · 0.1 / (k·excess + 0.1)`.
fn throttled_charge_rate(config: &BatteryConfig, power_production_wh: f64) -> f64 {
    let base = config.base_charge_c_rate;
    if power_production_wh > config.threshold_power_wh {
        let excess = power_production_wh - config.threshold_power_wh;
        base * 0.1 / (config.excess_gain_per_wh * excess + 0.1)
    } else {
        base
    }
}

impl BatteryController {
    /// Begins constant-current charging at the (possibly throttled) C-rate.
    ///
    /// Sets the charge current, transitions to `CHARGING_CC`, and opens a
    /// charge-history record. No state precondition: the automatic policy is
    /// the component that gates when a charge may start.
    pub fn start_cc_charge(&mut self, power_production_wh: f64) -> ChargeStatus {
        let c_rate = throttled_charge_rate(&self.config, power_production_wh);
        let charge_current = c_rate * self.config.capacity_ah();

        self.state.charge_current_a = charge_current;
        self.state.system_state = SystemState::ChargingCc;
        self.state.charge_history.push(CycleRecord {
            started_at_secs: self.now_secs(),
            mode: CycleMode::ChargeCc,
            current_a: charge_current,
            c_rate,
            power_production_wh: Some(power_production_wh),
            initial_soc: self.state.soc,
            initial_voltage_v: self.state.voltage_v,
            final_soc: None,
            final_voltage_v: None,
            completed_at_secs: None,
        });

        ChargeStatus::ConstantCurrent {
            soc_pct: round1(self.state.soc * 100.0),
            voltage_v: self.state.voltage_v,
            charge_current_a: charge_current,
            c_rate,
        }
    }

    /// Integrates one CC window and hands off to CV at the voltage ceiling.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` outside `CHARGING_CC`, `Validation` for a
    /// negative duration, `NumericBounds` if the update would violate the
    /// SOC/voltage invariants. State is untouched on error.
    pub fn continue_cc_charge(&mut self, duration_secs: f64) -> Result<ChargeStatus, EssError> {
        Self::validate_duration(duration_secs)?;
        if self.state.system_state != SystemState::ChargingCc {
            return Err(EssError::InvalidStateTransition {
                expected: SystemState::ChargingCc,
                actual: self.state.system_state,
            });
        }

        let capacity_ah = self.config.capacity_ah();
        let charge_amount_ah = self.state.charge_current_a * duration_secs / 3600.0;
        let soc = (self.state.soc + charge_amount_ah / capacity_ah).min(1.0);
        let voltage = ocv(&self.config, soc);

        if voltage >= self.config.cell_voltage_full {
            // Ceiling reached: clamp and switch to constant-voltage.
            self.commit_soc_voltage(soc, self.config.cell_voltage_full)?;
            self.state.system_state = SystemState::ChargingCv;
            return Ok(ChargeStatus::ConstantVoltage {
                soc_pct: round1(soc * 100.0),
                voltage_v: self.state.voltage_v,
                charge_current_a: self.state.charge_current_a,
            });
        }

        self.commit_soc_voltage(soc, voltage)?;
        Ok(ChargeStatus::ConstantCurrent {
            soc_pct: round1(soc * 100.0),
            voltage_v: voltage,
            charge_current_a: self.state.charge_current_a,
            c_rate: self.state.charge_current_a / capacity_ah,
        })
    }

    /// Integrates one CV window with exponentially decaying current.
    ///
    /// The SOC advances by the trapezoidal average of the old and new
    /// current; the voltage stays pinned at `V_full`. Once the current falls
    /// to the cutoff the pack enters REST and the open history record is
    /// finalized.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` outside `CHARGING_CV`, `Validation` for a
    /// negative duration, `NumericBounds` on an invariant violation. State
    /// is untouched on error.
    pub fn continue_cv_charge(&mut self, duration_secs: f64) -> Result<ChargeStatus, EssError> {
        Self::validate_duration(duration_secs)?;
        if self.state.system_state != SystemState::ChargingCv {
            return Err(EssError::InvalidStateTransition {
                expected: SystemState::ChargingCv,
                actual: self.state.system_state,
            });
        }

        let capacity_ah = self.config.capacity_ah();
        let old_current = self.state.charge_current_a;
        let new_current = old_current * (-duration_secs / self.config.cv_time_constant_s).exp();

        let charge_amount_ah = (old_current + new_current) / 2.0 * duration_secs / 3600.0;
        let soc = (self.state.soc + charge_amount_ah / capacity_ah).min(1.0);
        let voltage = self.config.cell_voltage_full;

        self.commit_soc_voltage(soc, voltage)?;
        self.state.charge_current_a = new_current;

        if new_current <= self.config.cv_cutoff_current_a() {
            let now = self.now_secs();
            self.state.system_state = SystemState::Rest;
            self.state.rest_started_at_secs = Some(now);
            if let Some(record) = self.state.charge_history.last_mut() {
                record.finalize(soc, voltage, now);
            }
            return Ok(ChargeStatus::RestEntered {
                soc_pct: round1(soc * 100.0),
                voltage_v: voltage,
                rest_duration_min: self.config.rest_duration_min,
            });
        }

        Ok(ChargeStatus::ConstantVoltage {
            soc_pct: round1(soc * 100.0),
            voltage_v: voltage,
            charge_current_a: new_current,
        })
    }
}
