//! Status records returned by controller operations.
//!
//! Each operation returns a tagged union discriminated by the state it left
//! the pack in, so callers pattern-match instead of probing optional fields.
//! Serialized field names follow the API contract: `state` (enum name),
//! `soc_pct` (0–100, one decimal), voltages in volts, currents in amperes.

use serde::Serialize;

use super::state::SystemState;

/// Outcome of a charge operation, discriminated by the state reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum ChargeStatus {
    /// Constant-current phase entered or still in progress.
    #[serde(rename = "CHARGING_CC")]
    ConstantCurrent {
        soc_pct: f64,
        voltage_v: f64,
        charge_current_a: f64,
        c_rate: f64,
    },
    /// Voltage ceiling reached; current now decays toward the cutoff.
    #[serde(rename = "CHARGING_CV")]
    ConstantVoltage {
        soc_pct: f64,
        voltage_v: f64,
        charge_current_a: f64,
    },
    /// Cutoff current reached; the pack entered its rest window.
    #[serde(rename = "REST")]
    RestEntered {
        soc_pct: f64,
        voltage_v: f64,
        rest_duration_min: f64,
    },
}

impl ChargeStatus {
    /// State the operation left the pack in.
    pub fn state(&self) -> SystemState {
        match self {
            Self::ConstantCurrent { .. } => SystemState::ChargingCc,
            Self::ConstantVoltage { .. } => SystemState::ChargingCv,
            Self::RestEntered { .. } => SystemState::Rest,
        }
    }
}

/// Pack-level outputs derived during discharge, for the downstream load.
/// Reporting values only; never fed back into cell state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PackOutput {
    /// Series pack voltage: `cell_voltage · S` (V).
    pub pack_voltage_v: f64,
    /// Parallel pack current: `cell_current · P` (A).
    pub pack_current_a: f64,
    /// Pack voltage after the DC-DC conversion stage (V).
    pub converted_output_voltage_v: f64,
}

/// Outcome of a discharge operation, discriminated by the state reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum DischargeStatus {
    /// Discharge started or still delivering.
    #[serde(rename = "DISCHARGING")]
    Discharging {
        soc_pct: f64,
        voltage_v: f64,
        discharge_current_a: f64,
        c_rate: f64,
        /// Present on `continue` calls once the pack is delivering.
        #[serde(skip_serializing_if = "Option::is_none")]
        pack: Option<PackOutput>,
    },
    /// Pack bottomed out (SOC or voltage floor) and entered its rest window.
    #[serde(rename = "REST")]
    RestEntered {
        soc_pct: f64,
        voltage_v: f64,
        rest_duration_min: f64,
    },
}

impl DischargeStatus {
    /// State the operation left the pack in.
    pub fn state(&self) -> SystemState {
        match self {
            Self::Discharging { .. } => SystemState::Discharging,
            Self::RestEntered { .. } => SystemState::Rest,
        }
    }
}

/// Outcome of a rest-window check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum RestStatus {
    /// Still inside the rest window.
    #[serde(rename = "REST")]
    Resting {
        soc_pct: f64,
        voltage_v: f64,
        elapsed_min: f64,
        remaining_min: f64,
        rest_duration_min: f64,
    },
    /// Rest window elapsed; the pack is idle again.
    #[serde(rename = "IDLE")]
    Completed {
        soc_pct: f64,
        voltage_v: f64,
        elapsed_min: f64,
    },
}

impl RestStatus {
    /// State the operation left the pack in.
    pub fn state(&self) -> SystemState {
        match self {
            Self::Resting { .. } => SystemState::Rest,
            Self::Completed { .. } => SystemState::Idle,
        }
    }
}

/// Why the automatic policy took no action this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldReason {
    /// Nighttime discharge requested but the pack is empty.
    BatteryEmpty,
    /// Daytime charge requested but the pack is already full.
    FullyCharged,
    /// Current state has no applicable action (e.g. discharging at daytime).
    StateHold,
}

/// Non-mutating status: the policy evaluated its inputs and left the pack
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldStatus {
    /// Unchanged pack state.
    pub state: SystemState,
    pub reason: HoldReason,
    pub soc_pct: f64,
    pub voltage_v: f64,
}

/// Result of one `automatic_control` tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlStatus {
    Charge(ChargeStatus),
    Discharge(DischargeStatus),
    Rest(RestStatus),
    Hold(HoldStatus),
}

impl ControlStatus {
    /// State the tick left the pack in.
    pub fn state(&self) -> SystemState {
        match self {
            Self::Charge(s) => s.state(),
            Self::Discharge(s) => s.state(),
            Self::Rest(s) => s.state(),
            Self::Hold(s) => s.state,
        }
    }

    /// SOC percentage reported by the tick.
    pub fn soc_pct(&self) -> f64 {
        match self {
            Self::Charge(
                ChargeStatus::ConstantCurrent { soc_pct, .. }
                | ChargeStatus::ConstantVoltage { soc_pct, .. }
                | ChargeStatus::RestEntered { soc_pct, .. },
            )
            | Self::Discharge(
                DischargeStatus::Discharging { soc_pct, .. }
                | DischargeStatus::RestEntered { soc_pct, .. },
            )
            | Self::Rest(
                RestStatus::Resting { soc_pct, .. } | RestStatus::Completed { soc_pct, .. },
            ) => *soc_pct,
            Self::Hold(s) => s.soc_pct,
        }
    }
}

/// Rest-window details included in a snapshot while resting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestInfo {
    /// Clock reading when REST was entered (s).
    pub started_at_secs: u64,
    pub elapsed_min: f64,
    pub remaining_min: f64,
    pub total_duration_min: f64,
}

/// Point-in-time view of the pack for monitoring callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterySnapshot {
    pub state: SystemState,
    /// SOC as a percentage, one decimal.
    pub soc_pct: f64,
    /// Cell voltage (V).
    pub voltage_v: f64,
    pub charge_current_a: f64,
    pub discharge_current_a: f64,
    /// Active seasonal discharge C-rate.
    pub discharge_rate_c: f64,
    /// Ambient temperature constant (K).
    pub temperature_k: f64,
    /// Pack layout label, e.g. `"7S4P"`.
    pub cell_configuration: String,
    pub total_cells: u32,
    /// Pack capacity (Ah).
    pub pack_capacity_ah: f64,
    /// Series pack voltage (V).
    pub pack_voltage_v: f64,
    /// Present while the pack is resting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestInfo>,
}
