//! API request and error types.
//!
//! Responses reuse the library's serializable status records directly:
//! [`BatterySnapshot`](crate::battery::BatterySnapshot), the status unions,
//! and [`DayCycleReport`](crate::sim::DayCycleReport).

use serde::Deserialize;
use serde::Serialize;

/// Body for `POST /control` — one automatic-control tick.
#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    /// Production estimate for this tick (Wh).
    pub power_production_wh: f64,
    /// Whether the streetlights are on.
    pub is_nighttime: bool,
    /// Optional calendar month for seasonal rate selection.
    pub month: Option<u32>,
}

/// Body for `POST /charge` — start CC charging.
#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    /// Current production estimate (Wh).
    pub power_production_wh: f64,
}

/// Body for `POST /discharge` — start discharging.
#[derive(Debug, Deserialize)]
pub struct DischargeRequest {
    /// Current production estimate (Wh), if known.
    pub power_production_wh: Option<f64>,
}

/// Body for `POST /simulate/day` — run a full day cycle.
#[derive(Debug, Deserialize)]
pub struct SimulateDayRequest {
    /// Hourly production curve, 24 values (Wh).
    pub hourly_power_wh: Vec<f64>,
    /// First daytime hour (inclusive).
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// First nighttime hour.
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Optional calendar month for seasonal rate selection.
    pub month: Option<u32>,
    /// Pack SOC at the start of the simulated day.
    #[serde(default = "default_initial_soc")]
    pub initial_soc: f64,
}

fn default_start_hour() -> u32 {
    6
}

fn default_end_hour() -> u32 {
    18
}

fn default_initial_soc() -> f64 {
    0.3
}

/// Error response body for 4xx/5xx results.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
