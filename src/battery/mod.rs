//! Battery pack modeling and charge/discharge control.

/// CC/CV charging operations.
pub mod charge;
/// Runtime pack parameters and seasonal rate tables.
pub mod config;
pub mod controller;
/// Constant-current discharge operations.
pub mod discharge;
/// Open-circuit-voltage curve.
pub mod electrical;
/// Rest-window scheduling.
pub mod rest;
pub mod state;
pub mod status;

// Re-export the main types for convenience
pub use config::{BatteryConfig, Season, SeasonalRates};
pub use controller::BatteryController;
pub use state::{BatteryState, CycleRecord, SystemState};
pub use status::{
    BatterySnapshot, ChargeStatus, ControlStatus, DischargeStatus, HoldReason, HoldStatus,
    RestStatus,
};
