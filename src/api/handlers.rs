//! Request handlers for the API endpoints.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::battery::{
    BatteryController, BatterySnapshot, ChargeStatus, DischargeStatus,
};
use crate::clock::SimulatedClock;
use crate::error::EssError;
use crate::sim::DayCycleSimulator;
use crate::sim::day_cycle::DEFAULT_TICKS_PER_HOUR;

use super::AppState;
use super::types::{
    ChargeRequest, ControlRequest, DischargeRequest, ErrorResponse, SimulateDayRequest,
};

/// Locks the live controller, recovering from a poisoned lock.
fn lock_controller(state: &Mutex<BatteryController>) -> MutexGuard<'_, BatteryController> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Maps a controller error to an HTTP status and body.
fn error_response(e: &EssError) -> (StatusCode, Json<ErrorResponse>) {
    let code = match e {
        EssError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
        EssError::Validation { .. } => StatusCode::BAD_REQUEST,
        EssError::NumericBounds { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        code,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Returns the live battery snapshot.
///
/// `GET /status` → 200 + `BatterySnapshot` JSON
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<BatterySnapshot> {
    let controller = lock_controller(&state.controller);
    Json(controller.snapshot())
}

/// Runs one automatic-control tick on the live controller.
///
/// `POST /control` → 200 + `ControlStatus` JSON, 409 on invalid state,
/// 400 on validation failure.
pub async fn post_control(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControlRequest>,
) -> impl IntoResponse {
    let mut controller = lock_controller(&state.controller);
    match controller.automatic_control(req.power_production_wh, req.is_nighttime, req.month) {
        Ok(status) => Ok(Json(status)),
        Err(e) => Err(error_response(&e)),
    }
}

/// Starts constant-current charging on the live controller.
///
/// `POST /charge` → 200 + `ChargeStatus` JSON
pub async fn post_charge(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChargeRequest>,
) -> Json<ChargeStatus> {
    let mut controller = lock_controller(&state.controller);
    Json(controller.start_cc_charge(req.power_production_wh))
}

/// Starts discharging on the live controller.
///
/// `POST /discharge` → 200 + `DischargeStatus` JSON
pub async fn post_discharge(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DischargeRequest>,
) -> Json<DischargeStatus> {
    let mut controller = lock_controller(&state.controller);
    Json(controller.start_discharge(req.power_production_wh))
}

/// Runs a day-cycle simulation on a fresh controller instance.
///
/// The live controller is untouched; the simulation gets its own pack (same
/// configuration) and its own simulated clock.
///
/// `POST /simulate/day` → 200 + `DayCycleReport` JSON, 400 on validation
/// failure.
pub async fn post_simulate_day(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateDayRequest>,
) -> impl IntoResponse {
    if !(0.0..=1.0).contains(&req.initial_soc) {
        let e = EssError::validation("initial_soc", "must be in [0.0, 1.0]");
        return Err(error_response(&e));
    }

    let clock = Arc::new(SimulatedClock::new());
    let controller = BatteryController::with_initial_soc(
        state.battery_config.clone(),
        clock.clone(),
        req.initial_soc,
    );

    let sim = DayCycleSimulator::new(
        controller,
        clock,
        req.hourly_power_wh,
        req.start_hour,
        req.end_hour,
        DEFAULT_TICKS_PER_HOUR,
        req.month,
    );
    let mut sim = match sim {
        Ok(sim) => sim,
        Err(e) => return Err(error_response(&e)),
    };

    match sim.run() {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_response(&e)),
    }
}
