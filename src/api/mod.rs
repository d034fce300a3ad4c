//! REST API over a live controller instance.
//!
//! Endpoints:
//! - `GET  /status` — battery snapshot
//! - `POST /control` — one automatic-control tick
//! - `POST /charge` — start CC charging
//! - `POST /discharge` — start discharging
//! - `POST /simulate/day` — run a day cycle on a fresh controller

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};

use crate::battery::{BatteryConfig, BatteryController};

pub use types::{ChargeRequest, ControlRequest, DischargeRequest, ErrorResponse, SimulateDayRequest};

/// Application state shared across all request handlers.
///
/// The live controller sits behind one exclusive lock: a controller instance
/// is a single-threaded state machine, so concurrent requests targeting it
/// must serialize. Day-cycle simulations run on fresh instances and never
/// touch the lock.
pub struct AppState {
    /// The live controller for status/control/charge/discharge endpoints.
    pub controller: Mutex<BatteryController>,
    /// Pack parameters used to build fresh controllers for simulations.
    pub battery_config: BatteryConfig,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/control", post(handlers::post_control))
        .route("/charge", post(handlers::post_charge))
        .route("/discharge", post(handlers::post_discharge))
        .route("/simulate/day", post(handlers::post_simulate_day))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
