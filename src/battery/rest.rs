//! Mandatory rest window after a completed charge or discharge cycle.

use crate::error::EssError;

use super::controller::BatteryController;
use super::electrical::round1;
use super::state::SystemState;
use super::status::{RestInfo, RestStatus};

impl BatteryController {
    /// Checks whether the rest window has elapsed.
    ///
    /// This is the only path out of REST: once the elapsed time reaches the
    /// configured duration the pack transitions to IDLE and the rest
    /// timestamp is cleared; before that the remaining time is reported and
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when the pack is not resting.
    pub fn check_rest(&mut self) -> Result<RestStatus, EssError> {
        if self.state.system_state != SystemState::Rest {
            return Err(EssError::InvalidStateTransition {
                expected: SystemState::Rest,
                actual: self.state.system_state,
            });
        }

        let now = self.now_secs();
        let started = match self.state.rest_started_at_secs {
            Some(s) => s,
            // Set on every REST entry; stamp now if absent.
            None => {
                self.state.rest_started_at_secs = Some(now);
                now
            }
        };

        let elapsed_min = now.saturating_sub(started) as f64 / 60.0;
        let total = self.config.rest_duration_min;

        if elapsed_min >= total {
            self.state.system_state = SystemState::Idle;
            self.state.rest_started_at_secs = None;
            return Ok(RestStatus::Completed {
                soc_pct: round1(self.state.soc * 100.0),
                voltage_v: self.state.voltage_v,
                elapsed_min: round1(elapsed_min),
            });
        }

        Ok(RestStatus::Resting {
            soc_pct: round1(self.state.soc * 100.0),
            voltage_v: self.state.voltage_v,
            elapsed_min: round1(elapsed_min),
            remaining_min: round1(total - elapsed_min),
            rest_duration_min: total,
        })
    }

    /// Rest-window details for the snapshot, present only while resting.
    pub(super) fn rest_info(&self) -> Option<RestInfo> {
        if self.state.system_state != SystemState::Rest {
            return None;
        }
        let started = self.state.rest_started_at_secs?;
        let elapsed_min = self.now_secs().saturating_sub(started) as f64 / 60.0;
        let total = self.config.rest_duration_min;
        Some(RestInfo {
            started_at_secs: started,
            elapsed_min: round1(elapsed_min),
            remaining_min: round1((total - elapsed_min).max(0.0)),
            total_duration_min: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battery::config::BatteryConfig;
    use crate::clock::SimulatedClock;

    /// Drives a low pack to the discharge floor so it enters REST.
    fn resting_controller() -> (BatteryController, Arc<SimulatedClock>) {
        let clock = Arc::new(SimulatedClock::new());
        let mut controller =
            BatteryController::with_initial_soc(BatteryConfig::default(), clock.clone(), 0.05);
        controller.start_discharge(None);
        controller
            .continue_discharge(3600.0)
            .expect("discharge should succeed");
        assert_eq!(controller.system_state(), SystemState::Rest);
        (controller, clock)
    }

    #[test]
    fn check_rest_requires_rest_state() {
        let clock = Arc::new(SimulatedClock::new());
        let mut controller = BatteryController::new(BatteryConfig::default(), clock);
        let err = controller.check_rest().unwrap_err();
        assert_eq!(
            err,
            EssError::InvalidStateTransition {
                expected: SystemState::Rest,
                actual: SystemState::Idle,
            }
        );
    }

    #[test]
    fn refuses_to_leave_before_window_elapses() {
        let (mut controller, clock) = resting_controller();
        clock.advance(119 * 60);
        let status = controller.check_rest().expect("check should succeed");
        match status {
            RestStatus::Resting {
                elapsed_min,
                remaining_min,
                ..
            } => {
                assert_eq!(elapsed_min, 119.0);
                assert_eq!(remaining_min, 1.0);
            }
            other => panic!("expected resting, got {other:?}"),
        }
        assert_eq!(controller.system_state(), SystemState::Rest);
    }

    #[test]
    fn transitions_to_idle_exactly_at_boundary() {
        let (mut controller, clock) = resting_controller();
        clock.advance(120 * 60);
        let status = controller.check_rest().expect("check should succeed");
        assert!(matches!(status, RestStatus::Completed { .. }));
        assert_eq!(controller.system_state(), SystemState::Idle);
        assert!(controller.state().rest_started_at_secs.is_none());
    }

    #[test]
    fn rest_info_counts_down() {
        let (controller, clock) = resting_controller();
        clock.advance(30 * 60);
        let info = controller.snapshot().rest.expect("pack is resting");
        assert_eq!(info.elapsed_min, 30.0);
        assert_eq!(info.remaining_min, 90.0);
        assert_eq!(info.total_duration_min, 120.0);
    }

    #[test]
    fn rest_info_absent_when_not_resting() {
        let clock = Arc::new(SimulatedClock::new());
        let controller = BatteryController::new(BatteryConfig::default(), clock);
        assert!(controller.snapshot().rest.is_none());
    }
}
