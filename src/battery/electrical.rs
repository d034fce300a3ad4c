//! Open-circuit-voltage curve for the simplified cell model.
//!
//! Pure functions; all mutable state lives in
//! [`BatteryState`](crate::battery::state::BatteryState).

use std::f64::consts::PI;

use super::config::BatteryConfig;

/// Open-circuit voltage for a state of charge.
///
/// Linear interpolation between the empty and full cell voltages plus a
/// `0.1·sin(π·soc)` correction approximating real cell nonlinearity. The
/// result is clamped to `[V_empty, V_full]` and rounded to 2 decimals, so
/// the curve is monotonic in its linear term but not guaranteed strictly
/// monotonic near `soc ≈ 1` once the correction is added.
pub fn ocv(config: &BatteryConfig, soc: f64) -> f64 {
    let span = config.cell_voltage_full - config.cell_voltage_empty;
    let mut v = config.cell_voltage_empty + soc * span;
    v += 0.1 * (PI * soc).sin();
    round2(v.clamp(config.cell_voltage_empty, config.cell_voltage_full))
}

/// State of charge for a voltage.
///
/// Inverts only the linear term of [`ocv`]; the sinusoidal correction has no
/// closed-form inverse and is deliberately ignored, so this is an
/// approximation, not an exact inverse. Clamped to `[0, 1]`, rounded to 2
/// decimals.
pub fn soc_from_voltage(config: &BatteryConfig, voltage: f64) -> f64 {
    let span = config.cell_voltage_full - config.cell_voltage_empty;
    let soc = (voltage - config.cell_voltage_empty) / span;
    round2(soc.clamp(0.0, 1.0))
}

/// Rounds to 2 decimal places.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Rounds to 1 decimal place.
pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> BatteryConfig {
        BatteryConfig::default()
    }

    #[test]
    fn ocv_at_empty_is_empty_voltage() {
        assert_eq!(ocv(&cfg(), 0.0), 3.0);
    }

    #[test]
    fn ocv_at_full_is_clamped_to_full_voltage() {
        // The correction term vanishes at soc = 1 but rounding could push
        // past V_full; the clamp keeps the ceiling.
        assert_eq!(ocv(&cfg(), 1.0), 4.2);
    }

    #[test]
    fn ocv_matches_golden_midpoints() {
        let c = cfg();
        // 3.0 + 0.5*1.2 + 0.1*sin(pi/2) = 3.7
        assert_eq!(ocv(&c, 0.5), 3.7);
        // 3.0 + 0.25*1.2 + 0.1*sin(pi/4) ≈ 3.3707
        assert_eq!(ocv(&c, 0.25), 3.37);
    }

    #[test]
    fn ocv_is_idempotent_under_reevaluation() {
        let c = cfg();
        for soc in [0.0, 0.1, 0.33, 0.5, 0.77, 1.0] {
            assert_eq!(ocv(&c, soc), ocv(&c, soc));
        }
    }

    #[test]
    fn ocv_never_leaves_declared_bounds() {
        let c = cfg();
        for i in 0..=100 {
            let v = ocv(&c, f64::from(i) / 100.0);
            assert!((3.0..=4.2).contains(&v), "ocv out of bounds at i={i}: {v}");
        }
    }

    #[test]
    fn soc_from_voltage_inverts_linear_term() {
        let c = cfg();
        assert_eq!(soc_from_voltage(&c, 3.0), 0.0);
        assert_eq!(soc_from_voltage(&c, 4.2), 1.0);
        assert_eq!(soc_from_voltage(&c, 3.6), 0.5);
    }

    #[test]
    fn soc_from_voltage_clamps_out_of_range() {
        let c = cfg();
        assert_eq!(soc_from_voltage(&c, 2.5), 0.0);
        assert_eq!(soc_from_voltage(&c, 4.8), 1.0);
    }

    #[test]
    fn inverse_is_approximate_not_exact() {
        // The correction term is not inverted, so round-tripping through the
        // curve drifts; assert clamping, not invertibility.
        let c = cfg();
        let soc = 0.5;
        let back = soc_from_voltage(&c, ocv(&c, soc));
        assert!(back >= soc);
        assert!(back <= 1.0);
    }
}
