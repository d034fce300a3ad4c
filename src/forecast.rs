//! Power-production estimation for the controller's external signal.
//!
//! The controller itself only consumes a Wh figure per tick; these are the
//! interfaces it is fed through, plus the closed-form wind estimator and the
//! diurnal profile generator used to synthesize a day of production for the
//! simulator.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

/// Standard air density at sea level (kg/m³).
pub const AIR_DENSITY_KG_M3: f64 = 1.225;

/// Produces a power-production estimate for the controller.
pub trait PowerEstimator {
    /// Estimated production (Wh) for the given wind speed over `hours`.
    fn predict_wh(&self, wind_speed_ms: f64, hours: f64) -> f64;
}

/// Ambient conditions sampled upstream of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    /// Hour of day (0–23), from which the day/night flag is derived.
    pub hour: u32,
}

/// Supplies the current ambient reading.
pub trait WeatherSource {
    fn current(&self) -> WeatherReading;
}

/// Fixed reading, for tests and offline runs.
#[derive(Debug, Clone)]
pub struct StaticWeather(pub WeatherReading);

impl WeatherSource for StaticWeather {
    fn current(&self) -> WeatherReading {
        self.0.clone()
    }
}

/// Swept-area wind turbine estimator.
///
/// Site wind factor, cut-in speed, `½·ρ·A·v³·η` capped at the rated power,
/// turbine count, and AC→DC conversion losses.
#[derive(Debug, Clone, PartialEq)]
pub struct WindTurbineEstimator {
    /// Rated output per turbine (W); the swept-area power is capped here.
    pub rated_power_w: f64,
    /// Below this adjusted wind speed the turbine produces nothing (m/s).
    pub cut_in_speed_ms: f64,
    /// Rotor swept area (m²).
    pub rotor_area_m2: f64,
    /// Aerodynamic/electrical efficiency (0–1).
    pub efficiency: f64,
    /// Installed turbine count at the site.
    pub turbine_count: u32,
    /// Site multiplier on the reported wind speed (building-channel effects).
    pub wind_factor: f64,
    /// AC→DC conversion efficiency (0–1).
    pub ac_dc_efficiency: f64,
}

impl Default for WindTurbineEstimator {
    /// A pair of 1 kW turbines in a building channel.
    fn default() -> Self {
        Self {
            rated_power_w: 1000.0,
            cut_in_speed_ms: 1.5,
            rotor_area_m2: 3.14,
            efficiency: 0.35,
            turbine_count: 2,
            wind_factor: 1.4,
            ac_dc_efficiency: 0.70,
        }
    }
}

impl PowerEstimator for WindTurbineEstimator {
    fn predict_wh(&self, wind_speed_ms: f64, hours: f64) -> f64 {
        let adjusted = wind_speed_ms * self.wind_factor;
        if adjusted < self.cut_in_speed_ms {
            return 0.0;
        }
        let raw_w =
            0.5 * AIR_DENSITY_KG_M3 * self.rotor_area_m2 * adjusted.powi(3) * self.efficiency;
        let capped_w = raw_w.min(self.rated_power_w);
        capped_w * f64::from(self.turbine_count) * hours * self.ac_dc_efficiency
    }
}

/// Generates a day of hourly wind speeds from an average speed.
///
/// Early morning runs 20% under the average, afternoon 20% over, with
/// optional seeded Gaussian noise on top.
#[derive(Debug)]
pub struct DiurnalWindProfile {
    avg_wind_speed_ms: f64,
    noise_std: f64,
    rng: StdRng,
}

impl DiurnalWindProfile {
    /// Creates a profile generator.
    ///
    /// # Arguments
    ///
    /// * `avg_wind_speed_ms` - Daily average wind speed
    /// * `noise_std` - Gaussian noise standard deviation (m/s); 0 disables
    /// * `seed` - Random seed for reproducible noise
    pub fn new(avg_wind_speed_ms: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            avg_wind_speed_ms: avg_wind_speed_ms.max(0.0),
            noise_std: noise_std.max(0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Diurnal multiplier on the average speed.
    fn band_factor(hour: u32) -> f64 {
        match hour {
            0..=5 => 0.8,
            12..=17 => 1.2,
            _ => 1.0,
        }
    }

    /// One day of hourly wind speeds (24 values, m/s, never negative).
    pub fn hourly_wind_speeds(&mut self) -> Vec<f64> {
        (0..24)
            .map(|hour| {
                let base = self.avg_wind_speed_ms * Self::band_factor(hour);
                (base + gaussian_noise(&mut self.rng, self.noise_std)).max(0.0)
            })
            .collect()
    }

    /// One day of hourly production (24 values, Wh) through an estimator.
    pub fn hourly_power_wh(&mut self, estimator: &impl PowerEstimator) -> Vec<f64> {
        self.hourly_wind_speeds()
            .into_iter()
            .map(|ws| estimator.predict_wh(ws, 1.0))
            .collect()
    }
}

/// Gaussian noise via the Box-Muller transform, mean 0.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
