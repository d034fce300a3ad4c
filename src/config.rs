//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::battery::config::BatteryConfig;
use crate::forecast::WindTurbineEstimator;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery pack parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Day-cycle simulation parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Synthetic wind profile parameters.
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Day-cycle simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First daytime hour (inclusive).
    pub start_hour: u32,
    /// First nighttime hour (exclusive end of day window).
    pub end_hour: u32,
    /// Simulation ticks per hour.
    pub ticks_per_hour: u32,
    /// Calendar month for seasonal discharge-rate selection (1–12).
    pub month: u32,
    /// Pack state of charge at the start of the run (0.0–1.0).
    pub initial_soc: f64,
    /// Master random seed for the wind profile.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 18,
            ticks_per_hour: 6,
            month: 4,
            initial_soc: 0.0,
            seed: 42,
        }
    }
}

/// Synthetic wind profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Daily average wind speed (m/s).
    pub avg_wind_speed_ms: f64,
    /// Gaussian noise standard deviation on hourly speeds (m/s).
    pub noise_std_ms: f64,
    /// Rated output per turbine (W).
    pub rated_power_w: f64,
    /// Cut-in wind speed (m/s).
    pub cut_in_speed_ms: f64,
    /// Rotor swept area (m²).
    pub rotor_area_m2: f64,
    /// Turbine efficiency (0–1).
    pub efficiency: f64,
    /// Installed turbine count.
    pub turbine_count: u32,
    /// Site wind-speed multiplier.
    pub wind_factor: f64,
    /// AC→DC conversion efficiency (0–1).
    pub ac_dc_efficiency: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            avg_wind_speed_ms: 3.5,
            noise_std_ms: 0.3,
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

impl ProfileConfig {
    /// Builds the wind estimator for this profile.
    pub fn estimator(&self) -> WindTurbineEstimator {
        WindTurbineEstimator {
            rated_power_w: self.rated_power_w,
            cut_in_speed_ms: self.cut_in_speed_ms,
            rotor_area_m2: self.rotor_area_m2,
            efficiency: self.efficiency,
            turbine_count: self.turbine_count,
            wind_factor: self.wind_factor,
            ac_dc_efficiency: self.ac_dc_efficiency,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.start_hour"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: spring month, moderate campus wind.
    pub fn baseline() -> Self {
        Self {
            battery: BatteryConfig::default(),
            simulation: SimulationConfig::default(),
            profile: ProfileConfig::default(),
        }
    }

    /// Returns the winter preset: long nights, faster seasonal discharge.
    pub fn winter() -> Self {
        Self {
            battery: BatteryConfig::default(),
            simulation: SimulationConfig {
                start_hour: 7,
                end_hour: 17,
                month: 12,
                ..SimulationConfig::default()
            },
            profile: ProfileConfig {
                avg_wind_speed_ms: 4.5,
                noise_std_ms: 0.5,
                ..ProfileConfig::default()
            },
        }
    }

    /// Returns the high-wind preset: production well above the throttle
    /// threshold for much of the day.
    pub fn high_wind() -> Self {
        Self {
            battery: BatteryConfig::default(),
            simulation: SimulationConfig {
                initial_soc: 0.3,
                ..SimulationConfig::default()
            },
            profile: ProfileConfig {
                avg_wind_speed_ms: 6.0,
                noise_std_ms: 0.6,
                rated_power_w: 3000.0,
                rotor_area_m2: 4.5,
                efficiency: 0.40,
                turbine_count: 4,
                ..ProfileConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "winter", "high_wind"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "winter" => Ok(Self::winter()),
            "high_wind" => Ok(Self::high_wind()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let b = &self.battery;
        if b.cell_capacity_mah <= 0.0 {
            errors.push(ConfigError {
                field: "battery.cell_capacity_mah".into(),
                message: "must be > 0".into(),
            });
        }
        if b.cell_voltage_empty >= b.cell_voltage_full {
            errors.push(ConfigError {
                field: "battery.cell_voltage_empty".into(),
                message: "must be < battery.cell_voltage_full".into(),
            });
        }
        if b.cells_in_series == 0 || b.cells_in_parallel == 0 {
            errors.push(ConfigError {
                field: "battery.cells_in_series".into(),
                message: "series and parallel counts must be >= 1".into(),
            });
        }
        if b.base_charge_c_rate <= 0.0 {
            errors.push(ConfigError {
                field: "battery.base_charge_c_rate".into(),
                message: "must be > 0".into(),
            });
        }
        let rates = &b.seasonal_discharge_rates;
        if rates.winter <= 0.0 || rates.spring <= 0.0 || rates.summer <= 0.0 || rates.fall <= 0.0 {
            errors.push(ConfigError {
                field: "battery.seasonal_discharge_rates".into(),
                message: "all seasonal rates must be > 0".into(),
            });
        }
        if b.threshold_power_wh <= 0.0 {
            errors.push(ConfigError {
                field: "battery.threshold_power_wh".into(),
                message: "must be > 0".into(),
            });
        }
        if b.cv_cutoff_c_rate <= 0.0 || b.cv_cutoff_c_rate >= 1.0 {
            errors.push(ConfigError {
                field: "battery.cv_cutoff_c_rate".into(),
                message: "must be in (0.0, 1.0)".into(),
            });
        }
        if b.cv_time_constant_s <= 0.0 {
            errors.push(ConfigError {
                field: "battery.cv_time_constant_s".into(),
                message: "must be > 0".into(),
            });
        }
        if b.rest_duration_min < 0.0 {
            errors.push(ConfigError {
                field: "battery.rest_duration_min".into(),
                message: "must be >= 0".into(),
            });
        }
        if b.voltage_conversion_factor <= 0.0 {
            errors.push(ConfigError {
                field: "battery.voltage_conversion_factor".into(),
                message: "must be > 0".into(),
            });
        }

        let s = &self.simulation;
        if s.start_hour >= s.end_hour {
            errors.push(ConfigError {
                field: "simulation.start_hour".into(),
                message: "must be < simulation.end_hour".into(),
            });
        }
        if s.end_hour > 24 {
            errors.push(ConfigError {
                field: "simulation.end_hour".into(),
                message: "must be <= 24".into(),
            });
        }
        if s.ticks_per_hour == 0 || s.ticks_per_hour > 60 {
            errors.push(ConfigError {
                field: "simulation.ticks_per_hour".into(),
                message: "must be in [1, 60]".into(),
            });
        }
        if !(1..=12).contains(&s.month) {
            errors.push(ConfigError {
                field: "simulation.month".into(),
                message: "must be in [1, 12]".into(),
            });
        }
        if !(0.0..=1.0).contains(&s.initial_soc) {
            errors.push(ConfigError {
                field: "simulation.initial_soc".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let p = &self.profile;
        if p.avg_wind_speed_ms < 0.0 {
            errors.push(ConfigError {
                field: "profile.avg_wind_speed_ms".into(),
                message: "must be >= 0".into(),
            });
        }
        if p.noise_std_ms < 0.0 {
            errors.push(ConfigError {
                field: "profile.noise_std_ms".into(),
                message: "must be >= 0".into(),
            });
        }
        if p.rated_power_w <= 0.0 {
            errors.push(ConfigError {
                field: "profile.rated_power_w".into(),
                message: "must be > 0".into(),
            });
        }
        if p.rotor_area_m2 <= 0.0 {
            errors.push(ConfigError {
                field: "profile.rotor_area_m2".into(),
                message: "must be > 0".into(),
            });
        }
        if p.efficiency <= 0.0 || p.efficiency > 1.0 {
            errors.push(ConfigError {
                field: "profile.efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if p.ac_dc_efficiency <= 0.0 || p.ac_dc_efficiency > 1.0 {
            errors.push(ConfigError {
                field: "profile.ac_dc_efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if p.turbine_count == 0 {
            errors.push(ConfigError {
                field: "profile.turbine_count".into(),
                message: "must be >= 1".into(),
            });
        }
        if p.wind_factor <= 0.0 {
            errors.push(ConfigError {
                field: "profile.wind_factor".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[battery]
cell_capacity_mah = 2600.0
cell_voltage_full = 4.2
cell_voltage_empty = 3.0
cells_in_series = 10
cells_in_parallel = 2
rest_duration_min = 60.0

[battery.seasonal_discharge_rates]
winter = 0.10
spring = 0.09
summer = 0.08
fall = 0.09

[simulation]
start_hour = 5
end_hour = 19
ticks_per_hour = 12
month = 7
initial_soc = 0.25
seed = 99

[profile]
avg_wind_speed_ms = 5.0
turbine_count = 3
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.battery.cell_capacity_mah), Some(2600.0));
        assert_eq!(cfg.as_ref().map(|c| c.battery.cells_in_series), Some(10));
        assert_eq!(cfg.as_ref().map(|c| c.simulation.ticks_per_hour), Some(12));
        assert_eq!(cfg.as_ref().map(|c| c.profile.turbine_count), Some(3));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 7
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(7));
        // day window kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.start_hour), Some(6));
        // battery kept default
        assert_eq!(cfg.as_ref().map(|c| c.battery.cell_capacity_mah), Some(3000.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[simulation]
start_hour = 6
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_empty_day_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.start_hour = 18;
        cfg.simulation.end_hour = 6;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.start_hour"));
    }

    #[test]
    fn validation_catches_inverted_voltage_window() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.cell_voltage_empty = 4.5;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "battery.cell_voltage_empty")
        );
    }

    #[test]
    fn validation_catches_invalid_initial_soc() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc"));
    }

    #[test]
    fn validation_catches_bad_month() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.month = 13;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.month"));
    }

    #[test]
    fn validation_catches_zero_cutoff() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.cv_cutoff_c_rate = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.cv_cutoff_c_rate"));
    }

    #[test]
    fn winter_preset_has_longer_nights() {
        let base = ScenarioConfig::baseline();
        let winter = ScenarioConfig::winter();
        let base_day = base.simulation.end_hour - base.simulation.start_hour;
        let winter_day = winter.simulation.end_hour - winter.simulation.start_hour;
        assert!(winter_day < base_day);
        assert_eq!(winter.simulation.month, 12);
    }

    #[test]
    fn high_wind_preset_has_stronger_site() {
        let base = ScenarioConfig::baseline();
        let windy = ScenarioConfig::high_wind();
        assert!(windy.profile.avg_wind_speed_ms > base.profile.avg_wind_speed_ms);
        assert!(windy.profile.rated_power_w > base.profile.rated_power_w);
    }

    #[test]
    fn profile_builds_matching_estimator() {
        let cfg = ScenarioConfig::baseline();
        let est = cfg.profile.estimator();
        assert_eq!(est.rated_power_w, cfg.profile.rated_power_w);
        assert_eq!(est.turbine_count, cfg.profile.turbine_count);
    }
}
