//! Runtime battery pack parameters.

use serde::{Deserialize, Serialize};

/// Season of the year, used to select the discharge C-rate.
///
/// Streetlights burn longer in winter nights than in summer ones, so the
/// pack drains at a season-dependent rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Maps a calendar month (1–12) to its season.
    ///
    /// Out-of-range months fall into the catch-all fall branch.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Fall,
        }
    }
}

/// Discharge C-rate per season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonalRates {
    /// Long nights.
    pub winter: f64,
    /// Standard nights.
    pub spring: f64,
    /// Short nights.
    pub summer: f64,
    /// Standard nights.
    pub fall: f64,
}

impl Default for SeasonalRates {
    fn default() -> Self {
        Self {
            winter: 0.0932,
            spring: 0.0833,
            summer: 0.0734,
            fall: 0.0833,
        }
    }
}

impl SeasonalRates {
    /// Returns the C-rate for the given season.
    pub fn rate(&self, season: Season) -> f64 {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
        }
    }
}

/// Immutable pack parameters, constructed once and injected into the
/// controller.
///
/// The electrical model is a single simplified cell pair scaled by the
/// series/parallel counts; temperature is a fixed constant, not dynamically
/// modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Cell capacity in mAh.
    pub cell_capacity_mah: f64,
    /// Cell voltage at full charge (V).
    pub cell_voltage_full: f64,
    /// Cell voltage at end of discharge (V).
    pub cell_voltage_empty: f64,
    /// Cells connected in series.
    pub cells_in_series: u32,
    /// Cells connected in parallel.
    pub cells_in_parallel: u32,
    /// Base charging C-rate before excess-power throttling.
    pub base_charge_c_rate: f64,
    /// Discharge C-rate per season.
    pub seasonal_discharge_rates: SeasonalRates,
    /// Production level (Wh) above which C-rates are adjusted.
    pub threshold_power_wh: f64,
    /// Gain applied to production excess when adjusting C-rates (per Wh).
    pub excess_gain_per_wh: f64,
    /// CV-phase cutoff current as a fraction of capacity.
    pub cv_cutoff_c_rate: f64,
    /// CV-phase exponential current decay time constant (s).
    pub cv_time_constant_s: f64,
    /// Mandatory rest window after a completed cycle (minutes).
    pub rest_duration_min: f64,
    /// DC-DC conversion factor applied to the pack voltage for the
    /// streetlight load.
    pub voltage_conversion_factor: f64,
    /// Ambient temperature constant (K).
    pub temperature_k: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            cell_capacity_mah: 3000.0,
            cell_voltage_full: 4.2,
            cell_voltage_empty: 3.0,
            cells_in_series: 7,
            cells_in_parallel: 4,
            base_charge_c_rate: 0.1,
            seasonal_discharge_rates: SeasonalRates::default(),
            threshold_power_wh: 25_804.8,
            excess_gain_per_wh: 6.75e-9,
            cv_cutoff_c_rate: 0.02,
            cv_time_constant_s: 3600.0,
            rest_duration_min: 120.0,
            voltage_conversion_factor: 2.749,
            temperature_k: 298.15,
        }
    }
}

impl BatteryConfig {
    /// Cell capacity in Ah.
    pub fn capacity_ah(&self) -> f64 {
        self.cell_capacity_mah / 1000.0
    }

    /// CV cutoff current in amperes (`cv_cutoff_c_rate · capacity`).
    pub fn cv_cutoff_current_a(&self) -> f64 {
        self.cv_cutoff_c_rate * self.capacity_ah()
    }

    /// Total cell count across the pack.
    pub fn total_cells(&self) -> u32 {
        self.cells_in_series * self.cells_in_parallel
    }

    /// Pack capacity in Ah (parallel strings add).
    pub fn pack_capacity_ah(&self) -> f64 {
        self.capacity_ah() * f64::from(self.cells_in_parallel)
    }

    /// Pack layout label, e.g. `"7S4P"`.
    pub fn cell_configuration(&self) -> String {
        format!("{}S{}P", self.cells_in_series, self.cells_in_parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_from_month_covers_year() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Fall);
        assert_eq!(Season::from_month(11), Season::Fall);
    }

    #[test]
    fn out_of_range_month_falls_back_to_fall() {
        assert_eq!(Season::from_month(0), Season::Fall);
        assert_eq!(Season::from_month(13), Season::Fall);
    }

    #[test]
    fn seasonal_rates_lookup() {
        let rates = SeasonalRates::default();
        assert_eq!(rates.rate(Season::Winter), 0.0932);
        assert_eq!(rates.rate(Season::Spring), 0.0833);
        assert_eq!(rates.rate(Season::Summer), 0.0734);
        assert_eq!(rates.rate(Season::Fall), 0.0833);
    }

    #[test]
    fn winter_discharges_faster_than_summer() {
        let rates = SeasonalRates::default();
        assert!(rates.rate(Season::Winter) > rates.rate(Season::Summer));
    }

    #[test]
    fn derived_pack_quantities() {
        let cfg = BatteryConfig::default();
        assert_eq!(cfg.capacity_ah(), 3.0);
        assert_eq!(cfg.total_cells(), 28);
        assert_eq!(cfg.pack_capacity_ah(), 12.0);
        assert_eq!(cfg.cell_configuration(), "7S4P");
        assert!((cfg.cv_cutoff_current_a() - 0.06).abs() < 1e-12);
    }
}
