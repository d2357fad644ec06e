//! Hand-tuned limits used by the alert evaluator and the health score.
//!
//! The defaults are the values the app has always shipped with. They are
//! exposed as configuration so they can be overridden, not re-derived.

use serde::{Deserialize, Serialize};

/// Limits for the parameter alert rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Ammonia above this (ppm) is critical; any detectable ammonia is a warning.
    pub ammonia_critical: f64,
    /// Nitrite above this (ppm) is critical; any detectable nitrite is a warning.
    pub nitrite_critical: f64,
    pub nitrate_warning: f64,
    pub nitrate_critical: f64,
    pub ph_low: f64,
    pub ph_low_warning: f64,
    pub ph_high: f64,
    pub ph_high_warning: f64,
    pub temp_low: f64,
    pub temp_low_warning: f64,
    pub temp_high: f64,
    pub temp_high_warning: f64,
    /// General hardness (°dGH) below which freshwater is flagged as very soft.
    pub gh_soft: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            ammonia_critical: 0.25,
            nitrite_critical: 0.5,
            nitrate_warning: 40.0,
            nitrate_critical: 80.0,
            ph_low: 6.0,
            ph_low_warning: 5.5,
            ph_high: 8.0,
            ph_high_warning: 8.5,
            temp_low: 20.0,
            temp_low_warning: 18.0,
            temp_high: 30.0,
            temp_high_warning: 32.0,
            gh_soft: 3.0,
        }
    }
}

/// Penalty table for the tank health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPolicy {
    pub ammonia_penalty: i32,
    pub nitrite_penalty: i32,
    pub nitrate_high: f64,
    pub nitrate_high_penalty: i32,
    pub nitrate_elevated: f64,
    pub nitrate_elevated_penalty: i32,
    pub ph_low: f64,
    pub ph_high: f64,
    pub ph_penalty: i32,
    pub temp_low: f64,
    pub temp_high: f64,
    pub temp_penalty: i32,
    /// A water change older than this many days counts as overdue.
    pub water_change_overdue_days: i64,
    pub water_change_overdue_penalty: i32,
    /// Recommended days between water changes.
    pub water_change_cadence_days: i64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            ammonia_penalty: 30,
            nitrite_penalty: 30,
            nitrate_high: 40.0,
            nitrate_high_penalty: 20,
            nitrate_elevated: 20.0,
            nitrate_elevated_penalty: 10,
            ph_low: 6.0,
            ph_high: 8.0,
            ph_penalty: 15,
            temp_low: 20.0,
            temp_high: 30.0,
            temp_penalty: 10,
            water_change_overdue_days: 21,
            water_change_overdue_penalty: 15,
            water_change_cadence_days: 14,
        }
    }
}

/// Everything the evaluators need, as read from the app config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub alerts: AlertThresholds,
    pub health: HealthPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EvaluatorConfig =
            serde_json::from_str(r#"{ "alerts": { "nitrate_warning": 30.0 } }"#).unwrap();
        assert_eq!(config.alerts.nitrate_warning, 30.0);
        assert_eq!(config.alerts.nitrate_critical, 80.0);
        assert_eq!(config.health, HealthPolicy::default());
    }
}
