use crate::thresholds::AlertThresholds;
use aquarium_schemas::{
    alert::{AlertLevel, ParameterAlert},
    tank::Tank,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const AMMONIA_ACTIONS: &[&str] = &[
    "Perform a 25-50% water change immediately",
    "Check that the filter is running and not clogged",
    "Reduce feeding until ammonia reads 0 ppm",
    "Add a beneficial bacteria supplement",
    "Retest ammonia daily until it reads 0 ppm",
];

const NITRITE_ACTIONS: &[&str] = &[
    "Perform a 25-50% water change",
    "Add aquarium salt to reduce nitrite toxicity (freshwater only)",
    "Reduce feeding",
    "Add a beneficial bacteria supplement",
    "Retest nitrite daily until it reads 0 ppm",
];

const NITRATE_ACTIONS: &[&str] = &[
    "Perform a 30-50% water change",
    "Vacuum the substrate to remove waste",
    "Reduce feeding amounts",
    "Add fast-growing live plants",
    "Review your water change schedule",
];

const PH_LOW_ACTIONS: &[&str] = &[
    "Test carbonate hardness (KH)",
    "Perform a partial water change",
    "Add crushed coral or a pH buffer to raise pH gradually",
    "Do not change pH by more than 0.2 per day",
];

const PH_HIGH_ACTIONS: &[&str] = &[
    "Check decorations and substrate for limestone",
    "Perform a partial water change with softer water",
    "Add driftwood or peat to lower pH gradually",
    "Do not change pH by more than 0.2 per day",
];

const TEMP_LOW_ACTIONS: &[&str] = &[
    "Check that the heater is switched on and working",
    "Make sure the heater wattage suits the tank volume",
    "Keep the tank away from drafts and windows",
];

const TEMP_HIGH_ACTIONS: &[&str] = &[
    "Check the heater thermostat setting",
    "Increase surface agitation to improve oxygen levels",
    "Switch off the tank lights for a while",
    "Keep the tank out of direct sunlight",
];

const GH_ACTIONS: &[&str] = &[
    "Confirm your livestock prefers soft water",
    "Add a remineralizing supplement if your species need harder water",
    "Monitor pH closely, soft water swings easily",
];

/// One triggered rule, before it is stamped with the tank identity.
struct Finding {
    parameter: &'static str,
    level: AlertLevel,
    value: f64,
    title: &'static str,
    description: String,
    recommendation: &'static str,
    actions: &'static [&'static str],
}

/// Maps a tank's current water parameters to advisory alerts.
///
/// Every rule is checked independently against the instantaneous snapshot.
/// There is no memory between calls, so the same tank always yields the same
/// alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, tank: &Tank) -> Vec<ParameterAlert> {
        self.evaluate_at(tank, Utc::now())
    }

    /// Evaluates the tank with an explicit generation timestamp.
    pub fn evaluate_at(&self, tank: &Tank, now: DateTime<Utc>) -> Vec<ParameterAlert> {
        self.findings(tank)
            .into_iter()
            .map(|finding| ParameterAlert {
                id: format!("{}-{}", tank.id, finding.parameter),
                tank_id: tank.id.clone(),
                tank_name: tank.name.clone(),
                level: finding.level,
                title: finding.title.to_string(),
                description: finding.description,
                recommendation: finding.recommendation.to_string(),
                parameter: finding.parameter.to_string(),
                current_value: finding.value,
                actions: finding.actions.iter().map(|a| a.to_string()).collect(),
                created_at: now,
            })
            .collect()
    }

    /// Evaluates every tank and flattens the result.
    pub fn evaluate_all(&self, tanks: &[Tank], now: DateTime<Utc>) -> Vec<ParameterAlert> {
        tanks
            .iter()
            .flat_map(|tank| self.evaluate_at(tank, now))
            .collect()
    }

    fn findings(&self, tank: &Tank) -> Vec<Finding> {
        let t = &self.thresholds;
        let p = &tank.parameters;
        let mut findings = Vec::new();

        if p.ammonia > 0.0 {
            findings.push(Finding {
                parameter: "ammonia",
                level: if p.ammonia > t.ammonia_critical {
                    AlertLevel::Critical
                } else {
                    AlertLevel::Warning
                },
                value: p.ammonia,
                title: "Ammonia Detected",
                description: format!(
                    "Ammonia is at {} ppm. Any detectable ammonia is toxic to fish.",
                    p.ammonia
                ),
                recommendation: "Do a partial water change and find the source of the ammonia.",
                actions: AMMONIA_ACTIONS,
            });
        }

        if p.nitrite > 0.0 {
            findings.push(Finding {
                parameter: "nitrite",
                level: if p.nitrite > t.nitrite_critical {
                    AlertLevel::Critical
                } else {
                    AlertLevel::Warning
                },
                value: p.nitrite,
                title: "Nitrite Detected",
                description: format!(
                    "Nitrite is at {} ppm. Nitrite stops fish blood from carrying oxygen.",
                    p.nitrite
                ),
                recommendation: "Perform a partial water change and support the nitrogen cycle.",
                actions: NITRITE_ACTIONS,
            });
        }

        if p.nitrate > t.nitrate_warning {
            findings.push(Finding {
                parameter: "nitrate",
                level: if p.nitrate > t.nitrate_critical {
                    AlertLevel::Critical
                } else {
                    AlertLevel::Warning
                },
                value: p.nitrate,
                title: "High Nitrate",
                description: format!(
                    "Nitrate is at {} ppm. Elevated nitrate stresses fish and feeds algae.",
                    p.nitrate
                ),
                recommendation: "Increase the size or frequency of water changes.",
                actions: NITRATE_ACTIONS,
            });
        }

        if tank.is_freshwater() {
            if p.ph < t.ph_low {
                findings.push(Finding {
                    parameter: "ph",
                    level: if p.ph < t.ph_low_warning {
                        AlertLevel::Warning
                    } else {
                        AlertLevel::Info
                    },
                    value: p.ph,
                    title: "Low pH",
                    description: format!(
                        "pH is {}, which is more acidic than most species tolerate.",
                        p.ph
                    ),
                    recommendation: "Raise pH slowly and check your buffering capacity.",
                    actions: PH_LOW_ACTIONS,
                });
            } else if p.ph > t.ph_high {
                findings.push(Finding {
                    parameter: "ph",
                    level: if p.ph > t.ph_high_warning {
                        AlertLevel::Warning
                    } else {
                        AlertLevel::Info
                    },
                    value: p.ph,
                    title: "High pH",
                    description: format!(
                        "pH is {}, which is more alkaline than most species tolerate.",
                        p.ph
                    ),
                    recommendation: "Lower pH slowly and look for sources of hardness.",
                    actions: PH_HIGH_ACTIONS,
                });
            }
        }

        if p.temp_c < t.temp_low {
            findings.push(Finding {
                parameter: "temperature",
                level: if p.temp_c < t.temp_low_warning {
                    AlertLevel::Warning
                } else {
                    AlertLevel::Info
                },
                value: p.temp_c,
                title: "Low Temperature",
                description: format!(
                    "Water temperature is {}°C, below the typical tropical range.",
                    p.temp_c
                ),
                recommendation: "Check the heater and bring the temperature up gradually.",
                actions: TEMP_LOW_ACTIONS,
            });
        } else if p.temp_c > t.temp_high {
            findings.push(Finding {
                parameter: "temperature",
                level: if p.temp_c > t.temp_high_warning {
                    AlertLevel::Warning
                } else {
                    AlertLevel::Info
                },
                value: p.temp_c,
                title: "High Temperature",
                description: format!(
                    "Water temperature is {}°C, above the typical tropical range.",
                    p.temp_c
                ),
                recommendation: "Cool the tank gradually and improve aeration.",
                actions: TEMP_HIGH_ACTIONS,
            });
        }

        if tank.is_freshwater() {
            if let Some(gh) = p.gh.filter(|gh| *gh < t.gh_soft) {
                findings.push(Finding {
                    parameter: "gh",
                    level: AlertLevel::Info,
                    value: gh,
                    title: "Very Soft Water",
                    description: format!("General hardness is {} dGH.", gh),
                    recommendation: "Make sure your livestock is suited to very soft water.",
                    actions: GH_ACTIONS,
                });
            }
        }

        findings
    }
}

/// Keeps only the critical alerts.
pub fn critical_only(alerts: &[ParameterAlert]) -> Vec<ParameterAlert> {
    alerts
        .iter()
        .filter(|a| a.level == AlertLevel::Critical)
        .cloned()
        .collect()
}

/// Number of alerts per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

impl AlertCounts {
    pub fn from_alerts(alerts: &[ParameterAlert]) -> Self {
        alerts.iter().fold(Self::default(), |mut counts, alert| {
            match alert.level {
                AlertLevel::Critical => counts.critical += 1,
                AlertLevel::Warning => counts.warning += 1,
                AlertLevel::Info => counts.info += 1,
            }
            counts.total += 1;
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{nominal_tank, saltwater_tank};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_nominal_tank_has_no_alerts() {
        let evaluator = AlertEvaluator::default();
        assert!(evaluator.evaluate_at(&nominal_tank(), now()).is_empty());
    }

    #[test]
    fn test_boundaries_are_not_alerts() {
        let evaluator = AlertEvaluator::default();
        let mut tank = nominal_tank();
        tank.parameters.nitrate = 40.0;
        tank.parameters.ph = 6.0;
        tank.parameters.temp_c = 30.0;
        assert!(evaluator.evaluate_at(&tank, now()).is_empty());

        tank.parameters.ph = 8.0;
        tank.parameters.temp_c = 20.0;
        assert!(evaluator.evaluate_at(&tank, now()).is_empty());
    }

    #[test]
    fn test_ammonia_severity() {
        let evaluator = AlertEvaluator::default();
        let mut tank = nominal_tank();

        tank.parameters.ammonia = 0.3;
        let alerts = evaluator.evaluate_at(&tank, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, "ammonia");
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[0].id, "tank-1-ammonia");
        assert_eq!(alerts[0].actions.len(), AMMONIA_ACTIONS.len());

        tank.parameters.ammonia = 0.1;
        let alerts = evaluator.evaluate_at(&tank, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_nitrogen_compounds() {
        let evaluator = AlertEvaluator::default();
        let mut tank = nominal_tank();
        tank.parameters.nitrite = 0.5;
        tank.parameters.nitrate = 85.0;

        let alerts = evaluator.evaluate_at(&tank, now());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].parameter, "nitrite");
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[1].parameter, "nitrate");
        assert_eq!(alerts[1].level, AlertLevel::Critical);
    }

    #[test]
    fn test_ph_rules_only_apply_to_freshwater() {
        let evaluator = AlertEvaluator::default();

        let mut fresh = nominal_tank();
        fresh.parameters.ph = 5.8;
        let alerts = evaluator.evaluate_at(&fresh, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Info);

        fresh.parameters.ph = 8.6;
        let alerts = evaluator.evaluate_at(&fresh, now());
        assert_eq!(alerts[0].title, "High pH");
        assert_eq!(alerts[0].level, AlertLevel::Warning);

        let mut salt = saltwater_tank();
        salt.parameters.ph = 8.6;
        assert!(evaluator.evaluate_at(&salt, now()).is_empty());
    }

    #[test]
    fn test_temperature_applies_to_every_water_type() {
        let evaluator = AlertEvaluator::default();
        let mut salt = saltwater_tank();
        salt.parameters.temp_c = 17.0;
        let alerts = evaluator.evaluate_at(&salt, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, "temperature");
        assert_eq!(alerts[0].level, AlertLevel::Warning);

        salt.parameters.temp_c = 31.0;
        let alerts = evaluator.evaluate_at(&salt, now());
        assert_eq!(alerts[0].level, AlertLevel::Info);
    }

    #[test]
    fn test_soft_water_notice() {
        let evaluator = AlertEvaluator::default();
        let mut tank = nominal_tank();
        tank.parameters.gh = Some(2.0);
        let alerts = evaluator.evaluate_at(&tank, now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, "gh");
        assert_eq!(alerts[0].level, AlertLevel::Info);

        tank.parameters.gh = None;
        assert!(evaluator.evaluate_at(&tank, now()).is_empty());
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let evaluator = AlertEvaluator::default();
        let mut tank = nominal_tank();
        tank.parameters.ammonia = 1.0;
        tank.parameters.temp_c = 35.0;
        assert_eq!(
            evaluator.evaluate_at(&tank, now()),
            evaluator.evaluate_at(&tank, now())
        );
    }

    #[test]
    fn test_aggregates() {
        let evaluator = AlertEvaluator::default();
        let mut first = nominal_tank();
        first.parameters.ammonia = 0.5;
        first.parameters.temp_c = 31.0;
        let mut second = saltwater_tank();
        second.parameters.nitrate = 50.0;

        let alerts = evaluator.evaluate_all(&[first, second, nominal_tank()], now());
        assert_eq!(alerts.len(), 3);

        let critical = critical_only(&alerts);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].parameter, "ammonia");

        let counts = AlertCounts::from_alerts(&alerts);
        assert_eq!(
            counts,
            AlertCounts { critical: 1, warning: 1, info: 1, total: 3 }
        );
    }
}
