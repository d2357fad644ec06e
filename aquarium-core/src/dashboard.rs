use crate::{
    alerts::{AlertCounts, AlertEvaluator},
    health::{average_health, HealthCalculator},
    thresholds::EvaluatorConfig,
};
use aquarium_schemas::{
    health::TankHealthScore, maintenance::MaintenanceLog, parameters::ParameterReading,
    tank::Tank,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-day mean of the core water parameters, used for trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub readings: usize,
    pub temp_c: f64,
    pub ph: f64,
    pub ammonia: f64,
    pub nitrite: f64,
    pub nitrate: f64,
}

#[derive(Default)]
struct DayTotals {
    count: usize,
    temp_c: f64,
    ph: f64,
    ammonia: f64,
    nitrite: f64,
    nitrate: f64,
}

/// Groups readings by calendar day (UTC) and averages each day, oldest first.
pub fn daily_averages(readings: &[ParameterReading]) -> Vec<DailyAverage> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for reading in readings {
        let totals = days.entry(reading.recorded_at.date_naive()).or_default();
        let p = &reading.parameters;
        totals.count += 1;
        totals.temp_c += p.temp_c;
        totals.ph += p.ph;
        totals.ammonia += p.ammonia;
        totals.nitrite += p.nitrite;
        totals.nitrate += p.nitrate;
    }

    days.into_iter()
        .map(|(date, totals)| {
            let n = totals.count as f64;
            DailyAverage {
                date,
                readings: totals.count,
                temp_c: totals.temp_c / n,
                ph: totals.ph / n,
                ammonia: totals.ammonia / n,
                nitrite: totals.nitrite / n,
                nitrate: totals.nitrate / n,
            }
        })
        .collect()
}

/// The summary shown at the top of a user's dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tanks: usize,
    pub alerts: AlertCounts,
    pub average_health: f64,
    pub scores: Vec<TankHealthScore>,
}

impl DashboardStats {
    pub fn compute(
        config: &EvaluatorConfig,
        tanks: &[Tank],
        history: &[MaintenanceLog],
        now: DateTime<Utc>,
    ) -> Self {
        let alerts = AlertEvaluator::new(config.alerts.clone()).evaluate_all(tanks, now);
        let scores = HealthCalculator::new(config.health.clone()).score_all(tanks, history, now);
        Self {
            total_tanks: tanks.len(),
            alerts: AlertCounts::from_alerts(&alerts),
            average_health: average_health(&scores),
            scores,
        }
    }
}
