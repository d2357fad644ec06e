use crate::thresholds::HealthPolicy;
use aquarium_schemas::{
    health::TankHealthScore,
    maintenance::{MaintenanceLog, MaintenanceType},
    tank::Tank,
};
use chrono::{DateTime, Utc};

const BASELINE_SCORE: i32 = 100;

/// Scores a tank from 0 to 100 by subtracting a fixed penalty per detected issue.
#[derive(Debug, Clone, Default)]
pub struct HealthCalculator {
    policy: HealthPolicy,
}

impl HealthCalculator {
    pub fn new(policy: HealthPolicy) -> Self {
        Self { policy }
    }

    pub fn score(&self, tank: &Tank, history: &[MaintenanceLog]) -> TankHealthScore {
        self.score_at(tank, history, Utc::now())
    }

    /// Penalties are cumulative and applied in a fixed order so the issue
    /// list always reads the same way. Log entries for other tanks are ignored.
    pub fn score_at(
        &self,
        tank: &Tank,
        history: &[MaintenanceLog],
        now: DateTime<Utc>,
    ) -> TankHealthScore {
        let policy = &self.policy;
        let p = &tank.parameters;
        let mut score = BASELINE_SCORE;
        let mut issues = Vec::new();

        let mut penalize = |penalty: i32, issue: &str| {
            score = score.saturating_sub(penalty);
            issues.push(issue.to_string());
        };

        if p.ammonia > 0.0 {
            penalize(policy.ammonia_penalty, "Ammonia detected");
        }
        if p.nitrite > 0.0 {
            penalize(policy.nitrite_penalty, "Nitrite detected");
        }
        if p.nitrate > policy.nitrate_high {
            penalize(policy.nitrate_high_penalty, "High nitrate levels");
        } else if p.nitrate > policy.nitrate_elevated {
            penalize(policy.nitrate_elevated_penalty, "Elevated nitrate");
        }
        if tank.is_freshwater() && (p.ph < policy.ph_low || p.ph > policy.ph_high) {
            penalize(policy.ph_penalty, "pH outside ideal range");
        }
        if p.temp_c < policy.temp_low || p.temp_c > policy.temp_high {
            penalize(policy.temp_penalty, "Temperature outside typical range");
        }

        let last_water_change = latest_water_change(&tank.id, history);
        let mut days_until_next_water_change = None;
        if let Some(performed_at) = last_water_change {
            let days_since = (now - performed_at).num_days();
            if days_since > policy.water_change_overdue_days {
                penalize(policy.water_change_overdue_penalty, "Water change overdue");
            }
            days_until_next_water_change =
                Some(policy.water_change_cadence_days.saturating_sub(days_since).max(0));
        }

        TankHealthScore {
            tank_id: tank.id.clone(),
            tank_name: tank.name.clone(),
            score: score.clamp(0, 100) as u8,
            issues,
            last_water_change,
            days_until_next_water_change,
        }
    }

    pub fn score_all(
        &self,
        tanks: &[Tank],
        history: &[MaintenanceLog],
        now: DateTime<Utc>,
    ) -> Vec<TankHealthScore> {
        tanks
            .iter()
            .map(|tank| self.score_at(tank, history, now))
            .collect()
    }
}

fn latest_water_change(tank_id: &str, history: &[MaintenanceLog]) -> Option<DateTime<Utc>> {
    history
        .iter()
        .filter(|log| {
            log.tank_id == tank_id && log.maintenance_type == MaintenanceType::WaterChange
        })
        .map(|log| log.performed_at)
        .max()
}

/// Mean score across all tanks. No tanks averages to zero.
pub fn average_health(scores: &[TankHealthScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: f64 = scores.iter().map(|s| f64::from(s.score)).sum();
    total / scores.len() as f64
}
