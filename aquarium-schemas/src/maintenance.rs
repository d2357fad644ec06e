use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceType {
    WaterChange,
    FilterCleaning,
    EquipmentMaintenance,
    Medication,
    Other,
}

/// A maintenance event recorded against a tank. Entries are immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: String,
    pub tank_id: String,
    #[serde(rename = "type")]
    pub maintenance_type: MaintenanceType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Share of the tank volume replaced, for water changes.
    #[serde(default)]
    pub water_change_percent: Option<f64>,
    pub performed_at: DateTime<Utc>,
}
