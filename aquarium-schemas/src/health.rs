use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 0-100 summary of a tank's condition, derived from its parameters and
/// maintenance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankHealthScore {
    pub tank_id: String,
    pub tank_name: String,
    pub score: u8,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_water_change: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_next_water_change: Option<i64>,
}
