use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Critical => "critical",
            AlertLevel::Warning => "warning",
            AlertLevel::Info => "info",
        };
        f.write_str(label)
    }
}

/// An advisory derived from a tank's current water parameters.
///
/// Alerts are recomputed on every evaluation and never stored. The `id` is
/// `"{tank_id}-{parameter}"` so the same condition keeps the same identity
/// across evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterAlert {
    pub id: String,
    pub tank_id: String,
    pub tank_name: String,
    pub level: AlertLevel,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub parameter: String,
    pub current_value: f64,
    pub actions: Vec<String>,
    pub created_at: DateTime<Utc>,
}
