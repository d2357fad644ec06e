use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    WaterChange,
    ParameterCheck,
    FilterClean,
}

impl ReminderType {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderType::WaterChange => "Water Change",
            ReminderType::ParameterCheck => "Parameter Check",
            ReminderType::FilterClean => "Filter Cleaning",
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Number of days a completed reminder is pushed forward by.
    pub fn days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Biweekly => 14,
            Frequency::Monthly => 30,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::days(self.days())
    }
}

/// A recurring maintenance reminder for one tank, persisted on the local device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub tank_id: String,
    pub tank_name: String,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: String,
    pub message: String,
    /// Serialized as an RFC 3339 string.
    pub next_date: DateTime<Utc>,
    pub frequency: Frequency,
    pub enabled: bool,
}
