use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One measurement of a tank's water chemistry at a point in time.
///
/// Snapshots are never mutated; a newer reading replaces the tank's current
/// snapshot instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterParameterSnapshot {
    /// Water temperature in °C.
    pub temp_c: f64,
    pub ph: f64,
    /// Ammonia (NH3/NH4) in ppm.
    pub ammonia: f64,
    /// Nitrite (NO2) in ppm.
    pub nitrite: f64,
    /// Nitrate (NO3) in ppm.
    pub nitrate: f64,
    /// General hardness in °dGH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gh: Option<f64>,
    /// Carbonate hardness in °dKH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kh: Option<f64>,
    /// Total dissolved solids in ppm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tds: Option<f64>,
    /// Salinity in ppt. Only meaningful for saltwater tanks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<f64>,
}

/// A logged snapshot for a tank, as kept in the parameter history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterReading {
    pub tank_id: String,
    pub recorded_at: DateTime<Utc>,
    pub parameters: WaterParameterSnapshot,
}
