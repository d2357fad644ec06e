use crate::maintenance::MaintenanceLog;
use serde::Deserialize;

/// Tank rows as exported from the backend. Rows stay untyped here and are
/// validated into `Tank` records before use.
#[derive(Debug, Deserialize)]
pub struct TankFile {
    pub schema_version: String,
    pub tanks: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceFile {
    pub schema_version: String,
    pub maintenance_logs: Vec<MaintenanceLog>,
}
