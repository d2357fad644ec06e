use anyhow::{bail, Context, Result};
use aquarium_core::{
    history,
    reminders::NotificationPermission,
    validation, EvaluatorConfig,
};
use aquarium_schemas::{
    file_formats::{MaintenanceFile, TankFile},
    maintenance::MaintenanceLog,
    parameters::ParameterReading,
    tank::Tank,
};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

/// Name of the parameter history file inside the data directory.
pub const READINGS_FILE: &str = "readings.csv";

/// Settings read from the optional YAML config file. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub evaluators: EvaluatorConfig,
    pub poll_interval_secs: u64,
    pub notification_permission: NotificationPermission,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            evaluators: EvaluatorConfig::default(),
            poll_interval_secs: 60,
            notification_permission: NotificationPermission::Granted,
        }
    }
}

impl AppConfig {
    /// Loads the config file if one was given, otherwise uses the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        if config.poll_interval_secs == 0 {
            bail!("poll_interval_secs in {:?} must be at least 1", path);
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Everything exported from the backend for one user, validated and typed.
pub struct AquariumData {
    pub tanks: Vec<Tank>,
    pub maintenance_logs: Vec<MaintenanceLog>,
    pub readings: Vec<ParameterReading>,
}

impl AquariumData {
    /// Loads tanks, maintenance logs and the reading history from `data_dir`.
    /// Any failure aborts the whole load.
    pub fn load(data_dir: &Path) -> Result<Self> {
        log::info!("Loading aquarium data from {:?}", data_dir);

        let rows = load_yaml_files(data_dir.join("tanks"), |file: TankFile| file.tanks)?;
        let mut tanks = validation::validate_tanks(&rows)
            .with_context(|| format!("Invalid tank data in {:?}", data_dir.join("tanks")))?;

        let maintenance_dir = data_dir.join("maintenance");
        let maintenance_logs = if maintenance_dir.is_dir() {
            load_yaml_files(maintenance_dir, |file: MaintenanceFile| file.maintenance_logs)?
        } else {
            Vec::new()
        };

        let readings_path = data_dir.join(READINGS_FILE);
        let readings = history::load_readings(&readings_path)
            .with_context(|| format!("Failed to load readings from {:?}", readings_path))?;
        apply_latest_readings(&mut tanks, &readings);

        log::info!(
            "Loaded {} tanks, {} maintenance entries, {} readings",
            tanks.len(),
            maintenance_logs.len(),
            readings.len()
        );
        Ok(Self {
            tanks,
            maintenance_logs,
            readings,
        })
    }

    pub fn tank(&self, tank_id: &str) -> Result<&Tank> {
        self.tanks
            .iter()
            .find(|t| t.id == tank_id)
            .with_context(|| format!("No tank with id '{}'", tank_id))
    }

    /// All tanks, or just the one asked for.
    pub fn select_tanks(&self, tank_id: Option<&str>) -> Result<Vec<Tank>> {
        match tank_id {
            Some(id) => Ok(vec![self.tank(id)?.clone()]),
            None => Ok(self.tanks.clone()),
        }
    }

    pub fn readings_for(&self, tank_id: &str) -> Vec<ParameterReading> {
        self.readings
            .iter()
            .filter(|r| r.tank_id == tank_id)
            .cloned()
            .collect()
    }
}

/// The newest logged reading of a tank supersedes the snapshot it was
/// exported with.
fn apply_latest_readings(tanks: &mut [Tank], readings: &[ParameterReading]) {
    for tank in tanks {
        let latest = readings
            .iter()
            .filter(|r| r.tank_id == tank.id)
            .max_by_key(|r| r.recorded_at);
        if let Some(reading) = latest {
            log::debug!("Tank '{}' uses the reading from {}", tank.id, reading.recorded_at);
            tank.parameters = reading.parameters.clone();
        }
    }
}

/// Reads every YAML file in a directory, in file name order, and concatenates
/// the items extracted from each file wrapper.
fn load_yaml_files<P, F, E, T>(dir_path: P, extract_vec: E) -> Result<Vec<T>>
where
    P: AsRef<Path>,
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct (e.g., TankFile)
    E: Fn(F) -> Vec<T>,
{
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path.as_ref())
        .with_context(|| format!("Failed to read directory: {:?}", dir_path.as_ref()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_wrapper: F = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        items.extend(extract_vec(file_wrapper));
    }
    Ok(items)
}
