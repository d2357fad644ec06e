use crate::error::AquariumError;
use aquarium_schemas::parameters::{ParameterReading, WaterParameterSnapshot};
use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// One row of the parameter history CSV.
#[derive(Debug, Serialize, Deserialize)]
struct ReadingRecord {
    tank_id: String,
    recorded_at: DateTime<Utc>,
    temp_c: f64,
    ph: f64,
    ammonia: f64,
    nitrite: f64,
    nitrate: f64,
    gh: Option<f64>,
    kh: Option<f64>,
    tds: Option<f64>,
    salinity: Option<f64>,
}

impl From<ReadingRecord> for ParameterReading {
    fn from(record: ReadingRecord) -> Self {
        ParameterReading {
            tank_id: record.tank_id,
            recorded_at: record.recorded_at,
            parameters: WaterParameterSnapshot {
                temp_c: record.temp_c,
                ph: record.ph,
                ammonia: record.ammonia,
                nitrite: record.nitrite,
                nitrate: record.nitrate,
                gh: record.gh,
                kh: record.kh,
                tds: record.tds,
                salinity: record.salinity,
            },
        }
    }
}

impl From<&ParameterReading> for ReadingRecord {
    fn from(reading: &ParameterReading) -> Self {
        let p = &reading.parameters;
        ReadingRecord {
            tank_id: reading.tank_id.clone(),
            recorded_at: reading.recorded_at,
            temp_c: p.temp_c,
            ph: p.ph,
            ammonia: p.ammonia,
            nitrite: p.nitrite,
            nitrate: p.nitrate,
            gh: p.gh,
            kh: p.kh,
            tds: p.tds,
            salinity: p.salinity,
        }
    }
}

/// Reads the whole parameter history. A missing file is an empty history.
pub fn load_readings(path: &Path) -> Result<Vec<ParameterReading>, AquariumError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let display = path.display().to_string();
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| AquariumError::CsvError(display.clone(), e))?;

    let mut readings = Vec::new();
    for result in reader.deserialize() {
        let record: ReadingRecord =
            result.map_err(|e| AquariumError::CsvError(display.clone(), e))?;
        readings.push(record.into());
    }
    Ok(readings)
}

/// Appends newly logged readings to the history CSV.
pub struct ReadingLogger {
    writer: Writer<File>,
    path: String,
}

impl ReadingLogger {
    pub fn open(path: &Path) -> Result<Self, AquariumError> {
        let display = path.display().to_string();
        let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AquariumError::FileIO(display.clone(), e))?;
        let writer = WriterBuilder::new().has_headers(is_new).from_writer(file);
        Ok(Self { writer, path: display })
    }

    pub fn log_reading(&mut self, reading: &ParameterReading) -> Result<(), AquariumError> {
        self.writer
            .serialize(ReadingRecord::from(reading))
            .map_err(|e| AquariumError::CsvError(self.path.clone(), e))?;
        self.writer
            .flush()
            .map_err(|e| AquariumError::FileIO(self.path.clone(), e))?;
        Ok(())
    }
}
