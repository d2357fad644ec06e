//! Converts untyped backend rows into typed domain records.
//!
//! Required fields must be present, numeric and non-negative. Optional
//! parameters that are missing or malformed are treated as absent so that a
//! bad optional reading never blocks evaluation.

use crate::error::AquariumError;
use aquarium_schemas::{
    parameters::WaterParameterSnapshot,
    tank::{Inhabitant, InhabitantKind, Tank, WaterType},
};
use log::warn;
use serde_json::{Map, Value};

pub fn validate_tank(row: &Value) -> Result<Tank, AquariumError> {
    let obj = row
        .as_object()
        .ok_or_else(|| AquariumError::InvalidRecord("tank row is not an object".to_string()))?;

    let id = required_id(obj)?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| invalid(&id, "missing name"))?
        .to_string();
    let water_type = match obj.get("type").and_then(Value::as_str) {
        Some(value) => WaterType::parse(value)
            .ok_or_else(|| invalid(&id, &format!("unknown water type '{}'", value)))?,
        None => return Err(invalid(&id, "missing water type")),
    };
    let params = obj
        .get("parameters")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(&id, "missing parameters"))?;

    let parameters = WaterParameterSnapshot {
        temp_c: required_number(params, "tempC", &id)?,
        ph: required_number(params, "ph", &id)?,
        ammonia: required_number(params, "ammonia", &id)?,
        nitrite: required_number(params, "nitrite", &id)?,
        nitrate: required_number(params, "nitrate", &id)?,
        gh: optional_number(params.get("gh")),
        kh: optional_number(params.get("kh")),
        tds: optional_number(params.get("tds")),
        salinity: optional_number(params.get("salinity")),
    };

    let inhabitants = obj
        .get("inhabitants")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let inhabitant = validate_inhabitant(row);
                    if inhabitant.is_none() {
                        warn!("Skipping malformed inhabitant in tank '{}': {}", id, row);
                    }
                    inhabitant
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Tank {
        volume: optional_number(obj.get("volume")),
        id,
        name,
        water_type,
        parameters,
        inhabitants,
    })
}

/// Validates every row. A single bad row fails the whole batch.
pub fn validate_tanks(rows: &[Value]) -> Result<Vec<Tank>, AquariumError> {
    rows.iter().map(validate_tank).collect()
}

fn validate_inhabitant(row: &Value) -> Option<Inhabitant> {
    let obj = row.as_object()?;
    let species_id = obj
        .get("speciesId")
        .or_else(|| obj.get("species_id"))
        .and_then(Value::as_str)?
        .to_string();
    let kind = match obj.get("kind").and_then(Value::as_str)? {
        "fish" => InhabitantKind::Fish,
        "plant" => InhabitantKind::Plant,
        _ => return None,
    };
    let quantity = optional_number(obj.get("quantity")).unwrap_or(1.0) as u32;
    Some(Inhabitant {
        species_id,
        kind,
        quantity,
    })
}

fn required_id(obj: &Map<String, Value>) -> Result<String, AquariumError> {
    match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(AquariumError::InvalidRecord("tank row has no id".to_string())),
    }
}

fn required_number(
    params: &Map<String, Value>,
    key: &str,
    tank_id: &str,
) -> Result<f64, AquariumError> {
    let value = params
        .get(key)
        .and_then(as_number)
        .ok_or_else(|| {
            invalid(tank_id, &format!("parameter '{}' is missing or not a number", key))
        })?;
    if value < 0.0 {
        return Err(invalid(tank_id, &format!("parameter '{}' is negative", key)));
    }
    Ok(value)
}

fn optional_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(as_number).filter(|v| *v >= 0.0)
}

/// Decimal columns sometimes arrive as strings.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn invalid(tank_id: &str, reason: &str) -> AquariumError {
    AquariumError::InvalidRecord(format!("tank '{}': {}", tank_id, reason))
}
