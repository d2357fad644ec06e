use crate::parameters::WaterParameterSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterType {
    Freshwater,
    Saltwater,
    Brackish,
}

impl WaterType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "freshwater" => Some(Self::Freshwater),
            "saltwater" => Some(Self::Saltwater),
            "brackish" => Some(Self::Brackish),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freshwater => "freshwater",
            Self::Saltwater => "saltwater",
            Self::Brackish => "brackish",
        }
    }
}

impl fmt::Display for WaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InhabitantKind {
    Fish,
    Plant,
}

/// A reference into the species database together with how many live in the tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inhabitant {
    pub species_id: String,
    pub kind: InhabitantKind,
    pub quantity: u32,
}

/// A single aquarium owned by one user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tank {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub water_type: WaterType,
    /// Volume in liters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// The most recent snapshot logged for this tank.
    pub parameters: WaterParameterSnapshot,
    #[serde(default)]
    pub inhabitants: Vec<Inhabitant>,
}

impl Tank {
    pub fn is_freshwater(&self) -> bool {
        self.water_type == WaterType::Freshwater
    }
}
