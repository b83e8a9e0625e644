use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a material movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Inflow,
    Outflow,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inflow => "inflow",
            MovementKind::Outflow => "outflow",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    /// Accepts the canonical labels and the legacy `entrada`/`saida` ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflow" | "entrada" => Ok(MovementKind::Inflow),
            "outflow" | "saida" => Ok(MovementKind::Outflow),
            other => Err(format!("unknown movement kind '{}'", other)),
        }
    }
}

/// One inflow or outflow of a material at an operational unit.
///
/// Quantity follows the sign convention: positive = inflow, negative =
/// outflow. Anomalous injections may carry either sign regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    pub unit: String,
    pub material: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub unit_cost: f64,
    pub movement_value: f64,
}

impl MovementRecord {
    /// Create a record, deriving `movement_value` from quantity and cost
    pub fn new(
        date: NaiveDate,
        unit: impl Into<String>,
        material: impl Into<String>,
        kind: MovementKind,
        quantity: i64,
        unit_cost: f64,
    ) -> Self {
        Self {
            date,
            unit: unit.into(),
            material: material.into(),
            kind,
            quantity,
            unit_cost,
            movement_value: quantity as f64 * unit_cost,
        }
    }

    /// Statistical partition this record belongs to
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(&self.unit, &self.material)
    }
}

/// (unit, material) pair. Every statistic is computed within one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub unit: String,
    pub material: String,
}

impl GroupKey {
    pub fn new(unit: &str, material: &str) -> Self {
        Self {
            unit: unit.to_string(),
            material: material.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unit, self.material)
    }
}
