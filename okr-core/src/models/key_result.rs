use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::initiative::Initiative;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyResult {
    pub id: Uuid,
    pub objective_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub result_type: KeyResultType,
    pub start_value: f64,
    pub target_value: f64,
    /// Unbounded: may be negative or overshoot the target.
    pub current_value: f64,
    pub unit: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyResultType {
    #[default]
    Metric,
    Binary,
}

impl KeyResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Binary => "binary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "metric" => Some(Self::Metric),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

pub const DEFAULT_START_VALUE: f64 = 0.0;
pub const DEFAULT_TARGET_VALUE: f64 = 100.0;
pub const DEFAULT_CURRENT_VALUE: f64 = 0.0;

/// Body of a key result create or full replace. Absent numbers take the
/// 0 / 100 / 0 defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyResultInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub result_type: Option<KeyResultType>,
    pub start_value: Option<f64>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub owner: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateProgressInput {
    pub current_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyResultWithProgress {
    #[serde(flatten)]
    pub key_result: KeyResult,
    pub progress: f64,
}

/// A key result as it appears inside an objective detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyResultDetail {
    #[serde(flatten)]
    pub key_result: KeyResult,
    pub progress: f64,
    pub initiatives: Vec<Initiative>,
}
