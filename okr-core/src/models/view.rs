use serde::{Deserialize, Serialize};

use super::key_result::KeyResultDetail;
use super::objective::Objective;

/// Read-only nested view of one objective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectiveDetail {
    #[serde(flatten)]
    pub objective: Objective,
    pub progress: f64,
    pub key_results: Vec<KeyResultDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardEntry {
    #[serde(flatten)]
    pub objective: Objective,
    pub progress: f64,
    pub key_results_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub objectives: Vec<DashboardEntry>,
    pub total_objectives: usize,
    pub avg_progress: f64,
}
