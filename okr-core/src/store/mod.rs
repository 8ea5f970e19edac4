//! Keyed-record storage for the hierarchy.
//!
//! [`HierarchyStore`] is plain CRUD per record kind. It never cascades: the
//! deletion protocol lives in [`crate::cascade`].
//!
//! Implementations:
//! - [`crate::db::Database`]: SQLite, used by the server.
//! - [`InMemoryStore`]: map-backed, used by tests and fakes.

mod memory;

pub use memory::InMemoryStore;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Partial update of an objective. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ObjectivePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    /// `Some(None)` clears the deadline.
    pub deadline: Option<Option<NaiveDate>>,
    pub status: Option<ObjectiveStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObjectivePatch {
    pub fn apply(&self, objective: &mut Objective) {
        if let Some(title) = &self.title {
            objective.title = title.clone();
        }
        if let Some(description) = &self.description {
            objective.description = description.clone();
        }
        if let Some(owner) = &self.owner {
            objective.owner = owner.clone();
        }
        if let Some(deadline) = self.deadline {
            objective.deadline = deadline;
        }
        if let Some(status) = self.status {
            objective.status = status;
        }
        if let Some(updated_at) = self.updated_at {
            objective.updated_at = updated_at;
        }
    }
}

/// Partial update of a key result. The objective foreign key is not patchable.
#[derive(Debug, Clone, Default)]
pub struct KeyResultPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub result_type: Option<KeyResultType>,
    pub start_value: Option<f64>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub owner: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl KeyResultPatch {
    pub fn apply(&self, key_result: &mut KeyResult) {
        if let Some(title) = &self.title {
            key_result.title = title.clone();
        }
        if let Some(description) = &self.description {
            key_result.description = description.clone();
        }
        if let Some(result_type) = self.result_type {
            key_result.result_type = result_type;
        }
        if let Some(start_value) = self.start_value {
            key_result.start_value = start_value;
        }
        if let Some(target_value) = self.target_value {
            key_result.target_value = target_value;
        }
        if let Some(current_value) = self.current_value {
            key_result.current_value = current_value;
        }
        if let Some(unit) = &self.unit {
            key_result.unit = unit.clone();
        }
        if let Some(owner) = &self.owner {
            key_result.owner = owner.clone();
        }
        if let Some(updated_at) = self.updated_at {
            key_result.updated_at = updated_at;
        }
    }
}

/// Partial update of an initiative. The key result foreign key is not patchable.
#[derive(Debug, Clone, Default)]
pub struct InitiativePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub status: Option<InitiativeStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InitiativePatch {
    pub fn apply(&self, initiative: &mut Initiative) {
        if let Some(title) = &self.title {
            initiative.title = title.clone();
        }
        if let Some(description) = &self.description {
            initiative.description = description.clone();
        }
        if let Some(owner) = &self.owner {
            initiative.owner = owner.clone();
        }
        if let Some(status) = self.status {
            initiative.status = status;
        }
        if let Some(updated_at) = self.updated_at {
            initiative.updated_at = updated_at;
        }
    }
}

/// CRUD-by-identifier over objectives, key results and initiatives.
///
/// `update_*` return the matched count and `delete_*` the deleted count, so
/// callers decide what an absent record means.
pub trait HierarchyStore: Send + Sync {
    // Objectives
    fn insert_objective(&self, objective: &Objective) -> Result<Uuid>;
    fn find_objective(&self, id: Uuid) -> Result<Option<Objective>>;
    fn list_objectives(&self) -> Result<Vec<Objective>>;
    fn update_objective(&self, id: Uuid, patch: &ObjectivePatch) -> Result<usize>;
    fn delete_objective(&self, id: Uuid) -> Result<usize>;

    // Key results, parent = objective
    fn insert_key_result(&self, key_result: &KeyResult) -> Result<Uuid>;
    fn find_key_result(&self, id: Uuid) -> Result<Option<KeyResult>>;
    fn find_key_results_by_objective(&self, objective_id: Uuid) -> Result<Vec<KeyResult>>;
    fn update_key_result(&self, id: Uuid, patch: &KeyResultPatch) -> Result<usize>;
    fn delete_key_result(&self, id: Uuid) -> Result<usize>;
    fn delete_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize>;
    fn count_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize>;

    // Initiatives, parent = key result
    fn insert_initiative(&self, initiative: &Initiative) -> Result<Uuid>;
    fn find_initiative(&self, id: Uuid) -> Result<Option<Initiative>>;
    fn find_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<Vec<Initiative>>;
    fn update_initiative(&self, id: Uuid, patch: &InitiativePatch) -> Result<usize>;
    fn delete_initiative(&self, id: Uuid) -> Result<usize>;
    fn delete_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize>;
    fn count_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize>;
}
