//! Store wrapper that fails chosen calls, for exercising partial writes.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use okr_core::models::*;
use okr_core::store::{InitiativePatch, KeyResultPatch, ObjectivePatch};
use okr_core::{Error, HierarchyStore, InMemoryStore, Result};
use uuid::Uuid;

pub const INJECTED_FAILURE: &str = "disk I/O error";

/// Delegates to an [`InMemoryStore`], except that the Nth call (1-based) to
/// `insert_key_result` or `delete_key_results_by_objective` fails with
/// `Error::Storage(INJECTED_FAILURE)`. Later calls succeed again.
pub struct FailingStore {
    pub inner: InMemoryStore,
    fail_insert_key_result: Option<usize>,
    fail_delete_key_results: Option<usize>,
    insert_key_result_calls: AtomicUsize,
    delete_key_results_calls: AtomicUsize,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_insert_key_result: None,
            fail_delete_key_results: None,
            insert_key_result_calls: AtomicUsize::new(0),
            delete_key_results_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_key_result_insert(nth: usize) -> Self {
        Self {
            fail_insert_key_result: Some(nth),
            ..Self::new()
        }
    }

    pub fn failing_key_result_sweep(nth: usize) -> Self {
        Self {
            fail_delete_key_results: Some(nth),
            ..Self::new()
        }
    }
}

fn trip(calls: &AtomicUsize, fail_on: Option<usize>) -> Result<()> {
    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
    if fail_on == Some(call) {
        return Err(Error::Storage(INJECTED_FAILURE.into()));
    }
    Ok(())
}

impl HierarchyStore for FailingStore {
    fn insert_objective(&self, objective: &Objective) -> Result<Uuid> {
        self.inner.insert_objective(objective)
    }

    fn find_objective(&self, id: Uuid) -> Result<Option<Objective>> {
        self.inner.find_objective(id)
    }

    fn list_objectives(&self) -> Result<Vec<Objective>> {
        self.inner.list_objectives()
    }

    fn update_objective(&self, id: Uuid, patch: &ObjectivePatch) -> Result<usize> {
        self.inner.update_objective(id, patch)
    }

    fn delete_objective(&self, id: Uuid) -> Result<usize> {
        self.inner.delete_objective(id)
    }

    fn insert_key_result(&self, key_result: &KeyResult) -> Result<Uuid> {
        trip(&self.insert_key_result_calls, self.fail_insert_key_result)?;
        self.inner.insert_key_result(key_result)
    }

    fn find_key_result(&self, id: Uuid) -> Result<Option<KeyResult>> {
        self.inner.find_key_result(id)
    }

    fn find_key_results_by_objective(&self, objective_id: Uuid) -> Result<Vec<KeyResult>> {
        self.inner.find_key_results_by_objective(objective_id)
    }

    fn update_key_result(&self, id: Uuid, patch: &KeyResultPatch) -> Result<usize> {
        self.inner.update_key_result(id, patch)
    }

    fn delete_key_result(&self, id: Uuid) -> Result<usize> {
        self.inner.delete_key_result(id)
    }

    fn delete_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        trip(&self.delete_key_results_calls, self.fail_delete_key_results)?;
        self.inner.delete_key_results_by_objective(objective_id)
    }

    fn count_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        self.inner.count_key_results_by_objective(objective_id)
    }

    fn insert_initiative(&self, initiative: &Initiative) -> Result<Uuid> {
        self.inner.insert_initiative(initiative)
    }

    fn find_initiative(&self, id: Uuid) -> Result<Option<Initiative>> {
        self.inner.find_initiative(id)
    }

    fn find_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<Vec<Initiative>> {
        self.inner.find_initiatives_by_key_result(key_result_id)
    }

    fn update_initiative(&self, id: Uuid, patch: &InitiativePatch) -> Result<usize> {
        self.inner.update_initiative(id, patch)
    }

    fn delete_initiative(&self, id: Uuid) -> Result<usize> {
        self.inner.delete_initiative(id)
    }

    fn delete_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        self.inner.delete_initiatives_by_key_result(key_result_id)
    }

    fn count_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        self.inner.count_initiatives_by_key_result(key_result_id)
    }
}
