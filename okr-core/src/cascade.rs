//! Coordinated deletes that keep the hierarchy free of orphans.
//!
//! Deletes run leaf to root, one store call at a time. There is no rollback:
//! if a step fails, the steps before it stay applied and the error is
//! returned as is. A retry of the same delete finishes the job.

use uuid::Uuid;

use crate::error::{Error, RecordKind, Result};
use crate::store::HierarchyStore;

/// Delete an objective with all of its key results and their initiatives.
///
/// Children are removed even when the objective row itself is already gone;
/// `NotFound` is reported only after that sweep.
pub fn delete_objective<S: HierarchyStore + ?Sized>(store: &S, id: Uuid) -> Result<()> {
    let key_results = store.find_key_results_by_objective(id)?;

    let mut initiatives = 0;
    for kr in &key_results {
        initiatives += store.delete_initiatives_by_key_result(kr.id)?;
    }
    let key_results = store.delete_key_results_by_objective(id)?;

    if store.delete_objective(id)? == 0 {
        return Err(Error::not_found(RecordKind::Objective, id));
    }

    tracing::info!(
        objective_id = %id,
        key_results,
        initiatives,
        "Deleted objective"
    );
    Ok(())
}

/// Delete a key result and its initiatives.
pub fn delete_key_result<S: HierarchyStore + ?Sized>(store: &S, id: Uuid) -> Result<()> {
    let initiatives = store.delete_initiatives_by_key_result(id)?;

    if store.delete_key_result(id)? == 0 {
        return Err(Error::not_found(RecordKind::KeyResult, id));
    }

    tracing::info!(key_result_id = %id, initiatives, "Deleted key result");
    Ok(())
}

pub fn delete_initiative<S: HierarchyStore + ?Sized>(store: &S, id: Uuid) -> Result<()> {
    if store.delete_initiative(id)? == 0 {
        return Err(Error::not_found(RecordKind::Initiative, id));
    }
    tracing::info!(initiative_id = %id, "Deleted initiative");
    Ok(())
}
