//! Read-only nested views: objective detail, objective list, dashboard.

use uuid::Uuid;

use crate::error::{Error, RecordKind, Result};
use crate::models::*;
use crate::progress;
use crate::store::HierarchyStore;

/// Objective with progress, each key result with progress and its initiatives.
pub fn objective_detail<S: HierarchyStore + ?Sized>(store: &S, id: Uuid) -> Result<ObjectiveDetail> {
    let objective = store
        .find_objective(id)?
        .ok_or_else(|| Error::not_found(RecordKind::Objective, id))?;

    let key_results = store.find_key_results_by_objective(id)?;
    let progress = progress::mean_progress(&key_results);

    let mut details = Vec::with_capacity(key_results.len());
    for key_result in key_results {
        let initiatives = store.find_initiatives_by_key_result(key_result.id)?;
        details.push(KeyResultDetail {
            progress: progress::key_result_progress(&key_result),
            key_result,
            initiatives,
        });
    }

    Ok(ObjectiveDetail {
        objective,
        progress,
        key_results: details,
    })
}

pub fn list_objectives<S: HierarchyStore + ?Sized>(store: &S) -> Result<Vec<ObjectiveWithProgress>> {
    store
        .list_objectives()?
        .into_iter()
        .map(|objective| -> Result<ObjectiveWithProgress> {
            let progress = progress::objective_progress(store, objective.id)?;
            Ok(ObjectiveWithProgress {
                objective,
                progress,
            })
        })
        .collect()
}

/// Every objective with progress and key result count, plus the average.
pub fn dashboard<S: HierarchyStore + ?Sized>(store: &S) -> Result<Dashboard> {
    let mut objectives = Vec::new();
    for objective in store.list_objectives()? {
        let progress = progress::objective_progress(store, objective.id)?;
        let key_results_count = store.count_key_results_by_objective(objective.id)?;
        objectives.push(DashboardEntry {
            objective,
            progress,
            key_results_count,
        });
    }

    let total_objectives = objectives.len();
    let avg_progress = if total_objectives == 0 {
        0.0
    } else {
        objectives.iter().map(|o| o.progress).sum::<f64>() / total_objectives as f64
    };

    Ok(Dashboard {
        objectives,
        total_objectives,
        avg_progress,
    })
}
