//! Record creation and mutation.
//!
//! Creates keep a caller-supplied id or assign a fresh one, and stamp both
//! timestamps; an id already in use is rejected. Children are validated
//! against their parent before insert. Replaces overwrite every mutable field but
//! keep the id, the parent link and `created_at`. Deletes live in
//! [`crate::cascade`].

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, RecordKind, Result};
use crate::hierarchy;
use crate::models::*;
use crate::progress;
use crate::store::{HierarchyStore, InitiativePatch, KeyResultPatch, ObjectivePatch};

fn require_title(kind: RecordKind, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation(format!("{} title cannot be empty", kind)));
    }
    Ok(())
}

/// Resolve the id of a record about to be created.
fn claim_id(
    kind: RecordKind,
    requested: Option<Uuid>,
    taken: impl FnOnce(Uuid) -> Result<bool>,
) -> Result<Uuid> {
    let Some(id) = requested else {
        return Ok(Uuid::new_v4());
    };
    if taken(id)? {
        return Err(Error::Validation(format!(
            "{} id {} is already in use",
            kind, id
        )));
    }
    Ok(id)
}

pub fn create_objective<S: HierarchyStore + ?Sized>(
    store: &S,
    input: ObjectiveInput,
) -> Result<ObjectiveWithProgress> {
    require_title(RecordKind::Objective, &input.title)?;
    let id = claim_id(RecordKind::Objective, input.id, |id| {
        Ok(store.find_objective(id)?.is_some())
    })?;
    let now = Utc::now();
    let objective = Objective {
        id,
        title: input.title,
        description: input.description,
        owner: input.owner,
        deadline: input.deadline,
        status: input.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    store.insert_objective(&objective)?;
    Ok(ObjectiveWithProgress {
        objective,
        progress: 0.0,
    })
}

/// Full replace of an objective. Returns the refreshed detail view.
pub fn replace_objective<S: HierarchyStore + ?Sized>(
    store: &S,
    id: Uuid,
    input: ObjectiveInput,
) -> Result<ObjectiveDetail> {
    require_title(RecordKind::Objective, &input.title)?;
    let patch = ObjectivePatch {
        title: Some(input.title),
        description: Some(input.description),
        owner: Some(input.owner),
        deadline: Some(input.deadline),
        status: Some(input.status.unwrap_or_default()),
        updated_at: Some(Utc::now()),
    };
    if store.update_objective(id, &patch)? == 0 {
        return Err(Error::not_found(RecordKind::Objective, id));
    }
    hierarchy::objective_detail(store, id)
}

/// Build a key result record from input, applying the 0 / 100 / 0 and
/// metric defaults. Uses the input id when set, a fresh one otherwise.
pub fn new_key_result(objective_id: Uuid, input: KeyResultInput) -> KeyResult {
    let now = Utc::now();
    KeyResult {
        id: input.id.unwrap_or_else(Uuid::new_v4),
        objective_id,
        title: input.title,
        description: input.description,
        result_type: input.result_type.unwrap_or_default(),
        start_value: input.start_value.unwrap_or(DEFAULT_START_VALUE),
        target_value: input.target_value.unwrap_or(DEFAULT_TARGET_VALUE),
        current_value: input.current_value.unwrap_or(DEFAULT_CURRENT_VALUE),
        unit: input.unit,
        owner: input.owner,
        created_at: now,
        updated_at: now,
    }
}

/// Create a key result under an existing objective.
///
/// Fails with `Validation` when the objective does not exist.
pub fn create_key_result<S: HierarchyStore + ?Sized>(
    store: &S,
    objective_id: Uuid,
    input: KeyResultInput,
) -> Result<KeyResultDetail> {
    require_title(RecordKind::KeyResult, &input.title)?;
    if store.find_objective(objective_id)?.is_none() {
        return Err(Error::Validation(format!(
            "objective {} does not exist",
            objective_id
        )));
    }

    let id = claim_id(RecordKind::KeyResult, input.id, |id| {
        Ok(store.find_key_result(id)?.is_some())
    })?;
    let key_result = new_key_result(objective_id, KeyResultInput { id: Some(id), ..input });
    store.insert_key_result(&key_result)?;
    Ok(KeyResultDetail {
        progress: progress::key_result_progress(&key_result),
        key_result,
        initiatives: Vec::new(),
    })
}

pub fn replace_key_result<S: HierarchyStore + ?Sized>(
    store: &S,
    id: Uuid,
    input: KeyResultInput,
) -> Result<KeyResultWithProgress> {
    require_title(RecordKind::KeyResult, &input.title)?;
    let patch = KeyResultPatch {
        title: Some(input.title),
        description: Some(input.description),
        result_type: Some(input.result_type.unwrap_or_default()),
        start_value: Some(input.start_value.unwrap_or(DEFAULT_START_VALUE)),
        target_value: Some(input.target_value.unwrap_or(DEFAULT_TARGET_VALUE)),
        current_value: Some(input.current_value.unwrap_or(DEFAULT_CURRENT_VALUE)),
        unit: Some(input.unit),
        owner: Some(input.owner),
        updated_at: Some(Utc::now()),
    };
    update_key_result_with(store, id, &patch)
}

/// Progress-only update: sets `current_value` and bumps `updated_at`.
pub fn update_key_result_progress<S: HierarchyStore + ?Sized>(
    store: &S,
    id: Uuid,
    current_value: f64,
) -> Result<KeyResultWithProgress> {
    let patch = KeyResultPatch {
        current_value: Some(current_value),
        updated_at: Some(Utc::now()),
        ..Default::default()
    };
    update_key_result_with(store, id, &patch)
}

fn update_key_result_with<S: HierarchyStore + ?Sized>(
    store: &S,
    id: Uuid,
    patch: &KeyResultPatch,
) -> Result<KeyResultWithProgress> {
    if store.update_key_result(id, patch)? == 0 {
        return Err(Error::not_found(RecordKind::KeyResult, id));
    }
    // A concurrent delete can land between the update and this read.
    let key_result = store
        .find_key_result(id)?
        .ok_or_else(|| Error::not_found(RecordKind::KeyResult, id))?;
    Ok(progress::with_progress(key_result))
}

/// Create an initiative under an existing key result.
///
/// Fails with `Validation` when the key result does not exist.
pub fn create_initiative<S: HierarchyStore + ?Sized>(
    store: &S,
    key_result_id: Uuid,
    input: InitiativeInput,
) -> Result<Initiative> {
    require_title(RecordKind::Initiative, &input.title)?;
    if store.find_key_result(key_result_id)?.is_none() {
        return Err(Error::Validation(format!(
            "key result {} does not exist",
            key_result_id
        )));
    }

    let id = claim_id(RecordKind::Initiative, input.id, |id| {
        Ok(store.find_initiative(id)?.is_some())
    })?;
    let now = Utc::now();
    let initiative = Initiative {
        id,
        key_result_id,
        title: input.title,
        description: input.description,
        owner: input.owner,
        status: input.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    store.insert_initiative(&initiative)?;
    Ok(initiative)
}

pub fn replace_initiative<S: HierarchyStore + ?Sized>(
    store: &S,
    id: Uuid,
    input: InitiativeInput,
) -> Result<Initiative> {
    require_title(RecordKind::Initiative, &input.title)?;
    let patch = InitiativePatch {
        title: Some(input.title),
        description: Some(input.description),
        owner: Some(input.owner),
        status: Some(input.status.unwrap_or_default()),
        updated_at: Some(Utc::now()),
    };
    if store.update_initiative(id, &patch)? == 0 {
        return Err(Error::not_found(RecordKind::Initiative, id));
    }
    store
        .find_initiative(id)?
        .ok_or_else(|| Error::not_found(RecordKind::Initiative, id))
}
