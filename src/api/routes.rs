use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use okr_core::generation::{CandidateObjective, GenerationOrchestrator, GenerationRequest};
use okr_core::models::*;
use okr_core::{cascade, hierarchy, lifecycle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ApiResult, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now() }))
}

fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted successfully", what) }))
}

// Objectives

pub async fn list_objectives(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ObjectiveWithProgress>>> {
    Ok(Json(hierarchy::list_objectives(state.store.as_ref())?))
}

pub async fn create_objective(
    State(state): State<AppState>,
    Json(input): Json<ObjectiveInput>,
) -> ApiResult<(StatusCode, Json<ObjectiveWithProgress>)> {
    let objective = lifecycle::create_objective(state.store.as_ref(), input)?;
    Ok((StatusCode::CREATED, Json(objective)))
}

pub async fn get_objective(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ObjectiveDetail>> {
    Ok(Json(hierarchy::objective_detail(state.store.as_ref(), id)?))
}

pub async fn replace_objective(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ObjectiveInput>,
) -> ApiResult<Json<ObjectiveDetail>> {
    Ok(Json(lifecycle::replace_objective(state.store.as_ref(), id, input)?))
}

pub async fn delete_objective(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    cascade::delete_objective(state.store.as_ref(), id)?;
    Ok(deleted("Objective"))
}

// Key results

pub async fn create_key_result(
    State(state): State<AppState>,
    Path(objective_id): Path<Uuid>,
    Json(input): Json<KeyResultInput>,
) -> ApiResult<(StatusCode, Json<KeyResultDetail>)> {
    let key_result = lifecycle::create_key_result(state.store.as_ref(), objective_id, input)?;
    Ok((StatusCode::CREATED, Json(key_result)))
}

pub async fn replace_key_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<KeyResultInput>,
) -> ApiResult<Json<KeyResultWithProgress>> {
    Ok(Json(lifecycle::replace_key_result(state.store.as_ref(), id, input)?))
}

pub async fn update_key_result_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProgressInput>,
) -> ApiResult<Json<KeyResultWithProgress>> {
    Ok(Json(lifecycle::update_key_result_progress(
        state.store.as_ref(),
        id,
        input.current_value,
    )?))
}

pub async fn delete_key_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    cascade::delete_key_result(state.store.as_ref(), id)?;
    Ok(deleted("Key result"))
}

// Initiatives

pub async fn create_initiative(
    State(state): State<AppState>,
    Path(key_result_id): Path<Uuid>,
    Json(input): Json<InitiativeInput>,
) -> ApiResult<(StatusCode, Json<Initiative>)> {
    let initiative = lifecycle::create_initiative(state.store.as_ref(), key_result_id, input)?;
    Ok((StatusCode::CREATED, Json(initiative)))
}

pub async fn replace_initiative(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<InitiativeInput>,
) -> ApiResult<Json<Initiative>> {
    Ok(Json(lifecycle::replace_initiative(state.store.as_ref(), id, input)?))
}

pub async fn delete_initiative(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    cascade::delete_initiative(state.store.as_ref(), id)?;
    Ok(deleted("Initiative"))
}

// Dashboard

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(hierarchy::dashboard(state.store.as_ref())?))
}

// AI generation

#[derive(Debug, Deserialize)]
pub struct GenerateInput {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateOutput {
    Draft {
        persisted: bool,
        objectives: Vec<CandidateObjective>,
    },
    Persisted {
        persisted: bool,
        objectives: Vec<ObjectiveDetail>,
    },
}

pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateInput>,
) -> ApiResult<Json<GenerateOutput>> {
    let orchestrator = GenerationOrchestrator::new(state.generator.clone());

    let output = if input.persist {
        let objectives = orchestrator
            .generate_and_persist(state.store.as_ref(), &input.request)
            .await?;
        GenerateOutput::Persisted {
            persisted: true,
            objectives,
        }
    } else {
        let objectives = orchestrator.generate(&input.request).await?;
        GenerateOutput::Draft {
            persisted: false,
            objectives,
        }
    };

    Ok(Json(output))
}
