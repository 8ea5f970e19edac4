//! AI-assisted OKR generation.
//!
//! A [`GenerationOrchestrator`] turns a business description into candidate
//! objectives by prompting a [`TextGenerator`] and validating what comes back.
//! [`GenerationOrchestrator::generate_and_persist`] then writes the candidates
//! one record at a time. That write sequence is not atomic: if an insert
//! fails, everything inserted before it stays.

mod parse;
mod prompt;

pub use parse::{parse_candidates, strip_code_fence, CandidateKeyResult, CandidateObjective};
pub use prompt::build_prompt;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lifecycle;
use crate::models::*;
use crate::progress;
use crate::store::HierarchyStore;

/// Opaque text-generation provider: prompt in, raw text out.
///
/// Implementations report unreachable, unauthenticated or unconfigured
/// providers as [`Error::AiProvider`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for Arc<dyn TextGenerator> {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        (**self).generate_text(prompt).await
    }
}

/// Caller-supplied business context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub context: String,
    #[serde(default)]
    pub company_size: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub time_period: String,
}

pub struct GenerationOrchestrator<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> GenerationOrchestrator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Prompt the provider and validate its answer. Persists nothing.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<CandidateObjective>> {
        if request.context.trim().is_empty() {
            return Err(Error::Validation("business context cannot be empty".into()));
        }

        let prompt = build_prompt(request);
        tracing::debug!(prompt_chars = prompt.len(), "Requesting OKR generation");

        let raw = self.generator.generate_text(&prompt).await?;

        match parse_candidates(&raw) {
            Ok(candidates) => {
                tracing::info!(objectives = candidates.len(), "Generated OKR candidates");
                Ok(candidates)
            }
            Err(e) => {
                tracing::warn!(error = %e, response_chars = raw.len(), "Rejected provider output");
                Err(e)
            }
        }
    }

    /// Generate, then insert every candidate objective followed by its key
    /// results. Returns the persisted hierarchy with progress.
    pub async fn generate_and_persist<S: HierarchyStore + ?Sized>(
        &self,
        store: &S,
        request: &GenerationRequest,
    ) -> Result<Vec<ObjectiveDetail>> {
        let candidates = self.generate(request).await?;

        let mut persisted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            persisted.push(persist_candidate(store, candidate)?);
        }

        tracing::info!(objectives = persisted.len(), "Persisted generated OKRs");
        Ok(persisted)
    }
}

fn persist_candidate<S: HierarchyStore + ?Sized>(
    store: &S,
    candidate: CandidateObjective,
) -> Result<ObjectiveDetail> {
    let now = Utc::now();
    let objective = Objective {
        id: Uuid::new_v4(),
        title: candidate.title,
        description: candidate.description,
        owner: candidate.owner,
        deadline: None,
        status: ObjectiveStatus::Active,
        created_at: now,
        updated_at: now,
    };
    store.insert_objective(&objective)?;

    let mut key_results = Vec::with_capacity(candidate.key_results.len());
    for kr in candidate.key_results {
        let input = KeyResultInput {
            id: None,
            title: kr.title,
            description: kr.description,
            result_type: kr.result_type,
            start_value: kr.start_value,
            target_value: kr.target_value,
            current_value: kr.current_value,
            unit: kr.unit,
            owner: kr.owner.unwrap_or_else(|| objective.owner.clone()),
        };
        let key_result = lifecycle::new_key_result(objective.id, input);
        store.insert_key_result(&key_result)?;
        key_results.push(KeyResultDetail {
            progress: progress::key_result_progress(&key_result),
            key_result,
            initiatives: Vec::new(),
        });
    }

    let progress = progress::mean_progress(key_results.iter().map(|d| &d.key_result));
    Ok(ObjectiveDetail {
        objective,
        progress,
        key_results,
    })
}
