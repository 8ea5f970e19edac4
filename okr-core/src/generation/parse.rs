//! Validation of raw provider output into candidate objectives.
//!
//! Provider text is untrusted. It is decoded into explicit structs and
//! checked before anything reaches the data model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::KeyResultType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateObjective {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    pub key_results: Vec<CandidateKeyResult>,
}

/// Absent numbers and type fall back to the key result defaults on persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateKeyResult {
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
    /// Falls back to the objective's owner.
    pub owner: Option<String>,
}

/// Remove a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.find('\n') {
        Some(i) if rest[..i].trim().chars().all(|c| c.is_ascii_alphanumeric()) => &rest[i + 1..],
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Decode and validate the provider's text.
pub fn parse_candidates(raw: &str) -> Result<Vec<CandidateObjective>> {
    let body = strip_code_fence(raw);
    let candidates: Vec<CandidateObjective> = serde_json::from_str(body)
        .map_err(|e| Error::MalformedAiResponse(format!("not a list of objectives: {}", e)))?;

    if candidates.is_empty() {
        return Err(Error::MalformedAiResponse("no objectives returned".into()));
    }

    for (i, objective) in candidates.iter().enumerate() {
        if objective.title.trim().is_empty() {
            return Err(Error::MalformedAiResponse(format!(
                "objective {} has an empty title",
                i
            )));
        }
        for (j, kr) in objective.key_results.iter().enumerate() {
            if kr.title.trim().is_empty() {
                return Err(Error::MalformedAiResponse(format!(
                    "key result {} of objective {} has an empty title",
                    j, i
                )));
            }
            let values = [kr.start_value, kr.target_value, kr.current_value];
            if values.iter().flatten().any(|v| !v.is_finite()) {
                return Err(Error::MalformedAiResponse(format!(
                    "key result {} of objective {} has a non-finite value",
                    j, i
                )));
            }
        }
    }

    Ok(candidates)
}
