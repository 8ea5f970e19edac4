//! Progress derivation. Nothing here is stored: every read recomputes.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{KeyResult, KeyResultType, KeyResultWithProgress};
use crate::store::HierarchyStore;

/// Completion percentage of a key result, always within `[0, 100]`.
///
/// Binary results, and metric results whose target equals their start, are
/// all-or-nothing on `current >= target`. Other metric results interpolate
/// linearly from start to target, so a value that moved away from the target
/// clamps to 0 and an overshoot clamps to 100.
pub fn key_result_progress(kr: &KeyResult) -> f64 {
    let reached = if kr.current_value >= kr.target_value {
        100.0
    } else {
        0.0
    };

    match kr.result_type {
        KeyResultType::Binary => reached,
        KeyResultType::Metric if kr.target_value == kr.start_value => reached,
        KeyResultType::Metric => {
            let raw = (kr.current_value - kr.start_value) / (kr.target_value - kr.start_value)
                * 100.0;
            if raw.is_nan() {
                0.0
            } else {
                raw.clamp(0.0, 100.0)
            }
        }
    }
}

/// Unweighted mean of the given key results' progress; 0 when empty.
pub fn mean_progress<'a>(key_results: impl IntoIterator<Item = &'a KeyResult>) -> f64 {
    let (sum, n) = key_results
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), kr| (sum + key_result_progress(kr), n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Aggregate progress of an objective: the mean over its key results.
/// An objective with no key results (or an unknown id) is at 0.
pub fn objective_progress<S: HierarchyStore + ?Sized>(store: &S, objective_id: Uuid) -> Result<f64> {
    let key_results = store.find_key_results_by_objective(objective_id)?;
    Ok(mean_progress(&key_results))
}

pub fn with_progress(key_result: KeyResult) -> KeyResultWithProgress {
    let progress = key_result_progress(&key_result);
    KeyResultWithProgress {
        key_result,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn kr(result_type: KeyResultType, start: f64, target: f64, current: f64) -> KeyResult {
        let now = Utc::now();
        KeyResult {
            id: Uuid::new_v4(),
            objective_id: Uuid::new_v4(),
            title: "kr".into(),
            description: String::new(),
            result_type,
            start_value: start,
            target_value: target,
            current_value: current,
            unit: String::new(),
            owner: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn metric_interpolates_between_start_and_target() {
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 0.0, 100.0, 25.0)), 25.0);
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 50.0, 150.0, 100.0)), 50.0);
    }

    #[test]
    fn metric_clamps_both_ends() {
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 10.0, 20.0, 5.0)), 0.0);
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 0.0, 10.0, 30.0)), 100.0);
    }

    #[test]
    fn decreasing_metric_counts_down_towards_target() {
        // e.g. churn from 10% to 4%
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 10.0, 4.0, 7.0)), 50.0);
    }

    #[test]
    fn metric_with_equal_start_and_target_is_all_or_nothing() {
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 50.0, 50.0, 50.0)), 100.0);
        assert_eq!(key_result_progress(&kr(KeyResultType::Metric, 50.0, 50.0, 49.0)), 0.0);
    }

    #[test]
    fn binary_is_zero_or_hundred() {
        assert_eq!(key_result_progress(&kr(KeyResultType::Binary, 0.0, 1.0, 0.0)), 0.0);
        assert_eq!(key_result_progress(&kr(KeyResultType::Binary, 0.0, 1.0, 1.0)), 100.0);
        assert_eq!(key_result_progress(&kr(KeyResultType::Binary, 0.0, 1.0, 0.5)), 0.0);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean_progress(&Vec::<KeyResult>::new()), 0.0);
    }

    #[test]
    fn mean_is_unweighted() {
        let results = [
            kr(KeyResultType::Metric, 0.0, 100.0, 25.0),
            kr(KeyResultType::Metric, 0.0, 1_000_000.0, 750_000.0),
        ];
        assert_eq!(mean_progress(&results), 50.0);
    }
}
