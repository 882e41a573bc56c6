//! Per-function tag reconciliation.

use inspector_suppressor_core::{
    ScanningFeature, ScanningPolicy, TagError, TagSet, TagStore, has_opt_out_marker,
};

use crate::types::{FunctionResult, OPT_OUT_SKIP_REASON};

/// Tag changes staged for one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    pub add: TagSet,
    pub remove: Vec<String>,
}

impl TagPlan {
    /// Stages exclusion tags so that each feature is enabled exactly when its tag is absent.
    ///
    /// Disabled features always stage an add, even when the tag is already present.
    pub fn for_policy(current: &TagSet, policy: &ScanningPolicy) -> Self {
        let mut plan = Self::default();
        for feature in ScanningFeature::ALL {
            let key = feature.exclusion_key();
            if !policy.is_enabled(feature) {
                plan.add
                    .insert(key.to_string(), feature.exclusion_value().to_string());
            } else if current.contains_key(key) {
                plan.remove.push(key.to_string());
            }
        }
        plan
    }
}

/// Reconciles one function. Failures are returned as an `error` result, never propagated.
pub async fn reconcile(
    tags: &dyn TagStore,
    function_arn: &str,
    policy: &ScanningPolicy,
) -> FunctionResult {
    match apply_policy(tags, function_arn, policy).await {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(function_arn, "error updating tags: {err}");
            FunctionResult::error(function_arn, err.to_string())
        }
    }
}

async fn apply_policy(
    tags: &dyn TagStore,
    function_arn: &str,
    policy: &ScanningPolicy,
) -> Result<FunctionResult, TagError> {
    let current = tags.read_tags(function_arn).await?;

    if has_opt_out_marker(&current) {
        tracing::info!(function_arn, "skipping function with opt-out tag");
        return Ok(FunctionResult::skipped(function_arn, OPT_OUT_SKIP_REASON));
    }

    let plan = TagPlan::for_policy(&current, policy);

    // Removal goes first so it can never undo an addition from the same pass.
    if !plan.remove.is_empty() {
        tags.remove_tags(function_arn, &plan.remove).await?;
    }
    if !plan.add.is_empty() {
        tags.add_tags(function_arn, &plan.add).await?;
    }

    Ok(FunctionResult::updated(function_arn, plan.add, plan.remove))
}

#[cfg(test)]
#[path = "tests/reconcile.rs"]
mod tests;
