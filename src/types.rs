use serde::{Deserialize, Serialize};

use inspector_suppressor_core::TagSet;

pub const COMPLETED_MESSAGE: &str = "Lambda tags update completed";
pub const FAILED_MESSAGE: &str = "Error processing request";
pub const OPT_OUT_SKIP_REASON: &str = "has exclusion tag";

/// Outcome of reconciling one function during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    pub function_arn: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Updated {
        tags_added: TagSet,
        tags_removed: Vec<String>,
    },
    Skipped {
        reason: String,
    },
    Error {
        error: String,
    },
}

impl FunctionResult {
    pub fn updated(function_arn: &str, tags_added: TagSet, tags_removed: Vec<String>) -> Self {
        Self {
            function_arn: function_arn.to_string(),
            outcome: Outcome::Updated {
                tags_added,
                tags_removed,
            },
        }
    }

    pub fn skipped(function_arn: &str, reason: &str) -> Self {
        Self {
            function_arn: function_arn.to_string(),
            outcome: Outcome::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    pub fn error(function_arn: &str, error: impl Into<String>) -> Self {
        Self {
            function_arn: function_arn.to_string(),
            outcome: Outcome::Error {
                error: error.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Aggregate of one run: counts by status plus every per-function result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub summary: StatusCounts,
    pub results: Vec<FunctionResult>,
}

impl RunSummary {
    pub fn from_results(results: Vec<FunctionResult>) -> Self {
        let mut summary = StatusCounts {
            total: results.len(),
            ..StatusCounts::default()
        };
        for result in &results {
            match result.outcome {
                Outcome::Updated { .. } => summary.updated += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Error { .. } => summary.errors += 1,
            }
        }
        Self { summary, results }
    }
}

/// Run-level response: a status code and a JSON-encoded body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Serialize)]
struct CompletedBody<'a> {
    message: &'a str,
    #[serde(flatten)]
    report: &'a RunSummary,
}

impl HandlerResponse {
    pub fn completed(report: &RunSummary) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(&CompletedBody {
            message: COMPLETED_MESSAGE,
            report,
        })?;
        Ok(Self {
            status_code: 200,
            body,
        })
    }

    pub fn failed(error: &dyn std::error::Error) -> Self {
        let body = serde_json::json!({
            "message": FAILED_MESSAGE,
            "error": error.to_string(),
        })
        .to_string();
        Self {
            status_code: 500,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

#[cfg(test)]
#[path = "tests/types.rs"]
mod tests;
