//! Run orchestration: policy intake, inventory, concurrent reconciliation, summary.

use std::future::Future;
use std::sync::Arc;

use inspector_suppressor_core::{
    FunctionDescriptor, FunctionInventory, InventoryError, ScanningPolicy, TagStore,
};
use inspector_suppressor_lambda::LambdaTagService;
use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use crate::audit_log::{AuditLogger, AuditRecord, new_run_id};
use crate::config::{AuditLogConfig, SuppressorConfig};
use crate::inventory::list_all_functions;
use crate::policy::{PolicyError, policy_from_event};
use crate::reconcile::reconcile;
use crate::types::{FunctionResult, HandlerResponse, RunSummary};

/// Failures that abort a whole run. Per-function failures never appear here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Reconciles scanning exclusion tags across every function in the account.
#[derive(Clone)]
pub struct SuppressorService {
    inventory: Arc<dyn FunctionInventory>,
    tags: Arc<dyn TagStore>,
    audit_logger: Option<Arc<AuditLogger>>,
}

impl SuppressorService {
    /// Builds a service backed by one shared Lambda client.
    pub async fn connect(config: &SuppressorConfig) -> Self {
        let lambda = Arc::new(LambdaTagService::connect(&config.connect_options()).await);
        Self::with_collaborators(lambda.clone(), lambda).with_audit_log(&config.audit_log)
    }

    pub fn with_collaborators(
        inventory: Arc<dyn FunctionInventory>,
        tags: Arc<dyn TagStore>,
    ) -> Self {
        Self {
            inventory,
            tags,
            audit_logger: None,
        }
    }

    /// Opens the audit log when enabled. An unusable log path only costs the
    /// audit trail, never the run.
    pub fn with_audit_log(mut self, config: &AuditLogConfig) -> Self {
        if !config.enabled {
            return self;
        }
        match AuditLogger::new(config.path.clone()) {
            Ok(audit_logger) => self.audit_logger = Some(Arc::new(audit_logger)),
            Err(err) => tracing::warn!("audit log disabled, failed to open it: {err}"),
        }
        self
    }

    /// Runs one reconciliation pass for `policy`.
    ///
    /// Every discovered function gets its own task; all tasks finish before the
    /// summary is built, and results keep inventory order.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Inventory`] when the function listing fails.
    pub async fn run(&self, policy: ScanningPolicy) -> Result<RunSummary, RunError> {
        let functions = list_all_functions(self.inventory.as_ref()).await?;
        tracing::info!("Found {} Lambda functions", functions.len());

        let mut tasks = Vec::with_capacity(functions.len());
        for function in functions {
            let tags = Arc::clone(&self.tags);
            let span = tracing::info_span!("reconcile", function_name = %function.function_name);
            let task = tokio::spawn({
                let function_arn = function.function_arn.clone();
                async move { reconcile(tags.as_ref(), &function_arn, &policy).await }
                    .instrument(span)
            });
            tasks.push((function, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (FunctionDescriptor { function_name, function_arn }, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(
                        %function_name,
                        %function_arn,
                        "reconciliation task failed: {err}"
                    );
                    FunctionResult::error(
                        &function_arn,
                        format!("reconciliation task failed: {err}"),
                    )
                }
            };
            results.push(result);
        }

        let report = RunSummary::from_results(results);
        self.record_decisions(policy, &report).await;
        match serde_json::to_string(&report) {
            Ok(record) => tracing::debug!(%record, "run record"),
            Err(err) => tracing::debug!("failed to encode run record: {err}"),
        }
        tracing::info!(
            total = report.summary.total,
            updated = report.summary.updated,
            skipped = report.summary.skipped,
            errors = report.summary.errors,
            "Lambda tags update completed"
        );
        Ok(report)
    }

    /// Appends one audit record per result. File writes run on the blocking pool.
    async fn record_decisions(&self, policy: ScanningPolicy, report: &RunSummary) {
        let Some(audit_logger) = self.audit_logger.clone() else {
            return;
        };
        let results = report.results.clone();
        let written = tokio::task::spawn_blocking(move || {
            let run_id = new_run_id();
            for result in &results {
                let record = AuditRecord::function_decision(&run_id, policy, result);
                if let Err(err) = audit_logger.log(record) {
                    tracing::warn!(
                        function_arn = %result.function_arn,
                        "failed to append audit log record: {err}"
                    );
                }
            }
        })
        .await;
        if let Err(err) = written {
            tracing::warn!("audit log writer failed: {err}");
        }
    }
}

/// Validates the trigger event, then builds the service and runs it.
///
/// `connect` is only invoked once the policy is known to be valid, so a bad
/// event never touches the remote endpoint.
///
/// Run-level failures become a failure [`HandlerResponse`].
pub async fn handle_event<F, Fut>(event: &Value, connect: F) -> HandlerResponse
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = SuppressorService>,
{
    tracing::debug!(%event, "received event");

    let policy = match policy_from_event(event) {
        Ok(policy) => policy,
        Err(err) => return respond(Err(err.into())),
    };

    let service = connect().await;
    respond(service.run(policy).await)
}

/// Wraps a run outcome in the status-code + JSON body envelope.
pub fn respond(outcome: Result<RunSummary, RunError>) -> HandlerResponse {
    let encoded = match outcome {
        Ok(report) => HandlerResponse::completed(&report),
        Err(err) => {
            tracing::error!("run failed: {err}");
            return HandlerResponse::failed(&err);
        }
    };

    encoded.unwrap_or_else(|err| {
        tracing::error!("failed to encode run summary: {err}");
        HandlerResponse::failed(&err)
    })
}

#[cfg(test)]
#[path = "tests/service.rs"]
mod tests;
