use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use inspector_suppressor_core::ScanningPolicy;
use serde::Serialize;

use crate::types::FunctionResult;

/// Append-only JSON-lines record of per-function decisions. Never read back.
pub struct AuditLogger {
    file: Mutex<File>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord<'a> {
    timestamp: String,
    run_id: &'a str,
    policy: ScanningPolicy,
    #[serde(flatten)]
    result: &'a FunctionResult,
}

impl AuditLogger {
    pub fn new(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let log_path = path.unwrap_or_else(audit_log_path);
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn log(&self, record: AuditRecord<'_>) -> anyhow::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("audit log mutex poisoned"))?;
        let json = serde_json::to_string(&record)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }
}

impl<'a> AuditRecord<'a> {
    pub fn function_decision(
        run_id: &'a str,
        policy: ScanningPolicy,
        result: &'a FunctionResult,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            run_id,
            policy,
            result,
        }
    }
}

/// Identifier shared by every record of one run.
pub fn new_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string()
}

fn audit_log_path() -> PathBuf {
    if let Some(explicit) = env::var_os("INSPECTOR_SUPPRESSOR_AUDIT_LOG_PATH") {
        return PathBuf::from(explicit);
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    home.join(".local")
        .join("share")
        .join("inspector-suppressor")
        .join("audit.log")
}

#[cfg(test)]
#[path = "tests/audit_log.rs"]
mod tests;
