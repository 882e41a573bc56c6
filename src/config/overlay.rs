use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ConfigOverlay {
    pub aws: Option<AwsOverlay>,
    pub inventory: Option<InventoryOverlay>,
    pub audit_log: Option<AuditLogOverlay>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(super) struct AwsOverlay {
    pub region: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(super) struct InventoryOverlay {
    pub page_size: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(super) struct AuditLogOverlay {
    pub enabled: Option<bool>,
    pub path: Option<PathBuf>,
}
