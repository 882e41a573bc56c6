//! Configuration loading and merge logic for `inspector-suppressor`.
//!
//! Global config and project-local config are merged with project values taking precedence.

mod overlay;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use inspector_suppressor_lambda::{LambdaConnectOptions, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use self::overlay::ConfigOverlay;

/// Default `ListFunctions` page size.
pub const DEFAULT_PAGE_SIZE: i32 = MAX_PAGE_SIZE;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SuppressorConfig {
    /// AWS client settings.
    pub aws: AwsConfig,
    /// Function listing settings.
    pub inventory: InventoryConfig,
    /// Decision audit log settings.
    pub audit_log: AuditLogConfig,
}

/// AWS client settings. Unset values fall back to the SDK default provider chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: Option<String>,
    /// Named or SSO profile, used when running outside Lambda.
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub page_size: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditLogConfig {
    pub enabled: bool,
    /// Log file; defaults to `~/.local/share/inspector-suppressor/audit.log`.
    pub path: Option<PathBuf>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SuppressorConfig {
    /// Loads and merges global + project configuration from default paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any discovered config file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with_paths(global_config_path(), project_config_path())
    }

    #[cfg(test)]
    fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        Self::load_with_paths(Some(path.to_path_buf()), None)
    }

    fn load_with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(path) = global {
            config.merge_from_path(&path)?;
        }
        if let Some(path) = project {
            config.merge_from_path(&path)?;
        }
        Ok(config)
    }

    /// Applies `--region` / `--profile` flags on top of file configuration.
    pub fn apply_cli_overrides(&mut self, region: Option<String>, profile: Option<String>) {
        if region.is_some() {
            self.aws.region = region;
        }
        if profile.is_some() {
            self.aws.profile = profile;
        }
    }

    pub fn connect_options(&self) -> LambdaConnectOptions {
        LambdaConnectOptions {
            region: self.aws.region.clone(),
            profile: self.aws.profile.clone(),
            page_size: Some(self.inventory.page_size),
        }
    }

    fn merge_from_path(&mut self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        let overlay: ConfigOverlay = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file at {}", path.display()))?;
        self.apply_overlay(overlay);
        Ok(())
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(value) = overlay.aws {
            if let Some(region) = non_empty(value.region) {
                self.aws.region = Some(region);
            }
            if let Some(profile) = non_empty(value.profile) {
                self.aws.profile = Some(profile);
            }
        }
        if let Some(value) = overlay.inventory
            && let Some(page_size) = value.page_size
        {
            self.inventory.page_size = sanitize_page_size(page_size);
        }
        if let Some(value) = overlay.audit_log {
            if let Some(enabled) = value.enabled {
                self.audit_log.enabled = enabled;
            }
            if let Some(path) = value.path {
                self.audit_log.path = Some(path);
            }
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("INSPECTOR_SUPPRESSOR_CONFIG_GLOBAL_PATH") {
        return Some(PathBuf::from(explicit));
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)?;

    Some(
        home.join(".config")
            .join("inspector-suppressor")
            .join("config.toml"),
    )
}

fn project_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("INSPECTOR_SUPPRESSOR_CONFIG_PROJECT_PATH") {
        return Some(PathBuf::from(explicit));
    }

    let cwd = env::current_dir().ok()?;
    Some(cwd.join(".inspector-suppressor.toml"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn sanitize_page_size(value: i32) -> i32 {
    if value <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        value.min(MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
#[path = "../tests/config.rs"]
mod tests;
