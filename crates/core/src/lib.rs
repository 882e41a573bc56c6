use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Tag key to tag value mapping for one function. Keys are unique.
pub type TagSet = BTreeMap<String, String>;

/// Tag key that exempts a function from reconciliation when set to [`OPT_OUT_TAG_VALUE`].
pub const OPT_OUT_TAG_KEY: &str = "InspectorSuppressorExclusion";
pub const OPT_OUT_TAG_VALUE: &str = "true";

pub const CODE_SCANNING_EXCLUSION_KEY: &str = "InspectorCodeExclusion";
pub const CODE_SCANNING_EXCLUSION_VALUE: &str = "LambdaCodeScanning";

pub const STANDARD_SCANNING_EXCLUSION_KEY: &str = "InspectorExclusion";
pub const STANDARD_SCANNING_EXCLUSION_VALUE: &str = "LambdaStandardScanning";

/// One independently toggled Inspector scanning feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanningFeature {
    Code,
    Standard,
}

impl ScanningFeature {
    pub const ALL: [ScanningFeature; 2] = [ScanningFeature::Code, ScanningFeature::Standard];

    /// Tag whose presence disables this feature.
    pub fn exclusion_key(self) -> &'static str {
        match self {
            Self::Code => CODE_SCANNING_EXCLUSION_KEY,
            Self::Standard => STANDARD_SCANNING_EXCLUSION_KEY,
        }
    }

    pub fn exclusion_value(self) -> &'static str {
        match self {
            Self::Code => CODE_SCANNING_EXCLUSION_VALUE,
            Self::Standard => STANDARD_SCANNING_EXCLUSION_VALUE,
        }
    }
}

/// Desired on/off state for both scanning features, fixed for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanningPolicy {
    pub code_scanning: bool,
    pub standard_scanning: bool,
}

impl ScanningPolicy {
    pub fn new(code_scanning: bool, standard_scanning: bool) -> Self {
        Self {
            code_scanning,
            standard_scanning,
        }
    }

    pub fn is_enabled(&self, feature: ScanningFeature) -> bool {
        match feature {
            ScanningFeature::Code => self.code_scanning,
            ScanningFeature::Standard => self.standard_scanning,
        }
    }
}

/// Returns whether the tag set carries the opt-out marker with the exact value `"true"`.
pub fn has_opt_out_marker(tags: &TagSet) -> bool {
    tags.get(OPT_OUT_TAG_KEY)
        .is_some_and(|value| value == OPT_OUT_TAG_VALUE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub function_name: String,
    pub function_arn: String,
}

/// One page returned by a [`FunctionInventory`].
#[derive(Debug, Clone, Default)]
pub struct FunctionPage {
    pub functions: Vec<FunctionDescriptor>,
    /// Cursor for the following page; `None` ends the listing.
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("function listing request failed: {message}")]
    Transport { message: String },
    #[error("function listing returned invalid data: {message}")]
    InvalidResponse { message: String },
}

#[derive(Debug, Clone, Error)]
pub enum TagError {
    #[error("failed to read tags for {resource}: {message}")]
    Read { resource: String, message: String },
    #[error("failed to remove tags from {resource}: {message}")]
    Remove { resource: String, message: String },
    #[error("failed to add tags to {resource}: {message}")]
    Add { resource: String, message: String },
}

/// Cursor-paginated listing of every function in the account.
#[async_trait]
pub trait FunctionInventory: Send + Sync {
    async fn list_functions(&self, marker: Option<&str>) -> Result<FunctionPage, InventoryError>;
}

/// Tag read/write capability against a single function resource.
///
/// `remove_tags` and `add_tags` succeed or fail for the whole set.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn read_tags(&self, resource: &str) -> Result<TagSet, TagError>;
    async fn remove_tags(&self, resource: &str, keys: &[String]) -> Result<(), TagError>;
    async fn add_tags(&self, resource: &str, tags: &TagSet) -> Result<(), TagError>;
}
