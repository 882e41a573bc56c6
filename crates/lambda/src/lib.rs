//! AWS Lambda backed [`FunctionInventory`] and [`TagStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lambda as lambda;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::types::FunctionConfiguration;
use inspector_suppressor_core::{
    FunctionDescriptor, FunctionInventory, FunctionPage, InventoryError, TagError, TagSet,
    TagStore,
};

/// Largest `MaxItems` value accepted by `ListFunctions`.
pub const MAX_PAGE_SIZE: i32 = 50;

/// Settings used to build the shared Lambda client.
#[derive(Debug, Clone, Default)]
pub struct LambdaConnectOptions {
    /// Region override; the SDK default chain applies when unset.
    pub region: Option<String>,
    /// Named (or SSO) profile used when running outside Lambda.
    pub profile: Option<String>,
    /// `ListFunctions` page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub page_size: Option<i32>,
}

/// One Lambda client shared by inventory listing and every tag call of a run.
#[derive(Clone)]
pub struct LambdaTagService {
    client: lambda::Client,
    page_size: Option<i32>,
}

impl LambdaTagService {
    /// Loads SDK configuration and builds the client. Credentials resolve lazily on first call.
    pub async fn connect(options: &LambdaConnectOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        let conf = loader.load().await;
        tracing::debug!(
            region = ?conf.region().map(|region| region.as_ref().to_string()),
            "lambda client configured"
        );
        Self::from_client(lambda::Client::new(&conf), options.page_size)
    }

    pub fn from_client(client: lambda::Client, page_size: Option<i32>) -> Self {
        Self {
            client,
            page_size: page_size.map(clamp_page_size),
        }
    }
}

#[async_trait]
impl FunctionInventory for LambdaTagService {
    async fn list_functions(&self, marker: Option<&str>) -> Result<FunctionPage, InventoryError> {
        let output = self
            .client
            .list_functions()
            .set_marker(marker.map(ToOwned::to_owned))
            .set_max_items(self.page_size)
            .send()
            .await
            .map_err(|err| InventoryError::Transport {
                message: DisplayErrorContext(&err).to_string(),
            })?;

        page_from_listing(output.functions(), output.next_marker())
    }
}

#[async_trait]
impl TagStore for LambdaTagService {
    async fn read_tags(&self, resource: &str) -> Result<TagSet, TagError> {
        let output = self
            .client
            .list_tags()
            .resource(resource)
            .send()
            .await
            .map_err(|err| TagError::Read {
                resource: resource.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(tag_set_from_map(output.tags()))
    }

    async fn remove_tags(&self, resource: &str, keys: &[String]) -> Result<(), TagError> {
        tracing::debug!(resource, ?keys, "untagging function");
        self.client
            .untag_resource()
            .resource(resource)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(|err| TagError::Remove {
                resource: resource.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn add_tags(&self, resource: &str, tags: &TagSet) -> Result<(), TagError> {
        tracing::debug!(resource, ?tags, "tagging function");
        let tags = tags
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<HashMap<_, _>>();
        self.client
            .tag_resource()
            .resource(resource)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|err| TagError::Add {
                resource: resource.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}

fn clamp_page_size(value: i32) -> i32 {
    value.clamp(1, MAX_PAGE_SIZE)
}

fn page_from_listing(
    functions: &[FunctionConfiguration],
    next_marker: Option<&str>,
) -> Result<FunctionPage, InventoryError> {
    let functions = functions
        .iter()
        .map(descriptor_from_configuration)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FunctionPage {
        functions,
        next_marker: next_marker
            .filter(|marker| !marker.is_empty())
            .map(ToOwned::to_owned),
    })
}

fn descriptor_from_configuration(
    function: &FunctionConfiguration,
) -> Result<FunctionDescriptor, InventoryError> {
    let Some(function_arn) = function.function_arn() else {
        return Err(InventoryError::InvalidResponse {
            message: format!(
                "function '{}' has no FunctionArn",
                function.function_name().unwrap_or("<unnamed>")
            ),
        });
    };

    Ok(FunctionDescriptor {
        function_name: function.function_name().unwrap_or_default().to_string(),
        function_arn: function_arn.to_string(),
    })
}

fn tag_set_from_map(tags: Option<&HashMap<String, String>>) -> TagSet {
    tags.map(|tags| {
        tags.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    })
    .unwrap_or_default()
}
