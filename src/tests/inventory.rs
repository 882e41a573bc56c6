use super::*;
use crate::test_support::FakeAccount;
use async_trait::async_trait;
use inspector_suppressor_core::FunctionPage;
use std::collections::HashSet;

#[tokio::test]
async fn single_page_needs_one_call() {
    let account = FakeAccount::new().with_functions(3);

    let functions = list_all_functions(&account).await.expect("inventory");

    assert_eq!(functions.len(), 3);
    assert_eq!(account.list_calls(), vec![None]);
}

#[tokio::test]
async fn follows_markers_until_exhausted() {
    let account = FakeAccount::new().with_functions(7).with_page_size(3);

    let functions = list_all_functions(&account).await.expect("inventory");

    assert_eq!(functions.len(), 7);
    let unique = functions
        .iter()
        .map(|function| function.function_arn.as_str())
        .collect::<HashSet<_>>();
    assert_eq!(unique.len(), 7);
    assert_eq!(
        account.list_calls(),
        vec![
            None,
            Some("page-1".to_string()),
            Some("page-2".to_string())
        ]
    );
}

#[tokio::test]
async fn empty_account_yields_empty_inventory() {
    let account = FakeAccount::new();
    let functions = list_all_functions(&account).await.expect("inventory");
    assert!(functions.is_empty());
}

#[tokio::test]
async fn page_failure_aborts_listing() {
    let account = FakeAccount::new()
        .with_functions(10)
        .with_page_size(4)
        .failing_page(1);

    let err = list_all_functions(&account)
        .await
        .expect_err("second page fails");

    assert!(matches!(err, InventoryError::Transport { .. }));
    assert!(err.to_string().contains("Rate exceeded"));
}

struct EmptyMarkerInventory;

#[async_trait]
impl FunctionInventory for EmptyMarkerInventory {
    async fn list_functions(&self, marker: Option<&str>) -> Result<FunctionPage, InventoryError> {
        assert!(marker.is_none(), "empty marker must not be followed");
        Ok(FunctionPage {
            functions: Vec::new(),
            next_marker: Some(String::new()),
        })
    }
}

#[tokio::test]
async fn empty_marker_ends_listing() {
    let functions = list_all_functions(&EmptyMarkerInventory)
        .await
        .expect("inventory");
    assert!(functions.is_empty());
}
