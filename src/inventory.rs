//! Full function inventory retrieval over a cursor-paginated listing.

use inspector_suppressor_core::{FunctionDescriptor, FunctionInventory, InventoryError};

/// Follows `next_marker` from the first page until the listing returns no cursor.
///
/// # Errors
///
/// Any page failure aborts the listing; a partial inventory is never returned.
pub async fn list_all_functions(
    inventory: &dyn FunctionInventory,
) -> Result<Vec<FunctionDescriptor>, InventoryError> {
    let mut functions = Vec::new();
    let mut marker: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = inventory.list_functions(marker.as_deref()).await?;
        pages = pages.saturating_add(1);
        tracing::debug!(
            page = pages,
            functions = page.functions.len(),
            "fetched function page"
        );
        functions.extend(page.functions);

        marker = page.next_marker.filter(|next| !next.is_empty());
        if marker.is_none() {
            break;
        }
    }

    Ok(functions)
}

#[cfg(test)]
#[path = "tests/inventory.rs"]
mod tests;
