use std::sync::Mutex;
use tracing::{info, warn};

use super::{lock, salesperson_id};
use crate::api::ApiClient;
use crate::order_draft::{OrderDraft, ProductChoice, SubmittedOrder};
use crate::session::SessionController;

#[tauri::command]
pub async fn draft_get(draft: tauri::State<'_, Mutex<OrderDraft>>) -> Result<OrderDraft, String> {
    Ok(lock(&draft)?.clone())
}

/// `product` is absent when nothing is selected in the picker.
#[tauri::command]
pub async fn draft_add_line(
    product: Option<ProductChoice>,
    quantity: i64,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
) -> Result<OrderDraft, String> {
    let mut draft = lock(&draft)?;
    if let Err(rejected) = draft.add_line(product.as_ref(), quantity) {
        warn!(
            product_id = ?product.as_ref().map(|p| p.product_id),
            quantity,
            reason = ?rejected,
            "order line rejected"
        );
        return Err(rejected.to_string());
    }
    Ok(draft.clone())
}

#[tauri::command]
pub async fn draft_remove_line(
    product_id: i64,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
) -> Result<OrderDraft, String> {
    let mut draft = lock(&draft)?;
    draft.remove_line(product_id);
    Ok(draft.clone())
}

/// `None` clears the selection.
#[tauri::command]
pub async fn draft_select_store(
    store_id: Option<i64>,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
) -> Result<OrderDraft, String> {
    let mut draft = lock(&draft)?;
    match store_id {
        Some(id) => draft.select_store(id),
        None => draft.clear_store(),
    }
    Ok(draft.clone())
}

#[tauri::command]
pub async fn draft_set_po_number(
    po_number: String,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
) -> Result<OrderDraft, String> {
    let mut draft = lock(&draft)?;
    draft.set_po_number(&po_number);
    Ok(draft.clone())
}

/// Submit a copy of the draft. The shared draft is cleared only when the
/// whole order went through and nothing was edited meanwhile; otherwise it
/// is left for the user to retry or adjust.
#[tauri::command]
pub async fn draft_submit(
    api: tauri::State<'_, ApiClient>,
    session: tauri::State<'_, SessionController>,
    draft: tauri::State<'_, Mutex<OrderDraft>>,
) -> Result<SubmittedOrder, String> {
    let salesperson = salesperson_id(&session)?;
    let snapshot = lock(&draft)?.clone();
    let mut pending = snapshot.clone();

    let submitted = pending
        .submit(api.inner(), salesperson)
        .await
        .map_err(|e| e.to_string())?;

    if !lock(&draft)?.clear_if_unchanged(&snapshot) {
        info!(order_id = submitted.order_id, "draft edited during submit; kept");
    }
    Ok(submitted)
}
