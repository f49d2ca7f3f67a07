use std::sync::Mutex;
use tracing::info;

use super::{lock, salesperson_id};
use crate::api::ApiClient;
use crate::models::{Order, OrderDetail, OrderDetailPayload, OrderUpdate};
use crate::session::SessionController;
use crate::views::{OrderDisplayStatus, OrderRow, ViewState};

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Every order, unfiltered. Used by administrators.
#[tauri::command]
pub async fn orders_list(api: tauri::State<'_, ApiClient>) -> Result<Vec<Order>, String> {
    api.orders().list().await.map_err(|e| e.to_string())
}

/// Orders of the logged-in salesperson, with local display statuses applied.
#[tauri::command]
pub async fn orders_list_mine(
    api: tauri::State<'_, ApiClient>,
    session: tauri::State<'_, SessionController>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<OrderRow>, String> {
    let salesperson = salesperson_id(&session)?;
    let orders = api
        .orders()
        .list_by_salesperson(salesperson)
        .await
        .map_err(|e| e.to_string())?;

    let mut views = lock(&views)?;
    views.orders.replace(orders);
    Ok(views.orders.rows())
}

#[tauri::command]
pub async fn orders_get(
    order_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<Order, String> {
    api.orders().get(order_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn orders_update(
    order: OrderUpdate,
    store_id: i64,
    salesperson_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<serde_json::Value, String> {
    let updated = api
        .orders()
        .update(order.order_id, &order, store_id, salesperson_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.orders.modal.close();
    Ok(updated)
}

#[tauri::command]
pub async fn orders_delete(
    order_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<(), String> {
    api.orders()
        .delete(order_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.orders.remove(order_id);
    info!(order_id, "order deleted");
    Ok(())
}

#[tauri::command]
pub async fn orders_set_display_status(
    order_id: i64,
    status: OrderDisplayStatus,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<OrderRow>, String> {
    let mut views = lock(&views)?;
    if !views.orders.set_status(order_id, status) {
        return Err(format!("Order {order_id} is not in the list"));
    }
    Ok(views.orders.rows())
}

/// `None` shows every status.
#[tauri::command]
pub async fn orders_set_status_filter(
    status: Option<OrderDisplayStatus>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<OrderRow>, String> {
    let mut views = lock(&views)?;
    views.orders.filter = status;
    Ok(views.orders.rows())
}

// ---------------------------------------------------------------------------
// Order details
// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn order_details_list(
    order_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<Vec<OrderDetail>, String> {
    api.order_details()
        .list(order_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn order_details_get(
    order_id: i64,
    detail_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<OrderDetail, String> {
    api.order_details()
        .get(order_id, detail_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn order_details_update(
    order_id: i64,
    detail_id: i64,
    product_id: i64,
    quantity: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<serde_json::Value, String> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero".into());
    }
    api.order_details()
        .update(order_id, detail_id, product_id, &OrderDetailPayload { quantity })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn order_details_delete(
    order_id: i64,
    detail_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<(), String> {
    api.order_details()
        .delete(order_id, detail_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn order_details_delete_all(
    order_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<(), String> {
    api.order_details()
        .delete_all(order_id)
        .await
        .map_err(|e| e.to_string())
}
