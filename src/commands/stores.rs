use serde_json::Value;
use std::sync::Mutex;
use tracing::info;

use super::lock;
use crate::api::ApiClient;
use crate::models::{Store, StorePayload};
use crate::views::ViewState;

#[tauri::command]
pub async fn stores_list(
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<Store>, String> {
    let stores = api.stores().list().await.map_err(|e| e.to_string())?;
    let mut views = lock(&views)?;
    views.stores.replace(stores);
    Ok(views.stores.rows().to_vec())
}

#[tauri::command]
pub async fn stores_get(store_id: i64, api: tauri::State<'_, ApiClient>) -> Result<Store, String> {
    api.stores().get(store_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stores_create(
    store: StorePayload,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Value, String> {
    let created = api
        .stores()
        .create(&store)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.stores.modal.close();
    info!(name = %store.name, "store created");
    Ok(created)
}

#[tauri::command]
pub async fn stores_update(
    store_id: i64,
    store: StorePayload,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Value, String> {
    let updated = api
        .stores()
        .update(store_id, &store)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.stores.modal.close();
    Ok(updated)
}

#[tauri::command]
pub async fn stores_delete(
    store_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<(), String> {
    api.stores()
        .delete(store_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.stores.remove(store_id);
    info!(store_id, "store deleted");
    Ok(())
}
