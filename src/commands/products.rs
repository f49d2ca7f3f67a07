use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;
use tracing::info;

use super::lock;
use crate::api::ApiClient;
use crate::models::{self, Brand, Category, Product, ProductPayload};
use crate::views::ViewState;

#[derive(Debug, Serialize)]
pub struct ProductLookups {
    brands: Vec<Brand>,
    categories: Vec<Category>,
}

/// Fetch the catalogue. Returns the rows left after the category filter.
#[tauri::command]
pub async fn products_list(
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<Product>, String> {
    let products = api.products().list().await.map_err(|e| e.to_string())?;
    let mut views = lock(&views)?;
    views.products.replace(products);
    Ok(views.products.rows())
}

#[tauri::command]
pub async fn products_get(
    product_id: i64,
    api: tauri::State<'_, ApiClient>,
) -> Result<Product, String> {
    api.products()
        .get(product_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn products_create(
    product: ProductPayload,
    brand_id: i64,
    category_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Value, String> {
    let created = api
        .products()
        .create(&product, brand_id, category_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.products.modal.close();
    info!(name = %product.name, brand_id, category_id, "product created");
    Ok(created)
}

#[tauri::command]
pub async fn products_update(
    product_id: i64,
    product: ProductPayload,
    brand_id: i64,
    category_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Value, String> {
    let updated = api
        .products()
        .update(product_id, &product, brand_id, category_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.products.modal.close();
    Ok(updated)
}

#[tauri::command]
pub async fn products_delete(
    product_id: i64,
    api: tauri::State<'_, ApiClient>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<(), String> {
    api.products()
        .delete(product_id)
        .await
        .map_err(|e| e.to_string())?;
    lock(&views)?.products.remove(product_id);
    info!(product_id, "product deleted");
    Ok(())
}

/// Brand and category choices for the product forms.
#[tauri::command]
pub async fn products_lookups() -> Result<ProductLookups, String> {
    Ok(ProductLookups {
        brands: models::brands(),
        categories: models::categories(),
    })
}

/// `None` shows every category.
#[tauri::command]
pub async fn products_set_category_filter(
    category_id: Option<i64>,
    views: tauri::State<'_, Mutex<ViewState>>,
) -> Result<Vec<Product>, String> {
    let mut views = lock(&views)?;
    views.products.category = category_id;
    Ok(views.products.rows())
}
