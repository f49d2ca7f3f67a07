//! Wire models for the order-management API.
//!
//! Entities are server-owned: the console only holds read/replace copies.
//! Field names follow the backend's camelCase JSON. Unknown fields are kept
//! in `extra` so an edit round-trips what the server sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub store_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub store_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    pub salesperson_id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub second_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub second_last_name: Option<String>,
}

impl Salesperson {
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub store_id: Option<i64>,
    #[serde(default)]
    pub salesperson_id: Option<i64>,
    #[serde(default)]
    pub store: Option<Store>,
    #[serde(default)]
    pub salesperson: Option<Salesperson>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Store id from either the flat field or the nested store.
    pub fn effective_store_id(&self) -> Option<i64> {
        self.store_id
            .or_else(|| self.store.as_ref().map(|s| s.store_id))
    }

    pub fn effective_salesperson_id(&self) -> Option<i64> {
        self.salesperson_id
            .or_else(|| self.salesperson.as_ref().map(|s| s.salesperson_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(default, alias = "detailId")]
    pub order_detail_id: Option<i64>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub brand_id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    /// Free text in the forms, sometimes numeric on the wire.
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.category_id)
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Reference to an existing store inside an order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    pub store_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonRef {
    pub salesperson_id: i64,
}

/// Header sent when creating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub po_number: String,
    pub date: String,
    pub status: i64,
    pub total: i64,
    pub store: StoreRef,
    pub salesperson: SalespersonRef,
}

/// Body of the order edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub order_id: i64,
    pub po_number: String,
    pub total: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailPayload {
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePayload {
    pub name: String,
    #[serde(rename = "type", default)]
    pub store_type: String,
    #[serde(default)]
    pub address: String,
}

fn default_true() -> bool {
    true
}

/// Fail with a validation error when a required form field is blank.
pub(crate) fn require(field: &str, value: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::ConsoleError::validation(format!(
            "{field} is required"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Static lookups offered by the product forms
// ---------------------------------------------------------------------------

pub const BRANDS: &[(i64, &str)] = &[(1, "ETERNAL"), (2, "PRONTO"), (3, "VALMY")];

pub const CATEGORIES: &[(i64, &str, i64)] = &[
    (1, "Nail Enamels", 2060),
    (2, "ETERNAL ACETONE", 2000),
    (3, "ETERNAL DROPPER", 2004),
    (4, "ETERNAL TREATMENTS", 2051),
    (5, "ESSENCIAL KIT", 2100),
    (6, "GEL STEP 2", 2044),
];

pub fn brands() -> Vec<Brand> {
    BRANDS
        .iter()
        .map(|(id, name)| Brand {
            brand_id: *id,
            name: (*name).to_string(),
        })
        .collect()
}

pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(id, name, code)| Category {
            category_id: *id,
            name: (*name).to_string(),
            code: Some(*code),
        })
        .collect()
}
