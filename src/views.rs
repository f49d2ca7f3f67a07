//! Client-side state for the list views.
//!
//! Each list view has one dialog slot, modelled as a single [`ModalState`]
//! instead of a set of independent open flags. List contents are whatever
//! the last fetch returned; nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Order, Product, Store};

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "camelCase")]
pub enum ModalState {
    #[default]
    Closed,
    Adding,
    Editing(i64),
    ConfirmingDelete(i64),
    ShowingDetails(i64),
}

impl ModalState {
    pub fn open_add(&mut self) {
        *self = ModalState::Adding;
    }

    pub fn open_edit(&mut self, id: i64) {
        *self = ModalState::Editing(id);
    }

    pub fn confirm_delete(&mut self, id: i64) {
        *self = ModalState::ConfirmingDelete(id);
    }

    pub fn show_details(&mut self, id: i64) {
        *self = ModalState::ShowingDetails(id);
    }

    pub fn close(&mut self) {
        *self = ModalState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }

    /// Entity the open dialog is about, if any.
    pub fn target_id(&self) -> Option<i64> {
        match *self {
            ModalState::Editing(id)
            | ModalState::ConfirmingDelete(id)
            | ModalState::ShowingDetails(id) => Some(id),
            ModalState::Closed | ModalState::Adding => None,
        }
    }
}

/// Which list view a dialog belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Orders,
    Products,
    Stores,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Status shown next to an order. Tracked locally only; the backend keeps
/// its own numeric status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderDisplayStatus {
    #[default]
    Pending,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub display_status: OrderDisplayStatus,
}

#[derive(Debug, Default)]
pub struct OrdersView {
    orders: Vec<Order>,
    statuses: HashMap<i64, OrderDisplayStatus>,
    pub filter: Option<OrderDisplayStatus>,
    pub modal: ModalState,
}

impl OrdersView {
    /// Replace the list. Local statuses survive for orders still present.
    pub fn replace(&mut self, orders: Vec<Order>) {
        self.statuses
            .retain(|id, _| orders.iter().any(|o| o.order_id == *id));
        self.orders = orders;
    }

    pub fn status_of(&self, order_id: i64) -> OrderDisplayStatus {
        self.statuses.get(&order_id).copied().unwrap_or_default()
    }

    /// Returns false when the order is not in the list.
    pub fn set_status(&mut self, order_id: i64, status: OrderDisplayStatus) -> bool {
        if !self.orders.iter().any(|o| o.order_id == order_id) {
            return false;
        }
        self.statuses.insert(order_id, status);
        true
    }

    pub fn remove(&mut self, order_id: i64) {
        self.orders.retain(|o| o.order_id != order_id);
        self.statuses.remove(&order_id);
        if self.modal.target_id() == Some(order_id) {
            self.modal.close();
        }
    }

    /// Rows after the status filter.
    pub fn rows(&self) -> Vec<OrderRow> {
        self.orders
            .iter()
            .map(|order| OrderRow {
                display_status: self.status_of(order.order_id),
                order: order.clone(),
            })
            .filter(|row| self.filter.map_or(true, |f| row.display_status == f))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Products and stores
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ProductsView {
    products: Vec<Product>,
    pub category: Option<i64>,
    pub modal: ModalState,
}

impl ProductsView {
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn remove(&mut self, product_id: i64) {
        self.products.retain(|p| p.product_id != product_id);
        if self.modal.target_id() == Some(product_id) {
            self.modal.close();
        }
    }

    pub fn rows(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| self.category.map_or(true, |c| p.category_id() == Some(c)))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct StoresView {
    stores: Vec<Store>,
    pub modal: ModalState,
}

impl StoresView {
    pub fn replace(&mut self, stores: Vec<Store>) {
        self.stores = stores;
    }

    pub fn remove(&mut self, store_id: i64) {
        self.stores.retain(|s| s.store_id != store_id);
        if self.modal.target_id() == Some(store_id) {
            self.modal.close();
        }
    }

    pub fn rows(&self) -> &[Store] {
        &self.stores
    }
}

/// All list-view state, managed as one unit by the shell.
#[derive(Debug, Default)]
pub struct ViewState {
    pub orders: OrdersView,
    pub products: ProductsView,
    pub stores: StoresView,
}

impl ViewState {
    pub fn modal(&self, view: ViewKind) -> ModalState {
        match view {
            ViewKind::Orders => self.orders.modal,
            ViewKind::Products => self.products.modal,
            ViewKind::Stores => self.stores.modal,
        }
    }

    pub fn set_modal(&mut self, view: ViewKind, modal: ModalState) {
        match view {
            ViewKind::Orders => self.orders.modal = modal,
            ViewKind::Products => self.products.modal = modal,
            ViewKind::Stores => self.stores.modal = modal,
        }
    }

    /// Forget everything fetched under the previous session.
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }
}
