//! Client-side order composition.
//!
//! An [`OrderDraft`] collects a header and product lines before anything is
//! sent. Submission is one header request followed by one request per line,
//! issued sequentially in draft order. There is no rollback: when a line fails
//! the header and the lines before it stay persisted, and the error names the
//! failing line so the backend can be asked to clean up.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::models::{OrderDetailPayload, OrderPayload, SalespersonRef, StoreRef};

/// Status code the backend assigns to newly placed orders.
pub const NEW_ORDER_STATUS: i64 = 1;

/// One product line in the draft. Never edited in place: remove and re-add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailDraft {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
}

/// The product picked in the form, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChoice {
    pub product_id: i64,
    pub name: String,
}

/// Why `add_line` refused a line. The draft is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejected {
    #[error("Please select a product and enter a valid quantity.")]
    MissingProduct,
    #[error("Please select a product and enter a valid quantity.")]
    InvalidQuantity,
    #[error("Product already added to the order.")]
    DuplicateProduct,
    #[error("Order quantity is too large.")]
    TotalOverflow,
}

/// Which step of a submission failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SubmitPhase {
    /// Nothing was validated or sent.
    Validation,
    /// The header request failed; nothing was persisted.
    Header,
    /// The backend accepted the header but its reply carried no readable
    /// order id. The order exists server-side; no lines were sent.
    HeaderUnconfirmed,
    /// Line `line` (1-based) failed. The header and `line - 1` lines exist
    /// server-side under `order_id`.
    #[serde(rename_all = "camelCase")]
    Line {
        order_id: i64,
        line: usize,
        product_id: i64,
    },
}

#[derive(Debug, Error)]
#[error("{}", describe(.phase, .source))]
pub struct SubmitError {
    pub phase: SubmitPhase,
    #[source]
    pub source: ConsoleError,
}

fn describe(phase: &SubmitPhase, source: &ConsoleError) -> String {
    match phase {
        SubmitPhase::Validation => source.to_string(),
        SubmitPhase::Header => format!("Could not create the order: {source}"),
        SubmitPhase::HeaderUnconfirmed => format!(
            "The order was created but its id could not be read, so no products were added: {source}"
        ),
        SubmitPhase::Line {
            order_id,
            line,
            product_id,
        } => format!(
            "Order {order_id} was created but line {line} (product {product_id}) failed: {source}"
        ),
    }
}

/// Result of a fully successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedOrder {
    pub order_id: i64,
    pub lines: usize,
}

/// The two calls a submission needs. `ApiClient` implements this against the
/// REST API.
pub trait OrderBackend: Sync {
    /// Create the header and return the server-assigned order id. `Ok(None)`
    /// means the header was accepted but the reply did not say under which id.
    fn create_order_header(
        &self,
        header: &OrderPayload,
        store_id: i64,
        salesperson_id: i64,
    ) -> impl Future<Output = Result<Option<i64>, ConsoleError>> + Send;

    fn create_order_line(
        &self,
        order_id: i64,
        product_id: i64,
        line: &OrderDetailPayload,
    ) -> impl Future<Output = Result<(), ConsoleError>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    po_number: String,
    store_id: Option<i64>,
    lines: Vec<OrderDetailDraft>,
    total: i64,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OrderDetailDraft] {
        &self.lines
    }

    /// Sum of line quantities.
    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn store_id(&self) -> Option<i64> {
        self.store_id
    }

    pub fn po_number(&self) -> &str {
        &self.po_number
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn select_store(&mut self, store_id: i64) {
        self.store_id = Some(store_id);
    }

    pub fn clear_store(&mut self) {
        self.store_id = None;
    }

    pub fn set_po_number(&mut self, po_number: &str) {
        self.po_number = po_number.trim().to_string();
    }

    pub fn add_line(
        &mut self,
        product: Option<&ProductChoice>,
        quantity: i64,
    ) -> Result<(), LineRejected> {
        let product = product.ok_or(LineRejected::MissingProduct)?;
        if quantity <= 0 {
            return Err(LineRejected::InvalidQuantity);
        }
        if self.lines.iter().any(|l| l.product_id == product.product_id) {
            return Err(LineRejected::DuplicateProduct);
        }
        let total = self
            .total
            .checked_add(quantity)
            .ok_or(LineRejected::TotalOverflow)?;
        self.lines.push(OrderDetailDraft {
            product_id: product.product_id,
            product_name: product.name.clone(),
            quantity,
        });
        self.total = total;
        Ok(())
    }

    /// Remove the line for `product_id`. Returns the removed line, if any.
    pub fn remove_line(&mut self, product_id: i64) -> Option<OrderDetailDraft> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        let removed = self.lines.remove(index);
        self.total -= removed.quantity;
        Some(removed)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clear only if the draft still matches `submitted`. Edits made while a
    /// submission was in flight are kept. Returns whether it cleared.
    pub fn clear_if_unchanged(&mut self, submitted: &OrderDraft) -> bool {
        if self != submitted {
            return false;
        }
        self.clear();
        true
    }

    fn validate(&self) -> Result<i64, ConsoleError> {
        let store_id = self.store_id.ok_or_else(|| {
            ConsoleError::validation(
                "Please select a store and add at least one product to the order.",
            )
        })?;
        if self.lines.is_empty() {
            return Err(ConsoleError::validation(
                "Please select a store and add at least one product to the order.",
            ));
        }
        Ok(store_id)
    }

    /// Header payload as it would be sent now.
    pub fn header(&self, store_id: i64, salesperson_id: i64) -> OrderPayload {
        OrderPayload {
            po_number: self.po_number.clone(),
            date: Utc::now().to_rfc3339(),
            status: NEW_ORDER_STATUS,
            total: self.total,
            store: StoreRef { store_id },
            salesperson: SalespersonRef { salesperson_id },
        }
    }

    /// Persist the draft: header first, then each line in order. Clears the
    /// draft only when every call succeeded.
    pub async fn submit<B: OrderBackend>(
        &mut self,
        backend: &B,
        salesperson_id: i64,
    ) -> Result<SubmittedOrder, SubmitError> {
        let store_id = self.validate().map_err(|source| SubmitError {
            phase: SubmitPhase::Validation,
            source,
        })?;

        let header = self.header(store_id, salesperson_id);
        let order_id = backend
            .create_order_header(&header, store_id, salesperson_id)
            .await
            .map_err(|source| {
                warn!(store_id, error = %source, "order header creation failed");
                SubmitError {
                    phase: SubmitPhase::Header,
                    source,
                }
            })?
            .ok_or_else(|| {
                warn!(store_id, "order header accepted without a readable order id");
                SubmitError {
                    phase: SubmitPhase::HeaderUnconfirmed,
                    source: ConsoleError::Response("created order carried no orderId".into()),
                }
            })?;

        for (index, line) in self.lines.iter().enumerate() {
            let payload = OrderDetailPayload {
                quantity: line.quantity,
            };
            if let Err(source) = backend
                .create_order_line(order_id, line.product_id, &payload)
                .await
            {
                warn!(
                    order_id,
                    line = index + 1,
                    product_id = line.product_id,
                    error = %source,
                    "order line creation failed; order left partially persisted"
                );
                return Err(SubmitError {
                    phase: SubmitPhase::Line {
                        order_id,
                        line: index + 1,
                        product_id: line.product_id,
                    },
                    source,
                });
            }
        }

        let lines = self.lines.len();
        info!(order_id, lines, total = self.total, "order submitted");
        self.clear();
        Ok(SubmittedOrder { order_id, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn product(id: i64) -> ProductChoice {
        ProductChoice {
            product_id: id,
            name: format!("Product {id}"),
        }
    }

    fn line_sum(draft: &OrderDraft) -> i64 {
        draft.lines().iter().map(|l| l.quantity).sum()
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Header { store_id: i64, salesperson_id: i64, total: i64 },
        Line { order_id: i64, product_id: i64, quantity: i64 },
    }

    /// Records calls; fails the line whose product id is `fail_product`.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        fail_header: bool,
        omit_order_id: bool,
        fail_product: Option<i64>,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OrderBackend for RecordingBackend {
        async fn create_order_header(
            &self,
            header: &OrderPayload,
            store_id: i64,
            salesperson_id: i64,
        ) -> Result<Option<i64>, ConsoleError> {
            self.calls.lock().unwrap().push(Call::Header {
                store_id,
                salesperson_id,
                total: header.total,
            });
            if self.fail_header {
                return Err(ConsoleError::Request {
                    status: 500,
                    message: "boom".into(),
                });
            }
            if self.omit_order_id {
                return Ok(None);
            }
            Ok(Some(900))
        }

        async fn create_order_line(
            &self,
            order_id: i64,
            product_id: i64,
            line: &OrderDetailPayload,
        ) -> Result<(), ConsoleError> {
            self.calls.lock().unwrap().push(Call::Line {
                order_id,
                product_id,
                quantity: line.quantity,
            });
            if self.fail_product == Some(product_id) {
                return Err(ConsoleError::Request {
                    status: 400,
                    message: "Product inactive".into(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn add_line_appends_and_increments_total() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), 2).expect("add");
        draft.add_line(Some(&product(2)), 3).expect("add");
        assert_eq!(draft.lines().len(), 2);
        assert_eq!(draft.total(), 5);
        assert_eq!(draft.lines()[1].product_name, "Product 2");
    }

    #[test]
    fn duplicate_product_is_a_no_op() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), 2).expect("add");
        let before = draft.clone();
        assert_eq!(
            draft.add_line(Some(&product(1)), 9),
            Err(LineRejected::DuplicateProduct)
        );
        assert_eq!(draft, before);
    }

    #[test]
    fn non_positive_quantity_and_missing_product_are_no_ops() {
        let mut draft = OrderDraft::new();
        assert_eq!(
            draft.add_line(Some(&product(1)), 0),
            Err(LineRejected::InvalidQuantity)
        );
        assert_eq!(
            draft.add_line(Some(&product(1)), -1),
            Err(LineRejected::InvalidQuantity)
        );
        assert_eq!(draft.add_line(None, 4), Err(LineRejected::MissingProduct));
        assert!(draft.is_empty());
        assert_eq!(draft.total(), 0);
    }

    #[test]
    fn clear_if_unchanged_keeps_later_edits() {
        let mut draft = OrderDraft::new();
        draft.select_store(4);
        draft.add_line(Some(&product(1)), 2).expect("add");
        let submitted = draft.clone();

        draft.add_line(Some(&product(2)), 1).expect("add during submit");
        assert!(!draft.clear_if_unchanged(&submitted));
        assert_eq!(draft.lines().len(), 2);
        assert_eq!(draft.total(), 3);

        let current = draft.clone();
        assert!(draft.clear_if_unchanged(&current));
        assert!(draft.is_empty());
        assert_eq!(draft.store_id(), None);
    }

    #[test]
    fn quantity_overflowing_the_total_is_rejected() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), i64::MAX).expect("add max");
        let before = draft.clone();
        assert_eq!(
            draft.add_line(Some(&product(2)), 1),
            Err(LineRejected::TotalOverflow)
        );
        assert_eq!(draft, before);
        assert_eq!(draft.total(), i64::MAX);
    }

    #[test]
    fn remove_line_scenario() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), 2).expect("add");
        draft.add_line(Some(&product(2)), 3).expect("add");

        let removed = draft.remove_line(1).expect("line 1 present");
        assert_eq!(removed.quantity, 2);
        assert_eq!(
            draft.lines(),
            &[OrderDetailDraft {
                product_id: 2,
                product_name: "Product 2".into(),
                quantity: 3,
            }]
        );
        assert_eq!(draft.total(), 3);

        assert_eq!(draft.remove_line(42), None);
        assert_eq!(draft.total(), 3);
    }

    #[test]
    fn removed_product_can_be_re_added_with_new_quantity() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), 2).expect("add");
        draft.remove_line(1);
        draft.add_line(Some(&product(1)), 7).expect("re-add");
        assert_eq!(draft.total(), 7);
    }

    #[test]
    fn total_tracks_lines_under_interleavings() {
        // Deterministic pseudo-random walk over add/remove operations.
        let mut draft = OrderDraft::new();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let product_id = (seed % 8) as i64;
            let quantity = ((seed >> 8) % 7) as i64 - 1;
            if seed & 1 == 0 {
                let _ = draft.add_line(Some(&product(product_id)), quantity);
            } else {
                draft.remove_line(product_id);
            }
            assert_eq!(draft.total(), line_sum(&draft));
            let mut ids: Vec<i64> = draft.lines().iter().map(|l| l.product_id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), draft.lines().len(), "duplicate product in draft");
        }
    }

    #[tokio::test]
    async fn submit_without_store_makes_no_calls() {
        let mut draft = OrderDraft::new();
        draft.add_line(Some(&product(1)), 2).expect("add");
        draft.add_line(Some(&product(2)), 3).expect("add");
        let backend = RecordingBackend::default();

        let err = draft.submit(&backend, 7).await.expect_err("no store");
        assert_eq!(err.phase, SubmitPhase::Validation);
        assert!(matches!(err.source, ConsoleError::Validation(_)));
        assert!(backend.calls().is_empty());
        assert_eq!(draft.lines().len(), 2, "draft kept on validation failure");
    }

    #[tokio::test]
    async fn submit_without_lines_makes_no_calls() {
        let mut draft = OrderDraft::new();
        draft.select_store(3);
        let backend = RecordingBackend::default();
        let err = draft.submit(&backend, 7).await.expect_err("no lines");
        assert_eq!(err.phase, SubmitPhase::Validation);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_header_then_lines_in_order_and_clears() {
        let mut draft = OrderDraft::new();
        draft.select_store(3);
        draft.set_po_number("PO-77");
        draft.add_line(Some(&product(5)), 2).expect("add");
        draft.add_line(Some(&product(6)), 4).expect("add");
        let backend = RecordingBackend::default();

        let submitted = draft.submit(&backend, 7).await.expect("submit");
        assert_eq!(submitted, SubmittedOrder { order_id: 900, lines: 2 });
        assert_eq!(
            backend.calls(),
            vec![
                Call::Header { store_id: 3, salesperson_id: 7, total: 6 },
                Call::Line { order_id: 900, product_id: 5, quantity: 2 },
                Call::Line { order_id: 900, product_id: 6, quantity: 4 },
            ]
        );
        assert!(draft.is_empty());
        assert_eq!(draft.total(), 0);
        assert_eq!(draft.store_id(), None);
        assert_eq!(draft.po_number(), "");
    }

    #[tokio::test]
    async fn header_failure_sends_no_lines() {
        let mut draft = OrderDraft::new();
        draft.select_store(3);
        draft.add_line(Some(&product(5)), 2).expect("add");
        let backend = RecordingBackend {
            fail_header: true,
            ..Default::default()
        };

        let err = draft.submit(&backend, 7).await.expect_err("header fails");
        assert_eq!(err.phase, SubmitPhase::Header);
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(draft.lines().len(), 1, "draft kept after failure");
    }

    #[tokio::test]
    async fn accepted_header_without_id_is_not_reported_as_nothing_persisted() {
        let mut draft = OrderDraft::new();
        draft.select_store(3);
        draft.add_line(Some(&product(5)), 2).expect("add");
        let backend = RecordingBackend {
            omit_order_id: true,
            ..Default::default()
        };

        let err = draft.submit(&backend, 7).await.expect_err("no order id");
        assert_eq!(err.phase, SubmitPhase::HeaderUnconfirmed);
        assert!(err.to_string().starts_with("The order was created"));
        assert_eq!(backend.calls().len(), 1, "no lines without an order id");
        assert_eq!(draft.lines().len(), 1);
    }

    #[tokio::test]
    async fn line_failure_names_the_line_and_stops() {
        let mut draft = OrderDraft::new();
        draft.select_store(3);
        draft.add_line(Some(&product(5)), 2).expect("add");
        draft.add_line(Some(&product(6)), 4).expect("add");
        draft.add_line(Some(&product(8)), 1).expect("add");
        let backend = RecordingBackend {
            fail_product: Some(6),
            ..Default::default()
        };

        let err = draft.submit(&backend, 7).await.expect_err("line 2 fails");
        assert_eq!(
            err.phase,
            SubmitPhase::Line { order_id: 900, line: 2, product_id: 6 }
        );
        assert!(err.to_string().contains("line 2 (product 6)"));
        // Header + two line attempts; the third line is never sent.
        assert_eq!(backend.calls().len(), 3);
        assert_eq!(draft.lines().len(), 3);
    }
}
