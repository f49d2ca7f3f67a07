//! Orders and order-detail endpoints.

use serde_json::Value;

use crate::api::{parse_json, ApiClient, Resource};
use crate::error::Result;
use crate::models::{Order, OrderDetail, OrderDetailPayload, OrderPayload, OrderUpdate};
use crate::order_draft::OrderBackend;

pub struct OrdersApi<'a> {
    resource: Resource<'a>,
}

/// Order details live under the orders family on the backend.
pub struct OrderDetailsApi<'a> {
    resource: Resource<'a>,
}

impl ApiClient {
    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi {
            resource: self.resource("orders"),
        }
    }

    pub fn order_details(&self) -> OrderDetailsApi<'_> {
        OrderDetailsApi {
            resource: self.resource("orders"),
        }
    }
}

fn owner_query(store_id: i64, salesperson_id: i64) -> [(&'static str, String); 2] {
    [
        ("storeId", store_id.to_string()),
        ("salespersonId", salesperson_id.to_string()),
    ]
}

/// The create endpoint answers with the new order; older builds answered with
/// the bare id. Ids may arrive as numbers or numeric strings.
fn created_order_id(value: &Value) -> Option<i64> {
    let id = value
        .get("orderId")
        .or_else(|| value.get("id"))
        .unwrap_or(value);
    match id {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl OrdersApi<'_> {
    pub async fn list(&self) -> Result<Vec<Order>> {
        parse_json(self.resource.get("", &[]).await?)
    }

    pub async fn list_by_salesperson(&self, salesperson_id: i64) -> Result<Vec<Order>> {
        let value = self
            .resource
            .get(
                "/salesperson",
                &[("salespersonId", salesperson_id.to_string())],
            )
            .await?;
        parse_json(value)
    }

    pub async fn get(&self, order_id: i64) -> Result<Order> {
        parse_json(self.resource.get(&format!("/{order_id}"), &[]).await?)
    }

    /// Create an order header. Returns the raw response (the new order).
    pub async fn create(
        &self,
        order: &OrderPayload,
        store_id: i64,
        salesperson_id: i64,
    ) -> Result<Value> {
        self.resource
            .post("", &owner_query(store_id, salesperson_id), order)
            .await
    }

    pub async fn update(
        &self,
        order_id: i64,
        order: &OrderUpdate,
        store_id: i64,
        salesperson_id: i64,
    ) -> Result<Value> {
        self.resource
            .put(
                &format!("/{order_id}"),
                &owner_query(store_id, salesperson_id),
                order,
            )
            .await
    }

    pub async fn delete(&self, order_id: i64) -> Result<()> {
        self.resource.delete(&format!("/{order_id}")).await
    }
}

impl OrderDetailsApi<'_> {
    pub async fn list(&self, order_id: i64) -> Result<Vec<OrderDetail>> {
        let value = self
            .resource
            .get(&format!("/{order_id}/details"), &[])
            .await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        parse_json(value)
    }

    pub async fn get(&self, order_id: i64, detail_id: i64) -> Result<OrderDetail> {
        let value = self
            .resource
            .get(&format!("/{order_id}/details/{detail_id}"), &[])
            .await?;
        parse_json(value)
    }

    pub async fn create(
        &self,
        order_id: i64,
        product_id: i64,
        detail: &OrderDetailPayload,
    ) -> Result<Value> {
        self.resource
            .post(
                &format!("/{order_id}"),
                &[("productId", product_id.to_string())],
                detail,
            )
            .await
    }

    pub async fn update(
        &self,
        order_id: i64,
        detail_id: i64,
        product_id: i64,
        detail: &OrderDetailPayload,
    ) -> Result<Value> {
        self.resource
            .put(
                &format!("/{order_id}/details/{detail_id}"),
                &[("productId", product_id.to_string())],
                detail,
            )
            .await
    }

    pub async fn delete(&self, order_id: i64, detail_id: i64) -> Result<()> {
        self.resource
            .delete(&format!("/{order_id}/details/{detail_id}"))
            .await
    }

    pub async fn delete_all(&self, order_id: i64) -> Result<()> {
        self.resource
            .delete(&format!("/DeleteDetailsByOrder/{order_id}"))
            .await
    }
}

impl OrderBackend for ApiClient {
    async fn create_order_header(
        &self,
        header: &OrderPayload,
        store_id: i64,
        salesperson_id: i64,
    ) -> Result<Option<i64>> {
        let created = self.orders().create(header, store_id, salesperson_id).await?;
        Ok(created_order_id(&created))
    }

    async fn create_order_line(
        &self,
        order_id: i64,
        product_id: i64,
        line: &OrderDetailPayload,
    ) -> Result<()> {
        self.order_details()
            .create(order_id, product_id, line)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{json, no_content, serve};
    use crate::order_draft::{OrderDraft, ProductChoice, SubmitPhase};
    use crate::storage::MemoryStore;
    use serde_json::json as json_value;
    use std::sync::Arc;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemoryStore::with_credential("aaa.bbb.ccc"))).expect("client")
    }

    #[test]
    fn created_order_id_shapes() {
        assert_eq!(created_order_id(&json_value!({ "orderId": 4 })), Some(4));
        assert_eq!(created_order_id(&json_value!({ "orderId": "31" })), Some(31));
        assert_eq!(created_order_id(&json_value!(12)), Some(12));
        assert_eq!(created_order_id(&json_value!({ "ok": true })), None);
        assert_eq!(created_order_id(&Value::Null), None);
    }

    #[tokio::test]
    async fn list_by_salesperson_uses_query() {
        let (base, server) = serve(vec![json(
            "200 OK",
            r#"[{"orderId":1,"poNumber":"A","total":3,"store":{"storeId":2,"name":"S"}}]"#,
        )]);
        let orders = client(&base)
            .orders()
            .list_by_salesperson(7)
            .await
            .expect("orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].effective_store_id(), Some(2));

        let captured = server.join().expect("server thread");
        assert_eq!(
            captured[0].request_line,
            "GET /api/orders/salesperson?salespersonId=7 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn detail_paths() {
        let (base, server) = serve(vec![
            json("200 OK", r#"[{"orderDetailId":3,"quantity":2}]"#),
            no_content(),
            no_content(),
        ]);
        let api = client(&base);
        let details = api.order_details().list(9).await.expect("details");
        assert_eq!(details[0].quantity, 2);
        api.order_details().delete(9, 3).await.expect("delete detail");
        api.order_details().delete_all(9).await.expect("delete all");

        let lines: Vec<String> = server
            .join()
            .expect("server thread")
            .into_iter()
            .map(|c| c.request_line)
            .collect();
        assert_eq!(
            lines,
            vec![
                "GET /api/orders/9/details HTTP/1.1",
                "DELETE /api/orders/9/details/3 HTTP/1.1",
                "DELETE /api/orders/DeleteDetailsByOrder/9 HTTP/1.1",
            ]
        );
    }

    #[tokio::test]
    async fn string_order_id_is_accepted_on_submit() {
        let (base, server) = serve(vec![
            json("201 Created", r#"{"orderId":"31","poNumber":"PO-5"}"#),
            no_content(),
        ]);
        let api = client(&base);
        let mut draft = OrderDraft::new();
        draft.select_store(4);
        draft
            .add_line(Some(&ProductChoice { product_id: 258, name: "CRAZY VIOLET".into() }), 2)
            .expect("add");

        let submitted = draft.submit(&api, 7).await.expect("submit");
        assert_eq!(submitted.order_id, 31);
        let captured = server.join().expect("server thread");
        assert_eq!(captured[1].request_line, "POST /api/orders/31?productId=258 HTTP/1.1");
    }

    #[tokio::test]
    async fn header_without_body_is_reported_as_unconfirmed() {
        let (base, server) = serve(vec![no_content()]);
        let api = client(&base);
        let mut draft = OrderDraft::new();
        draft.select_store(4);
        draft
            .add_line(Some(&ProductChoice { product_id: 258, name: "CRAZY VIOLET".into() }), 2)
            .expect("add");

        let err = draft.submit(&api, 7).await.expect_err("no order id");
        assert_eq!(err.phase, SubmitPhase::HeaderUnconfirmed);
        assert_eq!(server.join().expect("server thread").len(), 1);
        assert_eq!(draft.lines().len(), 1);
    }

    #[tokio::test]
    async fn draft_submits_through_the_api() {
        let (base, server) = serve(vec![
            json("201 Created", r#"{"orderId":31,"poNumber":"PO-5"}"#),
            json("201 Created", r#"{"orderDetailId":1,"quantity":2}"#),
            json("201 Created", r#"{"orderDetailId":2,"quantity":1}"#),
        ]);
        let api = client(&base);

        let mut draft = OrderDraft::new();
        draft.select_store(4);
        draft.set_po_number("PO-5");
        draft
            .add_line(Some(&ProductChoice { product_id: 258, name: "CRAZY VIOLET".into() }), 2)
            .expect("add");
        draft
            .add_line(Some(&ProductChoice { product_id: 259, name: "RUBY".into() }), 1)
            .expect("add");

        let submitted = draft.submit(&api, 7).await.expect("submit");
        assert_eq!(submitted.order_id, 31);

        let captured = server.join().expect("server thread");
        assert_eq!(
            captured[0].request_line,
            "POST /api/orders?storeId=4&salespersonId=7 HTTP/1.1"
        );
        let header: Value = serde_json::from_str(&captured[0].body).expect("header json");
        assert_eq!(header["total"], 3);
        assert_eq!(header["status"], 1);
        assert_eq!(header["store"]["storeId"], 4);
        assert_eq!(captured[1].request_line, "POST /api/orders/31?productId=258 HTTP/1.1");
        assert_eq!(captured[1].body, r#"{"quantity":2}"#);
        assert_eq!(captured[2].request_line, "POST /api/orders/31?productId=259 HTTP/1.1");
    }
}
