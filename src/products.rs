//! Product catalogue endpoints.

use serde_json::Value;

use crate::api::{parse_json, ApiClient, Resource};
use crate::error::Result;
use crate::models::{require, Product, ProductPayload};

pub struct ProductsApi<'a> {
    resource: Resource<'a>,
}

impl ApiClient {
    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi {
            resource: self.resource("products"),
        }
    }
}

fn classification_query(brand_id: i64, category_id: i64) -> [(&'static str, String); 2] {
    [
        ("brandId", brand_id.to_string()),
        ("categoryId", category_id.to_string()),
    ]
}

impl ProductsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Product>> {
        parse_json(self.resource.get("", &[]).await?)
    }

    pub async fn get(&self, product_id: i64) -> Result<Product> {
        parse_json(self.resource.get(&format!("/{product_id}"), &[]).await?)
    }

    pub async fn create(
        &self,
        product: &ProductPayload,
        brand_id: i64,
        category_id: i64,
    ) -> Result<Value> {
        require("Name", &product.name)?;
        self.resource
            .post("", &classification_query(brand_id, category_id), product)
            .await
    }

    pub async fn update(
        &self,
        product_id: i64,
        product: &ProductPayload,
        brand_id: i64,
        category_id: i64,
    ) -> Result<Value> {
        require("Name", &product.name)?;
        self.resource
            .put(
                &format!("/{product_id}"),
                &classification_query(brand_id, category_id),
                product,
            )
            .await
    }

    pub async fn delete(&self, product_id: i64) -> Result<()> {
        self.resource.delete(&format!("/{product_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{json, serve};
    use crate::error::ConsoleError;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.into(),
            description: "Vivid violet for the wild at heart".into(),
            color: "Violet".into(),
            size: "0.46 OZ".into(),
            weight: "15".into(),
            image_url: String::new(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn create_sends_brand_and_category() {
        let (base, server) = serve(vec![json("201 Created", r#"{"productId":300}"#)]);
        let api = ApiClient::new(&base, Arc::new(MemoryStore::with_credential("a.b.c")))
            .expect("client");

        let created = api
            .products()
            .create(&payload("CRAZY VIOLET"), 1, 4)
            .await
            .expect("create product");
        assert_eq!(created["productId"], 300);

        let captured = server.join().expect("server thread");
        assert_eq!(
            captured[0].request_line,
            "POST /api/products?brandId=1&categoryId=4 HTTP/1.1"
        );
        let body: Value = serde_json::from_str(&captured[0].body).expect("json body");
        assert_eq!(body["imageUrl"], "");
        assert_eq!(body["isActive"], true);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let api = ApiClient::new(
            "http://127.0.0.1:9/api",
            Arc::new(MemoryStore::with_credential("a.b.c")),
        )
        .expect("client");
        let err = api
            .products()
            .update(3, &payload(" "), 1, 1)
            .await
            .expect_err("blank name");
        assert!(matches!(err, ConsoleError::Validation(_)));
    }
}
