//! Store endpoints.

use serde_json::Value;

use crate::api::{parse_json, ApiClient, Resource};
use crate::error::Result;
use crate::models::{require, Store, StorePayload};

pub struct StoresApi<'a> {
    resource: Resource<'a>,
}

impl ApiClient {
    pub fn stores(&self) -> StoresApi<'_> {
        StoresApi {
            resource: self.resource("stores"),
        }
    }
}

impl StoresApi<'_> {
    pub async fn list(&self) -> Result<Vec<Store>> {
        parse_json(self.resource.get("", &[]).await?)
    }

    pub async fn get(&self, store_id: i64) -> Result<Store> {
        parse_json(self.resource.get(&format!("/{store_id}"), &[]).await?)
    }

    pub async fn create(&self, store: &StorePayload) -> Result<Value> {
        require("Name", &store.name)?;
        self.resource.post("", &[], store).await
    }

    pub async fn update(&self, store_id: i64, store: &StorePayload) -> Result<Value> {
        require("Name", &store.name)?;
        self.resource
            .put(&format!("/{store_id}"), &[], store)
            .await
    }

    pub async fn delete(&self, store_id: i64) -> Result<()> {
        self.resource.delete(&format!("/{store_id}")).await
    }
}
