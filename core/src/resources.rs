//! Typed resource helpers for `/products` and `/orders`.
//!
//! Each method maps one endpoint onto a `ShopClient` primitive and unwraps the
//! `data` field of the success envelope. The envelope's `message` is dropped.

use serde::de::IgnoredAny;

use crate::client::ShopClient;
use crate::error::ApiError;
use crate::types::{
    ApiResponse, CreateOrderRequest, NewProduct, Order, OrderStatus, Product, ProductUpdate,
    UpdateOrderStatus,
};

/// Page size used by the backend when none is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct Products<'a> {
    client: &'a ShopClient,
}

impl<'a> Products<'a> {
    pub(crate) fn new(client: &'a ShopClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, limit: u32, offset: u32) -> Result<Vec<Product>, ApiError> {
        let path = format!("/products?limit={limit}&offset={offset}");
        let envelope: ApiResponse<Vec<Product>> = self.client.get(&path).await?;
        Ok(envelope.data)
    }

    /// First page at the backend's default size.
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.get_all(DEFAULT_PAGE_LIMIT, 0).await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Product, ApiError> {
        let envelope: ApiResponse<Product> = self.client.get(&format!("/products/{id}")).await?;
        Ok(envelope.data)
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let envelope: ApiResponse<Product> = self.client.post("/products", product).await?;
        Ok(envelope.data)
    }

    pub async fn update(&self, id: u64, changes: &ProductUpdate) -> Result<Product, ApiError> {
        let envelope: ApiResponse<Product> =
            self.client.put(&format!("/products/{id}"), changes).await?;
        Ok(envelope.data)
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let _: IgnoredAny = self.client.delete(&format!("/products/{id}")).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    client: &'a ShopClient,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(client: &'a ShopClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self, limit: u32, offset: u32) -> Result<Vec<Order>, ApiError> {
        let path = format!("/orders?limit={limit}&offset={offset}");
        let envelope: ApiResponse<Vec<Order>> = self.client.get(&path).await?;
        Ok(envelope.data)
    }

    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        self.get_all(DEFAULT_PAGE_LIMIT, 0).await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Order, ApiError> {
        let envelope: ApiResponse<Order> = self.client.get(&format!("/orders/{id}")).await?;
        Ok(envelope.data)
    }

    pub async fn create(&self, order: &CreateOrderRequest) -> Result<Order, ApiError> {
        let envelope: ApiResponse<Order> = self.client.post("/orders", order).await?;
        Ok(envelope.data)
    }

    pub async fn update_status(&self, id: u64, status: OrderStatus) -> Result<(), ApiError> {
        let body = UpdateOrderStatus { status };
        let _: IgnoredAny = self
            .client
            .put(&format!("/orders/{id}/status"), &body)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let _: IgnoredAny = self.client.delete(&format!("/orders/{id}")).await?;
        Ok(())
    }
}
