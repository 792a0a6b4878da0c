//! Typed API client core for the shop service.
//!
//! # Overview
//! `ShopClient` exposes `get/post/put/delete` primitives and typed resource
//! helpers (`client.products()`, `client.orders()`) over a pluggable
//! `Transport`. Every call runs through ordered request and response
//! interceptor chains before and after the transport.
//!
//! # Design
//! - No global client: callers construct a `ShopClient` and pass it around,
//!   so tests can swap in `MockTransport` with their own interceptors.
//! - Success envelopes (`{ data, message? }`) are decoded with serde into
//!   typed results; a shape mismatch is `ApiError::Decode`, never a panic.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod mock;
pub mod resources;
pub mod transport;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use client::ShopClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{HeaderInterceptor, LoggingInterceptor, RequestInterceptor, ResponseInterceptor};
pub use mock::{MockTransport, RecordedRequest};
pub use resources::{Orders, Products, DEFAULT_PAGE_LIMIT};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ApiResponse, CreateOrderRequest, Customer, NewProduct, Order, OrderItem, OrderItemRequest,
    OrderStatus, Product, ProductUpdate,
};
