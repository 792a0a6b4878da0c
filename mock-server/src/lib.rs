use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 10;
pub const ORDER_STATUSES: [&str; 4] = ["pending", "processing", "completed", "cancelled"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: u64,
    pub product_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateOrder {
    pub customer_id: u64,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub status: String,
}

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl Pagination {
    fn window(&self) -> (usize, usize) {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LIMIT,
        };
        let offset = self.offset.unwrap_or(0).max(0);
        (limit as usize, offset as usize)
    }
}

#[derive(Default)]
pub struct Shop {
    products: BTreeMap<u64, Product>,
    orders: BTreeMap<u64, Order>,
    customers: BTreeMap<u64, Customer>,
    next_product_id: u64,
    next_order_id: u64,
    next_item_id: u64,
}

impl Shop {
    /// Empty catalog with the demo customer (id 1) seeded.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let mut shop = Shop::default();
        shop.customers.insert(
            1,
            Customer {
                id: 1,
                name: "Demo Customer".to_string(),
                email: "demo@example.com".to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        shop
    }

    fn allocate(counter: &mut u64) -> u64 {
        *counter += 1;
        *counter
    }

    /// Attach customer and product details the way the backend preloads them.
    fn hydrate(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.customer = self.customers.get(&order.customer_id).cloned();
        for item in &mut order.items {
            item.product = self.products.get(&item.product_id).cloned();
        }
        order
    }
}

pub type Db = Arc<RwLock<Shop>>;

/// Failure body shaped like the backend's `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiFailure>;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(3001);
        Self { host, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(Shop::seeded())))
}

pub fn app_with_state(db: Db) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/{id}/status", put(update_order_status))
        .with_state(db);

    Router::new()
        .nest("/api", api)
        .layer(middleware::map_response(stamp_request_id))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn stamp_request_id(mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

// --- products ---

async fn list_products(State(db): State<Db>, Query(page): Query<Pagination>) -> Json<Value> {
    let (limit, offset) = page.window();
    let shop = db.read().await;
    let products: Vec<&Product> = shop.products.values().skip(offset).take(limit).collect();
    Json(json!({ "data": products }))
}

async fn get_product(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let shop = db.read().await;
    let product = shop.products.get(&id).ok_or_else(|| ApiFailure::not_found("Product"))?;
    Ok(Json(json!({ "data": product })))
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<CreateProduct>,
) -> (StatusCode, Json<Value>) {
    let mut shop = db.write().await;
    let now = Utc::now();
    let product = Product {
        id: Shop::allocate(&mut shop.next_product_id),
        name: input.name,
        description: input.description,
        price: input.price,
        stock: input.stock,
        created_at: now,
        updated_at: now,
    };
    shop.products.insert(product.id, product.clone());
    tracing::info!(id = product.id, "product created");
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "data": product })),
    )
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateProduct>,
) -> ApiResult<Json<Value>> {
    let mut shop = db.write().await;
    let product = shop.products.get_mut(&id).ok_or_else(|| ApiFailure::not_found("Product"))?;
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(description) = input.description {
        product.description = description;
    }
    if let Some(price) = input.price {
        product.price = price;
    }
    if let Some(stock) = input.stock {
        product.stock = stock;
    }
    product.updated_at = Utc::now();
    Ok(Json(json!({ "message": "Product updated successfully", "data": product })))
}

/// Deleting an unknown product succeeds, like a row delete matching nothing.
async fn delete_product(State(db): State<Db>, Path(id): Path<u64>) -> Json<Value> {
    db.write().await.products.remove(&id);
    Json(json!({ "message": "Product deleted successfully" }))
}

// --- orders ---

async fn list_orders(State(db): State<Db>, Query(page): Query<Pagination>) -> Json<Value> {
    let (limit, offset) = page.window();
    let shop = db.read().await;
    let orders: Vec<Order> = shop
        .orders
        .values()
        .skip(offset)
        .take(limit)
        .map(|order| shop.hydrate(order))
        .collect();
    Json(json!({ "data": orders }))
}

async fn get_order(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let shop = db.read().await;
    let order = shop.orders.get(&id).ok_or_else(|| ApiFailure::not_found("Order"))?;
    Ok(Json(json!({ "data": shop.hydrate(order) })))
}

async fn create_order(
    State(db): State<Db>,
    Json(input): Json<CreateOrder>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if input.items.is_empty() {
        return Err(ApiFailure::bad_request("order must contain at least one item"));
    }

    let mut shop = db.write().await;

    // Validate the whole order before touching stock.
    let mut priced = Vec::with_capacity(input.items.len());
    for item in &input.items {
        if item.quantity == 0 {
            return Err(ApiFailure::bad_request("quantity must be at least 1"));
        }
        let product = shop
            .products
            .get(&item.product_id)
            .ok_or_else(|| ApiFailure::bad_request("product not found"))?;
        let requested: i64 = input
            .items
            .iter()
            .filter(|other| other.product_id == item.product_id)
            .map(|other| i64::from(other.quantity))
            .sum();
        if product.stock < requested {
            return Err(ApiFailure::bad_request(format!(
                "insufficient stock for product: {}",
                product.name
            )));
        }
        priced.push((item.product_id, item.quantity, product.price));
    }

    let order_id = Shop::allocate(&mut shop.next_order_id);
    let now = Utc::now();
    let mut items = Vec::with_capacity(priced.len());
    let mut total = 0.0;
    for (product_id, quantity, price) in priced {
        if let Some(product) = shop.products.get_mut(&product_id) {
            product.stock -= i64::from(quantity);
            product.updated_at = now;
        }
        total += price * f64::from(quantity);
        items.push(OrderItem {
            id: Shop::allocate(&mut shop.next_item_id),
            order_id,
            product_id,
            product: None,
            quantity,
            price,
        });
    }

    let order = Order {
        id: order_id,
        customer_id: input.customer_id,
        customer: None,
        items,
        total,
        status: "pending".to_string(),
        created_at: now,
        updated_at: now,
    };
    shop.orders.insert(order_id, order.clone());
    tracing::info!(id = order_id, total, "order created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order created successfully", "data": shop.hydrate(&order) })),
    ))
}

async fn update_order_status(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateStatus>,
) -> ApiResult<Json<Value>> {
    let mut shop = db.write().await;
    let order = shop
        .orders
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::bad_request("record not found"))?;
    if !ORDER_STATUSES.contains(&input.status.as_str()) {
        return Err(ApiFailure::bad_request("invalid status"));
    }
    order.status = input.status;
    order.updated_at = Utc::now();
    Ok(Json(json!({ "message": "Order status updated successfully" })))
}

async fn delete_order(State(db): State<Db>, Path(id): Path<u64>) -> Json<Value> {
    db.write().await.orders.remove(&id);
    Json(json!({ "message": "Order deleted successfully" }))
}
