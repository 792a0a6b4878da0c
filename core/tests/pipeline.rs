//! End-to-end pipeline scenarios over `MockTransport`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use shop_core::{
    ApiError, CreateOrderRequest, HeaderInterceptor, HttpMethod, HttpRequest, MockTransport,
    OrderItemRequest, OrderStatus, RequestInterceptor, ResponseInterceptor, ShopClient,
};

const TS: &str = "2024-05-01T08:00:00Z";

fn setup() -> (ShopClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let client = ShopClient::new("http://localhost:3001/api", transport.clone());
    (client, transport)
}

#[derive(Clone, Default)]
struct ErrorLog(Arc<Mutex<Vec<String>>>);

struct Named {
    name: &'static str,
    log: ErrorLog,
}

#[async_trait]
impl ResponseInterceptor for Named {
    async fn on_error(&self, error: &ApiError) {
        self.log.0.lock().unwrap().push(format!("{}:{:?}", self.name, error.status()));
    }
}

struct Reject;

#[async_trait]
impl RequestInterceptor for Reject {
    async fn on_request(&self, _request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Err(ApiError::interceptor_with_status("session expired", 401))
    }
}

#[tokio::test]
async fn header_interceptor_reaches_transport() {
    let (client, transport) = setup();
    client.add_request_interceptor(HeaderInterceptor::new("X-Test", "1"));
    transport.push_json(200, json!({ "data": [] }));

    let products = client.products().get_all(20, 0).await.unwrap();

    assert!(products.is_empty());
    let sent = &transport.requests()[0];
    assert_eq!(sent.request.method, HttpMethod::Get);
    assert_eq!(sent.request.path, "/products?limit=20&offset=0");
    assert_eq!(sent.request.header("X-Test"), Some("1"));
    assert_eq!(sent.request.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn not_found_surfaces_status_after_every_error_hook() {
    let (client, transport) = setup();
    let log = ErrorLog::default();
    client.add_response_interceptor(Named { name: "first", log: log.clone() });
    client.add_response_interceptor(Named { name: "second", log: log.clone() });
    transport.push_json(404, json!({ "error": "Product not found" }));

    let err = client.products().get_by_id(99).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(*log.0.lock().unwrap(), ["first:Some(404)", "second:Some(404)"]);
}

#[tokio::test]
async fn create_order_resolves_unwrapped_order() {
    let (client, transport) = setup();
    transport.push_json(
        201,
        json!({
            "message": "ok",
            "data": {
                "id": 10, "customer_id": 1, "items": [], "total": 19.98,
                "status": "pending", "created_at": TS, "updated_at": TS
            }
        }),
    );

    let order = client
        .orders()
        .create(&CreateOrderRequest {
            customer_id: 1,
            items: vec![OrderItemRequest { product_id: 5, quantity: 2 }],
        })
        .await
        .unwrap();

    assert_eq!(order.id, 10);
    assert_eq!(order.total, 19.98);
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn rejected_request_never_reaches_transport() {
    let (client, transport) = setup();
    let log = ErrorLog::default();
    client.add_request_interceptor(Reject);
    client.add_response_interceptor(Named { name: "resp", log: log.clone() });

    let err = client.orders().delete(1).await.unwrap_err();

    assert_eq!(err, ApiError::interceptor_with_status("session expired", 401));
    assert_eq!(transport.call_count(), 0);
    assert_eq!(*log.0.lock().unwrap(), ["resp:Some(401)"]);
}

#[tokio::test]
async fn serialization_happens_before_the_pipeline() {
    let (client, transport) = setup();
    let log = ErrorLog::default();
    client.add_response_interceptor(Named { name: "resp", log: log.clone() });

    // Maps with non-string keys cannot be encoded as JSON objects.
    let body: std::collections::HashMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();
    let err = client
        .post::<_, serde_json::Value>("/products", &body)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Serialization(_)));
    assert_eq!(transport.call_count(), 0);
    assert!(log.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_calls_each_run_their_own_chain() {
    let (client, transport) = setup();
    client.add_request_interceptor(HeaderInterceptor::new("X-Test", "1"));
    for _ in 0..4 {
        transport.push_json(200, json!({ "message": "done" }));
    }

    let orders = client.orders();
    let (a, b, c, d) = tokio::join!(
        orders.delete(1),
        orders.delete(2),
        orders.update_status(3, OrderStatus::Cancelled),
        orders.update_status(4, OrderStatus::Completed),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();
    d.unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|s| s.request.header("X-Test") == Some("1")));
}
