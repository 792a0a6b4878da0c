//! Verify resource helpers against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector describes the call input, the request the transport must see,
//! a simulated response, and either the expected typed result or the expected
//! error status. Comparing parsed JSON and typed values (not raw strings)
//! avoids false negatives from field ordering.

use std::sync::Arc;

use serde_json::Value;
use shop_core::{
    ApiError, CreateOrderRequest, HttpMethod, HttpResponse, MockTransport, NewProduct, Order,
    OrderStatus, Product, ProductUpdate, ShopClient,
};

const BASE_URL: &str = "http://localhost:3001/api";

fn setup(case: &Value) -> (ShopClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let sim = &case["simulated_response"];
    transport.push_response(HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    ));
    (ShopClient::new(BASE_URL, transport.clone()), transport)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, case: &Value, transport: &MockTransport) {
    let expected = &case["expected_request"];
    let sent = transport.requests();
    assert_eq!(sent.len(), 1, "{name}: exactly one request");
    let sent = &sent[0];

    let path = expected["path"].as_str().unwrap();
    assert_eq!(sent.request.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(sent.request.path, path, "{name}: path");
    assert_eq!(sent.url, format!("{BASE_URL}{path}"), "{name}: url");
    assert_eq!(sent.request.header("content-type"), Some("application/json"), "{name}: content type");

    match expected.get("body") {
        Some(body) => {
            let sent_body: Value = serde_json::from_str(sent.request.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent_body, body, "{name}: body");
        }
        None => assert!(sent.request.body.is_none(), "{name}: body should be None"),
    }
}

/// Compare a call result with `expected_result` or `expected_error_status`.
fn check_result<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: PartialEq + std::fmt::Debug + serde::de::DeserializeOwned,
{
    if let Some(status) = case.get("expected_error_status") {
        let err = result.unwrap_err();
        assert_eq!(err.status(), status.as_u64().map(|s| s as u16), "{name}: error status");
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

fn id(case: &Value) -> u64 {
    case["input"]["id"].as_u64().unwrap()
}

fn page(case: &Value) -> (u32, u32) {
    let input = &case["input"];
    (
        input["limit"].as_u64().unwrap() as u32,
        input["offset"].as_u64().unwrap() as u32,
    )
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn product_test_vectors() {
    let raw = include_str!("../../test-vectors/products.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (client, transport) = setup(case);
        let products = client.products();

        match case["operation"].as_str().unwrap() {
            "get_all" => {
                let (limit, offset) = page(case);
                let result = products.get_all(limit, offset).await;
                check_result::<Vec<Product>>(name, case, result);
            }
            "get_by_id" => {
                let result = products.get_by_id(id(case)).await;
                check_result::<Product>(name, case, result);
            }
            "create" => {
                let input: NewProduct = serde_json::from_value(case["input"].clone()).unwrap();
                let result = products.create(&input).await;
                check_result::<Product>(name, case, result);
            }
            "update" => {
                let changes: ProductUpdate =
                    serde_json::from_value(case["input"]["changes"].clone()).unwrap();
                let result = products.update(id(case), &changes).await;
                check_result::<Product>(name, case, result);
            }
            "delete" => {
                let result = products.delete(id(case)).await;
                check_result::<()>(name, case, result);
            }
            other => panic!("{name}: unknown operation: {other}"),
        }

        check_request(name, case, &transport);
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_test_vectors() {
    let raw = include_str!("../../test-vectors/orders.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (client, transport) = setup(case);
        let orders = client.orders();

        match case["operation"].as_str().unwrap() {
            "get_all" => {
                let (limit, offset) = page(case);
                let result = orders.get_all(limit, offset).await;
                check_result::<Vec<Order>>(name, case, result);
            }
            "get_by_id" => {
                let result = orders.get_by_id(id(case)).await;
                check_result::<Order>(name, case, result);
            }
            "create" => {
                let input: CreateOrderRequest = serde_json::from_value(case["input"].clone()).unwrap();
                let result = orders.create(&input).await;
                check_result::<Order>(name, case, result);
            }
            "update_status" => {
                let status: OrderStatus =
                    serde_json::from_value(case["input"]["status"].clone()).unwrap();
                let result = orders.update_status(id(case), status).await;
                check_result::<()>(name, case, result);
            }
            "delete" => {
                let result = orders.delete(id(case)).await;
                check_result::<()>(name, case, result);
            }
            other => panic!("{name}: unknown operation: {other}"),
        }

        check_request(name, case, &transport);
    }
}
